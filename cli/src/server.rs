#[cfg(feature = "server")]
pub mod http {
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Json},
        routing::{get, post},
        Router,
    };
    use numscript::{
        parse_metadata_from_numscript, parse_postings_from_numscript, validate_numscript,
        AccountFilter, DemoConfig, NumscriptError, SessionRegistry, TransactionFilter, Variables,
    };
    use serde::{Deserialize, Serialize};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use tower_http::cors::CorsLayer;
    use tracing::{error, info};

    type SharedRegistry = Arc<RwLock<SessionRegistry>>;
    type ApiError = (StatusCode, Json<ErrorResponse>);

    #[derive(Debug, Deserialize)]
    struct ScriptRequest {
        script: String,
    }

    #[derive(Debug, Deserialize)]
    struct ExecuteRequest {
        script: String,
        #[serde(default)]
        variables: serde_json::Map<String, serde_json::Value>,
    }

    #[derive(Debug, Deserialize)]
    struct BalanceParams {
        pattern: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct TransactionParams {
        account: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct AccountParams {
        pattern: Option<String>,
    }

    #[derive(Debug, Serialize)]
    struct ErrorResponse {
        error: String,
    }

    fn api_error(status: StatusCode, message: String) -> ApiError {
        (status, Json(ErrorResponse { error: message }))
    }

    fn engine_error(e: NumscriptError) -> ApiError {
        let status = match e {
            NumscriptError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_REQUEST,
        };
        api_error(status, e.to_string())
    }

    fn session_not_found(id: &str) -> ApiError {
        api_error(
            StatusCode::NOT_FOUND,
            format!("Session '{}' not found", id),
        )
    }

    pub fn router(registry: SessionRegistry) -> Router {
        let shared_registry = Arc::new(RwLock::new(registry));

        Router::new()
            .route("/health", get(health_check))
            .route("/validate", post(validate))
            .route("/scan", post(scan))
            .route("/sessions/:id", axum::routing::delete(remove_session))
            .route("/sessions/:id/demo", post(load_demo))
            .route("/sessions/:id/step", post(run_step))
            .route("/sessions/:id/execute", post(execute))
            .route("/sessions/:id/balances", get(balances))
            .route("/sessions/:id/transactions", get(transactions))
            .route("/sessions/:id/accounts", get(accounts))
            .route("/sessions/:id/reset", post(reset))
            .layer(CorsLayer::permissive())
            .with_state(shared_registry)
    }

    pub async fn start_server(host: &str, port: u16) -> anyhow::Result<()> {
        let app = router(SessionRegistry::new());

        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        info!("Numscript server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    async fn health_check() -> impl IntoResponse {
        Json(serde_json::json!({
            "status": "ok",
            "service": "numscript",
            "version": env!("CARGO_PKG_VERSION")
        }))
    }

    async fn validate(Json(payload): Json<ScriptRequest>) -> impl IntoResponse {
        Json(validate_numscript(&payload.script))
    }

    async fn scan(Json(payload): Json<ScriptRequest>) -> impl IntoResponse {
        Json(serde_json::json!({
            "postings": parse_postings_from_numscript(&payload.script),
            "metadata": parse_metadata_from_numscript(&payload.script),
        }))
    }

    async fn load_demo(
        State(registry): State<SharedRegistry>,
        Path(id): Path<String>,
        Json(config): Json<DemoConfig>,
    ) -> Result<impl IntoResponse, ApiError> {
        let mut registry = registry.write().await;
        let session = registry.switch_to(&id, config).map_err(engine_error)?;

        info!("Loaded demo '{}' into session '{}'", session.config().name, id);
        Ok(Json(serde_json::json!({
            "name": session.config().name,
            "steps": session.config().transaction_steps.len(),
        })))
    }

    async fn run_step(
        State(registry): State<SharedRegistry>,
        Path(id): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let mut registry = registry.write().await;
        let session = registry.get_mut(&id).ok_or_else(|| session_not_found(&id))?;

        let run = session.run_next_step().map_err(|e| {
            error!("Step failed in session '{}': {}", id, e);
            engine_error(e)
        })?;
        Ok(Json(serde_json::json!({
            "step": run,
            "finished": session.is_finished(),
        })))
    }

    async fn execute(
        State(registry): State<SharedRegistry>,
        Path(id): Path<String>,
        Json(payload): Json<ExecuteRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        if payload.script.trim().is_empty() {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Script cannot be empty".to_string(),
            ));
        }

        let variables = Variables::from_json(&serde_json::Value::Object(payload.variables))
            .map_err(engine_error)?;

        let mut registry = registry.write().await;
        let session = registry.get_or_create(&id);
        let transaction = session.execute(&payload.script, variables).map_err(|e| {
            error!("Execution failed in session '{}': {}", id, e);
            engine_error(e)
        })?;

        info!(
            "Committed transaction #{} in session '{}' with {} posting(s)",
            transaction.id,
            id,
            transaction.postings.len()
        );
        Ok(Json(transaction))
    }

    async fn balances(
        State(registry): State<SharedRegistry>,
        Path(id): Path<String>,
        Query(params): Query<BalanceParams>,
    ) -> Result<impl IntoResponse, ApiError> {
        let registry = registry.read().await;
        let ledger = registry.get(&id).ok_or_else(|| session_not_found(&id))?.ledger();

        let rows = match params.pattern.as_deref() {
            Some(pattern) if !pattern.is_empty() => ledger.get_balances(pattern),
            _ => ledger.get_all_balances(),
        };
        Ok(Json(rows))
    }

    async fn transactions(
        State(registry): State<SharedRegistry>,
        Path(id): Path<String>,
        Query(params): Query<TransactionParams>,
    ) -> Result<impl IntoResponse, ApiError> {
        let registry = registry.read().await;
        let ledger = registry.get(&id).ok_or_else(|| session_not_found(&id))?.ledger();

        let filter = TransactionFilter {
            account: params.account.filter(|account| !account.is_empty()),
            ..TransactionFilter::default()
        };
        let rows: Vec<_> = ledger.list_transactions(&filter).into_iter().cloned().collect();
        Ok(Json(rows))
    }

    async fn accounts(
        State(registry): State<SharedRegistry>,
        Path(id): Path<String>,
        Query(params): Query<AccountParams>,
    ) -> Result<impl IntoResponse, ApiError> {
        let registry = registry.read().await;
        let ledger = registry.get(&id).ok_or_else(|| session_not_found(&id))?.ledger();

        let filter = AccountFilter {
            address_pattern: params.pattern.filter(|pattern| !pattern.is_empty()),
            ..AccountFilter::default()
        };
        let rows: Vec<_> = ledger.list_accounts(&filter).into_iter().cloned().collect();
        Ok(Json(rows))
    }

    async fn reset(
        State(registry): State<SharedRegistry>,
        Path(id): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let mut registry = registry.write().await;
        let session = registry.get_mut(&id).ok_or_else(|| session_not_found(&id))?;
        session.reset();
        Ok(StatusCode::NO_CONTENT)
    }

    async fn remove_session(
        State(registry): State<SharedRegistry>,
        Path(id): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let mut registry = registry.write().await;
        registry.remove(&id).ok_or_else(|| session_not_found(&id))?;
        Ok(StatusCode::NO_CONTENT)
    }

}
