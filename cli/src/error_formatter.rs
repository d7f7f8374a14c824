use ariadne::{Color, Label, Report, ReportKind, Source};
use numscript::NumscriptError;

/// Format a NumscriptError with fancy terminal output using Ariadne
pub fn format_error(error: &NumscriptError) -> String {
    match error {
        NumscriptError::Parse(details) => format_error_in(error, &details.source_id),
        NumscriptError::InsufficientFunds {
            account,
            asset,
            available,
            required,
        } => format!(
            "Insufficient funds in {}\n  Asset: {}\n  Available: {}\n  Required: {}\n  Missing: {}",
            account,
            asset,
            available,
            required,
            required - available
        ),
        NumscriptError::ResourceLimitExceeded {
            limit_name,
            limit_value,
            actual_value,
            suggestion,
        } => {
            format!(
                "Resource limit exceeded: {}\n  Limit: {}\n  Actual: {}\n  {}",
                limit_name, limit_value, actual_value, suggestion
            )
        }
        other => other.to_string(),
    }
}

/// Like `format_error`, labelling parse errors with `source_id` instead of
/// the id they were created with
pub fn format_error_in(error: &NumscriptError, source_id: &str) -> String {
    let NumscriptError::Parse(details) = error else {
        return format_error(error);
    };

    let mut output = Vec::new();
    let message = format!(
        "Parse error: {} (at {}:{}:{})",
        details.message, source_id, details.span.line, details.span.col
    );

    let mut report = Report::build(ReportKind::Error, source_id, details.span.start)
        .with_message(message)
        .with_label(
            Label::new((source_id, details.span.start..details.span.end.max(details.span.start + 1)))
                .with_message("")
                .with_color(Color::Red),
        );

    if let Some(suggestion) = &details.suggestion {
        report = report.with_help(suggestion);
    }

    match report.finish().write(
        (source_id, Source::from(details.source_text.as_ref())),
        &mut output,
    ) {
        Ok(_) => String::from_utf8_lossy(&output).to_string(),
        Err(_) => {
            // Fallback to simple format
            format!("{}", error)
        }
    }
}
