/// Resource limits applied to scripts before they are parsed or committed
///
/// Scripts arrive from generated demo configurations, so the limits are
/// generous for hand or machine written scripts while keeping a runaway
/// generator from building huge transactions.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Maximum script size in bytes
    /// Real usage: ~2KB, Limit: 1MB
    pub max_script_bytes: usize,

    /// Maximum number of send statements in one script
    /// Real usage: ~5, Limit: 256
    pub max_send_statements: usize,

    /// Maximum number of postings one execution may commit
    /// Real usage: ~10, Limit: 4096
    pub max_postings: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_script_bytes: 1024 * 1024, // 1 MB
            max_send_statements: 256,
            max_postings: 4096,
        }
    }
}

impl ResourceLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn check_script_size(&self, script: &str) -> crate::NumscriptResult<()> {
        if script.len() > self.max_script_bytes {
            return Err(crate::NumscriptError::ResourceLimitExceeded {
                limit_name: "max_script_bytes".to_string(),
                limit_value: self.max_script_bytes.to_string(),
                actual_value: script.len().to_string(),
                suggestion: "Split the script into several transaction steps".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_send_count(&self, count: usize) -> crate::NumscriptResult<()> {
        if count > self.max_send_statements {
            return Err(crate::NumscriptError::ResourceLimitExceeded {
                limit_name: "max_send_statements".to_string(),
                limit_value: self.max_send_statements.to_string(),
                actual_value: count.to_string(),
                suggestion: "Reduce the number of send statements per script".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_posting_count(&self, count: usize) -> crate::NumscriptResult<()> {
        if count > self.max_postings {
            return Err(crate::NumscriptError::ResourceLimitExceeded {
                limit_name: "max_postings".to_string(),
                limit_value: self.max_postings.to_string(),
                actual_value: count.to_string(),
                suggestion: "Use fewer sources or destinations per send".to_string(),
            });
        }
        Ok(())
    }
}
