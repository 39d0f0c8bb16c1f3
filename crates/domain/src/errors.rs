use thiserror::Error;

/// Failures produced while building DoH server descriptors or parsing a
/// DoH configuration group.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DohConfigError {
    #[error("Invalid DoH template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Invalid DoH server record: {0}")]
    InvalidStructuredConfig(String),

    #[error("Malformed DoH configuration document: {0}")]
    MalformedDocument(String),

    #[error("DoH configuration contains no servers")]
    EmptyConfiguration,
}

impl DohConfigError {
    pub(crate) fn invalid_template(template: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}
