use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaSessionError {
    // Raised by MediaMirror::start when the host gate refuses access
    #[error("Access to media sessions denied: {0}")]
    AccessDenied(String),
    #[error("Unknown transport action '{0}'")]
    UnknownAction(String),
    #[error("Configuration Error: {0}")]
    Config(String),
}

impl MediaSessionError {
    pub fn access_denied(reason: &str) -> Self {
        MediaSessionError::AccessDenied(reason.to_string())
    }

    pub fn unknown_action(raw: &str) -> Self {
        MediaSessionError::UnknownAction(raw.to_string())
    }
}
