//! Host-side authorization to read media sessions.
//!
//! Reading other applications' sessions requires the host process to be an
//! enabled notification listener. The host answers that question; the
//! mirror refuses to start when the answer is no.

use crate::errors::MediaSessionError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessGate {
    Granted,
    Denied(String),
}

impl AccessGate {
    pub fn from_flag(granted: bool) -> Self {
        if granted {
            AccessGate::Granted
        } else {
            AccessGate::Denied("host reported no session access".to_string())
        }
    }

    /// Checks a colon-separated list of enabled notification listener
    /// components for `component` (a flattened `package/class` name).
    ///
    /// An absent setting means no listener is enabled.
    pub fn from_enabled_listeners(setting: Option<&str>, component: &str) -> Self {
        let enabled = setting
            .map(|value| {
                value
                    .split(':')
                    .map(str::trim)
                    .any(|entry| !entry.is_empty() && entry == component)
            })
            .unwrap_or(false);

        if enabled {
            AccessGate::Granted
        } else {
            AccessGate::Denied(format!("{} is not an enabled notification listener", component))
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, AccessGate::Granted)
    }

    pub fn check(&self) -> Result<(), MediaSessionError> {
        match self {
            AccessGate::Granted => Ok(()),
            AccessGate::Denied(reason) => Err(MediaSessionError::access_denied(reason)),
        }
    }
}

impl From<bool> for AccessGate {
    fn from(granted: bool) -> Self {
        AccessGate::from_flag(granted)
    }
}
