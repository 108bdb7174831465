// ── Core error types ──
//
// Validation failures abort before any remote call. Transport failures
// carry the `robosync_api::Error` unchanged. Capability notices are not
// errors at all; see `model::Notice`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("Unexpected remote data: {message}")]
    UnexpectedRemote { message: String },

    // ── Remote errors ────────────────────────────────────────────────
    #[error(transparent)]
    Transport(#[from] robosync_api::Error),

    /// Membership reconciliation where removal and addition were submitted
    /// independently and at least one of them failed.
    #[error("{}", partial_summary(.removal.as_deref(), .addition.as_deref()))]
    PartialApply {
        removal: Option<Box<CoreError>>,
        addition: Option<Box<CoreError>>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Map a fetch failure, turning remote "not found" into [`CoreError::NotFound`].
    pub(crate) fn from_fetch(
        err: robosync_api::Error,
        entity_type: &'static str,
        identifier: impl Into<String>,
    ) -> Self {
        if err.is_not_found() {
            Self::NotFound {
                entity_type,
                identifier: identifier.into(),
            }
        } else {
            Self::Transport(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn partial_summary(removal: Option<&CoreError>, addition: Option<&CoreError>) -> String {
    match (removal, addition) {
        (Some(r), Some(a)) => {
            format!("Membership apply failed: removing servers: {r}; adding servers: {a}")
        }
        (Some(r), None) => format!("Membership partially applied: removing servers failed: {r}"),
        (None, Some(a)) => format!("Membership partially applied: adding servers failed: {a}"),
        (None, None) => "Membership applied".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> robosync_api::Error {
        robosync_api::Error::Api {
            status,
            code: None,
            message: "x".into(),
        }
    }

    #[test]
    fn fetch_404_becomes_not_found() {
        let err = CoreError::from_fetch(api(404), "firewall", "1.2.3.4");
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Entity not found: firewall with id 1.2.3.4"
        );
    }

    #[test]
    fn fetch_500_stays_transport() {
        let err = CoreError::from_fetch(api(500), "vswitch", "7");
        assert!(matches!(err, CoreError::Transport(_)));
    }

    #[test]
    fn partial_apply_names_failed_side() {
        let err = CoreError::PartialApply {
            removal: Some(Box::new(CoreError::Transport(api(500)))),
            addition: None,
        };
        let text = err.to_string();
        assert!(text.contains("removing servers failed"), "got: {text}");
        assert!(!text.contains("adding"), "got: {text}");
    }
}
