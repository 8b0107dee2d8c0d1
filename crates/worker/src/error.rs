//! Worker-level errors.

/// Errors raised at the event-dispatch boundary.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// An incoming event line could not be decoded.
    #[error("MALFORMED_EVENT: {0}")]
    MalformedEvent(String),

    /// A proxy operation failed.
    #[error(transparent)]
    Core(#[from] guichet_core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_event_display() {
        let err = WorkerError::MalformedEvent("expected value at line 1".into());
        assert!(err.to_string().contains("MALFORMED_EVENT"));
    }

    #[test]
    fn test_core_error_passes_through() {
        let err: WorkerError = guichet_core::Error::InvalidUrl("x".into()).into();
        assert!(err.to_string().contains("INVALID_URL"));
    }
}
