use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Misuse of the orchestration primitives.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    #[error("a bounded poll needs at least one attempt")]
    ZeroAttempts,
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// A step could not produce an outcome at all.
///
/// This is distinct from a provider declining an operation: a decline is a
/// failed [`Outcome`](crate::Outcome), while a fault means the call never
/// completed or its answer could not be understood. The sequencer turns
/// faults into failed outcomes and halts, so they never reach the caller of
/// [`StepSequencer::run`](crate::StepSequencer::run).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepFault {
    /// The remote call could not be completed.
    #[error("transport failure: {reason}")]
    Transport {
        /// What went wrong, for diagnostics.
        reason: String,
        /// Whatever the remote sent back, if anything.
        raw: Option<String>,
        /// The underlying error, when one exists.
        #[source]
        source: Option<BoxError>,
    },

    /// The remote answered with a body that could not be decoded.
    #[error("unparseable response")]
    Unparseable {
        /// The body exactly as received.
        raw: String,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },
}

impl StepFault {
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
            raw: None,
            source: None,
        }
    }

    /// Wraps an underlying error as a transport fault, keeping whatever the
    /// remote sent back.
    #[must_use]
    pub fn caused_by<E>(source: E, raw: Option<String>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            reason: source.to_string(),
            raw,
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn unparseable(raw: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Unparseable {
            raw: raw.into(),
            source,
        }
    }

    /// The raw payload received before the fault, if any.
    #[must_use]
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            Self::Transport { raw, .. } => raw.as_deref(),
            Self::Unparseable { raw, .. } => Some(raw),
        }
    }
}
