use crate::error::DataAccessError;

/// Result of a convenience mutation, transaction step, or lifecycle call.
///
/// These paths report a boolean to callers that only care about success, while keeping the
/// error for callers that want the detail. `NoOp` means nothing needed doing (committing
/// with no open transaction, database DDL on a single-file engine) and counts as success.
#[derive(Debug)]
#[must_use]
pub enum Outcome {
    Succeeded,
    NoOp,
    Failed(DataAccessError),
}

impl Outcome {
    /// Collapse a fallible step into an outcome.
    pub fn from_result<T>(result: Result<T, DataAccessError>) -> Self {
        match result {
            Ok(_) => Outcome::Succeeded,
            Err(err) => Outcome::Failed(err),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Outcome::NoOp)
    }

    /// Borrow the error, if the step failed.
    #[must_use]
    pub fn error(&self) -> Option<&DataAccessError> {
        match self {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Consume the outcome, surfacing a failure as an error.
    ///
    /// # Errors
    /// Returns the wrapped `DataAccessError` for `Outcome::Failed`.
    pub fn into_result(self) -> Result<(), DataAccessError> {
        match self {
            Outcome::Failed(err) => Err(err),
            Outcome::Succeeded | Outcome::NoOp => Ok(()),
        }
    }
}

impl From<Outcome> for bool {
    fn from(outcome: Outcome) -> bool {
        outcome.is_success()
    }
}
