//! Evaluation faults: a rule that could not finish on one row.

use thiserror::Error;

/// A rule handler could not complete its check on a row.
///
/// The engine turns a fault into a validation error naming the rule kind and
/// carries on with the next row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationFault {
    /// Arithmetic produced infinity or NaN.
    #[error("non-finite result in {operation}")]
    NonFinite { operation: &'static str },
}

impl EvaluationFault {
    pub(crate) fn non_finite(operation: &'static str) -> Self {
        Self::NonFinite { operation }
    }

    /// Message recorded for a faulted rule of the given kind.
    pub fn message_for(&self, kind: &str) -> String {
        format!("Evaluation error in {kind} rule: {self}")
    }
}

/// Outcome of evaluating one rule on one row: pass/fail, or a fault.
pub type Outcome = Result<bool, EvaluationFault>;

/// Return the value when finite, a fault otherwise.
pub(crate) fn finite(value: f64, operation: &'static str) -> Result<f64, EvaluationFault> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationFault::non_finite(operation))
    }
}
