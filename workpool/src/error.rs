use thiserror::Error;

/// Errors raised when extracting a concrete type from a
/// [`TaskValue`](crate::TaskValue).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CastError {
    #[error("stored value is not a {expected}")]
    TypeMismatch { expected: &'static str },
    #[error("no value present")]
    Empty,
}
