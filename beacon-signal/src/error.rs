use std::fmt::Debug;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError<T: Debug> {
    #[error("The relay has stopped and can no longer accept values.")]
    /// The relay is no longer delivering values, either because of a
    /// shutdown or because the receiving side was dropped.
    ///
    /// The rejected value is handed back to the caller.
    Closed(T),
}

impl<T: Debug> RelayError<T> {
    /// Consumes the error returning the value which could not be sent.
    pub fn into_inner(self) -> T {
        match self {
            Self::Closed(value) => value,
        }
    }
}
