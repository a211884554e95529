//! Structured error type for the command-line engine and its collaborators.
//!
//! Every failure carries the name of the function that raised it and a small
//! per-call-site number, so a rendered error such as `parseCmdFlag003` pins
//! down exactly which check fired. Callers wrap the errors of their callees,
//! keeping the whole chain reachable through [`std::error::Error::source`].

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed cause attached to an [`NgsiError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NgsiError>;

/// Error raised by a specific call site.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct NgsiError {
    /// Originating function name (e.g. `parseCmdFlag`).
    pub function: &'static str,
    /// Sequential number of the failing check inside `function`.
    pub errno: u32,
    /// Human readable message.
    pub message: String,
    #[source]
    source: Option<BoxError>,
}

impl NgsiError {
    pub fn new(function: &'static str, errno: u32, message: impl Into<String>) -> Self {
        Self {
            function,
            errno,
            message: message.into(),
            source: None,
        }
    }

    /// Attach an arbitrary cause.
    pub fn with_source(
        function: &'static str,
        errno: u32,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            function,
            errno,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Re-raise `inner` from another call site, keeping its message.
    pub fn wrap(function: &'static str, errno: u32, inner: NgsiError) -> Self {
        let message = inner.message.clone();
        Self::with_source(function, errno, message, inner)
    }

    /// `function` + zero padded errno + message, e.g. `Run001 missing required options`.
    pub fn tagged(&self) -> String {
        sprint_msg(self.function, self.errno, &self.message)
    }

    /// Walk the cause chain, innermost last. `self` is not included.
    pub fn causes(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        let mut next = self.source();
        std::iter::from_fn(move || {
            let current = next?;
            next = current.source();
            Some(current)
        })
    }
}

/// Format a diagnostic line the way tagged errors are rendered.
pub fn sprint_msg(function: &str, errno: u32, msg: &str) -> String {
    format!("{}{:03} {}", function, errno, msg)
}

/// Render any error of the chain: tagged form for [`NgsiError`], plain otherwise.
pub fn message(err: &(dyn StdError + 'static)) -> String {
    match err.downcast_ref::<NgsiError>() {
        Some(e) => e.tagged(),
        None => err.to_string(),
    }
}
