use std::fmt;

use serde::Serialize;

/// Outcome of a primary-then-fallback lookup.
///
/// Every degradation path in the service (external dataset, model inference, persisted process
/// results) returns one of these so callers can log or report which branch produced the data.
#[derive(Debug, Clone, PartialEq)]
pub enum Sourced<T> {
    Primary(T),
    Fallback(T, FallbackReason),
}

impl<T> Sourced<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Sourced::Fallback(..))
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Sourced::Primary(_) => None,
            Sourced::Fallback(_, reason) => Some(reason),
        }
    }

    pub fn data(&self) -> &T {
        match self {
            Sourced::Primary(data) | Sourced::Fallback(data, _) => data,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Sourced::Primary(data) | Sourced::Fallback(data, _) => data,
        }
    }

    pub fn map<U, F>(self, f: F) -> Sourced<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Sourced::Primary(data) => Sourced::Primary(f(data)),
            Sourced::Fallback(data, reason) => Sourced::Fallback(f(data), reason),
        }
    }
}

/// Why a lookup degraded to its static fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    SourceMissing(String),
    SourceUnreadable(String),
    SourceEmpty,
    ModelUnavailable(String),
    NoPersistedResults,
    UnknownSubmission,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::SourceMissing(path) => write!(f, "source not found at {path}"),
            FallbackReason::SourceUnreadable(err) => write!(f, "source unreadable: {err}"),
            FallbackReason::SourceEmpty => write!(f, "source contained no rows"),
            FallbackReason::ModelUnavailable(err) => write!(f, "model unavailable: {err}"),
            FallbackReason::NoPersistedResults => write!(f, "no persisted process results"),
            FallbackReason::UnknownSubmission => write!(f, "submission does not exist"),
        }
    }
}
