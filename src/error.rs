// src/error.rs
//! Outcome taxonomy for a single analysis submission.
//!
//! Every variant is terminal for the submission that produced it; none are retried.
//! `Display` is the text shown in the (auto-expiring) message slot.

use std::time::Duration;

use thiserror::Error;

pub const EMPTY_SUBJECT_MESSAGE: &str = "Please enter the name of a bank.";
pub const TRANSPORT_MESSAGE: &str = "Failed to fetch sentiment analysis.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Rejected locally; never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// The client-side deadline fired before a response arrived.
    #[error("Request timed out after {}.", human_secs(.0))]
    Timeout(Duration),

    /// Network failure, non-2xx status or an unparseable body. The detail is for logs only.
    #[error("Failed to fetch sentiment analysis.")]
    Transport(String),

    /// Well-formed `{ "error": ... }` payload from the service.
    #[error("{0}")]
    Service(String),
}

/// Coarse classification, used for metrics labels and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Timeout,
    Transport,
    Service,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Transport => "transport",
            ErrorKind::Service => "service",
        }
    }
}

impl AnalysisError {
    pub fn empty_subject() -> Self {
        AnalysisError::Validation(EMPTY_SUBJECT_MESSAGE.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Validation(_) => ErrorKind::Validation,
            AnalysisError::Timeout(_) => ErrorKind::Timeout,
            AnalysisError::Transport(_) => ErrorKind::Transport,
            AnalysisError::Service(_) => ErrorKind::Service,
        }
    }

    /// Underlying cause for transport failures (not part of the user-facing message).
    pub fn detail(&self) -> Option<&str> {
        match self {
            AnalysisError::Transport(d) => Some(d.as_str()),
            _ => None,
        }
    }
}

fn human_secs(d: &Duration) -> String {
    let secs = d.as_secs_f64();
    if d.subsec_millis() == 0 {
        let whole = d.as_secs();
        if whole == 1 {
            "1 second".to_string()
        } else {
            format!("{whole} seconds")
        }
    } else {
        format!("{secs:.1} seconds")
    }
}
