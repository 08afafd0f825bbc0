use std::fmt;
use std::time::Duration;

use crate::types::UnitKind;

#[derive(Debug)]
pub enum Error {
    InvalidDuration { kind: DurationKind, requested: Duration },
    UnsupportedIntentForKind { kind: UnitKind, intent: String },
    UnitDisabled(String),
    UnknownUnit(String),
    UnitRequired(&'static str),
    InvalidTemperature(f64),
    InvalidDateRange { start: chrono::NaiveDate, end: chrono::NaiveDate },
    MutationRejected { index: usize, reason: String },
    NoSnapshot,
    Json(serde_json::Error),
    Io(std::io::Error),
}

/// What a rejected duration was meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationKind {
    QuickVeto(UnitKind),
    QuickMode,
}

impl fmt::Display for DurationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationKind::QuickVeto(kind) => write!(f, "{kind} quick veto"),
            DurationKind::QuickMode => write!(f, "quick mode"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDuration { kind, requested } => {
                write!(f, "invalid {kind} duration: {}s", requested.as_secs())
            }
            Error::UnsupportedIntentForKind { kind, intent } => {
                write!(f, "{intent} is not supported for {kind}")
            }
            Error::UnitDisabled(id) => write!(f, "unit is disabled: {id}"),
            Error::UnknownUnit(id) => write!(f, "unknown unit: {id}"),
            Error::UnitRequired(intent) => write!(f, "{intent} needs a target unit"),
            Error::InvalidTemperature(t) => write!(f, "temperature out of range: {t}"),
            Error::InvalidDateRange { start, end } => {
                write!(f, "end date {end} is before start date {start}")
            }
            Error::MutationRejected { index, reason } => {
                write!(f, "mutation #{index} rejected: {reason}")
            }
            Error::NoSnapshot => write!(f, "no snapshot ingested yet"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
