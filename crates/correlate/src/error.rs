//! Correlation errors.

use thiserror::Error;

/// The multiplexer owning a pending request was dropped before its reply arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("correlated request abandoned: multiplexer dropped before reply")]
pub struct Disconnected;
