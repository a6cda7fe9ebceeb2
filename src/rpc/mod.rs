//! Wire contracts shared by the transports.
//!
//! - [`legacy_service`]: the tarpc `LegacyCollector` service and the serde
//!   structs its byte payloads carry.
//! - [`ProxyError`]: what a call reports back when it fails.

pub mod legacy_service;

use crate::encoding::EncodingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three collector operations exposed by every transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    GetMetricTypes,
    CollectMetrics,
    GetConfigPolicy,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::GetMetricTypes => write!(f, "GetMetricTypes"),
            Operation::CollectMetrics => write!(f, "CollectMetrics"),
            Operation::GetConfigPolicy => write!(f, "GetConfigPolicy"),
        }
    }
}

/// Errors returned by proxy RPC methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyError {
    /// The collector itself failed; `message` is its error text, verbatim.
    Collector { operation: Operation, message: String },
    /// The payload could not be decoded, or the reply could not be encoded.
    Encoding(EncodingError),
    /// The connection has not presented the session token.
    AuthenticationFailed,
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::Collector { operation, message } => {
                write!(f, "{} call error : {}", operation, message)
            }
            ProxyError::Encoding(e) => write!(f, "{}", e),
            ProxyError::AuthenticationFailed => write!(f, "Authentication failed"),
        }
    }
}

impl std::error::Error for ProxyError {}

impl From<EncodingError> for ProxyError {
    fn from(e: EncodingError) -> Self {
        ProxyError::Encoding(e)
    }
}

/// Result type for proxy RPC methods.
pub type ProxyResult<T> = Result<T, ProxyError>;

#[cfg(test)]
#[path = "tests/proxy_error_tests.rs"]
mod proxy_error_tests;
