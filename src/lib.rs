//! Hosts an in-process metrics [`Collector`](collector::Collector) as a network
//! service.
//!
//! ## Architecture
//!
//! - **Model (`model`)**: namespaces, metric types and configuration maps shared
//!   by every other module.
//! - **Policy (`cpolicy`)**: declarative, namespace-scoped configuration rules
//!   published by collectors.
//! - **Session (`session`)**: transport-agnostic lifecycle, heartbeat watchdog and
//!   kill switch for one hosted collector.
//! - **Legacy transport (`legacy`)**: tarpc service carrying payloads encoded by a
//!   pluggable [`Encoder`](encoding::Encoder).
//! - **Modern transport (`grpc`)**: the `rpc.Collector` gRPC service.
//! - **Host (`host`)**: binds a session, announces the port and serves one
//!   transport until the session terminates.

pub mod collector;
pub mod cpolicy;
pub mod demo;
pub mod encoding;
pub mod grpc;
pub mod host;
pub mod legacy;
pub mod model;
pub mod rpc;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

/// Git commit the binary was built from.
pub const BUILD_SHA: &str = env!("COLLECTOR_PROXY_GIT_SHA");
