//! Modern transport: the `rpc.Collector` gRPC service.
//!
//! Service stubs are generated at build time (see `build.rs`); the messages
//! live in [`messages`] and translate to the domain model in [`convert`].

pub mod convert;
pub mod messages;
pub mod proxy;

include!(concat!(env!("OUT_DIR"), "/rpc.Collector.rs"));

pub use convert::ConversionError;
pub use proxy::{serve_grpc, GrpcProxy, AUTHORIZATION_HEADER, BEARER_PREFIX};

#[cfg(test)]
#[path = "tests/convert_tests.rs"]
mod convert_tests;

#[cfg(test)]
#[path = "tests/grpc_tests.rs"]
mod grpc_tests;
