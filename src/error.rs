//! Unified error type.

use std::net::AddrParseError;

/// The error type returned by the crate's fallible operations.
///
/// Application-level errors (401, 404, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, and middleware failures travel in
/// whatever response type the chain uses. This type only surfaces
/// infrastructure failures: parsing the listen address, binding the port,
/// accepting a connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },
}
