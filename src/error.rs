//! Unified error type.

use std::fmt;
use std::net::AddrParseError;

/// The error type returned by strata's fallible operations.
///
/// Application-level outcomes (401, 404, etc.) are written to the
/// [`ResponseWriter`](crate::ResponseWriter), not returned as `Error`s. This
/// type surfaces infrastructure failures: parsing an address, binding a port,
/// or trying to serve a chain with nothing in it.
#[derive(Debug)]
pub enum Error {
    /// Binding or listening failed (e.g. address already in use).
    Io(std::io::Error),
    /// The address passed to [`Server::bind`](crate::Server::bind) is not a
    /// valid `host:port`.
    Addr(AddrParseError),
    /// [`Chain::listen`](crate::middleware::Chain::listen) was called before
    /// any middleware was registered.
    EmptyChain,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e)    => write!(f, "io: {e}"),
            Self::Addr(e)  => write!(f, "invalid socket address: {e}"),
            Self::EmptyChain => f.write_str("middleware chain is empty"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e)   => Some(e),
            Self::Addr(e) => Some(e),
            Self::EmptyChain => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<AddrParseError> for Error {
    fn from(e: AddrParseError) -> Self {
        Self::Addr(e)
    }
}
