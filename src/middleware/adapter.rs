//! Plain handlers as chain links.

use std::fmt;

use super::{Middleware, Next};
use crate::handler::{BoxFuture, Handler};
use crate::request::Request;
use crate::response::ResponseWriter;

/// Runs a [`Handler`], then always continues the chain.
///
/// The handler has no say in whether the chain continues, so a handler that
/// predates chains (or another [`Chain`](super::Chain)) can sit anywhere in
/// one without stalling it.
pub struct FromHandler<H>(H);

impl<H: Handler> FromHandler<H> {
    pub fn new(handler: H) -> Self {
        Self(handler)
    }
}

impl<H: Handler> Middleware for FromHandler<H> {
    fn handle<'a>(
        &'a self,
        req: &'a mut Request,
        w: &'a mut dyn ResponseWriter,
        next: Next<'a>,
    ) -> BoxFuture<'a> {
        Box::pin(async move {
            self.0.serve(req, w).await;
            next.run(req, w).await;
        })
    }
}

impl<H> fmt::Debug for FromHandler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FromHandler")
    }
}
