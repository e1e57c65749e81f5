//! Middleware chains.
//!
//! A middleware sees the request and the response sink, and gets a [`Next`]
//! it may run to hand control to the rest of the chain. Code before
//! `next.run(..)` runs on the way in, code after it on the way out:
//!
//! ```text
//! request ─▶ timing ─▶ auth ─▶ echo
//!                                │
//! response ◀─ timing ◀─ auth ◀───┘
//! ```
//!
//! A middleware that never runs `next` ends the chain for that request. The
//! links behind it never execute, while the links in front of it still get
//! their way-out code.
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use strata::middleware::Chain;
//! use strata::{Response, ResponseWriter};
//!
//! # async fn run() -> Result<(), strata::Error> {
//! let mut chain = Chain::new();
//! chain
//!     .add_fn(|req, w, next| Box::pin(async move {
//!         let started = std::time::Instant::now();
//!         next.run(req, w).await;
//!         let seen = w.recorded().expect("chain records responses by default");
//!         tracing::info!(status = %seen.status, bytes = seen.size, elapsed = ?started.elapsed());
//!     }))
//!     .add_fn(|req, w, next| Box::pin(async move {
//!         if req.header("x-auth").is_none() {
//!             let _ = Response::status(StatusCode::UNAUTHORIZED).write_to(w);
//!             return;
//!         }
//!         next.run(req, w).await;
//!     }))
//!     .add_handler_fn(|req, w| Box::pin(async move {
//!         let _ = w.write_all(req.body());
//!     }));
//!
//! chain.listen("0.0.0.0:3000").await
//! # }
//! ```

mod adapter;
mod chain;
mod observe;

use std::fmt;

use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::ResponseWriter;

pub use adapter::FromHandler;
pub use chain::Chain;
pub use observe::{ObservedWriter, Recorded};

/// One link of a [`Chain`].
///
/// ```rust
/// use strata::middleware::{Middleware, Next};
/// use strata::{BoxFuture, Request, ResponseWriter};
///
/// struct RequestId;
///
/// impl Middleware for RequestId {
///     fn handle<'a>(
///         &'a self,
///         req: &'a mut Request,
///         w: &'a mut dyn ResponseWriter,
///         next: Next<'a>,
///     ) -> BoxFuture<'a> {
///         Box::pin(async move {
///             w.headers_mut().insert("x-request-id", http::HeaderValue::from_static("1"));
///             next.run(req, w).await;
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(
        &'a self,
        req: &'a mut Request,
        w: &'a mut dyn ResponseWriter,
        next: Next<'a>,
    ) -> BoxFuture<'a>;
}

impl Middleware for Box<dyn Middleware> {
    fn handle<'a>(
        &'a self,
        req: &'a mut Request,
        w: &'a mut dyn ResponseWriter,
        next: Next<'a>,
    ) -> BoxFuture<'a> {
        (**self).handle(req, w, next)
    }
}

/// Adapts a closure that takes a continuation into a [`Middleware`].
pub struct MiddlewareFn<F>(F);

impl<F> MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut dyn ResponseWriter, Next<'a>) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Middleware for MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut dyn ResponseWriter, Next<'a>) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    fn handle<'a>(
        &'a self,
        req: &'a mut Request,
        w: &'a mut dyn ResponseWriter,
        next: Next<'a>,
    ) -> BoxFuture<'a> {
        (self.0)(req, w, next)
    }
}

impl<F> fmt::Debug for MiddlewareFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MiddlewareFn")
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of the chain, from the current middleware's point of view.
///
/// `Next` is a cursor into the chain's links. [`run`](Next::run) consumes it,
/// so a middleware can continue the chain at most once. Dropping it without
/// running it short-circuits the request.
pub struct Next<'a> {
    links: &'a [Box<dyn Middleware>],
    index: usize,
}

impl<'a> Next<'a> {
    pub(crate) fn new(links: &'a [Box<dyn Middleware>]) -> Self {
        Self { links, index: 0 }
    }

    /// Runs the next link with the same request and sink. Past the last link
    /// this does nothing.
    pub async fn run(self, req: &mut Request, w: &mut dyn ResponseWriter) {
        if let Some(link) = self.links.get(self.index) {
            let rest = Next { links: self.links, index: self.index + 1 };
            link.handle(req, w, rest).await;
        }
    }

    /// Number of links that would still run after this point.
    pub fn remaining(&self) -> usize {
        self.links.len().saturating_sub(self.index)
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("remaining", &self.remaining())
            .finish()
    }
}
