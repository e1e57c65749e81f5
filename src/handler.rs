//! The "handle one request" capability.
//!
//! A [`Handler`] is anything that can answer a request by writing into a
//! [`ResponseWriter`]. It knows nothing about chains. [`Server`](crate::Server)
//! calls one per request, and [`Chain`](crate::middleware::Chain) both *is*
//! one and can hold them (through [`add_handler`](crate::middleware::Chain::add_handler)).
//!
//! # Why the boxed future
//!
//! Chains store many different handler and middleware types in one `Vec`,
//! so every call goes through a trait object. A trait object cannot return
//! `impl Future`, so the future is boxed:
//!
//! ```text
//! handler.serve(&mut req, &mut w)           ← one vtable dispatch
//!        ↓
//! Box::pin(async move { … })               ← BoxFuture<'a>
//! ```
//!
//! The future borrows the request and the sink for `'a`, which is what lets
//! every link in a chain work on the same pair without cloning either.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::request::Request;
use crate::response::ResponseWriter;

/// A heap-allocated, type-erased future borrowing the request for `'a`.
///
/// `Send` lets tokio move the connection task across worker threads.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Answers one request.
///
/// Implement it on your own types, or wrap a closure in [`HandlerFn`]:
///
/// ```rust
/// use strata::{BoxFuture, Handler, Request, Response, ResponseWriter};
///
/// struct Hello;
///
/// impl Handler for Hello {
///     fn serve<'a>(&'a self, _req: &'a mut Request, w: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
///         Box::pin(async move {
///             let _ = Response::text("hello").write_to(w);
///         })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn serve<'a>(&'a self, req: &'a mut Request, w: &'a mut dyn ResponseWriter) -> BoxFuture<'a>;
}

/// Adapts a closure into a [`Handler`].
///
/// ```rust
/// use strata::{HandlerFn, Response};
///
/// let hello = HandlerFn::new(|_req, w| Box::pin(async move {
///     let _ = Response::text("hello").write_to(w);
/// }));
/// ```
pub struct HandlerFn<F>(F);

impl<F> HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut dyn ResponseWriter) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    /// Wraps `f` so it can be served or added to a chain.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut dyn ResponseWriter) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    fn serve<'a>(&'a self, req: &'a mut Request, w: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        (self.0)(req, w)
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerFn")
    }
}
