//! The chain container.

use std::fmt;

use tracing::debug;

use super::{FromHandler, Middleware, MiddlewareFn, Next, ObservedWriter};
use crate::error::Error;
use crate::handler::{BoxFuture, Handler, HandlerFn};
use crate::request::Request;
use crate::response::ResponseWriter;
use crate::server::Server;

/// An ordered, append-only list of middleware that is itself a [`Handler`].
///
/// Links run in registration order. Build the chain once at startup; it is
/// shared read-only by every request afterwards, so registration takes
/// `&mut self` and is over before the chain can be served.
///
/// By default each request's sink is wrapped in an [`ObservedWriter`] so
/// that any link can read the final status and byte count through
/// [`ResponseWriter::recorded`]. Turn it off with
/// [`record_responses(false)`](Chain::record_responses).
///
/// Serving an empty chain does nothing: the sink is left as it was, which
/// [`Server`] sends as an empty `200 OK`.
pub struct Chain {
    links: Vec<Box<dyn Middleware>>,
    record: bool,
}

impl Chain {
    pub fn new() -> Self {
        Self { links: Vec::new(), record: true }
    }

    /// Appends a middleware as the new last link.
    pub fn add(&mut self, middleware: impl Middleware) -> &mut Self {
        self.links.push(Box::new(middleware));
        self
    }

    /// Appends a closure that receives the continuation.
    pub fn add_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Request, &'a mut dyn ResponseWriter, Next<'a>) -> BoxFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.add(MiddlewareFn::new(f))
    }

    /// Appends a plain [`Handler`]. The chain always continues once the
    /// handler returns.
    pub fn add_handler(&mut self, handler: impl Handler) -> &mut Self {
        self.add(FromHandler::new(handler))
    }

    /// Appends a plain handler closure. The chain always continues once it
    /// returns.
    pub fn add_handler_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Request, &'a mut dyn ResponseWriter) -> BoxFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.add_handler(HandlerFn::new(f))
    }

    /// Whether to wrap each request's sink in an [`ObservedWriter`].
    pub fn record_responses(&mut self, on: bool) -> &mut Self {
        self.record = on;
        self
    }

    pub fn len(&self) -> usize { self.links.len() }
    pub fn is_empty(&self) -> bool { self.links.is_empty() }

    /// Serves this chain on `addr` until SIGTERM or Ctrl-C.
    ///
    /// Shorthand for `Server::bind(addr).serve(chain)`, except that an empty
    /// chain is refused with [`Error::EmptyChain`] before anything is bound.
    pub async fn listen(self, addr: impl Into<String>) -> Result<(), Error> {
        if self.is_empty() {
            return Err(Error::EmptyChain);
        }
        Server::bind(addr).serve(self).await
    }
}

impl Default for Chain {
    fn default() -> Self { Self::new() }
}

impl Handler for Chain {
    fn serve<'a>(&'a self, req: &'a mut Request, w: &'a mut dyn ResponseWriter) -> BoxFuture<'a> {
        Box::pin(async move {
            if self.links.is_empty() {
                debug!(path = req.path(), "empty middleware chain, nothing to run");
                return;
            }

            // A nested chain reuses the recording its parent already set up.
            if self.record && w.recorded().is_none() {
                let mut observed = ObservedWriter::new(w);
                Next::new(&self.links).run(req, &mut observed).await;
            } else {
                Next::new(&self.links).run(req, w).await;
            }
        })
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("links", &self.links.len())
            .field("record", &self.record)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::response::{Response, ResponseBuffer};

    type Log = Arc<Mutex<Vec<String>>>;

    fn request() -> Request {
        Request::from(http::Request::new(Bytes::new()))
    }

    /// Logs `pre N` and `post N` around its continuation.
    struct Around {
        name: usize,
        log: Log,
    }

    impl Middleware for Around {
        fn handle<'a>(
            &'a self,
            req: &'a mut Request,
            w: &'a mut dyn ResponseWriter,
            next: Next<'a>,
        ) -> BoxFuture<'a> {
            Box::pin(async move {
                self.log.lock().unwrap().push(format!("pre {}", self.name));
                next.run(req, w).await;
                self.log.lock().unwrap().push(format!("post {}", self.name));
            })
        }
    }

    /// Logs `pre N` and `post N` but never continues.
    struct Stop {
        name: usize,
        log: Log,
    }

    impl Middleware for Stop {
        fn handle<'a>(
            &'a self,
            _req: &'a mut Request,
            w: &'a mut dyn ResponseWriter,
            _next: Next<'a>,
        ) -> BoxFuture<'a> {
            Box::pin(async move {
                self.log.lock().unwrap().push(format!("pre {}", self.name));
                w.write_header(StatusCode::FORBIDDEN);
                self.log.lock().unwrap().push(format!("post {}", self.name));
            })
        }
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn links_nest_like_an_onion() {
        let log = Log::default();
        let mut chain = Chain::new();
        for name in 1..=4 {
            chain.add(Around { name, log: Arc::clone(&log) });
        }

        chain.serve(&mut request(), &mut ResponseBuffer::new()).await;

        assert_eq!(
            entries(&log),
            ["pre 1", "pre 2", "pre 3", "pre 4", "post 4", "post 3", "post 2", "post 1"],
        );
    }

    #[tokio::test]
    async fn short_circuit_skips_the_rest_but_unwinds_the_front() {
        let log = Log::default();
        let mut chain = Chain::new();
        chain
            .add(Around { name: 1, log: Arc::clone(&log) })
            .add(Stop { name: 2, log: Arc::clone(&log) })
            .add(Around { name: 3, log: Arc::clone(&log) });

        let mut out = ResponseBuffer::new();
        chain.serve(&mut request(), &mut out).await;

        assert_eq!(entries(&log), ["pre 1", "pre 2", "post 2", "post 1"]);
        assert_eq!(out.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn traversal_follows_registration_order() {
        let log = Log::default();
        let mut chain = Chain::new();
        assert!(chain.is_empty());

        for name in [7, 3, 5] {
            let log = Arc::clone(&log);
            chain.add_handler_fn(move |_req, _w| {
                let log = Arc::clone(&log);
                Box::pin(async move { log.lock().unwrap().push(name.to_string()) })
            });
        }
        assert_eq!(chain.len(), 3);

        chain.serve(&mut request(), &mut ResponseBuffer::new()).await;
        assert_eq!(entries(&log), ["7", "3", "5"]);
    }

    #[tokio::test]
    async fn empty_chain_leaves_the_sink_untouched() {
        let chain = Chain::default();
        let mut out = ResponseBuffer::new();
        chain.serve(&mut request(), &mut out).await;

        assert_eq!(out.status(), StatusCode::OK);
        assert!(out.body().is_empty());
    }

    #[tokio::test]
    async fn empty_chain_refuses_to_listen() {
        let err = Chain::new().listen("127.0.0.1:0").await.unwrap_err();
        assert!(matches!(err, Error::EmptyChain));
    }

    #[tokio::test]
    async fn outer_links_see_what_inner_links_wrote() {
        let seen = Arc::new(Mutex::new(None));

        let mut chain = Chain::new();
        let s = Arc::clone(&seen);
        chain.add_fn(move |req, w, next| {
            let s = Arc::clone(&s);
            Box::pin(async move {
                next.run(req, w).await;
                *s.lock().unwrap() = w.recorded();
            })
        });
        chain.add_handler_fn(|_req, w| Box::pin(async move {
            let _ = Response::builder()
                .status(StatusCode::NOT_FOUND)
                .text("missing")
                .write_to(w);
        }));

        let mut out = ResponseBuffer::new();
        chain.serve(&mut request(), &mut out).await;

        let seen = seen.lock().unwrap().expect("recorded");
        assert_eq!(seen.status, StatusCode::NOT_FOUND);
        assert_eq!(seen.size, "missing".len());
        assert_eq!(out.body(), b"missing");
    }

    #[tokio::test]
    async fn recording_can_be_turned_off() {
        let seen = Arc::new(Mutex::new(None));

        let mut chain = Chain::new();
        chain.record_responses(false);
        let s = Arc::clone(&seen);
        chain.add_fn(move |req, w, next| {
            let s = Arc::clone(&s);
            Box::pin(async move {
                next.run(req, w).await;
                *s.lock().unwrap() = Some(w.recorded());
            })
        });

        chain.serve(&mut request(), &mut ResponseBuffer::new()).await;
        assert_eq!(*seen.lock().unwrap(), Some(None));
    }

    #[tokio::test]
    async fn links_can_rewrite_the_request_for_later_links() {
        let mut chain = Chain::new();
        chain
            .add_fn(|req, w, next| Box::pin(async move {
                let upper = req.body().to_ascii_uppercase();
                req.set_body(upper);
                next.run(req, w).await;
            }))
            .add_handler_fn(|req, w| Box::pin(async move {
                let _ = w.write_all(req.body());
            }));

        let mut req = Request::from(http::Request::new(Bytes::from_static(b"shout")));
        let mut out = ResponseBuffer::new();
        chain.serve(&mut req, &mut out).await;

        assert_eq!(out.body(), b"SHOUT");
    }

    #[tokio::test]
    async fn boxed_middleware_can_be_registered() {
        let log = Log::default();
        let picked: Vec<Box<dyn Middleware>> = vec![
            Box::new(Around { name: 1, log: Arc::clone(&log) }),
            Box::new(Stop { name: 2, log: Arc::clone(&log) }),
        ];

        let mut chain = Chain::new();
        for m in picked {
            chain.add(m);
        }
        chain.add(Around { name: 3, log: Arc::clone(&log) });

        let mut out = ResponseBuffer::new();
        chain.serve(&mut request(), &mut out).await;

        assert_eq!(entries(&log), ["pre 1", "pre 2", "post 2", "post 1"]);
        assert_eq!(out.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn next_reports_what_is_left() {
        let links: Vec<Box<dyn Middleware>> = vec![
            Box::new(MiddlewareFn::new(|req, w, next| Box::pin(next.run(req, w)))),
        ];
        let next = Next::new(&links);
        assert_eq!(next.remaining(), 1);
        assert_eq!(format!("{next:?}"), "Next { index: 0, remaining: 1 }");
    }
}
