//! # strata
//!
//! Onion-style middleware chains for HTTP services.
//!
//! A [`Chain`](middleware::Chain) is an ordered list of middleware. Each
//! link can inspect or modify the request and response, do work before and
//! after the rest of the chain, or end the request right there. The chain
//! is itself a [`Handler`], so it can be served directly or nested inside
//! another chain.
//!
//! What strata deliberately leaves to you or to the proxy in front of it:
//!
//! - **Routing** — put a router inside a handler if you need one
//! - **TLS termination** — nginx / ingress
//! - **Built-in middleware** — logging, auth, and compression are a few
//!   lines of [`add_fn`](middleware::Chain::add_fn) each
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use strata::middleware::Chain;
//! use strata::{Response, ResponseWriter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut chain = Chain::new();
//!     chain
//!         .add_fn(|req, w, next| Box::pin(async move {
//!             next.run(req, w).await;
//!             if let Some(seen) = w.recorded() {
//!                 tracing::info!(status = %seen.status, bytes = seen.size, "done");
//!             }
//!         }))
//!         .add_fn(|req, w, next| Box::pin(async move {
//!             if req.header("x-auth").is_none() {
//!                 let _ = Response::status(StatusCode::UNAUTHORIZED).write_to(w);
//!                 return;
//!             }
//!             next.run(req, w).await;
//!         }))
//!         .add_handler_fn(|req, w| Box::pin(async move {
//!             let _ = w.write_all(req.body());
//!         }));
//!
//!     chain.listen("0.0.0.0:3000").await.unwrap();
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod middleware;

pub use error::Error;
pub use handler::{BoxFuture, Handler, HandlerFn};
pub use request::Request;
pub use response::{ContentType, Response, ResponseBuffer, ResponseBuilder, ResponseWriter};
pub use server::Server;
