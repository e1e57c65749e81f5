//! Minimal strata example — timing, header auth, and an echo handler.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/                      → 401, echo never runs
//!   curl -i -H 'x-auth: yes' -d 'hello' http://localhost:3000/   → 200 "hello"

use std::time::Instant;

use http::StatusCode;
use strata::middleware::Chain;
use strata::{Response, ResponseWriter};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut chain = Chain::new();
    chain
        // Registered first, so its after-code runs last and sees the final
        // status and size.
        .add_fn(|req, w, next| Box::pin(async move {
            let started = Instant::now();
            let method = req.method().clone();
            let path = req.path().to_owned();

            next.run(req, w).await;

            if let Some(seen) = w.recorded() {
                info!(%method, %path, status = %seen.status, bytes = seen.size,
                      elapsed = ?started.elapsed(), "request");
            }
        }))
        .add_fn(|req, w, next| Box::pin(async move {
            if req.header("x-auth").is_none() {
                let _ = Response::builder()
                    .status(StatusCode::UNAUTHORIZED)
                    .text("missing x-auth")
                    .write_to(w);
                return;
            }
            next.run(req, w).await;
        }))
        // A plain handler: it has no continuation, the chain moves on by itself.
        .add_handler_fn(|req, w| Box::pin(async move {
            let _ = w.write_all(req.body());
        }));

    chain.listen("0.0.0.0:3000").await.expect("server error");
}
