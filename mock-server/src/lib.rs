//! Scripted fakes of the services the test automation talks to.
//!
//! - `FakeTestRail` answers TestRail API v2 calls from in-memory state and
//!   records every request it sees.
//! - `omdb::router` serves a fixed movie catalogue in OMDb's format.
//!
//! Blocking tests start a fake with `spawn`, which serves a router on a
//! background thread and returns the bound address.

pub mod omdb;
pub mod testrail;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

pub use testrail::{CapturedRequest, FakeTestRail, RecordedResult, StoredAttachment};

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

/// Serve `app` on a random local port from a dedicated thread.
///
/// The server lives until the process exits.
pub fn spawn(app: Router) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let addr = std_listener.local_addr().expect("mock server address");
    std_listener
        .set_nonblocking(true)
        .expect("non-blocking mock listener");

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("mock server runtime");
        rt.block_on(async {
            let listener = TcpListener::from_std(std_listener)?;
            run(listener, app).await
        })
        .expect("mock server stopped");
    });

    addr
}
