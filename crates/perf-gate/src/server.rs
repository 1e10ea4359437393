//! Static file server for the document under audit
//!
//! Serves a document root over local HTTP for the duration of one audit run.
//! The handle is consumed by [`StaticServer::stop`], so a server cannot be
//! stopped twice and a stopped server's port is guaranteed to be released.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// A running static file server bound to a local port
pub struct StaticServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl StaticServer {
    /// Bind the port and start serving `root`
    ///
    /// Passing port 0 binds an ephemeral port; [`StaticServer::addr`] reports
    /// the actual address.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound, e.g. when it is already
    /// in use.
    pub async fn start(root: &Path, port: u16) -> Result<Self> {
        let app = Router::new()
            .fallback_service(ServeDir::new(root))
            .layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port)))
            .await
            .with_context(|| format!("Failed to bind port {port}"))?;
        let addr = listener.local_addr().context("Failed to read bound address")?;

        let (shutdown, rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
        });

        info!("Serving {} on http://{}", root.display(), addr);
        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    /// The address the server is bound to
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop the server and wait for the port to be released
    ///
    /// Best-effort: shutdown problems are logged, never propagated, so the
    /// caller's own outcome survives cleanup.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(Ok(())) => info!("Server on {} stopped", self.addr),
            Ok(Err(e)) => warn!("Server on {} exited with error: {}", self.addr, e),
            Err(e) => warn!("Server task for {} panicked: {}", self.addr, e),
        }
    }
}
