//! Live-socket helpers for exercising the bundled client and server.

use std::{net::SocketAddr, time::Duration};

use sockd::{Config, Listener, Server};
use tokio::{sync::oneshot, task::JoinHandle, time::timeout};

/// A server accepting on an ephemeral loopback port in the background.
///
/// Tests dial it through [`ServerHarness::url`] and tear it down with
/// [`ServerHarness::stop`], which resolves once the accept loop has
/// drained every connection task.
pub struct ServerHarness {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ServerHarness {
    /// Bind on `127.0.0.1:0` and run the accept loop in the background.
    ///
    /// # Panics
    ///
    /// Panics when the bind fails; loopback binds only fail when the
    /// host is misconfigured.
    pub async fn start(listener: impl Listener, config: Option<Config>) -> Self {
        let mut builder = Server::builder("127.0.0.1:0").listener(listener);
        if let Some(config) = config {
            builder = builder.config(config);
        }
        let server = builder.bind().await.expect("server binds");
        let addr = server.local_addr().expect("bound address is known");
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run_until(async move {
            let _ = stopped.await;
        }));
        Self { addr, stop, handle }
    }

    /// Address the server is accepting on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr { self.addr }

    /// Connection URL with `path_and_query` appended.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("ws://{}{path_and_query}", self.addr)
    }

    /// Fire the shutdown future and wait for the accept loop to drain.
    ///
    /// # Panics
    ///
    /// Panics when the server has not stopped within two seconds.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        timeout(Duration::from_secs(2), self.handle)
            .await
            .expect("server stops in time")
            .expect("server task does not panic");
    }
}
