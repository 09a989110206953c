//! Run the stub API on a background thread inside another process (client
//! integration tests, `fdesk --demo`).

use crate::seed::demo_store;
use crate::{resolve_bind_address, serve_router, AppState, Config};
use std::{
    io,
    net::SocketAddr,
    sync::mpsc,
    thread::{self, JoinHandle},
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Bound address plus whether the auto-port fallback was taken.
type Bound = (SocketAddr, bool);

const EXITED_BEFORE_BIND: &str = "embedded server thread exited before binding";

/// Handle to a stub API running on its own thread and runtime.
///
/// Dropping the handle shuts the server down and joins the thread.
pub struct EmbeddedServer {
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
    addr: SocketAddr,
    used_fallback: bool,
}

/// Bind `addr`, or an auto-assigned port on the same interface when `addr`
/// is taken.
async fn bind_with_fallback(addr: SocketAddr) -> io::Result<(TcpListener, bool)> {
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, false)),
        Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
            warn!("{} is in use; binding an auto-assigned port", addr);
            let listener = TcpListener::bind(SocketAddr::new(addr.ip(), 0)).await?;
            Ok((listener, true))
        }
        Err(err) => Err(err),
    }
}

fn run_server(
    state: AppState,
    allow_public: bool,
    ready: mpsc::Sender<io::Result<Bound>>,
    shutdown: oneshot::Receiver<()>,
) {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };

    let requested = resolve_bind_address(&state.config, allow_public);
    let (listener, used_fallback) = match rt.block_on(bind_with_fallback(requested)) {
        Ok(bound) => bound,
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };
    let addr = listener.local_addr().unwrap_or(requested);
    info!("stub API listening on http://{}", addr);
    let _ = ready.send(Ok((addr, used_fallback)));

    let stop = async {
        let _ = shutdown.await;
    };
    if let Err(err) = rt.block_on(serve_router(listener, state, allow_public, stop)) {
        warn!("embedded server error: {}", err);
    }
}

impl EmbeddedServer {
    /// Start the API server on a background thread.
    ///
    /// The server binds to `BIND` or `127.0.0.1:PORT` from the state's config.
    /// If that address is in use it falls back to an auto-assigned port.
    ///
    /// # Errors
    /// Returns an error if the runtime or server socket cannot be created.
    pub fn start(state: AppState, allow_public: bool) -> io::Result<Self> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("finesdesk-embedded-server".into())
            .spawn(move || run_server(state, allow_public, ready_tx, shutdown_rx))?;

        let bound = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(io::Error::other(EXITED_BEFORE_BIND)));
        let mut server = Self {
            shutdown: Some(shutdown_tx),
            thread: Some(handle),
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            used_fallback: false,
        };
        // On error, dropping `server` stops and joins the thread.
        let (addr, used_fallback) = bound?;
        server.addr = addr;
        server.used_fallback = used_fallback;
        Ok(server)
    }

    /// Start a loopback server on an auto-assigned port, seeded with
    /// [`demo_store`] data.
    ///
    /// # Errors
    /// Returns an error if seeding fails or the server cannot start.
    pub fn demo(seed: u64) -> io::Result<Self> {
        let store = demo_store(seed).map_err(io::Error::other)?;
        let config = Config {
            port: 0,
            ..Config::default()
        };
        Self::start(AppState::new(config, store), false)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL a client should be pointed at.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Whether the requested bind address was in use and an auto port was used.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }
}

impl Drop for EmbeddedServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
