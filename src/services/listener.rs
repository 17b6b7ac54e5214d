//! Listener supervisor: owns the one active TCP listener and moves it.
//!
//! DESIGN
//! ======
//! At most one listener accepts connections at any time. A rebind request
//! binds the new port first; only when that succeeds does the supervisor halt
//! the old listener (no new accepts, in-flight requests run on), tell the hub
//! to announce `server_closing` and release every connection, and start
//! serving on the new listener. A failed bind leaves the old listener
//! untouched.
//!
//! Requests arrive over a channel because the HTTP route that asks for a move
//! is itself being served by the listener being replaced: the supervisor
//! replies to that request before waiting for the old server to drain.

#[cfg(test)]
#[path = "listener_test.rs"]
mod listener_test;

use std::net::{IpAddr, SocketAddr};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::services::relay::HubHandle;

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("listener i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("listener supervisor is not running")]
    Stopped,
}

/// Result of a successful rebind request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebind {
    /// The requested port is already being served.
    Unchanged { port: u16 },
    Moved { from: u16, to: u16 },
}

#[derive(Debug)]
pub struct RebindRequest {
    port: u16,
    reply: oneshot::Sender<Result<Rebind, ListenerError>>,
}

/// Cloneable handle for asking the supervisor to move the listener.
#[derive(Clone, Debug)]
pub struct ListenerHandle {
    tx: mpsc::Sender<RebindRequest>,
}

impl ListenerHandle {
    /// A handle plus the request queue to hand to [`Supervisor::run`].
    #[must_use]
    pub fn channel() -> (Self, mpsc::Receiver<RebindRequest>) {
        let (tx, rx) = mpsc::channel(4);
        (Self { tx }, rx)
    }

    /// Move the listener to `port`.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Bind`] if the new port cannot be bound (the
    /// old listener keeps serving) or [`ListenerError::Stopped`] if the
    /// supervisor has exited.
    pub async fn rebind(&self, port: u16) -> Result<Rebind, ListenerError> {
        let (reply, outcome) = oneshot::channel();
        self.tx.send(RebindRequest { port, reply }).await.map_err(|_| ListenerError::Stopped)?;
        outcome.await.map_err(|_| ListenerError::Stopped)?
    }
}

/// One listener being served, with its shutdown trigger.
struct Serving {
    port: u16,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Serving {
    fn start(listener: TcpListener, app: Router) -> Result<Self, ListenerError> {
        let port = listener.local_addr()?.port();
        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let graceful = async move {
                if signal.await.is_err() {
                    debug!("listener shutdown trigger dropped");
                }
            };
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(graceful).await {
                error!(error = %e, port, "listener failed");
            }
        });
        info!(port, "listener serving");
        Ok(Self { port, shutdown: Some(shutdown), task })
    }

    /// Stop accepting new connections. In-flight requests keep running.
    fn halt(&mut self) {
        let Some(shutdown) = self.shutdown.take() else { return };
        if shutdown.send(()).is_err() {
            debug!(port = self.port, "listener already stopped");
        }
    }

    /// Halt, then wait for in-flight requests to finish.
    async fn stop(mut self) {
        self.halt();
        let port = self.port;
        if let Err(e) = self.task.await {
            warn!(port, error = %e, "listener task ended abnormally");
        }
        info!(port, "listener stopped");
    }
}

pub struct Supervisor {
    bind_ip: IpAddr,
    app: Router,
    hub: HubHandle,
}

impl Supervisor {
    #[must_use]
    pub fn new(bind_ip: IpAddr, app: Router, hub: HubHandle) -> Self {
        Self { bind_ip, app, hub }
    }

    /// Serve on `initial` and handle rebind requests until every
    /// [`ListenerHandle`] is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Io`] if a listener's local address cannot be
    /// read.
    pub async fn run(self, initial: TcpListener, mut requests: mpsc::Receiver<RebindRequest>) -> Result<(), ListenerError> {
        let mut current = Serving::start(initial, self.app.clone())?;

        while let Some(RebindRequest { port, reply }) = requests.recv().await {
            if port != 0 && port == current.port {
                respond(reply, Ok(Rebind::Unchanged { port }));
                continue;
            }

            let addr = SocketAddr::new(self.bind_ip, port);
            let next = match TcpListener::bind(addr).await {
                Ok(next) => next,
                Err(source) => {
                    warn!(%addr, error = %source, "rebind failed; keeping current listener");
                    respond(reply, Err(ListenerError::Bind { addr, source }));
                    continue;
                }
            };

            let (from, to) = (current.port, next.local_addr()?.port());
            current.halt();
            match self.hub.close_all(to).await {
                Ok(released) => info!(from, to, released, "connections released for listener move"),
                Err(e) => warn!(error = %e, "hub unavailable during listener move"),
            }
            let next = Serving::start(next, self.app.clone())?;
            let previous = std::mem::replace(&mut current, next);
            respond(reply, Ok(Rebind::Moved { from, to }));
            previous.stop().await;
        }

        current.stop().await;
        Ok(())
    }
}

fn respond(reply: oneshot::Sender<Result<Rebind, ListenerError>>, outcome: Result<Rebind, ListenerError>) {
    if reply.send(outcome).is_err() {
        debug!("rebind requester went away");
    }
}
