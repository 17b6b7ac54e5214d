//! Relay hub: connection table, moderation, and fan-out.
//!
//! DESIGN
//! ======
//! One tokio task owns every piece of hub state: the connection table, the
//! moderation list and the store. Websocket handlers talk to it through a
//! bounded command queue and never touch the state directly, so commands are
//! applied strictly one at a time and no lock guards the list.
//!
//! Event handlers are pure business logic: they validate, mutate hub state
//! and return an `Outcome`. Only `apply` sends frames.
//!
//! DELIVERY
//! ========
//! Fan-out is best effort. Each connection has a bounded queue; a full or
//! closed queue drops the frame for that peer only. The sender receives its
//! own broadcast like everyone else.

#[cfg(test)]
#[path = "relay_test.rs"]
mod relay_test;

use std::collections::HashMap;

use protocol::{ClientEvent, ClosingNotice, CommentSubmission, ModerationList, ServerEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::services::moderation::{self, Rejection};
use crate::services::moderation_store::ModerationStore;

// =============================================================================
// COMMANDS
// =============================================================================

/// Work items processed by the hub task, in arrival order.
#[derive(Debug)]
pub enum Command {
    /// Register a connection and send it the current moderation list.
    Connect { client_id: Uuid, tx: mpsc::Sender<ServerEvent> },
    Disconnect { client_id: Uuid },
    Inbound { client_id: Uuid, event: ClientEvent },
    /// Announce a listener move, then release every connection.
    CloseAll { port: u16, done: oneshot::Sender<usize> },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("relay hub is not running")]
pub struct HubClosed;

/// Cloneable handle used by connection tasks and the listener supervisor.
#[derive(Clone, Debug)]
pub struct HubHandle {
    tx: mpsc::Sender<Command>,
}

impl HubHandle {
    /// # Errors
    ///
    /// Returns [`HubClosed`] if the hub task has stopped.
    pub async fn connect(&self, client_id: Uuid, tx: mpsc::Sender<ServerEvent>) -> Result<(), HubClosed> {
        self.send(Command::Connect { client_id, tx }).await
    }

    /// # Errors
    ///
    /// Returns [`HubClosed`] if the hub task has stopped.
    pub async fn disconnect(&self, client_id: Uuid) -> Result<(), HubClosed> {
        self.send(Command::Disconnect { client_id }).await
    }

    /// # Errors
    ///
    /// Returns [`HubClosed`] if the hub task has stopped.
    pub async fn inbound(&self, client_id: Uuid, event: ClientEvent) -> Result<(), HubClosed> {
        self.send(Command::Inbound { client_id, event }).await
    }

    /// Broadcast `server_closing{port}` and drop every connection. Resolves
    /// with the number of connections released once the hub has done so.
    ///
    /// # Errors
    ///
    /// Returns [`HubClosed`] if the hub task has stopped.
    pub async fn close_all(&self, port: u16) -> Result<usize, HubClosed> {
        let (done, released) = oneshot::channel();
        self.send(Command::CloseAll { port, done }).await?;
        released.await.map_err(|_| HubClosed)
    }

    async fn send(&self, command: Command) -> Result<(), HubClosed> {
        self.tx.send(command).await.map_err(|_| HubClosed)
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// What an inbound event resolves to. The dispatch layer does the sending.
#[derive(Debug, PartialEq)]
enum Outcome {
    /// Send to every connection, the sender included.
    Broadcast(ServerEvent),
    /// Drop without telling anyone.
    Suppress(Rejection),
}

// =============================================================================
// HUB
// =============================================================================

pub struct Hub {
    clients: HashMap<Uuid, mpsc::Sender<ServerEvent>>,
    banned: Vec<String>,
    store: Box<dyn ModerationStore>,
}

impl Hub {
    /// A hub starting from `banned` and persisting replacements to `store`.
    #[must_use]
    pub fn new(banned: Vec<String>, store: Box<dyn ModerationStore>) -> Self {
        Self { clients: HashMap::new(), banned, store }
    }

    /// Run the hub on its own task. The task ends once every handle is dropped.
    #[must_use]
    pub fn spawn(self, queue_capacity: usize) -> (HubHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let task = tokio::spawn(self.run(rx));
        (HubHandle { tx }, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        info!(banned = self.banned.len(), "relay hub started");
        while let Some(command) = rx.recv().await {
            self.apply(command).await;
        }
        info!("relay hub stopped");
    }

    async fn apply(&mut self, command: Command) {
        match command {
            Command::Connect { client_id, tx } => {
                let snapshot = ServerEvent::ModerationListSnapshot(ModerationList { words: self.banned.clone() });
                deliver(client_id, &tx, snapshot);
                self.clients.insert(client_id, tx);
                info!(%client_id, clients = self.clients.len(), "hub: client joined");
            }
            Command::Disconnect { client_id } => {
                if self.clients.remove(&client_id).is_some() {
                    info!(%client_id, clients = self.clients.len(), "hub: client left");
                }
            }
            Command::Inbound { client_id, event } => {
                let name = event.name();
                match self.handle_event(event).await {
                    Outcome::Broadcast(out) => {
                        debug!(%client_id, event = name, peers = self.clients.len(), "hub: broadcast");
                        self.broadcast(&out);
                    }
                    Outcome::Suppress(reason) => {
                        debug!(%client_id, event = name, ?reason, "hub: suppressed");
                    }
                }
            }
            Command::CloseAll { port, done } => {
                self.broadcast(&ServerEvent::ServerClosing(ClosingNotice { port }));
                let released = self.clients.len();
                self.clients.clear();
                info!(port, released, "hub: released every connection for listener move");
                if done.send(released).is_err() {
                    debug!("hub: close_all caller went away");
                }
            }
        }
    }

    async fn handle_event(&mut self, event: ClientEvent) -> Outcome {
        match event {
            ClientEvent::SubmitComment(submission) => self.submit_comment(submission),
            ClientEvent::ReplaceModerationList(list) => self.replace_moderation_list(list.words).await,
            ClientEvent::CreateFixed(fields) => Outcome::Broadcast(ServerEvent::CreateFixed(fields)),
            ClientEvent::UpdateFixed(fields) => Outcome::Broadcast(ServerEvent::UpdateFixed(fields)),
            ClientEvent::DeleteFixed(target) => Outcome::Broadcast(ServerEvent::DeleteFixed(target)),
            ClientEvent::CreateShape(fields) => Outcome::Broadcast(ServerEvent::CreateShape(fields)),
            ClientEvent::UpdateShape(fields) => Outcome::Broadcast(ServerEvent::UpdateShape(fields)),
            ClientEvent::DeleteShape(target) => Outcome::Broadcast(ServerEvent::DeleteShape(target)),
            ClientEvent::ClearFixed => Outcome::Broadcast(ServerEvent::ClearFixed),
            ClientEvent::ClearShapes => Outcome::Broadcast(ServerEvent::ClearShapes),
            ClientEvent::ShowIndicator(payload) => Outcome::Broadcast(ServerEvent::ShowIndicator(payload)),
            ClientEvent::HideIndicator => Outcome::Broadcast(ServerEvent::HideIndicator),
        }
    }

    fn submit_comment(&self, submission: CommentSubmission) -> Outcome {
        match moderation::screen(submission.text.as_deref(), &self.banned) {
            Ok(text) => Outcome::Broadcast(ServerEvent::NewComment(CommentSubmission { text: Some(text), ..submission })),
            Err(reason) => Outcome::Suppress(reason),
        }
    }

    async fn replace_moderation_list(&mut self, words: Vec<String>) -> Outcome {
        self.banned = words;
        // A failed write never blocks the replacement or the broadcast.
        if let Err(e) = self.store.save(&self.banned).await {
            error!(error = %e, count = self.banned.len(), "moderation list persist failed");
        } else {
            info!(count = self.banned.len(), "moderation list replaced");
        }
        Outcome::Broadcast(ServerEvent::ModerationListSnapshot(ModerationList { words: self.banned.clone() }))
    }

    fn broadcast(&self, event: &ServerEvent) {
        for (client_id, tx) in &self.clients {
            deliver(*client_id, tx, event.clone());
        }
    }
}

/// Best-effort enqueue for one peer.
fn deliver(client_id: Uuid, tx: &mpsc::Sender<ServerEvent>, event: ServerEvent) {
    if let Err(e) = tx.try_send(event) {
        debug!(%client_id, error = %e, "hub: frame dropped for peer");
    }
}
