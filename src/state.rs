//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds handles only: hub state lives on the hub task and the listener lives
//! on the supervisor task, so cloning the state is cheap and lock-free.

use crate::services::listener::ListenerHandle;
use crate::services::relay::HubHandle;

#[derive(Clone, Debug)]
pub struct AppState {
    pub hub: HubHandle,
    pub listener: ListenerHandle,
    /// Capacity of each connection's outbound queue.
    pub client_queue_capacity: usize,
}

impl AppState {
    #[must_use]
    pub fn new(hub: HubHandle, listener: ListenerHandle, client_queue_capacity: usize) -> Self {
        Self { hub, listener, client_queue_capacity }
    }
}
