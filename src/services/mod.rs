//! Hub services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the relay rules, the moderation list and the listener
//! so route handlers stay focused on protocol translation.

pub mod listener;
pub mod moderation;
pub mod moderation_store;
pub mod relay;
