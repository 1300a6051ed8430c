//! Mirrors the correspondence lifecycle into the external dialog system.
//!
//! - [`mapper`] builds dialog-creation and activity payloads
//! - [`client`] holds the narrow [`DialogService`] seam and its HTTP
//!   implementation
//! - [`testing`] holds a recording fake of the service
//! - [`coordinator`] drives the service from lifecycle events, using
//!   idempotency keys as external operation ids so replays are absorbed by
//!   the dialog system

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod mapper;
pub mod patch;
pub mod testing;
pub mod text;
pub mod types;

pub use client::{DialogApiClient, DialogService};
pub use config::DialogConfig;
pub use coordinator::DialogLifecycleCoordinator;
pub use mapper::{ActorType, CallbackUrls};
pub use error::{DialogError, DialogResult};
pub use text::{Language, TextType};
pub use types::*;
