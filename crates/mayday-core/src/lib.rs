// SOS Call Coordination
//
// This crate provides the storage-agnostic core of the Mayday service: the
// lifecycle state machine for SOS events, the concurrency rules around
// claiming a call, and the real-time fanout to admin consoles and stations.
//
// Key design decisions:
// - The coordinator reaches durable storage only through the SosStore trait,
//   whose guarded operations each map to one atomic conditional update
// - The Notifier is constructed at boot and injected; publishing is a
//   non-blocking send that can never fail or delay a transition
// - Room names are derived from event ids, never stored
// - Domain entity types (SosEvent, SosStatus) are defined here for shared
//   use by the API and storage crates

pub mod coordinator;
pub mod error;
pub mod notifications;
pub mod notifier;
pub mod sos;
pub mod traits;

// In-memory implementation for dev mode and testing
pub mod memory;

// Re-exports for convenience
pub use coordinator::{SosAccepted, SosBoard, SosCoordinator, SosCreated, DEFAULT_HISTORY_LIMIT};
pub use error::{Result, SosError};
pub use memory::InMemorySosStore;
pub use notifications::SosNotification;
pub use notifier::{Notifier, DEFAULT_CHANNEL_CAPACITY};
pub use sos::{room_name_for, CreateSos, ListOrder, SosEvent, SosStatus};
pub use traits::SosStore;
