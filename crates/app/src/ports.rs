//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the engine core and the outside world.
//! They are defined here (in `app`) so that both the engine and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod callback;
pub mod event_bus;
pub mod notifier;
pub mod sensing;
pub mod zone_store;

pub use callback::{CallbackRequest, CallbackTransport};
pub use event_bus::EventPublisher;
pub use notifier::{NotificationRequest, NotificationScheduler};
pub use sensing::{SensingSource, SensorKind, SensorSample};
pub use zone_store::{ZoneCache, ZoneDirectory};
