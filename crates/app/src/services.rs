//! Application services orchestrating ports around the manager.

pub mod zone_sync;
