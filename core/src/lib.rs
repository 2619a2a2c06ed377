//! Konsil desk core: staff scoring and the consultation rotation.

pub mod attendance;
pub mod config;
pub mod desk;
pub mod error;
pub mod event;
pub mod queue;
pub mod roster;
pub mod scorer;
pub mod store;
pub mod types;
