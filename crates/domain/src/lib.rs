//! StudyHall Domain - core collaboration types.
//!
//! Pure types only: no async, no I/O. The engine crate owns all
//! concurrency and transport concerns.

pub mod entities;
pub mod ids;

pub use entities::{Room, UserSession};
pub use ids::ConnectionId;
