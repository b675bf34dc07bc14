//! StudyHall Protocol - shared wire types for Engine and clients.

pub mod messages;

pub use messages::{ClientMessage, ServerMessage};
