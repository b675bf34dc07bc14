//! StudyHall Engine library.
//!
//! Server-side code for the StudyHall real-time collaboration engine.
//!
//! ## Structure
//!
//! - `collab/` - the collaboration hub: connection registry, presence
//!   directory, rooms, chat relay, and friend graph behind one lock
//! - `api/` - HTTP and WebSocket entry points

pub mod api;
pub mod collab;

pub use collab::Hub;
