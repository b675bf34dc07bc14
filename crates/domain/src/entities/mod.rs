//! Collaboration entities.

mod room;
mod user_session;

pub use room::Room;
pub use user_session::UserSession;
