use thiserror::Error;

/// Why a hub operation did nothing.
///
/// None of these reach the client: the protocol treats an unregistered
/// caller or an offline target as a silent no-op, so the websocket layer
/// logs these at debug level and drops them.
#[derive(Debug, Clone, Error)]
pub enum HubError {
    #[error("Connection not found")]
    ConnectionNotFound,
    #[error("Connection has no registered display name")]
    NotRegistered,
    #[error("Target display name is offline or unknown")]
    TargetOffline,
}
