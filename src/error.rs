use thiserror::Error;

/// Errors returned by fallible map lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
    /// The requested key has no entry in the map.
    #[error("key not found in map")]
    KeyNotFound,
}
