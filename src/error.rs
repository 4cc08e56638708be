use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, SchedulingError>;

/// Errors surfaced by the allocation engine and the schedule operations around it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// A referenced room, class section or schedule does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Input rejected at the boundary (decision values, weekdays, times).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The allocator was handed no active rooms to place sections into.
    #[error("no active rooms available for allocation")]
    NoActiveRooms,

    /// Failure reported by the persistence layer, passed through untouched.
    #[error("store error: {0}")]
    Store(String),
}

impl SchedulingError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        SchedulingError::NotFound { entity, id }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        SchedulingError::InvalidArgument(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SchedulingError::NotFound { .. })
    }
}
