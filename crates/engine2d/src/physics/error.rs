//! Physics error types
//!
//! Only construction and configuration paths return these. A running tick
//! never fails: invalid shapes simply never collide.

use crate::physics::BodyHandle;

/// Errors raised while building shapes, bodies or pools
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Polygon geometry that cannot be used for collision
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Body parameters out of range
    #[error("Invalid body configuration: {0}")]
    InvalidBody(String),

    /// Handle does not refer to a body in the pool
    #[error("Unknown body handle: {0:?}")]
    UnknownBody(BodyHandle),
}

/// Result alias for physics construction
pub type PhysicsResult<T> = Result<T, PhysicsError>;
