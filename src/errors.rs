use astra::Response;
use std::fmt;

/// Errors originating from request handling (routing, validation, auth,
/// workflow rules) or downstream layers (DB).
#[derive(Debug)]
pub enum ServerError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    /// The request collides with existing state: duplicate active booking,
    /// duplicate bill month, already-resolved payment, taken room.
    Conflict(String),
    /// A status change that is not legal from the record's current state.
    InvalidTransition(String),
    DbError(String),
    Internal,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ServerError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            ServerError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            ServerError::InvalidTransition(msg) => write!(f, "Invalid Transition: {msg}"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::Internal => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}
