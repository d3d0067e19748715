use astra::Response;
use tracing::error;

use crate::errors::ServerError;
use crate::responses::json::json_error;

/// Convert a ServerError into the failure envelope. Internal detail is
/// logged here and never reaches the caller.
pub fn error_to_response(err: ServerError) -> Response {
    let (status, public) = match err {
        ServerError::NotFound(msg) => (404, msg),
        ServerError::BadRequest(msg) => (400, msg),
        ServerError::Unauthorized(msg) => (401, msg),
        ServerError::Forbidden(msg) => (403, msg),
        ServerError::Conflict(msg) => (409, msg),
        ServerError::InvalidTransition(msg) => (400, msg),
        ServerError::DbError(msg) => {
            error!("database error: {msg}");
            (500, "internal server error".to_string())
        }
        ServerError::Internal => {
            error!("internal error");
            (500, "internal server error".to_string())
        }
    };

    json_error(status, &public)
}
