pub mod announcements;
pub mod auth;
pub mod bookings;
pub mod home;
pub mod payments;
pub mod rooms;
pub mod utilities;

use astra::Request;
use serde::de::DeserializeOwned;
use std::io::Read;

use crate::errors::ServerError;

/// Read and deserialize a JSON request body.
pub(crate) fn read_json<T: DeserializeOwned>(req: &mut Request) -> Result<T, ServerError> {
    let mut buf = String::new();
    req.body_mut()
        .reader()
        .read_to_string(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("failed to read request body: {e}")))?;

    if buf.trim().is_empty() {
        return Err(ServerError::BadRequest("request body is required".into()));
    }

    serde_json::from_str(&buf)
        .map_err(|e| ServerError::BadRequest(format!("invalid request body: {e}")))
}
