pub mod context;
pub mod password;
pub mod sessions;
pub mod token;

pub use context::AuthContext;

use astra::Request;

use crate::db::connection::Database;
use crate::errors::ServerError;

/// Resolve the request's bearer credential, if any.
pub fn authenticate(
    req: &Request,
    db: &Database,
    now: i64,
) -> Result<Option<AuthContext>, ServerError> {
    let Some(token) = bearer_token(req) else {
        return Ok(None);
    };
    db.with_conn(|conn| sessions::resolve(conn, &token, now))
}

/// Like [`authenticate`], but a missing/invalid credential is an error.
pub fn require_auth(req: &Request, db: &Database, now: i64) -> Result<AuthContext, ServerError> {
    authenticate(req, db, now)?
        .ok_or_else(|| ServerError::Unauthorized("login required".into()))
}

pub fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

/// Trim + lowercase, minimal sanity check.
pub fn normalize_email(email: &str) -> Result<String, ServerError> {
    let e = email.trim().to_lowercase();
    if e.is_empty() || !e.contains('@') || e.starts_with('@') || e.ends_with('@') {
        return Err(ServerError::BadRequest("invalid email".into()));
    }
    Ok(e)
}
