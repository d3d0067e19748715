// src/auth/sessions.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::context::AuthContext;
use crate::auth::token::{generate_token_default, hash_token};
use crate::domain::Role;
use crate::errors::ServerError;

pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7; // 7 days

/// Create a session row for the user and return the raw bearer token.
/// Only the SHA-256 hash of the token is stored.
pub fn create_session(conn: &Connection, user_id: i64, now: i64) -> Result<String, ServerError> {
    let raw_token = generate_token_default();
    let hash = hash_token(&raw_token);
    let expires_at = now + SESSION_TTL_SECS;

    conn.execute(
        r#"
        insert into sessions (user_id, token_hash, created_at, expires_at)
        values (?, ?, ?, ?)
        "#,
        params![user_id, hash.as_slice(), now, expires_at],
    )
    .map_err(|e| ServerError::DbError(format!("create session failed: {e}")))?;

    Ok(raw_token)
}

/// Resolve a raw bearer token to the identity it authenticates.
/// A session counts only while unexpired and unrevoked.
pub fn resolve(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<AuthContext>, ServerError> {
    let hash = hash_token(raw_token);

    conn.query_row(
        r#"
        select u.id, u.role
        from sessions s
        join users u on u.id = s.user_id
        where s.token_hash = ?
          and s.expires_at > ?
          and s.revoked_at is null
        "#,
        params![hash.as_slice(), now],
        |row| {
            Ok(AuthContext {
                user_id: row.get(0)?,
                role: row.get::<_, Role>(1)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("session lookup failed: {e}")))
}

/// Revoke the session behind a raw token. Returns false when no live
/// session matched (already revoked, expired, or unknown).
pub fn revoke(conn: &Connection, raw_token: &str, now: i64) -> Result<bool, ServerError> {
    let hash = hash_token(raw_token);

    let updated = conn
        .execute(
            "update sessions set revoked_at = ? where token_hash = ? and revoked_at is null",
            params![now, hash.as_slice()],
        )
        .map_err(|e| ServerError::DbError(format!("revoke session failed: {e}")))?;

    Ok(updated == 1)
}
