// src/handlers/auth.rs
use astra::Request;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::sessions;
use crate::db;
use crate::db::users::NewUser;
use crate::db::Database;
use crate::domain::Role;
use crate::errors::{ResultResp, ServerError};
use crate::handlers::read_json;
use crate::responses::{json_created, json_message, json_ok};

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    phone_number: String,
    student_id: Option<String>,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

pub fn register(req: &mut Request, db: &Database, now: i64) -> ResultResp {
    let body: RegisterBody = read_json(req)?;

    let email = auth::normalize_email(&body.email)?;
    if body.password.len() < 6 {
        return Err(ServerError::BadRequest(
            "password must be at least 6 characters".into(),
        ));
    }
    for (field, value) in [
        ("first_name", &body.first_name),
        ("last_name", &body.last_name),
        ("phone_number", &body.phone_number),
    ] {
        if value.trim().is_empty() {
            return Err(ServerError::BadRequest(format!("{field} is required")));
        }
    }

    // hash outside with_conn; bcrypt is deliberately slow
    let password_hash = hash_password(&body.password)?;

    let (user, token) = db.with_conn(|conn| {
        let user = db::users::insert(
            conn,
            &NewUser {
                email: &email,
                password_hash: &password_hash,
                first_name: body.first_name.trim(),
                last_name: body.last_name.trim(),
                phone_number: body.phone_number.trim(),
                student_id: body.student_id.as_deref(),
                role: Role::User,
            },
            now,
        )?;
        let token = sessions::create_session(conn, user.id, now)?;
        Ok((user, token))
    })?;

    info!(user_id = user.id, "tenant account registered");
    json_created(json!({ "user": user, "token": token }), "registration successful")
}

pub fn login(req: &mut Request, db: &Database, now: i64) -> ResultResp {
    let body: LoginBody = read_json(req)?;
    let email = auth::normalize_email(&body.email)?;

    let user = db
        .with_conn(|conn| db::users::find_by_email(conn, &email))?
        // same answer for unknown email and wrong password
        .ok_or_else(|| ServerError::Unauthorized("invalid email or password".into()))?;

    if !verify_password(&body.password, &user.password_hash) {
        return Err(ServerError::Unauthorized("invalid email or password".into()));
    }

    let token = db.with_conn(|conn| sessions::create_session(conn, user.id, now))?;

    info!(user_id = user.id, "login");
    json_ok(json!({ "user": user, "token": token }))
}

pub fn logout(req: &Request, db: &Database, now: i64) -> ResultResp {
    let Some(token) = auth::bearer_token(req) else {
        return Err(ServerError::Unauthorized("login required".into()));
    };

    let revoked = db.with_conn(|conn| sessions::revoke(conn, &token, now))?;
    if !revoked {
        return Err(ServerError::Unauthorized("session is not active".into()));
    }

    json_message("logged out")
}
