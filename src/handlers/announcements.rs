use astra::Request;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db;
use crate::db::Database;
use crate::domain::Priority;
use crate::errors::{ResultResp, ServerError};
use crate::handlers::read_json;
use crate::responses::{json_created, json_message, json_ok};
use crate::router::parse_query;

#[derive(Deserialize)]
struct CreateBody {
    title: String,
    content: String,
    priority: Option<Priority>,
    is_active: Option<bool>,
}

#[derive(Deserialize)]
struct UpdateBody {
    title: Option<String>,
    content: Option<String>,
    priority: Option<Priority>,
    is_active: Option<bool>,
}

pub fn list(req: &Request, db: &Database) -> ResultResp {
    let params = parse_query(req);
    let active_only = params.get("active").map(String::as_str) == Some("true");

    let announcements = db.with_conn(|conn| db::announcements::list(conn, active_only))?;
    json_ok(announcements)
}

pub fn create(req: &mut Request, db: &Database, ctx: &AuthContext, now: i64) -> ResultResp {
    ctx.require_staff()?;
    let body: CreateBody = read_json(req)?;

    if body.title.trim().is_empty() || body.content.trim().is_empty() {
        return Err(ServerError::BadRequest(
            "title and content are required".into(),
        ));
    }

    let announcement = db.with_conn(|conn| {
        db::announcements::insert(
            conn,
            body.title.trim(),
            body.content.trim(),
            body.priority.unwrap_or(Priority::Medium),
            ctx.user_id,
            body.is_active.unwrap_or(true),
            now,
        )
    })?;

    json_created(announcement, "announcement published")
}

pub fn update(req: &mut Request, db: &Database, ctx: &AuthContext, id: i64, now: i64) -> ResultResp {
    ctx.require_staff()?;
    let body: UpdateBody = read_json(req)?;

    let announcement = db.with_conn(|conn| {
        let mut announcement = db::announcements::find_by_id(conn, id)?
            .ok_or_else(|| ServerError::NotFound("announcement not found".into()))?;

        if let Some(title) = body.title {
            if title.trim().is_empty() {
                return Err(ServerError::BadRequest("title is required".into()));
            }
            announcement.title = title.trim().to_string();
        }
        if let Some(content) = body.content {
            if content.trim().is_empty() {
                return Err(ServerError::BadRequest("content is required".into()));
            }
            announcement.content = content.trim().to_string();
        }
        if let Some(priority) = body.priority {
            announcement.priority = priority;
        }
        if let Some(is_active) = body.is_active {
            announcement.is_active = is_active;
        }

        db::announcements::update(conn, &announcement, now)?;
        db::announcements::find_by_id(conn, id)?.ok_or(ServerError::Internal)
    })?;

    json_ok(announcement)
}

pub fn delete(db: &Database, ctx: &AuthContext, id: i64) -> ResultResp {
    ctx.require_staff()?;
    let deleted = db.with_conn(|conn| db::announcements::delete(conn, id))?;
    if !deleted {
        return Err(ServerError::NotFound("announcement not found".into()));
    }
    json_message("announcement deleted")
}
