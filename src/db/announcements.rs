// src/db/announcements.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Announcement, Priority};
use crate::errors::ServerError;

const ANNOUNCEMENT_COLUMNS: &str =
    "id, title, content, priority, published_by, is_active, created_at, updated_at";

fn row_to_announcement(row: &Row) -> rusqlite::Result<Announcement> {
    Ok(Announcement {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        priority: row.get(3)?,
        published_by: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub fn insert(
    conn: &Connection,
    title: &str,
    content: &str,
    priority: Priority,
    published_by: i64,
    is_active: bool,
    now: i64,
) -> Result<Announcement, ServerError> {
    conn.execute(
        r#"
        insert into announcements (title, content, priority, published_by, is_active, created_at, updated_at)
        values (?, ?, ?, ?, ?, ?, ?)
        "#,
        params![title, content, priority, published_by, is_active, now, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert announcement failed: {e}")))?;

    find_by_id(conn, conn.last_insert_rowid())?
        .ok_or_else(|| ServerError::DbError("inserted announcement vanished".into()))
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Announcement>, ServerError> {
    conn.query_row(
        &format!("select {ANNOUNCEMENT_COLUMNS} from announcements where id = ?"),
        params![id],
        row_to_announcement,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select announcement failed: {e}")))
}

pub fn list(conn: &Connection, active_only: bool) -> Result<Vec<Announcement>, ServerError> {
    let sql = if active_only {
        format!(
            "select {ANNOUNCEMENT_COLUMNS} from announcements where is_active = 1 order by created_at desc, id desc"
        )
    } else {
        format!("select {ANNOUNCEMENT_COLUMNS} from announcements order by created_at desc, id desc")
    };

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(format!("prepare announcement list failed: {e}")))?;
    let rows = stmt
        .query_map(params![], row_to_announcement)
        .map_err(|e| ServerError::DbError(format!("query announcements failed: {e}")))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(
            row.map_err(|e| ServerError::DbError(format!("read announcement row failed: {e}")))?,
        );
    }
    Ok(out)
}

pub fn update(conn: &Connection, announcement: &Announcement, now: i64) -> Result<(), ServerError> {
    conn.execute(
        r#"
        update announcements
        set title = ?, content = ?, priority = ?, is_active = ?, updated_at = ?
        where id = ?
        "#,
        params![
            announcement.title,
            announcement.content,
            announcement.priority,
            announcement.is_active,
            now,
            announcement.id
        ],
    )
    .map_err(|e| ServerError::DbError(format!("update announcement failed: {e}")))?;
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> Result<bool, ServerError> {
    let deleted = conn
        .execute("delete from announcements where id = ?", params![id])
        .map_err(|e| ServerError::DbError(format!("delete announcement failed: {e}")))?;
    Ok(deleted == 1)
}
