// src/db/users.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Role, User};
use crate::errors::ServerError;

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone_number: &'a str,
    pub student_id: Option<&'a str>,
    pub role: Role,
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        phone_number: row.get(5)?,
        student_id: row.get(6)?,
        role: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone_number, student_id, role, created_at, updated_at";

pub fn insert(conn: &Connection, user: &NewUser, now: i64) -> Result<User, ServerError> {
    let result = conn.execute(
        r#"
        insert into users (email, password_hash, first_name, last_name, phone_number, student_id, role, created_at, updated_at)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            user.email,
            user.password_hash,
            user.first_name,
            user.last_name,
            user.phone_number,
            user.student_id,
            user.role,
            now,
            now
        ],
    );

    match result {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(ServerError::Conflict("email is already registered".into()));
        }
        Err(e) => return Err(ServerError::DbError(format!("insert user failed: {e}"))),
    }

    find_by_id(conn, conn.last_insert_rowid())?
        .ok_or_else(|| ServerError::DbError("inserted user vanished".into()))
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<User>, ServerError> {
    conn.query_row(
        &format!("select {USER_COLUMNS} from users where id = ?"),
        params![id],
        row_to_user,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user failed: {e}")))
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>, ServerError> {
    conn.query_row(
        &format!("select {USER_COLUMNS} from users where email = ?"),
        params![email],
        row_to_user,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user by email failed: {e}")))
}
