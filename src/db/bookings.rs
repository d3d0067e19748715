use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Booking, BookingStatus};
use crate::errors::ServerError;

const BOOKING_COLUMNS: &str = "id, user_id, room_id, check_in_date, check_out_date, total_amount, deposit_paid, status, created_at, updated_at";

fn row_to_booking(row: &Row) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        room_id: row.get(2)?,
        check_in_date: row.get(3)?,
        check_out_date: row.get(4)?,
        total_amount: row.get(5)?,
        deposit_paid: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn insert(
    conn: &Connection,
    user_id: i64,
    room_id: i64,
    check_in_date: NaiveDate,
    total_amount: i64,
    now: i64,
) -> Result<Booking, ServerError> {
    conn.execute(
        r#"
        insert into bookings (user_id, room_id, check_in_date, total_amount, deposit_paid, status, created_at, updated_at)
        values (?, ?, ?, ?, 0, 'pending', ?, ?)
        "#,
        params![user_id, room_id, check_in_date, total_amount, now, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert booking failed: {e}")))?;

    find_by_id(conn, conn.last_insert_rowid())?
        .ok_or_else(|| ServerError::DbError("inserted booking vanished".into()))
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Booking>, ServerError> {
    conn.query_row(
        &format!("select {BOOKING_COLUMNS} from bookings where id = ?"),
        params![id],
        row_to_booking,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select booking failed: {e}")))
}

pub fn list_all(conn: &Connection) -> Result<Vec<Booking>, ServerError> {
    collect(
        conn,
        &format!("select {BOOKING_COLUMNS} from bookings order by created_at desc, id desc"),
        params![],
    )
}

pub fn list_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Booking>, ServerError> {
    collect(
        conn,
        &format!(
            "select {BOOKING_COLUMNS} from bookings where user_id = ? order by created_at desc, id desc"
        ),
        params![user_id],
    )
}

fn collect(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Booking>, ServerError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ServerError::DbError(format!("prepare booking list failed: {e}")))?;
    let rows = stmt
        .query_map(params, row_to_booking)
        .map_err(|e| ServerError::DbError(format!("query bookings failed: {e}")))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| ServerError::DbError(format!("read booking row failed: {e}")))?);
    }
    Ok(out)
}

/// Bookings in {pending, confirmed}: the ones that hold a room.
pub fn count_active_for_user(conn: &Connection, user_id: i64) -> Result<i64, ServerError> {
    conn.query_row(
        "select count(*) from bookings where user_id = ? and status in ('pending', 'confirmed')",
        params![user_id],
        |row| row.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("count active bookings failed: {e}")))
}

pub fn count_active_for_room(conn: &Connection, room_id: i64) -> Result<i64, ServerError> {
    conn.query_row(
        "select count(*) from bookings where room_id = ? and status in ('pending', 'confirmed')",
        params![room_id],
        |row| row.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("count room bookings failed: {e}")))
}

pub fn set_status(
    conn: &Connection,
    booking_id: i64,
    status: BookingStatus,
    now: i64,
) -> Result<bool, ServerError> {
    let updated = conn
        .execute(
            "update bookings set status = ?, updated_at = ? where id = ?",
            params![status, now, booking_id],
        )
        .map_err(|e| ServerError::DbError(format!("update booking status failed: {e}")))?;
    Ok(updated == 1)
}

/// Verified deposit: the booking is confirmed and marked paid in one write.
pub fn mark_confirmed(conn: &Connection, booking_id: i64, now: i64) -> Result<bool, ServerError> {
    let updated = conn
        .execute(
            "update bookings set status = 'confirmed', deposit_paid = 1, updated_at = ? where id = ?",
            params![now, booking_id],
        )
        .map_err(|e| ServerError::DbError(format!("confirm booking failed: {e}")))?;
    Ok(updated == 1)
}
