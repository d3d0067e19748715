use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::domain::{Room, RoomStatus};
use crate::errors::ServerError;

pub struct NewRoom {
    pub room_number: String,
    pub price: i64,
    pub deposit: i64,
    pub water_rate: i64,
    pub electricity_rate: i64,
    pub status: RoomStatus,
    pub facilities: Vec<String>,
    pub images: Vec<String>,
    pub floor: i64,
    pub size: i64,
    pub max_occupants: i64,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct RoomFilter {
    pub status: Option<RoomStatus>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub floor: Option<i64>,
}

const ROOM_COLUMNS: &str = "id, room_number, price, deposit, water_rate, electricity_rate, status, facilities, images, floor, size, max_occupants, description, created_at, updated_at";

fn row_to_room(row: &Row) -> rusqlite::Result<Room> {
    let facilities: String = row.get(7)?;
    let images: String = row.get(8)?;
    Ok(Room {
        id: row.get(0)?,
        room_number: row.get(1)?,
        price: row.get(2)?,
        deposit: row.get(3)?,
        water_rate: row.get(4)?,
        electricity_rate: row.get(5)?,
        status: row.get(6)?,
        facilities: serde_json::from_str(&facilities).unwrap_or_default(),
        images: serde_json::from_str(&images).unwrap_or_default(),
        floor: row.get(9)?,
        size: row.get(10)?,
        max_occupants: row.get(11)?,
        description: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn json_list(list: &[String]) -> Result<String, ServerError> {
    serde_json::to_string(list)
        .map_err(|e| ServerError::DbError(format!("encode string list failed: {e}")))
}

pub fn insert(conn: &Connection, room: &NewRoom, now: i64) -> Result<Room, ServerError> {
    let result = conn.execute(
        r#"
        insert into rooms (room_number, price, deposit, water_rate, electricity_rate, status,
                           facilities, images, floor, size, max_occupants, description,
                           created_at, updated_at)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            room.room_number,
            room.price,
            room.deposit,
            room.water_rate,
            room.electricity_rate,
            room.status,
            json_list(&room.facilities)?,
            json_list(&room.images)?,
            room.floor,
            room.size,
            room.max_occupants,
            room.description,
            now,
            now
        ],
    );

    match result {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(ServerError::Conflict("room number already exists".into()));
        }
        Err(e) => return Err(ServerError::DbError(format!("insert room failed: {e}"))),
    }

    find_by_id(conn, conn.last_insert_rowid())?
        .ok_or_else(|| ServerError::DbError("inserted room vanished".into()))
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Room>, ServerError> {
    conn.query_row(
        &format!("select {ROOM_COLUMNS} from rooms where id = ?"),
        params![id],
        row_to_room,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select room failed: {e}")))
}

pub fn list(conn: &Connection, filter: &RoomFilter) -> Result<Vec<Room>, ServerError> {
    let mut sql = format!("select {ROOM_COLUMNS} from rooms where 1=1");
    let mut values: Vec<Value> = Vec::new();

    if let Some(status) = filter.status {
        sql.push_str(" and status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }
    if let Some(min) = filter.min_price {
        sql.push_str(" and price >= ?");
        values.push(Value::Integer(min));
    }
    if let Some(max) = filter.max_price {
        sql.push_str(" and price <= ?");
        values.push(Value::Integer(max));
    }
    if let Some(floor) = filter.floor {
        sql.push_str(" and floor = ?");
        values.push(Value::Integer(floor));
    }
    sql.push_str(" order by room_number");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(format!("prepare room list failed: {e}")))?;
    let rows = stmt
        .query_map(params_from_iter(values), row_to_room)
        .map_err(|e| ServerError::DbError(format!("query rooms failed: {e}")))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| ServerError::DbError(format!("read room row failed: {e}")))?);
    }
    Ok(out)
}

/// Write every mutable column except `status`. Room status moves only
/// through [`transition_status`].
pub fn update(conn: &Connection, room: &Room, now: i64) -> Result<(), ServerError> {
    let result = conn.execute(
        r#"
        update rooms
        set room_number = ?, price = ?, deposit = ?, water_rate = ?, electricity_rate = ?,
            facilities = ?, images = ?, floor = ?, size = ?, max_occupants = ?,
            description = ?, updated_at = ?
        where id = ?
        "#,
        params![
            room.room_number,
            room.price,
            room.deposit,
            room.water_rate,
            room.electricity_rate,
            json_list(&room.facilities)?,
            json_list(&room.images)?,
            room.floor,
            room.size,
            room.max_occupants,
            room.description,
            now,
            room.id
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(ServerError::Conflict("room number already exists".into()))
        }
        Err(e) => Err(ServerError::DbError(format!("update room failed: {e}"))),
    }
}

pub fn delete(conn: &Connection, id: i64) -> Result<bool, ServerError> {
    let result = conn.execute("delete from rooms where id = ?", params![id]);
    match result {
        Ok(n) => Ok(n == 1),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(ServerError::Conflict(
                "room has booking or billing history".into(),
            ))
        }
        Err(e) => Err(ServerError::DbError(format!("delete room failed: {e}"))),
    }
}

/// The one place room status is written. The update is conditional on the
/// current status being in `from`; false means the room was not in any of
/// those states (e.g. a concurrent request won the race, or a maintenance
/// override is in effect).
pub fn transition_status(
    conn: &Connection,
    room_id: i64,
    from: &[RoomStatus],
    to: RoomStatus,
    now: i64,
) -> Result<bool, ServerError> {
    let placeholders = vec!["?"; from.len()].join(", ");
    let sql =
        format!("update rooms set status = ?, updated_at = ? where id = ? and status in ({placeholders})");

    let mut values: Vec<Value> = vec![
        Value::Text(to.as_str().to_string()),
        Value::Integer(now),
        Value::Integer(room_id),
    ];
    for status in from {
        values.push(Value::Text(status.as_str().to_string()));
    }

    let updated = conn
        .execute(&sql, params_from_iter(values))
        .map_err(|e| ServerError::DbError(format!("room status transition failed: {e}")))?;

    Ok(updated == 1)
}
