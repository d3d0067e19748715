//! Room inventory management (staff only).
//!
//! Reserved and occupied are owned by the booking/payment workflow; the
//! only status movement allowed from here is the maintenance toggle.

use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use crate::db;
use crate::db::rooms::NewRoom;
use crate::domain::{Room, RoomStatus};
use crate::errors::ServerError;

pub const DEFAULT_WATER_RATE: i64 = 18;
pub const DEFAULT_ELECTRICITY_RATE: i64 = 8;

pub struct CreateRoom {
    pub room_number: String,
    pub price: i64,
    pub deposit: i64,
    pub water_rate: Option<i64>,
    pub electricity_rate: Option<i64>,
    pub status: Option<RoomStatus>,
    pub facilities: Vec<String>,
    pub images: Vec<String>,
    pub floor: i64,
    pub size: i64,
    pub max_occupants: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct RoomEdit {
    pub room_number: Option<String>,
    pub price: Option<i64>,
    pub deposit: Option<i64>,
    pub water_rate: Option<i64>,
    pub electricity_rate: Option<i64>,
    pub status: Option<RoomStatus>,
    pub facilities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub floor: Option<i64>,
    pub size: Option<i64>,
    pub max_occupants: Option<i64>,
    pub description: Option<Option<String>>,
}

pub fn create_room(conn: &mut Connection, req: CreateRoom, now: i64) -> Result<Room, ServerError> {
    if req.room_number.trim().is_empty() {
        return Err(ServerError::BadRequest("room_number is required".into()));
    }
    if req.price < 0 || req.deposit < 0 {
        return Err(ServerError::BadRequest(
            "price and deposit cannot be negative".into(),
        ));
    }
    let status = req.status.unwrap_or(RoomStatus::Available);
    if !matches!(status, RoomStatus::Available | RoomStatus::Maintenance) {
        return Err(ServerError::InvalidTransition(
            "a new room starts as available or maintenance".into(),
        ));
    }

    let room = db::rooms::insert(
        conn,
        &NewRoom {
            room_number: req.room_number.trim().to_string(),
            price: req.price,
            deposit: req.deposit,
            water_rate: req.water_rate.unwrap_or(DEFAULT_WATER_RATE),
            electricity_rate: req.electricity_rate.unwrap_or(DEFAULT_ELECTRICITY_RATE),
            status,
            facilities: req.facilities,
            images: req.images,
            floor: req.floor,
            size: req.size,
            max_occupants: req.max_occupants.unwrap_or(1),
            description: req.description,
        },
        now,
    )?;

    info!(room_id = room.id, room_number = %room.room_number, "room created");
    Ok(room)
}

pub fn update_room(
    conn: &mut Connection,
    room_id: i64,
    edit: RoomEdit,
    now: i64,
) -> Result<Room, ServerError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let mut room = db::rooms::find_by_id(&tx, room_id)?
        .ok_or_else(|| ServerError::NotFound("room not found".into()))?;

    if let Some(new_status) = edit.status {
        if new_status != room.status {
            let toggle = matches!(
                (room.status, new_status),
                (RoomStatus::Available, RoomStatus::Maintenance)
                    | (RoomStatus::Maintenance, RoomStatus::Available)
            );
            if !toggle {
                return Err(ServerError::InvalidTransition(
                    "room status can only be toggled between available and maintenance".into(),
                ));
            }
            if db::bookings::count_active_for_room(&tx, room_id)? > 0 {
                return Err(ServerError::Conflict(
                    "room is held by an active booking".into(),
                ));
            }
            db::rooms::transition_status(&tx, room_id, &[room.status], new_status, now)?;
        }
    }

    if let Some(room_number) = edit.room_number {
        if room_number.trim().is_empty() {
            return Err(ServerError::BadRequest("room_number is required".into()));
        }
        room.room_number = room_number.trim().to_string();
    }
    if let Some(price) = edit.price {
        if price < 0 {
            return Err(ServerError::BadRequest("price cannot be negative".into()));
        }
        room.price = price;
    }
    if let Some(deposit) = edit.deposit {
        if deposit < 0 {
            return Err(ServerError::BadRequest("deposit cannot be negative".into()));
        }
        room.deposit = deposit;
    }
    if let Some(rate) = edit.water_rate {
        room.water_rate = rate;
    }
    if let Some(rate) = edit.electricity_rate {
        room.electricity_rate = rate;
    }
    if let Some(facilities) = edit.facilities {
        room.facilities = facilities;
    }
    if let Some(images) = edit.images {
        room.images = images;
    }
    if let Some(floor) = edit.floor {
        room.floor = floor;
    }
    if let Some(size) = edit.size {
        room.size = size;
    }
    if let Some(max_occupants) = edit.max_occupants {
        room.max_occupants = max_occupants;
    }
    if let Some(description) = edit.description {
        room.description = description;
    }

    db::rooms::update(&tx, &room, now)?;
    let updated = db::rooms::find_by_id(&tx, room_id)?.ok_or(ServerError::Internal)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit room update failed: {e}")))?;

    Ok(updated)
}

pub fn delete_room(conn: &mut Connection, room_id: i64) -> Result<(), ServerError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    db::rooms::find_by_id(&tx, room_id)?
        .ok_or_else(|| ServerError::NotFound("room not found".into()))?;

    if db::bookings::count_active_for_room(&tx, room_id)? > 0 {
        return Err(ServerError::Conflict(
            "room is held by an active booking".into(),
        ));
    }

    db::rooms::delete(&tx, room_id)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit room delete failed: {e}")))?;

    info!(room_id, "room deleted");
    Ok(())
}
