//! Booking creation and status changes.
//!
//! Everything here runs inside one transaction per operation: the booking
//! row and the room status either move together or not at all.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use crate::auth::AuthContext;
use crate::db;
use crate::domain::rules;
use crate::domain::{Booking, BookingStatus, RoomStatus};
use crate::errors::ServerError;

pub fn create_booking(
    conn: &mut Connection,
    actor: &AuthContext,
    room_id: i64,
    check_in_date: NaiveDate,
    now: i64,
) -> Result<Booking, ServerError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let room = db::rooms::find_by_id(&tx, room_id)?
        .ok_or_else(|| ServerError::NotFound("room not found".into()))?;
    if room.status != RoomStatus::Available {
        return Err(ServerError::Conflict("room is not available".into()));
    }

    if db::bookings::count_active_for_user(&tx, actor.user_id)? > 0 {
        return Err(ServerError::Conflict(
            "you already have an active booking".into(),
        ));
    }

    // Priced at booking time and frozen on the row; later room edits don't
    // reach back into it.
    let total_amount = room.price + room.deposit;

    // The conditional flip is the real availability check: a concurrent
    // request may have reserved the room since the read above.
    if !db::rooms::transition_status(&tx, room_id, &[RoomStatus::Available], RoomStatus::Reserved, now)? {
        return Err(ServerError::Conflict("room is not available".into()));
    }

    let booking = db::bookings::insert(&tx, actor.user_id, room_id, check_in_date, total_amount, now)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit booking failed: {e}")))?;

    info!(
        booking_id = booking.id,
        room_id,
        user_id = actor.user_id,
        "room reserved"
    );
    Ok(booking)
}

/// Cancel / confirm / complete a booking.
///
/// Regular users may only cancel their own pending booking; staff may apply
/// any legal transition. A booking leaving the active set releases its room.
pub fn change_booking_status(
    conn: &mut Connection,
    actor: &AuthContext,
    booking_id: i64,
    new_status: BookingStatus,
    now: i64,
) -> Result<Booking, ServerError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let booking = db::bookings::find_by_id(&tx, booking_id)?
        .ok_or_else(|| ServerError::NotFound("booking not found".into()))?;

    if !actor.is_staff() {
        if booking.user_id != actor.user_id {
            return Err(ServerError::Forbidden(
                "you may only modify your own booking".into(),
            ));
        }
        if new_status != BookingStatus::Cancelled || booking.status != BookingStatus::Pending {
            return Err(ServerError::InvalidTransition(
                "only a pending booking can be cancelled".into(),
            ));
        }
    }

    if !rules::booking_transition_allowed(booking.status, new_status) {
        return Err(ServerError::InvalidTransition(format!(
            "cannot move a {} booking to {}",
            booking.status.as_str(),
            new_status.as_str()
        )));
    }

    db::bookings::set_status(&tx, booking_id, new_status, now)?;

    if booking.status.is_active() && !new_status.is_active() {
        // The room held by this booking goes back on the market. A
        // maintenance override is left alone.
        db::rooms::transition_status(
            &tx,
            booking.room_id,
            &[RoomStatus::Reserved, RoomStatus::Occupied],
            RoomStatus::Available,
            now,
        )?;
    }

    let updated = db::bookings::find_by_id(&tx, booking_id)?.ok_or(ServerError::Internal)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit status change failed: {e}")))?;

    info!(
        booking_id,
        from = booking.status.as_str(),
        to = new_status.as_str(),
        "booking status changed"
    );
    Ok(updated)
}
