use astra::Request;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db;
use crate::db::Database;
use crate::domain::BookingStatus;
use crate::errors::{ResultResp, ServerError};
use crate::handlers::read_json;
use crate::responses::{json_created, json_ok};
use crate::workflow;

#[derive(Deserialize)]
struct CreateBookingBody {
    room_id: i64,
    check_in_date: NaiveDate,
}

#[derive(Deserialize)]
struct StatusBody {
    status: BookingStatus,
}

/// Users see their own bookings; staff see everyone's.
pub fn list(db: &Database, ctx: &AuthContext) -> ResultResp {
    let bookings = db.with_conn(|conn| {
        if ctx.is_staff() {
            db::bookings::list_all(conn)
        } else {
            db::bookings::list_for_user(conn, ctx.user_id)
        }
    })?;
    json_ok(bookings)
}

pub fn create(req: &mut Request, db: &Database, ctx: &AuthContext, now: i64) -> ResultResp {
    let body: CreateBookingBody = read_json(req)?;

    let booking = db.with_conn(|conn| {
        workflow::booking::create_booking(conn, ctx, body.room_id, body.check_in_date, now)
    })?;

    json_created(booking, "room booked; please submit your payment slip")
}

pub fn get(db: &Database, ctx: &AuthContext, id: i64) -> ResultResp {
    let booking = db
        .with_conn(|conn| db::bookings::find_by_id(conn, id))?
        .ok_or_else(|| ServerError::NotFound("booking not found".into()))?;

    if !ctx.is_staff() && booking.user_id != ctx.user_id {
        return Err(ServerError::Forbidden(
            "you may only view your own booking".into(),
        ));
    }

    json_ok(booking)
}

pub fn change_status(
    req: &mut Request,
    db: &Database,
    ctx: &AuthContext,
    id: i64,
    now: i64,
) -> ResultResp {
    let body: StatusBody = read_json(req)?;

    let booking = db.with_conn(|conn| {
        workflow::booking::change_booking_status(conn, ctx, id, body.status, now)
    })?;

    json_ok(booking)
}
