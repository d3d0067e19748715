use astra::Request;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db;
use crate::db::utility_bills::BillFilter;
use crate::db::Database;
use crate::errors::{ResultResp, ServerError};
use crate::handlers::read_json;
use crate::responses::{json_created, json_message, json_ok};
use crate::router::parse_query;
use crate::workflow;
use crate::workflow::billing::{BillEdit, NewBill};

#[derive(Deserialize)]
struct CreateBillBody {
    room_id: i64,
    booking_id: i64,
    user_id: i64,
    month: String,
    water_usage: i64,
    electricity_usage: i64,
}

#[derive(Deserialize)]
struct EditBillBody {
    month: Option<String>,
    water_usage: Option<i64>,
    electricity_usage: Option<i64>,
}

/// Users see their own bills; staff see everyone's and may filter by user.
pub fn list(req: &Request, db: &Database, ctx: &AuthContext) -> ResultResp {
    let params = parse_query(req);

    let mut filter = BillFilter {
        month: params.get("month").cloned(),
        ..Default::default()
    };
    if ctx.is_staff() {
        filter.user_id = params
            .get("user_id")
            .map(|s| {
                s.parse()
                    .map_err(|_| ServerError::BadRequest(format!("invalid user_id: {s}")))
            })
            .transpose()?;
    } else {
        filter.user_id = Some(ctx.user_id);
    }

    let bills = db.with_conn(|conn| db::utility_bills::list(conn, &filter))?;
    json_ok(bills)
}

pub fn create(req: &mut Request, db: &Database, ctx: &AuthContext, now: i64) -> ResultResp {
    ctx.require_staff()?;
    let body: CreateBillBody = read_json(req)?;

    let bill = db.with_conn(|conn| {
        workflow::billing::create_utility_bill(
            conn,
            NewBill {
                room_id: body.room_id,
                booking_id: body.booking_id,
                user_id: body.user_id,
                month: body.month,
                water_usage: body.water_usage,
                electricity_usage: body.electricity_usage,
            },
            now,
        )
    })?;

    json_created(bill, "utility bill created")
}

pub fn update(req: &mut Request, db: &Database, ctx: &AuthContext, id: i64, now: i64) -> ResultResp {
    ctx.require_staff()?;
    let body: EditBillBody = read_json(req)?;

    let bill = db.with_conn(|conn| {
        workflow::billing::edit_utility_bill(
            conn,
            id,
            BillEdit {
                month: body.month,
                water_usage: body.water_usage,
                electricity_usage: body.electricity_usage,
            },
            now,
        )
    })?;

    json_ok(bill)
}

pub fn delete(db: &Database, ctx: &AuthContext, id: i64) -> ResultResp {
    ctx.require_staff()?;
    db.with_conn(|conn| workflow::billing::delete_utility_bill(conn, id))?;
    json_message("utility bill deleted")
}
