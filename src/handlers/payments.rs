use astra::Request;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db;
use crate::db::Database;
use crate::domain::{ClaimData, PaymentStatus};
use crate::errors::ResultResp;
use crate::handlers::read_json;
use crate::responses::{json_created, json_ok};
use crate::workflow;
use crate::workflow::payment::SubmitPayment;

#[derive(Deserialize)]
struct SubmitBody {
    booking_id: Option<i64>,
    utility_bill_id: Option<i64>,
    slip_image: String,
    claim: Option<ClaimData>,
}

#[derive(Deserialize)]
struct VerifyBody {
    status: PaymentStatus,
    notes: Option<String>,
}

pub fn list(db: &Database, ctx: &AuthContext) -> ResultResp {
    let payments = db.with_conn(|conn| {
        if ctx.is_staff() {
            db::payments::list_all(conn)
        } else {
            db::payments::list_for_user(conn, ctx.user_id)
        }
    })?;
    json_ok(payments)
}

pub fn submit(req: &mut Request, db: &Database, ctx: &AuthContext, now: i64) -> ResultResp {
    let body: SubmitBody = read_json(req)?;

    let payment = db.with_conn(|conn| {
        workflow::payment::submit_payment(
            conn,
            ctx,
            SubmitPayment {
                booking_id: body.booking_id,
                utility_bill_id: body.utility_bill_id,
                slip_image: body.slip_image,
                claim: body.claim,
            },
            now,
        )
    })?;

    json_created(payment, "payment slip submitted; awaiting review")
}

pub fn verify(req: &mut Request, db: &Database, ctx: &AuthContext, id: i64, now: i64) -> ResultResp {
    ctx.require_staff()?;
    let body: VerifyBody = read_json(req)?;

    let payment = db.with_conn(|conn| {
        workflow::payment::verify_payment(conn, ctx, id, body.status, body.notes, now)
    })?;

    json_ok(payment)
}
