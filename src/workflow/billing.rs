//! Monthly water/electricity billing for occupied rooms.

use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use crate::db;
use crate::db::utility_bills::NewUtilityBill;
use crate::domain::rules;
use crate::domain::UtilityBill;
use crate::errors::ServerError;

pub struct NewBill {
    pub room_id: i64,
    pub booking_id: i64,
    pub user_id: i64,
    pub month: String,
    pub water_usage: i64,
    pub electricity_usage: i64,
}

#[derive(Debug, Default)]
pub struct BillEdit {
    pub month: Option<String>,
    pub water_usage: Option<i64>,
    pub electricity_usage: Option<i64>,
}

pub fn create_utility_bill(
    conn: &mut Connection,
    bill: NewBill,
    now: i64,
) -> Result<UtilityBill, ServerError> {
    if !rules::is_valid_month_key(&bill.month) {
        return Err(ServerError::BadRequest("month must be YYYY-MM".into()));
    }
    if bill.water_usage < 0 || bill.electricity_usage < 0 {
        return Err(ServerError::BadRequest("usage cannot be negative".into()));
    }

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let room = db::rooms::find_by_id(&tx, bill.room_id)?
        .ok_or_else(|| ServerError::NotFound("room not found".into()))?;
    let booking = db::bookings::find_by_id(&tx, bill.booking_id)?
        .ok_or_else(|| ServerError::NotFound("booking not found".into()))?;
    if booking.room_id != room.id {
        return Err(ServerError::BadRequest(
            "booking does not belong to this room".into(),
        ));
    }

    if db::utility_bills::exists_for_booking_month(&tx, bill.booking_id, &bill.month)? {
        return Err(ServerError::Conflict(
            "a bill for this booking and month already exists".into(),
        ));
    }

    let water_cost = bill.water_usage * room.water_rate;
    let electricity_cost = bill.electricity_usage * room.electricity_rate;

    let created = db::utility_bills::insert(
        &tx,
        &NewUtilityBill {
            booking_id: bill.booking_id,
            room_id: bill.room_id,
            user_id: bill.user_id,
            month: &bill.month,
            water_usage: bill.water_usage,
            water_cost,
            electricity_usage: bill.electricity_usage,
            electricity_cost,
            total_cost: water_cost + electricity_cost,
        },
        now,
    )?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit bill failed: {e}")))?;

    info!(
        bill_id = created.id,
        month = %created.month,
        total = created.total_cost,
        "utility bill created"
    );
    Ok(created)
}

/// Edit usage figures (and/or the month key) on an unpaid bill.
///
/// Costs are recomputed from the room's *current* rates, not the rates in
/// effect when the bill was created, so an edit after a rate change
/// reprices the bill.
pub fn edit_utility_bill(
    conn: &mut Connection,
    bill_id: i64,
    edit: BillEdit,
    now: i64,
) -> Result<UtilityBill, ServerError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let mut bill = db::utility_bills::find_by_id(&tx, bill_id)?
        .ok_or_else(|| ServerError::NotFound("utility bill not found".into()))?;
    if bill.paid {
        return Err(ServerError::InvalidTransition(
            "cannot edit a paid bill".into(),
        ));
    }

    let room = db::rooms::find_by_id(&tx, bill.room_id)?.ok_or_else(|| {
        ServerError::DbError(format!("bill {bill_id} references a missing room"))
    })?;

    if let Some(month) = edit.month {
        if !rules::is_valid_month_key(&month) {
            return Err(ServerError::BadRequest("month must be YYYY-MM".into()));
        }
        if month != bill.month
            && db::utility_bills::exists_for_booking_month(&tx, bill.booking_id, &month)?
        {
            return Err(ServerError::Conflict(
                "a bill for this booking and month already exists".into(),
            ));
        }
        bill.month = month;
    }
    if let Some(water_usage) = edit.water_usage {
        if water_usage < 0 {
            return Err(ServerError::BadRequest("usage cannot be negative".into()));
        }
        bill.water_usage = water_usage;
        bill.water_cost = water_usage * room.water_rate;
    }
    if let Some(electricity_usage) = edit.electricity_usage {
        if electricity_usage < 0 {
            return Err(ServerError::BadRequest("usage cannot be negative".into()));
        }
        bill.electricity_usage = electricity_usage;
        bill.electricity_cost = electricity_usage * room.electricity_rate;
    }
    bill.total_cost = bill.water_cost + bill.electricity_cost;

    db::utility_bills::update_usage(&tx, &bill, now)?;
    let updated = db::utility_bills::find_by_id(&tx, bill_id)?.ok_or(ServerError::Internal)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit bill edit failed: {e}")))?;

    Ok(updated)
}

pub fn delete_utility_bill(conn: &mut Connection, bill_id: i64) -> Result<(), ServerError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let bill = db::utility_bills::find_by_id(&tx, bill_id)?
        .ok_or_else(|| ServerError::NotFound("utility bill not found".into()))?;
    if bill.paid {
        return Err(ServerError::Conflict("cannot delete a paid bill".into()));
    }

    db::utility_bills::delete(&tx, bill_id)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit bill delete failed: {e}")))?;

    info!(bill_id, "utility bill deleted");
    Ok(())
}
