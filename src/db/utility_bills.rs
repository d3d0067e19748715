use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::domain::UtilityBill;
use crate::errors::ServerError;

pub struct NewUtilityBill<'a> {
    pub booking_id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub month: &'a str,
    pub water_usage: i64,
    pub water_cost: i64,
    pub electricity_usage: i64,
    pub electricity_cost: i64,
    pub total_cost: i64,
}

#[derive(Debug, Default)]
pub struct BillFilter {
    pub user_id: Option<i64>,
    pub month: Option<String>,
}

const BILL_COLUMNS: &str = "id, booking_id, room_id, user_id, month, water_usage, water_cost, electricity_usage, electricity_cost, total_cost, paid, paid_at, created_at, updated_at";

fn row_to_bill(row: &Row) -> rusqlite::Result<UtilityBill> {
    Ok(UtilityBill {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        room_id: row.get(2)?,
        user_id: row.get(3)?,
        month: row.get(4)?,
        water_usage: row.get(5)?,
        water_cost: row.get(6)?,
        electricity_usage: row.get(7)?,
        electricity_cost: row.get(8)?,
        total_cost: row.get(9)?,
        paid: row.get(10)?,
        paid_at: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

pub fn insert(
    conn: &Connection,
    bill: &NewUtilityBill,
    now: i64,
) -> Result<UtilityBill, ServerError> {
    let result = conn.execute(
        r#"
        insert into utility_bills (booking_id, room_id, user_id, month, water_usage, water_cost,
                                   electricity_usage, electricity_cost, total_cost, paid,
                                   created_at, updated_at)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
        "#,
        params![
            bill.booking_id,
            bill.room_id,
            bill.user_id,
            bill.month,
            bill.water_usage,
            bill.water_cost,
            bill.electricity_usage,
            bill.electricity_cost,
            bill.total_cost,
            now,
            now
        ],
    );

    match result {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(ServerError::Conflict(
                "a bill for this booking and month already exists".into(),
            ));
        }
        Err(e) => return Err(ServerError::DbError(format!("insert bill failed: {e}"))),
    }

    find_by_id(conn, conn.last_insert_rowid())?
        .ok_or_else(|| ServerError::DbError("inserted bill vanished".into()))
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<UtilityBill>, ServerError> {
    conn.query_row(
        &format!("select {BILL_COLUMNS} from utility_bills where id = ?"),
        params![id],
        row_to_bill,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select bill failed: {e}")))
}

pub fn exists_for_booking_month(
    conn: &Connection,
    booking_id: i64,
    month: &str,
) -> Result<bool, ServerError> {
    let count: i64 = conn
        .query_row(
            "select count(*) from utility_bills where booking_id = ? and month = ?",
            params![booking_id, month],
            |row| row.get(0),
        )
        .map_err(|e| ServerError::DbError(format!("check bill month failed: {e}")))?;
    Ok(count > 0)
}

pub fn list(conn: &Connection, filter: &BillFilter) -> Result<Vec<UtilityBill>, ServerError> {
    let mut sql = format!("select {BILL_COLUMNS} from utility_bills where 1=1");
    let mut values: Vec<Value> = Vec::new();

    if let Some(user_id) = filter.user_id {
        sql.push_str(" and user_id = ?");
        values.push(Value::Integer(user_id));
    }
    if let Some(month) = &filter.month {
        sql.push_str(" and month = ?");
        values.push(Value::Text(month.clone()));
    }
    sql.push_str(" order by month desc, id desc");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(format!("prepare bill list failed: {e}")))?;
    let rows = stmt
        .query_map(params_from_iter(values), row_to_bill)
        .map_err(|e| ServerError::DbError(format!("query bills failed: {e}")))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| ServerError::DbError(format!("read bill row failed: {e}")))?);
    }
    Ok(out)
}

/// Rewrite the month/usage/cost columns after an edit.
pub fn update_usage(conn: &Connection, bill: &UtilityBill, now: i64) -> Result<(), ServerError> {
    let result = conn.execute(
        r#"
        update utility_bills
        set month = ?, water_usage = ?, water_cost = ?, electricity_usage = ?,
            electricity_cost = ?, total_cost = ?, updated_at = ?
        where id = ?
        "#,
        params![
            bill.month,
            bill.water_usage,
            bill.water_cost,
            bill.electricity_usage,
            bill.electricity_cost,
            bill.total_cost,
            now,
            bill.id
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(ServerError::Conflict(
                "a bill for this booking and month already exists".into(),
            ))
        }
        Err(e) => Err(ServerError::DbError(format!("update bill failed: {e}"))),
    }
}

/// Conditional on the bill being unpaid; a second verified payment for the
/// same bill cannot double-apply.
pub fn mark_paid(conn: &Connection, bill_id: i64, now: i64) -> Result<bool, ServerError> {
    let updated = conn
        .execute(
            "update utility_bills set paid = 1, paid_at = ?, updated_at = ? where id = ? and paid = 0",
            params![now, now, bill_id],
        )
        .map_err(|e| ServerError::DbError(format!("mark bill paid failed: {e}")))?;
    Ok(updated == 1)
}

pub fn delete(conn: &Connection, bill_id: i64) -> Result<bool, ServerError> {
    let deleted = conn
        .execute("delete from utility_bills where id = ?", params![bill_id])
        .map_err(|e| ServerError::DbError(format!("delete bill failed: {e}")))?;
    Ok(deleted == 1)
}
