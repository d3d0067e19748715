use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{ClaimData, Payment, PaymentStatus, PaymentTarget};
use crate::errors::ServerError;

pub struct NewPayment<'a> {
    pub user_id: i64,
    pub target: PaymentTarget,
    pub amount: i64,
    pub slip_image: &'a str,
    pub claim: Option<&'a ClaimData>,
}

const PAYMENT_COLUMNS: &str = "id, user_id, booking_id, utility_bill_id, amount, slip_image, claim, status, verified_by, verified_at, notes, created_at";

fn row_to_payment(row: &Row) -> rusqlite::Result<Payment> {
    let claim: Option<String> = row.get(6)?;
    Ok(Payment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        booking_id: row.get(2)?,
        utility_bill_id: row.get(3)?,
        amount: row.get(4)?,
        slip_image: row.get(5)?,
        claim: claim.and_then(|raw| serde_json::from_str(&raw).ok()),
        status: row.get(7)?,
        verified_by: row.get(8)?,
        verified_at: row.get(9)?,
        notes: row.get(10)?,
        created_at: row.get(11)?,
    })
}

pub fn insert(conn: &Connection, payment: &NewPayment, now: i64) -> Result<Payment, ServerError> {
    let (booking_id, utility_bill_id) = match payment.target {
        PaymentTarget::Booking(id) => (Some(id), None),
        PaymentTarget::UtilityBill(id) => (None, Some(id)),
    };
    let claim_json = payment
        .claim
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| ServerError::DbError(format!("encode claim failed: {e}")))?;

    conn.execute(
        r#"
        insert into payments (user_id, booking_id, utility_bill_id, amount, slip_image, claim, status, created_at)
        values (?, ?, ?, ?, ?, ?, 'pending', ?)
        "#,
        params![
            payment.user_id,
            booking_id,
            utility_bill_id,
            payment.amount,
            payment.slip_image,
            claim_json,
            now
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert payment failed: {e}")))?;

    find_by_id(conn, conn.last_insert_rowid())?
        .ok_or_else(|| ServerError::DbError("inserted payment vanished".into()))
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Payment>, ServerError> {
    conn.query_row(
        &format!("select {PAYMENT_COLUMNS} from payments where id = ?"),
        params![id],
        row_to_payment,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select payment failed: {e}")))
}

pub fn list_all(conn: &Connection) -> Result<Vec<Payment>, ServerError> {
    collect(
        conn,
        &format!("select {PAYMENT_COLUMNS} from payments order by created_at desc, id desc"),
        params![],
    )
}

pub fn list_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Payment>, ServerError> {
    collect(
        conn,
        &format!(
            "select {PAYMENT_COLUMNS} from payments where user_id = ? order by created_at desc, id desc"
        ),
        params![user_id],
    )
}

fn collect(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Payment>, ServerError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ServerError::DbError(format!("prepare payment list failed: {e}")))?;
    let rows = stmt
        .query_map(params, row_to_payment)
        .map_err(|e| ServerError::DbError(format!("query payments failed: {e}")))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| ServerError::DbError(format!("read payment row failed: {e}")))?);
    }
    Ok(out)
}

pub fn pending_exists_for_target(
    conn: &Connection,
    target: PaymentTarget,
) -> Result<bool, ServerError> {
    let (sql, id) = match target {
        PaymentTarget::Booking(id) => (
            "select count(*) from payments where booking_id = ? and status = 'pending'",
            id,
        ),
        PaymentTarget::UtilityBill(id) => (
            "select count(*) from payments where utility_bill_id = ? and status = 'pending'",
            id,
        ),
    };
    let count: i64 = conn
        .query_row(sql, params![id], |row| row.get(0))
        .map_err(|e| ServerError::DbError(format!("count pending payments failed: {e}")))?;
    Ok(count > 0)
}

/// Resolve a pending payment. Conditional on `status = 'pending'`, so of
/// two concurrent verification calls exactly one returns true; resolution
/// is terminal.
pub fn resolve_if_pending(
    conn: &Connection,
    payment_id: i64,
    decision: PaymentStatus,
    verifier_id: i64,
    notes: Option<&str>,
    now: i64,
) -> Result<bool, ServerError> {
    let updated = conn
        .execute(
            r#"
            update payments
            set status = ?, verified_by = ?, verified_at = ?, notes = ?
            where id = ? and status = 'pending'
            "#,
            params![decision, verifier_id, now, notes, payment_id],
        )
        .map_err(|e| ServerError::DbError(format!("resolve payment failed: {e}")))?;
    Ok(updated == 1)
}
