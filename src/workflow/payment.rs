//! Payment slip submission and admin verification.
//!
//! Verification is the single place cross-entity consistency is enforced:
//! the payment, its booking or bill, and the room move in one transaction.

use rusqlite::{Connection, TransactionBehavior};
use tracing::{info, warn};

use crate::auth::AuthContext;
use crate::db;
use crate::db::payments::NewPayment;
use crate::domain::{
    BookingStatus, ClaimData, Payment, PaymentStatus, PaymentTarget, RoomStatus,
};
use crate::errors::ServerError;

pub struct SubmitPayment {
    pub booking_id: Option<i64>,
    pub utility_bill_id: Option<i64>,
    pub slip_image: String,
    pub claim: Option<ClaimData>,
}

pub fn submit_payment(
    conn: &mut Connection,
    actor: &AuthContext,
    submission: SubmitPayment,
    now: i64,
) -> Result<Payment, ServerError> {
    let target = match (submission.booking_id, submission.utility_bill_id) {
        (Some(id), None) => PaymentTarget::Booking(id),
        (None, Some(id)) => PaymentTarget::UtilityBill(id),
        _ => {
            return Err(ServerError::BadRequest(
                "exactly one of booking_id or utility_bill_id is required".into(),
            ))
        }
    };
    if submission.slip_image.trim().is_empty() {
        return Err(ServerError::BadRequest("slip_image is required".into()));
    }

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    // The charged amount always comes from the referenced record. The
    // caller's claim data is a hint for the verifying admin, nothing more.
    let (payer_id, amount) = match target {
        PaymentTarget::Booking(booking_id) => {
            let booking = db::bookings::find_by_id(&tx, booking_id)?
                .ok_or_else(|| ServerError::NotFound("booking not found".into()))?;
            if !actor.is_staff() && booking.user_id != actor.user_id {
                return Err(ServerError::Forbidden(
                    "you may only pay for your own booking".into(),
                ));
            }
            if !booking.status.is_active() || booking.deposit_paid {
                return Err(ServerError::InvalidTransition(
                    "booking is not awaiting payment".into(),
                ));
            }
            (booking.user_id, booking.total_amount)
        }
        PaymentTarget::UtilityBill(bill_id) => {
            let bill = db::utility_bills::find_by_id(&tx, bill_id)?
                .ok_or_else(|| ServerError::NotFound("utility bill not found".into()))?;
            if !actor.is_staff() && bill.user_id != actor.user_id {
                return Err(ServerError::Forbidden(
                    "you may only pay your own bill".into(),
                ));
            }
            if bill.paid {
                return Err(ServerError::InvalidTransition(
                    "bill is already paid".into(),
                ));
            }
            (bill.user_id, bill.total_cost)
        }
    };

    if db::payments::pending_exists_for_target(&tx, target)? {
        return Err(ServerError::Conflict(
            "a payment slip is already awaiting review".into(),
        ));
    }

    let payment = db::payments::insert(
        &tx,
        &NewPayment {
            user_id: payer_id,
            target,
            amount,
            slip_image: &submission.slip_image,
            claim: submission.claim.as_ref(),
        },
        now,
    )?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit payment failed: {e}")))?;

    info!(payment_id = payment.id, amount, "payment slip submitted");
    Ok(payment)
}

/// Resolve a pending payment to verified or rejected and apply the
/// downstream booking/room or bill effects. Resolution is terminal: a
/// second call fails with `Conflict` and changes nothing.
pub fn verify_payment(
    conn: &mut Connection,
    actor: &AuthContext,
    payment_id: i64,
    decision: PaymentStatus,
    notes: Option<String>,
    now: i64,
) -> Result<Payment, ServerError> {
    if decision == PaymentStatus::Pending {
        return Err(ServerError::BadRequest(
            "decision must be verified or rejected".into(),
        ));
    }

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let payment = db::payments::find_by_id(&tx, payment_id)?
        .ok_or_else(|| ServerError::NotFound("payment not found".into()))?;

    // Terminal-state guard: of two concurrent calls, one loses here and
    // none of the side effects below run for it.
    if !db::payments::resolve_if_pending(&tx, payment_id, decision, actor.user_id, notes.as_deref(), now)? {
        return Err(ServerError::Conflict("payment is already resolved".into()));
    }

    let target = payment
        .target()
        .ok_or_else(|| ServerError::DbError(format!("payment {payment_id} has no target")))?;

    match target {
        PaymentTarget::Booking(booking_id) => {
            let booking = db::bookings::find_by_id(&tx, booking_id)?.ok_or_else(|| {
                ServerError::DbError(format!("payment {payment_id} references a missing booking"))
            })?;

            if decision == PaymentStatus::Verified {
                if !booking.status.is_active() {
                    // The booking was cancelled/completed while the slip sat
                    // in the queue; confirming it now would resurrect it.
                    return Err(ServerError::InvalidTransition(
                        "booking is no longer active; reject this payment instead".into(),
                    ));
                }
                db::bookings::mark_confirmed(&tx, booking_id, now)?;
                if !db::rooms::transition_status(
                    &tx,
                    booking.room_id,
                    &[RoomStatus::Reserved, RoomStatus::Available],
                    RoomStatus::Occupied,
                    now,
                )? {
                    warn!(
                        room_id = booking.room_id,
                        "room not moved to occupied (maintenance override?)"
                    );
                }
            } else {
                // A rejected deposit slip voids the reservation.
                if booking.status.is_active() {
                    db::bookings::set_status(&tx, booking_id, BookingStatus::Cancelled, now)?;
                    db::rooms::transition_status(
                        &tx,
                        booking.room_id,
                        &[RoomStatus::Reserved, RoomStatus::Occupied],
                        RoomStatus::Available,
                        now,
                    )?;
                }
            }
        }
        PaymentTarget::UtilityBill(bill_id) => {
            if decision == PaymentStatus::Verified
                && !db::utility_bills::mark_paid(&tx, bill_id, now)?
            {
                warn!(bill_id, "verified a payment for a bill already marked paid");
            }
            // Utility non-payment does not evict: rejection touches nothing
            // beyond the payment row.
        }
    }

    let resolved = db::payments::find_by_id(&tx, payment_id)?.ok_or(ServerError::Internal)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit verification failed: {e}")))?;

    info!(
        payment_id,
        decision = decision.as_str(),
        verifier = actor.user_id,
        "payment resolved"
    );
    Ok(resolved)
}
