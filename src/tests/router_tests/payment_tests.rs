use serde_json::{json, Value};

use crate::db::Database;
use crate::domain::Role;
use crate::tests::utils::{call, request, seed_room, seed_user, test_db};

/// tenant + admin + booked room; returns (tenant token, admin token, room id, booking id).
fn booked_setup(db: &Database) -> (String, String, i64, i64) {
    let (_, tenant) = seed_user(db, "u@d.com", Role::User);
    let (_, admin) = seed_user(db, "a@d.com", Role::Admin);
    let room_id = seed_room(db, "R101", 3000, 1000);

    let (status, body) = call(
        db,
        request(
            "POST",
            "/api/bookings",
            Some(&tenant),
            Some(json!({ "room_id": room_id, "check_in_date": "2025-01-10" })),
        ),
    );
    assert_eq!(status, 201, "setup booking failed: {body}");
    let booking_id = body["data"]["id"].as_i64().unwrap();
    (tenant, admin, room_id, booking_id)
}

fn submit_slip(db: &Database, token: &str, booking_id: i64) -> (u16, Value) {
    call(
        db,
        request(
            "POST",
            "/api/payments",
            Some(token),
            Some(json!({
                "booking_id": booking_id,
                "slip_image": "slips/transfer.jpg",
                "claim": { "amount": "4000.00", "reference": "TX-123" }
            })),
        ),
    )
}

fn room_status(db: &Database, room_id: i64) -> String {
    let (_, body) = call(db, request("GET", &format!("/api/rooms/{room_id}"), None, None));
    body["data"]["status"].as_str().unwrap().to_string()
}

fn booking_json(db: &Database, token: &str, booking_id: i64) -> Value {
    let (_, body) = call(
        db,
        request("GET", &format!("/api/bookings/{booking_id}"), Some(token), None),
    );
    body["data"].clone()
}

#[test]
fn verified_deposit_confirms_booking_and_occupies_room() {
    let db = test_db("payment_verified");
    let (tenant, admin, room_id, booking_id) = booked_setup(&db);

    let (status, body) = submit_slip(&db, &tenant, booking_id);
    assert_eq!(status, 201, "submit failed: {body}");
    assert_eq!(body["data"]["amount"], 4000);
    assert_eq!(body["data"]["status"], "pending");
    let payment_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &db,
        request(
            "POST",
            &format!("/api/payments/{payment_id}/verify"),
            Some(&admin),
            Some(json!({ "status": "verified" })),
        ),
    );
    assert_eq!(status, 200, "verify failed: {body}");
    assert_eq!(body["data"]["status"], "verified");
    assert!(body["data"]["verified_by"].is_i64());

    let booking = booking_json(&db, &tenant, booking_id);
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["deposit_paid"], true);
    assert_eq!(room_status(&db, room_id), "occupied");
}

#[test]
fn rejected_deposit_voids_the_reservation() {
    let db = test_db("payment_rejected");
    let (tenant, admin, room_id, booking_id) = booked_setup(&db);

    let (_, body) = submit_slip(&db, &tenant, booking_id);
    let payment_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &db,
        request(
            "POST",
            &format!("/api/payments/{payment_id}/verify"),
            Some(&admin),
            Some(json!({ "status": "rejected", "notes": "amount mismatch" })),
        ),
    );
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["notes"], "amount mismatch");

    let booking = booking_json(&db, &tenant, booking_id);
    assert_eq!(booking["status"], "cancelled");
    assert_eq!(room_status(&db, room_id), "available");
}

#[test]
fn a_resolved_payment_stays_resolved() {
    let db = test_db("payment_idempotent");
    let (tenant, admin, room_id, booking_id) = booked_setup(&db);

    let (_, body) = submit_slip(&db, &tenant, booking_id);
    let payment_id = body["data"]["id"].as_i64().unwrap();
    let verify_path = format!("/api/payments/{payment_id}/verify");

    let (status, _) = call(
        &db,
        request("POST", &verify_path, Some(&admin), Some(json!({ "status": "verified" }))),
    );
    assert_eq!(status, 200);

    // the second decision bounces and nothing moves
    let (status, _) = call(
        &db,
        request("POST", &verify_path, Some(&admin), Some(json!({ "status": "rejected" }))),
    );
    assert_eq!(status, 409);
    assert_eq!(room_status(&db, room_id), "occupied");
    assert_eq!(booking_json(&db, &tenant, booking_id)["status"], "confirmed");
}

#[test]
fn verification_is_staff_only() {
    let db = test_db("payment_staff_only");
    let (tenant, _admin, _room_id, booking_id) = booked_setup(&db);

    let (_, body) = submit_slip(&db, &tenant, booking_id);
    let payment_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = call(
        &db,
        request(
            "POST",
            &format!("/api/payments/{payment_id}/verify"),
            Some(&tenant),
            Some(json!({ "status": "verified" })),
        ),
    );
    assert_eq!(status, 403);
}

#[test]
fn second_pending_slip_is_refused() {
    let db = test_db("payment_duplicate_slip");
    let (tenant, _admin, _room_id, booking_id) = booked_setup(&db);

    let (status, _) = submit_slip(&db, &tenant, booking_id);
    assert_eq!(status, 201);
    let (status, _) = submit_slip(&db, &tenant, booking_id);
    assert_eq!(status, 409);
}

#[test]
fn payment_listing_is_scoped_by_role() {
    let db = test_db("payment_listing");
    let (tenant, admin, _room_id, booking_id) = booked_setup(&db);
    let (_, stranger) = seed_user(&db, "v@d.com", Role::User);

    submit_slip(&db, &tenant, booking_id);

    let (_, mine) = call(&db, request("GET", "/api/payments", Some(&tenant), None));
    assert_eq!(mine["data"].as_array().unwrap().len(), 1);

    let (_, theirs) = call(&db, request("GET", "/api/payments", Some(&stranger), None));
    assert_eq!(theirs["data"].as_array().unwrap().len(), 0);

    let (_, all) = call(&db, request("GET", "/api/payments", Some(&admin), None));
    assert_eq!(all["data"].as_array().unwrap().len(), 1);
}
