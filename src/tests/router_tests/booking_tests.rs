use serde_json::json;

use crate::domain::Role;
use crate::tests::utils::{call, request, seed_room, seed_user, test_db};

fn book(db: &crate::db::Database, token: &str, room_id: i64) -> (u16, serde_json::Value) {
    call(
        db,
        request(
            "POST",
            "/api/bookings",
            Some(token),
            Some(json!({ "room_id": room_id, "check_in_date": "2025-01-10" })),
        ),
    )
}

#[test]
fn booking_a_room_prices_and_reserves_it() {
    let db = test_db("booking_create");
    let (_, token) = seed_user(&db, "u@d.com", Role::User);
    let room_id = seed_room(&db, "R101", 3000, 1000);

    let (status, body) = book(&db, &token, room_id);
    assert_eq!(status, 201, "booking failed: {body}");
    assert_eq!(body["data"]["total_amount"], 4000);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["deposit_paid"], false);
    assert_eq!(body["data"]["check_in_date"], "2025-01-10");

    let (_, room) = call(&db, request("GET", &format!("/api/rooms/{room_id}"), None, None));
    assert_eq!(room["data"]["status"], "reserved");
}

#[test]
fn a_reserved_room_cannot_be_booked_by_someone_else() {
    let db = test_db("booking_race");
    let (_, first) = seed_user(&db, "u@d.com", Role::User);
    let (_, second) = seed_user(&db, "v@d.com", Role::User);
    let room_id = seed_room(&db, "R101", 3000, 1000);

    let (status, _) = book(&db, &first, room_id);
    assert_eq!(status, 201);
    let (status, body) = book(&db, &second, room_id);
    assert_eq!(status, 409);
    assert_eq!(body["success"], false);
}

#[test]
fn one_active_booking_per_tenant() {
    let db = test_db("booking_single_active");
    let (_, token) = seed_user(&db, "u@d.com", Role::User);
    let first = seed_room(&db, "R101", 3000, 1000);
    let second = seed_room(&db, "R102", 2500, 800);

    let (status, _) = book(&db, &token, first);
    assert_eq!(status, 201);
    let (status, _) = book(&db, &token, second);
    assert_eq!(status, 409);
}

#[test]
fn booking_an_unknown_room_is_404() {
    let db = test_db("booking_unknown_room");
    let (_, token) = seed_user(&db, "u@d.com", Role::User);
    let (status, _) = book(&db, &token, 999);
    assert_eq!(status, 404);
}

#[test]
fn tenant_can_cancel_their_pending_booking() {
    let db = test_db("booking_cancel");
    let (_, token) = seed_user(&db, "u@d.com", Role::User);
    let room_id = seed_room(&db, "R101", 3000, 1000);

    let (_, body) = book(&db, &token, room_id);
    let booking_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &db,
        request(
            "PATCH",
            &format!("/api/bookings/{booking_id}"),
            Some(&token),
            Some(json!({ "status": "cancelled" })),
        ),
    );
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "cancelled");

    let (_, room) = call(&db, request("GET", &format!("/api/rooms/{room_id}"), None, None));
    assert_eq!(room["data"]["status"], "available");

    // cancelling again is an invalid transition
    let (status, _) = call(
        &db,
        request(
            "PATCH",
            &format!("/api/bookings/{booking_id}"),
            Some(&token),
            Some(json!({ "status": "cancelled" })),
        ),
    );
    assert_eq!(status, 400);
}

#[test]
fn bookings_are_private_to_their_owner() {
    let db = test_db("booking_ownership");
    let (_, owner) = seed_user(&db, "u@d.com", Role::User);
    let (_, stranger) = seed_user(&db, "v@d.com", Role::User);
    let (_, admin) = seed_user(&db, "a@d.com", Role::Admin);
    let room_id = seed_room(&db, "R101", 3000, 1000);

    let (_, body) = book(&db, &owner, room_id);
    let booking_id = body["data"]["id"].as_i64().unwrap();
    let path = format!("/api/bookings/{booking_id}");

    let (status, _) = call(&db, request("GET", &path, Some(&stranger), None));
    assert_eq!(status, 403);

    let (status, _) = call(&db, request("GET", &path, Some(&owner), None));
    assert_eq!(status, 200);
    let (status, _) = call(&db, request("GET", &path, Some(&admin), None));
    assert_eq!(status, 200);

    // listing: the stranger sees none, staff see all
    let (_, list) = call(&db, request("GET", "/api/bookings", Some(&stranger), None));
    assert_eq!(list["data"].as_array().unwrap().len(), 0);
    let (_, list) = call(&db, request("GET", "/api/bookings", Some(&admin), None));
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}
