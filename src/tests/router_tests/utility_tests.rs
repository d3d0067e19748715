use serde_json::{json, Value};

use crate::db::Database;
use crate::domain::Role;
use crate::tests::utils::{call, request, seed_room, seed_user, test_db};

/// tenant + admin + booked room (rates 18/8).
/// Returns (tenant token, admin token, tenant id, room id, booking id).
fn tenancy(db: &Database) -> (String, String, i64, i64, i64) {
    let (tenant_id, tenant) = seed_user(db, "u@d.com", Role::User);
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
    (tenant, admin, tenant_id, room_id, booking_id)
}

fn create_bill(
    db: &Database,
    admin: &str,
    room_id: i64,
    booking_id: i64,
    user_id: i64,
    month: &str,
) -> (u16, Value) {
    call(
        db,
        request(
            "POST",
            "/api/utilities",
            Some(admin),
            Some(json!({
                "room_id": room_id,
                "booking_id": booking_id,
                "user_id": user_id,
                "month": month,
                "water_usage": 10,
                "electricity_usage": 100
            })),
        ),
    )
}

#[test]
fn bill_costs_follow_the_room_rates() {
    let db = test_db("utility_costs");
    let (_tenant, admin, tenant_id, room_id, booking_id) = tenancy(&db);

    let (status, body) = create_bill(&db, &admin, room_id, booking_id, tenant_id, "2025-02");
    assert_eq!(status, 201, "bill create failed: {body}");
    assert_eq!(body["data"]["water_cost"], 180);
    assert_eq!(body["data"]["electricity_cost"], 800);
    assert_eq!(body["data"]["total_cost"], 980);
    assert_eq!(body["data"]["paid"], false);

    // same booking, same month: refused
    let (status, _) = create_bill(&db, &admin, room_id, booking_id, tenant_id, "2025-02");
    assert_eq!(status, 409);

    // bad month key: refused
    let (status, _) = create_bill(&db, &admin, room_id, booking_id, tenant_id, "2025-13");
    assert_eq!(status, 400);
}

#[test]
fn billing_is_staff_only() {
    let db = test_db("utility_staff_only");
    let (tenant, _admin, tenant_id, room_id, booking_id) = tenancy(&db);

    let (status, _) = create_bill(&db, &tenant, room_id, booking_id, tenant_id, "2025-02");
    assert_eq!(status, 403);
}

#[test]
fn editing_reprices_and_paid_bills_freeze() {
    let db = test_db("utility_edit");
    let (tenant, admin, tenant_id, room_id, booking_id) = tenancy(&db);

    let (_, body) = create_bill(&db, &admin, room_id, booking_id, tenant_id, "2025-02");
    let bill_id = body["data"]["id"].as_i64().unwrap();
    let bill_path = format!("/api/utilities/{bill_id}");

    // usage correction reprices from the room's current rates
    let (status, body) = call(
        &db,
        request("PUT", &bill_path, Some(&admin), Some(json!({ "water_usage": 20 }))),
    );
    assert_eq!(status, 200);
    assert_eq!(body["data"]["water_cost"], 360);
    assert_eq!(body["data"]["total_cost"], 1160);

    // tenant pays, admin verifies
    let (status, body) = call(
        &db,
        request(
            "POST",
            "/api/payments",
            Some(&tenant),
            Some(json!({ "utility_bill_id": bill_id, "slip_image": "slips/bill.jpg" })),
        ),
    );
    assert_eq!(status, 201);
    assert_eq!(body["data"]["amount"], 1160);
    let payment_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = call(
        &db,
        request(
            "POST",
            &format!("/api/payments/{payment_id}/verify"),
            Some(&admin),
            Some(json!({ "status": "verified" })),
        ),
    );
    assert_eq!(status, 200);

    let (_, bills) = call(&db, request("GET", "/api/utilities", Some(&tenant), None));
    assert_eq!(bills["data"][0]["paid"], true);

    // a paid bill can be neither edited nor deleted
    let (status, _) = call(
        &db,
        request("PUT", &bill_path, Some(&admin), Some(json!({ "water_usage": 30 }))),
    );
    assert_eq!(status, 400);
    let (status, _) = call(&db, request("DELETE", &bill_path, Some(&admin), None));
    assert_eq!(status, 409);
}

#[test]
fn unpaid_bills_can_be_deleted() {
    let db = test_db("utility_delete");
    let (_tenant, admin, tenant_id, room_id, booking_id) = tenancy(&db);

    let (_, body) = create_bill(&db, &admin, room_id, booking_id, tenant_id, "2025-02");
    let bill_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = call(
        &db,
        request("DELETE", &format!("/api/utilities/{bill_id}"), Some(&admin), None),
    );
    assert_eq!(status, 200);

    let (status, _) = call(
        &db,
        request("DELETE", &format!("/api/utilities/{bill_id}"), Some(&admin), None),
    );
    assert_eq!(status, 404);
}

#[test]
fn bill_listing_is_scoped_and_filterable() {
    let db = test_db("utility_listing");
    let (tenant, admin, tenant_id, room_id, booking_id) = tenancy(&db);
    let (_, stranger) = seed_user(&db, "v@d.com", Role::User);

    create_bill(&db, &admin, room_id, booking_id, tenant_id, "2025-02");
    create_bill(&db, &admin, room_id, booking_id, tenant_id, "2025-03");

    let (_, mine) = call(&db, request("GET", "/api/utilities", Some(&tenant), None));
    assert_eq!(mine["data"].as_array().unwrap().len(), 2);

    let (_, theirs) = call(&db, request("GET", "/api/utilities", Some(&stranger), None));
    assert_eq!(theirs["data"].as_array().unwrap().len(), 0);

    let (_, feb) = call(
        &db,
        request("GET", "/api/utilities?month=2025-02", Some(&admin), None),
    );
    assert_eq!(feb["data"].as_array().unwrap().len(), 1);
    assert_eq!(feb["data"][0]["month"], "2025-02");
}
