// src/tests/router_tests/auth_tests.rs
use serde_json::json;

use crate::domain::Role;
use crate::tests::utils::{call, request, seed_user, test_db};

#[test]
fn register_login_logout_round_trip() {
    let db = test_db("auth_round_trip");

    // register
    let (status, body) = call(
        &db,
        request(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "email": "New.Tenant@Example.com",
                "password": "secret99",
                "first_name": "New",
                "last_name": "Tenant",
                "phone_number": "0811111111"
            })),
        ),
    );
    assert_eq!(status, 201, "register failed: {body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "new.tenant@example.com");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["user"].get("password_hash").is_none());
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // the token works
    let (status, _) = call(&db, request("GET", "/api/bookings", Some(&token), None));
    assert_eq!(status, 200);

    // duplicate email
    let (status, _) = call(
        &db,
        request(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "email": "new.tenant@example.com",
                "password": "secret99",
                "first_name": "New",
                "last_name": "Tenant",
                "phone_number": "0811111111"
            })),
        ),
    );
    assert_eq!(status, 409);

    // wrong password
    let (status, _) = call(
        &db,
        request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "new.tenant@example.com", "password": "wrong" })),
        ),
    );
    assert_eq!(status, 401);

    // right password
    let (status, body) = call(
        &db,
        request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "new.tenant@example.com", "password": "secret99" })),
        ),
    );
    assert_eq!(status, 200);
    let login_token = body["data"]["token"].as_str().unwrap().to_string();

    // logout kills the session
    let (status, _) = call(&db, request("POST", "/auth/logout", Some(&login_token), None));
    assert_eq!(status, 200);
    let (status, _) = call(&db, request("GET", "/api/bookings", Some(&login_token), None));
    assert_eq!(status, 401);
}

#[test]
fn protected_routes_need_a_credential() {
    let db = test_db("auth_protected");

    let (status, body) = call(&db, request("GET", "/api/bookings", None, None));
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);

    let (status, _) = call(&db, request("GET", "/api/bookings", Some("bogus-token"), None));
    assert_eq!(status, 401);
}

#[test]
fn staff_routes_reject_plain_users() {
    let db = test_db("auth_staff_gate");
    let (_, user_token) = seed_user(&db, "u@d.com", Role::User);

    let (status, _) = call(
        &db,
        request(
            "POST",
            "/api/rooms",
            Some(&user_token),
            Some(json!({
                "room_number": "R101", "price": 3000, "deposit": 1000,
                "floor": 1, "size": 24
            })),
        ),
    );
    assert_eq!(status, 403);
}

#[test]
fn unknown_route_is_a_json_404() {
    let db = test_db("auth_unknown_route");
    let (status, body) = call(&db, request("GET", "/api/nonsense", None, None));
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
}
