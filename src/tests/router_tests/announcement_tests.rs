use serde_json::json;
use std::io::Read;

use crate::domain::Role;
use crate::tests::utils::{call, dispatch, request, seed_user, test_db};

#[test]
fn publish_update_and_retire_an_announcement() {
    let db = test_db("announcement_lifecycle");
    let (_, admin) = seed_user(&db, "a@d.com", Role::Admin);
    let (_, tenant) = seed_user(&db, "u@d.com", Role::User);

    // tenants cannot publish
    let (status, _) = call(
        &db,
        request(
            "POST",
            "/api/announcements",
            Some(&tenant),
            Some(json!({ "title": "Hi", "content": "there" })),
        ),
    );
    assert_eq!(status, 403);

    let (status, body) = call(
        &db,
        request(
            "POST",
            "/api/announcements",
            Some(&admin),
            Some(json!({ "title": "Water outage", "content": "Friday 9-12", "priority": "high" })),
        ),
    );
    assert_eq!(status, 201, "publish failed: {body}");
    assert_eq!(body["data"]["priority"], "high");
    assert_eq!(body["data"]["is_active"], true);
    let id = body["data"]["id"].as_i64().unwrap();

    // anyone can read
    let (status, body) = call(&db, request("GET", "/api/announcements?active=true", None, None));
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // retire it
    let (status, body) = call(
        &db,
        request(
            "PUT",
            &format!("/api/announcements/{id}"),
            Some(&admin),
            Some(json!({ "is_active": false })),
        ),
    );
    assert_eq!(status, 200);
    assert_eq!(body["data"]["is_active"], false);

    let (_, body) = call(&db, request("GET", "/api/announcements?active=true", None, None));
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    let (_, body) = call(&db, request("GET", "/api/announcements", None, None));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // delete it
    let (status, _) = call(
        &db,
        request("DELETE", &format!("/api/announcements/{id}"), Some(&admin), None),
    );
    assert_eq!(status, 200);
    let (status, _) = call(
        &db,
        request("DELETE", &format!("/api/announcements/{id}"), Some(&admin), None),
    );
    assert_eq!(status, 404);
}

#[test]
fn landing_page_lists_rooms_and_active_announcements() {
    let db = test_db("announcement_landing");
    let (_, admin) = seed_user(&db, "a@d.com", Role::Admin);
    crate::tests::utils::seed_room(&db, "R101", 3000, 1000);

    call(
        &db,
        request(
            "POST",
            "/api/announcements",
            Some(&admin),
            Some(json!({ "title": "Welcome week", "content": "Snacks in the lobby" })),
        ),
    );

    let resp = dispatch(request("GET", "/", None, None), &db);
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "text/html; charset=utf-8"
    );

    let mut html = String::new();
    resp.into_body().reader().read_to_string(&mut html).unwrap();
    assert!(html.contains("R101"));
    assert!(html.contains("Welcome week"));
}
