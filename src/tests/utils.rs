use astra::{Body, Request, Response};
use serde_json::Value;
use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::password::hash_password_with_cost;
use crate::auth::sessions;
use crate::db::connection::{init_db, Database};
use crate::db::users::NewUser;
use crate::domain::Role;
use crate::responses::error_to_response;
use crate::router::handle;
use crate::workflow::inventory::{self, CreateRoom};

/// Fresh file-backed test DB with the production schema applied. A random
/// suffix keeps parallel tests and repeated runs apart.
pub fn test_db(name: &str) -> Database {
    let suffix: u64 = rand::random();
    let path = std::env::temp_dir().join(format!("dormhub_test_{name}_{suffix}.sqlite3"));
    let db = Database::new(path.to_string_lossy().to_string());
    init_db(&db, "sql/schema.sql").expect("test db initialization failed");
    db
}

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Insert a user directly (cheap bcrypt cost) and open a session for them.
/// Returns (user_id, bearer token). The session is stamped with the real
/// clock because the router authenticates against it.
pub fn seed_user(db: &Database, email: &str, role: Role) -> (i64, String) {
    let now = now_unix();
    let password_hash = hash_password_with_cost("password1", 4).unwrap();
    db.with_conn(|conn| {
        let user = crate::db::users::insert(
            conn,
            &NewUser {
                email,
                password_hash: &password_hash,
                first_name: "Test",
                last_name: "User",
                phone_number: "0800000000",
                student_id: None,
                role,
            },
            now,
        )?;
        let token = sessions::create_session(conn, user.id, now)?;
        Ok((user.id, token))
    })
    .unwrap()
}

pub fn seed_room(db: &Database, number: &str, price: i64, deposit: i64) -> i64 {
    db.with_conn(|conn| {
        inventory::create_room(
            conn,
            CreateRoom {
                room_number: number.to_string(),
                price,
                deposit,
                water_rate: None,
                electricity_rate: None,
                status: None,
                facilities: vec![],
                images: vec![],
                floor: 1,
                size: 24,
                max_occupants: None,
                description: None,
            },
            0,
        )
    })
    .unwrap()
    .id
}

/// Build a synthetic request for the router.
pub fn request(method: &str, path: &str, token: Option<&str>, body: Option<Value>) -> Request {
    let mut req = Request::new(match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    });
    *req.method_mut() = method.parse::<http::Method>().unwrap();
    *req.uri_mut() = path.parse::<http::Uri>().unwrap();
    if let Some(token) = token {
        req.headers_mut()
            .insert("authorization", format!("Bearer {token}").parse().unwrap());
    }
    req
}

/// Route a request the way main's serve loop does: handler errors become
/// their HTTP representation instead of bubbling out of the test.
pub fn dispatch(req: Request, db: &Database) -> Response {
    match handle(req, db) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    }
}

pub fn response_json(resp: Response) -> Value {
    let mut body = String::new();
    resp.into_body()
        .reader()
        .read_to_string(&mut body)
        .unwrap();
    serde_json::from_str(&body).unwrap_or_else(|e| panic!("invalid json body ({e}): {body}"))
}

/// Convenience: run a request and return (status, parsed body).
pub fn call(db: &Database, req: Request) -> (u16, Value) {
    let resp = dispatch(req, db);
    let status = resp.status().as_u16();
    (status, response_json(resp))
}
