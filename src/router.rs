use crate::auth;
use crate::db::Database;
use crate::errors::{ResultResp, ServerError};
use crate::handlers;
use astra::Request;

pub fn handle(mut req: Request, db: &Database) -> ResultResp {
    let now = chrono::Utc::now().timestamp();
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => handlers::home::page(db),

        ("POST", ["auth", "register"]) => handlers::auth::register(&mut req, db, now),
        ("POST", ["auth", "login"]) => handlers::auth::login(&mut req, db, now),
        ("POST", ["auth", "logout"]) => handlers::auth::logout(&req, db, now),

        ("GET", ["api", "rooms"]) => handlers::rooms::list(&req, db),
        ("GET", ["api", "rooms", id]) => handlers::rooms::get(db, parse_id(id)?),
        ("POST", ["api", "rooms"]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::rooms::create(&mut req, db, &ctx, now)
        }
        ("PUT", ["api", "rooms", id]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            let id = parse_id(id)?;
            handlers::rooms::update(&mut req, db, &ctx, id, now)
        }
        ("DELETE", ["api", "rooms", id]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::rooms::delete(db, &ctx, parse_id(id)?)
        }

        ("GET", ["api", "bookings"]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::bookings::list(db, &ctx)
        }
        ("POST", ["api", "bookings"]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::bookings::create(&mut req, db, &ctx, now)
        }
        ("GET", ["api", "bookings", id]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::bookings::get(db, &ctx, parse_id(id)?)
        }
        ("PATCH", ["api", "bookings", id]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            let id = parse_id(id)?;
            handlers::bookings::change_status(&mut req, db, &ctx, id, now)
        }

        ("GET", ["api", "payments"]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::payments::list(db, &ctx)
        }
        ("POST", ["api", "payments"]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::payments::submit(&mut req, db, &ctx, now)
        }
        ("POST", ["api", "payments", id, "verify"]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            let id = parse_id(id)?;
            handlers::payments::verify(&mut req, db, &ctx, id, now)
        }

        ("GET", ["api", "utilities"]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::utilities::list(&req, db, &ctx)
        }
        ("POST", ["api", "utilities"]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::utilities::create(&mut req, db, &ctx, now)
        }
        ("PUT" | "PATCH", ["api", "utilities", id]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            let id = parse_id(id)?;
            handlers::utilities::update(&mut req, db, &ctx, id, now)
        }
        ("DELETE", ["api", "utilities", id]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::utilities::delete(db, &ctx, parse_id(id)?)
        }

        ("GET", ["api", "announcements"]) => handlers::announcements::list(&req, db),
        ("POST", ["api", "announcements"]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::announcements::create(&mut req, db, &ctx, now)
        }
        ("PUT", ["api", "announcements", id]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            let id = parse_id(id)?;
            handlers::announcements::update(&mut req, db, &ctx, id, now)
        }
        ("DELETE", ["api", "announcements", id]) => {
            let ctx = auth::require_auth(&req, db, now)?;
            handlers::announcements::delete(db, &ctx, parse_id(id)?)
        }

        _ => Err(ServerError::NotFound("no such route".into())),
    }
}

fn parse_id(raw: &str) -> Result<i64, ServerError> {
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid id: {raw}")))
}

pub(crate) fn parse_query(req: &astra::Request) -> std::collections::HashMap<String, String> {
    let mut map = std::collections::HashMap::new();

    if let Some(q) = req.uri().query() {
        for pair in q.split('&') {
            let mut parts = pair.splitn(2, '=');
            if let (Some(k), Some(v)) = (parts.next(), parts.next()) {
                map.insert(k.to_string(), v.to_string());
            }
        }
    }

    map
}
