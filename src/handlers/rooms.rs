use astra::Request;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db;
use crate::db::rooms::RoomFilter;
use crate::db::Database;
use crate::domain::RoomStatus;
use crate::errors::{ResultResp, ServerError};
use crate::handlers::read_json;
use crate::responses::{json_created, json_message, json_ok};
use crate::router::parse_query;
use crate::workflow::inventory;
use crate::workflow::inventory::{CreateRoom, RoomEdit};

#[derive(Deserialize)]
struct CreateRoomBody {
    room_number: String,
    price: i64,
    deposit: i64,
    water_rate: Option<i64>,
    electricity_rate: Option<i64>,
    status: Option<RoomStatus>,
    #[serde(default)]
    facilities: Vec<String>,
    #[serde(default)]
    images: Vec<String>,
    floor: i64,
    size: i64,
    max_occupants: Option<i64>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct UpdateRoomBody {
    room_number: Option<String>,
    price: Option<i64>,
    deposit: Option<i64>,
    water_rate: Option<i64>,
    electricity_rate: Option<i64>,
    status: Option<RoomStatus>,
    facilities: Option<Vec<String>>,
    images: Option<Vec<String>>,
    floor: Option<i64>,
    size: Option<i64>,
    max_occupants: Option<i64>,
    // present-and-null clears the description
    #[serde(default, with = "double_option")]
    description: Option<Option<String>>,
}

/// Distinguishes an absent field from an explicit null.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(de).map(Some)
    }
}

pub fn list(req: &Request, db: &Database) -> ResultResp {
    let params = parse_query(req);

    let mut filter = RoomFilter::default();
    if let Some(raw) = params.get("status") {
        filter.status = Some(
            RoomStatus::parse(raw)
                .ok_or_else(|| ServerError::BadRequest(format!("unknown status: {raw}")))?,
        );
    }
    filter.min_price = parse_opt_i64(params.get("min_price"), "min_price")?;
    filter.max_price = parse_opt_i64(params.get("max_price"), "max_price")?;
    filter.floor = parse_opt_i64(params.get("floor"), "floor")?;

    let rooms = db.with_conn(|conn| db::rooms::list(conn, &filter))?;
    json_ok(rooms)
}

pub fn get(db: &Database, id: i64) -> ResultResp {
    let room = db
        .with_conn(|conn| db::rooms::find_by_id(conn, id))?
        .ok_or_else(|| ServerError::NotFound("room not found".into()))?;
    json_ok(room)
}

pub fn create(req: &mut Request, db: &Database, ctx: &AuthContext, now: i64) -> ResultResp {
    ctx.require_staff()?;
    let body: CreateRoomBody = read_json(req)?;

    let room = db.with_conn(|conn| {
        inventory::create_room(
            conn,
            CreateRoom {
                room_number: body.room_number,
                price: body.price,
                deposit: body.deposit,
                water_rate: body.water_rate,
                electricity_rate: body.electricity_rate,
                status: body.status,
                facilities: body.facilities,
                images: body.images,
                floor: body.floor,
                size: body.size,
                max_occupants: body.max_occupants,
                description: body.description,
            },
            now,
        )
    })?;

    json_created(room, "room created")
}

pub fn update(req: &mut Request, db: &Database, ctx: &AuthContext, id: i64, now: i64) -> ResultResp {
    ctx.require_staff()?;
    let body: UpdateRoomBody = read_json(req)?;

    let room = db.with_conn(|conn| {
        inventory::update_room(
            conn,
            id,
            RoomEdit {
                room_number: body.room_number,
                price: body.price,
                deposit: body.deposit,
                water_rate: body.water_rate,
                electricity_rate: body.electricity_rate,
                status: body.status,
                facilities: body.facilities,
                images: body.images,
                floor: body.floor,
                size: body.size,
                max_occupants: body.max_occupants,
                description: body.description,
            },
            now,
        )
    })?;

    json_ok(room)
}

pub fn delete(db: &Database, ctx: &AuthContext, id: i64) -> ResultResp {
    ctx.require_staff()?;
    db.with_conn(|conn| inventory::delete_room(conn, id))?;
    json_message("room deleted")
}

fn parse_opt_i64(raw: Option<&String>, field: &str) -> Result<Option<i64>, ServerError> {
    raw.map(|s| {
        s.parse()
            .map_err(|_| ServerError::BadRequest(format!("invalid {field}: {s}")))
    })
    .transpose()
}
