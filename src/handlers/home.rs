use crate::db;
use crate::db::rooms::RoomFilter;
use crate::db::Database;
use crate::domain::RoomStatus;
use crate::errors::ResultResp;
use crate::responses::html_response;
use crate::templates::pages::home_page;

pub fn page(db: &Database) -> ResultResp {
    let (rooms, announcements) = db.with_conn(|conn| {
        let rooms = db::rooms::list(
            conn,
            &RoomFilter {
                status: Some(RoomStatus::Available),
                ..Default::default()
            },
        )?;
        let announcements = db::announcements::list(conn, true)?;
        Ok((rooms, announcements))
    })?;

    html_response(home_page(&rooms, &announcements))
}
