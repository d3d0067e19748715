// templates/pages.rs

use crate::domain::{Announcement, Room};
use crate::templates::page_layout;
use maud::{html, Markup};

/// Public landing page: what is bookable right now, and what the house
/// wants everyone to know.
pub fn home_page(rooms: &[Room], announcements: &[Announcement]) -> Markup {
    page_layout(
        "Dormhub",
        html! {
            h1 { "Available rooms" }
            @if rooms.is_empty() {
                p { "No rooms are available right now." }
            } @else {
                table {
                    thead {
                        tr {
                            th { "Room" }
                            th { "Floor" }
                            th { "Size (sqm)" }
                            th { "Monthly price" }
                            th { "Deposit" }
                        }
                    }
                    tbody {
                        @for room in rooms {
                            tr {
                                td { (room.room_number) }
                                td { (room.floor) }
                                td { (room.size) }
                                td { (room.price) }
                                td { (room.deposit) }
                            }
                        }
                    }
                }
            }

            h2 { "Announcements" }
            @if announcements.is_empty() {
                p { "Nothing posted." }
            } @else {
                @for announcement in announcements {
                    article {
                        h4 { (announcement.title) " [" (announcement.priority.as_str()) "]" }
                        p { (announcement.content) }
                    }
                }
            }
        },
    )
}
