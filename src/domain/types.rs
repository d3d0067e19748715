// src/domain/types.rs
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "owner" => Some(Role::Owner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Reserved,
    Occupied,
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Reserved => "reserved",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<RoomStatus> {
        match s {
            "available" => Some(RoomStatus::Available),
            "reserved" => Some(RoomStatus::Reserved),
            "occupied" => Some(RoomStatus::Occupied),
            "maintenance" => Some(RoomStatus::Maintenance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<BookingStatus> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// An active booking is one that holds a room.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Verified,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Verified => "verified",
            PaymentStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<PaymentStatus> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "verified" => Some(PaymentStatus::Verified),
            "rejected" => Some(PaymentStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

// Status enums are stored as their lowercase text form.
macro_rules! impl_sql_text {
    ($ty:ty, $label:literal) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                <$ty>::parse(s).ok_or_else(|| {
                    FromSqlError::Other(format!("unknown {}: {s}", $label).into())
                })
            }
        }
    };
}

impl_sql_text!(Role, "role");
impl_sql_text!(RoomStatus, "room status");
impl_sql_text!(BookingStatus, "booking status");
impl_sql_text!(PaymentStatus, "payment status");
impl_sql_text!(Priority, "priority");

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub student_id: Option<String>,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: i64,
    pub room_number: String,
    pub price: i64,
    pub deposit: i64,
    pub water_rate: i64,
    pub electricity_rate: i64,
    pub status: RoomStatus,
    pub facilities: Vec<String>,
    pub images: Vec<String>,
    pub floor: i64,
    pub size: i64,
    pub max_occupants: i64,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub room_id: i64,
    pub check_in_date: NaiveDate,
    pub check_out_date: Option<NaiveDate>,
    /// room.price + room.deposit, computed at creation and frozen; later
    /// room price edits never touch it.
    pub total_amount: i64,
    pub deposit_paid: bool,
    pub status: BookingStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Best-effort fields extracted from a payment slip by the upstream
/// OCR/QR reader. Hints for the verifying admin, never authoritative:
/// the charged amount always comes from the booking or bill itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTarget {
    Booking(i64),
    UtilityBill(i64),
}

#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub booking_id: Option<i64>,
    pub utility_bill_id: Option<i64>,
    pub amount: i64,
    pub slip_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<ClaimData>,
    pub status: PaymentStatus,
    pub verified_by: Option<i64>,
    pub verified_at: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
}

impl Payment {
    /// Exactly one target is set (DB check constraint); `None` here means
    /// the row is corrupt.
    pub fn target(&self) -> Option<PaymentTarget> {
        match (self.booking_id, self.utility_bill_id) {
            (Some(id), None) => Some(PaymentTarget::Booking(id)),
            (None, Some(id)) => Some(PaymentTarget::UtilityBill(id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UtilityBill {
    pub id: i64,
    pub booking_id: i64,
    pub room_id: i64,
    pub user_id: i64,
    /// "YYYY-MM"
    pub month: String,
    pub water_usage: i64,
    pub water_cost: i64,
    pub electricity_usage: i64,
    pub electricity_cost: i64,
    pub total_cost: i64,
    pub paid: bool,
    pub paid_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub published_by: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
