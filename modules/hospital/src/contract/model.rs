use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// Account role, fixed at registration. There is no edit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure user model for the domain layer (no serde).
/// `password_hash` is an argon2 PHC string, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Data for creating a new user row; the password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Slot state. `Booked` holds exactly when `patient_id` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Available,
    Booked,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "available",
            SlotStatus::Booked => "booked",
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A doctor-published time slot, claimed at most once by a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: Option<i64>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: SlotStatus,
}

/// A diagnosis note linking one doctor to one patient. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub diagnosis: String,
    pub recorded_at: DateTime<Utc>,
}

/// A donor's pledge of one organ type. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganDonation {
    pub id: i64,
    pub donor_id: i64,
    pub organ: String,
    pub available: bool,
}

/// Server-side login session. No expiry within scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}
