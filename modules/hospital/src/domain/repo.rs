use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::{
    Appointment, MedicalRecord, NewUserRecord, OrganDonation, Session, User,
};

/// Insert failure for new users: the unique username constraint is the one
/// write that can race, so it gets its own variant.
#[derive(Debug, Error)]
pub enum InsertUserError {
    #[error("username already taken")]
    UsernameTaken,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// List operations return entities paired with the related user they are
/// displayed with, fetched eagerly in one query.
#[async_trait]
pub trait HospitalRepository: Send + Sync {
    // --- users ---

    /// Insert a new user; the username unique constraint decides races.
    async fn insert_user(&self, user: NewUserRecord) -> Result<User, InsertUserError>;
    /// Check uniqueness by username.
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    /// True iff `id` references an existing user whose role is patient.
    async fn patient_exists(&self, id: i64) -> anyhow::Result<bool>;

    // --- sessions ---

    async fn create_session(&self, user_id: i64) -> anyhow::Result<Session>;
    /// Resolve a session token to its user in one join.
    async fn find_user_by_session(&self, token: Uuid) -> anyhow::Result<Option<User>>;
    /// Delete by token. Returns true if a row was deleted.
    async fn delete_session(&self, token: Uuid) -> anyhow::Result<bool>;

    // --- appointments ---

    async fn insert_slot(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> anyhow::Result<Appointment>;
    async fn find_appointment(&self, id: i64) -> anyhow::Result<Option<Appointment>>;
    /// Atomically claim an available slot for `patient_id`.
    ///
    /// Single conditional UPDATE guarded on `status = available`; the
    /// affected-row count decides success, so two racing claimants can
    /// never both win.
    async fn claim_appointment(&self, id: i64, patient_id: i64) -> anyhow::Result<bool>;
    /// All slots a doctor published, with the claiming patient when booked.
    async fn appointments_for_doctor(
        &self,
        doctor_id: i64,
    ) -> anyhow::Result<Vec<(Appointment, Option<User>)>>;
    /// Slots a patient has claimed, with the publishing doctor.
    async fn booked_appointments_for_patient(
        &self,
        patient_id: i64,
    ) -> anyhow::Result<Vec<(Appointment, User)>>;
    /// All currently available slots across doctors, with the doctor.
    async fn available_appointments(&self) -> anyhow::Result<Vec<(Appointment, User)>>;

    // --- medical records ---

    async fn insert_record(
        &self,
        patient_id: i64,
        doctor_id: i64,
        diagnosis: &str,
    ) -> anyhow::Result<MedicalRecord>;
    /// Records a doctor authored, with the subject patient.
    async fn records_authored_by(
        &self,
        doctor_id: i64,
    ) -> anyhow::Result<Vec<(MedicalRecord, User)>>;
    /// A patient's own records, with the authoring doctor.
    async fn records_for_patient(
        &self,
        patient_id: i64,
    ) -> anyhow::Result<Vec<(MedicalRecord, User)>>;

    // --- organ donations ---

    async fn insert_donation(&self, donor_id: i64, organ: &str) -> anyhow::Result<OrganDonation>;
    /// All available donations, with the donor.
    async fn available_donations(&self) -> anyhow::Result<Vec<(OrganDonation, User)>>;
    /// Available donations matching an organ label exactly, with the donor.
    async fn donations_by_organ(&self, organ: &str)
        -> anyhow::Result<Vec<(OrganDonation, User)>>;
}
