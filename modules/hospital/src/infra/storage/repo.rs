//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it can be constructed with a
//! `DatabaseConnection` or a transactional connection.

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::contract::model::{
    Appointment, MedicalRecord, NewUserRecord, OrganDonation, Session, User,
};
use crate::domain::repo::{HospitalRepository, InsertUserError};
use crate::infra::storage::entity::{
    appointments, medical_records, organ_donations, sessions, users,
};

pub struct SeaOrmHospitalRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmHospitalRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> HospitalRepository for SeaOrmHospitalRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    // --- users ---

    async fn insert_user(&self, user: NewUserRecord) -> Result<User, InsertUserError> {
        let m = users::ActiveModel {
            username: Set(user.username),
            password_hash: Set(user.password_hash),
            role: Set(user.role.into()),
            ..Default::default()
        };
        match m.insert(&self.conn).await {
            Ok(row) => Ok(row.into()),
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Err(InsertUserError::UsernameTaken)
                } else {
                    Err(InsertUserError::Other(
                        anyhow::Error::new(e).context("insert_user failed"),
                    ))
                }
            }
        }
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("username_exists failed")?;
        Ok(count > 0)
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let found = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("find_user_by_username failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_user_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let found = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_user_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn patient_exists(&self, id: i64) -> anyhow::Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::Role.eq(users::Role::Patient))
            .count(&self.conn)
            .await
            .context("patient_exists failed")?;
        Ok(count > 0)
    }

    // --- sessions ---

    async fn create_session(&self, user_id: i64) -> anyhow::Result<Session> {
        let m = sessions::ActiveModel {
            token: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        };
        let row = m.insert(&self.conn).await.context("create_session failed")?;
        Ok(row.into())
    }

    async fn find_user_by_session(&self, token: Uuid) -> anyhow::Result<Option<User>> {
        let found = sessions::Entity::find_by_id(token)
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("find_user_by_session failed")?;
        Ok(found.and_then(|(_, user)| user).map(Into::into))
    }

    async fn delete_session(&self, token: Uuid) -> anyhow::Result<bool> {
        let res = sessions::Entity::delete_by_id(token)
            .exec(&self.conn)
            .await
            .context("delete_session failed")?;
        Ok(res.rows_affected > 0)
    }

    // --- appointments ---

    async fn insert_slot(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> anyhow::Result<Appointment> {
        let m = appointments::ActiveModel {
            doctor_id: Set(doctor_id),
            patient_id: Set(None),
            date: Set(date),
            time: Set(time),
            status: Set(appointments::SlotStatus::Available),
            ..Default::default()
        };
        let row = m.insert(&self.conn).await.context("insert_slot failed")?;
        Ok(row.into())
    }

    async fn find_appointment(&self, id: i64) -> anyhow::Result<Option<Appointment>> {
        let found = appointments::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_appointment failed")?;
        Ok(found.map(Into::into))
    }

    async fn claim_appointment(&self, id: i64, patient_id: i64) -> anyhow::Result<bool> {
        // Single guarded UPDATE; the affected-row count is the arbiter
        // between two concurrent claimants.
        let res = appointments::Entity::update_many()
            .col_expr(appointments::Column::PatientId, Expr::value(patient_id))
            .col_expr(
                appointments::Column::Status,
                Expr::value(appointments::SlotStatus::Booked),
            )
            .filter(appointments::Column::Id.eq(id))
            .filter(appointments::Column::Status.eq(appointments::SlotStatus::Available))
            .exec(&self.conn)
            .await
            .context("claim_appointment failed")?;
        Ok(res.rows_affected == 1)
    }

    async fn appointments_for_doctor(
        &self,
        doctor_id: i64,
    ) -> anyhow::Result<Vec<(Appointment, Option<User>)>> {
        let rows = appointments::Entity::find()
            .filter(appointments::Column::DoctorId.eq(doctor_id))
            .find_also_linked(appointments::AppointmentToPatient)
            .order_by_asc(appointments::Column::Date)
            .order_by_asc(appointments::Column::Time)
            .all(&self.conn)
            .await
            .context("appointments_for_doctor failed")?;
        Ok(rows
            .into_iter()
            .map(|(a, patient)| (a.into(), patient.map(Into::into)))
            .collect())
    }

    async fn booked_appointments_for_patient(
        &self,
        patient_id: i64,
    ) -> anyhow::Result<Vec<(Appointment, User)>> {
        let rows = appointments::Entity::find()
            .filter(appointments::Column::PatientId.eq(patient_id))
            .find_also_linked(appointments::AppointmentToDoctor)
            .order_by_asc(appointments::Column::Date)
            .order_by_asc(appointments::Column::Time)
            .all(&self.conn)
            .await
            .context("booked_appointments_for_patient failed")?;
        Ok(rows
            .into_iter()
            .filter_map(|(a, doctor)| doctor.map(|d| (a.into(), d.into())))
            .collect())
    }

    async fn available_appointments(&self) -> anyhow::Result<Vec<(Appointment, User)>> {
        let rows = appointments::Entity::find()
            .filter(appointments::Column::Status.eq(appointments::SlotStatus::Available))
            .find_also_linked(appointments::AppointmentToDoctor)
            .order_by_asc(appointments::Column::Date)
            .order_by_asc(appointments::Column::Time)
            .all(&self.conn)
            .await
            .context("available_appointments failed")?;
        Ok(rows
            .into_iter()
            .filter_map(|(a, doctor)| doctor.map(|d| (a.into(), d.into())))
            .collect())
    }

    // --- medical records ---

    async fn insert_record(
        &self,
        patient_id: i64,
        doctor_id: i64,
        diagnosis: &str,
    ) -> anyhow::Result<MedicalRecord> {
        let m = medical_records::ActiveModel {
            patient_id: Set(patient_id),
            doctor_id: Set(doctor_id),
            diagnosis: Set(diagnosis.to_string()),
            recorded_at: Set(Utc::now()),
            ..Default::default()
        };
        let row = m.insert(&self.conn).await.context("insert_record failed")?;
        Ok(row.into())
    }

    async fn records_authored_by(
        &self,
        doctor_id: i64,
    ) -> anyhow::Result<Vec<(MedicalRecord, User)>> {
        let rows = medical_records::Entity::find()
            .filter(medical_records::Column::DoctorId.eq(doctor_id))
            .find_also_linked(medical_records::RecordToPatient)
            .order_by_asc(medical_records::Column::Id)
            .all(&self.conn)
            .await
            .context("records_authored_by failed")?;
        Ok(rows
            .into_iter()
            .filter_map(|(r, patient)| patient.map(|p| (r.into(), p.into())))
            .collect())
    }

    async fn records_for_patient(
        &self,
        patient_id: i64,
    ) -> anyhow::Result<Vec<(MedicalRecord, User)>> {
        let rows = medical_records::Entity::find()
            .filter(medical_records::Column::PatientId.eq(patient_id))
            .find_also_linked(medical_records::RecordToDoctor)
            .order_by_asc(medical_records::Column::Id)
            .all(&self.conn)
            .await
            .context("records_for_patient failed")?;
        Ok(rows
            .into_iter()
            .filter_map(|(r, doctor)| doctor.map(|d| (r.into(), d.into())))
            .collect())
    }

    // --- organ donations ---

    async fn insert_donation(&self, donor_id: i64, organ: &str) -> anyhow::Result<OrganDonation> {
        let m = organ_donations::ActiveModel {
            donor_id: Set(donor_id),
            organ: Set(organ.to_string()),
            available: Set(true),
            ..Default::default()
        };
        let row = m
            .insert(&self.conn)
            .await
            .context("insert_donation failed")?;
        Ok(row.into())
    }

    async fn available_donations(&self) -> anyhow::Result<Vec<(OrganDonation, User)>> {
        let rows = organ_donations::Entity::find()
            .filter(organ_donations::Column::Available.eq(true))
            .find_also_related(users::Entity)
            .order_by_asc(organ_donations::Column::Id)
            .all(&self.conn)
            .await
            .context("available_donations failed")?;
        Ok(rows
            .into_iter()
            .filter_map(|(d, donor)| donor.map(|u| (d.into(), u.into())))
            .collect())
    }

    async fn donations_by_organ(
        &self,
        organ: &str,
    ) -> anyhow::Result<Vec<(OrganDonation, User)>> {
        let rows = organ_donations::Entity::find()
            .filter(organ_donations::Column::Organ.eq(organ))
            .filter(organ_donations::Column::Available.eq(true))
            .find_also_related(users::Entity)
            .order_by_asc(organ_donations::Column::Id)
            .all(&self.conn)
            .await
            .context("donations_by_organ failed")?;
        Ok(rows
            .into_iter()
            .filter_map(|(d, donor)| donor.map(|u| (d.into(), u.into())))
            .collect())
    }
}
