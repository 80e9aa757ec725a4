use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{Appointment, MedicalRecord, OrganDonation, User};
use crate::domain::forms::{
    DonationForm, FieldErrors, LoginForm, RecordForm, RegisterForm, SlotForm,
};

/// Public user representation; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub role: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role.as_str().to_string(),
        }
    }
}

/// One-shot message for the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FlashDto {
    /// "success", "info", "warning" or "danger"
    pub level: String,
    pub message: String,
}

impl FlashDto {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: "success".into(),
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: "info".into(),
            message: message.into(),
        }
    }
}

// --- request DTOs -----------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterReq {
    pub username: String,
    pub password: String,
    pub confirm: String,
    pub role: String,
}

impl RegisterReq {
    /// Echo for re-rendering a failed form; passwords are never echoed.
    pub fn scrubbed(mut self) -> Self {
        self.password = String::new();
        self.confirm = String::new();
        self
    }
}

impl From<RegisterReq> for RegisterForm {
    fn from(req: RegisterReq) -> Self {
        Self {
            username: req.username,
            password: req.password,
            confirm: req.confirm,
            role: req.role,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

impl LoginReq {
    pub fn scrubbed(mut self) -> Self {
        self.password = String::new();
        self
    }
}

impl From<LoginReq> for LoginForm {
    fn from(req: LoginReq) -> Self {
        Self {
            username: req.username,
            password: req.password,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SlotReq {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Time of day, `HH:MM`
    pub time: String,
}

impl From<SlotReq> for SlotForm {
    fn from(req: SlotReq) -> Self {
        Self {
            date: req.date,
            time: req.time,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RecordReq {
    pub patient_id: Option<i64>,
    pub diagnosis: String,
}

impl From<RecordReq> for RecordForm {
    fn from(req: RecordReq) -> Self {
        Self {
            patient_id: req.patient_id,
            diagnosis: req.diagnosis,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DonationReq {
    pub organ: String,
}

impl From<DonationReq> for DonationForm {
    fn from(req: DonationReq) -> Self {
        Self { organ: req.organ }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Organ label to filter by, exact match.
    pub organ: Option<String>,
}

/// 422 body: per-field messages plus the submitted values (passwords
/// scrubbed) so the renderer can re-fill the form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvalidFormDto {
    #[schema(value_type = Object)]
    pub values: serde_json::Value,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl InvalidFormDto {
    pub fn new(values: impl Serialize, errors: FieldErrors) -> Self {
        Self {
            values: serde_json::to_value(values).unwrap_or(serde_json::Value::Null),
            errors: errors.into_map(),
        }
    }
}

// --- page view-models -------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomeDto {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardDto {
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginOkDto {
    pub token: Uuid,
    pub user: UserDto,
    pub redirect_to: String,
    pub flash: FlashDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppointmentDto {
    pub id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: String,
    pub doctor: Option<UserDto>,
    pub patient: Option<UserDto>,
}

impl AppointmentDto {
    fn new(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            date: appointment.date,
            time: appointment.time,
            status: appointment.status.as_str().to_string(),
            doctor: None,
            patient: None,
        }
    }

    /// A doctor's own slot, showing the claiming patient when booked.
    pub fn with_patient(appointment: Appointment, patient: Option<User>) -> Self {
        let mut dto = Self::new(appointment);
        dto.patient = patient.map(Into::into);
        dto
    }

    /// A slot as seen by a patient, showing the publishing doctor.
    pub fn with_doctor(appointment: Appointment, doctor: User) -> Self {
        let mut dto = Self::new(appointment);
        dto.doctor = Some(doctor.into());
        dto
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorAppointmentsDto {
    pub flash: Option<FlashDto>,
    pub appointments: Vec<AppointmentDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientAppointmentsDto {
    pub booked: Vec<AppointmentDto>,
    pub available: Vec<AppointmentDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MedicalRecordDto {
    pub id: i64,
    pub diagnosis: String,
    pub recorded_at: DateTime<Utc>,
    pub patient: Option<UserDto>,
    pub doctor: Option<UserDto>,
}

impl MedicalRecordDto {
    fn new(record: MedicalRecord) -> Self {
        Self {
            id: record.id,
            diagnosis: record.diagnosis,
            recorded_at: record.recorded_at,
            patient: None,
            doctor: None,
        }
    }

    /// An authored record, showing the subject patient.
    pub fn with_patient(record: MedicalRecord, patient: User) -> Self {
        let mut dto = Self::new(record);
        dto.patient = Some(patient.into());
        dto
    }

    /// A patient's record, showing the authoring doctor.
    pub fn with_doctor(record: MedicalRecord, doctor: User) -> Self {
        let mut dto = Self::new(record);
        dto.doctor = Some(doctor.into());
        dto
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorRecordsDto {
    pub flash: Option<FlashDto>,
    pub records: Vec<MedicalRecordDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientRecordsDto {
    pub records: Vec<MedicalRecordDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonationDto {
    pub id: i64,
    pub organ: String,
    pub available: bool,
    pub donor: Option<UserDto>,
}

impl DonationDto {
    pub fn with_donor(donation: OrganDonation, donor: Option<User>) -> Self {
        Self {
            id: donation.id,
            organ: donation.organ,
            available: donation.available,
            donor: donor.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonationsPageDto {
    pub flash: Option<FlashDto>,
    pub donations: Vec<DonationDto>,
}
