use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    Appointment, MedicalRecord, NewUserRecord, OrganDonation, Session, User,
};
use crate::domain::error::DomainError;
use crate::domain::forms::{
    DonationForm, FieldErrors, LoginForm, RecordForm, RegisterForm, SlotForm,
};
use crate::domain::password;
use crate::domain::repo::{HospitalRepository, InsertUserError};

/// Outcome of a booking attempt. A slot that is gone by commit time is a
/// reportable outcome for the caller, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookOutcome {
    Booked,
    NotAvailable,
}

/// A patient's appointment view: own claimed slots plus everything still
/// open across doctors. Both lists carry the publishing doctor.
#[derive(Debug)]
pub struct PatientAppointments {
    pub booked: Vec<(Appointment, User)>,
    pub available: Vec<(Appointment, User)>,
}

/// Domain service with the business rules for every use case.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn HospitalRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn HospitalRepository>) -> Self {
        Self { repo }
    }

    // --- accounts & sessions ---

    #[instrument(name = "hospital.service.register", skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: RegisterForm) -> Result<User, DomainError> {
        info!("Registering new user");

        let registration = form.validate().map_err(DomainError::invalid)?;

        if self
            .repo
            .username_exists(&registration.username)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::username_taken(registration.username));
        }

        let password_hash = password::hash(&registration.password)
            .map_err(|e| DomainError::database(format!("password hashing failed: {e}")))?;

        let user = self
            .repo
            .insert_user(NewUserRecord {
                username: registration.username.clone(),
                password_hash,
                role: registration.role,
            })
            .await
            .map_err(|e| match e {
                // Race-lost insert: the unique constraint is the arbiter.
                InsertUserError::UsernameTaken => {
                    DomainError::username_taken(registration.username.clone())
                }
                InsertUserError::Other(e) => DomainError::database(e.to_string()),
            })?;

        info!(user_id = user.id, "Successfully registered user");
        Ok(user)
    }

    /// Verify credentials and establish a session.
    ///
    /// Unknown username and wrong password are indistinguishable to the
    /// caller: both collapse into `InvalidCredentials`.
    #[instrument(name = "hospital.service.login", skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: LoginForm) -> Result<(Session, User), DomainError> {
        let credentials = form.validate().map_err(DomainError::invalid)?;

        let user = self
            .repo
            .find_user_by_username(&credentials.username)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let Some(user) = user else {
            debug!("Login failed: unknown username");
            return Err(DomainError::InvalidCredentials);
        };

        if !password::verify(&credentials.password, &user.password_hash) {
            debug!("Login failed: password mismatch");
            return Err(DomainError::InvalidCredentials);
        }

        let session = self
            .repo
            .create_session(user.id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!(user_id = user.id, "Login successful");
        Ok((session, user))
    }

    /// Resolve a session token to its user, if any.
    pub async fn authenticate(&self, token: Uuid) -> Result<Option<User>, DomainError> {
        self.repo
            .find_user_by_session(token)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "hospital.service.logout", skip(self))]
    pub async fn logout(&self, token: Uuid) -> Result<(), DomainError> {
        let deleted = self
            .repo
            .delete_session(token)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            // Already gone; logout stays idempotent.
            debug!("Logout for a session that no longer exists");
        }
        Ok(())
    }

    // --- appointments ---

    #[instrument(name = "hospital.service.create_slot", skip(self, form), fields(doctor_id = doctor.id))]
    pub async fn create_slot(
        &self,
        doctor: &User,
        form: SlotForm,
    ) -> Result<Appointment, DomainError> {
        let slot = form.validate().map_err(DomainError::invalid)?;

        let appointment = self
            .repo
            .insert_slot(doctor.id, slot.date, slot.time)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!(appointment_id = appointment.id, "Appointment slot created");
        Ok(appointment)
    }

    pub async fn doctor_appointments(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<(Appointment, Option<User>)>, DomainError> {
        self.repo
            .appointments_for_doctor(doctor_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    pub async fn patient_appointments(
        &self,
        patient_id: i64,
    ) -> Result<PatientAppointments, DomainError> {
        let booked = self
            .repo
            .booked_appointments_for_patient(patient_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let available = self
            .repo
            .available_appointments()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(PatientAppointments { booked, available })
    }

    /// Claim a slot for `actor`. The repository performs the guarded
    /// status transition; a lost race reports `NotAvailable`.
    #[instrument(name = "hospital.service.book_appointment", skip(self, actor), fields(actor_id = actor.id, appointment_id = id))]
    pub async fn book_appointment(
        &self,
        actor: &User,
        id: i64,
    ) -> Result<BookOutcome, DomainError> {
        let appointment = self
            .repo
            .find_appointment(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or(DomainError::not_found("appointment", id))?;

        if appointment.patient_id.is_some() {
            debug!("Slot already booked");
            return Ok(BookOutcome::NotAvailable);
        }

        let claimed = self
            .repo
            .claim_appointment(id, actor.id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        if claimed {
            info!("Appointment booked");
            Ok(BookOutcome::Booked)
        } else {
            // Lost the race between the read above and the guarded update.
            warn!("Slot claimed concurrently by another user");
            Ok(BookOutcome::NotAvailable)
        }
    }

    // --- medical records ---

    #[instrument(name = "hospital.service.add_medical_record", skip(self, doctor, form), fields(doctor_id = doctor.id))]
    pub async fn add_medical_record(
        &self,
        doctor: &User,
        form: RecordForm,
    ) -> Result<MedicalRecord, DomainError> {
        match form.validate() {
            Ok(record) => {
                if !self
                    .repo
                    .patient_exists(record.patient_id)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?
                {
                    let mut errors = FieldErrors::new();
                    errors.add("patient_id", "Patient ID does not exist.");
                    return Err(DomainError::invalid(errors));
                }

                let created = self
                    .repo
                    .insert_record(record.patient_id, doctor.id, &record.diagnosis)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?;

                info!(record_id = created.id, "Medical record created");
                Ok(created)
            }
            Err(mut errors) => {
                // Run the cross-entity check even when other fields failed,
                // so the caller sees all field errors at once.
                if let Some(patient_id) = form.patient_id {
                    if !self
                        .repo
                        .patient_exists(patient_id)
                        .await
                        .map_err(|e| DomainError::database(e.to_string()))?
                    {
                        errors.add("patient_id", "Patient ID does not exist.");
                    }
                }
                Err(DomainError::invalid(errors))
            }
        }
    }

    pub async fn records_authored(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<(MedicalRecord, User)>, DomainError> {
        self.repo
            .records_authored_by(doctor_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    pub async fn patient_records(
        &self,
        patient_id: i64,
    ) -> Result<Vec<(MedicalRecord, User)>, DomainError> {
        self.repo
            .records_for_patient(patient_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    // --- organ donations ---

    #[instrument(name = "hospital.service.register_donation", skip(self, donor, form), fields(donor_id = donor.id))]
    pub async fn register_donation(
        &self,
        donor: &User,
        form: DonationForm,
    ) -> Result<OrganDonation, DomainError> {
        let donation = form.validate().map_err(DomainError::invalid)?;

        let created = self
            .repo
            .insert_donation(donor.id, &donation.organ)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!(donation_id = created.id, "Organ donation registered");
        Ok(created)
    }

    pub async fn available_donations(
        &self,
    ) -> Result<Vec<(OrganDonation, User)>, DomainError> {
        self.repo
            .available_donations()
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    pub async fn search_donations(
        &self,
        organ: &str,
    ) -> Result<Vec<(OrganDonation, User)>, DomainError> {
        self.repo
            .donations_by_organ(organ)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }
}
