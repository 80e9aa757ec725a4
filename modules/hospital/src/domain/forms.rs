//! Per-use-case input forms.
//!
//! Each form owns the raw submitted strings and exposes
//! `validate() -> Result<Typed, FieldErrors>`. Validation failure is a
//! normal, reportable outcome: nothing here panics or propagates errors.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

use crate::contract::model::Role;

pub const USERNAME_MIN: usize = 4;
pub const USERNAME_MAX: usize = 25;
pub const PASSWORD_MIN: usize = 6;

const MSG_REQUIRED: &str = "This field is required.";

/// Ordered field -> messages map returned on validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// Flatten into a single line, e.g. for the public contract error.
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, msgs)| format!("{}: {}", field, msgs.join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn check_required(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, MSG_REQUIRED);
        false
    } else {
        true
    }
}

fn check_username(errors: &mut FieldErrors, username: &str) {
    if !check_required(errors, "username", username) {
        return;
    }
    let len = username.chars().count();
    if len < USERNAME_MIN || len > USERNAME_MAX {
        errors.add(
            "username",
            format!(
                "Field must be between {} and {} characters long.",
                USERNAME_MIN, USERNAME_MAX
            ),
        );
    }
}

/// Registration input: username, password + confirmation, role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm: String,
    pub role: String,
}

/// Validated registration data; password still plaintext, hashing is the
/// service's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<NewRegistration, FieldErrors> {
        let mut errors = FieldErrors::new();

        check_username(&mut errors, &self.username);

        if check_required(&mut errors, "password", &self.password) {
            if self.password.chars().count() < PASSWORD_MIN {
                errors.add(
                    "password",
                    format!("Field must be at least {} characters long.", PASSWORD_MIN),
                );
            }
            if self.password != self.confirm {
                errors.add("password", "Passwords must match");
            }
        }

        let role = match self.role.parse::<Role>() {
            Ok(role) => Some(role),
            Err(()) => {
                errors.add("role", "Not a valid choice.");
                None
            }
        };

        match role {
            Some(role) if errors.is_empty() => Ok(NewRegistration {
                username: self.username.clone(),
                password: self.password.clone(),
                role,
            }),
            _ => Err(errors),
        }
    }
}

/// Login input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginCredentials, FieldErrors> {
        let mut errors = FieldErrors::new();

        check_username(&mut errors, &self.username);
        check_required(&mut errors, "password", &self.password);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(LoginCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

/// Appointment-slot creation input: calendar date + time of day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotForm {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl SlotForm {
    pub fn validate(&self) -> Result<NewSlot, FieldErrors> {
        let mut errors = FieldErrors::new();

        let date = if check_required(&mut errors, "date", &self.date) {
            match NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.add("date", "Not a valid date value.");
                    None
                }
            }
        } else {
            None
        };

        let time = if check_required(&mut errors, "time", &self.time) {
            let raw = self.time.trim();
            match NaiveTime::parse_from_str(raw, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.add("time", "Not a valid time value.");
                    None
                }
            }
        } else {
            None
        };

        match (date, time) {
            (Some(date), Some(time)) => Ok(NewSlot { date, time }),
            _ => Err(errors),
        }
    }
}

/// Medical-record creation input. The cross-entity check (patient_id must
/// reference a role=patient user) needs repository access and runs in the
/// service, reporting on the same `patient_id` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordForm {
    pub patient_id: Option<i64>,
    pub diagnosis: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub patient_id: i64,
    pub diagnosis: String,
}

impl RecordForm {
    pub fn validate(&self) -> Result<NewRecord, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.patient_id.is_none() {
            errors.add("patient_id", MSG_REQUIRED);
        }
        check_required(&mut errors, "diagnosis", &self.diagnosis);

        match self.patient_id {
            Some(patient_id) if errors.is_empty() => Ok(NewRecord {
                patient_id,
                diagnosis: self.diagnosis.clone(),
            }),
            _ => Err(errors),
        }
    }
}

/// Organ-donation registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationForm {
    pub organ: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonation {
    pub organ: String,
}

impl DonationForm {
    pub fn validate(&self) -> Result<NewDonation, FieldErrors> {
        let mut errors = FieldErrors::new();

        check_required(&mut errors, "organ", &self.organ);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewDonation {
            organ: self.organ.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form() -> RegisterForm {
        RegisterForm {
            username: "drsmith".into(),
            password: "hunter22".into(),
            confirm: "hunter22".into(),
            role: "doctor".into(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        let reg = register_form().validate().expect("valid form");
        assert_eq!(reg.username, "drsmith");
        assert_eq!(reg.role, Role::Doctor);
    }

    #[test]
    fn short_username_is_rejected() {
        let mut form = register_form();
        form.username = "abc".into();
        let errors = form.validate().expect_err("too short");
        assert_eq!(
            errors.get("username").expect("username errors")[0],
            "Field must be between 4 and 25 characters long."
        );
    }

    #[test]
    fn password_mismatch_is_rejected() {
        let mut form = register_form();
        form.confirm = "different".into();
        let errors = form.validate().expect_err("mismatch");
        assert!(errors
            .get("password")
            .expect("password errors")
            .iter()
            .any(|m| m == "Passwords must match"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let mut form = register_form();
        form.role = "admin".into();
        let errors = form.validate().expect_err("bad role");
        assert_eq!(errors.get("role").expect("role errors")[0], "Not a valid choice.");
    }

    #[test]
    fn missing_fields_collect_all_errors() {
        let form = RegisterForm {
            username: String::new(),
            password: String::new(),
            confirm: String::new(),
            role: "patient".into(),
        };
        let errors = form.validate().expect_err("missing");
        assert!(errors.get("username").is_some());
        assert!(errors.get("password").is_some());
        assert!(errors.get("role").is_none());
    }

    #[test]
    fn slot_form_parses_date_and_time() {
        let form = SlotForm {
            date: "2025-03-01".into(),
            time: "09:00".into(),
        };
        let slot = form.validate().expect("valid slot");
        assert_eq!(slot.date, NaiveDate::from_ymd_opt(2025, 3, 1).expect("date"));
        assert_eq!(slot.time, NaiveTime::from_hms_opt(9, 0, 0).expect("time"));
    }

    #[test]
    fn slot_form_rejects_garbage() {
        let form = SlotForm {
            date: "01/03/2025".into(),
            time: "9 am".into(),
        };
        let errors = form.validate().expect_err("garbage");
        assert_eq!(errors.get("date").expect("date errors")[0], "Not a valid date value.");
        assert_eq!(errors.get("time").expect("time errors")[0], "Not a valid time value.");
    }

    #[test]
    fn record_form_requires_patient_and_diagnosis() {
        let form = RecordForm {
            patient_id: None,
            diagnosis: "  ".into(),
        };
        let errors = form.validate().expect_err("empty");
        assert!(errors.get("patient_id").is_some());
        assert!(errors.get("diagnosis").is_some());
    }

    #[test]
    fn donation_form_trims_organ() {
        let form = DonationForm {
            organ: " kidney ".into(),
        };
        assert_eq!(form.validate().expect("valid").organ, "kidney");
    }

    #[test]
    fn field_errors_summary_is_stable() {
        let mut errors = FieldErrors::new();
        errors.add("b", "second");
        errors.add("a", "first");
        assert_eq!(errors.summary(), "a: first; b: second");
    }
}
