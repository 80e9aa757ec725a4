use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use tracing::info;

use crate::api::rest::dto::{
    AppointmentDto, DashboardDto, DoctorAppointmentsDto, DoctorRecordsDto, DonationDto,
    DonationReq, DonationsPageDto, FlashDto, HomeDto, InvalidFormDto, LoginOkDto, LoginReq,
    MedicalRecordDto, PatientAppointmentsDto, PatientRecordsDto, RecordReq, RegisterReq,
    SearchQuery, SlotReq,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::AuthSession;
use crate::api::rest::problem::{self, ProblemResponse};
use crate::contract::model::Role;
use crate::domain::error::DomainError;
use crate::domain::forms::FieldErrors;
use crate::domain::service::{BookOutcome, Service};

/// 303 with the flash text carried as a URL-encoded `notice` query
/// parameter for the out-of-scope renderer.
fn redirect_with_notice(path: &str, notice: &str) -> Redirect {
    Redirect::to(&format!("{}?notice={}", path, urlencoding::encode(notice)))
}

/// 422 re-render payload: field errors plus the submitted values.
fn invalid_form(values: impl serde::Serialize, errors: FieldErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(InvalidFormDto::new(values, errors)),
    )
        .into_response()
}

fn role_mismatch() -> Response {
    redirect_with_notice("/dashboard", "Invalid Role").into_response()
}

/// Router fallback: unknown paths get the same problem page as missing
/// entities.
pub async fn fallback_not_found(uri: axum::http::Uri) -> ProblemResponse {
    problem::not_found(format!("No such page: {}", uri.path()))
}

/// Landing page.
#[utoipa::path(get, path = "/", tag = "hospital",
    responses((status = 200, body = HomeDto, description = "Landing view-model")))]
pub async fn home() -> Json<HomeDto> {
    Json(HomeDto {
        message: "Welcome to the hospital management system".to_string(),
    })
}

/// Empty registration form view.
#[utoipa::path(get, path = "/register", tag = "accounts",
    responses((status = 200, body = RegisterReq, description = "Empty form values")))]
pub async fn register_form() -> Json<RegisterReq> {
    Json(RegisterReq::default())
}

/// Create a user account.
#[utoipa::path(post, path = "/register", tag = "accounts",
    request_body = RegisterReq,
    responses(
        (status = 303, description = "Registered; redirect to login"),
        (status = 409, description = "Username already taken"),
        (status = 422, body = InvalidFormDto, description = "Validation failure"),
    ))]
pub async fn register(
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<RegisterReq>,
) -> Response {
    match svc.register(req.clone().into()).await {
        Ok(user) => {
            info!(user_id = user.id, "User registered");
            redirect_with_notice("/login", "Registration Successful! Please log in.")
                .into_response()
        }
        Err(DomainError::Invalid { errors }) => invalid_form(req.scrubbed(), errors),
        Err(e) => map_domain_error(&e, "/register").into_response(),
    }
}

/// Empty login form view.
#[utoipa::path(get, path = "/login", tag = "accounts",
    responses((status = 200, body = LoginReq, description = "Empty form values")))]
pub async fn login_form() -> Json<LoginReq> {
    Json(LoginReq::default())
}

/// Verify credentials and start a session.
#[utoipa::path(post, path = "/login", tag = "accounts",
    request_body = LoginReq,
    responses(
        (status = 200, body = LoginOkDto, description = "Session established"),
        (status = 401, description = "Invalid username or password"),
        (status = 422, body = InvalidFormDto, description = "Validation failure"),
    ))]
pub async fn login(
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<LoginReq>,
) -> Response {
    match svc.login(req.clone().into()).await {
        Ok((session, user)) => Json(LoginOkDto {
            token: session.token,
            user: user.into(),
            redirect_to: "/dashboard".to_string(),
            flash: FlashDto::success("Logged in Successfully!"),
        })
        .into_response(),
        Err(DomainError::Invalid { errors }) => invalid_form(req.scrubbed(), errors),
        Err(e) => map_domain_error(&e, "/login").into_response(),
    }
}

/// End the current session.
#[utoipa::path(get, path = "/logout", tag = "accounts",
    responses((status = 303, description = "Session destroyed; redirect home")))]
pub async fn logout(session: AuthSession, Extension(svc): Extension<Arc<Service>>) -> Response {
    match svc.logout(session.token).await {
        Ok(()) => redirect_with_notice("/", "You have been logged out.").into_response(),
        Err(e) => map_domain_error(&e, "/logout").into_response(),
    }
}

/// Role-neutral landing for authenticated users.
#[utoipa::path(get, path = "/dashboard", tag = "hospital",
    responses((status = 200, body = DashboardDto)))]
pub async fn dashboard(session: AuthSession) -> Json<DashboardDto> {
    Json(DashboardDto {
        username: session.user.username,
        role: session.user.role.as_str().to_string(),
    })
}

/// Appointment lists, branched per role.
#[utoipa::path(get, path = "/appointments", tag = "appointments",
    responses(
        (status = 200, body = DoctorAppointmentsDto, description = "Doctor: own slots"),
        (status = 200, body = PatientAppointmentsDto, description = "Patient: booked + available"),
    ))]
pub async fn appointments(
    session: AuthSession,
    Extension(svc): Extension<Arc<Service>>,
) -> Response {
    match session.user.role {
        Role::Doctor => match svc.doctor_appointments(session.user.id).await {
            Ok(rows) => Json(DoctorAppointmentsDto {
                flash: None,
                appointments: rows
                    .into_iter()
                    .map(|(a, patient)| AppointmentDto::with_patient(a, patient))
                    .collect(),
            })
            .into_response(),
            Err(e) => map_domain_error(&e, "/appointments").into_response(),
        },
        Role::Patient => match svc.patient_appointments(session.user.id).await {
            Ok(lists) => Json(PatientAppointmentsDto {
                booked: lists
                    .booked
                    .into_iter()
                    .map(|(a, doctor)| AppointmentDto::with_doctor(a, doctor))
                    .collect(),
                available: lists
                    .available
                    .into_iter()
                    .map(|(a, doctor)| AppointmentDto::with_doctor(a, doctor))
                    .collect(),
            })
            .into_response(),
            Err(e) => map_domain_error(&e, "/appointments").into_response(),
        },
    }
}

/// Publish a new appointment slot (doctors only).
#[utoipa::path(post, path = "/appointments", tag = "appointments",
    request_body = SlotReq,
    responses(
        (status = 201, body = DoctorAppointmentsDto, description = "Slot created; refreshed list"),
        (status = 303, description = "Role mismatch; redirect to dashboard"),
        (status = 422, body = InvalidFormDto, description = "Validation failure"),
    ))]
pub async fn create_appointment(
    session: AuthSession,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<SlotReq>,
) -> Response {
    if session.user.role != Role::Doctor {
        return role_mismatch();
    }

    match svc.create_slot(&session.user, req.clone().into()).await {
        Ok(_) => match svc.doctor_appointments(session.user.id).await {
            Ok(rows) => (
                StatusCode::CREATED,
                Json(DoctorAppointmentsDto {
                    flash: Some(FlashDto::success("Appointment Slot Created!")),
                    appointments: rows
                        .into_iter()
                        .map(|(a, patient)| AppointmentDto::with_patient(a, patient))
                        .collect(),
                }),
            )
                .into_response(),
            Err(e) => map_domain_error(&e, "/appointments").into_response(),
        },
        Err(DomainError::Invalid { errors }) => invalid_form(req, errors),
        Err(e) => map_domain_error(&e, "/appointments").into_response(),
    }
}

/// Claim an available slot for the current actor.
#[utoipa::path(get, path = "/book_appointment/{id}", tag = "appointments",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 303, description = "Claimed or not available; redirect to /appointments"),
        (status = 404, description = "No such appointment"),
    ))]
pub async fn book_appointment(
    session: AuthSession,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i64>,
) -> Response {
    match svc.book_appointment(&session.user, id).await {
        Ok(BookOutcome::Booked) => {
            redirect_with_notice("/appointments", "Appointment Booked!").into_response()
        }
        Ok(BookOutcome::NotAvailable) => {
            redirect_with_notice("/appointments", "Appointment Not Available").into_response()
        }
        Err(e) => map_domain_error(&e, &format!("/book_appointment/{id}")).into_response(),
    }
}

/// Medical history, branched per role.
#[utoipa::path(get, path = "/medical_history", tag = "medical_history",
    responses(
        (status = 200, body = DoctorRecordsDto, description = "Doctor: authored records"),
        (status = 200, body = PatientRecordsDto, description = "Patient: own records"),
    ))]
pub async fn medical_history(
    session: AuthSession,
    Extension(svc): Extension<Arc<Service>>,
) -> Response {
    match session.user.role {
        Role::Doctor => match svc.records_authored(session.user.id).await {
            Ok(rows) => Json(DoctorRecordsDto {
                flash: None,
                records: rows
                    .into_iter()
                    .map(|(r, patient)| MedicalRecordDto::with_patient(r, patient))
                    .collect(),
            })
            .into_response(),
            Err(e) => map_domain_error(&e, "/medical_history").into_response(),
        },
        Role::Patient => match svc.patient_records(session.user.id).await {
            Ok(rows) => Json(PatientRecordsDto {
                records: rows
                    .into_iter()
                    .map(|(r, doctor)| MedicalRecordDto::with_doctor(r, doctor))
                    .collect(),
            })
            .into_response(),
            Err(e) => map_domain_error(&e, "/medical_history").into_response(),
        },
    }
}

/// Record a diagnosis against a patient (doctors only).
#[utoipa::path(post, path = "/medical_history", tag = "medical_history",
    request_body = RecordReq,
    responses(
        (status = 201, body = DoctorRecordsDto, description = "Record created; refreshed list"),
        (status = 303, description = "Role mismatch; redirect to dashboard"),
        (status = 422, body = InvalidFormDto, description = "Validation failure"),
    ))]
pub async fn create_medical_record(
    session: AuthSession,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<RecordReq>,
) -> Response {
    if session.user.role != Role::Doctor {
        return role_mismatch();
    }

    match svc.add_medical_record(&session.user, req.clone().into()).await {
        Ok(_) => match svc.records_authored(session.user.id).await {
            Ok(rows) => (
                StatusCode::CREATED,
                Json(DoctorRecordsDto {
                    flash: Some(FlashDto::success("Medical History Updated!")),
                    records: rows
                        .into_iter()
                        .map(|(r, patient)| MedicalRecordDto::with_patient(r, patient))
                        .collect(),
                }),
            )
                .into_response(),
            Err(e) => map_domain_error(&e, "/medical_history").into_response(),
        },
        Err(DomainError::Invalid { errors }) => invalid_form(req, errors),
        Err(e) => map_domain_error(&e, "/medical_history").into_response(),
    }
}

/// All currently available donations, any authenticated user.
#[utoipa::path(get, path = "/organ_donation", tag = "organ_donation",
    responses((status = 200, body = DonationsPageDto)))]
pub async fn organ_donation(
    _session: AuthSession,
    Extension(svc): Extension<Arc<Service>>,
) -> Response {
    match svc.available_donations().await {
        Ok(rows) => Json(DonationsPageDto {
            flash: None,
            donations: rows
                .into_iter()
                .map(|(d, donor)| DonationDto::with_donor(d, Some(donor)))
                .collect(),
        })
        .into_response(),
        Err(e) => map_domain_error(&e, "/organ_donation").into_response(),
    }
}

/// Register an organ donation for the current actor.
#[utoipa::path(post, path = "/organ_donation", tag = "organ_donation",
    request_body = DonationReq,
    responses(
        (status = 201, body = DonationsPageDto, description = "Donation registered; full list"),
        (status = 422, body = InvalidFormDto, description = "Validation failure"),
    ))]
pub async fn register_donation(
    session: AuthSession,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<DonationReq>,
) -> Response {
    match svc.register_donation(&session.user, req.clone().into()).await {
        Ok(_) => match svc.available_donations().await {
            Ok(rows) => (
                StatusCode::CREATED,
                Json(DonationsPageDto {
                    flash: Some(FlashDto::success("Organ Donation Registered!")),
                    donations: rows
                        .into_iter()
                        .map(|(d, donor)| DonationDto::with_donor(d, Some(donor)))
                        .collect(),
                }),
            )
                .into_response(),
            Err(e) => map_domain_error(&e, "/organ_donation").into_response(),
        },
        Err(DomainError::Invalid { errors }) => invalid_form(req, errors),
        Err(e) => map_domain_error(&e, "/organ_donation").into_response(),
    }
}

/// Filter available donations by exact organ label.
#[utoipa::path(get, path = "/search_organ", tag = "organ_donation",
    params(SearchQuery),
    responses(
        (status = 200, body = DonationsPageDto, description = "Matching donations"),
        (status = 303, description = "Missing query; redirect to /organ_donation"),
    ))]
pub async fn search_organ(
    _session: AuthSession,
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let organ = query.organ.unwrap_or_default();
    let organ = organ.trim();
    if organ.is_empty() {
        return redirect_with_notice("/organ_donation", "Please enter an organ to search.")
            .into_response();
    }

    match svc.search_donations(organ).await {
        Ok(rows) => Json(DonationsPageDto {
            flash: None,
            donations: rows
                .into_iter()
                .map(|(d, donor)| DonationDto::with_donor(d, Some(donor)))
                .collect(),
        })
        .into_response(),
        Err(e) => map_domain_error(&e, "/search_organ").into_response(),
    }
}
