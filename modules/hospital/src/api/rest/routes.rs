use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers, problem};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home,
        handlers::register_form,
        handlers::register,
        handlers::login_form,
        handlers::login,
        handlers::logout,
        handlers::dashboard,
        handlers::appointments,
        handlers::create_appointment,
        handlers::book_appointment,
        handlers::medical_history,
        handlers::create_medical_record,
        handlers::organ_donation,
        handlers::register_donation,
        handlers::search_organ,
    ),
    components(schemas(
        dto::UserDto,
        dto::FlashDto,
        dto::RegisterReq,
        dto::LoginReq,
        dto::SlotReq,
        dto::RecordReq,
        dto::DonationReq,
        dto::InvalidFormDto,
        dto::HomeDto,
        dto::DashboardDto,
        dto::LoginOkDto,
        dto::AppointmentDto,
        dto::DoctorAppointmentsDto,
        dto::PatientAppointmentsDto,
        dto::MedicalRecordDto,
        dto::DoctorRecordsDto,
        dto::PatientRecordsDto,
        dto::DonationDto,
        dto::DonationsPageDto,
        problem::Problem,
    )),
    tags(
        (name = "hospital", description = "Landing and dashboard"),
        (name = "accounts", description = "Registration, login, logout"),
        (name = "appointments", description = "Slot publishing and booking"),
        (name = "medical_history", description = "Diagnosis records"),
        (name = "organ_donation", description = "Donor registry"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router. The service rides an `Extension` layer so
/// both handlers and the session extractor can reach it.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route(
            "/register",
            get(handlers::register_form).post(handlers::register),
        )
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/dashboard", get(handlers::dashboard))
        .route(
            "/appointments",
            get(handlers::appointments).post(handlers::create_appointment),
        )
        .route("/book_appointment/{id}", get(handlers::book_appointment))
        .route(
            "/medical_history",
            get(handlers::medical_history).post(handlers::create_medical_record),
        )
        .route(
            "/organ_donation",
            get(handlers::organ_donation).post(handlers::register_donation),
        )
        .route("/search_organ", get(handlers::search_organ))
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(handlers::fallback_not_found)
        .layer(Extension(service))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_covers_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/",
            "/register",
            "/login",
            "/logout",
            "/dashboard",
            "/appointments",
            "/book_appointment/{id}",
            "/medical_history",
            "/organ_donation",
            "/search_organ",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }
}
