//! Shared test harness: in-memory SQLite + migrations + real service.

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

use hospital::contract::model::User;
use hospital::domain::forms::{LoginForm, RegisterForm};
use hospital::domain::service::Service;
use hospital::infra::storage::migrations::Migrator;
use hospital::infra::storage::SeaOrmHospitalRepository;

#[allow(dead_code)]
pub async fn setup_service() -> Arc<Service> {
    // One connection: every pooled in-memory SQLite connection would
    // otherwise get its own database.
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1);
    let db = Database::connect(opts).await.expect("connect in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");

    let repo = Arc::new(SeaOrmHospitalRepository::new(db));
    Arc::new(Service::new(repo))
}

#[allow(dead_code)]
pub fn register_form(username: &str, role: &str) -> RegisterForm {
    RegisterForm {
        username: username.to_string(),
        password: "hunter22".to_string(),
        confirm: "hunter22".to_string(),
        role: role.to_string(),
    }
}

#[allow(dead_code)]
pub fn login_form(username: &str, password: &str) -> LoginForm {
    LoginForm {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[allow(dead_code)]
pub async fn register_user(svc: &Service, username: &str, role: &str) -> User {
    svc.register(register_form(username, role))
        .await
        .expect("register user")
}
