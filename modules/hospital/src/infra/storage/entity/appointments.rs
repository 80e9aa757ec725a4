use sea_orm::entity::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum SlotStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "booked")]
    Booked,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub doctor_id: i64,
    /// Unset exactly while the slot is available.
    pub patient_id: Option<i64>,
    pub date: Date,
    pub time: Time,
    pub status: SlotStatus,
}

/// Both foreign keys point at `users`; they stay two distinct, named
/// relations so each side can be eager-loaded on its own.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::DoctorId",
        to = "super::users::Column::Id"
    )]
    Doctor,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::PatientId",
        to = "super::users::Column::Id"
    )]
    Patient,
}

/// Eager-load the publishing doctor.
pub struct AppointmentToDoctor;

impl Linked for AppointmentToDoctor {
    type FromEntity = Entity;
    type ToEntity = super::users::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::Doctor.def()]
    }
}

/// Eager-load the claiming patient (absent while available).
pub struct AppointmentToPatient;

impl Linked for AppointmentToPatient {
    type FromEntity = Entity;
    type ToEntity = super::users::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::Patient.def()]
    }
}

impl ActiveModelBehavior for ActiveModel {}
