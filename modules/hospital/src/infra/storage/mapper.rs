//! Conversions between storage entities and contract models.

use crate::contract::model;
use crate::infra::storage::entity;

impl From<entity::users::Role> for model::Role {
    fn from(role: entity::users::Role) -> Self {
        match role {
            entity::users::Role::Doctor => model::Role::Doctor,
            entity::users::Role::Patient => model::Role::Patient,
        }
    }
}

impl From<model::Role> for entity::users::Role {
    fn from(role: model::Role) -> Self {
        match role {
            model::Role::Doctor => entity::users::Role::Doctor,
            model::Role::Patient => entity::users::Role::Patient,
        }
    }
}

impl From<entity::appointments::SlotStatus> for model::SlotStatus {
    fn from(status: entity::appointments::SlotStatus) -> Self {
        match status {
            entity::appointments::SlotStatus::Available => model::SlotStatus::Available,
            entity::appointments::SlotStatus::Booked => model::SlotStatus::Booked,
        }
    }
}

impl From<model::SlotStatus> for entity::appointments::SlotStatus {
    fn from(status: model::SlotStatus) -> Self {
        match status {
            model::SlotStatus::Available => entity::appointments::SlotStatus::Available,
            model::SlotStatus::Booked => entity::appointments::SlotStatus::Booked,
        }
    }
}

impl From<entity::users::Model> for model::User {
    fn from(m: entity::users::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            password_hash: m.password_hash,
            role: m.role.into(),
        }
    }
}

impl From<entity::appointments::Model> for model::Appointment {
    fn from(m: entity::appointments::Model) -> Self {
        Self {
            id: m.id,
            doctor_id: m.doctor_id,
            patient_id: m.patient_id,
            date: m.date,
            time: m.time,
            status: m.status.into(),
        }
    }
}

impl From<entity::medical_records::Model> for model::MedicalRecord {
    fn from(m: entity::medical_records::Model) -> Self {
        Self {
            id: m.id,
            patient_id: m.patient_id,
            doctor_id: m.doctor_id,
            diagnosis: m.diagnosis,
            recorded_at: m.recorded_at,
        }
    }
}

impl From<entity::organ_donations::Model> for model::OrganDonation {
    fn from(m: entity::organ_donations::Model) -> Self {
        Self {
            id: m.id,
            donor_id: m.donor_id,
            organ: m.organ,
            available: m.available,
        }
    }
}

impl From<entity::sessions::Model> for model::Session {
    fn from(m: entity::sessions::Model) -> Self {
        Self {
            token: m.token,
            user_id: m.user_id,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_maps_both_ways() {
        assert_eq!(
            model::Role::from(entity::users::Role::Doctor),
            model::Role::Doctor
        );
        assert_eq!(
            entity::users::Role::from(model::Role::Patient),
            entity::users::Role::Patient
        );
    }

    #[test]
    fn user_model_maps_all_fields() {
        let m = entity::users::Model {
            id: 3,
            username: "drsmith".into(),
            password_hash: "$argon2id$x".into(),
            role: entity::users::Role::Doctor,
        };
        let user = model::User::from(m);
        assert_eq!(user.id, 3);
        assert_eq!(user.username, "drsmith");
        assert_eq!(user.role, model::Role::Doctor);
    }
}
