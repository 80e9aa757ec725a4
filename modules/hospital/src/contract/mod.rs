pub mod error;
pub mod model;

pub use error::HospitalError;
pub use model::{
    Appointment, MedicalRecord, NewUserRecord, OrganDonation, Role, Session, SlotStatus, User,
};
