pub mod appointments;
pub mod medical_records;
pub mod organ_donations;
pub mod sessions;
pub mod users;
