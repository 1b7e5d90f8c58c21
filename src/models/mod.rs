//! Data models for the VitalTrack service.

pub mod record;
pub mod user;

pub use record::{Vitals, VitalsRecord};
pub use user::User;
