// src/services/appointment_service/mod.rs

pub mod collision;
pub mod list;
pub mod resolve;
pub mod set;
pub mod update;

pub use list::list_appointments_handler;
pub use set::set_appointment_handler;
pub use update::update_appointment_handler;
