// src/models/mod.rs

pub mod api;
pub mod app;
pub mod appointments;

pub use api::{AssignNurseParams, FindNurseParams, LoginParams, RecordLookup};
pub use app::AppState;
pub use appointments::{
    name_field, AppointmentListResponse, AppointmentResponse, AppointmentUpdate, NewAppointment,
};
