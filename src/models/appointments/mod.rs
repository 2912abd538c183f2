pub mod appointment;

pub use appointment::{
    name_field, AppointmentListResponse, AppointmentResponse, AppointmentUpdate, NewAppointment,
};
