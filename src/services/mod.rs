pub mod appointment_service;
pub mod auth_service;
pub mod records_service;
pub mod staff_service;

pub use appointment_service::{
    list_appointments_handler, set_appointment_handler, update_appointment_handler,
};
pub use auth_service::doctor_login_handler;
pub use records_service::{
    add_record_handler, delete_record_handler, get_record_info_handler, list_departments_handler,
    list_patients_handler, list_records_handler, update_record_handler, Doctor, Nurse, Patient,
};
pub use staff_service::{assign_nurse_handler, find_nurse_from_doctor_handler};
