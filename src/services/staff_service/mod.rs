// src/services/staff_service/mod.rs

pub mod assign;
pub mod lookup;

pub use assign::assign_nurse_handler;
pub use lookup::find_nurse_from_doctor_handler;
