// src/services/auth_service/mod.rs
pub mod verify_user;

pub use verify_user::doctor_login_handler;
