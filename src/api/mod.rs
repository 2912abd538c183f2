// src/api/mod.rs

pub mod routes;

pub use routes::router;
