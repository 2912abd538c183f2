pub mod doc_utils;
pub mod log_utils;

pub use doc_utils::{id_variants, json_to_document, shape_document, WIRE_TIME_FORMAT};
pub use log_utils::init_tracing;
