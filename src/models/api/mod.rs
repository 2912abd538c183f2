pub mod params;

pub use params::{AssignNurseParams, FindNurseParams, LoginParams, RecordLookup};
