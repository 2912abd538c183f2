use std::sync::Arc;

use crate::db::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        AppState { store }
    }
}
