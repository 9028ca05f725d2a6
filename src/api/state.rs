//! Shared handler state

use std::sync::Arc;

use crate::domain::crag::CragEngine;

#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<CragEngine>,
}

impl AppState {
    pub fn new(engine: Arc<CragEngine>) -> Self {
        Self { engine }
    }
}
