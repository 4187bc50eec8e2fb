// Application state for HTTP handlers
use crate::application::controller::DashboardController;
use crate::application::rate_store::RateStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub struct AppState {
    pub store: Arc<dyn RateStore>,
    controller: Mutex<DashboardController>,
}

impl AppState {
    pub fn new(store: Arc<dyn RateStore>, controller: DashboardController) -> Self {
        Self {
            store,
            controller: Mutex::new(controller),
        }
    }

    /// The single session's controller. Never hold the guard across an await.
    pub fn controller(&self) -> MutexGuard<'_, DashboardController> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
