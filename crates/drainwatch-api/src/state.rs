use drainwatch_workflow::DrainageService;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: DrainageService,
}

impl AppState {
    pub fn new(service: DrainageService) -> Self {
        Self { service }
    }
}
