use crate::configuration::LimitSettings;

/// Shared application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub limits: LimitSettings,
}

impl AppState {
    pub fn new(limits: LimitSettings) -> Self {
        Self { limits }
    }
}
