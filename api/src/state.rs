use common::config::{Admin, Cleanup, Config, Feed};
use persister::VehiclePersisterExt;
use std::sync::Arc;

/// Shared by every handler. Settings are copied out of the config once at startup.
pub struct AppState {
    pub persister: Arc<dyn VehiclePersisterExt>,
    pub feed: Feed,
    pub admin: Admin,
    pub cleanup: Cleanup,
}

impl AppState {
    pub fn new(persister: Arc<dyn VehiclePersisterExt>, config: &Config) -> Self {
        Self {
            persister,
            feed: config.feed.clone(),
            admin: config.admin.clone(),
            cleanup: config.cleanup.clone(),
        }
    }
}
