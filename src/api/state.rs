use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::JsonlStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonlStore>,
    pub config: Arc<AppConfig>,
}
