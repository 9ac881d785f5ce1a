use std::sync::Arc;
use crate::{
    config::Settings,
    service::ServiceContext,
    web::flash::FlashKey,
};

#[derive(Clone)]
pub struct AppState {
    pub service_context: Arc<ServiceContext>,
    pub settings: Arc<Settings>,
    pub flash_key: FlashKey,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        settings: Arc<Settings>,
    ) -> Self {
        let flash_key = FlashKey::new(&settings.auth.session_secret);
        Self {
            service_context,
            settings,
            flash_key,
        }
    }
}
