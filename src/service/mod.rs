pub mod announcement_service;
pub mod auth_service;

use std::sync::Arc;

pub use announcement_service::AnnouncementService;
pub use auth_service::AuthService;

pub struct ServiceContext {
    pub auth_service: Arc<AuthService>,
    pub announcement_service: Arc<AnnouncementService>,
}

impl ServiceContext {
    pub fn new(
        auth_service: Arc<AuthService>,
        announcement_service: Arc<AnnouncementService>,
    ) -> Self {
        Self {
            auth_service,
            announcement_service,
        }
    }
}
