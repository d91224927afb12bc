// Application state shared across handlers
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    db::UserStore,
    services::{JwtService, UserService},
    utils::PasswordConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn UserStore>,
    pub jwt_service: Arc<JwtService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Wire services around an already-open store
    pub fn new(
        config: AppConfig,
        store: Arc<dyn UserStore>,
        jwt_service: JwtService,
        password_config: PasswordConfig,
    ) -> Self {
        let jwt_service = Arc::new(jwt_service);
        let user_service = Arc::new(UserService::new(
            store.clone(),
            jwt_service.clone(),
            password_config,
        ));

        Self {
            config: Arc::new(config),
            store,
            jwt_service,
            user_service,
        }
    }
}
