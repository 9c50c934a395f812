use mongodb::Database;

use crate::config::AppConfig;
use crate::services::email_service::EmailService;
use crate::services::otp_service::OTPService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub otp_service: OTPService,
    pub email_service: EmailService,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let otp_service = OTPService::new(db.clone(), config.jwt_secret.clone());
        let email_service =
            EmailService::new(config.email_api_key.clone(), config.email_from.clone());

        AppState {
            db,
            config,
            otp_service,
            email_service,
        }
    }
}
