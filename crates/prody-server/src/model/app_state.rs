//! Shared application state
//!
//! All services are constructed once at startup with their collaborators
//! passed in explicitly; handlers reach them through `web::Data<AppState>`.

use std::sync::Arc;

use prody_auth::{GoogleVerifier, TokenService};
use prody_core::service::activity_log::ActivityLogService;
use prody_core::service::analytics::AnalyticsService;
use prody_core::service::auth::AuthService;
use prody_core::service::mail::MailService;
use prody_core::service::meeting::MeetingService;
use prody_core::service::notification::NotificationService;
use prody_core::service::organization::OrganizationService;
use prody_core::service::task::TaskService;
use prody_realtime::Broadcaster;
use sea_orm::DatabaseConnection;

use super::config::Configuration;

pub struct AppState {
    pub configuration: Configuration,
    pub db: DatabaseConnection,
    pub broadcaster: Arc<Broadcaster>,
    pub tokens: TokenService,
    pub auth: AuthService,
    pub tasks: TaskService,
    pub meetings: MeetingService,
    pub notifications: NotificationService,
    pub organizations: OrganizationService,
    pub analytics: AnalyticsService,
    pub activity_logs: ActivityLogService,
}

impl AppState {
    pub fn new(configuration: Configuration, db: DatabaseConnection) -> Self {
        let broadcaster = Arc::new(Broadcaster::new());

        let tokens = TokenService::new(
            configuration.token_secret_key(),
            configuration.access_token_ttl_seconds(),
            configuration.refresh_token_ttl_seconds(),
        );
        let mail = MailService::new(
            configuration.mail_api_url(),
            configuration.mail_api_key(),
            configuration.mail_from(),
            configuration.frontend_url(),
        );
        let google = Arc::new(GoogleVerifier::new(configuration.google_client_id()));

        let activity_logs = ActivityLogService::new(db.clone(), broadcaster.clone());
        let auth = AuthService::new(
            db.clone(),
            tokens.clone(),
            mail,
            google,
            activity_logs.clone(),
        );
        let tasks = TaskService::new(db.clone(), broadcaster.clone(), activity_logs.clone());
        let meetings = MeetingService::new(db.clone(), broadcaster.clone(), activity_logs.clone());
        let notifications = NotificationService::new(db.clone());
        let organizations =
            OrganizationService::new(db.clone(), broadcaster.clone(), activity_logs.clone());
        let analytics = AnalyticsService::new(db.clone(), activity_logs.clone());

        Self {
            configuration,
            db,
            broadcaster,
            tokens,
            auth,
            tasks,
            meetings,
            notifications,
            organizations,
            analytics,
            activity_logs,
        }
    }
}
