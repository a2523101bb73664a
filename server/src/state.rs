use app_auth::AuthService;
use app_config::AppConfig;
use app_database::{Database, service::DbService};
use app_models::{Campaign, Donation, GiverProfile, User};
use std::sync::Arc;

/// Shared handler state. Everything is constructed once at startup; the
/// rate limiter lives inside `AuthService` rather than as process-global
/// state so it can be swapped for an external counter store later.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<Database>,
    pub auth: Arc<AuthService>,
    pub users: Arc<DbService<User>>,
    pub campaigns: Arc<DbService<Campaign>>,
    pub givers: Arc<DbService<GiverProfile>>,
    pub donations: Arc<DbService<Donation>>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Arc<Database>) -> Self {
        let users = Arc::new(DbService::<User>::new(Arc::clone(&db), "users"));
        let givers = Arc::new(DbService::<GiverProfile>::new(
            Arc::clone(&db),
            "giver_profiles",
        ));
        let campaigns = Arc::new(DbService::<Campaign>::new(Arc::clone(&db), "campaigns"));
        let donations = Arc::new(DbService::<Donation>::new(Arc::clone(&db), "donations"));

        let auth = Arc::new(AuthService::new(
            &config.security,
            Arc::clone(&users),
            Arc::clone(&givers),
        ));

        Self {
            config: Arc::new(config),
            db,
            auth,
            users,
            campaigns,
            givers,
            donations,
        }
    }
}
