use config::ConfigError;

/// Insecure default signing secret. Good enough for local development,
/// refused outright in production.
pub const INSECURE_DEV_SECRET: &str = "dev-secret-change-in-prod";

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl ApplicationSettings {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn default_environment() -> String {
    "development".to_string()
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Credential lifecycle settings, loaded once at startup and shared
/// read-only across the application.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub access_token_expiry: i64,  // seconds (900 for 15 minutes)
    pub refresh_token_expiry: i64, // seconds (604800 for 7 days)
    pub issuer: String,
    pub refresh_token_key_prefix: String,
}

impl AuthSettings {
    /// Namespaced storage key for an opaque refresh token value.
    pub fn refresh_token_key(&self, token: &str) -> String {
        format!("{}{}", self.refresh_token_key_prefix, token)
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;

    if settings.application.is_production() && settings.auth.secret == INSECURE_DEV_SECRET {
        return Err(ConfigError::Message(
            "auth.secret must be set to a real value in production".to_string(),
        ));
    }

    Ok(settings)
}
