use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Bootstrap administrator created on startup when no account with this username exists.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub seed_admin: Option<SeedAdmin>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "laporan".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "laporan-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };

        let seed_admin = match (
            std::env::var("SEED_ADMIN_USERNAME"),
            std::env::var("SEED_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) => Some(SeedAdmin {
                email: std::env::var("SEED_ADMIN_EMAIL")
                    .unwrap_or_else(|_| format!("{}@localhost.localdomain", username)),
                name: std::env::var("SEED_ADMIN_NAME").unwrap_or_else(|_| "Administrator".into()),
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT").unwrap_or(8080),
            jwt,
            seed_admin,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
