use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Magic-link provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub auth_url: String,
    pub api_key: String,
    /// Where the provider sends the user after the link is followed.
    pub site_url: String,
    /// Institutional domain, without the leading `@`.
    pub allowed_domain: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    pub verbose_diagnostics: bool,
    /// Anonymous posts are accepted under this address when set.
    pub test_poster_email: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: env_or("JWT_ISSUER", "watfind"),
            audience: env_or("JWT_AUDIENCE", "authenticated"),
        };
        let identity = IdentityConfig {
            auth_url: std::env::var("AUTH_URL")?,
            api_key: std::env::var("AUTH_API_KEY")?,
            site_url: env_or("SITE_URL", "http://localhost:3000"),
            allowed_domain: env_or("ALLOWED_EMAIL_DOMAIN", "uwaterloo.ca")
                .trim_start_matches('@')
                .to_lowercase(),
        };
        let endpoint = env_or("STORAGE_ENDPOINT", "http://localhost:9000");
        let storage = StorageConfig {
            public_url: env_or("STORAGE_PUBLIC_URL", &endpoint),
            endpoint,
            bucket: env_or("STORAGE_BUCKET", "item-photos"),
            access_key: std::env::var("STORAGE_ACCESS_KEY")?,
            secret_key: std::env::var("STORAGE_SECRET_KEY")?,
            region: env_or("STORAGE_REGION", "us-east-1"),
        };
        Ok(Self {
            database_url,
            jwt,
            identity,
            storage,
            verbose_diagnostics: std::env::var("VERBOSE_DIAGNOSTICS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            test_poster_email: std::env::var("TEST_POSTER_EMAIL")
                .ok()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty()),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("1"));
        assert!(parse_flag("on"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
