/// Configuration management for Story Service
///
/// Configuration is read from environment variables. `Config::from_lookup`
/// takes the variable source as a closure so parsing can be exercised without
/// touching the process environment.
use s3_utils::S3Config;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Bearer token validation
    pub auth: AuthConfig,
    /// Media bucket
    pub storage: S3Config,
    /// Story behaviour switches
    pub stories: StoriesConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity service
    pub jwt_secret: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

/// How follower and following counterparts are combined for the social listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialGraphUnion {
    /// A user present in both edge sets contributes their stories once
    Distinct,
    /// No de-duplication: a mutual contributes their stories once per edge set
    Concatenate,
}

impl FromStr for SocialGraphUnion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distinct" => Ok(SocialGraphUnion::Distinct),
            "concatenate" => Ok(SocialGraphUnion::Concatenate),
            other => Err(format!(
                "unknown social graph union '{}', expected 'distinct' or 'concatenate'",
                other
            )),
        }
    }
}

/// Error kind returned when a caller touches a story they do not own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipDenial {
    /// 404, the story's existence is not revealed
    NotFound,
    /// 403
    Forbidden,
}

impl FromStr for OwnershipDenial {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "not_found" => Ok(OwnershipDenial::NotFound),
            "forbidden" => Ok(OwnershipDenial::Forbidden),
            other => Err(format!(
                "unknown ownership denial '{}', expected 'not_found' or 'forbidden'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoriesConfig {
    pub social_graph_union: SocialGraphUnion,
    pub ownership_denial: OwnershipDenial,
    /// Largest accepted media upload
    pub max_upload_bytes: usize,
    /// Seconds between orphaned-media sweeps; 0 disables the sweeper
    pub orphan_sweep_interval_secs: u64,
    pub orphan_sweep_batch_size: i64,
}

impl Default for StoriesConfig {
    fn default() -> Self {
        Self {
            social_graph_union: SocialGraphUnion::Distinct,
            ownership_denial: OwnershipDenial::NotFound,
            max_upload_bytes: 20 * 1024 * 1024,
            orphan_sweep_interval_secs: 300,
            orphan_sweep_batch_size: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app = AppConfig {
            env: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            host: lookup("STORY_SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or_default(&lookup, "STORY_SERVICE_PORT", 8083)?,
        };
        let production = app.is_production();

        let cors = {
            let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
                Some(value) => value,
                None if production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                None => "http://localhost:3000".to_string(),
            };

            if production && allowed_origins.trim() == "*" {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "postgresql://localhost/nova".to_string()),
            max_connections: parse_or_default(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            run_migrations: parse_or_default(&lookup, "DATABASE_RUN_MIGRATIONS", true)?,
        };

        let auth = {
            let jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
            if jwt_secret.trim().is_empty() {
                if production {
                    return Err("JWT_SECRET must be set in production".to_string());
                }
                tracing::warn!("JWT_SECRET not set; every authenticated request will be rejected");
            }
            AuthConfig { jwt_secret }
        };

        let storage = {
            let bucket = lookup("BUCKET_NAME")
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .ok_or_else(|| "BUCKET_NAME must be set".to_string())?;
            let mut storage = S3Config::new(
                bucket,
                lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            );
            storage.endpoint = lookup("S3_ENDPOINT").filter(|e| !e.trim().is_empty());
            storage
        };

        let defaults = StoriesConfig::default();
        let stories = StoriesConfig {
            social_graph_union: parse_or_default(
                &lookup,
                "STORIES_SOCIAL_GRAPH_UNION",
                defaults.social_graph_union,
            )?,
            ownership_denial: parse_or_default(
                &lookup,
                "STORIES_OWNERSHIP_DENIAL",
                defaults.ownership_denial,
            )?,
            max_upload_bytes: parse_or_default(
                &lookup,
                "STORY_MAX_UPLOAD_BYTES",
                defaults.max_upload_bytes,
            )?,
            orphan_sweep_interval_secs: parse_or_default(
                &lookup,
                "ORPHAN_SWEEP_INTERVAL_SECS",
                defaults.orphan_sweep_interval_secs,
            )?,
            orphan_sweep_batch_size: parse_or_default(
                &lookup,
                "ORPHAN_SWEEP_BATCH_SIZE",
                defaults.orphan_sweep_batch_size,
            )?,
        };

        if stories.max_upload_bytes == 0 {
            return Err("STORY_MAX_UPLOAD_BYTES must be greater than zero".to_string());
        }

        Ok(Config {
            app,
            cors,
            database,
            auth,
            storage,
            stories,
        })
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_bucket_only() {
        let config = load(&[("BUCKET_NAME", "story-media")]).unwrap();

        assert_eq!(config.app.port, 8083);
        assert_eq!(config.storage.bucket, "story-media");
        assert_eq!(config.storage.region, "us-east-1");
        assert!(config.storage.endpoint.is_none());
        assert_eq!(
            config.stories.social_graph_union,
            SocialGraphUnion::Distinct
        );
        assert_eq!(config.stories.ownership_denial, OwnershipDenial::NotFound);
        assert!(config.database.run_migrations);
    }

    #[test]
    fn test_bucket_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.contains("BUCKET_NAME"));
    }

    #[test]
    fn test_policies_parse() {
        let config = load(&[
            ("BUCKET_NAME", "story-media"),
            ("STORIES_SOCIAL_GRAPH_UNION", "Concatenate"),
            ("STORIES_OWNERSHIP_DENIAL", "forbidden"),
        ])
        .unwrap();

        assert_eq!(
            config.stories.social_graph_union,
            SocialGraphUnion::Concatenate
        );
        assert_eq!(config.stories.ownership_denial, OwnershipDenial::Forbidden);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let err = load(&[
            ("BUCKET_NAME", "story-media"),
            ("STORIES_SOCIAL_GRAPH_UNION", "weighted"),
        ])
        .unwrap_err();
        assert!(err.contains("STORIES_SOCIAL_GRAPH_UNION"));
    }

    #[test]
    fn test_production_requires_secret_and_strict_cors() {
        let err = load(&[
            ("BUCKET_NAME", "story-media"),
            ("APP_ENV", "production"),
            ("CORS_ALLOWED_ORIGINS", "https://app.nova.dev"),
        ])
        .unwrap_err();
        assert!(err.contains("JWT_SECRET"));

        let err = load(&[
            ("BUCKET_NAME", "story-media"),
            ("APP_ENV", "production"),
            ("CORS_ALLOWED_ORIGINS", "*"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap_err();
        assert!(err.contains("CORS_ALLOWED_ORIGINS"));
    }

    #[test]
    fn test_zero_upload_limit_is_rejected() {
        let err = load(&[
            ("BUCKET_NAME", "story-media"),
            ("STORY_MAX_UPLOAD_BYTES", "0"),
        ])
        .unwrap_err();
        assert!(err.contains("STORY_MAX_UPLOAD_BYTES"));
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let auth = AuthConfig {
            jwt_secret: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", auth).contains("hunter2"));
    }
}
