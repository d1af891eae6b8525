use crate::services::object_service::{BucketTarget, StorageError, StorageResult};
use anyhow::{Context, Result};
use clap::Parser;
use std::{env, fmt};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub admin_token: Option<String>,
    pub storage: StorageConfig,
}

/// Object storage options.
///
/// Every field is optional here: an incomplete configuration is reported when
/// a store or resolve is attempted, not at startup.
#[derive(Clone, Default)]
pub struct StorageConfig {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    pub bucket_name: Option<String>,
    /// Path-style S3-compatible endpoint (MinIO, R2, ...). AWS when unset.
    pub endpoint: Option<String>,
    pub upload_timeout_secs: u64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Portfolio content API with signed object storage")]
pub struct Args {
    /// Host to bind to (overrides PORTFOLIO_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORTFOLIO_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides PORTFOLIO_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Bucket name (overrides AWS_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,

    /// S3-compatible endpoint URL (overrides AWS_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("PORTFOLIO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env("PORTFOLIO_PORT", 3000u16)?;
        let env_db = env::var("PORTFOLIO_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/portfolio.db".into());

        let storage = StorageConfig {
            access_key_id: non_empty_env("AWS_ACCESS_KEY_ID"),
            secret_access_key: non_empty_env("AWS_SECRET_ACCESS_KEY"),
            region: non_empty_env("AWS_REGION"),
            bucket_name: args.bucket.or_else(|| non_empty_env("AWS_BUCKET_NAME")),
            endpoint: args.endpoint.or_else(|| non_empty_env("AWS_ENDPOINT_URL")),
            upload_timeout_secs: parse_env("PORTFOLIO_UPLOAD_TIMEOUT_SECS", 30u64)?,
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            admin_token: non_empty_env("PORTFOLIO_ADMIN_TOKEN"),
            storage,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    /// Names of the required options that are unset.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("AWS_ACCESS_KEY_ID", &self.access_key_id),
            ("AWS_SECRET_ACCESS_KEY", &self.secret_access_key),
            ("AWS_REGION", &self.region),
            ("AWS_BUCKET_NAME", &self.bucket_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }

    /// Precondition check for every storage call.
    pub fn target(&self) -> StorageResult<BucketTarget> {
        match (
            &self.access_key_id,
            &self.secret_access_key,
            &self.region,
            &self.bucket_name,
        ) {
            (Some(access_key_id), Some(secret_access_key), Some(region), Some(bucket))
                if self.missing().is_empty() =>
            {
                Ok(BucketTarget {
                    access_key_id: access_key_id.clone(),
                    secret_access_key: secret_access_key.clone(),
                    region: region.clone(),
                    bucket: bucket.clone(),
                    endpoint: self.endpoint.clone(),
                })
            }
            _ => Err(StorageError::Configuration(self.missing())),
        }
    }
}

// Keep the secret out of logs.
impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .field("bucket_name", &self.bucket_name)
            .field("endpoint", &self.endpoint)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
