use std::env;
use std::time::Duration;

/// Runtime configuration, read once in `main` and handed to whoever needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,

    pub s3_bucket_name: String,
    pub aws_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Custom endpoint for S3-compatible providers (MinIO etc.); forces
    /// path-style addressing when set.
    pub s3_endpoint: Option<String>,

    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,

    /// Target width for generated previews, aspect ratio preserved.
    pub preview_width: u32,
    pub sweep_interval: Duration,
    pub sweep_page_size: u64,
    /// Validity window for presigned GET URLs handed out by the list endpoint.
    pub media_url_ttl: Duration,
    /// Validity window for presigned PUT URLs from the presign endpoint.
    pub upload_url_ttl: Duration,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let s3_bucket_name = env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME must be set");
        let aws_region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let aws_access_key_id =
            env::var("AWS_ACCESS_KEY_ID").expect("AWS_ACCESS_KEY_ID must be set");
        let aws_secret_access_key =
            env::var("AWS_SECRET_ACCESS_KEY").expect("AWS_SECRET_ACCESS_KEY must be set");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let jwt_issuer = env::var("JWT_ISSUER").expect("JWT_ISSUER must be set");
        let jwt_audience = env::var("JWT_AUDIENCE").expect("JWT_AUDIENCE must be set");

        Self {
            database_url,
            listen_addr: env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            s3_bucket_name,
            aws_region,
            aws_access_key_id,
            aws_secret_access_key,
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            preview_width: env_or("PREVIEW_WIDTH", 200),
            sweep_interval: Duration::from_secs(env_or("PREVIEW_SWEEP_INTERVAL_SECS", 300)),
            sweep_page_size: env_or("PREVIEW_SWEEP_PAGE_SIZE", 100),
            media_url_ttl: Duration::from_secs(env_or("MEDIA_URL_TTL_SECS", 6400)),
            upload_url_ttl: Duration::from_secs(env_or("UPLOAD_URL_TTL_SECS", 3600)),
        }
    }
}
