use clap::Parser;

const DEFAULT_RUN_ADDRESS: &str = "localhost:8000";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 900; // 15 minutes
const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 86_400; // 24 hours
const DEFAULT_ACCRUAL_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_ACCRUAL_POLL_BATCH_SIZE: i64 = 100;
const DEFAULT_ACCRUAL_WORKERS: usize = 10;
const DEFAULT_ACCRUAL_REQUEST_TIMEOUT_SECS: u64 = 5;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Flags override their environment counterparts; clap's `env` attribute
/// gives exactly that precedence.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// HTTP listen address.
    #[arg(short = 'a', long, env = "RUN_ADDRESS", default_value = DEFAULT_RUN_ADDRESS)]
    pub run_address: String,

    /// Postgres DSN.
    #[arg(short = 'd', long, env = "DATABASE_URI")]
    pub database_uri: String,

    /// Token signing key (at least 16 bytes).
    #[arg(short = 's', long, env = "SECRET_KEY")]
    pub secret_key: String,

    #[arg(short = 'l', long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Base URL of the external accrual scoring service.
    #[arg(short = 'r', long, env = "ACCRUAL_SYSTEM_ADDRESS")]
    pub accrual_system_address: String,

    #[arg(long, env, default_value_t = DEFAULT_ACCESS_TOKEN_TTL_SECS)]
    pub access_token_ttl_secs: u64,

    #[arg(long, env, default_value_t = DEFAULT_REFRESH_TOKEN_TTL_SECS)]
    pub refresh_token_ttl_secs: u64,

    /// How often the producer rediscovers unfinished orders.
    #[arg(long, env, default_value_t = DEFAULT_ACCRUAL_POLL_INTERVAL_SECS)]
    pub accrual_poll_interval_secs: u64,

    #[arg(long, env, default_value_t = DEFAULT_ACCRUAL_POLL_BATCH_SIZE)]
    pub accrual_poll_batch_size: i64,

    #[arg(long, env, default_value_t = DEFAULT_ACCRUAL_WORKERS)]
    pub accrual_workers: usize,

    #[arg(long, env, default_value_t = DEFAULT_ACCRUAL_REQUEST_TIMEOUT_SECS)]
    pub accrual_request_timeout_secs: u64,

    #[arg(long, env, default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }
}
