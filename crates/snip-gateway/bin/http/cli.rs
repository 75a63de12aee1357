use clap::{Parser, ValueEnum};
use jiff::SignedDuration;
use snip_gateway::telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "SNIP_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "SNIP_BASE_URL";
pub const HASHIDS_SALT_ENV: &str = "SNIP_HASHIDS_SALT";
pub const HASHIDS_MIN_LENGTH_ENV: &str = "SNIP_HASHIDS_MIN_LENGTH";
pub const CACHE_TTL_ENV: &str = "SNIP_CACHE_TTL";
pub const CACHE_TIMEOUT_ENV: &str = "SNIP_CACHE_TIMEOUT";
pub const STORE_TIMEOUT_ENV: &str = "SNIP_STORE_TIMEOUT";
pub const STORAGE_BACKEND_ENV: &str = "SNIP_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "SNIP_MYSQL_DSN";
pub const MYSQL_MIGRATE_ENV: &str = "SNIP_MYSQL_MIGRATE";
pub const CACHE_BACKEND_ENV: &str = "SNIP_CACHE_BACKEND";
pub const CACHE_CAPACITY_ENV: &str = "SNIP_CACHE_CAPACITY";
pub const REDIS_URL_ENV: &str = "SNIP_REDIS_URL";
pub const LOG_FORMAT_ENV: &str = "SNIP_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3333";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3333/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "none")]
    None,
    #[value(name = "memory")]
    Memory,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::None => write!(f, "none"),
            CacheBackendArg::Memory => write!(f, "memory"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snip-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public address short URLs are served from.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = HASHIDS_SALT_ENV, hide_env_values = true)]
    pub hashids_salt: String,

    #[arg(long, env = HASHIDS_MIN_LENGTH_ENV, default_value_t = 4)]
    pub hashids_min_length: usize,

    #[arg(long, env = CACHE_TTL_ENV, default_value = "6h")]
    pub cache_ttl: SignedDuration,

    #[arg(long, env = CACHE_TIMEOUT_ENV, default_value = "250ms")]
    pub cache_timeout: SignedDuration,

    #[arg(long, env = STORE_TIMEOUT_ENV, default_value = "5s")]
    pub store_timeout: SignedDuration,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"), hide_env_values = true)]
    pub mysql_dsn: Option<String>,

    /// Apply the bundled schema migrations on startup.
    #[arg(long, env = MYSQL_MIGRATE_ENV)]
    pub mysql_migrate: bool,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Memory
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = 10_000)]
    pub cache_capacity: u64,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub redis_url: Option<String>,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Compact
    )]
    pub log_format: LogFormat,
}
