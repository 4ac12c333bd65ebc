use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 3600);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_acquire_timeout: Duration,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub bcrypt_cost: u32,
    pub cache: CacheConfig,
    pub reaper: ReaperConfig,
}

/// 会话缓存配置
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub user_capacity: u64,
    pub user_ttl: Duration,
    pub token_capacity: u64,
    pub token_ttl: Duration,
}

/// 过期令牌清理配置
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// 两次清理之间的最小间隔
    pub interval: Duration,
    /// 令牌保留时长，早于此时长创建的令牌会被清理
    pub retention: Duration,
    /// 单次清理的最大行数
    pub batch_size: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_capacity: 1024,
            user_ttl: DEFAULT_CACHE_TTL,
            token_capacity: 6 * 1024,
            token_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            retention: Duration::from_secs(60 * 24 * 3600),
            batch_size: 1024,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/session_backend".into(),
            database_max_connections: 10,
            database_acquire_timeout: Duration::from_secs(5),
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            api_base_uri: "/api".into(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cache: CacheConfig::default(),
            reaper: ReaperConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        let cache = CacheConfig {
            user_capacity: env_parse("USER_CACHE_CAPACITY", defaults.cache.user_capacity)?,
            user_ttl: env_duration("USER_CACHE_TTL", defaults.cache.user_ttl)?,
            token_capacity: env_parse("TOKEN_CACHE_CAPACITY", defaults.cache.token_capacity)?,
            token_ttl: env_duration("TOKEN_CACHE_TTL", defaults.cache.token_ttl)?,
        };
        let reaper = ReaperConfig {
            interval: env_duration("REAPER_INTERVAL", defaults.reaper.interval)?,
            retention: env_duration("REAPER_RETENTION", defaults.reaper.retention)?,
            batch_size: env_parse("REAPER_BATCH_SIZE", defaults.reaper.batch_size)?,
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: env_parse(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            database_acquire_timeout: env_duration(
                "DATABASE_ACQUIRE_TIMEOUT",
                defaults.database_acquire_timeout,
            )?,
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env_parse("SERVER_PORT", defaults.server_port)?,
            api_base_uri: env::var("API_BASE_URI").unwrap_or(defaults.api_base_uri),
            bcrypt_cost: env_parse("BCRYPT_COST", defaults.bcrypt_cost)?,
            cache,
            reaper,
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn env_duration(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_duration(&value).ok_or(ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

/// 解析 `90`、`90s`、`15m`、`24h`、`60d` 形式的时长
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit_secs) = match raw.char_indices().last()? {
        (i, 's') => (&raw[..i], 1),
        (i, 'm') => (&raw[..i], 60),
        (i, 'h') => (&raw[..i], 3600),
        (i, 'd') => (&raw[..i], 24 * 3600),
        _ => (raw, 1),
    };
    let amount: u64 = digits.trim().parse().ok()?;
    amount.checked_mul(unit_secs).map(Duration::from_secs)
}
