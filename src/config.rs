use std::time::Duration;

use crate::utils::helper_utils::{get_env, get_env_parse};

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: String,
    pub password: String,
    pub db: i64,
}

impl RedisConfig {
    /// Connection URL in the `redis://[:password@]host:port/db` form.
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/{}", self.host, self.port, self.db)
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                self.password, self.host, self.port, self.db
            )
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    pub max_tokens: u32,
    /// Tokens restored per second.
    pub refill_rate: f64,
    /// TTL applied to per-client bucket state.
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub python_service: String,
    pub java_service: String,
    pub cpp_service: String,
    pub gateway_port: u16,
    pub lang_storage_file_path: String,
    pub logs_file_path: String,
    pub redis: RedisConfig,
    pub rate_limiter: RateLimiterConfig,
}

impl Config {
    /// Loads the configuration from environment variables. Every value has a
    /// default, so loading never fails; unparsable numbers fall back to their
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            python_service: get_env("PYTHON_SERVICE", "localhost:7771"),
            java_service: get_env("JAVA_SERVICE", "localhost:7773"),
            cpp_service: get_env("CPP_SERVICE", "localhost:7774"),
            gateway_port: get_env_parse("GATEWAY_PORT", 7772),
            lang_storage_file_path: get_env("LANG_STORAGE_FPATH", "data/languages.json"),
            logs_file_path: get_env("LOGS_FILE_PATH", "data/app.log"),
            redis: RedisConfig {
                host: get_env("REDIS_HOST", "redis"),
                port: get_env("REDIS_PORT", "6379"),
                password: get_env("REDIS_PASSWORD", ""),
                db: get_env_parse("REDIS_DB", 0),
            },
            rate_limiter: RateLimiterConfig {
                max_tokens: get_env_parse("MAX_TOKENS", 15),
                refill_rate: get_env_parse("REFILL_RATE", 0.25),
                window: Duration::from_secs(60 * get_env_parse("RL_WINDOW", 1u64)),
            },
        }
    }
}
