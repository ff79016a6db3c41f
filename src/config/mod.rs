use std::env;
use std::time::Duration;

const DEFAULT_JWT_EXPIRATION_SECS: u64 = 7 * 24 * 3600;
// 十年，超出后时间戳计算会越界
const MAX_JWT_EXPIRATION_SECS: u64 = 10 * 365 * 24 * 3600;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let mut config = Self::with_secret(env::var("JWT_SECRET")?);

        // 可选配置，缺省时使用默认值
        config.database_url = optional("DATABASE_URL");
        config.redis_url = optional("REDIS_URL");
        if let Some(hours) = optional("JWT_EXPIRATION") {
            config.jwt_expiration_secs = expiration_secs(&hours);
        }
        if let Some(cost) = optional("BCRYPT_COST") {
            config.bcrypt_cost = cost.parse().unwrap_or(10);
        }
        if let Some(secure) = optional("COOKIE_SECURE") {
            config.cookie_secure = !matches!(secure.as_str(), "0" | "false" | "no");
        }
        if let Some(origins) = optional("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(host) = optional("SERVER_HOST") {
            config.server_host = host;
        }
        if let Some(port) = optional("SERVER_PORT") {
            config.server_port = port.parse().unwrap_or(3000);
        }
        if let Some(base) = optional("API_BASE_URI") {
            config.api_base_uri = base;
        }
        if let Some(window) = optional("RATE_LIMIT_WINDOW") {
            config.rate_limit_window_secs = window.parse().unwrap_or(60);
        }
        if let Some(requests) = optional("RATE_LIMIT_REQUESTS") {
            config.rate_limit_requests = requests.parse().unwrap_or(100);
        }

        Ok(config)
    }

    /// 仅指定签名密钥，其余使用默认值（测试和工具使用）
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Config {
            database_url: None,
            redis_url: None,
            jwt_secret: jwt_secret.into(),
            jwt_expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            bcrypt_cost: 10,
            cookie_secure: true,
            cors_origins: Vec::new(),
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            api_base_uri: "/api".to_string(),
        }
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// `JWT_EXPIRATION` 以小时计，可带 `h` 后缀；无法解析或超出上限时使用默认值
fn expiration_secs(hours: &str) -> u64 {
    hours
        .trim()
        .trim_end_matches('h')
        .parse::<u64>()
        .ok()
        .and_then(|hours| hours.checked_mul(3600))
        .filter(|secs| *secs <= MAX_JWT_EXPIRATION_SECS)
        .unwrap_or(DEFAULT_JWT_EXPIRATION_SECS)
}
