use std::sync::Arc;

use config::Config;
use database::Store;
use realtime::PresenceRegistry;
use redis::Client as RedisClient;

pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod result;
pub mod router;
pub mod routes;
pub mod seed;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub presence: PresenceRegistry,
    pub redis: Option<Arc<RedisClient>>,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        Self {
            store,
            config,
            presence: PresenceRegistry::new(),
            redis: None,
        }
    }

    pub fn with_redis(mut self, redis: RedisClient) -> Self {
        self.redis = Some(Arc::new(redis));
        self
    }
}
