use std::net::{IpAddr, SocketAddr};

use alumni_connect::{
    AppState,
    config::Config,
    database::{self, Store},
    router::create_router,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode");

    // 设置存储
    let store = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute("SET application_name = 'alumni_connect';")
                            .await?;
                        Ok(())
                    })
                })
                .connect(url)
                .await
                .expect("Failed to connect to Postgres");
            database::migrate(&pool)
                .await
                .expect("Failed to run migrations");
            Store::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            Store::memory()
        }
    };

    let mut state = AppState::new(store, config.clone());

    // 设置 Redis 客户端，用于限流
    if let Some(url) = &config.redis_url {
        let redis_client = redis::Client::open(url.as_str()).expect("Failed to create Redis client");
        state = state.with_redis(redis_client);
    } else {
        tracing::info!("REDIS_URL not set, rate limiting disabled");
    }

    let app = create_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
