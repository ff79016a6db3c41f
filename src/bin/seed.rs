use alumni_connect::{
    config::Config,
    database::{self, Store},
    seed::{AdminOutcome, default_clubs, seed_admin, seed_clubs},
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");
    let admin_email = std::env::var("ADMIN_EMAIL").expect("ADMIN_EMAIL must be set");
    let admin_password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");
    let database_url = config
        .database_url
        .clone()
        .expect("DATABASE_URL must be set for seeding");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres");
    database::migrate(&pool)
        .await
        .expect("Failed to run migrations");
    let store = Store::postgres(pool);

    match seed_admin(&store, &admin_email, &admin_password, config.bcrypt_cost).await {
        Ok((user, AdminOutcome::Created)) => tracing::info!("Admin user created: {}", user.email),
        Ok((user, AdminOutcome::Promoted)) => tracing::info!("Admin user updated: {}", user.email),
        Err(e) => {
            tracing::error!("Seeding admin failed: {}", e);
            std::process::exit(1);
        }
    }

    let clubs = match default_clubs() {
        Ok(clubs) => clubs,
        Err(e) => {
            tracing::error!("Loading default clubs failed: {}", e);
            std::process::exit(1);
        }
    };
    match seed_clubs(&store, clubs).await {
        Ok(created) => tracing::info!("Seeding completed, {} clubs created", created.len()),
        Err(e) => {
            tracing::error!("Seeding clubs failed: {}", e);
            std::process::exit(1);
        }
    }
}
