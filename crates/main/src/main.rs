use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use application::{
    MessageService, MessageServiceDependencies, SessionGateway, SessionGatewayDependencies,
    SystemClock, UserService, UserServiceDependencies,
};
use config::AppConfig;
use infrastructure::{create_pg_pool, BcryptPasswordHasher, PgMessageRepository, PgUserRepository};
use web_api::{router, AppState, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "famchat=info,web_api=info,application=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    let pool = create_pg_pool(&config.database.url, config.database.max_connections)
        .await
        .context("failed to connect to database")?;
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
    let message_repository = Arc::new(PgMessageRepository::new(pool));
    let password_hasher = Arc::new(BcryptPasswordHasher::new(config.server.bcrypt_cost));
    let clock = Arc::new(SystemClock);

    let user_service = Arc::new(UserService::new(UserServiceDependencies {
        user_repository: user_repository.clone(),
        password_hasher,
    }));
    let message_service = Arc::new(MessageService::new(MessageServiceDependencies {
        message_repository,
        clock: clock.clone(),
    }));
    let session_gateway = Arc::new(SessionGateway::new(SessionGatewayDependencies {
        user_repository,
        message_service: message_service.clone(),
        clock,
    }));
    let jwt_service = Arc::new(JwtService::new(&config.jwt));

    let app = router(
        AppState {
            user_service,
            message_service,
            session_gateway,
            jwt_service,
        },
        &config.server.allowed_origins,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "famchat server listening");

    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;
    Ok(())
}
