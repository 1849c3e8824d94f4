use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use s3_utils::S3Client;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use story_service::db::{self, PgOrphanedMediaRepository, PgStoryRepository, PgUserRepository};
use story_service::handlers::{configure_api, HealthState};
use story_service::jobs::OrphanSweeper;
use story_service::middleware::{JwtAuthMiddleware, MetricsMiddleware};
use story_service::services::{StoriesService, StoryStores};
use story_service::storage::MediaStore;
use tokio::task::JoinSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn run_healthcheck() -> io::Result<()> {
    let port = std::env::var("STORY_SERVICE_PORT").unwrap_or_else(|_| "8083".to_string());
    let url = format!("http://127.0.0.1:{}/api/v1/health/live", port);
    match reqwest::Client::new().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => {
            eprintln!("healthcheck HTTP status: {}", resp.status());
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"))
        }
        Err(e) => {
            eprintln!("healthcheck HTTP error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"))
        }
    }
}

/// Story Service
///
/// Serves `/api/v1/stories/*`: story listings (all, mine, per user, social
/// graph, grouped by owner), creation from an uploaded media file and owner
/// deletion. Story records live in PostgreSQL, media objects in S3.
///
/// Runs on port 8083 (configurable via STORY_SERVICE_PORT).
#[actix_web::main]
async fn main() -> io::Result<()> {
    // Container healthchecks: `story-service healthcheck`
    if let Some(cmd) = std::env::args().nth(1) {
        if cmd == "healthcheck" || cmd == "healthcheck-http" {
            return run_healthcheck().await;
        }
    }

    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match story_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting story-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = match db::create_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if config.database.run_migrations {
        db::migrate(&db_pool)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migrations failed: {e}")))?;
    }

    let s3_client = S3Client::connect(config.storage.clone()).await;
    match s3_client.health_check().await {
        Ok(()) => tracing::info!(bucket = %config.storage.bucket, "S3 bucket reachable"),
        Err(e) => tracing::warn!(error = %e, "S3 bucket not reachable at startup"),
    }

    let media: Arc<dyn MediaStore> = Arc::new(s3_client.operations());
    let orphans = Arc::new(PgOrphanedMediaRepository::new(db_pool.clone()));

    let stores = StoryStores {
        stories: Arc::new(PgStoryRepository::new(db_pool.clone())),
        users: Arc::new(PgUserRepository::new(db_pool.clone())),
        media: media.clone(),
        orphans: orphans.clone(),
    };
    let service = web::Data::new(StoriesService::new(
        stores,
        config.storage.clone(),
        config.stories.clone(),
    ));

    let health_state = web::Data::new(
        HealthState::new()
            .with_probe("postgresql", Arc::new(db_pool.clone()))
            .with_probe("s3", Arc::new(s3_client.clone())),
    );

    let auth = JwtAuthMiddleware::new(&config.auth.jwt_secret);
    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();

    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(service.clone())
            .app_data(health_state.clone())
            .wrap(MetricsMiddleware)
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(configure_api(auth.clone()))
    })
    .bind(&http_bind_address)?
    .workers(4)
    .run();

    let server_handle = server.handle();

    let mut tasks: JoinSet<io::Result<()>> = JoinSet::new();

    tasks.spawn(async move {
        tracing::info!("HTTP server is running");
        server.await
    });

    if config.stories.orphan_sweep_interval_secs > 0 {
        let sweeper = OrphanSweeper::new(
            orphans,
            media,
            Duration::from_secs(config.stories.orphan_sweep_interval_secs),
            config.stories.orphan_sweep_batch_size,
        );
        tasks.spawn(async move {
            sweeper.run().await;
            Ok(())
        });
    } else {
        tracing::info!("Orphaned media sweeper disabled");
    }

    let mut first_error: Option<io::Error> = None;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = tasks.join_next() => {
                match result {
                    Some(Ok(Ok(()))) => {
                        tracing::info!("Background task completed");
                    }
                    Some(Ok(Err(e))) => {
                        tracing::error!("Task returned error: {}", e);
                        first_error.get_or_insert(e);
                        server_handle.stop(true).await;
                        tasks.shutdown().await;
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::error!("Task join error: {}", e);
                        first_error
                            .get_or_insert(io::Error::new(io::ErrorKind::Other, e.to_string()));
                        server_handle.stop(true).await;
                        tasks.shutdown().await;
                        break;
                    }
                    None => break,
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                server_handle.stop(true).await;
                tasks.shutdown().await;
                break;
            }
        }
    }

    tracing::info!("Story-service shutting down");

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
