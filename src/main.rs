use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;

use leavedesk::auth::session;
use leavedesk::config::Config;
use leavedesk::db::init_db;
use leavedesk::docs::ApiDoc;
use leavedesk::notification::Notifier;
use leavedesk::routes::{self, RateLimiters};
use leavedesk::utils::{email_cache, email_filter};
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "LeaveDesk is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env().context("failed to load configuration")?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections).await?;

    if let Some((email, password)) = &config.bootstrap_admin {
        session::bootstrap_admin(&pool, email, password)
            .await
            .map_err(|e| anyhow::anyhow!("failed to seed admin account: {e}"))?;
    }

    let notifier = Notifier::from_config(config.smtp.as_ref()).context("invalid SMTP settings")?;
    let limiters = RateLimiters::from_config(&config)?;

    let pool_for_filter_warmup = pool.clone();
    let pool_for_cache_warmup = pool.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = email_filter::warmup_email_filter(&pool_for_filter_warmup, 100).await {
            warn!(error = %e, "Failed to warm up email filter");
        }
    });

    actix_web::rt::spawn(async move {
        // Recent logins from the last 30 days, in batches of 250
        if let Err(e) = email_cache::warmup_email_cache(&pool_for_cache_warmup, 30, 250).await {
            warn!(error = %e, "Failed to warm up email cache");
        }
    });

    let server_addr = config.server_addr.clone();
    let pool_data = Data::new(pool);
    let config_data = Data::new(config);
    let notifier_data = Data::new(notifier);

    HttpServer::new(move || {
        let config = config_data.clone();
        let limiters = limiters.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(pool_data.clone())
            .app_data(config.clone())
            .app_data(notifier_data.clone())
            .service(index)
            .configure(move |cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
