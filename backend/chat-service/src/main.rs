use actix_web::{dev::Service as _, web, App, HttpServer};
use anyhow::Context;
use chat_service::{
    config::Config,
    db,
    gateways::{FcmPushSender, PgIdentityGateway, PushNotificationGateway},
    logging, metrics,
    middleware::JwtVerifier,
    repository::PgConversationStore,
    routes,
    services::{ConversationService, MessagingService},
    state::AppState,
    validation::InputValidator,
};
use std::sync::Arc;
use std::time::Instant;
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env().context("load configuration")?;
    logging::init_tracing(cfg.log_json);
    tracing::info!(config = ?cfg, "starting chat-service");

    let pool = db::init_pool(&cfg.db)
        .await
        .context("initialize database pool")?;

    let store = Arc::new(PgConversationStore::new(pool.clone()));
    let identity = Arc::new(PgIdentityGateway::new(pool.clone()));
    let sender = Arc::new(FcmPushSender::new(&cfg.fcm)?);
    let notifications = Arc::new(PushNotificationGateway::new(pool, sender));
    let validator = InputValidator::new(cfg.message_body_max_chars);

    let state = AppState {
        conversations: Arc::new(ConversationService::new(
            store.clone(),
            identity.clone(),
            validator.clone(),
            cfg.pagination,
        )),
        messaging: Arc::new(MessagingService::new(
            store,
            identity,
            notifications,
            validator,
        )),
        auth: Arc::new(JwtVerifier::new(&cfg.server_secret)),
    };

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "listening");

    HttpServer::new(move || {
        App::new()
            .wrap_fn(|req, srv| {
                let method = req.method().to_string();
                let start = Instant::now();
                let fut = srv.call(req);
                async move {
                    let res = fut.await?;
                    let path = res
                        .request()
                        .match_pattern()
                        .unwrap_or_else(|| "unmatched".to_string());
                    metrics::record_http_request(
                        &method,
                        &path,
                        res.status().as_u16(),
                        start.elapsed().as_secs_f64(),
                    );
                    Ok(res)
                }
            })
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::metrics_handler))
    })
    .bind(&bind_addr)
    .with_context(|| format!("bind {bind_addr}"))?
    .run()
    .await
    .context("run http server")?;

    Ok(())
}
