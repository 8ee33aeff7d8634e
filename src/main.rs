mod core;
mod features;
mod modules;
mod shared;

use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::handlers::AuthState;
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::{AuthService, TokenService};
use crate::features::contact::routes as contact_routes;
use crate::features::contact::services::ContactService;
use crate::features::notifications::services::{NotificationService, OutboxWorker};
use crate::features::requests::routes as requests_routes;
use crate::features::requests::services::AnfrageService;
use crate::features::uploads::routes as uploads_routes;
use crate::features::uploads::services::UploadService;
use crate::modules::mailer::{Mailer, SmtpMailer};
use crate::modules::storage::{MinIOClient, ObjectStore};

fn main() -> anyhow::Result<()> {
    // Worker count defaults to the machine, overridable for containers
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // .env first so RUST_LOG is visible to the subscriber
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        worker_threads,
        pid = std::process::id(),
        "rechtly-core starting"
    );

    let pool = database::create_pool(&config.database).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database ready, migrations applied");

    // Document storage; the bucket is created on first boot
    let minio_client = Arc::new(
        MinIOClient::new(config.minio.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?,
    );
    minio_client
        .ensure_bucket_exists()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to ensure MinIO bucket exists: {}", e))?;
    tracing::info!(bucket = %minio_client.bucket_name(), "Object storage ready");
    let store: Arc<dyn ObjectStore> = minio_client;

    let mailer: Arc<dyn Mailer> = Arc::new(
        SmtpMailer::new(&config.smtp)
            .map_err(|e| anyhow::anyhow!("Failed to initialize SMTP transport: {}", e))?,
    );
    tracing::info!(host = %config.smtp.host, "SMTP transport ready");

    let upload_service = Arc::new(UploadService::new(pool.clone(), Arc::clone(&store)));
    let anfrage_service = Arc::new(AnfrageService::new(pool.clone()));
    let notification_service = Arc::new(NotificationService::new(
        Arc::clone(&store),
        Arc::clone(&mailer),
        &config.notifications,
    ));
    let contact_service = Arc::new(ContactService::new(
        Arc::clone(&mailer),
        &config.notifications,
    ));
    let token_service = TokenService::new(&config.auth);
    let auth_service = Arc::new(AuthService::new(
        pool.clone(),
        Arc::clone(&mailer),
        config.app.frontend_url.clone(),
    ));
    let auth_state = AuthState {
        auth: auth_service,
        tokens: token_service.clone(),
        cookie_domain: config.auth.cookie_domain.clone(),
    };
    let outbox_worker = OutboxWorker::new(
        pool.clone(),
        Arc::clone(&notification_service),
        &config.notifications,
    );
    tokio::spawn(outbox_worker.run());

    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI gated behind basic auth");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require a verified session)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(auth_state.clone()))
        .merge(requests_routes::protected_routes(Arc::clone(
            &anfrage_service,
        )))
        .route_layer(axum::middleware::from_fn_with_state(
            token_service,
            middleware::auth_middleware,
        ));

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(uploads_routes::routes(upload_service))
        .merge(requests_routes::public_routes(anfrage_service))
        .merge(contact_routes::routes(contact_service))
        .merge(auth_routes::public_routes(auth_state));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Listener tuned for many small uploads arriving at once
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Listening on http://{} (swagger at /swagger-ui)", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
