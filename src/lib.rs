use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod accounts;
pub mod auth;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod extract;
pub mod gallery;
pub mod handlers;
pub mod mailer;
pub mod mock_data;
pub mod models;
pub mod rate_limit;
pub mod repository;
pub mod slug;
pub mod storage;

// Access-segregated routers (public, authenticated, admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use accounts::{AccountServiceState, DemoAccounts, StoreAccounts};
pub use auth::{AuthUser, JwtKeys, auth_middleware, require_admin};
pub use config::AppConfig;
pub use connectivity::{ConnectivityProbe, PoolProbe, ProbeState, StaticProbe};
pub use error::AppError;
pub use gallery::{ArtworkReaderState, MockArtworkReader, StoreArtworkReader};
pub use mailer::{MailerState, NoopMailer, SmtpMailer};
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document assembled from the `#[utoipa::path]` handlers and the
/// `ToSchema` models. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::root, handlers::health::health,
        handlers::auth::register, handlers::auth::login, handlers::auth::logout,
        handlers::auth::me, handlers::auth::update_profile,
        handlers::artworks::list_artworks, handlers::artworks::latest_artworks,
        handlers::artworks::artwork_categories, handlers::artworks::get_artwork,
        handlers::artworks::create_artwork, handlers::artworks::update_artwork,
        handlers::artworks::delete_artwork,
        handlers::blogs::list_blogs, handlers::blogs::latest_blogs, handlers::blogs::get_blog,
        handlers::blogs::create_blog, handlers::blogs::update_blog, handlers::blogs::delete_blog,
        handlers::blogs::add_comment, handlers::blogs::delete_comment,
        handlers::blogs::add_reply, handlers::blogs::delete_reply,
        handlers::courses::list_courses, handlers::courses::featured_courses,
        handlers::courses::get_course, handlers::courses::create_course,
        handlers::courses::update_course, handlers::courses::delete_course,
        handlers::shop::list_shop_items, handlers::shop::get_shop_item,
        handlers::shop::create_shop_item, handlers::shop::update_shop_item,
        handlers::shop::delete_shop_item,
        handlers::contact::submit_contact, handlers::newsletter::subscribe,
        handlers::admin::dashboard_stats, handlers::admin::list_users,
        handlers::admin::update_user_role, handlers::admin::delete_user,
        handlers::admin::list_contacts, handlers::admin::update_contact_status,
        handlers::admin::delete_contact, handlers::admin::list_subscribers,
        handlers::admin::delete_subscriber, handlers::admin::bulk_delete,
    ),
    components(
        schemas(
            models::Role, models::ArtworkCategory, models::CourseLevel, models::ContactStatus,
            models::User, models::RegisterRequest, models::LoginRequest, models::ProfileUpdate,
            models::AuthResponse, models::UserResponse, models::RoleUpdate,
            models::Artwork, models::ArtworkInput, models::Dimensions,
            models::Blog, models::BlogInput, models::BlogAuthor, models::Comment, models::Reply,
            models::CommentRequest, models::ReplyRequest,
            models::Course, models::CourseInput, models::Instructor, models::CurriculumEntry,
            models::ShopItem, models::ShopItemInput, models::PrintSize, models::FramingOption,
            models::ShippingInfo,
            models::Contact, models::ContactRequest, models::ContactStatusUpdate,
            models::Subscriber, models::SubscribeRequest,
            models::BulkDeleteRequest, models::BulkDeleteResponse, models::EntityCounts,
            models::DashboardData, models::DashboardResponse, models::UserListResponse,
            models::ContactListResponse, models::ContactResponse,
            models::SubscriberListResponse, models::SubscriberResponse,
            models::MessageResponse, models::HealthResponse,
            error::ErrorBody, error::FieldError,
        )
    ),
    tags(
        (name = "gallery-portal", description = "Portfolio and gallery CMS API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, cheaply cloned container for every service a handler can reach.
/// Mode selection (live store vs. demo data) happens here, once per call, from
/// the connectivity probe.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub probe: ProbeState,
    pub storage: StorageState,
    pub mailer: MailerState,
    pub config: AppConfig,
    pub jwt: JwtKeys,
    live_artworks: ArtworkReaderState,
    demo_artworks: ArtworkReaderState,
    live_accounts: AccountServiceState,
    demo_accounts: AccountServiceState,
}

impl AppState {
    pub fn new(
        repo: RepositoryState,
        probe: ProbeState,
        storage: StorageState,
        mailer: MailerState,
        config: AppConfig,
    ) -> Self {
        Self {
            live_artworks: Arc::new(StoreArtworkReader::new(repo.clone())),
            demo_artworks: Arc::new(MockArtworkReader),
            live_accounts: Arc::new(StoreAccounts::new(repo.clone())),
            demo_accounts: Arc::new(DemoAccounts),
            jwt: JwtKeys::from_config(&config),
            repo,
            probe,
            storage,
            mailer,
            config,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.probe.is_connected()
    }

    /// The live store, or 503 while it is unreachable.
    pub fn store(&self) -> Result<&RepositoryState, AppError> {
        if self.is_connected() {
            Ok(&self.repo)
        } else {
            Err(AppError::store_unavailable())
        }
    }

    /// Artwork reads: live store when reachable, demo dataset otherwise.
    pub fn artworks(&self) -> ArtworkReaderState {
        if self.is_connected() {
            self.live_artworks.clone()
        } else {
            self.demo_artworks.clone()
        }
    }

    /// Account operations: live store when reachable, demo credentials otherwise.
    pub fn accounts(&self) -> AccountServiceState {
        if self.is_connected() {
            self.live_accounts.clone()
        } else {
            self.demo_accounts.clone()
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for ProbeState {
    fn from_ref(app_state: &AppState) -> ProbeState {
        app_state.probe.clone()
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(app_state: &AppState) -> JwtKeys {
        app_state.jwt.clone()
    }
}

/// create_router
///
/// Assembles the full application: the `/api` tree (rate limited, with the auth
/// and admin gates scoped to their routers), the root banner, health check and
/// Swagger UI, then the request-id, tracing and CORS layers around everything.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let limiter = rate_limit::api_rate_limiter(
        state.config.rate_limit_window,
        state.config.rate_limit_max,
        rate_limit::ClientIpKeyExtractor {
            trust_proxy_headers: state.config.trust_proxy_headers,
        },
    );

    // Later route_layer calls run first: authentication wraps the role gate.
    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .layer(limiter);

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .nest("/api", api)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: every log line of one request carries the
/// same method, uri and request id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
