/// HTTP router assembly
use crate::{api, middleware, state::AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Multipart framing allowance on top of the file size limit
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Build the application router
///
/// An empty `cors_allowed_origins` allows any origin.
pub fn create_router(app_state: AppState, cors_allowed_origins: &[String]) -> Router {
    let auth_service = Arc::clone(&app_state.auth_service);
    let upload_limit = usize::try_from(
        app_state
            .songs
            .limits()
            .max_bytes
            .saturating_add(MULTIPART_OVERHEAD),
    )
    .unwrap_or(usize::MAX);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/ping", get(api::health::ping))
        .route("/signup", post(api::auth::signup))
        .route("/signin", post(api::auth::signin))
        .route("/auth/refresh", post(api::auth::refresh));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        // Songs
        .route(
            "/upload",
            post(api::songs::upload_song).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/songs", get(api::songs::list_songs))
        .route("/search", get(api::songs::search_songs))
        .route(
            "/song/:id",
            get(api::songs::get_song)
                .put(api::songs::update_song)
                .delete(api::songs::delete_song),
        )
        // Streaming
        .route("/stream/:id", get(api::stream::stream_song))
        // Playlists
        .route(
            "/playlists",
            get(api::playlists::list_playlists).post(api::playlists::create_playlist),
        )
        .route(
            "/playlist/:id",
            get(api::playlists::get_playlist)
                .put(api::playlists::update_playlist)
                .delete(api::playlists::delete_playlist),
        )
        .route(
            "/playlist/:id/songs",
            post(api::playlists::add_song_to_playlist),
        )
        .route(
            "/playlist/:id/songs/:song_id",
            put(api::playlists::move_song_in_playlist)
                .delete(api::playlists::remove_song_from_playlist),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_service,
            middleware::auth_middleware,
        ));

    public_routes
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(cors_layer(cors_allowed_origins))
        .with_state(app_state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}
