//! HTTP server: MDX posts, events and the raw blog dump

mod views;

use anyhow::Result;
use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::{Category, ContentError, ContentLoader};
use crate::remote::{fetch_blogs, fetch_events, SupabaseClient};
use crate::Site;

/// Shared, read-only state handed to every handler
pub struct AppState {
    pub config: SiteConfig,
    pub loader: ContentLoader,
    /// `None` when the Supabase environment is not configured
    pub supabase: Option<SupabaseClient>,
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(base_dir: &Path, config: SiteConfig) -> Result<Self> {
        let loader = ContentLoader::from_config(base_dir, &config);
        let supabase = if config.has_env_vars() {
            Some(SupabaseClient::new(&config.supabase)?)
        } else {
            tracing::warn!("Supabase is not configured; remote pages are disabled");
            None
        };
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            loader,
            supabase,
            public_dir,
        })
    }

    pub fn from_site(site: &Site) -> Result<Self> {
        Self::new(&site.base_dir, site.config.clone())
    }

    fn page(&self, title: &str, body: &str) -> Html<String> {
        Html(views::layout(&self.config, title, body))
    }

    fn page_with_status(&self, status: StatusCode, title: &str, body: &str) -> Response {
        (status, self.page(title, body)).into_response()
    }

    fn not_found(&self) -> Response {
        self.page_with_status(StatusCode::NOT_FOUND, "Not found", &views::not_found())
    }

    fn content_error(&self, err: &ContentError) -> Response {
        tracing::error!("Content pipeline failed: {}", err);
        self.page_with_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error",
            &views::server_error(&err.to_string()),
        )
    }

    fn env_missing(&self) -> Response {
        self.page_with_status(StatusCode::SERVICE_UNAVAILABLE, "", &views::env_missing())
    }
}

type Shared = State<Arc<AppState>>;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/", get(home))
        .route("/events", get(events))
        .route("/blogs", get(blogs))
        .route("/blog", get(blog_index))
        .route("/blog/:slug", get(blog_post))
        .route("/space", get(space_index))
        .route("/space/:slug", get(space_post))
        .route("/api/posts/:category", get(api_posts))
        .route("/api/posts/:category/:slug", get(api_post))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server and block until it stops
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::from_site(site)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub async fn home(State(state): Shared) -> Response {
    let body = if state.config.has_env_vars() {
        views::home(&state.config)
    } else {
        views::env_missing()
    };
    state.page("", &body).into_response()
}

pub async fn events(State(state): Shared) -> Response {
    let Some(client) = &state.supabase else {
        return state.env_missing();
    };

    match fetch_events(client).await {
        Ok(events) => {
            let body = views::events(&events, client, &state.config.supabase.events_bucket);
            state.page("Events", &body).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch events: {}", e);
            state.page_with_status(
                StatusCode::BAD_GATEWAY,
                "Events",
                &views::remote_error("Events", &e),
            )
        }
    }
}

pub async fn blogs(State(state): Shared) -> Response {
    let Some(client) = &state.supabase else {
        return state.env_missing();
    };

    match fetch_blogs(client).await {
        Ok(rows) => state.page("Blogs", &views::blogs(&rows)).into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch blogs: {}", e);
            state.page_with_status(
                StatusCode::BAD_GATEWAY,
                "Blogs",
                &views::remote_error("Blogs", &e),
            )
        }
    }
}

pub async fn blog_index(state: Shared) -> Response {
    category_index(state, Category::Blog).await
}

pub async fn space_index(state: Shared) -> Response {
    category_index(state, Category::Space).await
}

pub async fn blog_post(state: Shared, slug: UrlPath<String>) -> Response {
    post_page(state, Category::Blog, slug).await
}

pub async fn space_post(state: Shared, slug: UrlPath<String>) -> Response {
    post_page(state, Category::Space, slug).await
}

async fn category_index(State(state): Shared, category: Category) -> Response {
    match state.loader.load_category(category).await {
        Ok(posts) => {
            let title = category.to_string();
            state
                .page(&title, &views::post_list(category, &posts))
                .into_response()
        }
        Err(e) => state.content_error(&e),
    }
}

async fn post_page(
    State(state): Shared,
    category: Category,
    UrlPath(slug): UrlPath<String>,
) -> Response {
    let Some(post) = state.loader.get_post(category, &slug).await else {
        return state.not_found();
    };

    match post.content_html() {
        Ok(html) => state
            .page(&post.title, &views::post(&post, &html))
            .into_response(),
        Err(e) => state.content_error(&e),
    }
}

pub async fn api_posts(State(state): Shared, UrlPath(category): UrlPath<String>) -> Response {
    let Ok(category) = category.parse::<Category>() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.loader.load_category(category).await {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => {
            tracing::error!("Failed to load {} posts: {}", category, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn api_post(
    State(state): Shared,
    UrlPath((category, slug)): UrlPath<(String, String)>,
) -> Response {
    let Ok(category) = category.parse::<Category>() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.loader.get_post(category, &slug).await {
        Some(post) => Json(post).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
