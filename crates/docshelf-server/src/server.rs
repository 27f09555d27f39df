//! Development server implementation.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use docshelf_render::{
    runtime_script, BuildConfig, CatalogueSource, Loader, Page, PaintOutcome, SourceFetcher,
    StaticBuilder, LATEST_PAGE,
};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{LiveHub, LiveMessage};

/// WebSocket endpoint of the live channel.
const LIVE_PATH: &str = "/__shelf";

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site and catalogue settings
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    AddressError(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Failed to load catalogues: {0}")]
    LoadError(String),
}

/// Shared server state.
struct ServerState {
    builder: StaticBuilder,
    loader: Loader<SourceFetcher>,
    sources: RwLock<Vec<CatalogueSource>>,
    hub: LiveHub,
}

impl ServerState {
    /// Load every catalogue once and set up the live channel.
    async fn prepare(config: &DevServerConfig) -> Result<Arc<Self>, ServerError> {
        let builder = StaticBuilder::new(config.build.clone());
        let sources = builder
            .sources()
            .map_err(|e| ServerError::LoadError(e.to_string()))?;

        let fetcher = SourceFetcher::new(&config.build.base_dir)
            .map_err(|e| ServerError::LoadError(e.to_string()))?;
        let page = Arc::new(RwLock::new(StaticBuilder::page_for(&sources)));
        let loader = Loader::new(fetcher, Arc::clone(builder.renderer()), page);

        let summary = StaticBuilder::load_all(&loader, &sources).await;
        tracing::info!(
            "Loaded {} of {} catalogues",
            summary.painted,
            sources.len()
        );

        Ok(Arc::new(Self {
            builder,
            loader,
            sources: RwLock::new(sources),
            hub: LiveHub::new(),
        }))
    }
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::AddressError(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let state = ServerState::prepare(&self.config).await?;

        let (watcher, mut rx) = FileWatcher::new(&[self.config.build.base_dir.clone()])
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(state, &self.config.build.base_dir);

        tracing::info!("Starting dev server at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Build the router. Paths that are not server routes are served from the
/// site root so document links resolve.
fn router(state: Arc<ServerState>, site_root: &Path) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route(&format!("/{}", LATEST_PAGE), get(latest_handler))
        .route(LIVE_PATH, get(ws_handler))
        .route("/__shelf.js", get(runtime_handler))
        .fallback_service(ServeDir::new(site_root))
        .with_state(state)
}

/// Handle file watch events.
async fn handle_watch_event(state: &Arc<ServerState>, event: WatchEvent) {
    match event {
        WatchEvent::CatalogueChanged(path) => {
            tracing::info!("Catalogue changed: {}", path.display());

            let base_dir = &state.builder.config().base_dir;
            let matching: Vec<CatalogueSource> = state
                .sources
                .read()
                .await
                .iter()
                .filter(|s| {
                    s.local_path(base_dir)
                        .is_some_and(|local| same_file(&local, &path))
                })
                .cloned()
                .collect();

            if matching.is_empty() {
                rescan(state).await;
                return;
            }

            for source in matching {
                repaint(state, &source).await;
            }
        }

        WatchEvent::CatalogueRemoved(path) => {
            // The page keeps the last painted panel
            tracing::info!("Catalogue removed: {}", path.display());
        }
    }
}

/// Reload one catalogue and push it to open pages.
async fn repaint(state: &ServerState, source: &CatalogueSource) {
    let outcome = state
        .loader
        .load_catalogue(&source.url, &source.path, &source.tag, source.show)
        .await;

    if let Ok(PaintOutcome::Applied) = outcome {
        let page = state.loader.page().read().await;
        if let Some(msg) = page.container(&source.tag).and_then(LiveMessage::paint) {
            state.hub.send(msg);
        }
    }
}

/// Pick up catalogues added under the scan directory.
async fn rescan(state: &ServerState) {
    if state.builder.config().scan_dir.is_none() {
        return;
    }

    let found = match state.builder.sources() {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!("Failed to rescan catalogues: {}", e);
            return;
        }
    };

    let added: Vec<CatalogueSource> = {
        let mut sources = state.sources.write().await;
        let added: Vec<_> = found
            .into_iter()
            .filter(|f| !sources.iter().any(|s| s.tag == f.tag))
            .collect();
        sources.extend(added.iter().cloned());
        added
    };

    if added.is_empty() {
        return;
    }

    {
        let mut page = state.loader.page().write().await;
        for source in &added {
            tracing::info!("New catalogue: {}", source.name);
            page.add_container(&source.tag, &source.name);
        }
    }

    StaticBuilder::load_all(&state.loader, &added).await;

    // New containers change the page layout
    state.hub.send(LiveMessage::Reload);
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Handler for the index page.
async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    let page = state.loader.page().read().await;
    render_page(&state, &page)
}

/// Handler for the page showing only the latest release.
async fn latest_handler(State(state): State<Arc<ServerState>>) -> Response {
    let Some(tag) = state.builder.latest_tag() else {
        return (StatusCode::NOT_FOUND, "No latest release configured").into_response();
    };

    let page = state.loader.page().read().await.select(&[tag.as_str()]);
    if page.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            format!("Latest release {} is not one of the catalogues", tag),
        )
            .into_response();
    }

    render_page(&state, &page)
}

fn render_page(state: &ServerState, page: &Page) -> Response {
    let settings = state.builder.page_settings("/__shelf.js".to_string());
    let renderer = state.loader.renderer();

    match page.render(renderer.templates(), renderer.options(), &settings) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Failed to render page: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render page: {}", e),
            )
                .into_response()
        }
    }
}

/// Handler for the live WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    if send_json(&mut socket, &LiveMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_json(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_json(socket: &mut WebSocket, msg: &LiveMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::warn!("Failed to encode live message: {}", e);
    })?;
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// Handler for the panel runtime with the live channel enabled.
async fn runtime_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let script = runtime_script(
        &state.builder.config().render.container_prefix,
        Some(LIVE_PATH),
    );
    ([("content-type", "application/javascript")], script)
}
