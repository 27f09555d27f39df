//! Fetching catalogues and painting them onto a page.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use docshelf_catalogue::{parse_catalogue, CatalogueError};

use crate::page::{Page, PaintOutcome, PaintTicket};
use crate::render::{RenderError, Renderer};

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while fetching a catalogue.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to create HTTP client: {0}")]
    ClientError(String),

    #[error("Request to {url} failed: {message}")]
    RequestError { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    StatusError { url: String, status: u16 },

    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },
}

/// Errors that can occur while loading a catalogue.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: CatalogueError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Retrieves the text of a catalogue descriptor.
pub trait Fetcher: Send + Sync {
    /// Fetch the resource at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches `http(s)://` URLs over the network and anything else from disk.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: reqwest::Client,
    base_dir: PathBuf,
}

impl SourceFetcher {
    /// Create a fetcher resolving relative file paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("docshelf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            base_dir: base_dir.into(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    async fn fetch_http(&self, url: &str) -> Result<String, FetchError> {
        let request_error = |e: reqwest::Error| FetchError::RequestError {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        if !response.status().is_success() {
            return Err(FetchError::StatusError {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(request_error)
    }

    async fn fetch_file(&self, url: &str) -> Result<String, FetchError> {
        let path = self.base_dir.join(url);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FetchError::ReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }
}

impl Fetcher for SourceFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if is_remote(url) {
            self.fetch_http(url).await
        } else {
            self.fetch_file(url).await
        }
    }
}

/// Whether `url` is fetched over the network.
pub fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Loads catalogues into a shared page.
///
/// Cloning is cheap; clones share the fetcher, renderer and page.
pub struct Loader<F> {
    fetcher: Arc<F>,
    renderer: Arc<Renderer>,
    page: Arc<RwLock<Page>>,
}

impl<F> Clone for Loader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            renderer: Arc::clone(&self.renderer),
            page: Arc::clone(&self.page),
        }
    }
}

impl<F: Fetcher> Loader<F> {
    pub fn new(fetcher: F, renderer: Arc<Renderer>, page: Arc<RwLock<Page>>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            renderer,
            page,
        }
    }

    pub fn page(&self) -> &Arc<RwLock<Page>> {
        &self.page
    }

    pub fn renderer(&self) -> &Arc<Renderer> {
        &self.renderer
    }

    /// Fetch the catalogue at `catalogue_url` and paint it into `tag`.
    ///
    /// On failure the container keeps whatever it showed before.
    pub async fn load_catalogue(
        &self,
        catalogue_url: &str,
        path: &str,
        tag: &str,
        show: bool,
    ) -> Result<PaintOutcome, LoadError> {
        let ticket = self.page.write().await.begin(tag);

        tracing::debug!("Loading catalogue {} into {}", catalogue_url, tag);

        let result = match self.fetcher.fetch(catalogue_url).await {
            Ok(xml) => self.paint_ticket(ticket, catalogue_url, &xml, path, show).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = &result {
            tracing::warn!("Failed to load catalogue {}: {}", catalogue_url, e);
        }

        result
    }

    /// Paint already fetched catalogue XML into `tag`.
    pub async fn paint_catalogue(
        &self,
        xml: &str,
        path: &str,
        tag: &str,
        show: bool,
    ) -> Result<PaintOutcome, LoadError> {
        let ticket = self.page.write().await.begin(tag);
        self.paint_ticket(ticket, tag, xml, path, show).await
    }

    async fn paint_ticket(
        &self,
        ticket: PaintTicket,
        source: &str,
        xml: &str,
        path: &str,
        show: bool,
    ) -> Result<PaintOutcome, LoadError> {
        let catalogue = parse_catalogue(xml).map_err(|e| LoadError::Parse {
            url: source.to_string(),
            source: e,
        })?;

        let rendered = self
            .renderer
            .render(&catalogue, path, ticket.tag(), show)?;

        let outcome = self.page.write().await.paint(ticket, rendered);
        if outcome == PaintOutcome::Applied {
            tracing::debug!(
                "Painted {} ({} documents)",
                catalogue.title,
                catalogue.entries.len()
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    use axum::{routing::get, Router};
    use tempfile::tempdir;
    use tokio::sync::Notify;

    const XML: &str = r#"<rtems-docs date="2021-01"><catalogue>C User Guide</catalogue>
        <doc><title>C User Guide</title><html>c_user/index.html</html><pdf>c_user.pdf</pdf></doc>
    </rtems-docs>"#;

    /// Serves fixed documents, optionally holding one URL until released.
    #[derive(Default)]
    struct MemoryFetcher {
        docs: HashMap<String, String>,
        hold: Option<(String, Arc<Notify>)>,
    }

    impl Fetcher for MemoryFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            if let Some((held, gate)) = &self.hold {
                if held == url {
                    gate.notified().await;
                }
            }
            self.docs
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::ReadError {
                    path: url.to_string(),
                    message: "not found".to_string(),
                })
        }
    }

    fn loader(fetcher: MemoryFetcher) -> Loader<MemoryFetcher> {
        Loader::new(
            fetcher,
            Arc::new(Renderer::default()),
            Arc::new(RwLock::new(Page::new())),
        )
    }

    fn with_docs(docs: &[(&str, &str)]) -> MemoryFetcher {
        MemoryFetcher {
            docs: docs
                .iter()
                .map(|(u, x)| (u.to_string(), x.to_string()))
                .collect(),
            hold: None,
        }
    }

    #[tokio::test]
    async fn loads_and_paints() {
        let loader = loader(with_docs(&[("cat.xml", XML)]));

        let outcome = loader
            .load_catalogue("cat.xml", "releases/5.1", "5_1", true)
            .await
            .unwrap();

        assert_eq!(outcome, PaintOutcome::Applied);
        let page = loader.page().read().await;
        let painted = page.container("5_1").unwrap().painted().unwrap();
        assert!(painted
            .markup
            .as_str()
            .contains(r#"href="releases/5.1/c_user/index.html""#));
        assert_eq!(painted.binding.panel_id(), "C_User_Guide");
        assert!(painted.binding.show());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_container_untouched() {
        let loader = loader(with_docs(&[("cat.xml", XML)]));
        loader
            .load_catalogue("cat.xml", "p", "t", false)
            .await
            .unwrap();

        let result = loader.load_catalogue("missing.xml", "p", "t", false).await;

        assert!(matches!(result, Err(LoadError::Fetch(_))));
        let page = loader.page().read().await;
        assert!(page.container("t").unwrap().markup().is_some());
    }

    #[tokio::test]
    async fn unreadable_xml_is_not_painted() {
        let loader = loader(with_docs(&[("bad.xml", "<rtems-docs><catalogue>")]));

        let result = loader.load_catalogue("bad.xml", "p", "t", false).await;

        assert!(matches!(result, Err(LoadError::Parse { .. })));
        let page = loader.page().read().await;
        assert!(page.container("t").unwrap().markup().is_none());
    }

    #[tokio::test]
    async fn superseded_load_is_discarded() {
        let gate = Arc::new(Notify::new());
        let old = XML.replace("C User Guide", "Old Guide");
        let mut fetcher = with_docs(&[("old.xml", old.as_str()), ("new.xml", XML)]);
        fetcher.hold = Some(("old.xml".to_string(), Arc::clone(&gate)));
        let loader = loader(fetcher);

        let slow = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load_catalogue("old.xml", "p", "t", false).await })
        };
        // Let the slow load take its ticket before the newer one starts.
        while loader.page().read().await.container("t").is_none() {
            tokio::task::yield_now().await;
        }

        let fast = loader.load_catalogue("new.xml", "p", "t", false).await.unwrap();
        gate.notify_one();
        let slow = slow.await.unwrap().unwrap();

        assert_eq!(fast, PaintOutcome::Applied);
        assert_eq!(slow, PaintOutcome::Superseded { latest: 2 });
        let page = loader.page().read().await;
        let markup = page.container("t").unwrap().markup().unwrap();
        assert!(markup.as_str().contains("C User Guide"));
        assert!(!markup.as_str().contains("Old Guide"));
    }

    #[tokio::test]
    async fn paints_xml_directly() {
        let loader = loader(MemoryFetcher::default());

        loader.paint_catalogue(XML, "p", "t", false).await.unwrap();
        loader.paint_catalogue(XML, "q", "t", false).await.unwrap();

        let page = loader.page().read().await;
        let markup = page.container("t").unwrap().markup().unwrap();
        assert!(markup.as_str().contains(r#"href="q/c_user.pdf""#));
        assert!(!markup.as_str().contains(r#"href="p/c_user.pdf""#));
    }

    #[tokio::test]
    async fn source_fetcher_reads_files() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("releases")).unwrap();
        std::fs::write(temp.path().join("releases/5.1.xml"), XML).unwrap();

        let fetcher = SourceFetcher::new(temp.path()).unwrap();

        let xml = fetcher.fetch("releases/5.1.xml").await.unwrap();
        assert_eq!(xml, XML);

        let missing = fetcher.fetch("releases/none.xml").await;
        assert!(matches!(missing, Err(FetchError::ReadError { .. })));
    }

    #[tokio::test]
    async fn source_fetcher_uses_http() {
        let app = Router::new()
            .route("/catalogue.xml", get(|| async { XML }))
            .route(
                "/gone.xml",
                get(|| async { (axum::http::StatusCode::NOT_FOUND, "gone") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let fetcher = SourceFetcher::new(".").unwrap();

        let xml = fetcher
            .fetch(&format!("http://{}/catalogue.xml", addr))
            .await
            .unwrap();
        assert_eq!(xml, XML);

        let gone = fetcher.fetch(&format!("http://{}/gone.xml", addr)).await;
        assert!(matches!(
            gone,
            Err(FetchError::StatusError { status: 404, .. })
        ));
    }

    #[test]
    fn detects_remote_urls() {
        assert!(is_remote("https://docs.example.org/catalogue.xml"));
        assert!(is_remote("http://localhost/c.xml"));
        assert!(!is_remote("releases/5.1.xml"));
    }
}
