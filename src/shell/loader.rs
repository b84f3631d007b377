//! Loading the document shell from the build root or the dev server.

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Method, Request, Uri};
use hyper::body::Incoming;
use thiserror::Error;
use url::Url;

use crate::config::PreloadConfig;
use crate::http::proxy::HttpClient;
use crate::shell::DocumentShell;

const INDEX_FILE: &str = "index.html";

/// Largest shell document accepted from the dev server.
const MAX_SHELL_BYTES: usize = 16 * 1024 * 1024;

/// Errors obtaining the shell. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dev server url: {0}")]
    Url(String),

    #[error("failed to fetch {url} from dev server: {reason}")]
    Fetch { url: String, reason: String },

    #[error("dev server answered {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Where the shell and static assets come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellSource {
    /// A built app on disk.
    BuildRoot(PathBuf),
    /// A running development server.
    DevServer(Url),
}

impl ShellSource {
    /// Build root when configured and present, dev server otherwise.
    pub fn resolve(config: &PreloadConfig) -> Result<Self, ShellError> {
        if let Some(root) = config.build_root.as_deref() {
            let root = Path::new(root);
            if root.is_dir() {
                return Ok(Self::BuildRoot(root.to_path_buf()));
            }
            tracing::warn!(build_root = %root.display(), "Build root missing, falling back to dev server");
        }

        Url::parse(&config.dev_server_url)
            .map(Self::DevServer)
            .map_err(|e| ShellError::Url(format!("{}: {e}", config.dev_server_url)))
    }

    pub fn is_dev_server(&self) -> bool {
        matches!(self, Self::DevServer(_))
    }
}

/// Fetch and split the shell document.
pub async fn load_shell(source: &ShellSource, client: &HttpClient) -> Result<DocumentShell, ShellError> {
    let html = match source {
        ShellSource::BuildRoot(root) => read_from_disk(root).await?,
        ShellSource::DevServer(base) => fetch_from_dev_server(base, client).await?,
    };

    tracing::info!(
        bytes = html.len(),
        source = ?source,
        "Document shell cached, restart to pick up changes to index.html"
    );
    Ok(DocumentShell::from_html(html))
}

async fn read_from_disk(root: &Path) -> Result<String, ShellError> {
    let path = root.join(INDEX_FILE);
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ShellError::Read { path, source })
}

async fn fetch_from_dev_server(base: &Url, client: &HttpClient) -> Result<String, ShellError> {
    let url = base
        .join(INDEX_FILE)
        .map_err(|e| ShellError::Url(e.to_string()))?;
    let uri: Uri = url
        .as_str()
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| ShellError::Url(e.to_string()))?;
    let fetch_err = |reason: String| ShellError::Fetch {
        url: url.to_string(),
        reason,
    };

    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .map_err(|e| fetch_err(e.to_string()))?;

    let response: hyper::Response<Incoming> = client
        .request(request)
        .await
        .map_err(|e| fetch_err(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ShellError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_SHELL_BYTES)
        .await
        .map_err(|e| fetch_err(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_without_build_root_uses_dev_server() {
        let config = PreloadConfig::default();
        let source = ShellSource::resolve(&config).unwrap();
        assert_eq!(
            source,
            ShellSource::DevServer(Url::parse("http://localhost:3000").unwrap())
        );
        assert!(source.is_dev_server());
    }

    #[test]
    fn test_resolve_missing_build_root_uses_dev_server() {
        let config = PreloadConfig {
            build_root: Some("/no/such/build/root".into()),
            ..PreloadConfig::default()
        };
        assert!(ShellSource::resolve(&config).unwrap().is_dev_server());
    }

    #[test]
    fn test_resolve_existing_build_root() {
        let dir = std::env::temp_dir();
        let config = PreloadConfig {
            build_root: Some(dir.display().to_string()),
            ..PreloadConfig::default()
        };
        assert_eq!(ShellSource::resolve(&config).unwrap(), ShellSource::BuildRoot(dir));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let root = std::env::temp_dir().join(format!("http-preloader-shell-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("index.html"), "<html><body></body></html>").unwrap();

        let client = crate::http::proxy::build_client();
        let shell = load_shell(&ShellSource::BuildRoot(root.clone()), &client).await.unwrap();
        assert_eq!(shell.head(), "<html><body>");

        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_index_is_an_error() {
        let root = std::env::temp_dir().join(format!("http-preloader-empty-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();

        let client = crate::http::proxy::build_client();
        let err = load_shell(&ShellSource::BuildRoot(root.clone()), &client).await.unwrap_err();
        assert!(matches!(err, ShellError::Read { .. }));

        std::fs::remove_dir_all(root).unwrap();
    }
}
