//! Static pages served to plain HTTP requests on the WebSocket port.
//!
//! `/theinbetween` gets the in-between page, every other path gets the
//! index page. The router in `network` decides which page a request wants.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use log::{debug, warn};
use std::path::{Path, PathBuf};

pub const INDEX_PAGE: &str = "index.html";
pub const BETWEEN_PAGE: &str = "theinbetween.html";

pub struct StaticPages {
    root: PathBuf,
}

impl StaticPages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads `page` from the pages directory, answering 404 when it is missing.
    pub async fn serve(&self, page: &str) -> Response {
        let file = self.root.join(page);

        match tokio::fs::read(&file).await {
            Ok(body) => {
                debug!("Serving {}", page);
                Html(body).into_response()
            }
            Err(e) => {
                warn!("Cannot read {}: {}", file.display(), e);
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
        }
    }
}
