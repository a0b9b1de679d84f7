use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::bible_books;
use crate::model::{Book, ResourceBundle};
use crate::request::DocumentRequest;

/// On-disk input of one assembly: the request and the books parsed for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub request: DocumentRequest,
    #[serde(default)]
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleFormat {
    Json,
    Yaml,
}

impl BundleFormat {
    /// YAML for `.yaml`/`.yml`, JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

impl Bundle {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read bundle: {}", path.display()))?;
        Self::parse(&contents, BundleFormat::from_path(path))
            .with_context(|| format!("parse bundle: {}", path.display()))
    }

    pub fn parse(contents: &str, format: BundleFormat) -> anyhow::Result<Self> {
        let bundle: Self = match format {
            BundleFormat::Json => serde_json::from_str(contents).context("deserialize json bundle")?,
            BundleFormat::Yaml => serde_yaml::from_str(contents).context("deserialize yaml bundle")?,
        };
        bundle.warn_suspect_books();
        Ok(bundle)
    }

    /// Books with an unknown code or matching no resource request. Both are
    /// kept; assembly skips what it cannot place.
    fn warn_suspect_books(&self) {
        for book in &self.books {
            if !bible_books::is_known_book(book.book_code()) {
                tracing::warn!(
                    lang_code = book.lang_code(),
                    book_code = book.book_code(),
                    "unknown book code"
                );
            }
            let requested = self.request.resource_requests.iter().any(|request| {
                request.lang_code == book.lang_code() && request.book_code == book.book_code()
            });
            if !requested {
                tracing::warn!(
                    lang_code = book.lang_code(),
                    book_code = book.book_code(),
                    "book matches no resource request"
                );
            }
        }
    }

    /// Splits into the request and its books partitioned by kind.
    pub fn into_parts(self) -> (DocumentRequest, ResourceBundle) {
        let resources = self.books.into_iter().collect();
        (self.request, resources)
    }
}
