//! Product Integrations
//!
//! Catalog tags (`isbn:...`, `asin:...`) name products whose attributes live
//! in an external service:
//! - `ProductLookup`: the black-box `code -> attributes` call
//! - `HttpProductLookup`: JSON-over-HTTP implementation
//! - `ProductCatalog`: cache-first lookups and the bulk pass over the tag index

mod catalog;
mod http;

pub use catalog::{render_product, CatalogReport, CatalogSettings, ProductCatalog};
pub use http::HttpProductLookup;

use crate::storage::ProductRecord;
use async_trait::async_trait;

/// Tag schemes whose codes can be looked up
pub const PRODUCT_SCHEMES: &[&str] = &["isbn", "asin"];

/// Common trait for product lookups
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Attributes for a code. Every failure yields an empty record.
    async fn lookup(&self, code: &str) -> ProductRecord;
}

/// How a catalog code is resolved upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Asin,
    Isbn,
}

impl CodeKind {
    /// Ten uppercase alphanumerics is an ASIN; anything else is searched as a book code
    pub fn of(code: &str) -> Self {
        if code.len() == 10 && code.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()) {
            CodeKind::Asin
        } else {
            CodeKind::Isbn
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeKind::Asin => "asin",
            CodeKind::Isbn => "isbn",
        }
    }
}

/// Code part of a product tag, `None` for other tags
pub fn product_code(tag: &str) -> Option<&str> {
    let (scheme, rest) = tag.split_once(':')?;
    if !PRODUCT_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
        return None;
    }
    let code = rest.split(':').next().unwrap_or("");
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Errors that can occur during integration operations
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("Product lookup is disabled (set products.endpoint or HATEDMA_PRODUCT_ENDPOINT)")]
    Disabled,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}
