//! Thin asynchronous client for the Hypixel Skyblock bazaar endpoint.
//!
//! - Downloads the raw bazaar document and stores it verbatim on disk.
//! - Parses stored documents into a domain `PriceSnapshot`.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{PriceSnapshot, QuickPrice};
use crate::infra::cache::write_snapshot_bytes;
use crate::util::version::user_agent;

pub const DEFAULT_BAZAAR_URL: &str = "https://api.hypixel.net/v2/skyblock/bazaar";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no price snapshot at {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to access price snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse price snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("bazaar reported an unsuccessful response")]
    Rejected,
    #[error("product {product} has invalid {field} {value}")]
    InvalidPrice {
        product: String,
        field: &'static str,
        value: f64,
    },
}

/// Anything that can refresh the snapshot file at `path`.
#[allow(async_fn_in_trait)]
pub trait SnapshotSource {
    async fn download(&self, path: &Path) -> Result<(), SnapshotError>;
}

#[derive(Clone)]
pub struct BazaarClient {
    http: Client,
    url: Url,
}

impl BazaarClient {
    pub fn with_url(url: &str, timeout: Duration) -> Result<Self, SnapshotError> {
        let url = Url::parse(url)?;
        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self { http, url })
    }

    /// Fetches the current bazaar document without touching the disk.
    pub async fn fetch_raw(&self) -> Result<Vec<u8>, SnapshotError> {
        debug!("Requesting bazaar prices from {}", self.url);
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;

        let envelope: Envelope = serde_json::from_slice(&bytes)?;
        if !envelope.success {
            return Err(SnapshotError::Rejected);
        }
        Ok(bytes.to_vec())
    }
}

impl SnapshotSource for BazaarClient {
    async fn download(&self, path: &Path) -> Result<(), SnapshotError> {
        let raw = self.fetch_raw().await?;
        write_snapshot_bytes(path, &raw)?;
        info!("Bazaar prices downloaded and saved to {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct BazaarDocument {
    success: bool,
    #[serde(rename = "lastUpdated")]
    last_updated: i64,
    #[serde(default)]
    products: HashMap<String, ProductDto>,
}

#[derive(Debug, Deserialize)]
struct ProductDto {
    #[serde(default)]
    product_id: Option<String>,
    quick_status: QuickStatusDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuickStatusDto {
    buy_price: f64,
    sell_price: f64,
}

/// Parses a stored bazaar document.
pub fn parse_snapshot(raw: &[u8]) -> Result<PriceSnapshot, SnapshotError> {
    let document: BazaarDocument = serde_json::from_slice(raw)?;
    if !document.success {
        return Err(SnapshotError::Rejected);
    }

    let mut prices = HashMap::with_capacity(document.products.len());
    for (key, product) in document.products {
        if let Some(id) = product.product_id.as_deref().filter(|id| *id != key) {
            debug!("product key {key} differs from product_id {id}, using key");
        }
        let QuickStatusDto {
            buy_price,
            sell_price,
        } = product.quick_status;
        check_price(&key, "buyPrice", buy_price)?;
        check_price(&key, "sellPrice", sell_price)?;
        prices.insert(key, QuickPrice::new(buy_price, sell_price));
    }

    Ok(PriceSnapshot::new(
        timestamp_from_millis(document.last_updated),
        prices,
    ))
}

fn check_price(product: &str, field: &'static str, value: f64) -> Result<(), SnapshotError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SnapshotError::InvalidPrice {
            product: product.to_string(),
            field,
            value,
        })
    }
}

fn timestamp_from_millis(millis: i64) -> SystemTime {
    u64::try_from(millis)
        .map(|ms| SystemTime::UNIX_EPOCH + Duration::from_millis(ms))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
