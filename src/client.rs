use crate::error::BingError;
use crate::models::{MetadataResponse, parse_metadata};
use log::{debug, info};
use reqwest::header::ACCEPT;
use reqwest::{Client as HttpClient, Response, StatusCode};
use std::time::Duration;
use url::Url;

pub const BASE_URL: &str = "https://www.bing.com";
pub const DEFAULT_MARKET: &str = "en-CA";
/// Number of metadata entries requested; 8 is the endpoint's maximum.
const IMAGE_COUNT: u8 = 8;
const JSON_MIME: &str = "application/json";

pub const IMAGE_MIME_TYPES: [&str; 9] = [
    "image/apng",
    "image/bmp",
    "image/gif",
    "image/x-icon",
    "image/jpeg",
    "image/png",
    "image/svg+xml",
    "image/tiff",
    "image/webp",
];

/// Where the downloader gets metadata and image bytes from.
pub trait ImageSource {
    /// Host that relative image URLs from the metadata are appended to.
    fn base_url(&self) -> &str;

    fn fetch_metadata(&self) -> impl Future<Output = Result<MetadataResponse, BingError>>;

    fn fetch_image(&self, url: &Url) -> impl Future<Output = Result<Vec<u8>, BingError>>;
}

#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    base_url: String,
    market: String,
}

impl Client {
    /// Create a new client with the default base URL and market.
    pub fn new() -> Result<Self, BingError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        info!("Initialized Bing image client with default base URL");
        Ok(Self::with_http_client(http))
    }

    /// Create a client around an already configured reqwest client.
    pub fn with_http_client(http: HttpClient) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
            market: DEFAULT_MARKET.to_string(),
        }
    }

    /// Override the base URL (useful for tests or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        info!("Updated Bing base URL to {}", self.base_url);
        self
    }

    /// Override the market the archive is queried for.
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    pub fn metadata_url(&self) -> String {
        format!(
            "{}/HPImageArchive.aspx?format=js&idx=0&n={}&mkt={}",
            self.base_url, IMAGE_COUNT, self.market
        )
    }

    async fn get(&self, url: &str, accept: &str) -> Result<Response, BingError> {
        debug!("GET request to {}", url);
        let response = self.http.get(url).header(ACCEPT, accept).send().await?;
        debug!("Received status {}", response.status());
        handle_status(response.status())?;
        Ok(response)
    }
}

impl ImageSource for Client {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_metadata(&self) -> Result<MetadataResponse, BingError> {
        let url = self.metadata_url();
        let body = self.get(&url, JSON_MIME).await?.text().await?;
        parse_metadata(&body)
    }

    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, BingError> {
        let bytes = self
            .get(url.as_str(), &image_accept_header())
            .await?
            .bytes()
            .await?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

fn image_accept_header() -> String {
    IMAGE_MIME_TYPES.join(", ")
}

fn handle_status(status: StatusCode) -> Result<(), BingError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(BingError::Status(status))
    }
}
