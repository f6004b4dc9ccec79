use super::{FeedSource, HeaderProbe};
use crate::error::FeedError;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::LAST_MODIFIED;
use reqwest::Client;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = concat!("tweed/", env!("CARGO_PKG_VERSION"));

/// `reqwest`-backed implementation of [`FeedSource`] and [`HeaderProbe`].
///
/// No timeout, retry or backoff is configured.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, FeedError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

impl FeedSource for HttpClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }
        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Fetched feed");
        Ok(bytes.to_vec())
    }
}

impl HeaderProbe for HttpClient {
    /// Issues a GET and reads only the response headers.
    #[instrument(level = "debug", skip(self))]
    async fn last_modified(&self, url: &str) -> Option<DateTime<Utc>> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Header lookup failed");
                return None;
            }
        };
        let raw = response.headers().get(LAST_MODIFIED)?.to_str().ok()?;
        let parsed = parse_http_date(raw);
        if parsed.is_none() {
            debug!(raw, "Unparsable Last-Modified header");
        }
        parsed
    }
}

/// Parse an HTTP date in any of the three forms servers send.
pub fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // RFC 850 and asctime
    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
