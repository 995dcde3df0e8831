//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::{adapter, dto};
use crate::config::MusicBrainzConfig;
use crate::enrichment::domain::{EnrichmentError, EnrichmentResult};

/// Minimum spacing between two requests to the service
const REQUEST_INTERVAL: Duration = Duration::from_millis(1100);

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl MusicBrainzClient {
    /// Create a new client
    pub fn new(config: &MusicBrainzConfig) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .gzip(true)
            .build()
            .map_err(|e| EnrichmentError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            interval: REQUEST_INTERVAL,
            last_request: Mutex::new(None),
        })
    }

    /// Search by artist + title, then look up the best hit for full details
    pub async fn find_recording(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<EnrichmentResult, EnrichmentError> {
        let search: dto::SearchResponse = self.get_json(&self.search_url(artist, title)).await?;
        let Some(hit) = search.recordings.into_iter().next() else {
            return Err(EnrichmentError::NoMatches);
        };

        tracing::debug!("MusicBrainz hit {} (score {:?})", hit.id, hit.score);
        let detail: dto::RecordingResponse = self.get_json(&self.lookup_url(&hit.id)).await?;
        Ok(adapter::to_enrichment(detail, artist, title))
    }

    fn search_url(&self, artist: &str, title: &str) -> String {
        let query = format!(
            "artist:\"{}\" AND recording:\"{}\"",
            escape_phrase(artist),
            escape_phrase(title)
        );
        format!(
            "{}/recording?query={}&fmt=json&limit=1",
            self.base_url,
            urlencoding::encode(&query)
        )
    }

    fn lookup_url(&self, recording_id: &str) -> String {
        // `inc` must keep its literal `+` separators
        format!(
            "{}/recording/{}?fmt=json&inc=artists+releases+tags",
            self.base_url,
            urlencoding::encode(recording_id)
        )
    }

    /// Wait until the rate limit allows another request
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Send a GET request and parse the JSON response
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, EnrichmentError> {
        self.throttle().await;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EnrichmentError::NoMatches);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(EnrichmentError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(EnrichmentError::ApiError(error.error));
            }
            return Err(EnrichmentError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }
}

/// Escape characters that would end or break a Lucene phrase query
fn escape_phrase(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> MusicBrainzClient {
        MusicBrainzClient::new(&MusicBrainzConfig {
            user_agent: "Test/1.0".into(),
            base_url: base.into(),
        })
        .unwrap()
    }

    #[test]
    fn test_client_creation_trims_base() {
        let client = client("https://musicbrainz.org/ws/2/");
        assert_eq!(client.base_url, "https://musicbrainz.org/ws/2");
    }

    #[test]
    fn test_search_url_encodes_reserved_characters() {
        let client = client("https://mb.test/ws/2");
        let url = client.search_url("AC/DC", "What's Next to the Moon?");
        assert!(url.starts_with("https://mb.test/ws/2/recording?query="));
        assert!(url.ends_with("&fmt=json&limit=1"));
        assert!(url.contains("AC%2FDC"));
        assert!(url.contains("Moon%3F"));
        assert!(!url.contains(' '));
        // Only the three parameters; nothing from the values leaks into the query string
        assert_eq!(url.matches('&').count(), 2);
    }

    #[test]
    fn test_search_url_escapes_quotes() {
        let client = client("https://mb.test/ws/2");
        let url = client.search_url("The \"Band\"", "Song & Dance");
        let query = url
            .split("query=")
            .nth(1)
            .and_then(|q| q.split('&').next())
            .unwrap();
        let decoded = urlencoding::decode(query).unwrap();
        assert_eq!(
            decoded,
            "artist:\"The \\\"Band\\\"\" AND recording:\"Song & Dance\""
        );
    }

    #[test]
    fn test_lookup_url_keeps_literal_plus() {
        let client = client("https://mb.test/ws/2");
        assert_eq!(
            client.lookup_url("rec-1"),
            "https://mb.test/ws/2/recording/rec-1?fmt=json&inc=artists+releases+tags"
        );
    }

    #[test]
    fn test_escape_phrase() {
        assert_eq!(escape_phrase(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_phrase("plain"), "plain");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = client("http://127.0.0.1:9");
        let result = client.find_recording("Artist", "Title").await;
        assert!(matches!(result, Err(EnrichmentError::Network(_))));
    }
}
