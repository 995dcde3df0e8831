//! Last.fm HTTP client
//!
//! Only `track.getInfo` is used. Requires an API key:
//! https://www.last.fm/api/account/create

use super::{adapter, dto};
use crate::config::LastFmConfig;
use crate::enrichment::domain::{EnrichmentError, EnrichmentResult};

/// Last.fm API client
pub struct LastFmClient {
    api_key: String,
    http_client: reqwest::Client,
    base_url: String,
}

impl LastFmClient {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>, config: &LastFmConfig) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| EnrichmentError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    /// Look up album/year/genre/duration for a track
    pub async fn track_info(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<EnrichmentResult, EnrichmentError> {
        let response = self
            .http_client
            .get(self.track_info_url(artist, title))
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichmentError::RateLimited);
        }

        // Last.fm puts error details in the body for both 200 and 4xx replies
        let body = response
            .json::<dto::TrackInfoResponse>()
            .await
            .map_err(|e| {
                if status.is_success() {
                    EnrichmentError::Parse(e.to_string())
                } else {
                    EnrichmentError::Network(format!("HTTP {}", status))
                }
            })?;

        if let Some(code) = body.error {
            // 6 = "Track not found"
            if code == 6 {
                return Err(EnrichmentError::NoMatches);
            }
            return Err(EnrichmentError::ApiError(format!(
                "{} (code {})",
                body.message.unwrap_or_default(),
                code
            )));
        }

        let track = body.track.ok_or(EnrichmentError::NoMatches)?;
        Ok(adapter::to_enrichment(track, artist, title))
    }

    fn track_info_url(&self, artist: &str, title: &str) -> String {
        format!(
            "{}?method=track.getInfo&api_key={}&artist={}&track={}&autocorrect=1&format=json",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(artist),
            urlencoding::encode(title)
        )
    }
}
