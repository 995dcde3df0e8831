//! lyrics.ovh HTTP client

use super::dto;
use crate::config::LyricsConfig;
use crate::enrichment::domain::EnrichmentError;

/// lyrics.ovh API client
pub struct LyricsClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LyricsClient {
    /// Create a new client
    pub fn new(config: &LyricsConfig) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| EnrichmentError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch lyrics for a track; empty lyrics count as no match
    pub async fn lookup(&self, artist: &str, title: &str) -> Result<String, EnrichmentError> {
        let response = self
            .http_client
            .get(self.lookup_url(artist, title))
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EnrichmentError::NoMatches);
        }
        if !status.is_success() {
            return Err(EnrichmentError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .json::<dto::LyricsResponse>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(EnrichmentError::ApiError(error));
        }

        body.lyrics
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .ok_or(EnrichmentError::NoMatches)
    }

    /// Both segments are percent-encoded; a `/` in a name must not split the path
    fn lookup_url(&self, artist: &str, title: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LyricsClient {
        LyricsClient::new(&LyricsConfig {
            base_url: "https://api.lyrics.test/v1/".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_lookup_url_encodes_segments() {
        assert_eq!(
            client().lookup_url("AC/DC", "Back In Black?"),
            "https://api.lyrics.test/v1/AC%2FDC/Back%20In%20Black%3F"
        );
    }

    #[test]
    fn test_lookup_url_handles_unicode() {
        let url = client().lookup_url("Sigur Rós", "Hoppípolla");
        assert_eq!(
            url,
            "https://api.lyrics.test/v1/Sigur%20R%C3%B3s/Hopp%C3%ADpolla"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = LyricsClient::new(&LyricsConfig {
            base_url: "http://127.0.0.1:9".into(),
        })
        .unwrap();
        let result = client.lookup("Artist", "Title").await;
        assert!(matches!(result, Err(EnrichmentError::Network(_))));
    }
}
