//! lyrics.ovh Data Transfer Objects
//!
//! Success: `{"lyrics": "..."}`. Failure: `{"error": "No lyrics found"}`,
//! usually with a 404.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LyricsResponse {
    pub lyrics: Option<String>,
    pub error: Option<String>,
}
