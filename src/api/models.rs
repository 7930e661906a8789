use serde::{Deserialize, Serialize};

/// One entry of the `/search` response, in the shape the web front end reads.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub summary: String,
    pub link: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
