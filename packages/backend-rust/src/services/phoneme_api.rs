use std::time::Duration;

use reqwest::StatusCode;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum PhonemeApiError {
    #[error("no practice word for letter {0}")]
    NotFound(String),
    #[error("phoneme service returned {0}")]
    Upstream(StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Client for the external phoneme service's practice-word lookup.
#[derive(Debug, Clone)]
pub struct PhonemeApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PhonemeApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/test/{letter}`; the body is passed through untouched.
    pub async fn practice_word(&self, letter: &str) -> Result<serde_json::Value, PhonemeApiError> {
        let url = format!("{}/test/{}", self.base_url, urlencoding::encode(letter));
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(PhonemeApiError::NotFound(letter.to_string())),
            status if !status.is_success() => Err(PhonemeApiError::Upstream(status)),
            _ => Ok(response.json().await?),
        }
    }
}
