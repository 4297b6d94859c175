pub mod describe;
pub mod error;
pub mod fetch;
pub mod synthesis;

use reqwest::blocking::{Client, Response};
use serde_json::Value;
use std::time::Duration;

use crate::options::GenerationParams;

pub use describe::DescriptionClient;
pub use error::{RemoteApiError, GENERATION_ERROR_MESSAGE};
pub use fetch::{FetchedImage, ImageFetcher};
pub use synthesis::SynthesisClient;

const USER_AGENT: &str = "drawing2ai";
const ERROR_BODY_LIMIT: usize = 512;

/// Turns a sketch into a short text description.
pub trait Describer: Send + Sync {
    fn describe(&self, image: &[u8]) -> Result<String, RemoteApiError>;
}

/// Renders a sketch plus description into an image, returning its URL.
pub trait Synthesizer: Send + Sync {
    fn synthesize(
        &self,
        image_png: &[u8],
        description: &str,
        params: &GenerationParams,
    ) -> Result<String, RemoteApiError>;
}

pub(crate) fn build_http_client(
    service: &'static str,
    timeout: Option<Duration>,
) -> Result<Client, RemoteApiError> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|source| RemoteApiError::Client { service, source })
}

/// Reads a JSON body, mapping non-success statuses and bad JSON to errors.
pub(crate) fn read_json(service: &'static str, response: Response) -> Result<Value, RemoteApiError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|source| RemoteApiError::Transport { service, source })?;
    if !status.is_success() {
        return Err(RemoteApiError::Status {
            service,
            status: status.as_u16(),
            body: truncate(&body, ERROR_BODY_LIMIT),
        });
    }
    serde_json::from_str(&body).map_err(|source| RemoteApiError::Decode { service, source })
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }
}
