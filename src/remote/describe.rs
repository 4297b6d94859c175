use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::canvas::buffer::data_uri;
use crate::remote::{build_http_client, read_json, Describer, RemoteApiError};
use crate::settings::Settings;

const SERVICE: &str = "openai";

/// Instruction sent alongside the sketch. The model must name a concrete
/// subject and never call the input a drawing.
pub const DESCRIBE_INSTRUCTION: &str = "Describe what the object(s) in this drawing look like in a concise manner. \
Only output the object(s), nothing else, no descriptors, just try to see what it is. \
Don't ever say it's a drawing. No punctuation. Concise and comma separated. \
Never say stick figure, always assume a form, like a human, animal, or other object. \
Also add in composition details if applicable.";

/// Vision chat-completions client producing a one-line sketch description.
pub struct DescriptionClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl DescriptionClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        timeout: Option<Duration>,
    ) -> Result<Self, RemoteApiError> {
        Ok(Self {
            http: build_http_client(SERVICE, timeout)?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, RemoteApiError> {
        let api_key = settings
            .openai_api_key()
            .ok_or(RemoteApiError::MissingCredential { service: SERVICE })?;
        Self::new(
            settings.describe_endpoint.clone(),
            api_key,
            settings.describe_model.clone(),
            settings.describe_max_tokens,
            settings.request_timeout(),
        )
    }

    pub fn request_body(&self, image_jpeg: &[u8]) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": DESCRIBE_INSTRUCTION },
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": data_uri("image/jpeg", image_jpeg),
                                "detail": "low"
                            }
                        }
                    ]
                }
            ],
            "max_tokens": self.max_tokens
        })
    }
}

impl Describer for DescriptionClient {
    fn describe(&self, image: &[u8]) -> Result<String, RemoteApiError> {
        tracing::debug!(endpoint = %self.endpoint, bytes = image.len(), "requesting description");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(image))
            .send()
            .map_err(|source| RemoteApiError::Transport {
                service: SERVICE,
                source,
            })?;
        let payload = read_json(SERVICE, response)?;
        extract_description(&payload)
    }
}

/// Pulls `choices[0].message.content` out of a chat-completions response.
pub fn extract_description(payload: &Value) -> Result<String, RemoteApiError> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .ok_or(RemoteApiError::MissingField {
            service: SERVICE,
            field: "choices[0].message.content",
        })
}
