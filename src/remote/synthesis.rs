use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::thread;
use std::time::{Duration, Instant};

use crate::canvas::buffer::data_uri;
use crate::options::{ArtStyle, GenerationParams};
use crate::remote::{build_http_client, read_json, RemoteApiError, Synthesizer};
use crate::settings::Settings;

const SERVICE: &str = "replicate";

/// `jagilley/controlnet-scribble`
pub const CONTROLNET_SCRIBBLE_VERSION: &str =
    "435061a1b5a4c1e26740464bf786efdfa9cb3a3ac488595a2de23e143fdb0117";
pub const PROMPT_SUFFIX: &str = "masterpiece, perfection";
pub const ADDED_PROMPT: &str = "best quality, extremely detailed";
pub const NEGATIVE_PROMPT: &str = "longbody, lowres, bad anatomy, bad hands, missing fingers, \
extra digit, fewer digits, cropped, worst quality, low quality";
pub const ETA: u32 = 0;
pub const GUIDANCE_SCALE: u32 = 9;
pub const NUM_SAMPLES: &str = "1";
pub const IMAGE_RESOLUTION: &str = "512";

pub fn build_prompt(description: &str, style: ArtStyle) -> String {
    format!(
        "{} {}, {PROMPT_SUFFIX}",
        description.trim(),
        style.prompt_prefix()
    )
}

/// Model input for one sketch-conditioned generation.
pub fn build_input(image_png: &[u8], description: &str, params: &GenerationParams) -> Value {
    json!({
        "eta": ETA,
        "image": data_uri("image/png", image_png),
        "scale": GUIDANCE_SCALE,
        "prompt": build_prompt(description, params.style),
        "a_prompt": ADDED_PROMPT,
        "n_prompt": NEGATIVE_PROMPT,
        "ddim_steps": params.steps(),
        "num_samples": NUM_SAMPLES,
        "image_resolution": IMAGE_RESOLUTION,
    })
}

/// The model returns `[edge map, generated image]`; the second entry is the result.
pub fn output_image_reference(prediction: &Value) -> Result<String, RemoteApiError> {
    prediction
        .get("output")
        .and_then(Value::as_array)
        .and_then(|items| items.get(1))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or(RemoteApiError::EmptyOutput { service: SERVICE })
}

fn prediction_status(prediction: &Value) -> Result<String, RemoteApiError> {
    prediction
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_ascii_lowercase)
        .ok_or(RemoteApiError::MissingField {
            service: SERVICE,
            field: "status",
        })
}

fn prediction_failure(status: String, prediction: &Value) -> RemoteApiError {
    let detail = prediction
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    RemoteApiError::PredictionFailed {
        service: SERVICE,
        status,
        detail,
    }
}

/// Managed-inference client running the scribble ControlNet model.
pub struct SynthesisClient {
    http: Client,
    api_base: String,
    api_token: String,
    version: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl SynthesisClient {
    pub fn new(
        api_base: impl Into<String>,
        api_token: impl Into<String>,
        version: impl Into<String>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, RemoteApiError> {
        Ok(Self {
            http: build_http_client(SERVICE, request_timeout)?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            version: version.into(),
            poll_interval: Duration::from_secs(1),
            poll_timeout: Duration::from_secs(600),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, RemoteApiError> {
        let token = settings
            .replicate_api_token()
            .ok_or(RemoteApiError::MissingCredential { service: SERVICE })?;
        Ok(Self::new(
            settings.replicate_api_base.clone(),
            token,
            settings.synthesis_version.clone(),
            settings.request_timeout(),
        )?
        .with_polling(settings.poll_interval(), settings.poll_timeout()))
    }

    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_timeout = timeout;
        self
    }

    pub fn predictions_endpoint(&self) -> String {
        format!("{}/predictions", self.api_base)
    }

    fn create_prediction(&self, input: Value) -> Result<Value, RemoteApiError> {
        let endpoint = self.predictions_endpoint();
        let body = json!({ "version": self.version, "input": input });
        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .map_err(|source| RemoteApiError::Transport {
                service: SERVICE,
                source,
            })?;
        read_json(SERVICE, response)
    }

    fn poll_prediction(&self, poll_url: &str) -> Result<Value, RemoteApiError> {
        let started = Instant::now();
        loop {
            let response = self
                .http
                .get(poll_url)
                .bearer_auth(&self.api_token)
                .send()
                .map_err(|source| RemoteApiError::Transport {
                    service: SERVICE,
                    source,
                })?;
            let prediction = read_json(SERVICE, response)?;
            let status = prediction_status(&prediction)?;
            match status.as_str() {
                "succeeded" => return Ok(prediction),
                "failed" | "canceled" => return Err(prediction_failure(status, &prediction)),
                _ => {}
            }
            if started.elapsed() >= self.poll_timeout {
                return Err(RemoteApiError::PollTimeout {
                    service: SERVICE,
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tracing::trace!(%status, "prediction still running");
            thread::sleep(self.poll_interval);
        }
    }

    /// Runs a prediction to completion and returns the final prediction object.
    pub fn run(&self, input: Value) -> Result<Value, RemoteApiError> {
        let prediction = self.create_prediction(input)?;
        let status = prediction_status(&prediction)?;
        match status.as_str() {
            "succeeded" => Ok(prediction),
            "starting" | "processing" => {
                let poll_url = prediction
                    .pointer("/urls/get")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .ok_or(RemoteApiError::MissingField {
                        service: SERVICE,
                        field: "urls.get",
                    })?;
                tracing::debug!(poll_url, "prediction queued, polling");
                self.poll_prediction(poll_url)
            }
            _ => Err(prediction_failure(status, &prediction)),
        }
    }
}

impl Synthesizer for SynthesisClient {
    fn synthesize(
        &self,
        image_png: &[u8],
        description: &str,
        params: &GenerationParams,
    ) -> Result<String, RemoteApiError> {
        tracing::debug!(
            steps = params.steps(),
            style = params.style.label(),
            "requesting synthesis"
        );
        let prediction = self.run(build_input(image_png, description, params))?;
        output_image_reference(&prediction)
    }
}
