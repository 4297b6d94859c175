use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

use crate::remote::{build_http_client, RemoteApiError};

const SERVICE: &str = "image download";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Downloads a generated image so it can be shown in the output panel.
#[derive(Clone)]
pub struct ImageFetcher {
    http: Client,
}

impl ImageFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, RemoteApiError> {
        Ok(Self {
            http: build_http_client(SERVICE, timeout)?,
        })
    }

    pub fn fetch(&self, url: &str) -> Result<FetchedImage> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|source| RemoteApiError::Transport {
                service: SERVICE,
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteApiError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: String::new(),
            }
            .into());
        }
        let bytes = response
            .bytes()
            .with_context(|| format!("read image body from {url}"))?;
        decode_image(&bytes).with_context(|| format!("decode image from {url}"))
    }
}

pub fn decode_image(bytes: &[u8]) -> Result<FetchedImage> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    Ok(FetchedImage {
        width: img.width(),
        height: img.height(),
        rgba: img.into_raw(),
    })
}
