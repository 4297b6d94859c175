use thiserror::Error;

/// Message shown to the user for every remote failure, whatever the cause.
pub const GENERATION_ERROR_MESSAGE: &str = "Error in generating image.";

#[derive(Debug, Error)]
pub enum RemoteApiError {
    #[error("{service}: no credential configured")]
    MissingCredential { service: &'static str },
    #[error("{service}: could not build http client: {source}")]
    Client {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service}: request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service}: http status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service}: malformed json response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{service}: response is missing `{field}`")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },
    #[error("{service}: prediction ended with status `{status}`: {detail}")]
    PredictionFailed {
        service: &'static str,
        status: String,
        detail: String,
    },
    #[error("{service}: prediction still running after {waited_secs}s")]
    PollTimeout {
        service: &'static str,
        waited_secs: u64,
    },
    #[error("{service}: output has no image reference")]
    EmptyOutput { service: &'static str },
}

impl RemoteApiError {
    pub fn service(&self) -> &'static str {
        match self {
            RemoteApiError::MissingCredential { service }
            | RemoteApiError::Client { service, .. }
            | RemoteApiError::Transport { service, .. }
            | RemoteApiError::Status { service, .. }
            | RemoteApiError::Decode { service, .. }
            | RemoteApiError::MissingField { service, .. }
            | RemoteApiError::PredictionFailed { service, .. }
            | RemoteApiError::PollTimeout { service, .. }
            | RemoteApiError::EmptyOutput { service } => service,
        }
    }

    /// All variants collapse to the same text in the UI.
    pub fn user_message(&self) -> &'static str {
        GENERATION_ERROR_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_shares_the_user_message() {
        let errors = [
            RemoteApiError::MissingCredential { service: "openai" },
            RemoteApiError::Status {
                service: "replicate",
                status: 401,
                body: "unauthorized".into(),
            },
            RemoteApiError::EmptyOutput {
                service: "replicate",
            },
        ];
        for err in errors {
            assert_eq!(err.user_message(), GENERATION_ERROR_MESSAGE);
        }
    }

    #[test]
    fn display_names_the_service() {
        let err = RemoteApiError::MissingField {
            service: "openai",
            field: "choices[0].message.content",
        };
        assert_eq!(err.service(), "openai");
        assert_eq!(
            err.to_string(),
            "openai: response is missing `choices[0].message.content`"
        );
    }
}
