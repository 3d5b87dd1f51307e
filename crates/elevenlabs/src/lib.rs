use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use mediabatch_core::{SynthesisBackend, SynthesisOutcome, VoiceSettings};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_MODEL_ID: &str = "eleven_monolingual_v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_ERROR_BODY: usize = 512;

/// Blocking client for the ElevenLabs text-to-speech endpoint.
#[derive(Clone)]
pub struct ElevenLabsClient {
    http: Client,
    api_key: String,
    base_url: String,
    model_id: String,
    voice_settings: Option<VoiceSettings>,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_settings: Option<&'a VoiceSettings>,
}

impl ElevenLabsClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model_id: DEFAULT_MODEL_ID.to_string(),
            voice_settings: None,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_voice_settings(mut self, settings: Option<VoiceSettings>) -> Self {
        self.voice_settings = settings;
        self
    }

    pub fn speech_url(&self, voice_id: &str) -> String {
        format!(
            "{}/text-to-speech/{}",
            self.base_url.trim_end_matches('/'),
            voice_id
        )
    }

    fn speech_request<'a>(&'a self, text: &'a str) -> SpeechRequest<'a> {
        SpeechRequest {
            text,
            model_id: &self.model_id,
            voice_settings: self.voice_settings.as_ref(),
        }
    }
}

impl SynthesisBackend for ElevenLabsClient {
    fn synthesize(&self, text: &str, voice_id: &str) -> SynthesisOutcome {
        let url = self.speech_url(voice_id);
        debug!(%url, model = %self.model_id, "requesting speech");
        let response = match self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "audio/mpeg")
            .json(&self.speech_request(text))
            .send()
        {
            Ok(resp) => resp,
            Err(err) => {
                warn!(error = %err, "elevenlabs request failed");
                return SynthesisOutcome::Rejected(format!("request failed: {err}"));
            }
        };
        let status = response.status();
        debug!(%status, "elevenlabs responded");
        match response.bytes() {
            Ok(body) => classify_response(status, &body),
            Err(err) => SynthesisOutcome::Rejected(format!(
                "failed to read response body (status {status}): {err}"
            )),
        }
    }
}

/// Maps an HTTP reply onto the closed set of synthesis outcomes.
pub fn classify_response(status: StatusCode, body: &[u8]) -> SynthesisOutcome {
    if status.is_success() {
        return SynthesisOutcome::Success(body.to_vec());
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return SynthesisOutcome::RateLimited;
    }
    let text = String::from_utf8_lossy(body);
    let text: String = text.trim().chars().take(MAX_ERROR_BODY).collect();
    SynthesisOutcome::Rejected(format!("status {}: {}", status.as_u16(), text))
}
