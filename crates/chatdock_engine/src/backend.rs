use std::time::Duration;

use chatdock_core::{AudioClip, WidgetConfig};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

use crate::wire::{AudioResponse, HistoryResponse, SendRequest, SendResponse};
use crate::{FailureKind, TransportError};

const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_key: String,
    pub voice: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            api_key: String::new(),
            voice: "alloy".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(60),
        }
    }
}

impl BackendSettings {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            base_url: config.backend_url.clone(),
            api_key: config.api_key.clone(),
            voice: config.voice.clone(),
            ..Self::default()
        }
    }
}

/// The three chat endpoints the widget consumes.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, message: &str, page_url: &str) -> Result<SendResponse, TransportError>;

    async fn history(&self) -> Result<HistoryResponse, TransportError>;

    async fn upload_audio(
        &self,
        clip: &AudioClip,
        page_url: &str,
    ) -> Result<AudioResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        let base = self.settings.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn read_json<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| TransportError::new(FailureKind::MalformedPayload, err.to_string()))
    }
}

#[async_trait::async_trait]
impl ChatBackend for ReqwestBackend {
    async fn send(&self, message: &str, page_url: &str) -> Result<SendResponse, TransportError> {
        let url = self.endpoint("/chat/send")?;
        let request = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.settings.api_key)
            .json(&SendRequest {
                message,
                link: page_url,
            });
        Self::read_json(request).await
    }

    async fn history(&self) -> Result<HistoryResponse, TransportError> {
        let url = self.endpoint("/chat/history")?;
        let request = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.settings.api_key);
        Self::read_json(request).await
    }

    async fn upload_audio(
        &self,
        clip: &AudioClip,
        page_url: &str,
    ) -> Result<AudioResponse, TransportError> {
        let mut url = self.endpoint("/chat/audio")?;
        url.query_pairs_mut()
            .append_pair("tts", "true")
            .append_pair("voice", &self.settings.voice);

        let part = Part::bytes(clip.bytes.clone())
            .file_name(clip_file_name(&clip.mime))
            .mime_str(&clip.mime)
            .map_err(|err| TransportError::new(FailureKind::MalformedPayload, err.to_string()))?;
        let form = Form::new()
            .part("audio", part)
            .text("link", page_url.to_string());

        let request = self
            .client
            .post(url)
            .timeout(self.settings.upload_timeout)
            .header(API_KEY_HEADER, &self.settings.api_key)
            .multipart(form);
        Self::read_json(request).await
    }
}

fn clip_file_name(mime: &str) -> String {
    let subtype = mime
        .split(';')
        .next()
        .and_then(|essence| essence.split('/').nth(1))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("bin");
    format!("voice.{subtype}")
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return TransportError::new(FailureKind::MalformedPayload, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}
