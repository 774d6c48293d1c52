//! reqwest implementation of the Turn Service against the interview backend.

use super::types::{
    EvaluateRequest, EvaluateResponse, MessageRequest, MessageResponse, SessionStart,
    StartRequest, StartResponse, SynthesizeRequest, TranscribeResponse, TurnReply,
};
use super::TurnService;
use crate::audio::AudioClip;
use crate::config::BackendConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::{Profile, SessionId};
use async_trait::async_trait;
use reqwest::multipart;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the interview backend's `/api` routes.
///
/// Synthesis gets its own client because speech generation routinely takes
/// longer than the other calls. No call is retried: at-most-once semantics
/// per user action.
#[derive(Debug, Clone)]
pub struct HttpTurnService {
    base_url: String,
    client: reqwest::Client,
    synthesis_client: reqwest::Client,
}

impl HttpTurnService {
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        synthesis_timeout: Duration,
    ) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let synthesis_client = reqwest::Client::builder()
            .timeout(synthesis_timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let base_url = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            synthesis_client,
        })
    }

    pub fn from_config(cfg: &BackendConfig) -> ClientResult<Self> {
        Self::new(
            &cfg.base_url,
            Duration::from_secs(cfg.request_timeout_secs),
            Duration::from_secs(cfg.synthesis_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn ensure_success(res: reqwest::Response) -> ClientResult<reqwest::Response> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    Err(ClientError::Transport(format!(
        "backend returned {}: {}",
        status, body
    )))
}

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

#[async_trait]
impl TurnService for HttpTurnService {
    async fn start_session(&self, profile: Profile, stack: &str) -> ClientResult<SessionStart> {
        debug!("starting interview: profile={}, stack={}", profile.as_str(), stack);
        let res = self
            .client
            .post(self.url("/api/interview/start"))
            .json(&StartRequest { profile, stack })
            .send()
            .await
            .map_err(transport)?;
        let body: StartResponse = ensure_success(res).await?.json().await.map_err(transport)?;
        Ok(body.into())
    }

    async fn transcribe(&self, session: &SessionId, clip: AudioClip) -> ClientResult<String> {
        debug!("transcribing clip of {} bytes", clip.len());
        let content_type = clip.content_type().to_string();
        let part = multipart::Part::bytes(clip.into_bytes())
            .file_name("recording.wav")
            .mime_str(&content_type)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let form = multipart::Form::new()
            .part("audio", part)
            .text("session_id", session.as_str().to_string());

        let res = self
            .client
            .post(self.url("/api/transcribe"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let body: TranscribeResponse =
            ensure_success(res).await?.json().await.map_err(transport)?;
        Ok(body.transcription)
    }

    async fn advance_turn(
        &self,
        session: &SessionId,
        text: &str,
        is_code: bool,
    ) -> ClientResult<TurnReply> {
        let res = self
            .client
            .post(self.url("/api/interview/message"))
            .json(&MessageRequest {
                session_id: session,
                text,
                is_code,
            })
            .send()
            .await
            .map_err(transport)?;
        let body: MessageResponse = ensure_success(res).await?.json().await.map_err(transport)?;
        Ok(body.into())
    }

    async fn synthesize_speech(&self, session: &SessionId, text: &str) -> ClientResult<AudioClip> {
        let res = self
            .synthesis_client
            .post(self.url("/api/synthesize"))
            .json(&SynthesizeRequest {
                session_id: session,
                text,
            })
            .send()
            .await
            .map_err(transport)?;
        let res = ensure_success(res).await?;
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();
        let bytes = res.bytes().await.map_err(transport)?;
        debug!("synthesized {} bytes of {}", bytes.len(), content_type);
        Ok(AudioClip::new(bytes.to_vec(), content_type))
    }

    async fn evaluate(&self, session: &SessionId) -> ClientResult<String> {
        let res = self
            .client
            .post(self.url("/api/interview/evaluate"))
            .json(&EvaluateRequest {
                session_id: session,
            })
            .send()
            .await
            .map_err(transport)?;
        let body: EvaluateResponse = ensure_success(res).await?.json().await.map_err(transport)?;
        Ok(body.evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let svc = HttpTurnService::new(
            "http://localhost:8000/",
            Duration::from_secs(30),
            Duration::from_secs(60),
        )
        .unwrap();
        assert_eq!(svc.url("/api/transcribe"), "http://localhost:8000/api/transcribe");
    }
}
