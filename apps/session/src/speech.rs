//! Speech synthesis and recognition collaborators.

use crate::error::SpeechError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text-to-speech.
pub trait Synthesizer {
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Speech-to-text.
pub trait Recognizer {
    fn recognize(&self, audio: &[u8]) -> Result<Transcript, SpeechError>;
}

/// What the recognizer heard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    Text(String),
    Unrecognized,
}

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    transcript: Option<String>,
}

/// Speech services reached over HTTP.
///
/// Synthesis posts `{text, voice}` as JSON and receives raw audio bytes. Recognition
/// posts raw WAV audio and receives `{"transcript": ...}`; a null or blank transcript
/// means nothing was recognized.
#[derive(Clone)]
pub struct HttpSpeechClient {
    client: Client,
    tts_url: Option<String>,
    stt_url: Option<String>,
}

impl HttpSpeechClient {
    pub fn new(
        tts_url: Option<String>,
        stt_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SpeechError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            tts_url,
            stt_url,
        })
    }
}

fn check_status(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, SpeechError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let message = resp.text().unwrap_or_default();
    Err(SpeechError::Backend { status, message })
}

impl Synthesizer for HttpSpeechClient {
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SpeechError> {
        let url = self.tts_url.as_deref().ok_or(SpeechError::NotConfigured)?;
        let resp = self
            .client
            .post(url)
            .json(&SynthesizeRequest { text, voice })
            .send()?;
        let bytes = check_status(resp)?.bytes()?;
        Ok(bytes.to_vec())
    }
}

impl Recognizer for HttpSpeechClient {
    fn recognize(&self, audio: &[u8]) -> Result<Transcript, SpeechError> {
        let url = self.stt_url.as_deref().ok_or(SpeechError::NotConfigured)?;
        let resp = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(audio.to_vec())
            .send()?;
        let body: RecognizeResponse = check_status(resp)?.json()?;
        Ok(transcript_from(body.transcript))
    }
}

fn transcript_from(text: Option<String>) -> Transcript {
    match text {
        Some(text) if !text.trim().is_empty() => Transcript::Text(text.trim().to_string()),
        _ => Transcript::Unrecognized,
    }
}

/// Speech collaborator for setups without speech services.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

impl Synthesizer for NoSpeech {
    fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<u8>, SpeechError> {
        Err(SpeechError::NotConfigured)
    }
}

impl Recognizer for NoSpeech {
    fn recognize(&self, _audio: &[u8]) -> Result<Transcript, SpeechError> {
        Err(SpeechError::NotConfigured)
    }
}
