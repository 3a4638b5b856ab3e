//! Audio briefings through the translate text-to-speech endpoint.
//!
//! The endpoint accepts short utterances only, so text is split into chunks at
//! word boundaries and the returned MP3 frames are concatenated.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, instrument};

use scout_shared::{Result, ScoutError, Settings};

/// Longest utterance the endpoint accepts.
pub const MAX_CHUNK_CHARS: usize = 200;

const PROVIDER: &str = "speech";

pub struct SpeechClient {
    http: Client,
    base_url: String,
    language: String,
}

impl SpeechClient {
    pub fn new(http: Client, base_url: &str, language: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let speech = &settings.config.speech;
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScoutError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(http, &speech.base_url, &speech.language))
    }

    /// Speak Markdown `text`, returning MP3 bytes.
    #[instrument(skip_all, fields(chars = text.len()))]
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let spoken = speech_text(text);
        let chunks = chunk_text(&spoken, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(ScoutError::validation("no speakable text"));
        }

        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let response = self
                .http
                .get(format!("{}/translate_tts", self.base_url))
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", self.language.as_str()),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await
                .map_err(|e| ScoutError::Network(format!("{PROVIDER}: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ScoutError::provider(PROVIDER, format!("status {status}")));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| ScoutError::Network(format!("{PROVIDER}: {e}")))?;
            debug!(idx = %idx, bytes = bytes.len(), "chunk synthesized");
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }

    /// Speak `text` and write the MP3 to `path`, replacing any previous file.
    /// Returns the audio that was written.
    pub async fn write_briefing(&self, text: &str, path: &Path) -> Result<Vec<u8>> {
        let audio = self.synthesize(text).await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ScoutError::io(parent, e))?;
        }
        tokio::fs::write(path, &audio)
            .await
            .map_err(|e| ScoutError::io(path, e))?;
        info!(path = %path.display(), bytes = audio.len(), "audio briefing written");
        Ok(audio)
    }
}

/// Reduce report Markdown to plain sentences.
pub fn speech_text(markdown: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid regex"));
    static PREFIX_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(?:#{1,6}|>|[*-])(?:\s+|$)").expect("valid regex"));

    markdown
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let line = PREFIX_RE.replace(line, "");
            let line = LINK_RE.replace_all(&line, "$1");
            let line: String = line
                .chars()
                .filter(|c| !matches!(c, '*' | '#' | '[' | ']' | '_' | '`'))
                .filter(|c| {
                    c.is_alphanumeric()
                        || c.is_whitespace()
                        || c.is_ascii_punctuation()
                        || matches!(c, '’' | '“' | '”' | '–')
                })
                .collect();
            line.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pack words into chunks of at most `max_chars` characters.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
