//! Summarization strategies
//!
//! Maps raw paper text to a structured Markdown summary with the sections
//! Objective, Methodology, Key Findings and Contribution.
//!
//! - `DemoSummarizer`: local and deterministic, built from sentence splitting
//! - `LiveSummarizer`: OpenAI-compatible chat completions endpoint
//!
//! The strategy is chosen once at startup by [`create_summarizer`].

use crate::config::SummarizerConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

pub use crate::config::SummaryMode;

/// Returned by the demo strategy for empty input
pub const NO_TEXT_SENTINEL: &str = "No text provided.";

/// Marker line at the top of every demo summary
pub const DEMO_MARKER: &str = "[DEMO MODE]";

const NOT_STATED: &str = "Not stated in the provided text.";
const MAX_FINDINGS: usize = 3;

/// Text in, structured summary out
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text`. Non-empty input yields a non-empty summary.
    async fn summarize(&self, text: &str) -> Result<String>;

    /// Which strategy this is
    fn mode(&self) -> SummaryMode;
}

/// Offline summarizer used in demo mode
#[derive(Debug, Default, Clone)]
pub struct DemoSummarizer;

impl DemoSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous form of [`Summarizer::summarize`]
    pub fn summarize_text(&self, text: &str) -> String {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return NO_TEXT_SENTINEL.to_string();
        }

        let n = sentences.len();
        let objective = sentences[0].as_str();
        let methodology = sentences.get(1).map(String::as_str).unwrap_or(NOT_STATED);
        let contribution = if n >= 3 { sentences[n - 1].as_str() } else { NOT_STATED };
        let findings: Vec<&str> = if n >= 4 {
            sentences[2..n - 1]
                .iter()
                .take(MAX_FINDINGS)
                .map(String::as_str)
                .collect()
        } else {
            Vec::new()
        };

        let mut out = String::new();
        out.push_str(DEMO_MARKER);
        out.push_str("\n\n");
        out.push_str(&format!("**Objective:** {}\n", objective));
        out.push_str(&format!("**Methodology:** {}\n", methodology));
        out.push_str("**Key Findings:**\n");
        if findings.is_empty() {
            out.push_str(&format!("* {}\n", NOT_STATED));
        }
        for finding in findings {
            out.push_str(&format!("* {}\n", finding));
        }
        out.push_str(&format!("**Contribution:** {}", contribution));
        out
    }
}

#[async_trait]
impl Summarizer for DemoSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let start = Instant::now();
        let summary = self.summarize_text(text);
        metrics::record_summarization(start.elapsed().as_secs_f64(), "demo", true);
        Ok(summary)
    }

    fn mode(&self) -> SummaryMode {
        SummaryMode::Demo
    }
}

/// Split text into sentences on `.`, `!` or `?` followed by whitespace.
/// Whitespace inside sentences is collapsed.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = normalized.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        let at_boundary = matches!(ch, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Summarizer backed by an external chat completions service
pub struct LiveSummarizer {
    config: SummarizerConfig,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

impl LiveSummarizer {
    /// Create a new live summarizer.
    ///
    /// A missing API key fails here, at startup, as a credentials error.
    pub fn new(config: SummarizerConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::GenerationCredentials {
                message: "summarizer.api_key is required in live mode".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { config, api_key, client })
    }

    /// Build the structured summary prompt
    pub fn build_prompt(&self, text: &str) -> String {
        let text: String = text.chars().take(self.config.max_input_chars).collect();
        format!(
            "Analyze the following research text and provide a structured breakdown.\n\
            Use this exact Markdown format:\n\n\
            **Objective:** The main goal or question of the study.\n\
            **Methodology:** The methods, techniques, or approach used by the researchers.\n\
            **Key Findings:** A list of the most important results or conclusions.\n\
            **Contribution:** What is new, unique, or significant about this paper's contribution to the field.\n\n\
            ---\n\
            Text to analyze:\n\
            {}",
            text
        )
    }

    async fn call_llm(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a research assistant that writes structured paper summaries."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: 0.3,
        };

        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Generation {
                message: format!("Request failed: {}", e),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GenerationCredentials {
                message: format!("API error {}: {}", status, body),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation {
                message: format!("API error {}: {}", status, body),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| AppError::Generation {
            message: format!("Failed to parse response: {}", e),
        })?;

        extract_completion(chat_response)
    }
}

fn extract_completion(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(AppError::EmptyGeneration)
}

#[async_trait]
impl Summarizer for LiveSummarizer {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(AppError::Validation {
                message: "Cannot summarize empty text".to_string(),
                field: Some("text".to_string()),
            });
        }

        let start = Instant::now();
        let prompt = self.build_prompt(text);
        let result = self.call_llm(&prompt).await;

        metrics::record_summarization(start.elapsed().as_secs_f64(), "live", result.is_ok());
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, ok = result.is_ok(), "Summary generated");
        result
    }

    fn mode(&self) -> SummaryMode {
        SummaryMode::Live
    }
}

/// Create the summarizer selected by configuration
pub fn create_summarizer(config: &SummarizerConfig) -> Result<Arc<dyn Summarizer>> {
    match config.mode {
        SummaryMode::Demo => Ok(Arc::new(DemoSummarizer::new())),
        SummaryMode::Live => Ok(Arc::new(LiveSummarizer::new(config.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("We study X.  It works!\nDoes it scale? Yes. v1.2 is out");
        assert_eq!(
            sentences,
            vec!["We study X.", "It works!", "Does it scale?", "Yes.", "v1.2 is out"]
        );
    }

    #[tokio::test]
    async fn test_demo_empty_input_returns_sentinel() {
        let summarizer = DemoSummarizer::new();
        assert_eq!(summarizer.summarize("").await.unwrap(), NO_TEXT_SENTINEL);
        assert_eq!(summarizer.summarize("   \n\t").await.unwrap(), NO_TEXT_SENTINEL);
    }

    #[tokio::test]
    async fn test_demo_sections() {
        let text = "We propose a contrastive objective. We train on ImageNet. \
                    Accuracy improves by 3 points. Training is twice as fast. \
                    Our method sets a new baseline.";
        let summary = DemoSummarizer::new().summarize(text).await.unwrap();

        assert!(summary.starts_with(DEMO_MARKER));
        assert!(summary.contains("**Objective:** We propose a contrastive objective."));
        assert!(summary.contains("**Methodology:** We train on ImageNet."));
        assert!(summary.contains("* Accuracy improves by 3 points."));
        assert!(summary.contains("* Training is twice as fast."));
        assert!(summary.contains("**Contribution:** Our method sets a new baseline."));
    }

    #[test]
    fn test_demo_is_deterministic_and_short_input() {
        let summarizer = DemoSummarizer::new();
        let a = summarizer.summarize_text("Only one sentence");
        assert_eq!(a, summarizer.summarize_text("Only one sentence"));
        assert!(a.contains("**Objective:** Only one sentence"));
        assert!(a.contains(NOT_STATED));
    }

    #[test]
    fn test_live_requires_key() {
        let config = SummarizerConfig::default();
        assert!(matches!(
            LiveSummarizer::new(config),
            Err(AppError::GenerationCredentials { .. })
        ));
    }

    #[tokio::test]
    async fn test_live_rejects_empty_input_before_calling() {
        let config = SummarizerConfig {
            api_key: Some("sk-test".to_string()),
            api_base: "http://127.0.0.1:9".to_string(),
            ..SummarizerConfig::default()
        };
        let summarizer = LiveSummarizer::new(config).unwrap();
        let err = summarizer.summarize("  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_prompt_truncates_input() {
        let config = SummarizerConfig {
            api_key: Some("sk-test".to_string()),
            max_input_chars: 10,
            ..SummarizerConfig::default()
        };
        let summarizer = LiveSummarizer::new(config).unwrap();
        let prompt = summarizer.build_prompt(&"x".repeat(100));
        assert!(prompt.ends_with(&"x".repeat(10)));
        assert!(!prompt.contains(&"x".repeat(11)));
        assert!(prompt.contains("**Key Findings:**"));
    }

    #[test]
    fn test_extract_completion() {
        let ok: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  **Objective:** x \n"}}]}"#).unwrap();
        assert_eq!(extract_completion(ok).unwrap(), "**Objective:** x");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(extract_completion(empty), Err(AppError::EmptyGeneration)));

        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"   "}}]}"#).unwrap();
        assert!(matches!(extract_completion(blank), Err(AppError::EmptyGeneration)));
    }

    #[test]
    fn test_create_summarizer_by_mode() {
        let config = SummarizerConfig {
            mode: SummaryMode::Demo,
            ..SummarizerConfig::default()
        };
        assert_eq!(create_summarizer(&config).unwrap().mode(), SummaryMode::Demo);
    }
}
