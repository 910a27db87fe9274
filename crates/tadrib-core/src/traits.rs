//! Contract for the external generative-AI collaborator.
//!
//! Implemented by the `tadrib-providers` crate. Every call is a one-shot
//! request/response with no retry policy: a failure is reported to the user,
//! who may trigger the action again.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{ChatMessage, Locale};

/// Number of options every generated question carries.
pub const QUIZ_OPTION_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Assistant trait
// ---------------------------------------------------------------------------

/// Generative-AI backend used for quizzes, grading, speech, and chat.
#[async_trait]
pub trait AiAssistant: Send + Sync {
    /// Human-readable backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate multiple-choice questions from reference material.
    async fn generate_quiz(&self, request: &QuizRequest) -> anyhow::Result<Vec<QuizQuestion>>;

    /// Grade a free-text answer, returning a natural-language evaluation.
    async fn evaluate_answer(&self, request: &EvaluationRequest) -> anyhow::Result<String>;

    /// Synthesize speech for a short text.
    async fn synthesize_speech(&self, request: &SpeechRequest) -> anyhow::Result<SpeechAudio>;

    /// Continue a conversation in a chat channel.
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<String>;
}

/// Request for a generated quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRequest {
    /// Reference text the questions are drawn from.
    pub reference: String,
    /// Number of questions wanted.
    pub count: usize,
    /// Language of the questions.
    pub locale: Locale,
}

/// A generated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Must equal one of `options`.
    pub correct_answer: String,
}

impl QuizQuestion {
    /// Check the shape the UI relies on: four options, one of them correct.
    pub fn validate(&self) -> Result<(), String> {
        if self.options.len() != QUIZ_OPTION_COUNT {
            return Err(format!(
                "expected {QUIZ_OPTION_COUNT} options, got {}",
                self.options.len()
            ));
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(format!(
                "correct answer '{}' is not among the options",
                self.correct_answer
            ));
        }
        Ok(())
    }
}

/// Request to grade a trainee's answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub passage: String,
    pub question: String,
    pub answer: String,
    pub locale: Locale,
}

/// Request for synthesized speech.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    /// Voice name; the backend default when `None`.
    #[serde(default)]
    pub voice: Option<String>,
}

/// Encoded audio ready for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    /// MIME type reported by the backend (e.g. "audio/L16;rate=24000").
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// A chat turn in a given channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model configured on the channel.
    pub model: String,
    /// Channel system prompt in the active locale.
    pub system_prompt: String,
    /// Previous messages, oldest first.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    /// The new user message.
    pub message: String,
}

/// One prior message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub from_assistant: bool,
    pub text: String,
}

impl ChatTurn {
    /// Build conversation turns from stored messages.
    pub fn from_history(messages: &[ChatMessage], assistant_name: &str) -> Vec<ChatTurn> {
        messages
            .iter()
            .map(|m| ChatTurn {
                from_assistant: m.sender == assistant_name,
                text: m.text.clone(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Reply parsing
// ---------------------------------------------------------------------------

/// Extract a JSON payload from a model reply.
///
/// Handles:
/// - ```json fenced blocks (first one wins)
/// - Generic ``` blocks
/// - Raw JSON with no fences (returned trimmed)
pub fn extract_json_block(response: &str) -> &str {
    let mut rest = response;
    let mut generic = None;

    while let Some(start) = rest.find("```") {
        let after = &rest[start + 3..];
        let line_end = after.find('\n').unwrap_or(after.len());
        let lang = after[..line_end].trim().to_lowercase();
        let body = &after[(line_end + 1).min(after.len())..];
        let end = body.find("```").unwrap_or(body.len());
        let block = body[..end].trim();

        if lang == "json" {
            return block;
        }
        if lang.is_empty() && generic.is_none() {
            generic = Some(block);
        }
        rest = &body[(end + 3).min(body.len())..];
    }

    generic.unwrap_or_else(|| response.trim())
}

/// Parse and validate a quiz reply.
pub fn parse_quiz(response: &str) -> anyhow::Result<Vec<QuizQuestion>> {
    let questions: Vec<QuizQuestion> = serde_json::from_str(extract_json_block(response))
        .map_err(|e| anyhow::anyhow!("quiz reply is not valid JSON: {e}"))?;
    for (i, q) in questions.iter().enumerate() {
        q.validate()
            .map_err(|e| anyhow::anyhow!("question {}: {e}", i + 1))?;
    }
    Ok(questions)
}
