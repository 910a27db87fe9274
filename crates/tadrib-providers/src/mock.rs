//! Mock assistant for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use tadrib_core::traits::{
    parse_quiz, AiAssistant, ChatRequest, EvaluationRequest, QuizQuestion, QuizRequest,
    SpeechAudio, SpeechRequest,
};

/// Last request seen by a [`MockAssistant`].
#[derive(Debug, Clone)]
pub enum MockCall {
    Quiz(QuizRequest),
    Evaluation(EvaluationRequest),
    Speech(SpeechRequest),
    Chat(ChatRequest),
}

/// An assistant that answers from canned responses without network access.
pub struct MockAssistant {
    /// Raw quiz reply, parsed the same way a real reply is.
    quiz_reply: String,
    evaluation_reply: String,
    chat_reply: String,
    /// When set, every call fails with this message.
    failure: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_call: Mutex<Option<MockCall>>,
}

impl Default for MockAssistant {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAssistant {
    /// Create a mock with generic French replies.
    pub fn new() -> Self {
        Self {
            quiz_reply: default_quiz_reply(),
            evaluation_reply: "Réponse correcte dans l'ensemble.".to_string(),
            chat_reply: "Je suis là pour vous aider.".to_string(),
            failure: None,
            call_count: AtomicU32::new(0),
            last_call: Mutex::new(None),
        }
    }

    pub fn with_quiz_reply(mut self, reply: &str) -> Self {
        self.quiz_reply = reply.to_string();
        self
    }

    pub fn with_evaluation_reply(mut self, reply: &str) -> Self {
        self.evaluation_reply = reply.to_string();
        self
    }

    pub fn with_chat_reply(mut self, reply: &str) -> Self {
        self.chat_reply = reply.to_string();
        self
    }

    /// Make every call fail, as an unreachable service would.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    /// Get the number of calls made to this assistant.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this assistant.
    pub fn last_call(&self) -> Option<MockCall> {
        self.last_call
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: MockCall) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_call.lock().unwrap_or_else(PoisonError::into_inner) = Some(call);
        match &self.failure {
            Some(message) => anyhow::bail!("{message}"),
            None => Ok(()),
        }
    }
}

fn default_quiz_reply() -> String {
    serde_json::json!([{
        "question": "Quelle est la première étape ?",
        "options": ["Observer", "Ignorer", "Deviner", "Attendre"],
        "correctAnswer": "Observer"
    }])
    .to_string()
}

#[async_trait]
impl AiAssistant for MockAssistant {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_quiz(&self, request: &QuizRequest) -> anyhow::Result<Vec<QuizQuestion>> {
        self.record(MockCall::Quiz(request.clone()))?;
        let mut questions = parse_quiz(&self.quiz_reply)?;
        questions.truncate(request.count.max(1));
        Ok(questions)
    }

    async fn evaluate_answer(&self, request: &EvaluationRequest) -> anyhow::Result<String> {
        self.record(MockCall::Evaluation(request.clone()))?;
        Ok(self.evaluation_reply.clone())
    }

    async fn synthesize_speech(&self, request: &SpeechRequest) -> anyhow::Result<SpeechAudio> {
        self.record(MockCall::Speech(request.clone()))?;
        // One silent 16-bit sample per input byte.
        Ok(SpeechAudio {
            mime_type: "audio/L16;codec=pcm;rate=24000".to_string(),
            data: vec![0; request.text.len() * 2],
        })
    }

    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<String> {
        self.record(MockCall::Chat(request.clone()))?;
        Ok(self.chat_reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tadrib_core::model::Locale;

    #[tokio::test]
    async fn canned_quiz() {
        let assistant = MockAssistant::new();
        let request = QuizRequest {
            reference: "texte".into(),
            count: 3,
            locale: Locale::Fr,
        };

        let questions = assistant.generate_quiz(&request).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "Observer");
        assert_eq!(assistant.call_count(), 1);
        assert!(matches!(assistant.last_call(), Some(MockCall::Quiz(r)) if r.count == 3));
    }

    #[tokio::test]
    async fn invalid_canned_quiz_is_rejected() {
        let assistant = MockAssistant::new()
            .with_quiz_reply(r#"[{"question":"Q","options":["a"],"correctAnswer":"a"}]"#);
        let request = QuizRequest {
            reference: "texte".into(),
            count: 1,
            locale: Locale::Ar,
        };
        assert!(assistant.generate_quiz(&request).await.is_err());
    }

    #[tokio::test]
    async fn failing_mock_records_call() {
        let assistant = MockAssistant::failing("service unavailable");
        let err = assistant
            .chat(&ChatRequest {
                model: "gemini-2.5-pro".into(),
                system_prompt: String::new(),
                history: vec![],
                message: "Bonjour".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "service unavailable");
        assert_eq!(assistant.call_count(), 1);
    }

    #[tokio::test]
    async fn chat_and_speech_replies() {
        let assistant = MockAssistant::new().with_chat_reply("D'accord.");
        let reply = assistant
            .chat(&ChatRequest {
                model: "m".into(),
                system_prompt: "p".into(),
                history: vec![],
                message: "Salut".into(),
            })
            .await
            .unwrap();
        assert_eq!(reply, "D'accord.");

        let audio = assistant
            .synthesize_speech(&SpeechRequest {
                text: "abc".into(),
                voice: None,
            })
            .await
            .unwrap();
        assert_eq!(audio.data.len(), 6);
        assert_eq!(assistant.call_count(), 2);
    }
}
