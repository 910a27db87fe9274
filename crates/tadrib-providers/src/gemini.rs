//! Gemini (Generative Language API) assistant implementation.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use tadrib_core::model::Locale;
use tadrib_core::traits::{
    parse_quiz, AiAssistant, ChatRequest, EvaluationRequest, QuizQuestion, QuizRequest,
    SpeechAudio, SpeechRequest, QUIZ_OPTION_COUNT,
};

use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_QUIZ_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_EVAL_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_TTS_VOICE: &str = "Kore";

/// Models used for each kind of request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiModels {
    pub quiz: String,
    pub evaluation: String,
    pub speech: String,
    pub voice: String,
}

impl Default for GeminiModels {
    fn default() -> Self {
        Self {
            quiz: DEFAULT_QUIZ_MODEL.to_string(),
            evaluation: DEFAULT_EVAL_MODEL.to_string(),
            speech: DEFAULT_TTS_MODEL.to_string(),
            voice: DEFAULT_TTS_VOICE.to_string(),
        }
    }
}

/// Gemini assistant.
pub struct GeminiAssistant {
    api_key: String,
    base_url: String,
    models: GeminiModels,
    client: reqwest::Client,
}

impl GeminiAssistant {
    pub fn new(api_key: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            models: GeminiModels::default(),
            client,
        })
    }

    pub fn with_models(mut self, models: GeminiModels) -> Self {
        self.models = models;
        self
    }

    pub fn models(&self) -> &GeminiModels {
        &self.models
    }

    /// Send one `generateContent` call and return the first candidate's parts.
    async fn generate(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<Vec<Part>, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::AuthenticationFailed(
                "no Gemini API key configured".to_string(),
            ));
        }

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{model}:generateContent",
                self.base_url
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(error_message(body)));
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(model.to_string()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: error_message(body),
            });
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("failed to parse response: {e}")))?;

        api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .filter(|parts| !parts.is_empty())
            .ok_or_else(|| ProviderError::MalformedResponse("no candidates returned".to_string()))
    }

    async fn generate_text(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<String, ProviderError> {
        let parts = self.generate(model, body).await?;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            return Err(ProviderError::MalformedResponse(
                "reply contained no text".to_string(),
            ));
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

fn error_message(body: String) -> String {
    serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

fn quiz_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                "correctAnswer": { "type": "STRING" }
            },
            "required": ["question", "options", "correctAnswer"]
        }
    })
}

fn quiz_prompt(request: &QuizRequest) -> String {
    match request.locale {
        Locale::Fr => format!(
            "À partir du texte suivant, génère {count} questions à choix multiples en français. \
             Chaque question doit avoir exactement {QUIZ_OPTION_COUNT} options et une seule \
             bonne réponse, recopiée à l'identique dans \"correctAnswer\".\n\nTexte :\n{text}",
            count = request.count,
            text = request.reference,
        ),
        Locale::Ar => format!(
            "اعتمادًا على النص التالي، أنشئ {count} أسئلة اختيار من متعدد باللغة العربية. \
             يجب أن يحتوي كل سؤال على {QUIZ_OPTION_COUNT} خيارات بالضبط وإجابة صحيحة واحدة \
             تُنسخ حرفيًا في \"correctAnswer\".\n\nالنص:\n{text}",
            count = request.count,
            text = request.reference,
        ),
    }
}

fn evaluation_prompt(request: &EvaluationRequest) -> String {
    match request.locale {
        Locale::Fr => format!(
            "Tu es un formateur bienveillant. Évalue la réponse du stagiaire à la question, \
             en t'appuyant sur le texte. Indique si elle est correcte, ce qui manque, et donne \
             un conseil bref.\n\nTexte :\n{}\n\nQuestion : {}\n\nRéponse du stagiaire : {}",
            request.passage, request.question, request.answer,
        ),
        Locale::Ar => format!(
            "أنت مدرب متعاون. قيّم إجابة المتدرب عن السؤال بالاعتماد على النص. \
             بيّن إن كانت صحيحة وما ينقصها وقدّم نصيحة قصيرة.\n\nالنص:\n{}\n\nالسؤال: {}\n\nإجابة المتدرب: {}",
            request.passage, request.question, request.answer,
        ),
    }
}

// ---------------------------------------------------------------------------
// AiAssistant
// ---------------------------------------------------------------------------

#[async_trait]
impl AiAssistant for GeminiAssistant {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(count = request.count))]
    async fn generate_quiz(&self, request: &QuizRequest) -> anyhow::Result<Vec<QuizQuestion>> {
        let body = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), quiz_prompt(request))],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(quiz_schema()),
                ..Default::default()
            }),
        };

        let text = self.generate_text(&self.models.quiz, &body).await?;
        let questions = parse_quiz(&text)?;
        tracing::debug!(model = %self.models.quiz, questions = questions.len(), "quiz generated");
        Ok(questions)
    }

    #[instrument(skip(self, request))]
    async fn evaluate_answer(&self, request: &EvaluationRequest) -> anyhow::Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), evaluation_prompt(request))],
            system_instruction: None,
            generation_config: None,
        };
        Ok(self.generate_text(&self.models.evaluation, &body).await?)
    }

    #[instrument(skip(self, request), fields(chars = request.text.len()))]
    async fn synthesize_speech(&self, request: &SpeechRequest) -> anyhow::Result<SpeechAudio> {
        let voice = request.voice.as_deref().unwrap_or(&self.models.voice);
        let body = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), request.text.as_str())],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(json!({
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": voice } }
                })),
                ..Default::default()
            }),
        };

        let parts = self.generate(&self.models.speech, &body).await?;
        let inline = parts
            .into_iter()
            .find_map(|p| p.inline_data)
            .ok_or_else(|| ProviderError::MalformedResponse("reply contained no audio".into()))?;
        let data = general_purpose::STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| ProviderError::MalformedResponse(format!("invalid audio payload: {e}")))?;
        tracing::debug!(bytes = data.len(), mime = %inline.mime_type, "speech synthesized");

        Ok(SpeechAudio {
            mime_type: inline.mime_type,
            data,
        })
    }

    #[instrument(skip(self, request), fields(model = %request.model, turns = request.history.len()))]
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<String> {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|turn| {
                let role = if turn.from_assistant { "model" } else { "user" };
                Content::text(Some(role), turn.text.as_str())
            })
            .collect();
        contents.push(Content::text(Some("user"), request.message.as_str()));

        let system_instruction = if request.system_prompt.trim().is_empty() {
            None
        } else {
            Some(Content::text(None, request.system_prompt.as_str()))
        };

        let body = GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: None,
        };
        Ok(self.generate_text(&request.model, &body).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tadrib_core::traits::ChatTurn;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_reply(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    fn assistant(server: &MockServer) -> GeminiAssistant {
        GeminiAssistant::new("test-key", Some(server.uri())).unwrap()
    }

    fn quiz_request() -> QuizRequest {
        QuizRequest {
            reference: "La sécurité au travail commence par l'identification des risques.".into(),
            count: 1,
            locale: Locale::Fr,
        }
    }

    #[tokio::test]
    async fn quiz_is_requested_with_schema_and_parsed() {
        let server = MockServer::start().await;
        let quiz = r#"[{"question":"Par quoi commence la sécurité ?","options":["Les risques","Le café","La pause","Le badge"],"correctAnswer":"Les risques"}]"#;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(quiz)))
            .mount(&server)
            .await;

        let questions = assistant(&server)
            .generate_quiz(&quiz_request())
            .await
            .unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "Les risques");
    }

    #[tokio::test]
    async fn quiz_with_three_options_is_rejected() {
        let server = MockServer::start().await;
        let quiz = r#"[{"question":"Q","options":["a","b","c"],"correctAnswer":"a"}]"#;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(quiz)))
            .mount(&server)
            .await;

        let err = assistant(&server)
            .generate_quiz(&quiz_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected 4 options"));
    }

    #[tokio::test]
    async fn evaluation_returns_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_reply("Bonne réponse, mais incomplète.")),
            )
            .mount(&server)
            .await;

        let request = EvaluationRequest {
            passage: "Texte".into(),
            question: "Question ?".into(),
            answer: "Réponse".into(),
            locale: Locale::Fr,
        };
        let evaluation = assistant(&server).evaluate_answer(&request).await.unwrap();
        assert_eq!(evaluation, "Bonne réponse, mais incomplète.");
    }

    #[tokio::test]
    async fn speech_payload_is_decoded() {
        let server = MockServer::start().await;
        let pcm = vec![0u8, 1, 2, 3, 254, 255];
        let reply = json!({
            "candidates": [{
                "content": { "parts": [{
                    "inlineData": {
                        "mimeType": "audio/L16;codec=pcm;rate=24000",
                        "data": general_purpose::STANDARD.encode(&pcm)
                    }
                }]}
            }]
        });

        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/gemini-2.5-flash-preview-tts:generateContent",
            ))
            .and(body_partial_json(json!({
                "generationConfig": { "responseModalities": ["AUDIO"] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply))
            .mount(&server)
            .await;

        let audio = assistant(&server)
            .synthesize_speech(&SpeechRequest {
                text: "Bonjour".into(),
                voice: None,
            })
            .await
            .unwrap();
        assert_eq!(audio.data, pcm);
        assert!(audio.mime_type.starts_with("audio/L16"));
    }

    #[tokio::test]
    async fn chat_sends_history_and_system_instruction() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "Sois bref." }] },
                "contents": [
                    { "role": "model", "parts": [{ "text": "Bonjour !" }] },
                    { "role": "user", "parts": [{ "text": "Salut" }] }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Que puis-je faire ?")))
            .mount(&server)
            .await;

        let request = ChatRequest {
            model: "gemini-2.5-pro".into(),
            system_prompt: "Sois bref.".into(),
            history: vec![ChatTurn {
                from_assistant: true,
                text: "Bonjour !".into(),
            }],
            message: "Salut".into(),
        };
        let reply = assistant(&server).chat(&request).await.unwrap();
        assert_eq!(reply, "Que puis-je faire ?");
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED" }
            })))
            .mount(&server)
            .await;

        let err = assistant(&server)
            .generate_quiz(&quiz_request())
            .await
            .unwrap_err();
        let provider_err = err.downcast_ref::<ProviderError>().unwrap();
        assert!(matches!(provider_err, ProviderError::AuthenticationFailed(m) if m == "API key not valid"));
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let err = assistant(&server)
            .generate_quiz(&quiz_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(
            err.downcast_ref::<ProviderError>().unwrap().retry_after_ms(),
            Some(7000)
        );
    }

    #[tokio::test]
    async fn unknown_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let models = GeminiModels {
            evaluation: "gemini-0".into(),
            ..Default::default()
        };
        let request = EvaluationRequest {
            passage: "p".into(),
            question: "q".into(),
            answer: "a".into(),
            locale: Locale::Ar,
        };
        let err = assistant(&server)
            .with_models(models)
            .evaluate_answer(&request)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model not found: gemini-0"));
    }

    #[tokio::test]
    async fn empty_candidates_are_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = assistant(&server)
            .generate_quiz(&quiz_request())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start().await;
        let gemini = GeminiAssistant::new("", Some(server.uri())).unwrap();

        let err = gemini.generate_quiz(&quiz_request()).await.unwrap_err();
        assert!(err.to_string().contains("authentication failed"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
