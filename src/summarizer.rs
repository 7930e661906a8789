use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{Config, DEFAULT_BATCH_SIZE};
use crate::data_models::{Article, value_text};
use crate::error::SummaryError;

/// Used for every item of a batch whose reply had the wrong number of summaries.
pub const SUMMARY_UNAVAILABLE: &str = "Resumen no disponible";
/// Used for every item of a batch whose call failed outright.
pub const SUMMARY_FAILED: &str = "Resumen no pudo ser generado por la IA.";

const SYSTEM_PROMPT: &str = "A continuación se presentan varios ítems en formato JSON. \
Para cada ítem, genera un resumen objetivo en español de 1 a 2 oraciones. \
No inventes información ni añadas detalles que no estén presentes. \
Devuelve la respuesta como un único objeto JSON que contenga una clave 'resumenes' \
que sea un array de strings. \
Cada string en el array debe ser el resumen de un ítem, \
en el mismo orden en que fueron presentados. \
Asegúrate de que la salida sea solo el objeto JSON, sin texto adicional.";

const TOKENS_PER_ITEM: usize = 150;

/// A service that turns a batch of articles into one summary per article.
///
/// Implementations report what the service returned; they do not check that
/// the count matches the batch. [`BatchSummarizer`] does that.
#[async_trait]
pub trait SummaryModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn summarize_batch(&self, batch: &[Article]) -> Result<Vec<String>, SummaryError>;
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f64,
    max_tokens: usize,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// JSON object the model is told to answer with.
#[derive(Deserialize)]
struct BatchReply {
    #[serde(default)]
    resumenes: Vec<String>,
}

/// Chat-completions client for OpenAI and API-compatible services.
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiModel {
    pub fn new(config: &Config) -> Result<Self, SummaryError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl SummaryModel for OpenAiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn summarize_batch(&self, batch: &[Article]) -> Result<Vec<String>, SummaryError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: batch_prompt(batch),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.2,
            max_tokens: batch.len() * TOKENS_PER_ITEM,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::Status { status, body });
        }

        let response = response.json::<ChatResponse>().await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(SummaryError::EmptyResponse)?;

        parse_reply(&content)
    }
}

/// User prompt listing every item of the batch with its full JSON.
pub fn batch_prompt(batch: &[Article]) -> String {
    batch
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let id = article.id().map(value_text).unwrap_or_else(|| "N/A".to_string());
            let body = serde_json::to_string_pretty(article).unwrap_or_default();
            format!("\n--- Ítem {} (ID: {}) ---\n{}", i + 1, id, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pull the `resumenes` list out of the model's JSON answer. A missing key
/// yields an empty list, which then fails the count check.
pub fn parse_reply(content: &str) -> Result<Vec<String>, SummaryError> {
    let reply: BatchReply = serde_json::from_str(content)?;
    Ok(reply.resumenes)
}

/// Splits items into fixed-size batches and summarizes them one after the
/// other. Failures stay inside the batch they happened in.
#[derive(Debug, Clone)]
pub struct BatchSummarizer {
    model: Arc<dyn SummaryModel>,
    batch_size: usize,
}

impl BatchSummarizer {
    pub fn new(model: Arc<dyn SummaryModel>, batch_size: usize) -> Self {
        Self {
            model,
            batch_size: batch_size.max(1),
        }
    }

    pub fn with_default_batch_size(model: Arc<dyn SummaryModel>) -> Self {
        Self::new(model, DEFAULT_BATCH_SIZE)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// One summary per item, in input order. Never fails: a batch whose call
    /// errors gets [`SUMMARY_FAILED`] for every item, and a batch whose reply
    /// has the wrong length gets [`SUMMARY_UNAVAILABLE`] for every item.
    pub async fn summarize(&self, items: &[Article]) -> Vec<String> {
        if items.is_empty() {
            return Vec::new();
        }

        let total = items.len().div_ceil(self.batch_size);
        tracing::info!(
            "generating summaries with {} for {} items in batches of {}",
            self.model.name(),
            items.len(),
            self.batch_size
        );

        let mut summaries = Vec::with_capacity(items.len());
        for (idx, batch) in items.chunks(self.batch_size).enumerate() {
            tracing::info!("processing batch {}/{}", idx + 1, total);
            summaries.extend(self.summarize_one(batch).await);
        }
        summaries
    }

    async fn summarize_one(&self, batch: &[Article]) -> Vec<String> {
        match self.model.summarize_batch(batch).await {
            Ok(summaries) if summaries.len() == batch.len() => summaries,
            Ok(summaries) => {
                tracing::warn!(
                    "model returned {} summaries, expected {}; discarding batch",
                    summaries.len(),
                    batch.len()
                );
                vec![SUMMARY_UNAVAILABLE.to_string(); batch.len()]
            }
            Err(e) => {
                tracing::warn!("could not summarize batch: {:#}", e);
                vec![SUMMARY_FAILED.to_string(); batch.len()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_reply() {
        let got = parse_reply(r#"{"resumenes": ["a", "b"]}"#).unwrap();
        assert_eq!(got, vec!["a", "b"]);

        assert!(parse_reply(r#"{"otra": 1}"#).unwrap().is_empty());
        assert!(parse_reply("not json").is_err());
        assert!(parse_reply(r#"{"resumenes": [1, 2]}"#).is_err());
    }

    #[test]
    fn test_batch_prompt_lists_items_in_order() {
        let batch: Vec<Article> = serde_json::from_value(json!([
            {"id": 10, "title": "one"},
            {"title": "two"}
        ]))
        .unwrap();

        let prompt = batch_prompt(&batch);
        let first = prompt.find("--- Ítem 1 (ID: 10) ---").unwrap();
        let second = prompt.find("--- Ítem 2 (ID: N/A) ---").unwrap();
        assert!(first < second);
        assert!(prompt.contains("\"title\": \"two\""));
    }
}
