//! Recognizer backed by the Gemini `generateContent` REST API.

use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    BoxFuture, RecognitionError, RecognizedReceipt, Recognizer, image_mime_type,
    parsing::parse_receipt_text,
};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const PROMPT: &str = r#"
You are given an image of a receipt. Please read the content into JSON format:

```
{
    "menus": [
        {
            "name": <item_name>,
            "count": <purchased_count>,
            "price": <total_price_for_this_item>
        },
        ...
    ],
    "total": <total_price_in_receipt>
}
```

For price/total: do not use comma or point separator, just bare number, except for decimal
For count: assume 1 if no count number is found in the receipt
Note that no need to give unit price

return only in JSON format
"#;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Image {
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Reads receipts with a Gemini model.
#[derive(Clone, Debug)]
pub struct GeminiRecognizer {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiRecognizer {
    pub fn builder() -> GeminiRecognizerBuilder {
        GeminiRecognizerBuilder::default()
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    async fn run(&self, image: &[u8]) -> Result<RecognizedReceipt, RecognitionError> {
        let mime_type = image_mime_type(image)?;
        let body = GenerateRequest {
            contents: [Content {
                parts: [
                    Part::Text { text: PROMPT },
                    Part::Image {
                        inline_data: InlineData {
                            mime_type,
                            data: base64::engine::general_purpose::STANDARD.encode(image),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig { temperature: 0.0 },
        };

        tracing::debug!(model = %self.model, bytes = image.len(), "recognizing receipt");
        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorResponse>().await {
                Ok(err) => err.error.message,
                Err(_) => "unknown error".to_string(),
            };
            tracing::warn!(%status, message, "recognizer request failed");
            return Err(RecognitionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response = resp.json::<GenerateResponse>().await?;
        let text = response_text(response)?;
        parse_receipt_text(&text)
    }
}

impl Recognizer for GeminiRecognizer {
    fn recognize<'a>(
        &'a self,
        image: &'a [u8],
    ) -> BoxFuture<'a, Result<RecognizedReceipt, RecognitionError>> {
        Box::pin(self.run(image))
    }
}

/// Concatenated text parts of the first candidate.
fn response_text(response: GenerateResponse) -> Result<String, RecognitionError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(RecognitionError::EmptyResponse);
    }
    Ok(text)
}

/// The builder for [`GeminiRecognizer`].
#[derive(Default, Debug)]
pub struct GeminiRecognizerBuilder {
    api_key: String,
    model: Option<String>,
    endpoint: Option<String>,
    client: Option<Client>,
}

impl GeminiRecognizerBuilder {
    pub fn api_key(mut self, api_key: &str) -> GeminiRecognizerBuilder {
        self.api_key = api_key.trim().to_string();
        self
    }

    pub fn model(mut self, model: &str) -> GeminiRecognizerBuilder {
        self.model = Some(model.to_string());
        self
    }

    /// Base URL of the API, without the `/models/...` suffix.
    pub fn endpoint(mut self, endpoint: &str) -> GeminiRecognizerBuilder {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn client(mut self, client: Client) -> GeminiRecognizerBuilder {
        self.client = Some(client);
        self
    }

    /// Fails with [`RecognitionError::MissingApiKey`] if no key was given.
    pub fn build(self) -> Result<GeminiRecognizer, RecognitionError> {
        if self.api_key.is_empty() {
            return Err(RecognitionError::MissingApiKey);
        }
        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        tracing::info!(model, "Initializing Gemini recognizer...");
        Ok(GeminiRecognizer {
            client: self.client.unwrap_or_default(),
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model,
            api_key: self.api_key,
        })
    }
}
