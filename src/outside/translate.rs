use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::result::{Error, Result};

/// Language of the transcripts
pub const SOURCE_LANG: &str = "en";
/// Language the transcripts are translated into
pub const TARGET_LANG: &str = "es";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interface for translating plain text between the two fixed languages
pub trait Translator: Sync {
    fn translate(&self, text: &str) -> Result<String>;
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Client for a LibreTranslate-compatible HTTP endpoint
pub struct HttpTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpTranslator {
    pub fn new(endpoint: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|err| Error::translation(format!("Could not build HTTP client: {err}")))?;

        Ok(Self { client, endpoint })
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&TranslateRequest {
                q: text,
                source: SOURCE_LANG,
                target: TARGET_LANG,
                format: "text",
            })
            .send()
            .map_err(|err| Error::translation(format!("Translation request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::translation(format!(
                "Translation service answered {status}"
            )));
        }

        let body: TranslateResponse = response
            .json()
            .map_err(|err| Error::translation(format!("Could not parse translation: {err}")))?;

        Ok(body.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_the_wire_format() {
        let request = TranslateRequest {
            q: "hello world",
            source: SOURCE_LANG,
            target: TARGET_LANG,
            format: "text",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["q"], "hello world");
        assert_eq!(json["source"], "en");
        assert_eq!(json["target"], "es");
        assert_eq!(json["format"], "text");
    }

    #[test]
    fn response_reads_the_camel_case_key() {
        let body: TranslateResponse =
            serde_json::from_str(r#"{"translatedText": "hola mundo"}"#).unwrap();
        assert_eq!(body.translated_text, "hola mundo");
    }
}
