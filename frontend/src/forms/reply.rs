use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::SubmitSettings;
use crate::error::SubmitError;

/// Raw HTTP reply as handed back by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

/// `{ "success": ..., "message": "..." }` as sent by the form endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SubmissionReply {
    #[serde(default)]
    pub success: Value,
    #[serde(default, deserialize_with = "string_or_absent")]
    pub message: Option<String>,
}

fn string_or_absent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(message) => Some(message),
        _ => None,
    })
}

impl SubmissionReply {
    /// Any JSON document except `null` is a reply; values that are not
    /// objects simply carry no `success` flag. A `message` that is not a
    /// string counts as absent.
    pub fn parse(body: &str) -> Result<Self, SubmitError> {
        let document: Value = serde_json::from_str(body)?;
        match document {
            Value::Null => Err(SubmitError::MalformedReply("reply body is null".to_string())),
            Value::Object(_) => Ok(serde_json::from_value(document)?),
            _ => Ok(Self {
                success: Value::Null,
                message: None,
            }),
        }
    }

    /// Truthiness as the page's own scripts would judge it.
    pub fn succeeded(&self) -> bool {
        match &self.success {
            Value::Null => false,
            Value::Bool(b) => *b,
            // numbers past f64 range are Infinity to a script, hence truthy
            Value::Number(n) => match n.as_f64() {
                Some(f) => f != 0.0 && !f.is_nan(),
                None => true,
            },
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// How one submission cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted { message: String },
    Rejected { message: String },
    Failed { cause: SubmitError },
}

impl Outcome {
    pub fn from_reply(reply: Result<RawReply, SubmitError>, texts: &SubmitSettings) -> Self {
        let parsed = reply.and_then(|raw| SubmissionReply::parse(&raw.body));
        match parsed {
            Ok(reply) if reply.succeeded() => Outcome::Accepted {
                message: reply
                    .message()
                    .unwrap_or(&texts.default_success_text)
                    .to_string(),
            },
            Ok(reply) => Outcome::Rejected {
                message: reply
                    .message()
                    .unwrap_or(&texts.default_error_text)
                    .to_string(),
            },
            Err(cause) => Outcome::Failed { cause },
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }
}
