use log::debug;
use wasm_bindgen::JsValue;

/// Why a submission ended without a usable reply from the form endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitError {
    Transport(String),
    TimedOut { after_ms: u32 },
    MalformedReply(String),
    Encoding(String),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Transport(msg) => write!(f, "Request failed: {}", msg),
            SubmitError::TimedOut { after_ms } => {
                write!(f, "Request timed out after {}ms", after_ms)
            }
            SubmitError::MalformedReply(msg) => write!(f, "Malformed reply: {}", msg),
            SubmitError::Encoding(msg) => write!(f, "Could not encode form data: {}", msg),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<gloo_net::Error> for SubmitError {
    fn from(err: gloo_net::Error) -> Self {
        SubmitError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SubmitError {
    fn from(err: serde_json::Error) -> Self {
        SubmitError::MalformedReply(err.to_string())
    }
}

/// Problems found while wiring handlers onto the page.
#[derive(Debug, Clone, PartialEq)]
pub enum BindError {
    NoWindow,
    NoDocument,
    MissingSubmitControl { form: String },
    Js(String),
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::NoWindow => write!(f, "no global window"),
            BindError::NoDocument => write!(f, "window has no document"),
            BindError::MissingSubmitControl { form } => write!(
                f,
                "form {} has no button[type=\"submit\"]; leaving native submission in place",
                form
            ),
            BindError::Js(msg) => write!(f, "JS error: {}", msg),
        }
    }
}

impl std::error::Error for BindError {}

impl From<JsValue> for BindError {
    fn from(value: JsValue) -> Self {
        BindError::Js(js_to_string(&value))
    }
}

/// Best-effort text for a thrown JS value.
pub fn js_to_string(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Logs a failed cosmetic DOM call at debug level. Returns whether it worked.
pub fn log_js_failure(what: &str, result: Result<(), JsValue>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!("Could not {}: {}", what, js_to_string(&e));
            false
        }
    }
}
