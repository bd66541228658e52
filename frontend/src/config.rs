use log::{warn, Level};

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose console output when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitSettings {
    pub sending_label: String,
    pub busy_opacity: String,
    pub request_timeout_ms: u32,
    pub default_success_text: String,
    pub default_error_text: String,
    pub network_error_text: String,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            sending_label: "Sending...".to_string(),
            busy_opacity: "0.6".to_string(),
            request_timeout_ms: 30_000,
            default_success_text: "Thank you! Your request has been received.".to_string(),
            default_error_text: "An error occurred. Please try again.".to_string(),
            network_error_text: "Network error. Please check your connection and try again."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BannerSettings {
    pub display_ms: u32,
    pub exit_ms: u32,
}

impl Default for BannerSettings {
    fn default() -> Self {
        Self {
            display_ms: 5_000,
            exit_ms: 300,
        }
    }
}

impl BannerSettings {
    /// Upper bound on how long an undismissed banner stays in the document.
    pub fn lifetime_ms(&self) -> u32 {
        self.display_ms.saturating_add(self.exit_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealSettings {
    /// Fraction of the viewport height to scroll before the scroll message shows.
    pub scroll_message_ratio: f64,
    /// Cards show once their top edge is this far inside the viewport.
    pub card_margin_px: f64,
    /// Pointer band at the top of the viewport that pulls the header down.
    pub header_zone_px: i32,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            scroll_message_ratio: 0.3,
            card_margin_px: 50.0,
            header_zone_px: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub recipient: String,
    pub subject: String,
    pub handoff_notice: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            recipient: "hello@example.com".to_string(),
            subject: "Website Inquiry".to_string(),
            handoff_notice: "Message ready to send! Your email client will open.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteConfig {
    pub submit: SubmitSettings,
    pub banner: BannerSettings,
    pub reveal: RevealSettings,
    pub chat: ChatSettings,
}

impl SiteConfig {
    /// Applies page-level overrides. `lookup` receives the `data-*` name
    /// without the prefix, e.g. `submit-timeout-ms`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(ms) = parse_millis(&lookup, "submit-timeout-ms") {
            self.submit.request_timeout_ms = ms;
        }
        if let Some(ms) = parse_millis(&lookup, "banner-display-ms") {
            self.banner.display_ms = ms;
        }
        if let Some(recipient) = non_empty(lookup("chat-recipient")) {
            self.chat.recipient = recipient;
        }
        if let Some(subject) = non_empty(lookup("chat-subject")) {
            self.chat.subject = subject;
        }
        self
    }

    /// Reads overrides from the `data-*` attributes on `<body>`.
    pub fn from_document(document: &web_sys::Document) -> Self {
        let base = SiteConfig::default();
        match document.body() {
            Some(body) => base.with_overrides(|key| body.get_attribute(&format!("data-{}", key))),
            None => base,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u32> {
    let raw = non_empty(lookup(key))?;
    match raw.parse::<u32>() {
        Ok(0) => {
            warn!("Ignoring data-{}=0", key);
            None
        }
        Ok(ms) => Some(ms),
        Err(_) => {
            warn!("Ignoring data-{}={:?}: not a millisecond count", key, raw);
            None
        }
    }
}
