use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

impl BannerKind {
    pub fn slug(self) -> &'static str {
        match self {
            BannerKind::Success => "success",
            BannerKind::Error => "error",
        }
    }

    pub fn class_name(self) -> String {
        format!("form-message form-message-{}", self.slug())
    }

    pub fn icon(self) -> &'static str {
        match self {
            BannerKind::Success => "✓",
            BannerKind::Error => "✕",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            BannerKind::Success => "#4CAF50",
            BannerKind::Error => "#f44336",
        }
    }
}

/// Anything that can tell the visitor how a submission went.
pub trait Notifier {
    fn show(&self, kind: BannerKind, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Banner {
    pub fn new(kind: BannerKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_milliseconds()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerId(u64);

/// The one place on the page a banner may occupy.
///
/// Installing a banner hands back whatever was there so the caller can tear
/// it down. Timers and close buttons hold a `BannerId` and go through
/// `release`, which only succeeds while that banner is still the current one,
/// so late callbacks for an evicted or dismissed banner do nothing.
#[derive(Debug)]
pub struct BannerSlot<H> {
    current: Option<(BannerId, H)>,
    next_id: u64,
}

impl<H> Default for BannerSlot<H> {
    fn default() -> Self {
        Self {
            current: None,
            next_id: 0,
        }
    }
}

impl<H> BannerSlot<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, handle: H) -> (BannerId, Option<H>) {
        self.next_id += 1;
        let id = BannerId(self.next_id);
        let evicted = self.current.replace((id, handle)).map(|(_, old)| old);
        (id, evicted)
    }

    pub fn release(&mut self, id: BannerId) -> Option<H> {
        if self.is_current(id) {
            self.current.take().map(|(_, handle)| handle)
        } else {
            None
        }
    }

    pub fn take(&mut self) -> Option<H> {
        self.current.take().map(|(_, handle)| handle)
    }

    pub fn is_current(&self, id: BannerId) -> bool {
        matches!(self.current, Some((current, _)) if current == id)
    }

    pub fn get(&self, id: BannerId) -> Option<&H> {
        match &self.current {
            Some((current, handle)) if *current == id => Some(handle),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&H> {
        self.current.as_ref().map(|(_, handle)| handle)
    }
}
