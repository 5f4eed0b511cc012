//! Fallback responder for callers without streaming entitlement.
//!
//! Pure lookup: no network, no decoder. An exact FAQ match yields a canned
//! reply, anything else yields the locale's upsell message.

mod table;

pub use table::{normalize_locale, normalize_question, LocaleTable, SUPPORTED_LOCALES};

/// Reply produced without the streaming pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReply {
    /// Exact match in the FAQ table
    Canned(&'static str),
    /// No match; invite the caller to upgrade
    Upsell(&'static str),
}

impl FallbackReply {
    pub fn text(&self) -> &'static str {
        match self {
            FallbackReply::Canned(text) | FallbackReply::Upsell(text) => text,
        }
    }

    pub fn is_canned(&self) -> bool {
        matches!(self, FallbackReply::Canned(_))
    }
}

/// Locale-bound fallback responder.
#[derive(Debug, Clone, Copy)]
pub struct FallbackResponder {
    locale: &'static str,
}

impl FallbackResponder {
    /// Responder for a locale tag; region suffixes are ignored and unknown
    /// languages use English.
    pub fn new(locale: &str) -> Self {
        Self {
            locale: normalize_locale(locale),
        }
    }

    pub fn locale(&self) -> &'static str {
        self.locale
    }

    /// Exact-match lookup, trimmed and case-insensitive.
    pub fn lookup(&self, text: &str) -> Option<&'static str> {
        table::table_for(self.locale).answer(&normalize_question(text))
    }

    pub fn upsell(&self) -> &'static str {
        table::table_for(self.locale).upsell
    }

    /// Canned reply on a match, otherwise the upsell message.
    pub fn respond(&self, text: &str) -> FallbackReply {
        match self.lookup(text) {
            Some(answer) => FallbackReply::Canned(answer),
            None => FallbackReply::Upsell(self.upsell()),
        }
    }
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::new("en")
    }
}
