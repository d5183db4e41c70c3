//! Value Objects for the shop domain

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// SKU (Stock Keeping Unit) value object. Unique within a product, not globally.
/// Deserialization goes through [`Sku::new`], so stored SKUs are always trimmed and non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > 64 { return Err(SkuError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self { sku.0 }
}

impl PartialEq<str> for Sku {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

#[derive(Debug, Clone, Error)]
pub enum SkuError {
    #[error("SKU empty")]
    Empty,
    #[error("SKU too long")]
    TooLong,
}

impl From<SkuError> for crate::ShopError {
    fn from(e: SkuError) -> Self { crate::ShopError::Validation(e.to_string()) }
}

/// Quantity value object: a positive line-item count
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Option<Self> { (value > 0).then_some(Self(value)) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.0)) }
}

/// Display language selected by the request's `Accept-Language` header
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Ar,
}

impl Lang {
    /// Picks Arabic when the first language tag starts with `ar`, English otherwise.
    pub fn from_accept_language(header: &str) -> Self {
        let first = header.split(',').next().unwrap_or_default().trim().to_ascii_lowercase();
        if first.starts_with("ar") { Lang::Ar } else { Lang::En }
    }
}

/// A field that may be a plain string, an `{en, ar}` pair, or missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Bilingual {
        #[serde(default)]
        en: String,
        #[serde(default)]
        ar: String,
    },
    #[default]
    Absent,
}

impl LocalizedText {
    pub fn bilingual(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self::Bilingual { en: en.into(), ar: ar.into() }
    }

    /// Resolves the text for `lang`. A bilingual pair falls back to the other
    /// side when the requested one is empty.
    pub fn localize(&self, lang: Lang) -> String {
        match self {
            Self::Plain(s) => s.clone(),
            Self::Bilingual { en, ar } => {
                let (wanted, other) = match lang { Lang::En => (en, ar), Lang::Ar => (ar, en) };
                if wanted.trim().is_empty() { other.clone() } else { wanted.clone() }
            }
            Self::Absent => String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.localize(Lang::En).trim().is_empty()
    }

    pub fn is_absent(&self) -> bool { matches!(self, Self::Absent) }
}

impl From<&str> for LocalizedText {
    fn from(s: &str) -> Self { Self::Plain(s.to_string()) }
}
