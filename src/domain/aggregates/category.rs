//! Category Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::value_objects::{Lang, LocalizedText};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: LocalizedText,
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn create(name: LocalizedText, parent_id: Option<String>, image_url: Option<String>) -> Self {
        let slug = slugify(&name.localize(Lang::En));
        Self { id: Uuid::now_v7().to_string(), name, slug, parent_id, image_url, created_at: Utc::now() }
    }
}

fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_english_name() {
        let c = Category::create(LocalizedText::bilingual("Smart Phones & Tablets", "هواتف"), None, None);
        assert_eq!(c.slug, "smart-phones-tablets");
    }
}
