use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::timestamp;

/// One example sentence with its translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    #[serde(default)]
    pub sentence: String,
    #[serde(default)]
    pub translation: String,
}

impl Example {
    pub fn new(sentence: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
            translation: translation.into(),
        }
    }
}

/// Lookup result as produced by the dictionary service, before it is saved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryResult {
    pub word: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub usage_note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
}

/// A saved notebook entry.
///
/// `examples` is never absent: a missing or `null` field deserializes to an
/// empty list. `saved_at` falls back to the current time when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub word: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub definition: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub examples: Vec<Example>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage_note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default = "timestamp::now", with = "timestamp")]
    pub saved_at: DateTime<Utc>,
}

impl Entry {
    /// Save a lookup result under `{word}-{target_language}-{millis}`
    pub fn from_result(result: DictionaryResult, target_language: &str) -> Self {
        Self::from_result_at(result, target_language, timestamp::now())
    }

    pub fn from_result_at(
        result: DictionaryResult,
        target_language: &str,
        saved_at: DateTime<Utc>,
    ) -> Self {
        let saved_at = saved_at.trunc_subsecs(3);
        let id = format!(
            "{}{}",
            Self::id_prefix(&result.word, target_language),
            saved_at.timestamp_millis()
        );

        Self {
            id,
            word: result.word,
            definition: result.definition,
            image_url: result.image_url,
            examples: result.examples,
            usage_note: result.usage_note,
            pronunciation: result.pronunciation,
            saved_at,
        }
    }

    pub fn id_prefix(word: &str, target_language: &str) -> String {
        format!("{word}-{target_language}-")
    }

    /// True if this entry was saved for `word` while learning `target_language`
    pub fn is_saved_result(&self, word: &str, target_language: &str) -> bool {
        self.word == word && self.id.starts_with(&Self::id_prefix(word, target_language))
    }

    /// First example, shown as the flashcard preview
    pub fn preview(&self) -> Option<&Example> {
        self.examples.first()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
