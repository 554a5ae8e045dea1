//! Mapping between entries and Notion page properties.

use chrono::Utc;
use serde_json::{Map, Value, json};
use wordbook_types::{Entry, timestamp};

use crate::codec;

pub const WORD: &str = "Word";
pub const DEFINITION: &str = "Definition";
pub const USAGE_NOTE: &str = "Usage Note";
pub const EXAMPLES: &str = "Examples";
pub const SAVED_AT: &str = "Saved At";

/// Notion caps a single rich-text segment at 2000 characters
const MAX_SEGMENT_CHARS: usize = 2000;

pub fn entry_properties(entry: &Entry) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(WORD.into(), json!({ "title": segments(&entry.word) }));
    properties.insert(
        DEFINITION.into(),
        json!({ "rich_text": segments(&entry.definition) }),
    );
    properties.insert(
        USAGE_NOTE.into(),
        json!({ "rich_text": segments(&entry.usage_note) }),
    );
    properties.insert(
        SAVED_AT.into(),
        json!({ "date": { "start": timestamp::format(&entry.saved_at) } }),
    );
    properties.insert(
        EXAMPLES.into(),
        json!({ "rich_text": segments(&codec::encode(&entry.examples)) }),
    );
    properties
}

/// Rebuild an entry from a page; pages without a word are skipped
pub fn entry_from_page(properties: &Map<String, Value>) -> Option<Entry> {
    let word = word(properties);
    if word.is_empty() {
        return None;
    }

    let saved_at = timestamp::parse_or_now(
        properties
            .get(SAVED_AT)
            .and_then(|p| p.pointer("/date/start"))
            .and_then(Value::as_str),
    );
    let id = format!(
        "{word}-{}-{}",
        Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    );

    Some(Entry {
        id,
        definition: plain_text(properties, DEFINITION, "rich_text"),
        image_url: String::new(),
        examples: codec::decode(&plain_text(properties, EXAMPLES, "rich_text")),
        usage_note: plain_text(properties, USAGE_NOTE, "rich_text"),
        pronunciation: None,
        saved_at,
        word,
    })
}

/// The de-duplication key of a page
pub fn word(properties: &Map<String, Value>) -> String {
    plain_text(properties, WORD, "title")
}

fn segments(text: &str) -> Vec<Value> {
    if text.is_empty() {
        return vec![json!({ "text": { "content": "" } })];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(MAX_SEGMENT_CHARS)
        .map(|chunk| {
            let content: String = chunk.iter().collect();
            json!({ "text": { "content": content } })
        })
        .collect()
}

/// Concatenate every segment of a title or rich-text property
fn plain_text(properties: &Map<String, Value>, name: &str, kind: &str) -> String {
    let Some(items) = properties
        .get(name)
        .and_then(|p| p.get(kind))
        .and_then(Value::as_array)
    else {
        return String::new();
    };

    items
        .iter()
        .filter_map(|item| {
            item.get("plain_text")
                .or_else(|| item.pointer("/text/content"))
                .and_then(Value::as_str)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use wordbook_types::{DictionaryResult, Example};

    use super::*;

    fn casa() -> Entry {
        Entry::from_result_at(
            DictionaryResult {
                word: "casa".into(),
                definition: "house".into(),
                usage_note: "feminine".into(),
                examples: vec![Example::new("Mi casa es grande", "My house is big")],
                image_url: "https://example.com/casa.png".into(),
                ..Default::default()
            },
            "es",
            Utc.timestamp_millis_opt(1000).unwrap(),
        )
    }

    #[test]
    fn properties_round_trip_through_a_page() {
        let entry = casa();
        let properties = entry_properties(&entry);

        assert_eq!(properties[EXAMPLES]["rich_text"][0]["text"]["content"], "Mi casa es grande → My house is big");
        assert_eq!(properties[SAVED_AT]["date"]["start"], "1970-01-01T00:00:01.000Z");

        let rebuilt = entry_from_page(&properties).unwrap();
        assert_eq!(rebuilt.word, "casa");
        assert_eq!(rebuilt.definition, "house");
        assert_eq!(rebuilt.usage_note, "feminine");
        assert_eq!(rebuilt.examples, entry.examples);
        assert_eq!(rebuilt.saved_at, entry.saved_at);
        // Remote pages carry no image and get a fresh local id
        assert_eq!(rebuilt.image_url, "");
        assert!(rebuilt.id.starts_with("casa-"));
        assert_ne!(rebuilt.id, entry.id);
    }

    #[test]
    fn long_text_is_split_and_joined_back() {
        let mut entry = casa();
        entry.definition = "á".repeat(4500);

        let properties = entry_properties(&entry);
        assert_eq!(properties[DEFINITION]["rich_text"].as_array().unwrap().len(), 3);
        assert_eq!(entry_from_page(&properties).unwrap().definition, entry.definition);
    }

    #[test]
    fn reads_plain_text_from_provider_pages() {
        let properties = json!({
            "Word": { "title": [{ "plain_text": "perro" }] },
            "Definition": { "rich_text": [{ "plain_text": "d" }, { "plain_text": "og" }] },
            "Saved At": { "date": null }
        });
        let entry = entry_from_page(properties.as_object().unwrap()).unwrap();

        assert_eq!(entry.word, "perro");
        assert_eq!(entry.definition, "dog");
        assert!(entry.examples.is_empty());
    }

    #[test]
    fn pages_without_word_are_skipped() {
        let properties = json!({ "Word": { "title": [] }, "Definition": { "rich_text": [] } });
        assert!(entry_from_page(properties.as_object().unwrap()).is_none());
    }
}
