use std::{borrow::Borrow, fmt};

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};
use serde_json::{Map, Value};

/// Ease factor given to items that have never been graded
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Lowest ease factor an item can reach
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Key a review record is stored under.
///
/// Integer item ids are rendered in decimal so that the history serializes as a
/// flat JSON object keyed by string. Deserializes from a string or an integer,
/// since remote rows carry numeric ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    /// Borrow the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ItemKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ItemKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = ItemKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer item key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemKey, E> {
                Ok(ItemKey::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ItemKey, E> {
                Ok(ItemKey(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ItemKey, E> {
                Ok(ItemKey::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ItemKey, E> {
                Ok(ItemKey(v.to_string()))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

impl From<String> for ItemKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for ItemKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<i64> for ItemKey {
    fn from(key: i64) -> Self {
        Self(key.to_string())
    }
}

/// Identifier of a vocabulary item as it appears in the source data.
///
/// The vocabulary feed mixes numeric and string ids, so both are kept verbatim
/// and written back in the same JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    /// Storage key for this id, or `None` for the blank ids (`0` and `""`)
    /// that the vocabulary feed uses as "no id".
    pub fn as_key(&self) -> Option<ItemKey> {
        match self {
            Self::Number(0) => None,
            Self::Number(n) => Some(ItemKey::from(*n)),
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(ItemKey::from(s.as_str())),
        }
    }
}

/// A unit of study content.
///
/// Only `id` and `term` matter for scheduling; translations, audio and the rest
/// are carried through untouched in `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    /// Primary displayed text
    #[serde(rename = "word_kr", alias = "term", default)]
    pub term: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl VocabularyItem {
    /// Create an item with no extra payload
    pub fn new(id: Option<ItemId>, term: impl Into<String>) -> Self {
        Self {
            id,
            term: term.into(),
            payload: Map::new(),
        }
    }

    /// Key used for history lookups and queue deduplication: the id when it is
    /// set, the term otherwise.
    pub fn key(&self) -> ItemKey {
        self.id
            .as_ref()
            .and_then(ItemId::as_key)
            .unwrap_or_else(|| ItemKey::from(self.term.as_str()))
    }
}

/// SM-2 scheduling state of a single item.
///
/// Deserialization never fails on a bad field: nulls, wrong types, negative or
/// fractional day counts all collapse to the nearest valid value or the default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sm2State {
    /// Days until the next review
    #[serde(deserialize_with = "count_or_zero")]
    pub interval: u32,
    /// Consecutive successful reviews
    #[serde(deserialize_with = "count_or_zero")]
    pub repetitions: u32,
    /// Ease factor
    #[serde(deserialize_with = "ease_or_default")]
    pub ef: f64,
    /// Epoch milliseconds at which the item is due again
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "millis_or_none"
    )]
    pub next_review: Option<i64>,
}

impl Default for Sm2State {
    fn default() -> Self {
        Self {
            interval: 0,
            repetitions: 0,
            ef: DEFAULT_EASE_FACTOR,
            next_review: None,
        }
    }
}

impl Sm2State {
    /// Re-validate a state read back from storage.
    ///
    /// A non-finite ease factor falls back to the default, a finite one is
    /// floored at [`MIN_EASE_FACTOR`], and a `0` due time means unscheduled.
    pub fn sanitized(&self) -> Self {
        let ef = if self.ef.is_finite() {
            self.ef.max(MIN_EASE_FACTOR)
        } else {
            DEFAULT_EASE_FACTOR
        };

        Self {
            ef,
            next_review: self.next_review.filter(|&t| t != 0),
            ..*self
        }
    }

    /// Due time used for queue ordering; unscheduled states sort first
    pub fn due_at(&self) -> i64 {
        self.next_review.filter(|&t| t != 0).unwrap_or(0)
    }
}

/// Any finite JSON number, or `None` for nulls and other types
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(Value::is_number))
}

fn ease_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .and_then(|v| v.as_f64())
        .unwrap_or(DEFAULT_EASE_FACTOR))
}

fn count_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .and_then(|v| v.as_f64())
        .map_or(0, |n| n.round().clamp(0.0, f64::from(u32::MAX)) as u32))
}

fn millis_or_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|n| n.round() as i64))))
}

/// Review history of one vocabulary item, created lazily on its first grading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    #[serde(default, deserialize_with = "count_or_zero")]
    pub attempts: u32,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub correct: u32,
    /// Epoch milliseconds of the most recent grading
    #[serde(default, deserialize_with = "millis_or_none")]
    pub last_review: Option<i64>,
    /// Absent until the item enters spaced-repetition scheduling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sm2: Option<Sm2State>,
}

impl ReviewRecord {
    /// Fresh record for an item seen for the first time at `now`
    pub const fn new(now: i64) -> Self {
        Self {
            attempts: 0,
            correct: 0,
            last_review: Some(now),
            sm2: None,
        }
    }

    /// Share of correct attempts in `[0, 1]`
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            f64::from(self.correct.min(self.attempts)) / f64::from(self.attempts)
        }
    }

    /// Previous grading time, ignoring the `0` placeholder some exports contain
    pub fn last_review_at(&self) -> Option<i64> {
        self.last_review.filter(|&t| t != 0)
    }
}
