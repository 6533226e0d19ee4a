//! Selection of the items that are due for review.

use std::collections::HashSet;

use hm_store::{ItemKey, RecordStore, VocabularyItem};
use serde::Serialize;

/// Queue length used when the caller does not ask for one
pub const DEFAULT_QUEUE_LIMIT: usize = 50;

/// A vocabulary item selected for review, with the time it became due.
///
/// Serializes as the item's own JSON object plus a `nextReview` field. `due_at`
/// is `0` for items that were graded before but never entered SM-2 scheduling,
/// which puts them ahead of everything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueItem {
    #[serde(skip)]
    pub key: ItemKey,
    #[serde(flatten)]
    pub item: VocabularyItem,
    #[serde(rename = "nextReview")]
    pub due_at: i64,
}

/// Build the review queue at time `now`.
///
/// Items are deduplicated by key (first occurrence wins). Items without any
/// review record are not due. Items whose record has no SM-2 state are due with
/// priority `0`; scheduled items are due once their next-review time has passed.
/// The result is ordered by due time, ties keep source order, and is truncated
/// to `limit`.
pub fn build_queue<S>(items: &[VocabularyItem], store: &S, now: i64, limit: usize) -> Vec<DueItem>
where
    S: RecordStore + ?Sized,
{
    let mut seen = HashSet::new();
    let mut due = Vec::new();

    for item in items {
        let key = item.key();
        if seen.contains(&key) {
            continue;
        }

        let Some(record) = store.record(&key) else {
            continue;
        };

        let due_at = match record.sm2 {
            None => 0,
            Some(sm2) => sm2.due_at(),
        };

        if due_at <= now {
            seen.insert(key.clone());
            due.push(DueItem {
                key,
                item: item.clone(),
                due_at,
            });
        }
    }

    due.sort_by_key(|d| d.due_at);
    due.truncate(limit);
    due
}

/// Number of items due at `now`, without any limit
pub fn count_due<S>(items: &[VocabularyItem], store: &S, now: i64) -> usize
where
    S: RecordStore + ?Sized,
{
    build_queue(items, store, now, usize::MAX).len()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use hm_store::{ItemId, ReviewRecord, Sm2State};
    use serde_json::json;

    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn word(id: i64, term: &str) -> VocabularyItem {
        VocabularyItem::new(Some(ItemId::Number(id)), term)
    }

    fn scheduled(next_review: i64) -> ReviewRecord {
        ReviewRecord {
            attempts: 1,
            correct: 1,
            last_review: Some(NOW - 20_000),
            sm2: Some(Sm2State {
                interval: 1,
                repetitions: 1,
                ef: 2.5,
                next_review: Some(next_review),
            }),
        }
    }

    fn unscheduled() -> ReviewRecord {
        ReviewRecord {
            attempts: 1,
            correct: 0,
            last_review: Some(NOW - 5_000),
            sm2: None,
        }
    }

    fn history(entries: Vec<(i64, ReviewRecord)>) -> HashMap<ItemKey, ReviewRecord> {
        entries
            .into_iter()
            .map(|(id, record)| (ItemKey::from(id), record))
            .collect()
    }

    #[test]
    fn test_queue_selects_due_items() {
        let items = vec![word(1, "Due"), word(2, "Future"), word(3, "New"), word(4, "Unseen")];
        let store = history(vec![
            (1, scheduled(NOW - 10_000)),
            (2, scheduled(NOW + 10_000)),
            (3, unscheduled()),
        ]);

        let queue = build_queue(&items, &store, NOW, DEFAULT_QUEUE_LIMIT);
        let keys: Vec<&str> = queue.iter().map(|d| d.key.as_str()).collect();

        // unscheduled items come first, future and unseen items are skipped
        assert_eq!(keys, ["3", "1"]);
        assert_eq!(queue[0].due_at, 0);
        assert_eq!(queue[1].due_at, NOW - 10_000);
    }

    #[test]
    fn test_due_exactly_now_is_included() {
        let items = vec![word(1, "a")];
        let store = history(vec![(1, scheduled(NOW))]);
        assert_eq!(build_queue(&items, &store, NOW, 10).len(), 1);
    }

    #[test]
    fn test_queue_deduplicates_by_key() {
        let items = vec![word(1, "first"), word(1, "second"), word(2, "other")];
        let store = history(vec![(1, unscheduled()), (2, unscheduled())]);

        let queue = build_queue(&items, &store, NOW, 10);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].item.term, "first");
    }

    #[test]
    fn test_queue_dedups_term_keyed_items() {
        let items = vec![
            VocabularyItem::new(None, "가방"),
            VocabularyItem::new(None, "가방"),
        ];
        let mut store = HashMap::new();
        store.insert(ItemKey::from("가방"), unscheduled());

        assert_eq!(build_queue(&items, &store, NOW, 10).len(), 1);
    }

    #[test]
    fn test_queue_orders_and_truncates() {
        let items: Vec<_> = (1..=5).map(|i| word(i, "w")).collect();
        let store = history(vec![
            (1, scheduled(NOW - 100)),
            (2, scheduled(NOW - 500)),
            (3, scheduled(NOW - 300)),
            (4, scheduled(NOW - 400)),
            (5, scheduled(NOW - 200)),
        ]);

        let queue = build_queue(&items, &store, NOW, 3);
        let keys: Vec<&str> = queue.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, ["2", "4", "3"]);
        assert_eq!(count_due(&items, &store, NOW), 5);
    }

    #[test]
    fn test_unscheduled_sm2_state_is_due_first() {
        let items = vec![word(1, "scheduled"), word(2, "zeroed")];
        let mut zeroed = scheduled(0);
        if let Some(sm2) = zeroed.sm2.as_mut() {
            sm2.next_review = None;
        }
        let store = history(vec![(1, scheduled(NOW - 1)), (2, zeroed)]);

        let queue = build_queue(&items, &store, NOW, 10);
        assert_eq!(queue[0].key.as_str(), "2");
        assert_eq!(queue[0].due_at, 0);
    }

    #[test]
    fn test_empty_inputs() {
        let store: HashMap<ItemKey, ReviewRecord> = HashMap::new();
        assert!(build_queue(&[], &store, NOW, 10).is_empty());
        assert!(build_queue(&[word(1, "a")], &store, NOW, 10).is_empty());
    }

    #[test]
    fn test_due_item_serializes_flat() {
        let mut item = word(9, "바다");
        item.payload.insert("translation".into(), json!("sea"));
        let due = DueItem {
            key: item.key(),
            item,
            due_at: 0,
        };

        assert_eq!(
            serde_json::to_value(&due).unwrap(),
            json!({ "id": 9, "word_kr": "바다", "translation": "sea", "nextReview": 0 })
        );
    }
}
