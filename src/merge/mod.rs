//! Chronological merge of per-source message sequences
//!
//! Messages are ordered by timestamp. A message without a timestamp borrows the one of
//! its nearest earlier timestamped neighbour in the same source (or, before the first
//! timestamped message, the nearest later one), so it stays where it was relative to its
//! neighbours. Sources with no timestamps at all sort after every timestamped message.
//! Ties fall back to source input order, then to the record's position in its source.
//! The sort is stable.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::ChatMessage;

/// Merge per-source sequences (each in file order) into one ordered sequence
pub fn merge(sources: Vec<Vec<ChatMessage>>) -> Vec<ChatMessage> {
    let mut keyed: Vec<(Option<DateTime<Utc>>, ChatMessage)> = sources
        .into_iter()
        .flat_map(|messages| {
            let keys = effective_timestamps(&messages);
            keys.into_iter().zip(messages)
        })
        .collect();

    keyed.sort_by(|(a_ts, a), (b_ts, b)| compare_keys(*a_ts, *b_ts).then_with(|| position(a, b)));
    keyed.into_iter().map(|(_, message)| message).collect()
}

/// Sort timestamp for each message of one source, inherited from neighbours when absent
pub fn effective_timestamps(messages: &[ChatMessage]) -> Vec<Option<DateTime<Utc>>> {
    let mut keys = Vec::with_capacity(messages.len());
    let mut last_seen = None;
    for message in messages {
        if let Some(ts) = message.timestamp() {
            last_seen = Some(ts);
        }
        keys.push(last_seen);
    }

    // Leading messages take the first timestamp that follows them
    if let Some(first) = messages.iter().find_map(ChatMessage::timestamp) {
        for key in keys.iter_mut().take_while(|key| key.is_none()) {
            *key = Some(first);
        }
    }
    keys
}

/// Present timestamps ascending, absent ones last
fn compare_keys(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn position(a: &ChatMessage, b: &ChatMessage) -> Ordering {
    a.source().cmp(&b.source()).then_with(|| a.source_order().cmp(&b.source_order()))
}
