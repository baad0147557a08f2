//! Identity Assigner
//!
//! The upstream feed has no persistent key and delivers oldest-first, so a
//! sequence id is positional: the batch is reversed and the newest record of
//! an `n`-record batch gets `n`, the oldest gets `1`. Ids are only stable
//! within one snapshot; every successful poll replaces the whole set.

/// An item tagged with its batch-relative sequence id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequenced<T> {
    pub sequence_id: u64,
    pub item: T,
}

/// Takes a batch oldest-first and returns it newest-first with ids assigned.
pub fn assign<T>(batch: Vec<T>) -> Vec<Sequenced<T>> {
    let n = batch.len() as u64;
    batch
        .into_iter()
        .rev()
        .enumerate()
        .map(|(index, item)| Sequenced {
            sequence_id: n - index as u64,
            item,
        })
        .collect()
}
