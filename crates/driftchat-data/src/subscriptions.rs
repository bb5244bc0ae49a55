//! Reference-counted registry of replication subscriptions.
//!
//! The store itself never releases a subscription; visiting N distinct
//! rooms historically left N subscriptions open for the process lifetime.
//! This table makes that resource explicit: the repository counts consumers
//! per collection id and tears the mirror down when the count reaches zero,
//! unless configured to preserve subscriptions forever for compatibility
//! with the historical behavior. Holders that must outlive every transient
//! consumer (the room creator's own watch, joined message history) acquire
//! once with no matching release.

use std::collections::HashMap;

/// What happens to a subscription when its last consumer goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Release the subscription once no consumer holds the sequence.
    #[default]
    Counted,
    /// Never release; subscriptions accumulate for the process lifetime.
    Forever,
}

/// Consumer counts per collection id.
///
/// Owned by the repository facade; the set of tracked collections only ever
/// grows (entries are kept at count zero so "ever bound" stays observable).
#[derive(Debug)]
pub struct SubscriptionTable {
    policy: RetentionPolicy,
    consumers: HashMap<String, usize>,
}

impl SubscriptionTable {
    /// Create an empty table with the given policy.
    pub fn new(policy: RetentionPolicy) -> Self {
        Self { policy, consumers: HashMap::new() }
    }

    /// Configured retention policy.
    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Record a consumer. Returns `true` when the count went from zero to
    /// one, i.e. no live mirror may exist and the caller should bind one
    /// if it doesn't already hold it.
    pub fn acquire(&mut self, collection_id: &str) -> bool {
        let count = self.consumers.entry(collection_id.to_owned()).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Record a consumer going away. Returns `true` when the caller should
    /// tear the mirror down (count reached zero under [`RetentionPolicy::Counted`]).
    pub fn release(&mut self, collection_id: &str) -> bool {
        let Some(count) = self.consumers.get_mut(collection_id) else {
            return false;
        };
        *count = count.saturating_sub(1);
        *count == 0 && self.policy == RetentionPolicy::Counted
    }

    /// Current consumer count for a collection.
    pub fn consumer_count(&self, collection_id: &str) -> usize {
        self.consumers.get(collection_id).copied().unwrap_or_default()
    }

    /// Every collection id ever acquired, regardless of current count.
    pub fn tracked_collections(&self) -> Vec<String> {
        self.consumers.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_acquire_requests_binding() {
        let mut table = SubscriptionTable::new(RetentionPolicy::Counted);
        assert!(table.acquire("m1"));
        assert!(!table.acquire("m1"));
        assert_eq!(table.consumer_count("m1"), 2);
    }

    #[test]
    fn counted_release_tears_down_at_zero() {
        let mut table = SubscriptionTable::new(RetentionPolicy::Counted);
        table.acquire("m1");
        table.acquire("m1");

        assert!(!table.release("m1"));
        assert!(table.release("m1"));
    }

    #[test]
    fn forever_never_tears_down() {
        let mut table = SubscriptionTable::new(RetentionPolicy::Forever);
        table.acquire("m1");
        assert!(!table.release("m1"));
        assert_eq!(table.consumer_count("m1"), 0);
    }

    #[test]
    fn release_of_unknown_collection_is_a_no_op() {
        let mut table = SubscriptionTable::new(RetentionPolicy::Counted);
        assert!(!table.release("never-bound"));
    }

    #[test]
    fn tracked_set_survives_release() {
        let mut table = SubscriptionTable::new(RetentionPolicy::Counted);
        table.acquire("m1");
        table.release("m1");
        assert_eq!(table.tracked_collections(), vec!["m1".to_owned()]);
    }
}
