//! First-match capability scan over a processing chain.

use crate::stage::{Capability, ProcessingStage};
use std::sync::Arc;

/// The first stage in `chain` that declares `capability`.
///
/// Chain order is precedence: when several stages qualify, the one nearest
/// the head wins.
pub fn first_implementing(
    chain: &[Arc<dyn ProcessingStage>],
    capability: Capability,
) -> Option<&Arc<dyn ProcessingStage>> {
    chain
        .iter()
        .find(|stage| stage.capabilities().contains(capability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{CapabilitySet, InvalidationStats};

    struct Synthetic {
        name: &'static str,
        declares: CapabilitySet,
    }

    impl ProcessingStage for Synthetic {
        fn name(&self) -> &str {
            self.name
        }
        fn capabilities(&self) -> CapabilitySet {
            self.declares
        }
    }

    fn stage(name: &'static str, declares: CapabilitySet) -> Arc<dyn ProcessingStage> {
        Arc::new(Synthetic { name, declares })
    }

    #[test]
    fn test_returns_first_of_several() {
        let tx = CapabilitySet::empty().with(Capability::Transactions);
        let chain = vec![
            stage("one", CapabilitySet::empty().with(Capability::Invalidation)),
            stage("two", tx),
            stage("three", tx.with(Capability::CacheManagement)),
        ];
        let found = first_implementing(&chain, Capability::Transactions).unwrap();
        assert_eq!(found.name(), "two");
        assert!(Arc::ptr_eq(found, &chain[1]));

        let found = first_implementing(&chain, Capability::CacheManagement).unwrap();
        assert_eq!(found.name(), "three");
    }

    #[test]
    fn test_none_when_nothing_qualifies() {
        let chain = vec![
            stage("one", CapabilitySet::empty()),
            stage("two", CapabilitySet::empty().with(Capability::StoreWrites)),
        ];
        assert!(first_implementing(&chain, Capability::Activation).is_none());
        assert!(first_implementing(&[], Capability::Activation).is_none());
    }

    struct Invalidator;

    impl InvalidationStats for Invalidator {
        fn invalidations(&self) -> i64 {
            9
        }
    }

    impl ProcessingStage for Invalidator {
        fn name(&self) -> &str {
            "invalidator"
        }
        fn invalidation(&self) -> Option<&dyn InvalidationStats> {
            Some(self)
        }
    }

    #[test]
    fn test_views_declare_capabilities() {
        let chain: Vec<Arc<dyn ProcessingStage>> = vec![Arc::new(Invalidator)];
        let found = first_implementing(&chain, Capability::Invalidation).unwrap();
        assert_eq!(found.invalidation().unwrap().invalidations(), 9);
    }
}
