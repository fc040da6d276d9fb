use super::configuration::BundlePolicy;
use crate::sdp::media::MediaKind;
use std::collections::HashSet;

/// Decides, section by section, which media sections are bundle-only.
///
/// The answer depends on what was seen earlier in the same pass, so one
/// tracker must be threaded through the whole generation of a description,
/// in section order.
#[derive(Debug)]
pub(crate) struct BundleTracker {
    policy: BundlePolicy,
    seen_any: bool,
    seen_kinds: HashSet<MediaKind>,
}

impl BundleTracker {
    pub(crate) fn new(policy: BundlePolicy) -> Self {
        Self {
            policy,
            seen_any: false,
            seen_kinds: HashSet::new(),
        }
    }

    /// Records a section of `kind` and reports whether it should ride on an
    /// earlier section's transport.
    pub(crate) fn is_bundle_only(&mut self, kind: MediaKind) -> bool {
        let first_overall = !self.seen_any;
        let first_of_kind = self.seen_kinds.insert(kind);
        self.seen_any = true;
        match self.policy {
            BundlePolicy::MaxCompat => false,
            BundlePolicy::MaxBundle => !first_overall,
            BundlePolicy::Balanced => !first_of_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MediaKind::{Audio, Text, Video};

    fn run(policy: BundlePolicy, kinds: &[MediaKind]) -> Vec<bool> {
        let mut tracker = BundleTracker::new(policy);
        kinds.iter().map(|k| tracker.is_bundle_only(*k)).collect()
    }

    #[test]
    fn max_compat_never_bundles() {
        assert_eq!(run(BundlePolicy::MaxCompat, &[Audio, Audio, Video]), vec![false; 3]);
    }

    #[test]
    fn max_bundle_keeps_only_the_first_section() {
        assert_eq!(
            run(BundlePolicy::MaxBundle, &[Video, Audio, Video, Text]),
            vec![false, true, true, true]
        );
    }

    #[test]
    fn balanced_keeps_the_first_section_per_kind() {
        assert_eq!(
            run(BundlePolicy::Balanced, &[Audio, Video, Audio, Text, Video]),
            vec![false, false, true, false, true]
        );
    }
}
