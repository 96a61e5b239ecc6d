//! Featured slot allowance per plan tier.

use crate::models::{PlanTier, ProviderRecord};

/// Boosted pro-tier listings allowed per page.
pub const PRO_SLOT_LIMIT: usize = 3;

/// Boosted premium-tier listings allowed per page.
pub const PREMIUM_SLOT_LIMIT: usize = 6;

/// How many boosted listings of `tier` a result page may show.
pub const fn slot_limit(tier: PlanTier) -> usize {
    match tier {
        PlanTier::Free => 0,
        PlanTier::Pro => PRO_SLOT_LIMIT,
        PlanTier::Premium => PREMIUM_SLOT_LIMIT,
    }
}

/// Flag the records on a ranked page that may be shown as boosted.
///
/// Walks the page in order; a featured record is boosted while its tier
/// still has slots left. The order of `ranked` is not changed.
pub fn mark_boosted(ranked: &[ProviderRecord]) -> Vec<bool> {
    let mut used = [0usize; 3];
    ranked
        .iter()
        .map(|record| {
            if !record.featured {
                return false;
            }
            let slot = &mut used[record.plan as usize];
            if *slot < slot_limit(record.plan) {
                *slot += 1;
                true
            } else {
                false
            }
        })
        .collect()
}
