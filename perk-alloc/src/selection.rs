use rand::seq::SliceRandom;
use std::collections::HashSet;
use uuid::Uuid;

use perk_core::models::Coupon;

/// A quality tier in the ranking order. Coupons land in the first bucket
/// whose predicate matches.
pub struct PriorityBucket {
    pub name: &'static str,
    pub matches: fn(&Coupon) -> bool,
}

/// Current ranking order: verified coupons ahead of everything else.
/// Additional tiers (e.g. high net votes) slot in between without
/// touching the selection algorithm.
pub fn quality_buckets() -> Vec<PriorityBucket> {
    vec![
        PriorityBucket {
            name: "verified",
            matches: |c| c.verified,
        },
        PriorityBucket {
            name: "unverified",
            matches: |_| true,
        },
    ]
}

/// Pick up to `batch_size` coupons from `candidates`, preferring ones the
/// user has not seen. When the exclusion set swallows every candidate the
/// cooldown is relaxed: a repeat beats an empty reward surface.
pub fn select(
    candidates: Vec<Coupon>,
    excluded: &HashSet<Uuid>,
    batch_size: usize,
    buckets: &[PriorityBucket],
) -> Vec<Coupon> {
    let available: Vec<Coupon> = candidates
        .iter()
        .filter(|c| !excluded.contains(&c.id))
        .cloned()
        .collect();

    let pool = if available.is_empty() {
        candidates
    } else {
        available
    };

    rank_and_truncate(pool, batch_size, buckets)
}

/// Shuffle within each bucket, concatenate in bucket order, truncate.
/// Verified coupons are never crowded out by unverified volume, but
/// unverified ones still fill remaining slots.
fn rank_and_truncate(
    pool: Vec<Coupon>,
    batch_size: usize,
    buckets: &[PriorityBucket],
) -> Vec<Coupon> {
    let mut partitions: Vec<Vec<Coupon>> = (0..buckets.len()).map(|_| Vec::new()).collect();
    let mut seen_ids: HashSet<Uuid> = HashSet::new();

    for coupon in pool {
        if !seen_ids.insert(coupon.id) {
            continue;
        }
        if let Some(idx) = buckets.iter().position(|b| (b.matches)(&coupon)) {
            partitions[idx].push(coupon);
        }
    }

    // Fresh rng per call, no seed reuse across requests.
    let mut rng = rand::thread_rng();
    let mut ranked = Vec::new();
    for partition in partitions.iter_mut() {
        partition.shuffle(&mut rng);
        ranked.append(partition);
    }
    ranked.truncate(batch_size);
    ranked
}
