use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tokio::time::timeout;
use uuid::Uuid;

use perk_core::repository::ExposureRepository;

use crate::AllocError;

/// Builds the per-request exclusion set: everything shown to the user
/// inside the cooldown window, plus any ids the caller asked to skip.
pub struct ExposureHistory<'a> {
    repo: &'a dyn ExposureRepository,
    cooldown: Duration,
    store_timeout: std::time::Duration,
}

impl<'a> ExposureHistory<'a> {
    pub fn new(
        repo: &'a dyn ExposureRepository,
        cooldown_days: i64,
        store_timeout: std::time::Duration,
    ) -> Self {
        Self {
            repo,
            cooldown: Duration::days(cooldown_days),
            store_timeout,
        }
    }

    /// Queried once per allocation request. Caller-supplied ids are
    /// trusted as-is (session-local dismissals).
    pub async fn exclusion_set(
        &self,
        user_id: &str,
        caller_excludes: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<HashSet<Uuid>, AllocError> {
        let since = now - self.cooldown;
        let query = self.repo.seen_coupon_ids(user_id, since);
        let seen = timeout(self.store_timeout, query)
            .await
            .map_err(|_| AllocError::Timeout(self.store_timeout))?
            .map_err(AllocError::Store)?;

        let mut excluded: HashSet<Uuid> = seen.into_iter().collect();
        excluded.extend(caller_excludes.iter().copied());
        Ok(excluded)
    }
}
