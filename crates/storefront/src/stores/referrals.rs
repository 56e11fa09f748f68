//! Referral profile, referred users and the balance leaderboard.

use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use tg_store_core::{RecordId, UserId};

use super::{RequestStatus, lock, require_user, tracked};
use crate::error::Result;
use crate::gateway::conversions::convert_user_profile;
use crate::gateway::{Direction, DocumentStore, Query, USERS};
use crate::models::UserProfile;
use crate::notifications::NotificationChannel;

/// Leaderboard entries shown before the first "load more".
pub const LEADERBOARD_INITIAL_VISIBLE: usize = 15;
/// Entries added by each "load more".
pub const LEADERBOARD_PAGE_STEP: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralState {
    pub profile: Option<UserProfile>,
    /// Users referred by the current user, sorted by name.
    pub referred: Vec<UserProfile>,
    /// Highest balance first.
    pub leaderboard: Vec<UserProfile>,
    /// How many leaderboard entries are shown.
    pub visible: usize,
    pub status: RequestStatus,
}

impl Default for ReferralState {
    fn default() -> Self {
        Self {
            profile: None,
            referred: Vec::new(),
            leaderboard: Vec::new(),
            visible: LEADERBOARD_INITIAL_VISIBLE,
            status: RequestStatus::default(),
        }
    }
}

/// Referral state container. Clones share state.
#[derive(Clone)]
pub struct ReferralStore {
    inner: Arc<ReferralStoreInner>,
}

struct ReferralStoreInner {
    documents: Arc<dyn DocumentStore>,
    notifications: NotificationChannel,
    state: Mutex<ReferralState>,
}

impl ReferralStore {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, notifications: NotificationChannel) -> Self {
        Self {
            inner: Arc::new(ReferralStoreInner {
                documents,
                notifications,
                state: Mutex::new(ReferralState::default()),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ReferralState {
        lock(&self.inner.state).clone()
    }

    /// The shown slice of the leaderboard.
    #[must_use]
    pub fn visible_leaderboard(&self) -> Vec<UserProfile> {
        let state = lock(&self.inner.state);
        state
            .leaderboard
            .iter()
            .take(state.visible)
            .cloned()
            .collect()
    }

    /// Show seven more leaderboard entries.
    pub fn load_more(&self) {
        let mut state = lock(&self.inner.state);
        state.visible = state.visible.saturating_add(LEADERBOARD_PAGE_STEP);
    }

    /// Look up the user's profile. A missing document yields `None`.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank user id, `Network` if the gateway fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        self.track("referrals.fetch_profile", async {
            require_user(user_id)?;

            let profile = self
                .inner
                .documents
                .get(USERS, &RecordId::new(user_id.as_str()))
                .await?
                .as_ref()
                .map(convert_user_profile);
            if profile.is_none() {
                debug!("No profile document");
            }

            lock(&self.inner.state).profile.clone_from(&profile);
            Ok(profile)
        })
        .await
    }

    /// Users whose `referredBy` is this user, sorted by name.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank user id, `Network` if the gateway fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn fetch_referred(&self, user_id: &UserId) -> Result<Vec<UserProfile>> {
        self.track("referrals.fetch_referred", async {
            require_user(user_id)?;

            let mut referred: Vec<UserProfile> = self
                .inner
                .documents
                .query(USERS, &Query::new().where_eq("referredBy", user_id.as_str()))
                .await?
                .iter()
                .map(convert_user_profile)
                .collect();
            referred.sort_by_key(UserProfile::display_name);

            lock(&self.inner.state).referred.clone_from(&referred);
            Ok(referred)
        })
        .await
    }

    /// Top `limit` users by balance. Resets the visible window.
    ///
    /// # Errors
    ///
    /// `Network` if the gateway fails.
    #[instrument(skip(self))]
    pub async fn fetch_leaderboard(&self, limit: usize) -> Result<Vec<UserProfile>> {
        self.track("referrals.fetch_leaderboard", async {
            let leaderboard: Vec<UserProfile> = self
                .inner
                .documents
                .query(
                    USERS,
                    &Query::new()
                        .order_by_direction("balance", Direction::Desc)
                        .limit(limit),
                )
                .await?
                .iter()
                .map(convert_user_profile)
                .collect();

            let mut state = lock(&self.inner.state);
            state.leaderboard.clone_from(&leaderboard);
            state.visible = LEADERBOARD_INITIAL_VISIBLE;
            Ok(leaderboard)
        })
        .await
    }

    async fn track<T>(
        &self,
        name: &'static str,
        operation: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tracked(
            &self.inner.state,
            |s| &mut s.status,
            &self.inner.notifications,
            name,
            operation,
        )
        .await
    }
}
