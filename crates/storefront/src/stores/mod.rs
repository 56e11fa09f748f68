//! Client-side state containers.
//!
//! Each store owns a local projection of remote data plus a coarse
//! [`RequestStatus`]. Operations follow one lifecycle:
//!
//! - pending: `loading = true`, `error = None`
//! - fulfilled: `loading = false`
//! - rejected: `loading = false`, `error = Some(..)`, error notification
//!
//! The remote call is always awaited before local state changes. Local state
//! sits behind a `std::sync::Mutex` that is never held across an await.

pub mod cart;
pub mod catalog;
pub mod history;
pub mod orders;
pub mod referrals;

pub use cart::{CartState, CartStore};
pub use catalog::{CatalogState, CatalogStore, PRODUCTS_PAGE_SIZE};
pub use history::{OrderHistory, OrderHistoryState};
pub use orders::{Checkout, CheckoutState};
pub use referrals::{ReferralState, ReferralStore};

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tg_store_core::UserId;

use crate::error::{Result, StoreError};
use crate::notifications::NotificationChannel;

/// Toast shown for failures that carry no server message.
pub const FALLBACK_MESSAGE: &str = "Please try again later";

/// Loading flag and last error of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl RequestStatus {
    fn pending(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn fulfilled(&mut self) {
        self.loading = false;
    }

    fn rejected(&mut self, error: String) {
        self.loading = false;
        self.error = Some(error);
    }
}

pub(crate) fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The signed-in user, or `Validation` if it is absent or blank.
///
/// Accepts either `&UserId` or `Option<&UserId>`.
pub(crate) fn require_user<'a>(user_id: impl Into<Option<&'a UserId>>) -> Result<&'a UserId> {
    user_id
        .into()
        .filter(|id| !id.is_blank())
        .ok_or_else(|| StoreError::validation("User ID is missing"))
}

/// Run `operation` through the pending/fulfilled/rejected lifecycle.
///
/// `status` selects which flag pair of `S` the operation drives. Failures are
/// reported and turned into an error notification.
pub(crate) async fn tracked<S, T, F>(
    state: &Mutex<S>,
    status: fn(&mut S) -> &mut RequestStatus,
    notifications: &NotificationChannel,
    name: &'static str,
    operation: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    status(&mut lock(state)).pending();

    let result = operation.await;

    match &result {
        Ok(_) => status(&mut lock(state)).fulfilled(),
        Err(err) => {
            status(&mut lock(state)).rejected(err.to_string());
            err.report(name);
            notifications.enqueue(err.notification(FALLBACK_MESSAGE));
        }
    }

    result
}
