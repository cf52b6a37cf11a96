//! Codes indicating that the event subscription stream has been severed.
//!
//! The set is process-wide and starts out holding [`Code::UNSUBSCRIBED`].
//! Clients that discover further codes guaranteeing subscription loss can
//! register them at runtime with [`add_subscription_loss_code`] instead of
//! patching this crate.
//!
//! Membership tests take a shared read lock and run on every
//! [`ApiError::subscription_loss`](crate::ApiError::subscription_loss) call.
//! Registration takes the write lock and is expected to be rare, typically
//! during startup (see [`ClassifierConfig::apply`](crate::config::ClassifierConfig::apply)).

use std::collections::HashSet;
use std::sync::{LazyLock, PoisonError, RwLock};

#[cfg(feature = "telemetry")]
use tracing::info;

use crate::code::Code;

static CODES_INDICATING_SUBSCRIPTION_LOSS: LazyLock<RwLock<HashSet<Code>>> =
    LazyLock::new(|| RwLock::new(HashSet::from([Code::UNSUBSCRIBED])));

/// Registers `code` as indicating subscription loss.
///
/// Returns `true` if the code was not already registered.
pub fn add_subscription_loss_code(code: Code) -> bool {
    let added = CODES_INDICATING_SUBSCRIPTION_LOSS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(code);
    #[cfg(feature = "telemetry")]
    if added {
        info!(code = code.as_u16(), "Registered subscription loss code");
    }
    added
}

/// Removes `code` from the subscription loss set.
///
/// Returns `true` if the code was registered.
pub fn remove_subscription_loss_code(code: Code) -> bool {
    let removed = CODES_INDICATING_SUBSCRIPTION_LOSS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&code);
    #[cfg(feature = "telemetry")]
    if removed {
        info!(code = code.as_u16(), "Removed subscription loss code");
    }
    removed
}

/// Returns `true` if `code` is currently registered as indicating
/// subscription loss.
#[must_use]
pub fn is_subscription_loss_code(code: Code) -> bool {
    CODES_INDICATING_SUBSCRIPTION_LOSS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(&code)
}

/// Returns a sorted snapshot of the registered codes.
#[must_use]
pub fn subscription_loss_codes() -> Vec<Code> {
    let mut codes: Vec<Code> = CODES_INDICATING_SUBSCRIPTION_LOSS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .copied()
        .collect();
    codes.sort_unstable();
    codes
}
