//! The session token carried by the auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::auth::UserID;

/// Identifies the logged-in user until `expires_at`.
///
/// The expiry is stored as a Unix timestamp, so a token read back from a
/// cookie is in UTC and has no sub-second part.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub user_id: UserID,
    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A token for `user_id` that lasts `lifetime` from now.
    pub fn new(user_id: UserID, lifetime: Duration, local_offset: UtcOffset) -> Self {
        Self {
            user_id,
            expires_at: expiry_after(lifetime, local_offset),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < OffsetDateTime::now_utc()
    }

    /// The same session lasting `lifetime` from now, or `None` when this
    /// token already outlives that.
    pub fn extended(&self, lifetime: Duration, local_offset: UtcOffset) -> Option<Self> {
        let expires_at = expiry_after(lifetime, local_offset);

        (expires_at > self.expires_at).then_some(Self {
            user_id: self.user_id,
            expires_at,
        })
    }
}

/// Now plus `lifetime`, in `local_offset`, truncated to whole seconds to match
/// what survives serialization.
fn expiry_after(lifetime: Duration, local_offset: UtcOffset) -> OffsetDateTime {
    let expires_at = OffsetDateTime::now_utc().to_offset(local_offset) + lifetime;

    expires_at - Duration::nanoseconds(expires_at.nanosecond().into())
}
