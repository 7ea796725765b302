//! Subscription tokens

use super::registry::SubscriptionCell;
use super::SubscriptionId;
use std::fmt;
use std::rc::Rc;

/// Owning handle for a subscription
///
/// While the token is alive its subscriber receives events. Dropping the
/// token, or calling [`Token::cancel`], ends the subscription for good.
#[must_use = "dropping a Token immediately unsubscribes its subscriber"]
pub struct Token {
    id: SubscriptionId,
    cell: Option<Rc<SubscriptionCell>>,
}

impl Token {
    pub(crate) fn new(cell: Rc<SubscriptionCell>) -> Self {
        Self {
            id: cell.id(),
            cell: Some(cell),
        }
    }

    /// Id of the subscription this token controls
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Check whether the subscription is still live
    pub fn is_active(&self) -> bool {
        self.cell.is_some()
    }

    /// End the subscription without dropping the token
    ///
    /// Idempotent. If the subscriber is executing right now it finishes its
    /// current call and is never invoked again.
    pub fn cancel(&mut self) {
        if self.cell.take().is_some() {
            log::trace!("subscription {} cancelled", self.id);
        }
    }
}

impl Drop for Token {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
