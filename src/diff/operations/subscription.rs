//! Subscription operations

use super::{CommentOperation, CommentTarget};
use crate::catalog::id::DbObjectId;
use crate::catalog::subscription::Subscription;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionIdentifier {
    pub name: String,
}

impl SubscriptionIdentifier {
    pub fn from_subscription(subscription: &Subscription) -> Self {
        Self {
            name: subscription.name.clone(),
        }
    }
}

impl CommentTarget for SubscriptionIdentifier {
    const OBJECT_TYPE: &'static str = "SUBSCRIPTION";

    fn identifier(&self) -> String {
        format!("\"{}\"", self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Subscription {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SubscriptionOperation {
    Create {
        subscription: Subscription,
    },
    Drop {
        identifier: SubscriptionIdentifier,
    },
    Alter {
        old_subscription: Subscription,
        new_subscription: Subscription,
    },
    Comment(CommentOperation<SubscriptionIdentifier>),
}
