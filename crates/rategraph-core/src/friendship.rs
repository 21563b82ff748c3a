//! Directed follower -> followee index.

use crate::{SocialGraph, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One directed friendship edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FriendshipRecord {
    /// The following user.
    pub follower: UserId,
    /// The followed user.
    pub followee: UserId,
}

impl FriendshipRecord {
    /// Create a friendship record.
    pub fn new(follower: impl Into<UserId>, followee: impl Into<UserId>) -> Self {
        Self {
            follower: follower.into(),
            followee: followee.into(),
        }
    }
}

/// Map from each follower to the set of users they follow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendshipIndex {
    followings: BTreeMap<UserId, BTreeSet<UserId>>,
}

impl FriendshipIndex {
    /// Build the index. Duplicate records collapse.
    pub fn build(records: impl IntoIterator<Item = FriendshipRecord>) -> Self {
        let mut followings: BTreeMap<UserId, BTreeSet<UserId>> = BTreeMap::new();
        for record in records {
            followings
                .entry(record.follower)
                .or_default()
                .insert(record.followee);
        }
        Self { followings }
    }

    /// Users followed by `follower`, or `None` if there is no record for them.
    pub fn followings(&self, follower: &UserId) -> Option<&BTreeSet<UserId>> {
        self.followings.get(follower)
    }

    /// Remove every followee that is not a node of `graph`.
    ///
    /// Followers keep their (possibly now empty) entry. Returns the number of
    /// followee references removed.
    pub fn prune(&mut self, graph: &SocialGraph) -> usize {
        let mut removed = 0;
        for followees in self.followings.values_mut() {
            let before = followees.len();
            followees.retain(|followee| graph.contains(followee));
            removed += before - followees.len();
        }
        tracing::debug!(removed, "pruned dangling followees");
        removed
    }

    /// Number of followers with a record.
    pub fn len(&self) -> usize {
        self.followings.len()
    }

    /// Whether the index has no records.
    pub fn is_empty(&self) -> bool {
        self.followings.is_empty()
    }

    /// Iterate over `(follower, followees)`.
    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &BTreeSet<UserId>)> {
        self.followings.iter()
    }
}
