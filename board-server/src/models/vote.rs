use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Like,
    Dislike,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Like => "like",
            VoteKind::Dislike => "dislike",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(VoteKind::Like),
            "dislike" => Ok(VoteKind::Dislike),
            other => Err(format!("unknown vote type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Added,
    Removed,
    Changed,
}

/// What a vote request does to the (post, address) pair.
///
/// `likes_delta` and `dislikes_delta` are the counter adjustments on the post;
/// `resulting` is the active vote once the transition is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub action: VoteAction,
    pub previous: Option<VoteKind>,
    pub resulting: Option<VoteKind>,
    pub likes_delta: i64,
    pub dislikes_delta: i64,
}

impl VoteTransition {
    pub fn plan(current: Option<VoteKind>, requested: VoteKind) -> Self {
        let (action, resulting) = match current {
            None => (VoteAction::Added, Some(requested)),
            Some(existing) if existing == requested => (VoteAction::Removed, None),
            Some(_) => (VoteAction::Changed, Some(requested)),
        };

        let mut likes_delta = 0;
        let mut dislikes_delta = 0;
        for (kind, delta) in [(current, -1), (resulting, 1)] {
            match kind {
                Some(VoteKind::Like) => likes_delta += delta,
                Some(VoteKind::Dislike) => dislikes_delta += delta,
                None => {}
            }
        }

        Self {
            action,
            previous: current,
            resulting,
            likes_delta,
            dislikes_delta,
        }
    }

    pub fn message(&self) -> &'static str {
        match (self.action, self.resulting.or(self.previous)) {
            (VoteAction::Added, Some(VoteKind::Like)) => "Liked the post.",
            (VoteAction::Added, _) => "Disliked the post.",
            (VoteAction::Removed, Some(VoteKind::Like)) => "Like withdrawn.",
            (VoteAction::Removed, _) => "Dislike withdrawn.",
            (VoteAction::Changed, Some(VoteKind::Like)) => "Changed dislike to like.",
            (VoteAction::Changed, _) => "Changed like to dislike.",
        }
    }
}

/// Result of a vote request, including the post's fresh counters.
#[derive(Debug, Clone, Serialize)]
pub struct VoteOutcome {
    pub post_id: i64,
    pub action: VoteAction,
    pub current_vote: Option<VoteKind>,
    pub likes: i64,
    pub dislikes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_vote_adds_and_increments() {
        let t = VoteTransition::plan(None, VoteKind::Like);
        assert_eq!(t.action, VoteAction::Added);
        assert_eq!(t.resulting, Some(VoteKind::Like));
        assert_eq!((t.likes_delta, t.dislikes_delta), (1, 0));
    }

    #[test]
    fn same_vote_twice_retracts() {
        let t = VoteTransition::plan(Some(VoteKind::Dislike), VoteKind::Dislike);
        assert_eq!(t.action, VoteAction::Removed);
        assert_eq!(t.resulting, None);
        assert_eq!((t.likes_delta, t.dislikes_delta), (0, -1));
        assert_eq!(t.message(), "Dislike withdrawn.");
    }

    #[test]
    fn opposite_vote_moves_counters() {
        let t = VoteTransition::plan(Some(VoteKind::Like), VoteKind::Dislike);
        assert_eq!(t.action, VoteAction::Changed);
        assert_eq!(t.resulting, Some(VoteKind::Dislike));
        assert_eq!((t.likes_delta, t.dislikes_delta), (-1, 1));
        assert_eq!(t.message(), "Changed like to dislike.");
    }

    #[test]
    fn add_then_retract_nets_to_zero() {
        let add = VoteTransition::plan(None, VoteKind::Like);
        let retract = VoteTransition::plan(add.resulting, VoteKind::Like);
        assert_eq!(retract.resulting, None);
        assert_eq!(add.likes_delta + retract.likes_delta, 0);
        assert_eq!(add.dislikes_delta + retract.dislikes_delta, 0);
    }

    #[test]
    fn parses_only_known_kinds() {
        assert_eq!("like".parse::<VoteKind>(), Ok(VoteKind::Like));
        assert_eq!("dislike".parse::<VoteKind>(), Ok(VoteKind::Dislike));
        assert!("LIKE".parse::<VoteKind>().is_err());
        assert!("".parse::<VoteKind>().is_err());
    }
}
