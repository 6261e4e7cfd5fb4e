use serde::Serialize;

use crate::user::UserId;

pub mod endpoints;
pub mod manager;

/// How many participants the board shows.
pub const LEADERBOARD_LIMIT: usize = 50;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub email: String,
    pub total_campaigns: u64,
    pub total_clicks: u64,
    pub total_conversions: u64,
    pub rejected_count: u64,
    pub score: i64,
}

/// Clicks reward reach, conversions reward effectiveness, rejections cost
/// more than either earns.
pub fn score(clicks: u64, conversions: u64, rejected: u64) -> i64 {
    clicks as i64 * 2 + conversions as i64 * 5 - rejected as i64 * 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_weights_clicks_conversions_and_rejections() {
        assert_eq!(score(10, 2, 1), 20);
    }

    #[test]
    fn score_can_go_negative() {
        assert_eq!(score(0, 0, 3), -30);
    }
}
