use serde::Serialize;

use crate::campaign::{CampaignId, CampaignStatus, StatusCount};
use crate::event::DailyCount;

pub mod endpoints;
pub mod manager;

/// Headline numbers for one owner's campaigns.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UserStats {
    pub total_campaigns: u64,
    pub approved_campaigns: u64,
    pub pending_campaigns: u64,
    pub rejected_campaigns: u64,
    pub total_clicks: u64,
    pub total_submissions: u64,
    pub awareness_views: u64,
    pub conversion_rate: f64,
}

/// Per-campaign event tallies for the owner dashboard.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CampaignPerformance {
    pub id: CampaignId,
    pub title: String,
    pub status: CampaignStatus,
    pub clicks: u64,
    pub submissions: u64,
    pub awareness_views: u64,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TimelineEntry {
    pub date: String,
    pub count: i64,
}

impl From<DailyCount> for TimelineEntry {
    fn from(bucket: DailyCount) -> TimelineEntry {
        TimelineEntry {
            date: bucket.date,
            count: bucket.count,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct StatusDistributionEntry {
    pub status: CampaignStatus,
    pub count: i64,
}

impl From<StatusCount> for StatusDistributionEntry {
    fn from(bucket: StatusCount) -> StatusDistributionEntry {
        StatusDistributionEntry {
            status: bucket.status,
            count: bucket.count,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UserAnalytics {
    pub stats: UserStats,
    pub campaigns: Vec<CampaignPerformance>,
    pub timeline: Vec<TimelineEntry>,
}

/// Platform-wide numbers for the admin dashboard.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_campaigns: u64,
    pub approved_campaigns: u64,
    pub pending_campaigns: u64,
    pub rejected_campaigns: u64,
    pub total_events: u64,
    pub total_clicks: u64,
    pub total_submissions: u64,
    pub total_conversions: u64,
    pub average_conversion_rate: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AdminAnalytics {
    pub stats: PlatformStats,
    pub distribution: Vec<StatusDistributionEntry>,
    pub timeline: Vec<TimelineEntry>,
}

/// Share of opened links that went all the way to the awareness page, as a
/// percentage. Zero clicks yields zero rather than a division error.
pub fn conversion_rate(clicks: u64, awareness_views: u64) -> f64 {
    if clicks == 0 {
        return 0.0;
    }

    awareness_views as f64 / clicks as f64 * 100.0
}
