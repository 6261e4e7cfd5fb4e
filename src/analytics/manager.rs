use chrono::Duration;

use crate::campaign::CampaignStatus;
use crate::clock::Clock;
use crate::database::Database;
use crate::error::Error;
use crate::event::EventType;
use crate::identity::Identity;
use crate::user::{Role, UserId};

use super::{
    conversion_rate, AdminAnalytics, CampaignPerformance, PlatformStats, UserAnalytics, UserStats,
};

/// Both dashboards chart the same trailing window.
const TIMELINE_WINDOW_DAYS: i64 = 30;

#[tracing::instrument(skip(db, clock))]
pub async fn user_analytics(
    db: &dyn Database,
    clock: &dyn Clock,
    owner: UserId,
) -> Result<UserAnalytics, Error> {
    let campaigns = db.campaigns().fetch_campaigns_by_owner(owner).await?;
    let campaign_ids: Vec<_> = campaigns.iter().map(|campaign| campaign.id).collect();

    let mut stats = UserStats {
        total_campaigns: campaigns.len() as u64,
        approved_campaigns: 0,
        pending_campaigns: 0,
        rejected_campaigns: 0,
        total_clicks: 0,
        total_submissions: 0,
        awareness_views: 0,
        conversion_rate: 0.0,
    };

    let mut performance = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        match campaign.status {
            CampaignStatus::Approved => stats.approved_campaigns += 1,
            CampaignStatus::Pending => stats.pending_campaigns += 1,
            CampaignStatus::Rejected => stats.rejected_campaigns += 1,
        }

        let ids = [campaign.id];
        let clicks = db
            .events()
            .count_events_by_campaigns(&ids, &EventType::CLICK_TYPES)
            .await?;
        let submissions = db
            .events()
            .count_events_by_campaigns(&ids, &[EventType::FormSubmitted.as_str()])
            .await?;
        let awareness_views = db
            .events()
            .count_events_by_campaigns(&ids, &[EventType::AwarenessViewed.as_str()])
            .await?;

        stats.total_clicks += clicks;
        stats.total_submissions += submissions;
        stats.awareness_views += awareness_views;

        performance.push(CampaignPerformance {
            id: campaign.id,
            title: campaign.title,
            status: campaign.status,
            clicks,
            submissions,
            awareness_views,
        });
    }

    stats.conversion_rate = conversion_rate(stats.total_clicks, stats.awareness_views);

    let since = clock.now() - Duration::days(TIMELINE_WINDOW_DAYS);
    let timeline = db
        .events()
        .aggregate_daily_counts(Some(&campaign_ids), since)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(UserAnalytics {
        stats,
        campaigns: performance,
        timeline,
    })
}

#[tracing::instrument(skip(db, clock))]
pub async fn admin_analytics(
    db: &dyn Database,
    clock: &dyn Clock,
    actor: Identity,
) -> Result<AdminAnalytics, Error> {
    actor.require_admin()?;

    let total_users = db.users().count_users_by_role(Role::User).await?
        + db.users().count_users_by_role(Role::Admin).await?;

    let total_campaigns = db.campaigns().count_campaigns(None).await?;
    let approved_campaigns = db
        .campaigns()
        .count_campaigns(Some(CampaignStatus::Approved))
        .await?;
    let pending_campaigns = db
        .campaigns()
        .count_campaigns(Some(CampaignStatus::Pending))
        .await?;
    let rejected_campaigns = db
        .campaigns()
        .count_campaigns(Some(CampaignStatus::Rejected))
        .await?;

    let total_events = db.events().count_all_events().await?;
    let total_clicks = db
        .events()
        .count_events_by_types(&EventType::CLICK_TYPES)
        .await?;
    let total_submissions = db
        .events()
        .count_events_by_types(&[EventType::FormSubmitted.as_str()])
        .await?;
    let total_conversions = db
        .events()
        .count_events_by_types(&[EventType::AwarenessViewed.as_str()])
        .await?;

    let distribution = db
        .campaigns()
        .aggregate_status_distribution()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let since = clock.now() - Duration::days(TIMELINE_WINDOW_DAYS);
    let timeline = db
        .events()
        .aggregate_daily_counts(None, since)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(AdminAnalytics {
        stats: PlatformStats {
            total_users,
            total_campaigns,
            approved_campaigns,
            pending_campaigns,
            rejected_campaigns,
            total_events,
            total_clicks,
            total_submissions,
            total_conversions,
            average_conversion_rate: conversion_rate(total_clicks, total_conversions),
        },
        distribution,
        timeline,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::campaign::{generate_tracking_token, Campaign, CampaignId};
    use crate::clock::test::FixedClock;
    use crate::database::test::MockDatabase;
    use crate::event::DailyCount;

    use super::*;

    fn sample_campaign(owner: UserId, status: CampaignStatus) -> Campaign {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        Campaign {
            id: CampaignId::new(),
            user_id: owner,
            title: "Q3 Password Audit".to_string(),
            description: String::new(),
            email_text: "Please verify your credentials".to_string(),
            landing_page_url: String::new(),
            tracking_token: generate_tracking_token(),
            status,
            expiry_date: None,
            admin_comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn user_dashboard_tallies_by_status_and_type() {
        let owner = UserId::new();

        let mut db = MockDatabase::new();
        db.campaigns.on_fetch_campaigns_by_owner = Box::new(move |_| {
            Ok(vec![
                sample_campaign(owner, CampaignStatus::Approved),
                sample_campaign(owner, CampaignStatus::Pending),
            ])
        });
        // 4 clicks, 1 submission, 1 awareness view per campaign.
        db.events.on_count_events_by_campaigns = Box::new(|_, event_types| {
            if event_types == EventType::CLICK_TYPES {
                Ok(4)
            } else {
                Ok(1)
            }
        });
        db.events.on_aggregate_daily_counts = Box::new(|ids, _| {
            assert_eq!(ids.map(<[CampaignId]>::len), Some(2));
            Ok(vec![DailyCount {
                date: "2026-03-01".to_string(),
                count: 10,
            }])
        });

        let clock = FixedClock::at(Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap());
        let analytics = user_analytics(&db, &clock, owner).await.unwrap();

        assert_eq!(analytics.stats.total_campaigns, 2);
        assert_eq!(analytics.stats.approved_campaigns, 1);
        assert_eq!(analytics.stats.pending_campaigns, 1);
        assert_eq!(analytics.stats.total_clicks, 8);
        assert_eq!(analytics.stats.total_submissions, 2);
        assert_eq!(analytics.stats.conversion_rate, 25.0);
        assert_eq!(analytics.campaigns.len(), 2);
        assert_eq!(analytics.timeline[0].date, "2026-03-01");
    }

    #[tokio::test]
    async fn conversion_rate_tracks_awareness_views_not_submissions() {
        let owner = UserId::new();

        let mut db = MockDatabase::new();
        db.campaigns.on_fetch_campaigns_by_owner =
            Box::new(move |_| Ok(vec![sample_campaign(owner, CampaignStatus::Approved)]));
        // 10 clicks, no submissions, 5 awareness views.
        db.events.on_count_events_by_campaigns = Box::new(|_, event_types| {
            if event_types == EventType::CLICK_TYPES {
                Ok(10)
            } else if event_types == [EventType::FormSubmitted.as_str()] {
                Ok(0)
            } else {
                Ok(5)
            }
        });
        db.events.on_aggregate_daily_counts = Box::new(|_, _| Ok(vec![]));

        let clock = FixedClock::at(Utc::now());
        let analytics = user_analytics(&db, &clock, owner).await.unwrap();

        assert_eq!(analytics.stats.total_submissions, 0);
        assert_eq!(analytics.stats.awareness_views, 5);
        assert_eq!(analytics.stats.conversion_rate, 50.0);
    }

    #[tokio::test]
    async fn timeline_window_is_thirty_days() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap();

        let mut db = MockDatabase::new();
        db.campaigns.on_fetch_campaigns_by_owner = Box::new(|_| Ok(vec![]));
        db.events.on_aggregate_daily_counts = Box::new(move |_, since| {
            assert_eq!(since, now - Duration::days(30));
            Ok(vec![])
        });

        let clock = FixedClock::at(now);
        user_analytics(&db, &clock, UserId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn admin_dashboard_requires_admin() {
        let db = MockDatabase::new();
        let clock = FixedClock::at(Utc::now());
        let actor = Identity {
            user_id: UserId::new(),
            role: Role::User,
        };

        assert_eq!(
            admin_analytics(&db, &clock, actor).await.unwrap_err(),
            Error::AdminRequired
        );
    }

    #[tokio::test]
    async fn admin_dashboard_aggregates_platform_totals() {
        let mut db = MockDatabase::new();
        db.users.on_count_users_by_role = Box::new(|role| match role {
            Role::User => Ok(40),
            Role::Admin => Ok(2),
        });
        db.campaigns.on_count_campaigns = Box::new(|status| match status {
            None => Ok(10),
            Some(CampaignStatus::Approved) => Ok(6),
            Some(CampaignStatus::Pending) => Ok(3),
            Some(CampaignStatus::Rejected) => Ok(1),
        });
        db.events.on_count_all_events = Box::new(|| Ok(500));
        db.events.on_count_events_by_types = Box::new(|event_types| {
            if event_types == EventType::CLICK_TYPES {
                Ok(200)
            } else if event_types == [EventType::FormSubmitted.as_str()] {
                Ok(50)
            } else {
                Ok(100)
            }
        });
        db.campaigns.on_aggregate_status_distribution = Box::new(|| Ok(vec![]));
        db.events.on_aggregate_daily_counts = Box::new(|ids, _| {
            assert!(ids.is_none());
            Ok(vec![])
        });

        let clock = FixedClock::at(Utc::now());
        let actor = Identity {
            user_id: UserId::new(),
            role: Role::Admin,
        };

        let analytics = admin_analytics(&db, &clock, actor).await.unwrap();

        assert_eq!(analytics.stats.total_users, 42);
        assert_eq!(analytics.stats.total_campaigns, 10);
        assert_eq!(analytics.stats.total_events, 500);
        assert_eq!(analytics.stats.total_submissions, 50);
        assert_eq!(analytics.stats.total_conversions, 100);
        assert_eq!(analytics.stats.average_conversion_rate, 50.0);
    }
}
