use mongodb::{Collection, Database as MongoDb};

use crate::audit::db::AuditLogStore;
use crate::audit::AuditLog;
use crate::campaign::db::CampaignStore;
use crate::campaign::Campaign;
use crate::error::Error;
use crate::event::db::EventStore;
use crate::event::Event;
use crate::user::db::UserStore;
use crate::user::User;
use crate::{audit, campaign, event, user};

pub type MongoUserStore = Collection<User>;
pub type MongoCampaignStore = Collection<Campaign>;
pub type MongoEventStore = Collection<Event>;
pub type MongoAuditLogStore = Collection<AuditLog>;

/// The persistence seam. Managers only ever see this trait, so tests can
/// substitute `test::MockDatabase`.
pub trait Database: Send + Sync {
    fn users(&self) -> &dyn UserStore;
    fn campaigns(&self) -> &dyn CampaignStore;
    fn events(&self) -> &dyn EventStore;
    fn audit_logs(&self) -> &dyn AuditLogStore;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    users: Collection<User>,
    campaigns: Collection<Campaign>,
    events: Collection<Event>,
    audit_logs: Collection<AuditLog>,
}

impl MongoDatabase {
    /// Creates the collection indexes (unique tracking token, unique user
    /// email, event and audit lookup indexes) and hands back the typed
    /// collection handles.
    pub async fn initialize(db: MongoDb) -> Result<MongoDatabase, Error> {
        user::db::initialize(&db).await?;
        campaign::db::initialize(&db).await?;
        event::db::initialize(&db).await?;
        audit::db::initialize(&db).await?;

        Ok(MongoDatabase {
            users: db.collection("users"),
            campaigns: db.collection("campaigns"),
            events: db.collection("events"),
            audit_logs: db.collection("audit_logs"),
        })
    }
}

impl Database for MongoDatabase {
    fn users(&self) -> &dyn UserStore {
        &self.users
    }

    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn events(&self) -> &dyn EventStore {
        &self.events
    }

    fn audit_logs(&self) -> &dyn AuditLogStore {
        &self.audit_logs
    }
}

#[cfg(test)]
pub mod test {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::campaign::{CampaignContent, CampaignId, CampaignStatus, StatusCount};
    use crate::event::{DailyCount, EventType};
    use crate::user::{Role, UserId};

    /// Every hook panics until a test installs its own closure, so a test
    /// only has to describe the calls it expects.
    pub struct MockDatabase {
        pub users: MockUserStore,
        pub campaigns: MockCampaignStore,
        pub events: MockEventStore,
        pub audit_logs: MockAuditLogStore,
    }

    impl MockDatabase {
        pub fn new() -> MockDatabase {
            MockDatabase {
                users: MockUserStore::new(),
                campaigns: MockCampaignStore::new(),
                events: MockEventStore::new(),
                audit_logs: MockAuditLogStore::new(),
            }
        }
    }

    impl Database for MockDatabase {
        fn users(&self) -> &dyn UserStore {
            &self.users
        }

        fn campaigns(&self) -> &dyn CampaignStore {
            &self.campaigns
        }

        fn events(&self) -> &dyn EventStore {
            &self.events
        }

        fn audit_logs(&self) -> &dyn AuditLogStore {
            &self.audit_logs
        }
    }

    pub struct MockUserStore {
        pub on_fetch_users: Box<dyn Fn() -> Result<Vec<User>, Error> + Send + Sync>,
        pub on_fetch_users_by_role: Box<dyn Fn(Role) -> Result<Vec<User>, Error> + Send + Sync>,
        pub on_fetch_user_by_id: Box<dyn Fn(UserId) -> Result<Option<User>, Error> + Send + Sync>,
        pub on_count_users_by_role: Box<dyn Fn(Role) -> Result<u64, Error> + Send + Sync>,
        pub on_delete_user: Box<dyn Fn(UserId) -> Result<(), Error> + Send + Sync>,
    }

    impl MockUserStore {
        pub fn new() -> MockUserStore {
            MockUserStore {
                on_fetch_users: Box::new(|| panic!("unexpected call to fetch_users")),
                on_fetch_users_by_role: Box::new(|_| panic!("unexpected call to fetch_users_by_role")),
                on_fetch_user_by_id: Box::new(|_| panic!("unexpected call to fetch_user_by_id")),
                on_count_users_by_role: Box::new(|_| panic!("unexpected call to count_users_by_role")),
                on_delete_user: Box::new(|_| panic!("unexpected call to delete_user")),
            }
        }
    }

    #[async_trait]
    impl UserStore for MockUserStore {
        async fn fetch_users(&self) -> Result<Vec<User>, Error> {
            (self.on_fetch_users)()
        }

        async fn fetch_users_by_role(&self, role: Role) -> Result<Vec<User>, Error> {
            (self.on_fetch_users_by_role)(role)
        }

        async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error> {
            (self.on_fetch_user_by_id)(user_id)
        }

        async fn count_users_by_role(&self, role: Role) -> Result<u64, Error> {
            (self.on_count_users_by_role)(role)
        }

        async fn delete_user(&self, user_id: UserId) -> Result<(), Error> {
            (self.on_delete_user)(user_id)
        }
    }

    pub struct MockCampaignStore {
        pub on_insert_campaign: Box<dyn Fn(&Campaign) -> Result<(), Error> + Send + Sync>,
        pub on_fetch_campaigns_by_owner:
            Box<dyn Fn(UserId) -> Result<Vec<Campaign>, Error> + Send + Sync>,
        pub on_fetch_all_campaigns: Box<dyn Fn() -> Result<Vec<Campaign>, Error> + Send + Sync>,
        pub on_fetch_campaign_by_id:
            Box<dyn Fn(CampaignId) -> Result<Option<Campaign>, Error> + Send + Sync>,
        pub on_fetch_campaign_by_token:
            Box<dyn Fn(&str) -> Result<Option<Campaign>, Error> + Send + Sync>,
        pub on_fetch_campaign_ids_by_owner:
            Box<dyn Fn(UserId) -> Result<Vec<CampaignId>, Error> + Send + Sync>,
        pub on_update_campaign_content: Box<
            dyn Fn(Campaign, CampaignContent, DateTime<Utc>) -> Result<Campaign, Error>
                + Send
                + Sync,
        >,
        pub on_update_campaign_status: Box<
            dyn Fn(Campaign, CampaignStatus, String, DateTime<Utc>) -> Result<Campaign, Error>
                + Send
                + Sync,
        >,
        pub on_delete_campaign: Box<dyn Fn(CampaignId) -> Result<(), Error> + Send + Sync>,
        pub on_delete_campaigns_by_owner: Box<dyn Fn(UserId) -> Result<(), Error> + Send + Sync>,
        pub on_count_campaigns_by_owner:
            Box<dyn Fn(UserId, Option<CampaignStatus>) -> Result<u64, Error> + Send + Sync>,
        pub on_count_campaigns:
            Box<dyn Fn(Option<CampaignStatus>) -> Result<u64, Error> + Send + Sync>,
        pub on_aggregate_status_distribution:
            Box<dyn Fn() -> Result<Vec<StatusCount>, Error> + Send + Sync>,
    }

    impl MockCampaignStore {
        pub fn new() -> MockCampaignStore {
            MockCampaignStore {
                on_insert_campaign: Box::new(|_| panic!("unexpected call to insert_campaign")),
                on_fetch_campaigns_by_owner: Box::new(|_| {
                    panic!("unexpected call to fetch_campaigns_by_owner")
                }),
                on_fetch_all_campaigns: Box::new(|| {
                    panic!("unexpected call to fetch_all_campaigns")
                }),
                on_fetch_campaign_by_id: Box::new(|_| {
                    panic!("unexpected call to fetch_campaign_by_id")
                }),
                on_fetch_campaign_by_token: Box::new(|_| {
                    panic!("unexpected call to fetch_campaign_by_token")
                }),
                on_fetch_campaign_ids_by_owner: Box::new(|_| {
                    panic!("unexpected call to fetch_campaign_ids_by_owner")
                }),
                on_update_campaign_content: Box::new(|_, _, _| {
                    panic!("unexpected call to update_campaign_content")
                }),
                on_update_campaign_status: Box::new(|_, _, _, _| {
                    panic!("unexpected call to update_campaign_status")
                }),
                on_delete_campaign: Box::new(|_| panic!("unexpected call to delete_campaign")),
                on_delete_campaigns_by_owner: Box::new(|_| {
                    panic!("unexpected call to delete_campaigns_by_owner")
                }),
                on_count_campaigns_by_owner: Box::new(|_, _| {
                    panic!("unexpected call to count_campaigns_by_owner")
                }),
                on_count_campaigns: Box::new(|_| panic!("unexpected call to count_campaigns")),
                on_aggregate_status_distribution: Box::new(|| {
                    panic!("unexpected call to aggregate_status_distribution")
                }),
            }
        }
    }

    #[async_trait]
    impl CampaignStore for MockCampaignStore {
        async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
            (self.on_insert_campaign)(campaign)
        }

        async fn fetch_campaigns_by_owner(&self, owner: UserId) -> Result<Vec<Campaign>, Error> {
            (self.on_fetch_campaigns_by_owner)(owner)
        }

        async fn fetch_all_campaigns(&self) -> Result<Vec<Campaign>, Error> {
            (self.on_fetch_all_campaigns)()
        }

        async fn fetch_campaign_by_id(
            &self,
            campaign_id: CampaignId,
        ) -> Result<Option<Campaign>, Error> {
            (self.on_fetch_campaign_by_id)(campaign_id)
        }

        async fn fetch_campaign_by_token(&self, token: &str) -> Result<Option<Campaign>, Error> {
            (self.on_fetch_campaign_by_token)(token)
        }

        async fn fetch_campaign_ids_by_owner(
            &self,
            owner: UserId,
        ) -> Result<Vec<CampaignId>, Error> {
            (self.on_fetch_campaign_ids_by_owner)(owner)
        }

        async fn update_campaign_content(
            &self,
            campaign: Campaign,
            content: CampaignContent,
            now: DateTime<Utc>,
        ) -> Result<Campaign, Error> {
            (self.on_update_campaign_content)(campaign, content, now)
        }

        async fn update_campaign_status(
            &self,
            campaign: Campaign,
            status: CampaignStatus,
            comment: String,
            now: DateTime<Utc>,
        ) -> Result<Campaign, Error> {
            (self.on_update_campaign_status)(campaign, status, comment, now)
        }

        async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
            (self.on_delete_campaign)(campaign_id)
        }

        async fn delete_campaigns_by_owner(&self, owner: UserId) -> Result<(), Error> {
            (self.on_delete_campaigns_by_owner)(owner)
        }

        async fn count_campaigns_by_owner(
            &self,
            owner: UserId,
            status: Option<CampaignStatus>,
        ) -> Result<u64, Error> {
            (self.on_count_campaigns_by_owner)(owner, status)
        }

        async fn count_campaigns(&self, status: Option<CampaignStatus>) -> Result<u64, Error> {
            (self.on_count_campaigns)(status)
        }

        async fn aggregate_status_distribution(&self) -> Result<Vec<StatusCount>, Error> {
            (self.on_aggregate_status_distribution)()
        }
    }

    pub struct MockEventStore {
        pub on_insert_event: Box<dyn Fn(&Event) -> Result<(), Error> + Send + Sync>,
        pub on_count_recent_events: Box<
            dyn Fn(CampaignId, EventType, &str, DateTime<Utc>) -> Result<u64, Error>
                + Send
                + Sync,
        >,
        pub on_count_events_by_campaigns:
            Box<dyn Fn(&[CampaignId], &[&str]) -> Result<u64, Error> + Send + Sync>,
        pub on_count_events_by_types:
            Box<dyn Fn(&[&str]) -> Result<u64, Error> + Send + Sync>,
        pub on_count_all_events: Box<dyn Fn() -> Result<u64, Error> + Send + Sync>,
        pub on_aggregate_daily_counts: Box<
            dyn Fn(Option<&[CampaignId]>, DateTime<Utc>) -> Result<Vec<DailyCount>, Error>
                + Send
                + Sync,
        >,
        pub on_delete_events_by_campaigns:
            Box<dyn Fn(&[CampaignId]) -> Result<(), Error> + Send + Sync>,
    }

    impl MockEventStore {
        pub fn new() -> MockEventStore {
            MockEventStore {
                on_insert_event: Box::new(|_| panic!("unexpected call to insert_event")),
                on_count_recent_events: Box::new(|_, _, _, _| {
                    panic!("unexpected call to count_recent_events")
                }),
                on_count_events_by_campaigns: Box::new(|_, _| {
                    panic!("unexpected call to count_events_by_campaigns")
                }),
                on_count_events_by_types: Box::new(|_| {
                    panic!("unexpected call to count_events_by_types")
                }),
                on_count_all_events: Box::new(|| panic!("unexpected call to count_all_events")),
                on_aggregate_daily_counts: Box::new(|_, _| {
                    panic!("unexpected call to aggregate_daily_counts")
                }),
                on_delete_events_by_campaigns: Box::new(|_| {
                    panic!("unexpected call to delete_events_by_campaigns")
                }),
            }
        }
    }

    #[async_trait]
    impl EventStore for MockEventStore {
        async fn insert_event(&self, event: &Event) -> Result<(), Error> {
            (self.on_insert_event)(event)
        }

        async fn count_recent_events(
            &self,
            campaign_id: CampaignId,
            event_type: EventType,
            ip_address: &str,
            since: DateTime<Utc>,
        ) -> Result<u64, Error> {
            (self.on_count_recent_events)(campaign_id, event_type, ip_address, since)
        }

        async fn count_events_by_campaigns(
            &self,
            campaign_ids: &[CampaignId],
            event_types: &[&str],
        ) -> Result<u64, Error> {
            (self.on_count_events_by_campaigns)(campaign_ids, event_types)
        }

        async fn count_events_by_types(&self, event_types: &[&str]) -> Result<u64, Error> {
            (self.on_count_events_by_types)(event_types)
        }

        async fn count_all_events(&self) -> Result<u64, Error> {
            (self.on_count_all_events)()
        }

        async fn aggregate_daily_counts(
            &self,
            campaign_ids: Option<&[CampaignId]>,
            since: DateTime<Utc>,
        ) -> Result<Vec<DailyCount>, Error> {
            (self.on_aggregate_daily_counts)(campaign_ids, since)
        }

        async fn delete_events_by_campaigns(
            &self,
            campaign_ids: &[CampaignId],
        ) -> Result<(), Error> {
            (self.on_delete_events_by_campaigns)(campaign_ids)
        }
    }

    pub struct MockAuditLogStore {
        pub on_insert_audit_log: Box<dyn Fn(&AuditLog) -> Result<(), Error> + Send + Sync>,
        pub on_fetch_audit_logs: Box<dyn Fn(i64) -> Result<Vec<AuditLog>, Error> + Send + Sync>,
    }

    impl MockAuditLogStore {
        pub fn new() -> MockAuditLogStore {
            MockAuditLogStore {
                on_insert_audit_log: Box::new(|_| panic!("unexpected call to insert_audit_log")),
                on_fetch_audit_logs: Box::new(|_| panic!("unexpected call to fetch_audit_logs")),
            }
        }
    }

    #[async_trait]
    impl AuditLogStore for MockAuditLogStore {
        async fn insert_audit_log(&self, entry: &AuditLog) -> Result<(), Error> {
            (self.on_insert_audit_log)(entry)
        }

        async fn fetch_audit_logs(&self, limit: i64) -> Result<Vec<AuditLog>, Error> {
            (self.on_fetch_audit_logs)(limit)
        }
    }
}
