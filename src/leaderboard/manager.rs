use crate::campaign::CampaignStatus;
use crate::database::Database;
use crate::error::Error;
use crate::event::EventType;
use crate::identity::Identity;
use crate::user::Role;

use super::{score, LeaderboardEntry, LEADERBOARD_LIMIT};

/// Scores every participant and returns the top of the board, best first.
/// Admins are excluded as players.
#[tracing::instrument(skip(db))]
pub async fn get_leaderboard(
    db: &dyn Database,
    actor: Identity,
) -> Result<Vec<LeaderboardEntry>, Error> {
    actor.require_admin()?;

    let participants = db.users().fetch_users_by_role(Role::User).await?;

    let mut entries = Vec::with_capacity(participants.len());
    for participant in participants {
        let campaign_ids = db
            .campaigns()
            .fetch_campaign_ids_by_owner(participant.id)
            .await?;

        let (total_clicks, total_conversions) = if campaign_ids.is_empty() {
            (0, 0)
        } else {
            let clicks = db
                .events()
                .count_events_by_campaigns(&campaign_ids, &EventType::CLICK_TYPES)
                .await?;
            // A conversion is a completed run of the flow, i.e. the visitor
            // reached the awareness page.
            let conversions = db
                .events()
                .count_events_by_campaigns(&campaign_ids, &[EventType::AwarenessViewed.as_str()])
                .await?;
            (clicks, conversions)
        };

        let rejected_count = db
            .campaigns()
            .count_campaigns_by_owner(participant.id, Some(CampaignStatus::Rejected))
            .await?;

        entries.push(LeaderboardEntry {
            user_id: participant.id,
            email: participant.email,
            total_campaigns: campaign_ids.len() as u64,
            total_clicks,
            total_conversions,
            rejected_count,
            score: score(total_clicks, total_conversions, rejected_count),
        });
    }

    // Ties rank in a stable, id-derived order so repeated reads agree.
    entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.user_id.cmp(&b.user_id)));
    entries.truncate(LEADERBOARD_LIMIT);

    Ok(entries)
}
