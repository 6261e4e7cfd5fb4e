use serde::Serialize;

use crate::campaign::CampaignId;

pub mod endpoints;
pub mod manager;

/// What the anonymous landing endpoint hands to the frontend. Deliberately
/// free of owner information.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LandingPage {
    pub campaign_id: CampaignId,
    pub title: String,
    pub landing_url: String,
    pub token: String,
}

/// Acknowledgement of a simulated form submission, pointing the visitor at
/// the awareness step.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub redirect: String,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AwarenessPage {
    pub campaign_id: CampaignId,
    pub message: String,
    pub content: AwarenessContent,
}

/// The training payload shown at the end of the simulation flow.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AwarenessContent {
    pub title: String,
    pub description: String,
    pub tips: Vec<String>,
}

impl AwarenessContent {
    pub fn standard() -> AwarenessContent {
        AwarenessContent {
            title: "How to Spot a Phishing Attempt".to_string(),
            description: "This was a simulated phishing exercise run by your organization. \
                          No credentials were collected."
                .to_string(),
            tips: vec![
                "Check the sender's address carefully before acting on an email".to_string(),
                "Hover over links to inspect the real destination before clicking".to_string(),
                "Be suspicious of urgency, threats, or unexpected requests for credentials"
                    .to_string(),
                "When in doubt, report the email to your security team".to_string(),
            ],
        }
    }
}
