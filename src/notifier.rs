use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::campaign::CampaignStatus;
use crate::error::Error;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// How long a request handler is willing to wait on an email before handing
/// the send off to the background.
const SHARE_SEND_BUDGET: Duration = Duration::from_millis(100);

#[async_trait]
pub trait Notifier: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), Error>;
}

/// Delivers email through the Resend HTTP API.
pub struct ResendNotifier {
    http: reqwest::Client,
    api_key: String,
    from_email: String,
}

impl ResendNotifier {
    pub fn new(api_key: String, from_email: String) -> ResendNotifier {
        ResendNotifier {
            http: reqwest::Client::new(),
            api_key,
            from_email,
        }
    }
}

#[derive(Serialize)]
struct ResendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl Notifier for ResendNotifier {
    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), Error> {
        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&ResendEmailRequest {
                from: &self.from_email,
                to: [to],
                subject,
                html,
            })
            .send()
            .await
            .map_err(|err| Error::NotificationFailed {
                reason: err.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::NotificationFailed {
                reason: format!("resend returned {}: {}", status, body),
            });
        }

        Ok(())
    }
}

/// Stands in when no email credentials were provided; every send fails.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    fn is_configured(&self) -> bool {
        false
    }

    async fn send(&self, to: &str, _subject: &str, _html: &str) -> Result<(), Error> {
        tracing::warn!("email service not configured, dropping email to {}", to);
        Err(Error::EmailServiceNotConfigured)
    }
}

/// Sends an email without blocking the caller. Failures are logged and
/// otherwise ignored.
pub fn dispatch(notifier: Arc<dyn Notifier>, to: String, subject: String, html: String) {
    tokio::spawn(async move {
        if let Err(err) = notifier.send(&to, &subject, &html).await {
            tracing::warn!("failed to send email to {}: {}", to, err);
        }
    });
}

/// Sends an email, waiting a short budget for an immediate failure so the
/// caller can report it. Once the budget lapses the send keeps going in the
/// background and the caller assumes success.
pub async fn dispatch_bounded(
    notifier: Arc<dyn Notifier>,
    to: String,
    subject: String,
    html: String,
) -> Result<(), Error> {
    let (result_tx, result_rx) = oneshot::channel();
    tokio::spawn(async move {
        let result = notifier.send(&to, &subject, &html).await;
        if let Err(err) = &result {
            tracing::warn!("failed to send email to {}: {}", to, err);
        }
        let _ = result_tx.send(result);
    });

    match tokio::time::timeout(SHARE_SEND_BUDGET, result_rx).await {
        Ok(Ok(result)) => result,
        // Sender dropped or budget lapsed, the send continues in the background.
        Ok(Err(_)) | Err(_) => Ok(()),
    }
}

pub fn decision_email(
    title: &str,
    status: CampaignStatus,
    comment: &str,
    simulation_link: Option<&str>,
) -> (String, String) {
    let subject = match status {
        CampaignStatus::Approved => format!("Campaign Approved: {}", title),
        _ => format!("Campaign Rejected: {}", title),
    };

    let mut html = format!(
        "<h2>Your campaign \"{}\" has been {}.</h2>",
        title,
        status.as_str()
    );
    if !comment.is_empty() {
        html.push_str(&format!("<p><b>Reviewer comment:</b> {}</p>", comment));
    }
    if let Some(link) = simulation_link {
        html.push_str(&format!(
            "<p>Your simulation is live: <a href=\"{0}\">{0}</a></p>",
            link
        ));
    }

    (subject, html)
}

pub fn share_email(title: &str, link: &str) -> (String, String) {
    let subject = format!("Security Awareness Exercise: {}", title);
    let html = format!(
        "<h2>{title}</h2>\
         <p>You have been invited to a security awareness exercise.</p>\
         <p><a href=\"{link}\">Open the exercise</a></p>\
         <p>This is a simulated phishing exercise for training purposes.</p>",
        title = title,
        link = link,
    );

    (subject, html)
}

#[cfg(test)]
pub mod test {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MockNotifier {
        pub configured: bool,
        pub sent: Arc<Mutex<Vec<(String, String, String)>>>,
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), Error> {
            self.sent.lock().unwrap().push((
                to.to_string(),
                subject.to_string(),
                html.to_string(),
            ));
            Ok(())
        }
    }

    #[test]
    fn approval_email_carries_simulation_link() {
        let (subject, html) = decision_email(
            "Q3 Password Audit",
            CampaignStatus::Approved,
            "",
            Some("http://localhost:3000/simulate/abc123"),
        );

        assert_eq!(subject, "Campaign Approved: Q3 Password Audit");
        assert!(html.contains("http://localhost:3000/simulate/abc123"));
        assert!(!html.contains("Reviewer comment"));
    }

    #[test]
    fn rejection_email_carries_comment_and_no_link() {
        let (subject, html) = decision_email(
            "Q3 Password Audit",
            CampaignStatus::Rejected,
            "Too aggressive",
            None,
        );

        assert_eq!(subject, "Campaign Rejected: Q3 Password Audit");
        assert!(html.contains("Too aggressive"));
        assert!(!html.contains("<a href"));
    }

    #[tokio::test]
    async fn bounded_dispatch_reports_immediate_failure() {
        let result = dispatch_bounded(
            Arc::new(DisabledNotifier),
            "someone@example.com".to_string(),
            "subject".to_string(),
            "body".to_string(),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::EmailServiceNotConfigured);
    }
}
