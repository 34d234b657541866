//! Outgoing account email
//!
//! Use cases hand a [`Notification`] to a [`Notifier`] and return at once.
//! [`NotificationQueue`] renders and delivers on a background worker, so a
//! failed delivery is logged and never reaches the caller. The queue is
//! bounded: when the mail transport stalls, overflow is dropped with a warning
//! rather than held in memory or pushed back onto the request.

use std::sync::Mutex;

use platform::mail::Mailer;
use tokio::sync::mpsc;

const VERIFICATION_TEMPLATE: &str = include_str!("templates/verification.html");
const PASSWORD_RESET_TEMPLATE: &str = include_str!("templates/password_reset.html");

/// Pending notifications held while the worker is busy
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Verification,
    PasswordReset,
}

impl NotificationKind {
    pub fn subject(&self) -> &'static str {
        match self {
            NotificationKind::Verification => "Email Verification",
            NotificationKind::PasswordReset => "Reset Password",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            NotificationKind::Verification => VERIFICATION_TEMPLATE,
            NotificationKind::PasswordReset => PASSWORD_RESET_TEMPLATE,
        }
    }
}

/// Template parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailData {
    pub username: String,
    pub action_link: String,
    pub support_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
}

/// Fill the template for `kind`. Every value is HTML-escaped.
pub fn render(kind: NotificationKind, data: &EmailData) -> RenderedEmail {
    let html_body = kind
        .template()
        .replace("{{username}}", &escape_html(&data.username))
        .replace("{{action_link}}", &escape_html(&data.action_link))
        .replace("{{support_email}}", &escape_html(&data.support_email));

    RenderedEmail {
        subject: kind.subject().to_string(),
        html_body,
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub kind: NotificationKind,
    pub data: EmailData,
}

/// Fire-and-forget delivery
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

// ============================================================================
// Queue + worker
// ============================================================================

/// Sender half of the mail queue
///
/// The worker stops once every sender is dropped.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<Notification>,
}

impl NotificationQueue {
    /// Spawn the delivery worker on the current runtime
    pub fn spawn<M>(mailer: M) -> Self
    where
        M: Mailer + Sync + 'static,
    {
        Self::with_capacity(mailer, DEFAULT_QUEUE_CAPACITY)
    }

    /// `capacity` must be non-zero
    pub fn with_capacity<M>(mailer: M, capacity: usize) -> Self
    where
        M: Mailer + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Notification>(capacity.max(1));

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                let email = render(notification.kind, &notification.data);
                if let Err(e) = mailer.send(&notification.to, &email.subject, &email.html_body).await {
                    tracing::warn!(
                        kind = ?notification.kind,
                        error = %e,
                        "Failed to deliver email"
                    );
                } else {
                    tracing::debug!(kind = ?notification.kind, "Email delivered");
                }
            }
            tracing::info!("Notification worker stopped");
        });

        Self { tx }
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                tracing::warn!(kind = ?dropped.kind, "Notification queue full, email dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Notification worker is gone, email dropped");
            }
        }
    }
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Most recent notification of `kind` sent to `to`
    pub fn last_to(&self, to: &str, kind: NotificationKind) -> Option<Notification> {
        self.sent()
            .into_iter()
            .rev()
            .find(|n| n.to == to && n.kind == kind)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::mail::MailError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn data() -> EmailData {
        EmailData {
            username: "alice".to_string(),
            action_link: "https://minddrift.dev/verify-email?token=abc.def".to_string(),
            support_email: "help@minddrift.dev".to_string(),
        }
    }

    #[test]
    fn test_render_verification() {
        let email = render(NotificationKind::Verification, &data());
        assert_eq!(email.subject, "Email Verification");
        assert!(email.html_body.contains("Hello, alice!"));
        assert!(email.html_body.contains("https://minddrift.dev/verify-email?token=abc.def"));
        assert!(email.html_body.contains("mailto:help@minddrift.dev"));
        assert!(!email.html_body.contains("{{"));
    }

    #[test]
    fn test_render_password_reset() {
        let email = render(NotificationKind::PasswordReset, &data());
        assert_eq!(email.subject, "Reset Password");
        assert!(email.html_body.contains("Reset Your Password"));
    }

    #[test]
    fn test_render_escapes_values() {
        let email = render(
            NotificationKind::Verification,
            &EmailData {
                username: "<script>alert('x')</script>".to_string(),
                ..data()
            },
        );
        assert!(!email.html_body.contains("<script>"));
        assert!(email.html_body.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    struct FlakyMailer {
        delivered: Arc<Mutex<Vec<String>>>,
    }

    impl Mailer for FlakyMailer {
        async fn send(&self, to: &str, _subject: &str, _html_body: &str) -> Result<(), MailError> {
            if to.starts_with("fail") {
                return Err(MailError::InvalidAddress(to.to_string()));
            }
            self.delivered.lock().unwrap().push(to.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_queue_survives_failed_delivery() {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let queue = NotificationQueue::spawn(FlakyMailer {
            delivered: delivered.clone(),
        });

        for to in ["fail@x.io", "ok@x.io"] {
            queue.notify(Notification {
                to: to.to_string(),
                kind: NotificationKind::Verification,
                data: data(),
            });
        }

        for _ in 0..50 {
            if !delivered.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(*delivered.lock().unwrap(), vec!["ok@x.io".to_string()]);
    }

    /// Holds every delivery until a permit is released
    struct StalledMailer {
        gate: Arc<Semaphore>,
        started: Arc<AtomicUsize>,
        delivered: Arc<Mutex<Vec<String>>>,
    }

    impl Mailer for StalledMailer {
        async fn send(&self, to: &str, _subject: &str, _html_body: &str) -> Result<(), MailError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let permit = self.gate.acquire().await.map_err(|_| {
                MailError::InvalidAddress(to.to_string())
            })?;
            permit.forget();
            self.delivered.lock().unwrap().push(to.to_string());
            Ok(())
        }
    }

    fn to(addr: &str) -> Notification {
        Notification {
            to: addr.to_string(),
            kind: NotificationKind::Verification,
            data: data(),
        }
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        for _ in 0..100 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let gate = Arc::new(Semaphore::new(0));
        let started = Arc::new(AtomicUsize::new(0));
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let queue = NotificationQueue::with_capacity(
            StalledMailer {
                gate: gate.clone(),
                started: started.clone(),
                delivered: delivered.clone(),
            },
            1,
        );

        // The worker picks up the first one and stalls inside the transport.
        queue.notify(to("first@x.io"));
        wait_until(|| started.load(Ordering::SeqCst) == 1).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);

        queue.notify(to("second@x.io"));
        queue.notify(to("third@x.io"));

        gate.add_permits(10);
        wait_until(|| delivered.lock().unwrap().len() == 2).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(
            *delivered.lock().unwrap(),
            vec!["first@x.io".to_string(), "second@x.io".to_string()]
        );
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification {
            to: "alice@x.io".to_string(),
            kind: NotificationKind::PasswordReset,
            data: data(),
        });
        assert_eq!(notifier.sent().len(), 1);
        assert!(notifier.last_to("alice@x.io", NotificationKind::PasswordReset).is_some());
        assert!(notifier.last_to("alice@x.io", NotificationKind::Verification).is_none());
    }
}
