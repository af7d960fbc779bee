//! Error alerting layer for tracing.
//!
//! ERROR-level events (a failed publish, a task store outage, a panicking
//! task handler) are forwarded to the console or a chat webhook.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

/// Alert message containing error details.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub message: String,
    pub target: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub fields: Vec<(String, String)>,
}

impl AlertMessage {
    /// One-line summary with structured fields, e.g. `Task failed [task_id=post_3]`.
    pub fn summary(&self) -> String {
        if self.fields.is_empty() {
            return self.message.clone();
        }
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("{} [{}]", self.message, fields.join(" "))
    }
}

#[async_trait::async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Failed to send alert: {0}")]
    SendError(String),
}

/// Writes alerts to stderr (for development).
pub struct ConsoleAlertSender;

#[async_trait::async_trait]
impl AlertSender for ConsoleAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        eprintln!(
            "\n[ALERT] {}\n  target: {}\n  time:   {}\n",
            alert.summary(),
            alert.target,
            alert.timestamp.to_rfc3339()
        );
        Ok(())
    }
}

/// Posts alerts to a webhook URL (Slack, Discord, etc.).
pub struct WebhookAlertSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookAlertSender {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AlertSender for WebhookAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        let payload = serde_json::json!({
            "text": format!(
                "*Postpilot error*\n*Target:* {}\n*Message:* {}\n*Time:* {}",
                alert.target,
                alert.summary(),
                alert.timestamp.to_rfc3339()
            )
        });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AlertError::SendError(e.to_string()))?;

        Ok(())
    }
}

/// Tracing layer that sends alerts on ERROR-level events.
pub struct AlertLayer {
    sender: mpsc::Sender<AlertMessage>,
}

impl AlertLayer {
    /// Must be called inside a tokio runtime; alerts are delivered by a background task.
    pub fn new(alert_sender: Arc<dyn AlertSender>) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertMessage>(100);

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                if let Err(e) = alert_sender.send(alert).await {
                    // Must not go through tracing, it would re-enter this layer.
                    eprintln!("Failed to send alert: {}", e);
                }
            }
        });

        Self { sender: tx }
    }

    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleAlertSender))
    }

    pub fn webhook(url: String) -> Self {
        Self::new(Arc::new(WebhookAlertSender::new(url)))
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }
}

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != tracing::Level::ERROR {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let alert = AlertMessage {
            message: visitor.message,
            target: event.metadata().target().to_string(),
            timestamp: chrono::Utc::now(),
            fields: visitor.fields,
        };

        // Dropped when the channel is full.
        let _ = self.sender.try_send(alert);
    }
}
