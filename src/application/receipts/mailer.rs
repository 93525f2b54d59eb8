//! Receipt delivery by mail

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use super::receipt::Receipt;
use crate::shared::NotificationError;

#[async_trait]
pub trait ReceiptMailer: Send + Sync {
    async fn send_receipt(&self, recipient: &str, receipt: &Receipt)
        -> Result<(), NotificationError>;
}

/// Drops each receipt into an outbox directory for an external mail relay.
/// Without a directory the receipt is only logged.
pub struct OutboxMailer {
    outbox_dir: Option<PathBuf>,
    hotel_name: String,
}

impl OutboxMailer {
    pub fn new(outbox_dir: Option<PathBuf>, hotel_name: impl Into<String>) -> Self {
        Self {
            outbox_dir,
            hotel_name: hotel_name.into(),
        }
    }

    fn render(&self, recipient: &str, receipt: &Receipt) -> String {
        format!(
            "To: {recipient}\nSubject: {} receipt {}\n\n{receipt}\n",
            self.hotel_name, receipt.receipt_number
        )
    }
}

#[async_trait]
impl ReceiptMailer for OutboxMailer {
    async fn send_receipt(
        &self,
        recipient: &str,
        receipt: &Receipt,
    ) -> Result<(), NotificationError> {
        if recipient.trim().is_empty() {
            return Err(NotificationError::Mail("customer has no email address".into()));
        }
        let Some(dir) = &self.outbox_dir else {
            info!(
                recipient,
                receipt_number = %receipt.receipt_number,
                "No outbox configured, receipt not mailed"
            );
            return Ok(());
        };

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.txt", receipt.receipt_number));
        tokio::fs::write(&path, self.render(recipient, receipt)).await?;

        info!(recipient, path = %path.display(), "✉️ Receipt queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::receipts::receipt::tests::sample;

    #[tokio::test]
    async fn writes_receipt_file_into_outbox() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = dir.path().join("outbox");
        let mailer = OutboxMailer::new(Some(outbox.clone()), "Timeless Hotel");

        let (booking, customer, stay, room) = sample();
        let receipt = Receipt::build(&booking, &customer, &stay, &room, booking.created_at);
        mailer.send_receipt(&customer.email, &receipt).await.unwrap();

        let body = std::fs::read_to_string(outbox.join(format!("{}.txt", receipt.receipt_number)))
            .unwrap();
        assert!(body.starts_with("To: amaka@example.com\n"));
        assert!(body.contains("Timeless Hotel receipt"));
        assert!(body.contains("Eze Amaka"));
    }

    #[tokio::test]
    async fn empty_recipient_is_a_mail_error() {
        let mailer = OutboxMailer::new(None, "Timeless Hotel");
        let (booking, customer, stay, room) = sample();
        let receipt = Receipt::build(&booking, &customer, &stay, &room, booking.created_at);
        assert!(matches!(
            mailer.send_receipt(" ", &receipt).await,
            Err(NotificationError::Mail(_))
        ));
        mailer.send_receipt("a@b.c", &receipt).await.unwrap();
    }
}
