//! Receipt printing through an external command

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::receipt::Receipt;
use crate::shared::NotificationError;

#[async_trait]
pub trait ReceiptPrinter: Send + Sync {
    async fn print_receipt(&self, receipt: &Receipt) -> Result<(), NotificationError>;
}

/// Runs `<program> <script> <printer> <guest> <room> <check_in> <check_out> <amount>`.
#[derive(Debug, Clone)]
pub struct CommandPrinter {
    program: String,
    script: String,
    printer_name: String,
}

impl CommandPrinter {
    pub fn new(
        program: impl Into<String>,
        script: impl Into<String>,
        printer_name: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            script: script.into(),
            printer_name: printer_name.into(),
        }
    }

    fn args(&self, receipt: &Receipt) -> Vec<String> {
        let mut args = Vec::with_capacity(7);
        if !self.script.is_empty() {
            args.push(self.script.clone());
        }
        args.extend([
            self.printer_name.clone(),
            receipt.customer_name.clone(),
            receipt.room_name.clone(),
            receipt.start_date.format("%Y-%m-%d").to_string(),
            receipt.end_date.format("%Y-%m-%d").to_string(),
            receipt.amount.to_string(),
        ]);
        args
    }
}

#[async_trait]
impl ReceiptPrinter for CommandPrinter {
    async fn print_receipt(&self, receipt: &Receipt) -> Result<(), NotificationError> {
        let args = self.args(receipt);
        debug!(program = %self.program, ?args, "Running print command");

        let output = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| NotificationError::Print(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotificationError::Print(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        info!(
            printer = %self.printer_name,
            receipt_number = %receipt.receipt_number,
            "🖨️ Receipt printed"
        );
        Ok(())
    }
}
