use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Report, StaffMember};

/// Port for delivering "new report" notifications to staff
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification about a freshly submitted report
    async fn notify_new_report(&self, report: &Report, recipients: &[StaffMember]) -> Result<()>;
}
