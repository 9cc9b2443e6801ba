use async_trait::async_trait;
use drainwatch_core::error::Result;
use drainwatch_core::models::{Report, StaffMember};
use drainwatch_core::ports::Notifier;

/// Notifier that records deliveries in the log
///
/// Stands in for a mail or push gateway; one log line per recipient.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify_new_report(&self, report: &Report, recipients: &[StaffMember]) -> Result<()> {
        for member in recipients {
            tracing::info!(
                report_id = report.id.0,
                recipient = member.id.0,
                email = member.email.as_deref().unwrap_or("-"),
                title = %report.title,
                "New report notification"
            );
        }
        Ok(())
    }
}
