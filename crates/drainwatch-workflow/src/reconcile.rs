//! Status reconciliation engine.
//!
//! Report status and segment condition are derived state. The functions here
//! recompute them from the remediation links inside the caller's unit of work;
//! nothing else in the workflow writes either field directly, apart from the
//! explicit staff overrides at the bottom of this file.

use drainwatch_core::error::{DrainError, Result};
use drainwatch_core::models::{
    Actor, Condition, LinkId, LinkStatus, RemediationInput, ReportDrainageLink, ReportId,
    ReportStatus, SegmentId,
};
use drainwatch_store::ports::UnitOfWork;
use std::collections::BTreeSet;

use crate::models::FixOutcome;
use crate::service::{finish, DrainageService};

/// Aggregate status implied by a report's links.
///
/// Only attached links count. `None` means there is nothing to derive from
/// and the stored status stays as it is.
pub fn derive_report_status(links: &[ReportDrainageLink]) -> Option<ReportStatus> {
    let active: Vec<&ReportDrainageLink> = links.iter().filter(|l| l.is_active()).collect();
    if active.is_empty() {
        return None;
    }

    let fixed = active.iter().filter(|l| l.status == LinkStatus::Fixed).count();
    let status = if fixed == active.len() {
        ReportStatus::Fixed
    } else if fixed > 0 {
        ReportStatus::InProgress
    } else {
        ReportStatus::Pending
    };
    Some(status)
}

/// Condition implied by the links attached to a segment
pub fn derive_condition(links: &[ReportDrainageLink]) -> Condition {
    if links.iter().any(|l| l.is_active() && l.status.is_open()) {
        Condition::HasProblem
    } else {
        Condition::Good
    }
}

/// Re-derive one report's status. Aborted reports are left alone.
///
/// Returns the status after recomputation, or `None` if the report is gone.
pub(crate) async fn recompute_report(
    tx: &mut dyn UnitOfWork,
    report_id: ReportId,
) -> Result<Option<ReportStatus>> {
    let Some(report) = tx.get_report(report_id).await? else {
        return Ok(None);
    };
    if report.status == ReportStatus::Aborted {
        return Ok(Some(report.status));
    }

    let links = tx.links_for_report(report_id).await?;
    match derive_report_status(&links) {
        Some(status) if status != report.status => {
            tx.update_report_status(report_id, status).await?;
            tracing::debug!(
                report_id = report_id.0,
                from = report.status.as_str(),
                to = status.as_str(),
                "Report status recomputed"
            );
            Ok(Some(status))
        }
        _ => Ok(Some(report.status)),
    }
}

/// Re-derive one segment's condition. Returns `None` if the segment is gone.
pub(crate) async fn reconcile_segment(
    tx: &mut dyn UnitOfWork,
    segment_id: SegmentId,
) -> Result<Option<Condition>> {
    let Some(segment) = tx.get_segment(segment_id).await? else {
        return Ok(None);
    };

    let links = tx.links_for_segment(segment_id).await?;
    let condition = derive_condition(&links);
    if condition != segment.condition {
        tx.set_segment_condition(segment_id, condition).await?;
        tracing::debug!(
            segment_id = segment_id.0,
            condition = condition.as_str(),
            "Segment condition recomputed"
        );
    }
    Ok(Some(condition))
}

/// Storage failures inside a reconciliation surface as `Reconciliation`
fn into_reconciliation(err: DrainError) -> DrainError {
    match err {
        DrainError::Storage(reason) => DrainError::Reconciliation(reason),
        other => other,
    }
}

impl DrainageService {
    /// Mark a remediation link fixed and fan the fix out over its segment.
    ///
    /// One repair resolves the segment for every report: each other `Pending`
    /// link on the same segment is fixed with the same remediation point and
    /// attachment. The segment condition and
    /// the status of every report linked to the segment are then recomputed.
    /// All of it commits as one unit. Fixing an already fixed link is a no-op.
    ///
    /// The segment is locked before the link, so concurrent fixes on one
    /// segment run one after the other.
    pub async fn mark_link_fixed(
        &self,
        actor: &Actor,
        link_id: LinkId,
        remediation: RemediationInput,
    ) -> Result<FixOutcome> {
        self.require_staff(actor, format!("fix remediation link {}", link_id))?;
        if !remediation.point.is_valid() {
            return Err(DrainError::validation(
                "coordinates",
                "remediation point is outside WGS 84 bounds",
            ));
        }
        if let Some(upload) = &remediation.attachment {
            self.validate_attachment("attachment", upload)?;
        }

        let mut tx = self.store.begin_transaction().await.map_err(into_reconciliation)?;

        if let Err(e) = tx.lock_link_segment(link_id).await {
            return finish(tx, Err(into_reconciliation(e))).await;
        }
        let link = match load_link(tx.as_mut(), link_id).await {
            Ok(link) => link,
            Err(e) => return finish(tx, Err(e)).await,
        };
        if link.status == LinkStatus::Fixed {
            tracing::debug!(link_id = link_id.0, "Link already fixed");
            return finish(tx, Ok(FixOutcome::AlreadyFixed { link: link_id }))
                .await
                .map_err(into_reconciliation);
        }

        let attachment = match &remediation.attachment {
            Some(upload) => match self.files.save("remediations", upload).await {
                Ok(path) => Some(path),
                Err(e) => return finish(tx, Err(e)).await,
            },
            None => None,
        };

        let outcome = apply_fix(tx.as_mut(), link, &remediation, attachment.clone())
            .await
            .map_err(into_reconciliation);
        let outcome = finish(tx, outcome).await.map_err(into_reconciliation);

        match &outcome {
            Ok(FixOutcome::Applied { segment, fixed_links, reports }) => {
                tracing::info!(
                    link_id = link_id.0,
                    segment_id = segment.map(|s| s.0),
                    fixed_links = fixed_links.len(),
                    reports = reports.len(),
                    "Remediation applied"
                );
            }
            Ok(FixOutcome::AlreadyFixed { .. }) => {}
            Err(e) => {
                tracing::error!(link_id = link_id.0, error = %e, "Remediation rolled back");
                if let Some(path) = &attachment {
                    self.discard_attachment(path).await;
                }
            }
        }
        outcome
    }

    /// Recompute a report's status from its links in its own unit of work
    pub async fn recompute_report_status(&self, report_id: ReportId) -> Result<ReportStatus> {
        let mut tx = self.store.begin_transaction().await?;
        let outcome = recompute_report(tx.as_mut(), report_id)
            .await
            .and_then(|status| status.ok_or_else(|| DrainError::not_found("report", report_id.0)));
        finish(tx, outcome).await
    }

    /// Recompute a segment's condition from its links in its own unit of work
    pub async fn reconcile_segment_condition(&self, segment_id: SegmentId) -> Result<Condition> {
        let mut tx = self.store.begin_transaction().await?;
        let outcome = reconcile_segment(tx.as_mut(), segment_id).await.and_then(|condition| {
            condition.ok_or_else(|| DrainError::not_found("drainage segment", segment_id.0))
        });
        finish(tx, outcome).await
    }

    /// Delete a segment, detaching its links and recomputing the reports they belong to.
    ///
    /// Returns the affected reports.
    pub async fn delete_segment(&self, actor: &Actor, segment_id: SegmentId) -> Result<Vec<ReportId>> {
        self.require_staff(actor, format!("delete drainage segment {}", segment_id))?;

        let mut tx = self.store.begin_transaction().await?;
        let outcome = detach_and_delete(tx.as_mut(), segment_id).await;
        let reports = finish(tx, outcome).await?;

        tracing::info!(
            segment_id = segment_id.0,
            affected_reports = reports.len(),
            "Drainage segment deleted"
        );
        Ok(reports)
    }

    /// Staff override of a segment's condition.
    ///
    /// The next reconciliation touching the segment derives it again.
    pub async fn set_segment_condition(
        &self,
        actor: &Actor,
        segment_id: SegmentId,
        condition: Condition,
    ) -> Result<()> {
        self.require_staff(actor, format!("change condition of drainage segment {}", segment_id))?;

        let mut tx = self.store.begin_transaction().await?;
        let outcome = match tx.get_segment(segment_id).await {
            Ok(Some(_)) => tx.set_segment_condition(segment_id, condition).await,
            Ok(None) => Err(DrainError::not_found("drainage segment", segment_id.0)),
            Err(e) => Err(e),
        };
        finish(tx, outcome).await?;

        tracing::warn!(
            segment_id = segment_id.0,
            condition = condition.as_str(),
            actor = ?actor.user_id,
            "Segment condition overridden"
        );
        Ok(())
    }
}

async fn load_link(tx: &mut dyn UnitOfWork, link_id: LinkId) -> Result<ReportDrainageLink> {
    tx.get_link(link_id)
        .await
        .map_err(into_reconciliation)?
        .ok_or_else(|| DrainError::not_found("remediation link", link_id.0))
}

async fn apply_fix(
    tx: &mut dyn UnitOfWork,
    mut link: ReportDrainageLink,
    remediation: &RemediationInput,
    attachment: Option<String>,
) -> Result<FixOutcome> {
    let mut fixed_links = Vec::new();
    let mut touched_reports = BTreeSet::new();

    link.status = LinkStatus::Fixed;
    link.remediation_point = Some(remediation.point);
    link.remediation_attachment = attachment.clone();
    tx.save_link(&link).await?;
    fixed_links.push(link.id);
    touched_reports.insert(link.report_id);

    if let Some(segment_id) = link.segment_id {
        for mut sibling in tx.links_for_segment(segment_id).await? {
            touched_reports.insert(sibling.report_id);
            if sibling.id == link.id || sibling.status != LinkStatus::Pending {
                continue;
            }
            sibling.status = LinkStatus::Fixed;
            sibling.remediation_point = Some(remediation.point);
            sibling.remediation_attachment = attachment.clone();
            tx.save_link(&sibling).await?;
            fixed_links.push(sibling.id);
        }
        reconcile_segment(tx, segment_id).await?;
    }

    let mut reports = Vec::with_capacity(touched_reports.len());
    for report_id in touched_reports {
        if let Some(status) = recompute_report(tx, report_id).await? {
            reports.push((report_id, status));
        }
    }

    Ok(FixOutcome::Applied { segment: link.segment_id, fixed_links, reports })
}

async fn detach_and_delete(tx: &mut dyn UnitOfWork, segment_id: SegmentId) -> Result<Vec<ReportId>> {
    if tx.get_segment(segment_id).await?.is_none() {
        return Err(DrainError::not_found("drainage segment", segment_id.0));
    }

    let detached = tx.detach_links_for_segment(segment_id).await?;
    tx.delete_segment(segment_id).await?;

    let reports: BTreeSet<ReportId> = detached.iter().map(|l| l.report_id).collect();
    for report_id in &reports {
        recompute_report(tx, *report_id).await?;
    }
    Ok(reports.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(id: i64, segment: Option<i64>, status: LinkStatus) -> ReportDrainageLink {
        ReportDrainageLink {
            id: LinkId(id),
            report_id: ReportId(1),
            segment_id: segment.map(SegmentId),
            status,
            remediation_point: None,
            remediation_attachment: None,
            created_at: Default::default(),
            updated_at: Default::default(),
        }
    }

    #[test]
    fn test_derive_report_status() {
        assert_eq!(derive_report_status(&[]), None);
        assert_eq!(
            derive_report_status(&[link(1, Some(7), LinkStatus::Pending)]),
            Some(ReportStatus::Pending)
        );
        assert_eq!(
            derive_report_status(&[
                link(1, Some(7), LinkStatus::Fixed),
                link(2, Some(9), LinkStatus::Pending)
            ]),
            Some(ReportStatus::InProgress)
        );
        assert_eq!(
            derive_report_status(&[
                link(1, Some(7), LinkStatus::Fixed),
                link(2, Some(9), LinkStatus::Fixed)
            ]),
            Some(ReportStatus::Fixed)
        );
    }

    #[test]
    fn test_detached_links_do_not_count() {
        let links = [link(1, Some(7), LinkStatus::Fixed), link(2, None, LinkStatus::Pending)];
        assert_eq!(derive_report_status(&links), Some(ReportStatus::Fixed));
        assert_eq!(derive_report_status(&[link(2, None, LinkStatus::Pending)]), None);
        assert_eq!(derive_condition(&[link(2, None, LinkStatus::Pending)]), Condition::Good);
    }

    #[test]
    fn test_derive_condition() {
        assert_eq!(derive_condition(&[]), Condition::Good);
        assert_eq!(derive_condition(&[link(1, Some(7), LinkStatus::Fixed)]), Condition::Good);
        assert_eq!(
            derive_condition(&[
                link(1, Some(7), LinkStatus::Fixed),
                link(2, Some(7), LinkStatus::InProgress)
            ]),
            Condition::HasProblem
        );
        assert_eq!(derive_condition(&[link(1, Some(7), LinkStatus::Aborted)]), Condition::HasProblem);
    }
}
