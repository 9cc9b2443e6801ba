//! Report entity workflow: submission, association sync, deletion and
//! manual status changes.

use drainwatch_core::error::{DrainError, Result};
use drainwatch_core::models::{
    Actor, Geometry, GuestReporter, LngLat, NewReport, Report, ReportDrainageLink, ReportEdit,
    ReportFields, ReportId, ReportStatus, ReportSubmission, SegmentId, SubDistrictId,
};
use drainwatch_geo::{ensure_valid_geometry, find_nearby_segments, resolve_sub_district};
use drainwatch_store::ports::UnitOfWork;
use std::collections::BTreeSet;

use crate::models::ReportDetail;
use crate::reconcile::{reconcile_segment, recompute_report};
use crate::service::{finish, DrainageService};

const MAX_TEXT_LEN: usize = 255;

fn required_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DrainError::validation(field, "is required"));
    }
    optional_text(field, Some(value)).map(|v| v.unwrap_or_default())
}

fn optional_text(field: &str, value: Option<&str>) -> Result<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) if v.chars().count() > MAX_TEXT_LEN => Err(DrainError::validation(
            field,
            format!("must be at most {} characters", MAX_TEXT_LEN),
        )),
        other => Ok(other.map(str::to_string)),
    }
}

/// Drop repeated ids, keeping the first occurrence
fn dedupe(ids: &[SegmentId]) -> Vec<SegmentId> {
    let mut seen = BTreeSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn can_manage(actor: &Actor, report: &Report) -> bool {
    actor.is_staff() || report.is_owned_by(actor)
}

/// Report content shared by submissions and edits
struct DetailsInput<'a> {
    title: &'a str,
    description: &'a str,
    category: Option<&'a str>,
    location_name: Option<&'a str>,
    sub_district_name: Option<&'a str>,
    geometry: Option<&'a Geometry>,
    point: Option<LngLat>,
}

impl<'a> From<&'a ReportSubmission> for DetailsInput<'a> {
    fn from(submission: &'a ReportSubmission) -> Self {
        Self {
            title: &submission.title,
            description: &submission.description,
            category: submission.category.as_deref(),
            location_name: submission.location_name.as_deref(),
            sub_district_name: submission.sub_district_name.as_deref(),
            geometry: submission.geometry.as_ref(),
            point: submission.point,
        }
    }
}

impl<'a> From<&'a ReportEdit> for DetailsInput<'a> {
    fn from(edit: &'a ReportEdit) -> Self {
        Self {
            title: &edit.title,
            description: &edit.description,
            category: edit.category.as_deref(),
            location_name: edit.location_name.as_deref(),
            sub_district_name: edit.sub_district_name.as_deref(),
            geometry: edit.geometry.as_ref(),
            point: edit.point,
        }
    }
}

/// Validated content; sub-district and attachment are filled in later
#[derive(Debug)]
struct ValidDetails {
    fields: ReportFields,
    sub_district_name: Option<String>,
}

fn validate_details(input: DetailsInput<'_>) -> Result<ValidDetails> {
    let title = required_text("title", input.title)?;
    let description = required_text("description", input.description)?;
    let category = optional_text("category", input.category)?;
    let location_name = optional_text("location_name", input.location_name)?;

    let geometry = input
        .geometry
        .cloned()
        .ok_or_else(|| DrainError::validation("geometry", "is required"))?;
    ensure_valid_geometry("geometry", &geometry)?;

    let point = input.point.ok_or_else(|| DrainError::validation("point", "is required"))?;
    if !point.is_valid() {
        return Err(DrainError::validation("point", "is outside WGS 84 bounds"));
    }

    let sub_district_name = optional_text("sub_district", input.sub_district_name)?;
    if sub_district_name.as_deref().is_some_and(|name| name.eq_ignore_ascii_case("all")) {
        return Err(DrainError::validation("sub_district", "must name a single sub-district"));
    }

    Ok(ValidDetails {
        fields: ReportFields {
            title,
            description,
            category,
            location_name,
            geometry,
            point,
            sub_district_id: None,
            attachment: None,
        },
        sub_district_name,
    })
}

/// Validated submission fields, ready to persist
#[derive(Debug)]
struct ValidSubmission {
    report: NewReport,
    sub_district_name: Option<String>,
}

fn validate_submission(actor: &Actor, submission: &ReportSubmission) -> Result<ValidSubmission> {
    let ValidDetails { fields, sub_district_name } = validate_details(submission.into())?;

    let guest = if actor.is_guest() {
        let guest = submission.guest.as_ref();
        let name = required_text("reporter_name", guest.map_or("", |g| g.name.as_str()))?;
        let contact = required_text("reporter_contact", guest.map_or("", |g| g.contact.as_str()))?;
        Some(GuestReporter { name, contact })
    } else {
        None
    };

    Ok(ValidSubmission {
        report: NewReport {
            title: fields.title,
            description: fields.description,
            category: fields.category,
            location_name: fields.location_name,
            geometry: fields.geometry,
            point: fields.point,
            sub_district_id: None,
            user_id: actor.user_id,
            guest,
            attachment: None,
        },
        sub_district_name,
    })
}

impl DrainageService {
    /// Validate and persist a new report in `Pending`.
    ///
    /// Each associated segment gets a `Pending` link and is reconciled to
    /// `HasProblem`. Without an explicit segment list the matcher fills it in
    /// when automatic linking is enabled. Staff other than the submitter are
    /// notified unless the submitter is staff.
    pub async fn submit_report(&self, actor: &Actor, submission: ReportSubmission) -> Result<Report> {
        let ValidSubmission { mut report, sub_district_name } =
            validate_submission(actor, &submission)?;
        if let Some(upload) = &submission.attachment {
            self.validate_attachment("attachment", upload)?;
        }

        report.sub_district_id =
            self.sub_district_for(report.point, sub_district_name.as_deref()).await?;

        let segment_ids = match &submission.segment_ids {
            Some(ids) => dedupe(ids),
            None if self.config.auto_link_nearby => {
                let segments = self.store.list_segments().await?;
                find_nearby_segments(report.point, &segments, self.config.match_threshold_meters)
                    .into_iter()
                    .map(|s| s.id)
                    .collect()
            }
            None => Vec::new(),
        };

        if let Some(upload) = &submission.attachment {
            report.attachment = Some(self.files.save("reports", upload).await?);
        }

        let stored_attachment = report.attachment.clone();
        let created = match self.persist_report(report, &segment_ids).await {
            Ok(created) => created,
            Err(e) => {
                if let Some(path) = &stored_attachment {
                    self.discard_attachment(path).await;
                }
                return Err(e);
            }
        };

        tracing::info!(
            report_id = created.id.0,
            segments = segment_ids.len(),
            sub_district_id = created.sub_district_id.map(|s| s.0),
            guest = actor.is_guest(),
            "Report submitted"
        );

        self.notify_staff(actor, &created).await;
        Ok(created)
    }

    async fn persist_report(&self, report: NewReport, segment_ids: &[SegmentId]) -> Result<Report> {
        let mut tx = self.store.begin_transaction().await?;
        let outcome = insert_with_links(tx.as_mut(), report, segment_ids).await;
        finish(tx, outcome).await
    }

    async fn sub_district_for(
        &self,
        point: LngLat,
        name_hint: Option<&str>,
    ) -> Result<Option<SubDistrictId>> {
        let boundaries = self.store.list_sub_districts().await?;
        if let Some(found) = resolve_sub_district(point, &boundaries).sub_district() {
            return Ok(Some(found.id));
        }

        match name_hint {
            Some(name) => {
                let found = self.store.find_sub_district_by_name(name).await?;
                if found.is_none() {
                    tracing::debug!(name, "Sub-district name did not match any boundary");
                }
                Ok(found.map(|s| s.id))
            }
            None => Ok(None),
        }
    }

    async fn notify_staff(&self, actor: &Actor, report: &Report) {
        if actor.is_staff() {
            return;
        }

        let recipients = match self.store.staff_recipients(actor.user_id).await {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::warn!(report_id = report.id.0, error = %e, "Failed to load staff recipients");
                return;
            }
        };
        if recipients.is_empty() {
            return;
        }

        if let Err(e) = self.notifier.notify_new_report(report, &recipients).await {
            tracing::warn!(report_id = report.id.0, error = %e, "New report notification failed");
        }
    }

    /// Replace a report's segment associations with `segment_ids`.
    ///
    /// Links for removed segments are deleted, added segments get fresh
    /// `Pending` links, untouched links keep their status. Every segment on
    /// either side of the difference is reconciled and the report status is
    /// recomputed, all in one unit of work.
    pub async fn update_report_associations(
        &self,
        actor: &Actor,
        report_id: ReportId,
        segment_ids: &[SegmentId],
    ) -> Result<Vec<ReportDrainageLink>> {
        let segment_ids = dedupe(segment_ids);

        let mut tx = self.store.begin_transaction().await?;
        let outcome = sync_associations(tx.as_mut(), actor, report_id, &segment_ids).await;
        let links = finish(tx, outcome).await?;

        tracing::info!(
            report_id = report_id.0,
            segments = segment_ids.len(),
            "Report associations updated"
        );
        Ok(links)
    }

    /// Edit a report's content, and its segment associations when the edit
    /// carries a segment list.
    ///
    /// Staff or the report's owner may edit. Status is untouched apart from
    /// the recomputation that follows an association change. A new
    /// attachment replaces the stored one and the old file is removed once
    /// the edit has committed.
    pub async fn update_report(
        &self,
        actor: &Actor,
        report_id: ReportId,
        edit: ReportEdit,
    ) -> Result<ReportDetail> {
        let ValidDetails { mut fields, sub_district_name } = validate_details((&edit).into())?;
        if let Some(upload) = &edit.attachment {
            self.validate_attachment("attachment", upload)?;
        }
        fields.sub_district_id =
            self.sub_district_for(fields.point, sub_district_name.as_deref()).await?;
        let segment_ids = edit.segment_ids.as_deref().map(dedupe);

        if let Some(upload) = &edit.attachment {
            fields.attachment = Some(self.files.save("reports", upload).await?);
        }
        let stored_attachment = fields.attachment.clone();

        let mut tx = self.store.begin_transaction().await?;
        let outcome = apply_edit(tx.as_mut(), actor, report_id, fields, segment_ids.as_deref()).await;
        let (detail, replaced) = match finish(tx, outcome).await {
            Ok(done) => done,
            Err(e) => {
                if let Some(path) = &stored_attachment {
                    self.discard_attachment(path).await;
                }
                return Err(e);
            }
        };

        if let Some(path) = &replaced {
            self.discard_attachment(path).await;
        }
        tracing::info!(
            report_id = report_id.0,
            segments = segment_ids.map(|ids| ids.len()),
            attachment_replaced = replaced.is_some(),
            "Report updated"
        );
        Ok(detail)
    }

    /// Delete a report and its links, then reconcile the segments it touched.
    ///
    /// Staff may delete any report, a signed-in citizen only their own.
    pub async fn delete_report(&self, actor: &Actor, report_id: ReportId) -> Result<()> {
        let mut tx = self.store.begin_transaction().await?;
        let outcome = remove_report(tx.as_mut(), actor, report_id).await;
        let report = finish(tx, outcome).await?;

        if let Some(path) = &report.attachment {
            self.discard_attachment(path).await;
        }
        tracing::info!(report_id = report_id.0, "Report deleted");
        Ok(())
    }

    /// Manual staff status change.
    ///
    /// `Aborted` is always accepted. Any other status is only accepted while
    /// the report has no attached links, because the links own it otherwise.
    pub async fn set_report_status(
        &self,
        actor: &Actor,
        report_id: ReportId,
        status: ReportStatus,
    ) -> Result<Report> {
        self.require_staff(actor, format!("change status of report {}", report_id))?;

        let mut tx = self.store.begin_transaction().await?;
        let outcome = override_status(tx.as_mut(), report_id, status).await;
        let report = finish(tx, outcome).await?;

        tracing::info!(report_id = report_id.0, status = status.as_str(), "Report status set");
        Ok(report)
    }

    /// Reports visible to the actor: everything for staff, own reports otherwise
    pub async fn list_reports_for(&self, actor: &Actor) -> Result<Vec<Report>> {
        let reports = self.store.list_reports().await?;
        if actor.is_staff() {
            return Ok(reports);
        }
        Ok(reports.into_iter().filter(|r| r.is_owned_by(actor)).collect())
    }

    /// A report with its links, for staff or the report's owner
    pub async fn report_detail(&self, actor: &Actor, report_id: ReportId) -> Result<ReportDetail> {
        let report = self
            .store
            .get_report(report_id)
            .await?
            .ok_or_else(|| DrainError::not_found("report", report_id.0))?;
        if !can_manage(actor, &report) {
            return Err(DrainError::unauthorized(format!("view report {}", report_id)));
        }

        let links = self
            .store
            .list_links()
            .await?
            .into_iter()
            .filter(|l| l.report_id == report_id)
            .collect();
        Ok(ReportDetail { report, links })
    }
}

async fn insert_with_links(
    tx: &mut dyn UnitOfWork,
    report: NewReport,
    segment_ids: &[SegmentId],
) -> Result<Report> {
    for id in segment_ids {
        if tx.get_segment(*id).await?.is_none() {
            return Err(DrainError::not_found("drainage segment", id.0));
        }
    }

    let created = tx.insert_report(report).await?;
    for id in segment_ids {
        tx.insert_link(created.id, *id).await?;
    }
    for id in segment_ids {
        reconcile_segment(tx, *id).await?;
    }
    Ok(created)
}

/// Load a report the actor is allowed to change
async fn managed_report(
    tx: &mut dyn UnitOfWork,
    actor: &Actor,
    report_id: ReportId,
    action: &str,
) -> Result<Report> {
    let report = tx
        .get_report(report_id)
        .await?
        .ok_or_else(|| DrainError::not_found("report", report_id.0))?;
    if !can_manage(actor, &report) {
        return Err(DrainError::unauthorized(format!("{} report {}", action, report_id)));
    }
    Ok(report)
}

async fn sync_associations(
    tx: &mut dyn UnitOfWork,
    actor: &Actor,
    report_id: ReportId,
    segment_ids: &[SegmentId],
) -> Result<Vec<ReportDrainageLink>> {
    managed_report(tx, actor, report_id, "edit associations of").await?;
    replace_links(tx, report_id, segment_ids).await?;
    tx.links_for_report(report_id).await
}

/// Make the report's attached links match `segment_ids` and reconcile both sides
async fn replace_links(
    tx: &mut dyn UnitOfWork,
    report_id: ReportId,
    segment_ids: &[SegmentId],
) -> Result<()> {
    for id in segment_ids {
        if tx.get_segment(*id).await?.is_none() {
            return Err(DrainError::not_found("drainage segment", id.0));
        }
    }

    let wanted: BTreeSet<SegmentId> = segment_ids.iter().copied().collect();
    let current = tx.links_for_report(report_id).await?;
    let linked: BTreeSet<SegmentId> = current.iter().filter_map(|l| l.segment_id).collect();

    let mut touched = BTreeSet::new();
    for link in &current {
        if let Some(segment) = link.segment_id.filter(|s| !wanted.contains(s)) {
            tx.delete_link(link.id).await?;
            touched.insert(segment);
        }
    }
    for segment in wanted.difference(&linked) {
        tx.insert_link(report_id, *segment).await?;
        touched.insert(*segment);
    }

    for segment in &touched {
        reconcile_segment(tx, *segment).await?;
    }
    recompute_report(tx, report_id).await?;
    Ok(())
}

/// Returns the updated report and the attachment path it no longer uses
async fn apply_edit(
    tx: &mut dyn UnitOfWork,
    actor: &Actor,
    report_id: ReportId,
    mut fields: ReportFields,
    segment_ids: Option<&[SegmentId]>,
) -> Result<(ReportDetail, Option<String>)> {
    let current = managed_report(tx, actor, report_id, "edit").await?;
    let replaced = if fields.attachment.is_some() {
        current.attachment
    } else {
        fields.attachment = current.attachment;
        None
    };

    tx.update_report_fields(report_id, fields).await?;
    if let Some(ids) = segment_ids {
        replace_links(tx, report_id, ids).await?;
    }

    let report = tx
        .get_report(report_id)
        .await?
        .ok_or_else(|| DrainError::not_found("report", report_id.0))?;
    let links = tx.links_for_report(report_id).await?;
    Ok((ReportDetail { report, links }, replaced))
}

async fn remove_report(
    tx: &mut dyn UnitOfWork,
    actor: &Actor,
    report_id: ReportId,
) -> Result<Report> {
    let report = managed_report(tx, actor, report_id, "delete").await?;

    let links = tx.links_for_report(report_id).await?;
    for link in &links {
        tx.delete_link(link.id).await?;
    }
    tx.delete_report(report_id).await?;

    let segments: BTreeSet<SegmentId> = links.iter().filter_map(|l| l.segment_id).collect();
    for segment in segments {
        reconcile_segment(tx, segment).await?;
    }
    Ok(report)
}

async fn override_status(
    tx: &mut dyn UnitOfWork,
    report_id: ReportId,
    status: ReportStatus,
) -> Result<Report> {
    let report = tx
        .get_report(report_id)
        .await?
        .ok_or_else(|| DrainError::not_found("report", report_id.0))?;

    if status != ReportStatus::Aborted {
        let links = tx.links_for_report(report_id).await?;
        if links.iter().any(|l| l.is_active()) {
            return Err(DrainError::DerivedStatus {
                report: report_id.0,
                status: status.as_str().to_string(),
            });
        }
    }

    tx.update_report_status(report_id, status).await?;
    Ok(Report { status, ..report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use drainwatch_core::models::{Geometry, UserId};

    fn submission() -> ReportSubmission {
        ReportSubmission {
            title: "Saluran tersumbat".into(),
            description: "Sampah menumpuk di gorong-gorong".into(),
            geometry: Some(Geometry::polygon(vec![
                [109.339, -0.021],
                [109.341, -0.021],
                [109.341, -0.019],
                [109.339, -0.021],
            ])),
            point: Some(LngLat::new(109.3395, -0.0205)),
            ..Default::default()
        }
    }

    #[test]
    fn test_point_is_kept_as_given() {
        let valid = validate_submission(&Actor::citizen(UserId(1)), &submission()).unwrap();
        assert_eq!(valid.report.point, LngLat::new(109.3395, -0.0205));
        assert_eq!(valid.report.user_id, Some(UserId(1)));
        assert!(valid.report.guest.is_none());
    }

    #[test]
    fn test_point_is_required() {
        let mut input = submission();
        input.point = None;
        let err = validate_submission(&Actor::citizen(UserId(1)), &input).unwrap_err();
        assert!(matches!(err, DrainError::Validation { field, .. } if field == "point"));

        input.point = Some(LngLat::new(200.0, 0.0));
        assert!(validate_submission(&Actor::citizen(UserId(1)), &input).is_err());
    }

    #[test]
    fn test_edit_uses_same_rules() {
        let edit = ReportEdit {
            title: "Saluran tersumbat".into(),
            description: "Sudah dibersihkan sebagian".into(),
            sub_district_name: Some("all".into()),
            geometry: Some(Geometry::point(109.34, -0.02)),
            point: Some(LngLat::new(109.34, -0.02)),
            ..Default::default()
        };
        let err = validate_details((&edit).into()).unwrap_err();
        assert!(matches!(err, DrainError::Validation { field, .. } if field == "sub_district"));

        let edit = ReportEdit { sub_district_name: None, ..edit };
        let valid = validate_details((&edit).into()).unwrap();
        assert_eq!(valid.fields.point, LngLat::new(109.34, -0.02));
        assert!(valid.fields.attachment.is_none());
    }

    #[test]
    fn test_required_fields() {
        let mut input = submission();
        input.title = "   ".into();
        assert!(matches!(
            validate_submission(&Actor::citizen(UserId(1)), &input),
            Err(DrainError::Validation { field, .. }) if field == "title"
        ));

        let mut input = submission();
        input.geometry = None;
        assert!(validate_submission(&Actor::citizen(UserId(1)), &input).is_err());

        let mut input = submission();
        input.description = "x".repeat(256);
        assert!(validate_submission(&Actor::citizen(UserId(1)), &input).is_err());
    }

    #[test]
    fn test_guest_needs_contact() {
        let err = validate_submission(&Actor::guest(), &submission()).unwrap_err();
        assert!(matches!(err, DrainError::Validation { field, .. } if field == "reporter_name"));

        let mut input = submission();
        input.guest = Some(GuestReporter { name: "Budi".into(), contact: "".into() });
        let err = validate_submission(&Actor::guest(), &input).unwrap_err();
        assert!(matches!(err, DrainError::Validation { field, .. } if field == "reporter_contact"));

        input.guest = Some(GuestReporter { name: "Budi".into(), contact: "0812".into() });
        let valid = validate_submission(&Actor::guest(), &input).unwrap();
        assert_eq!(valid.report.guest.map(|g| g.contact), Some("0812".to_string()));
    }

    #[test]
    fn test_all_is_not_a_sub_district() {
        let mut input = submission();
        input.sub_district_name = Some("ALL".into());
        assert!(validate_submission(&Actor::citizen(UserId(1)), &input).is_err());
    }

    #[test]
    fn test_dedupe_keeps_order() {
        let ids = [SegmentId(9), SegmentId(7), SegmentId(9)];
        assert_eq!(dedupe(&ids), vec![SegmentId(9), SegmentId(7)]);
    }
}
