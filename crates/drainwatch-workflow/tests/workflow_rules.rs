mod common;

use common::*;
use drainwatch_core::config::WorkflowConfig;
use drainwatch_core::error::{DrainError, ErrorKind};
use drainwatch_core::models::{
    Actor, Condition, Geometry, GuestReporter, LngLat, RemediationInput, ReportEdit, ReportId,
    ReportStatus, SegmentId, SubDistrictId, LATEST_REPORTS,
};
use drainwatch_core::ports::Upload;
use drainwatch_store::ports::DrainageCatalog;

fn guest_submission() -> drainwatch_core::models::ReportSubmission {
    let mut input = submission(&[7]);
    input.guest = Some(GuestReporter { name: "Budi".into(), contact: "0812-0000".into() });
    input
}

#[tokio::test]
async fn test_deletion_rights() {
    let fx = fixture();
    let guest_report = fx.service.submit_report(&Actor::guest(), guest_submission()).await.unwrap();
    let own = fx.service.submit_report(&citizen(), submission(&[9])).await.unwrap();

    let err = fx.service.delete_report(&Actor::guest(), guest_report.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    let err = fx.service.delete_report(&Actor::citizen(OTHER_CITIZEN), own.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(fx.store.get_report(own.id).await.unwrap().is_some());

    fx.service.delete_report(&citizen(), own.id).await.unwrap();
    fx.service.delete_report(&staff(), guest_report.id).await.unwrap();
    assert!(fx.store.list_reports().await.unwrap().is_empty());
    assert_consistent(&fx.store).await;
}

#[tokio::test]
async fn test_staff_only_operations() {
    let fx = fixture();
    let created = fx.service.submit_report(&citizen(), submission(&[7])).await.unwrap();
    let link = link_for(&fx.store, created.id, 7).await;

    let err = fx
        .service
        .mark_link_fixed(&citizen(), link.id, RemediationInput { point: P, attachment: None })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    let err = fx
        .service
        .set_report_status(&citizen(), created.id, ReportStatus::Aborted)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    assert!(fx.service.delete_segment(&citizen(), SegmentId(7)).await.is_err());
    assert!(fx.service.dashboard_stats(&citizen()).await.is_err());

    let err = fx
        .service
        .update_report_associations(&Actor::citizen(OTHER_CITIZEN), created.id, &[SegmentId(9)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[tokio::test]
async fn test_linked_report_status_is_derived() {
    let fx = fixture();
    let created = fx.service.submit_report(&citizen(), submission(&[7])).await.unwrap();

    for status in [ReportStatus::Fixed, ReportStatus::InProgress, ReportStatus::Pending] {
        let err = fx.service.set_report_status(&staff(), created.id, status).await.unwrap_err();
        assert!(
            matches!(err, DrainError::DerivedStatus { report, .. } if report == created.id.0),
            "got {:?}",
            err
        );
    }

    let aborted = fx
        .service
        .set_report_status(&staff(), created.id, ReportStatus::Aborted)
        .await
        .unwrap();
    assert_eq!(aborted.status, ReportStatus::Aborted);

    // reconciliation leaves aborted reports alone
    let link = link_for(&fx.store, created.id, 7).await;
    fx.service
        .mark_link_fixed(&staff(), link.id, RemediationInput { point: P, attachment: None })
        .await
        .unwrap();
    assert_eq!(report(&fx.store, created.id).await.status, ReportStatus::Aborted);
    assert_eq!(segment(&fx.store, 7).await.condition, Condition::Good);
}

#[tokio::test]
async fn test_unlinked_report_status_is_manual() {
    let fx = fixture();
    let created = fx.service.submit_report(&citizen(), submission(&[])).await.unwrap();

    let updated = fx
        .service
        .set_report_status(&staff(), created.id, ReportStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(updated.status, ReportStatus::InProgress);
    assert_eq!(report(&fx.store, created.id).await.status, ReportStatus::InProgress);

    // with no links, recomputation keeps the manual status
    assert_eq!(
        fx.service.recompute_report_status(created.id).await.unwrap(),
        ReportStatus::InProgress
    );
}

#[tokio::test]
async fn test_guest_submission_requires_contact() {
    let fx = fixture();

    let err = fx.service.submit_report(&Actor::guest(), submission(&[7])).await.unwrap_err();
    assert!(is_validation(&err, "reporter_name"));
    assert!(fx.store.list_reports().await.unwrap().is_empty());

    let created = fx.service.submit_report(&Actor::guest(), guest_submission()).await.unwrap();
    assert!(created.user_id.is_none());
    assert_eq!(created.guest.unwrap().name, "Budi");
}

#[tokio::test]
async fn test_attachment_rules() {
    let fx = fixture();

    let mut input = submission(&[7]);
    input.attachment = Some(Upload::new(vec![0; 10], "gif"));
    let err = fx.service.submit_report(&citizen(), input).await.unwrap_err();
    assert!(is_validation(&err, "attachment"));

    let mut input = submission(&[7]);
    input.attachment = Some(jpg(2049));
    let err = fx.service.submit_report(&citizen(), input).await.unwrap_err();
    assert!(is_validation(&err, "attachment"));

    let mut input = submission(&[7]);
    input.attachment = Some(Upload::new(vec![0; 10], "PNG"));
    let created = fx.service.submit_report(&citizen(), input).await.unwrap();
    let path = created.attachment.unwrap();
    assert!(path.starts_with("reports/") && path.ends_with(".png"));
    assert_eq!(fx.service.attachment_url(&path), format!("memory://{}", path));

    fx.service.delete_report(&citizen(), created.id).await.unwrap();
    assert!(fx.files.files.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_notifications() {
    let fx = fixture();

    let by_citizen = fx.service.submit_report(&citizen(), submission(&[])).await.unwrap();
    fx.service.submit_report(&staff(), submission(&[])).await.unwrap();
    let by_officer_account =
        fx.service.submit_report(&Actor::citizen(OFFICER), submission(&[])).await.unwrap();
    let by_guest = fx.service.submit_report(&Actor::guest(), guest_submission()).await.unwrap();

    let sent = fx.notifier.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![
            (by_citizen.id, vec![ADMIN, OFFICER]),
            // the submitter never notifies themselves
            (by_officer_account.id, vec![ADMIN]),
            (by_guest.id, vec![ADMIN, OFFICER]),
        ]
    );
}

#[tokio::test]
async fn test_auto_link_nearby() {
    let fx = fixture_with(WorkflowConfig { auto_link_nearby: true, ..WorkflowConfig::default() });

    let mut input = submission(&[]);
    input.segment_ids = None;
    let created = fx.service.submit_report(&citizen(), input).await.unwrap();

    let links = links_of(&fx.store, created.id).await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].segment_id, Some(SegmentId(7)));

    // an explicit empty list is respected
    let created = fx.service.submit_report(&citizen(), submission(&[])).await.unwrap();
    assert!(links_of(&fx.store, created.id).await.is_empty());
}

#[tokio::test]
async fn test_report_visibility_and_dashboard() {
    let fx = fixture();
    let mine = fx.service.submit_report(&citizen(), submission(&[7])).await.unwrap();
    let mut other = submission(&[]);
    other.category = None;
    fx.service.submit_report(&Actor::citizen(OTHER_CITIZEN), other).await.unwrap();

    let visible = fx.service.list_reports_for(&citizen()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, mine.id);
    assert!(fx.service.list_reports_for(&Actor::guest()).await.unwrap().is_empty());
    assert_eq!(fx.service.list_reports_for(&staff()).await.unwrap().len(), 2);

    let detail = fx.service.report_detail(&citizen(), mine.id).await.unwrap();
    assert_eq!(detail.links.len(), 1);
    assert!(fx.service.report_detail(&Actor::citizen(OTHER_CITIZEN), mine.id).await.is_err());

    let stats = fx.service.dashboard_stats(&staff()).await.unwrap();
    assert_eq!(stats.total_segments, 4);
    assert_eq!(stats.total_flood_zones, 1);
    assert_eq!(stats.total_reports, 2);
    assert_eq!(stats.fixed_reports, 0);
    assert_eq!(stats.reports_by_status.get("Pending"), Some(&2));
    assert_eq!(stats.reports_by_category.get("Sumbatan"), Some(&1));
    assert_eq!(stats.reports_by_category.get("uncategorized"), Some(&1));
    assert_eq!(stats.segments_by_condition.get("HasProblem"), Some(&1));
    assert_eq!(stats.segments_by_condition.get("Good"), Some(&3));
}

fn edit(segment_ids: Option<&[i64]>) -> ReportEdit {
    ReportEdit {
        title: "Saluran tersumbat total".into(),
        description: "Air tidak surut sejak kemarin".into(),
        category: Some("Banjir".into()),
        geometry: Some(Geometry::point(P.lng, P.lat)),
        point: Some(P),
        segment_ids: segment_ids.map(|ids| ids.iter().copied().map(SegmentId).collect()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_edit_updates_fields_and_keeps_links() {
    let fx = fixture();
    let created = fx.service.submit_report(&citizen(), submission(&[7])).await.unwrap();

    // moved into Pontianak Barat
    let moved = LngLat::new(109.30, -0.02);
    let mut input = edit(None);
    input.point = Some(moved);
    input.geometry = Some(Geometry::point(moved.lng, moved.lat));
    let detail = fx.service.update_report(&citizen(), created.id, input).await.unwrap();

    assert_eq!(detail.report.title, "Saluran tersumbat total");
    assert_eq!(detail.report.category.as_deref(), Some("Banjir"));
    assert_eq!(detail.report.point, moved);
    assert_eq!(detail.report.sub_district_id, Some(SubDistrictId(1)));
    assert_eq!(detail.report.user_id, created.user_id);
    assert_eq!(detail.report.created_at, created.created_at);
    assert_eq!(detail.report.status, ReportStatus::Pending);
    assert_eq!(detail.links.len(), 1);
    assert_eq!(report(&fx.store, created.id).await, detail.report);
}

#[tokio::test]
async fn test_edit_replaces_associations() {
    let fx = fixture();
    let created = fx.service.submit_report(&citizen(), submission(&[7, 9])).await.unwrap();
    let fixed = link_for(&fx.store, created.id, 9).await;
    fx.service
        .mark_link_fixed(&staff(), fixed.id, RemediationInput { point: P, attachment: None })
        .await
        .unwrap();
    assert_eq!(report(&fx.store, created.id).await.status, ReportStatus::InProgress);

    let detail = fx.service.update_report(&citizen(), created.id, edit(Some(&[7, 5, 7]))).await.unwrap();

    let mut segments: Vec<_> = detail.links.iter().filter_map(|l| l.segment_id).collect();
    segments.sort();
    assert_eq!(segments, vec![SegmentId(5), SegmentId(7)]);
    // the fixed link left with segment 9
    assert_eq!(detail.report.status, ReportStatus::Pending);
    assert_eq!(segment(&fx.store, 5).await.condition, Condition::HasProblem);
    assert_eq!(segment(&fx.store, 9).await.condition, Condition::Good);
    assert_consistent(&fx.store).await;
}

#[tokio::test]
async fn test_edit_replaces_attachment() {
    let fx = fixture();
    let mut input = submission(&[7]);
    input.attachment = Some(jpg(1));
    let created = fx.service.submit_report(&citizen(), input).await.unwrap();
    let old_path = created.attachment.clone().unwrap();

    // no new file keeps the old one
    let detail = fx.service.update_report(&citizen(), created.id, edit(None)).await.unwrap();
    assert_eq!(detail.report.attachment.as_deref(), Some(old_path.as_str()));

    let mut input = edit(None);
    input.attachment = Some(Upload::new(vec![0; 10], "png"));
    let detail = fx.service.update_report(&staff(), created.id, input).await.unwrap();

    let new_path = detail.report.attachment.unwrap();
    assert!(new_path.ends_with(".png"));
    let files = fx.files.files.lock().unwrap();
    assert!(files.contains_key(&new_path));
    assert!(!files.contains_key(&old_path));
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_edit_rights_and_missing_report() {
    let fx = fixture();
    let created = fx.service.submit_report(&citizen(), submission(&[7])).await.unwrap();
    let before = report(&fx.store, created.id).await;

    for actor in [Actor::citizen(OTHER_CITIZEN), Actor::guest()] {
        let mut input = edit(Some(&[5]));
        input.attachment = Some(jpg(1));
        let err = fx.service.update_report(&actor, created.id, input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }
    assert_eq!(report(&fx.store, created.id).await, before);
    assert_eq!(links_of(&fx.store, created.id).await.len(), 1);

    let mut input = edit(None);
    input.attachment = Some(jpg(1));
    let err = fx.service.update_report(&staff(), ReportId(999), input).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    // uploads from rejected edits are discarded
    assert!(fx.files.files.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_region_filters() {
    let fx = fixture();
    let ids = |segments: Vec<drainwatch_core::models::DrainageSegment>| -> Vec<i64> {
        segments.into_iter().map(|s| s.id.0).collect()
    };

    let all = fx.service.list_segments(None).await.unwrap();
    assert_eq!(ids(all), vec![5, 7, 9, 12]);
    let kota = fx.service.list_segments(Some("Pontianak Kota")).await.unwrap();
    assert_eq!(ids(kota), vec![5, 7, 9, 12]);
    assert!(fx.service.list_segments(Some("Pontianak Barat")).await.unwrap().is_empty());
    assert_eq!(fx.service.list_segments(Some("ALL")).await.unwrap().len(), 4);
    assert!(fx.service.list_segments(Some("Kubu Raya")).await.unwrap().is_empty());

    assert_eq!(fx.service.list_flood_zones(Some("Pontianak Kota")).await.unwrap().len(), 1);
    assert!(fx.service.list_flood_zones(Some("Pontianak Utara")).await.unwrap().is_empty());
    assert_eq!(fx.service.list_flood_zones(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_dashboard_latest_reports() {
    let fx = fixture();
    let mut submitted = Vec::new();
    for _ in 0..LATEST_REPORTS + 2 {
        submitted.push(fx.service.submit_report(&citizen(), submission(&[])).await.unwrap().id);
    }

    let stats = fx.service.dashboard_stats(&staff()).await.unwrap();
    let latest: Vec<ReportId> = stats.latest_reports.iter().map(|r| r.id).collect();
    let expected: Vec<ReportId> = submitted.iter().rev().take(LATEST_REPORTS).copied().collect();
    assert_eq!(latest, expected);
}
