//! Shared fixtures for workflow tests
#![allow(dead_code)]

use async_trait::async_trait;
use drainwatch_core::config::WorkflowConfig;
use drainwatch_core::error::{DrainError, Result};
use drainwatch_core::models::{
    Actor, Condition, DrainageSegment, FloodZone, FloodZoneId, Geometry, LinkStatus, LngLat,
    Report, ReportDrainageLink, ReportId, ReportStatus, ReportSubmission, SegmentId, StaffMember,
    SubDistrict, SubDistrictId, UserId,
};
use drainwatch_core::ports::{FileStore, Notifier, Upload};
use drainwatch_store::ports::DrainageCatalog;
use drainwatch_store::MemoryStore;
use drainwatch_workflow::DrainageService;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Report point used across scenarios, inside "Pontianak Kota"
pub const P: LngLat = LngLat { lng: 109.34, lat: -0.02 };

pub const ADMIN: UserId = UserId(1);
pub const OFFICER: UserId = UserId(2);
pub const CITIZEN: UserId = UserId(10);
pub const OTHER_CITIZEN: UserId = UserId(11);

/// Notifier that records every delivery
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(ReportId, Vec<UserId>)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_new_report(&self, report: &Report, recipients: &[StaffMember]) -> Result<()> {
        let ids = recipients.iter().map(|m| m.id).collect();
        self.sent.lock().unwrap().push((report.id, ids));
        Ok(())
    }
}

/// File store keeping uploads in a map
#[derive(Default)]
pub struct MemoryFileStore {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    counter: Mutex<u32>,
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn save(&self, folder: &str, upload: &Upload) -> Result<String> {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        let path = format!("{}/{}.{}", folder, counter, upload.normalized_extension());
        self.files.lock().unwrap().insert(path.clone(), upload.bytes.clone());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{}", path)
    }
}

pub struct Fixture {
    pub store: MemoryStore,
    pub files: Arc<MemoryFileStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub service: DrainageService,
}

pub fn square(name: &str, id: i64, min_lng: f64, min_lat: f64, size: f64) -> SubDistrict {
    SubDistrict {
        id: SubDistrictId(id),
        name: name.to_string(),
        boundary: vec![vec![
            LngLat::new(min_lng, min_lat),
            LngLat::new(min_lng + size, min_lat),
            LngLat::new(min_lng + size, min_lat + size),
            LngLat::new(min_lng, min_lat + size),
            LngLat::new(min_lng, min_lat),
        ]],
    }
}

pub fn line(id: i64, coords: Vec<[f64; 2]>) -> DrainageSegment {
    DrainageSegment {
        id: SegmentId(id),
        name: format!("Parit {}", id),
        function_class: None,
        length_meters: None,
        geometry: Geometry::line_string(coords),
        sub_district_id: Some(SubDistrictId(2)),
        condition: Condition::Good,
        properties: Default::default(),
    }
}

pub fn fixture() -> Fixture {
    fixture_with(WorkflowConfig::default())
}

pub fn fixture_with(config: WorkflowConfig) -> Fixture {
    let store = MemoryStore::new();
    store.insert_sub_district(square("Pontianak Barat", 1, 109.28, -0.05, 0.05));
    store.insert_sub_district(square("Pontianak Kota", 2, 109.33, -0.05, 0.05));
    store.insert_sub_district(square("Pontianak Utara", 3, 109.33, 0.01, 0.05));

    // first vertex ~1.1km east of P
    store.insert_segment(line(5, vec![[109.35, -0.03], [109.36, -0.03]]));
    // ~11m south of P
    store.insert_segment(line(7, vec![[109.339, -0.0201], [109.341, -0.0201]]));
    // ~111m south of P
    store.insert_segment(line(9, vec![[109.339, -0.021], [109.341, -0.021]]));
    // basin right under P; never matched by distance
    store.insert_segment(DrainageSegment {
        geometry: Geometry::polygon(vec![
            [109.3395, -0.0205],
            [109.3405, -0.0205],
            [109.3405, -0.0195],
            [109.3395, -0.0205],
        ]),
        ..line(12, vec![])
    });

    store.insert_flood_zone(FloodZone {
        id: FloodZoneId(1),
        name: "Sungai Jawi".into(),
        center: LngLat::new(109.341, -0.02),
        radius_meters: 300.0,
        sub_district_id: Some(SubDistrictId(2)),
    });

    store.add_staff(StaffMember { id: ADMIN, name: "Admin".into(), email: None });
    store.add_staff(StaffMember {
        id: OFFICER,
        name: "Petugas".into(),
        email: Some("petugas@example.org".into()),
    });

    let files = Arc::new(MemoryFileStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let service =
        DrainageService::new(Arc::new(store.clone()), files.clone(), notifier.clone(), config);

    Fixture { store, files, notifier, service }
}

pub fn submission(segment_ids: &[i64]) -> ReportSubmission {
    ReportSubmission {
        title: "Saluran tersumbat".into(),
        description: "Air meluap ke jalan setelah hujan".into(),
        category: Some("Sumbatan".into()),
        geometry: Some(Geometry::point(P.lng, P.lat)),
        point: Some(P),
        segment_ids: Some(segment_ids.iter().copied().map(SegmentId).collect()),
        ..Default::default()
    }
}

pub fn jpg(kb: usize) -> Upload {
    Upload::new(vec![0xFF; kb * 1024], "jpg")
}

pub fn staff() -> Actor {
    Actor::staff(ADMIN)
}

pub fn citizen() -> Actor {
    Actor::citizen(CITIZEN)
}

pub async fn segment(store: &MemoryStore, id: i64) -> DrainageSegment {
    store.get_segment(SegmentId(id)).await.unwrap().unwrap()
}

pub async fn report(store: &MemoryStore, id: ReportId) -> Report {
    store.get_report(id).await.unwrap().unwrap()
}

pub async fn links_of(store: &MemoryStore, id: ReportId) -> Vec<ReportDrainageLink> {
    let links = store.list_links().await.unwrap();
    links.into_iter().filter(|l| l.report_id == id).collect()
}

pub async fn link_for(store: &MemoryStore, report: ReportId, segment: i64) -> ReportDrainageLink {
    links_of(store, report)
        .await
        .into_iter()
        .find(|l| l.segment_id == Some(SegmentId(segment)))
        .unwrap()
}

/// Check the stored derived fields against the link table.
///
/// Only attached links count. A segment has a problem exactly when one of
/// its links is not fixed. A report with attached links is Fixed when all
/// of them are fixed, In Progress when some are, Pending when none are;
/// Aborted reports and reports without attached links keep what they have.
pub async fn assert_consistent(store: &MemoryStore) {
    let links = store.list_links().await.unwrap();

    for segment in store.list_segments().await.unwrap() {
        let open = links
            .iter()
            .filter(|l| l.segment_id == Some(segment.id))
            .any(|l| l.status != LinkStatus::Fixed);
        let expected = if open { Condition::HasProblem } else { Condition::Good };
        assert_eq!(
            segment.condition, expected,
            "segment {} condition disagrees with its links",
            segment.id
        );
    }

    for report in store.list_reports().await.unwrap() {
        if report.status == ReportStatus::Aborted {
            continue;
        }
        let attached: Vec<&ReportDrainageLink> = links
            .iter()
            .filter(|l| l.report_id == report.id && l.segment_id.is_some())
            .collect();
        if attached.is_empty() {
            continue;
        }

        let fixed = attached.iter().filter(|l| l.status == LinkStatus::Fixed).count();
        let expected = match fixed {
            0 => ReportStatus::Pending,
            n if n == attached.len() => ReportStatus::Fixed,
            _ => ReportStatus::InProgress,
        };
        assert_eq!(report.status, expected, "report {} status disagrees", report.id);
    }
}

pub fn is_validation(err: &DrainError, expected_field: &str) -> bool {
    matches!(err, DrainError::Validation { field, .. } if field == expected_field)
}
