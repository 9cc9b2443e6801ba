//! In-memory storage for development and testing.
//!
//! A unit of work clones the whole state and swaps it back in on commit. Units
//! of work hold the store's writer lock until they commit, roll back or drop,
//! so at most one is open at a time and later ones wait in `begin_transaction`.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For production workloads, use the PostgreSQL backend.

use async_trait::async_trait;
use chrono::Utc;
use drainwatch_core::error::{DrainError, Result};
use drainwatch_core::models::{
    Condition, DrainageSegment, FloodZone, LinkId, LinkStatus, NewReport, Report,
    ReportDrainageLink, ReportFields, ReportId, ReportStatus, SegmentId, StaffMember, SubDistrict,
    UserId,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::ports::{DrainageCatalog, Transaction, Transactional, UnitOfWork};

/// Reference data loaded into a fresh store
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub sub_districts: Vec<SubDistrict>,
    pub segments: Vec<DrainageSegment>,
    pub flood_zones: Vec<FloodZone>,
    pub staff: Vec<StaffMember>,
}

impl Seed {
    /// Read a seed from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    sub_districts: BTreeMap<i64, SubDistrict>,
    segments: BTreeMap<SegmentId, DrainageSegment>,
    flood_zones: BTreeMap<i64, FloodZone>,
    staff: BTreeMap<UserId, StaffMember>,
    reports: BTreeMap<ReportId, Report>,
    links: BTreeMap<LinkId, ReportDrainageLink>,
    next_report_id: i64,
    next_link_id: i64,
}

/// In-memory implementation of the storage ports
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
    writer: Arc<Mutex<()>>,
    /// Remaining writes before an injected failure, `None` when disabled
    write_budget: Arc<RwLock<Option<usize>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with reference data
    pub fn from_seed(seed: Seed) -> Self {
        let store = Self::new();
        for sub_district in seed.sub_districts {
            store.insert_sub_district(sub_district);
        }
        for segment in seed.segments {
            store.insert_segment(segment);
        }
        for zone in seed.flood_zones {
            store.insert_flood_zone(zone);
        }
        for member in seed.staff {
            store.add_staff(member);
        }
        store
    }

    pub fn insert_sub_district(&self, sub_district: SubDistrict) {
        let mut state = self.state.write().unwrap();
        state.sub_districts.insert(sub_district.id.0, sub_district);
    }

    pub fn insert_segment(&self, segment: DrainageSegment) {
        let mut state = self.state.write().unwrap();
        state.segments.insert(segment.id, segment);
    }

    pub fn insert_flood_zone(&self, zone: FloodZone) {
        let mut state = self.state.write().unwrap();
        state.flood_zones.insert(zone.id.0, zone);
    }

    pub fn add_staff(&self, member: StaffMember) {
        let mut state = self.state.write().unwrap();
        state.staff.insert(member.id, member);
    }

    /// Make the write after `writes` successful ones fail with a storage error
    pub fn fail_writes_after(&self, writes: usize) {
        *self.write_budget.write().unwrap() = Some(writes);
    }

    /// Disable failure injection
    pub fn clear_fault(&self) {
        *self.write_budget.write().unwrap() = None;
    }

    fn snapshot(&self) -> MemoryState {
        self.state.read().unwrap().clone()
    }
}

#[async_trait]
impl DrainageCatalog for MemoryStore {
    async fn list_sub_districts(&self) -> Result<Vec<SubDistrict>> {
        let state = self.state.read().unwrap();
        Ok(state.sub_districts.values().cloned().collect())
    }

    async fn find_sub_district_by_name(&self, name: &str) -> Result<Option<SubDistrict>> {
        let state = self.state.read().unwrap();
        Ok(state.sub_districts.values().find(|s| s.name == name).cloned())
    }

    async fn list_segments(&self) -> Result<Vec<DrainageSegment>> {
        let state = self.state.read().unwrap();
        Ok(state.segments.values().cloned().collect())
    }

    async fn get_segment(&self, id: SegmentId) -> Result<Option<DrainageSegment>> {
        let state = self.state.read().unwrap();
        Ok(state.segments.get(&id).cloned())
    }

    async fn list_flood_zones(&self) -> Result<Vec<FloodZone>> {
        let state = self.state.read().unwrap();
        Ok(state.flood_zones.values().cloned().collect())
    }

    async fn list_reports(&self) -> Result<Vec<Report>> {
        let state = self.state.read().unwrap();
        Ok(state.reports.values().cloned().collect())
    }

    async fn get_report(&self, id: ReportId) -> Result<Option<Report>> {
        let state = self.state.read().unwrap();
        Ok(state.reports.get(&id).cloned())
    }

    async fn list_links(&self) -> Result<Vec<ReportDrainageLink>> {
        let state = self.state.read().unwrap();
        Ok(state.links.values().cloned().collect())
    }

    async fn staff_recipients(&self, exclude: Option<UserId>) -> Result<Vec<StaffMember>> {
        let state = self.state.read().unwrap();
        Ok(state.staff.values().filter(|m| Some(m.id) != exclude).cloned().collect())
    }
}

#[async_trait]
impl Transactional for MemoryStore {
    async fn begin_transaction(&self) -> Result<Box<dyn UnitOfWork>> {
        let writer = self.writer.clone().lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            working: self.snapshot(),
            store: self.clone(),
            _writer: writer,
        }))
    }
}

/// Unit of work over a private copy of the store state
pub struct MemoryUnitOfWork {
    working: MemoryState,
    store: MemoryStore,
    _writer: OwnedMutexGuard<()>,
}

impl MemoryUnitOfWork {
    fn charge_write(&self) -> Result<()> {
        let mut budget = self.store.write_budget.write().unwrap();
        match budget.as_mut() {
            Some(0) => Err(DrainError::Storage("injected write failure".to_string())),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Transaction for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryUnitOfWork { working, store, _writer } = *self;
        *store.state.write().unwrap() = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn get_report(&mut self, id: ReportId) -> Result<Option<Report>> {
        Ok(self.working.reports.get(&id).cloned())
    }

    async fn insert_report(&mut self, report: NewReport) -> Result<Report> {
        self.charge_write()?;
        self.working.next_report_id += 1;
        let id = ReportId(self.working.next_report_id);
        let now = Utc::now();

        let stored = Report {
            id,
            title: report.title,
            description: report.description,
            category: report.category,
            location_name: report.location_name,
            geometry: report.geometry,
            point: report.point,
            sub_district_id: report.sub_district_id,
            user_id: report.user_id,
            guest: report.guest,
            attachment: report.attachment,
            status: ReportStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.working.reports.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_report_status(&mut self, id: ReportId, status: ReportStatus) -> Result<()> {
        self.charge_write()?;
        let report = self
            .working
            .reports
            .get_mut(&id)
            .ok_or_else(|| DrainError::not_found("report", id.0))?;
        report.status = status;
        report.updated_at = Utc::now();
        Ok(())
    }

    async fn update_report_fields(&mut self, id: ReportId, fields: ReportFields) -> Result<Report> {
        self.charge_write()?;
        let report = self
            .working
            .reports
            .get_mut(&id)
            .ok_or_else(|| DrainError::not_found("report", id.0))?;
        report.title = fields.title;
        report.description = fields.description;
        report.category = fields.category;
        report.location_name = fields.location_name;
        report.geometry = fields.geometry;
        report.point = fields.point;
        report.sub_district_id = fields.sub_district_id;
        report.attachment = fields.attachment;
        report.updated_at = Utc::now();
        Ok(report.clone())
    }

    async fn delete_report(&mut self, id: ReportId) -> Result<()> {
        self.charge_write()?;
        self.working.reports.remove(&id);
        self.working.links.retain(|_, link| link.report_id != id);
        Ok(())
    }

    async fn get_segment(&mut self, id: SegmentId) -> Result<Option<DrainageSegment>> {
        Ok(self.working.segments.get(&id).cloned())
    }

    async fn set_segment_condition(&mut self, id: SegmentId, condition: Condition) -> Result<()> {
        self.charge_write()?;
        let segment = self
            .working
            .segments
            .get_mut(&id)
            .ok_or_else(|| DrainError::not_found("drainage segment", id.0))?;
        segment.condition = condition;
        Ok(())
    }

    async fn delete_segment(&mut self, id: SegmentId) -> Result<()> {
        self.charge_write()?;
        self.working.segments.remove(&id);
        Ok(())
    }

    async fn get_link(&mut self, id: LinkId) -> Result<Option<ReportDrainageLink>> {
        Ok(self.working.links.get(&id).cloned())
    }

    async fn lock_link_segment(&mut self, link: LinkId) -> Result<Option<SegmentId>> {
        Ok(self.working.links.get(&link).and_then(|l| l.segment_id))
    }

    async fn links_for_report(&mut self, report: ReportId) -> Result<Vec<ReportDrainageLink>> {
        Ok(self.working.links.values().filter(|l| l.report_id == report).cloned().collect())
    }

    async fn links_for_segment(&mut self, segment: SegmentId) -> Result<Vec<ReportDrainageLink>> {
        Ok(self
            .working
            .links
            .values()
            .filter(|l| l.segment_id == Some(segment))
            .cloned()
            .collect())
    }

    async fn insert_link(
        &mut self,
        report: ReportId,
        segment: SegmentId,
    ) -> Result<ReportDrainageLink> {
        self.charge_write()?;
        if !self.working.segments.contains_key(&segment) {
            return Err(DrainError::not_found("drainage segment", segment.0));
        }
        if self
            .working
            .links
            .values()
            .any(|l| l.report_id == report && l.segment_id == Some(segment))
        {
            return Err(DrainError::Storage(format!(
                "link for report {} and segment {} already exists",
                report, segment
            )));
        }

        self.working.next_link_id += 1;
        let now = Utc::now();
        let link = ReportDrainageLink {
            id: LinkId(self.working.next_link_id),
            report_id: report,
            segment_id: Some(segment),
            status: LinkStatus::Pending,
            remediation_point: None,
            remediation_attachment: None,
            created_at: now,
            updated_at: now,
        };
        self.working.links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn save_link(&mut self, link: &ReportDrainageLink) -> Result<()> {
        self.charge_write()?;
        let stored = self
            .working
            .links
            .get_mut(&link.id)
            .ok_or_else(|| DrainError::not_found("remediation link", link.id.0))?;
        stored.status = link.status;
        stored.remediation_point = link.remediation_point;
        stored.remediation_attachment = link.remediation_attachment.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_link(&mut self, id: LinkId) -> Result<()> {
        self.charge_write()?;
        self.working.links.remove(&id);
        Ok(())
    }

    async fn detach_links_for_segment(
        &mut self,
        segment: SegmentId,
    ) -> Result<Vec<ReportDrainageLink>> {
        self.charge_write()?;
        let now = Utc::now();
        let mut detached = Vec::new();
        for link in self.working.links.values_mut() {
            if link.segment_id == Some(segment) {
                link.segment_id = None;
                link.updated_at = now;
                detached.push(link.clone());
            }
        }
        Ok(detached)
    }
}
