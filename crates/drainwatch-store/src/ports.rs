use async_trait::async_trait;
use drainwatch_core::error::Result;
use drainwatch_core::models::{
    Condition, DrainageSegment, FloodZone, LinkId, NewReport, Report, ReportDrainageLink,
    ReportFields, ReportId, ReportStatus, SegmentId, StaffMember, SubDistrict, UserId,
};

/// Port for read-only catalog queries outside a transaction
#[async_trait]
pub trait DrainageCatalog: Send + Sync {
    /// List all sub-district boundaries
    async fn list_sub_districts(&self) -> Result<Vec<SubDistrict>>;

    /// Look up a sub-district by its unique name
    async fn find_sub_district_by_name(&self, name: &str) -> Result<Option<SubDistrict>>;

    /// List all drainage segments
    async fn list_segments(&self) -> Result<Vec<DrainageSegment>>;

    /// Get a specific segment by ID
    async fn get_segment(&self, id: SegmentId) -> Result<Option<DrainageSegment>>;

    /// List all flood zones
    async fn list_flood_zones(&self) -> Result<Vec<FloodZone>>;

    /// List all reports, oldest first
    async fn list_reports(&self) -> Result<Vec<Report>>;

    /// Get a specific report by ID
    async fn get_report(&self, id: ReportId) -> Result<Option<Report>>;

    /// List all remediation links
    async fn list_links(&self) -> Result<Vec<ReportDrainageLink>>;

    /// Staff members to notify, optionally leaving one user out
    async fn staff_recipients(&self, exclude: Option<UserId>) -> Result<Vec<StaffMember>>;
}

/// Transaction handle
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Mutations and consistent reads scoped to one transaction.
///
/// Dropping a unit of work without committing discards its changes.
#[async_trait]
pub trait UnitOfWork: Transaction {
    async fn get_report(&mut self, id: ReportId) -> Result<Option<Report>>;

    /// Persist a new report in `Pending` and return it with its assigned id
    async fn insert_report(&mut self, report: NewReport) -> Result<Report>;

    async fn update_report_status(&mut self, id: ReportId, status: ReportStatus) -> Result<()>;

    /// Overwrite the editable columns, keeping owner, status and creation time
    async fn update_report_fields(&mut self, id: ReportId, fields: ReportFields) -> Result<Report>;

    async fn delete_report(&mut self, id: ReportId) -> Result<()>;

    async fn get_segment(&mut self, id: SegmentId) -> Result<Option<DrainageSegment>>;

    async fn set_segment_condition(&mut self, id: SegmentId, condition: Condition) -> Result<()>;

    async fn delete_segment(&mut self, id: SegmentId) -> Result<()>;

    async fn get_link(&mut self, id: LinkId) -> Result<Option<ReportDrainageLink>>;

    /// Lock the segment a link is attached to without locking the link.
    ///
    /// Fixes take this before touching any link so that two fixes on the same
    /// segment queue up instead of deadlocking. `None` for a missing or
    /// detached link.
    async fn lock_link_segment(&mut self, link: LinkId) -> Result<Option<SegmentId>>;

    async fn links_for_report(&mut self, report: ReportId) -> Result<Vec<ReportDrainageLink>>;

    /// Links attached to a segment; detached links never show up here
    async fn links_for_segment(&mut self, segment: SegmentId) -> Result<Vec<ReportDrainageLink>>;

    /// Create a `Pending` link for the pair
    async fn insert_link(
        &mut self,
        report: ReportId,
        segment: SegmentId,
    ) -> Result<ReportDrainageLink>;

    /// Overwrite status and remediation fields of an existing link
    async fn save_link(&mut self, link: &ReportDrainageLink) -> Result<()>;

    async fn delete_link(&mut self, id: LinkId) -> Result<()>;

    /// Clear the segment reference of every link on the segment and return them
    async fn detach_links_for_segment(
        &mut self,
        segment: SegmentId,
    ) -> Result<Vec<ReportDrainageLink>>;
}

/// Port for opening units of work
#[async_trait]
pub trait Transactional: Send + Sync {
    async fn begin_transaction(&self) -> Result<Box<dyn UnitOfWork>>;
}

/// A complete storage backend
pub trait Store: DrainageCatalog + Transactional {}

impl<T: DrainageCatalog + Transactional> Store for T {}
