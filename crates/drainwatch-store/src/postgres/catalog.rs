use async_trait::async_trait;
use drainwatch_core::error::Result;
use drainwatch_core::models::{
    DrainageSegment, FloodZone, Report, ReportDrainageLink, ReportId, SegmentId, StaffMember,
    SubDistrict, UserId,
};

use super::rows::{
    collect, db_error, flood_zone_from_row, link_from_row, report_from_row, segment_from_row,
    staff_from_row, sub_district_from_row, FLOOD_ZONE_COLUMNS, LINK_COLUMNS, REPORT_COLUMNS,
    SEGMENT_COLUMNS, SUB_DISTRICT_COLUMNS,
};
use super::PostgresStore;
use crate::ports::DrainageCatalog;

#[async_trait]
impl DrainageCatalog for PostgresStore {
    async fn list_sub_districts(&self) -> Result<Vec<SubDistrict>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sub_districts ORDER BY id",
            SUB_DISTRICT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list sub-districts", e))?;
        collect(&rows, sub_district_from_row)
    }

    async fn find_sub_district_by_name(&self, name: &str) -> Result<Option<SubDistrict>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sub_districts WHERE name = $1",
            SUB_DISTRICT_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to look up sub-district", e))?;
        row.as_ref().map(sub_district_from_row).transpose()
    }

    async fn list_segments(&self) -> Result<Vec<DrainageSegment>> {
        let rows =
            sqlx::query(&format!("SELECT {} FROM drainage_segments ORDER BY id", SEGMENT_COLUMNS))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_error("Failed to list drainage segments", e))?;
        collect(&rows, segment_from_row)
    }

    async fn get_segment(&self, id: SegmentId) -> Result<Option<DrainageSegment>> {
        let row =
            sqlx::query(&format!("SELECT {} FROM drainage_segments WHERE id = $1", SEGMENT_COLUMNS))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to get drainage segment", e))?;
        row.as_ref().map(segment_from_row).transpose()
    }

    async fn list_flood_zones(&self) -> Result<Vec<FloodZone>> {
        let rows =
            sqlx::query(&format!("SELECT {} FROM flood_zones ORDER BY id", FLOOD_ZONE_COLUMNS))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_error("Failed to list flood zones", e))?;
        collect(&rows, flood_zone_from_row)
    }

    async fn list_reports(&self) -> Result<Vec<Report>> {
        let rows = sqlx::query(&format!("SELECT {} FROM reports ORDER BY id", REPORT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list reports", e))?;
        collect(&rows, report_from_row)
    }

    async fn get_report(&self, id: ReportId) -> Result<Option<Report>> {
        let row = sqlx::query(&format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get report", e))?;
        row.as_ref().map(report_from_row).transpose()
    }

    async fn list_links(&self) -> Result<Vec<ReportDrainageLink>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM report_drainage_links ORDER BY id",
            LINK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list remediation links", e))?;
        collect(&rows, link_from_row)
    }

    async fn staff_recipients(&self, exclude: Option<UserId>) -> Result<Vec<StaffMember>> {
        let rows = sqlx::query(
            "SELECT id, name, email FROM staff_members \
             WHERE $1::BIGINT IS NULL OR id <> $1 ORDER BY id",
        )
        .bind(exclude.map(|id| id.0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list staff", e))?;
        collect(&rows, staff_from_row)
    }
}
