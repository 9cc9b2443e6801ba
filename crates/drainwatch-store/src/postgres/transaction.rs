use async_trait::async_trait;
use drainwatch_core::error::{DrainError, Result};
use drainwatch_core::models::{
    Condition, DrainageSegment, LinkId, LinkStatus, NewReport, Report, ReportDrainageLink,
    ReportFields, ReportId, ReportStatus, SegmentId,
};
use sqlx::types::Json;
use sqlx::{Postgres, Transaction as SqlxTransaction};
use std::time::Duration;
use tokio::time::timeout;

use super::rows::{
    collect, db_error, link_from_row, report_from_row, segment_from_row, LINK_COLUMNS,
    REPORT_COLUMNS, SEGMENT_COLUMNS,
};
use super::PostgresStore;
use crate::ports::{Transaction, Transactional, UnitOfWork};

/// Unit of work backed by a database transaction.
///
/// Dropping it without commit lets sqlx roll the transaction back.
pub struct PgUnitOfWork {
    tx: SqlxTransaction<'static, Postgres>,
    timeout_duration: Duration,
}

#[async_trait]
impl Transactional for PostgresStore {
    async fn begin_transaction(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;
        Ok(Box::new(PgUnitOfWork { tx, timeout_duration: self.config.transaction_timeout }))
    }
}

#[async_trait]
impl Transaction for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<()> {
        let PgUnitOfWork { tx, timeout_duration } = *self;
        match timeout(timeout_duration, tx.commit()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(db_error("Failed to commit transaction", e)),
            Err(_) => Err(DrainError::Storage(format!(
                "Transaction commit timeout after {}s",
                timeout_duration.as_secs()
            ))),
        }
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let PgUnitOfWork { tx, timeout_duration } = *self;
        match timeout(timeout_duration, tx.rollback()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(db_error("Failed to rollback transaction", e)),
            Err(_) => Err(DrainError::Storage(format!(
                "Transaction rollback timeout after {}s",
                timeout_duration.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn get_report(&mut self, id: ReportId) -> Result<Option<Report>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM reports WHERE id = $1 FOR UPDATE",
            REPORT_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to get report", e))?;
        row.as_ref().map(report_from_row).transpose()
    }

    async fn insert_report(&mut self, report: NewReport) -> Result<Report> {
        let (guest_name, guest_contact) = match report.guest {
            Some(guest) => (Some(guest.name), Some(guest.contact)),
            None => (None, None),
        };

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO reports (title, description, category, location_name, geometry, point,
                                 sub_district_id, user_id, guest_name, guest_contact, attachment,
                                 status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(&report.title)
        .bind(&report.description)
        .bind(&report.category)
        .bind(&report.location_name)
        .bind(Json(&report.geometry))
        .bind(Json(report.point))
        .bind(report.sub_district_id.map(|id| id.0))
        .bind(report.user_id.map(|id| id.0))
        .bind(guest_name)
        .bind(guest_contact)
        .bind(&report.attachment)
        .bind(ReportStatus::Pending.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to insert report", e))?;
        report_from_row(&row)
    }

    async fn update_report_status(&mut self, id: ReportId, status: ReportStatus) -> Result<()> {
        let result =
            sqlx::query("UPDATE reports SET status = $2, updated_at = now() WHERE id = $1")
                .bind(id.0)
                .bind(status.as_str())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| db_error("Failed to update report status", e))?;
        if result.rows_affected() == 0 {
            return Err(DrainError::not_found("report", id.0));
        }
        Ok(())
    }

    async fn update_report_fields(&mut self, id: ReportId, fields: ReportFields) -> Result<Report> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE reports
            SET title = $2, description = $3, category = $4, location_name = $5, geometry = $6,
                point = $7, sub_district_id = $8, attachment = $9, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(id.0)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.category)
        .bind(&fields.location_name)
        .bind(Json(&fields.geometry))
        .bind(Json(fields.point))
        .bind(fields.sub_district_id.map(|id| id.0))
        .bind(&fields.attachment)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to update report", e))?;

        match row {
            Some(row) => report_from_row(&row),
            None => Err(DrainError::not_found("report", id.0)),
        }
    }

    async fn delete_report(&mut self, id: ReportId) -> Result<()> {
        sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to delete report", e))?;
        Ok(())
    }

    async fn get_segment(&mut self, id: SegmentId) -> Result<Option<DrainageSegment>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM drainage_segments WHERE id = $1 FOR UPDATE",
            SEGMENT_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to get drainage segment", e))?;
        row.as_ref().map(segment_from_row).transpose()
    }

    async fn set_segment_condition(&mut self, id: SegmentId, condition: Condition) -> Result<()> {
        let result = sqlx::query("UPDATE drainage_segments SET condition = $2 WHERE id = $1")
            .bind(id.0)
            .bind(condition.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to update segment condition", e))?;
        if result.rows_affected() == 0 {
            return Err(DrainError::not_found("drainage segment", id.0));
        }
        Ok(())
    }

    async fn delete_segment(&mut self, id: SegmentId) -> Result<()> {
        sqlx::query("DELETE FROM drainage_segments WHERE id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to delete drainage segment", e))?;
        Ok(())
    }

    async fn get_link(&mut self, id: LinkId) -> Result<Option<ReportDrainageLink>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM report_drainage_links WHERE id = $1 FOR UPDATE",
            LINK_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to get remediation link", e))?;
        row.as_ref().map(link_from_row).transpose()
    }

    async fn lock_link_segment(&mut self, link: LinkId) -> Result<Option<SegmentId>> {
        let segment: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT s.id
            FROM drainage_segments s
            JOIN report_drainage_links l ON l.segment_id = s.id
            WHERE l.id = $1
            FOR UPDATE OF s
            "#,
        )
        .bind(link.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to lock drainage segment", e))?;
        Ok(segment.map(SegmentId))
    }

    async fn links_for_report(&mut self, report: ReportId) -> Result<Vec<ReportDrainageLink>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM report_drainage_links WHERE report_id = $1 ORDER BY id",
            LINK_COLUMNS
        ))
        .bind(report.0)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to list links for report", e))?;
        collect(&rows, link_from_row)
    }

    async fn links_for_segment(&mut self, segment: SegmentId) -> Result<Vec<ReportDrainageLink>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM report_drainage_links WHERE segment_id = $1 ORDER BY id",
            LINK_COLUMNS
        ))
        .bind(segment.0)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to list links for segment", e))?;
        collect(&rows, link_from_row)
    }

    async fn insert_link(
        &mut self,
        report: ReportId,
        segment: SegmentId,
    ) -> Result<ReportDrainageLink> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO report_drainage_links (report_id, segment_id, status)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            LINK_COLUMNS
        ))
        .bind(report.0)
        .bind(segment.0)
        .bind(LinkStatus::Pending.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to insert remediation link", e))?;
        link_from_row(&row)
    }

    async fn save_link(&mut self, link: &ReportDrainageLink) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE report_drainage_links
            SET status = $2, remediation_point = $3, remediation_attachment = $4,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(link.id.0)
        .bind(link.status.as_str())
        .bind(link.remediation_point.map(Json))
        .bind(&link.remediation_attachment)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to save remediation link", e))?;
        if result.rows_affected() == 0 {
            return Err(DrainError::not_found("remediation link", link.id.0));
        }
        Ok(())
    }

    async fn delete_link(&mut self, id: LinkId) -> Result<()> {
        sqlx::query("DELETE FROM report_drainage_links WHERE id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to delete remediation link", e))?;
        Ok(())
    }

    async fn detach_links_for_segment(
        &mut self,
        segment: SegmentId,
    ) -> Result<Vec<ReportDrainageLink>> {
        let rows = sqlx::query(&format!(
            r#"
            UPDATE report_drainage_links
            SET segment_id = NULL, updated_at = now()
            WHERE segment_id = $1
            RETURNING {}
            "#,
            LINK_COLUMNS
        ))
        .bind(segment.0)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to detach remediation links", e))?;
        collect(&rows, link_from_row)
    }
}
