//! Row decoding shared by the catalog and the unit of work

use drainwatch_core::error::{DrainError, Result};
use drainwatch_core::models::{
    DrainageSegment, FloodZone, FloodZoneId, Geometry, GuestReporter, LinkId, LngLat, Report,
    ReportDrainageLink, ReportId, SegmentId, StaffMember, SubDistrict, SubDistrictId, UserId,
};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Postgres, Row};
use std::str::FromStr;

pub(crate) const SUB_DISTRICT_COLUMNS: &str = "id, name, boundary";

pub(crate) const SEGMENT_COLUMNS: &str =
    "id, name, function_class, length_meters, geometry, sub_district_id, condition, properties";

pub(crate) const FLOOD_ZONE_COLUMNS: &str = "id, name, center, radius_meters, sub_district_id";

pub(crate) const REPORT_COLUMNS: &str = "id, title, description, category, location_name, \
     geometry, point, sub_district_id, user_id, guest_name, guest_contact, attachment, status, \
     created_at, updated_at";

pub(crate) const LINK_COLUMNS: &str = "id, report_id, segment_id, status, remediation_point, \
     remediation_attachment, created_at, updated_at";

pub(crate) fn db_error(context: &str, err: sqlx::Error) -> DrainError {
    DrainError::Storage(format!("{}: {}", context, err))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(|e| db_error(&format!("Failed to decode column {}", name), e))
}

fn enum_column<T>(row: &PgRow, name: &str) -> Result<T>
where
    T: FromStr<Err = DrainError>,
{
    let raw: String = column(row, name)?;
    raw.parse()
        .map_err(|e| DrainError::Storage(format!("Unreadable value in column {}: {}", name, e)))
}

pub(crate) fn sub_district_from_row(row: &PgRow) -> Result<SubDistrict> {
    let Json(boundary): Json<Vec<Vec<LngLat>>> = column(row, "boundary")?;
    Ok(SubDistrict {
        id: SubDistrictId(column(row, "id")?),
        name: column(row, "name")?,
        boundary,
    })
}

pub(crate) fn segment_from_row(row: &PgRow) -> Result<DrainageSegment> {
    let function_class: Option<String> = column(row, "function_class")?;
    let Json(geometry): Json<Geometry> = column(row, "geometry")?;
    let Json(properties): Json<serde_json::Map<String, serde_json::Value>> =
        column(row, "properties")?;
    let sub_district_id: Option<i64> = column(row, "sub_district_id")?;

    Ok(DrainageSegment {
        id: SegmentId(column(row, "id")?),
        name: column(row, "name")?,
        // inventories carry free-text classes; unknown values are dropped
        function_class: function_class.and_then(|raw| raw.parse().ok()),
        length_meters: column(row, "length_meters")?,
        geometry,
        sub_district_id: sub_district_id.map(SubDistrictId),
        condition: enum_column(row, "condition")?,
        properties,
    })
}

pub(crate) fn flood_zone_from_row(row: &PgRow) -> Result<FloodZone> {
    let Json(center): Json<LngLat> = column(row, "center")?;
    let sub_district_id: Option<i64> = column(row, "sub_district_id")?;
    Ok(FloodZone {
        id: FloodZoneId(column(row, "id")?),
        name: column(row, "name")?,
        center,
        radius_meters: column(row, "radius_meters")?,
        sub_district_id: sub_district_id.map(SubDistrictId),
    })
}

pub(crate) fn staff_from_row(row: &PgRow) -> Result<StaffMember> {
    Ok(StaffMember {
        id: UserId(column(row, "id")?),
        name: column(row, "name")?,
        email: column(row, "email")?,
    })
}

pub(crate) fn report_from_row(row: &PgRow) -> Result<Report> {
    let Json(geometry): Json<Geometry> = column(row, "geometry")?;
    let Json(point): Json<LngLat> = column(row, "point")?;
    let sub_district_id: Option<i64> = column(row, "sub_district_id")?;
    let user_id: Option<i64> = column(row, "user_id")?;
    let guest_name: Option<String> = column(row, "guest_name")?;
    let guest_contact: Option<String> = column(row, "guest_contact")?;

    let guest = match (guest_name, guest_contact) {
        (Some(name), Some(contact)) => Some(GuestReporter { name, contact }),
        _ => None,
    };

    Ok(Report {
        id: ReportId(column(row, "id")?),
        title: column(row, "title")?,
        description: column(row, "description")?,
        category: column(row, "category")?,
        location_name: column(row, "location_name")?,
        geometry,
        point,
        sub_district_id: sub_district_id.map(SubDistrictId),
        user_id: user_id.map(UserId),
        guest,
        attachment: column(row, "attachment")?,
        status: enum_column(row, "status")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub(crate) fn link_from_row(row: &PgRow) -> Result<ReportDrainageLink> {
    let segment_id: Option<i64> = column(row, "segment_id")?;
    let remediation_point: Option<Json<LngLat>> = column(row, "remediation_point")?;

    Ok(ReportDrainageLink {
        id: LinkId(column(row, "id")?),
        report_id: ReportId(column(row, "report_id")?),
        segment_id: segment_id.map(SegmentId),
        status: enum_column(row, "status")?,
        remediation_point: remediation_point.map(|Json(point)| point),
        remediation_attachment: column(row, "remediation_attachment")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub(crate) fn collect<T>(rows: &[PgRow], decode: fn(&PgRow) -> Result<T>) -> Result<Vec<T>> {
    rows.iter().map(decode).collect()
}
