//! Read-side queries over the catalog

use drainwatch_core::error::Result;
use drainwatch_core::models::{
    Actor, DashboardStats, DrainageSegment, FloodZone, LngLat, ReportStatus, SubDistrictId,
    LATEST_REPORTS,
};
use drainwatch_geo::{rank_nearby_segments, UNKNOWN_SUB_DISTRICT};

use crate::service::DrainageService;

const UNCATEGORIZED: &str = "uncategorized";

/// Regional filter resolved from an optional sub-district name
#[derive(Debug, Clone, Copy, PartialEq)]
enum Region {
    Everywhere,
    Within(SubDistrictId),
    /// The name matched no sub-district, so nothing is in it
    Nowhere,
}

impl Region {
    fn admits(&self, sub_district: Option<SubDistrictId>) -> bool {
        match *self {
            Region::Everywhere => true,
            Region::Within(id) => sub_district == Some(id),
            Region::Nowhere => false,
        }
    }
}

impl DrainageService {
    /// Segments whose first coordinate lies within `radius_km` of the user.
    ///
    /// Falls back to the configured default radius; a radius of zero or less
    /// returns every segment.
    pub async fn nearby(
        &self,
        user_lat: f64,
        user_lng: f64,
        radius_km: Option<f64>,
    ) -> Result<Vec<DrainageSegment>> {
        let radius_km = radius_km.unwrap_or(self.config.nearby_default_radius_km);
        let segments = self.store.list_segments().await?;
        let found: Vec<DrainageSegment> =
            drainwatch_geo::nearby(user_lat, user_lng, radius_km, &segments)
                .into_iter()
                .cloned()
                .collect();

        tracing::debug!(
            radius_km,
            evaluated = segments.len(),
            matched = found.len(),
            "Nearby search"
        );
        Ok(found)
    }

    /// Drainage segments, optionally limited to one sub-district by name.
    ///
    /// No name, an empty one or `all` lists everything.
    pub async fn list_segments(&self, sub_district: Option<&str>) -> Result<Vec<DrainageSegment>> {
        let region = self.region(sub_district).await?;
        let segments = self.store.list_segments().await?;
        Ok(segments.into_iter().filter(|s| region.admits(s.sub_district_id)).collect())
    }

    /// Flood zones, optionally limited to one sub-district by name
    pub async fn list_flood_zones(&self, sub_district: Option<&str>) -> Result<Vec<FloodZone>> {
        let region = self.region(sub_district).await?;
        let zones = self.store.list_flood_zones().await?;
        Ok(zones.into_iter().filter(|z| region.admits(z.sub_district_id)).collect())
    }

    async fn region(&self, sub_district: Option<&str>) -> Result<Region> {
        let name = match sub_district.map(str::trim) {
            None => return Ok(Region::Everywhere),
            Some(name) if name.is_empty() || name.eq_ignore_ascii_case("all") => {
                return Ok(Region::Everywhere)
            }
            Some(name) => name,
        };

        match self.store.find_sub_district_by_name(name).await? {
            Some(found) => Ok(Region::Within(found.id)),
            None => {
                tracing::debug!(name, "Filter names an unknown sub-district");
                Ok(Region::Nowhere)
            }
        }
    }

    /// Name of the sub-district containing the point, or `"unknown"`
    pub async fn resolve_sub_district(&self, point: LngLat) -> Result<String> {
        let boundaries = self.store.list_sub_districts().await?;
        let name = drainwatch_geo::resolve_sub_district(point, &boundaries).name().to_string();
        if name == UNKNOWN_SUB_DISTRICT {
            tracing::debug!(lng = point.lng, lat = point.lat, "Point outside all sub-districts");
        }
        Ok(name)
    }

    /// Line segments within the match threshold of a point, closest first,
    /// with their distance in meters
    pub async fn suggest_segments(&self, point: LngLat) -> Result<Vec<(DrainageSegment, f64)>> {
        let segments = self.store.list_segments().await?;
        Ok(rank_nearby_segments(point, &segments, self.config.match_threshold_meters)
            .into_iter()
            .map(|m| (m.segment.clone(), m.distance_meters))
            .collect())
    }

    /// Flood zones covering a point
    pub async fn flood_zones_at(&self, point: LngLat) -> Result<Vec<FloodZone>> {
        let zones = self.store.list_flood_zones().await?;
        Ok(drainwatch_geo::flood_zones_at(point, &zones).into_iter().cloned().collect())
    }

    /// Aggregate counters for the staff dashboard
    pub async fn dashboard_stats(&self, actor: &Actor) -> Result<DashboardStats> {
        self.require_staff(actor, "view dashboard statistics")?;

        let segments = self.store.list_segments().await?;
        let flood_zones = self.store.list_flood_zones().await?;
        let reports = self.store.list_reports().await?;

        let mut stats = DashboardStats {
            total_segments: segments.len(),
            total_flood_zones: flood_zones.len(),
            total_reports: reports.len(),
            ..Default::default()
        };

        for report in &reports {
            if report.status == ReportStatus::Fixed {
                stats.fixed_reports += 1;
            }
            *stats.reports_by_status.entry(report.status.as_str().to_string()).or_default() += 1;
            let category = report.category.as_deref().unwrap_or(UNCATEGORIZED);
            *stats.reports_by_category.entry(category.to_string()).or_default() += 1;
        }
        let mut latest: Vec<_> = reports.iter().collect();
        latest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        stats.latest_reports = latest.into_iter().take(LATEST_REPORTS).cloned().collect();

        for segment in &segments {
            *stats
                .segments_by_condition
                .entry(segment.condition.as_str().to_string())
                .or_default() += 1;
        }

        Ok(stats)
    }
}
