//! Table definitions created on startup when missing.
//!
//! Geometries and coordinates are stored as JSONB in the same `[lng, lat]`
//! shape the domain types serialize to. Enums are stored as their text names.

pub(crate) const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sub_districts (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        boundary JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS drainage_segments (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        function_class TEXT,
        length_meters DOUBLE PRECISION,
        geometry JSONB NOT NULL,
        sub_district_id BIGINT REFERENCES sub_districts(id) ON DELETE SET NULL,
        condition TEXT NOT NULL DEFAULT 'Good',
        properties JSONB NOT NULL DEFAULT '{}'::jsonb
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS flood_zones (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        center JSONB NOT NULL,
        radius_meters DOUBLE PRECISION NOT NULL,
        sub_district_id BIGINT REFERENCES sub_districts(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS staff_members (
        id BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reports (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT,
        location_name TEXT,
        geometry JSONB NOT NULL,
        point JSONB NOT NULL,
        sub_district_id BIGINT REFERENCES sub_districts(id) ON DELETE SET NULL,
        user_id BIGINT,
        guest_name TEXT,
        guest_contact TEXT,
        attachment TEXT,
        status TEXT NOT NULL DEFAULT 'Pending',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS report_drainage_links (
        id BIGSERIAL PRIMARY KEY,
        report_id BIGINT NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
        segment_id BIGINT REFERENCES drainage_segments(id) ON DELETE SET NULL,
        status TEXT NOT NULL DEFAULT 'Pending',
        remediation_point JSONB,
        remediation_attachment TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (report_id, segment_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_links_segment ON report_drainage_links (segment_id)",
    "CREATE INDEX IF NOT EXISTS idx_links_report ON report_drainage_links (report_id)",
];
