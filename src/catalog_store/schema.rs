//! SQLite schema definitions for the instrument catalog database.
//!
//! Artists and albums are canonical records; their reverse caches are JSON
//! arrays stored in text columns. The two link tables are the source of truth
//! for every instrument relation.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

// =============================================================================
// Canonical Entities
// =============================================================================

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("slug", &SqlType::Text, non_null = true),
        sqlite_column!("label", &SqlType::Text, non_null = true),
        sqlite_column!("label_key", &SqlType::Text, non_null = true), // lowercased label
        sqlite_column!(
            "instruments",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'[]'")
        ),
    ],
    indices: &[("idx_artists_label_key", "label_key")],
    unique_constraints: &[&["slug"]],
};

const ALBUMS_TABLE: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("parent_id", &SqlType::Text),
        sqlite_column!("is_master", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!(
            "instruments",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'[]'")
        ),
        sqlite_column!(
            "artist_refs",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'[]'")
        ),
    ],
    indices: &[("idx_albums_parent", "parent_id")],
    unique_constraints: &[],
};

// =============================================================================
// Link Tables
// =============================================================================

const INSTRUMENT_ARTIST_LINKS_TABLE: Table = Table {
    name: "instrument_artist_links",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("instrument_id", &SqlType::Text, non_null = true),
        sqlite_column!("artist_id", &SqlType::Text, non_null = true),
        sqlite_column!("years_used", &SqlType::Text),
        sqlite_column!("notes", &SqlType::Text),
        sqlite_column!("is_verified", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("created_by", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_instrument_artist_links_instrument", "instrument_id"),
        ("idx_instrument_artist_links_artist", "artist_id"),
    ],
    unique_constraints: &[&["instrument_id", "artist_id"]],
};

const INSTRUMENT_ALBUM_LINKS_TABLE: Table = Table {
    name: "instrument_album_links",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("instrument_id", &SqlType::Text, non_null = true),
        sqlite_column!("album_id", &SqlType::Text, non_null = true),
        sqlite_column!("notes", &SqlType::Text),
        sqlite_column!("is_verified", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("created_by", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_instrument_album_links_instrument", "instrument_id"),
        ("idx_instrument_album_links_album", "album_id"),
    ],
    unique_constraints: &[&["instrument_id", "album_id"]],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        ARTISTS_TABLE,
        ALBUMS_TABLE,
        INSTRUMENT_ARTIST_LINKS_TABLE,
        INSTRUMENT_ALBUM_LINKS_TABLE,
    ],
    migration: None,
}];
