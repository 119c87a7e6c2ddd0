//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (tokens, catalog IDs, etc.), update only this file.

// ============================================================================
// Test Tokens
// ============================================================================

/// Token of a regular user: can read the catalog, cannot edit it
pub const REGULAR_TOKEN: &str = "regular-token";
pub const REGULAR_USER: &str = "listener";

/// Token of a curator: can edit relations, cannot run repairs
pub const CURATOR_TOKEN: &str = "curator-token";
pub const CURATOR_USER: &str = "curator";

/// Token of an admin: everything, links created by admins are verified
pub const ADMIN_TOKEN: &str = "admin-token";
pub const ADMIN_USER: &str = "admin";

// ============================================================================
// Test Catalog IDs
// ============================================================================

/// Artist "Kraftwerk"
pub const ARTIST_KRAFTWERK_ID: &str = "artist-kraftwerk";
pub const ARTIST_KRAFTWERK_SLUG: &str = "kraftwerk";

/// Artist "Tangerine Dream"
pub const ARTIST_TANGERINE_ID: &str = "artist-tangerine";
pub const ARTIST_TANGERINE_SLUG: &str = "tangerine-dream";

/// Master album "Computer World" by Kraftwerk
pub const ALBUM_MASTER_ID: &str = "album-computer-world";
pub const ALBUM_MASTER_TITLE: &str = "Computer World";

/// Remastered version of "Computer World", child of the master
pub const ALBUM_VERSION_ID: &str = "album-computer-world-remaster";

/// Standalone album whose free-text artist matches no artist record
pub const ALBUM_UNKNOWN_ARTIST_ID: &str = "album-unknown";

/// Instrument ids. Instruments live outside this server; any id is accepted.
pub const INSTRUMENT_1_ID: &str = "instrument-minimoog";
pub const INSTRUMENT_2_ID: &str = "instrument-vocoder";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval while waiting for server readiness
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Default request timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
