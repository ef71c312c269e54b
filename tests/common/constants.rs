//! Shared constants for end-to-end tests
//!
//! When test data changes (users, catalog entries, etc.), update only this file.

// ============================================================================
// Test Users
// ============================================================================

/// Secret the test server validates bearer tokens with
pub const TEST_JWT_SECRET: &str = "e2e-test-secret";

/// Regular test user id
pub const TEST_USER_ID: &str = "user-1";

/// Regular test user email
pub const TEST_USER_EMAIL: &str = "reader@example.com";

// ============================================================================
// Mock Catalog Data
// ============================================================================

/// ISBN the mock catalog knows about
pub const KNOWN_ISBN: &str = "9780134190440";

/// Same ISBN as printed on a copyright page
pub const KNOWN_ISBN_HYPHENATED: &str = "978-0-13-419044-0";

/// Title the mock catalog returns for KNOWN_ISBN (title + subtitle)
pub const KNOWN_TITLE: &str = "Effective Testing: A Field Guide";

/// Author the mock catalog returns for KNOWN_ISBN
pub const KNOWN_AUTHOR: &str = "Ada Example";

/// Publisher the mock catalog returns for KNOWN_ISBN
pub const KNOWN_PUBLISHER: &str = "Example Press";

/// A well-formed ISBN the mock catalog has never heard of
pub const UNKNOWN_ISBN: &str = "9780000000002";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Upload limit used by the default test server (bytes)
pub const TEST_MAX_UPLOAD_BYTES: usize = 1024 * 1024;
