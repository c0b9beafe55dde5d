// src/constants.rs
//! Domain constants that define the operational boundaries of the system.

// ---------------------------------------------------------------------------
// Player lookup API
// ---------------------------------------------------------------------------

/// Base URL of the player lookup API when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://api.prizepicks.com";

/// Environment variable that overrides the base URL.
pub const API_BASE_URL_ENV: &str = "PROP_ENRICHER_BASE_URL";

/// Path segment under the base URL that addresses a single player.
pub const PLAYERS_PATH_SEGMENT: &str = "players";

/// Headers the API expects before it will answer a lookup.
///
/// These mirror what the web app sends. They are defaults only; any of them
/// can be replaced with `--header`.
pub const DEFAULT_REQUEST_HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json"),
    ("content-type", "application/json"),
    ("accept-language", "en-US,en;q=0.9"),
    ("origin", "https://app.prizepicks.com"),
    ("referer", "https://app.prizepicks.com/"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36",
    ),
    (
        "sec-ch-ua",
        "\"Not_A Brand\";v=\"99\", \"Google Chrome\";v=\"109\", \"Chromium\";v=\"109\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-site", "same-site"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-dest", "empty"),
];

/// Per-request timeout, covering connect through the last body byte.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound accepted for `--timeout-secs`.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

// ---------------------------------------------------------------------------
// Worker pool
// ---------------------------------------------------------------------------

/// Hard cap on concurrent lookups. The API's rate limits are unknown, so the
/// pool stays small even when more is requested.
pub const MAX_FETCH_WORKERS: usize = 32;

/// Bounds for the default worker count derived from the CPU count.
pub const DEFAULT_MIN_FETCH_WORKERS: usize = 2;
pub const DEFAULT_MAX_FETCH_WORKERS: usize = 8;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Artifact written by the `ids` command when no output path is given.
pub const DEFAULT_IDS_OUTPUT: &str = "player_ids.json";

/// Artifact written by the `enrich` command when no output path is given.
pub const DEFAULT_RECORDS_OUTPUT: &str = "all_players.json";

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
