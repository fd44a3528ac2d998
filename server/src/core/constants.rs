// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Usergrid";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "usergrid";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".usergrid";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "usergrid.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "USERGRID_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "USERGRID_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "USERGRID_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "USERGRID_LOG";

/// Environment variable for the API request timeout (seconds)
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "USERGRID_REQUEST_TIMEOUT_SECS";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Default API request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "USERGRID_DATA_DIR";

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "usergrid.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Users List
// =============================================================================

/// Page size when `take` is omitted
pub const DEFAULT_TAKE: i64 = 20;

/// Largest page a single request may fetch
pub const MAX_TAKE: i64 = 500;

/// Maximum user name length (characters)
pub const USER_NAME_MAX_LEN: u64 = 255;

/// Maximum email length (characters)
pub const USER_EMAIL_MAX_LEN: u64 = 255;

// =============================================================================
// Export
// =============================================================================

/// Environment variable for the export row cap
pub const ENV_EXPORT_MAX_ROWS: &str = "USERGRID_EXPORT_MAX_ROWS";

/// Environment variable for the export timeout (seconds)
pub const ENV_EXPORT_TIMEOUT_SECS: &str = "USERGRID_EXPORT_TIMEOUT_SECS";

/// Default maximum rows in one export
pub const DEFAULT_EXPORT_MAX_ROWS: u64 = 26_000;

/// Default export timeout in seconds
pub const DEFAULT_EXPORT_TIMEOUT_SECS: u64 = 300;

/// Download name for the basic export
pub const EXPORT_USERS_FILENAME: &str = "users.csv";

/// Download name for the export with post titles
pub const EXPORT_REPORT_FILENAME: &str = "users-report.csv";

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for general API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Seeding
// =============================================================================

/// Default number of users created by `seed`
pub const DEFAULT_SEED_USERS: u32 = 50;

/// Default number of posts per seeded user
pub const DEFAULT_SEED_POSTS_PER_USER: u32 = 3;
