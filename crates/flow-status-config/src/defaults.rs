use crate::logging::LogFormat;

/// Checker executable used when none is configured.
pub const DEFAULT_BINARY_PATH: &str = "flow";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default quiet period, in milliseconds, before a burst of file changes
/// triggers a rebuild.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Owned checker executable value used where allocation is required.
pub fn default_binary_path() -> String {
    DEFAULT_BINARY_PATH.to_owned()
}

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
