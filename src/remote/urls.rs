//! Dida365 endpoint paths
//!
//! The upstream exposes two hosts: the v2 API for statistics-style reads
//! and the `ms` microservice host for the focus operation log.

/// Default v2 API base
pub const DEFAULT_API_BASE: &str = "https://api.dida365.com/api/v2";

/// Default microservice base (focus batch operations live here)
pub const DEFAULT_MS_BASE: &str = "https://ms.dida365.com";

/// Default web origin, used for Origin/Referer headers
pub const DEFAULT_WEB_ORIGIN: &str = "https://dida365.com";

/// Batch focus operations (start/pause/continue/finish/drop/exit), on the
/// microservice host
pub const FOCUS_BATCH_OPERATION: &str = "/focus/batch/focusOp";

/// Pomodoro overview as the desktop client requests it
pub const POMODORO_GENERAL_FOR_DESKTOP: &str = "/pomodoros/statistics/generalForDesktop";

/// Focus duration distribution; append `/{start}/{end}` (YYYYMMDD)
pub const FOCUS_DISTRIBUTION: &str = "/pomodoros/statistics/dist";

/// Paged focus record timeline; optional `?to={millis}`
pub const FOCUS_TIMELINE: &str = "/pomodoros/timeline";

/// Focus trend heatmap; append `/{start}/{end}`
pub const FOCUS_HEATMAP: &str = "/pomodoros/statistics/heatmap";

/// Per-day clock distribution; append `/{start}/{end}`
pub const FOCUS_TIME_DISTRIBUTION: &str = "/pomodoros/statistics/dist/clockByDay";

/// Per-hour clock distribution; append `/{start}/{end}`
pub const FOCUS_HOUR_DISTRIBUTION: &str = "/pomodoros/statistics/dist/clock";
