// Single source of truth for all default values.

// --- Score ---
pub const DEFAULT_SAMPLE_PRIOR: f64 = 1.0;
pub const DEFAULT_STRUCTURE_PRIOR: f64 = 1.0;
pub const DEFAULT_K_ADDITION: f64 = 0.1;
pub const DEFAULT_K_DELETION: f64 = 0.1;
pub const DEFAULT_K_REORIENTATION: f64 = 0.1;
pub const DEFAULT_PENALTY_DISCOUNT: f64 = 1.0;
pub const DEFAULT_IS_ALPHA: f64 = 1.0;
pub const DEFAULT_SCORE_CACHE_CAPACITY: u64 = 100_000;

// --- Search ---
/// Unset defers to `ceil(ln(max(2, N)))`.
pub const DEFAULT_SEARCH_MAX_DEGREE: Option<i32> = None;
pub const DEFAULT_FAITHFULNESS_ASSUMED: bool = true;
pub const DEFAULT_SYMMETRIC_FIRST_STEP: bool = true;
pub const DEFAULT_PARALLELISM: usize = 0; // 0 = rayon global pool

// --- Orientation ---
pub const DEFAULT_MAX_DEGREE: i32 = -1;
pub const DEFAULT_MAX_PATH_LENGTH: i32 = -1;
pub const DEFAULT_COMPLETE_RULE_SET: bool = false;
/// Smallest meaningful discriminating path length.
pub const MIN_DISCRIMINATING_PATH_LENGTH: i32 = 4;
/// Path length cap used when `max_path_length = -1`.
pub const UNBOUNDED_PATH_LENGTH: usize = 1000;

// --- Independence oracle ---
pub const DEFAULT_ORACLE_PRIOR: f64 = 0.5;
pub const DEFAULT_ORACLE_CUTOFF: f64 = 0.5;
pub const DEFAULT_ORACLE_THRESHOLD: bool = true;
pub const DEFAULT_ORACLE_CACHE_CAPACITY: u64 = 10_000;

// --- Data ---
/// Sentinel for a missing categorical cell.
pub const MISSING_VALUE: i32 = -99;
