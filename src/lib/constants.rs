/// Longitudes strictly greater than this value are shifted by one turn.
pub const LON_WRAP: f64 = 180.0;

/// One full turn in degrees
pub const FULL_TURN: f64 = 360.0;

/// Reference epoch (1950-01-01) of the day counts used by the altimetry products
pub const EPOCH_YEAR: i32 = 1950;
pub const EPOCH_MONTH: u32 = 1;
pub const EPOCH_DAY: u32 = 1;

pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Default region code embedded in the product file names
pub const DEFAULT_AREA: &str = "med";
