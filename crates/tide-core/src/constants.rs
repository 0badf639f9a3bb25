//! Pool constants. All monetary values in base units (1 unit = 10^18 base units).

/// Number of fractional digits in a currency amount.
pub const DECIMALS: u32 = 18;

/// One whole currency unit in base units.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Fixed-point scale for rates and growth factors. `WAD` represents 1.0.
///
/// Shares the currency scale so a rate of `0.0000225` is
/// `22_500_000_000_000` on both.
pub const WAD: u128 = UNIT;

/// Length of one compounding period in seconds (one hour).
pub const PERIOD_SECONDS: u64 = 3600;

/// Periods in a 30-day window of hourly compounding.
pub const PERIODS_PER_30_DAYS: u64 = 30 * 24;
