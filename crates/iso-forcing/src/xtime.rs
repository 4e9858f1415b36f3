//! Fixed-width time stamps for the model's `xtime` axis.

use crate::error::{ForcingError, ForcingResult};

/// Width of the `StrLen` dimension.
pub const STR_LEN: usize = 64;

/// `YYYY-01-01_00:00:00` padded with spaces to [`STR_LEN`] bytes.
pub fn year_timestamp(year: u32) -> ForcingResult<String> {
    if year > 9999 {
        return Err(ForcingError::YearOutOfRange { year });
    }
    Ok(format!("{:<width$}", format!("{year:04}-01-01_00:00:00"), width = STR_LEN))
}
