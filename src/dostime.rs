//! MS-DOS 日期/时间转换
//!
//! ZIP 头中的修改时间使用 DOS 格式：
//! - 时间: HHHHHMMMMMMSSSSS (5+6+5 = 16 bits，秒数除以 2)
//! - 日期: YYYYYYYMMMMDDDDD (7+4+5 = 16 bits，年份从 1980 起)
//!
//! 打包成 32 位时日期在高 16 位，时间在低 16 位。

use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

const DOS_EPOCH_YEAR: i32 = 1980;
const DOS_MAX_YEAR: i32 = DOS_EPOCH_YEAR + 0x7F;

/// Broken-down DOS timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable DOS timestamp.
    pub const EPOCH: DosDateTime = DosDateTime {
        year: DOS_EPOCH_YEAR as u16,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// 2107-12-31 23:59:58, the latest representable DOS timestamp.
    pub const MAX: DosDateTime = DosDateTime {
        year: DOS_MAX_YEAR as u16,
        month: 12,
        day: 31,
        hour: 23,
        minute: 59,
        second: 58,
    };

    /// Convert a Unix timestamp (UTC). Anything before 1980 clamps to
    /// [`DosDateTime::EPOCH`], anything after 2107 clamps to [`DosDateTime::MAX`].
    pub fn from_unix(timestamp: i64) -> Self {
        let datetime = match OffsetDateTime::from_unix_timestamp(timestamp) {
            Ok(dt) => dt,
            Err(_) if timestamp < 0 => return Self::EPOCH,
            Err(_) => return Self::MAX,
        };

        if datetime.year() < DOS_EPOCH_YEAR {
            return Self::EPOCH;
        }
        if datetime.year() > DOS_MAX_YEAR {
            return Self::MAX;
        }

        DosDateTime {
            year: datetime.year() as u16,
            month: datetime.month() as u8,
            day: datetime.day(),
            hour: datetime.hour(),
            minute: datetime.minute(),
            second: datetime.second(),
        }
    }

    /// 解包 32 位 DOS 时间（日期在高 16 位）
    pub fn from_u32(packed: u32) -> Self {
        DosDateTime {
            year: ((packed >> 25) & 0x7F) as u16 + DOS_EPOCH_YEAR as u16,
            month: ((packed >> 21) & 0x0F) as u8,
            day: ((packed >> 16) & 0x1F) as u8,
            hour: ((packed >> 11) & 0x1F) as u8,
            minute: ((packed >> 5) & 0x3F) as u8,
            second: ((packed << 1) & 0x3E) as u8,
        }
    }

    /// 日期字: (year-1980)<<9 | month<<5 | day
    pub fn date(&self) -> u16 {
        ((self.year - DOS_EPOCH_YEAR as u16) << 9) | ((self.month as u16) << 5) | self.day as u16
    }

    /// 时间字: hour<<11 | minute<<5 | second/2
    pub fn time(&self) -> u16 {
        ((self.hour as u16) << 11) | ((self.minute as u16) << 5) | ((self.second as u16) >> 1)
    }

    pub fn to_u32(&self) -> u32 {
        ((self.date() as u32) << 16) | self.time() as u32
    }

    /// Back to a Unix timestamp (UTC). Returns `None` for invalid calendar fields.
    pub fn to_unix(&self) -> Option<i64> {
        let month = Month::try_from(self.month).ok()?;
        let date = Date::from_calendar_date(self.year as i32, month, self.day).ok()?;
        let time = Time::from_hms(self.hour, self.minute, self.second).ok()?;
        Some(PrimitiveDateTime::new(date, time).assume_utc().unix_timestamp())
    }
}

/// Unix timestamp to packed 32-bit DOS date/time.
pub fn unix_to_dos(timestamp: i64) -> u32 {
    DosDateTime::from_unix(timestamp).to_u32()
}

/// Packed 32-bit DOS date/time to a Unix timestamp.
pub fn dos_to_unix(packed: u32) -> Option<i64> {
    DosDateTime::from_u32(packed).to_unix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(315_532_799)] // 1979-12-31 23:59:59
    #[case(i64::MIN)]
    fn test_clamps_before_1980(#[case] timestamp: i64) {
        let packed = unix_to_dos(timestamp);
        assert_eq!(packed, (1 << 21) | (1 << 16));
        assert_eq!(DosDateTime::from_u32(packed), DosDateTime::EPOCH);
    }

    #[test]
    fn test_2020_new_year() {
        // 2020-01-01 00:00:00 UTC
        let dos = DosDateTime::from_unix(1_577_836_800);
        assert_eq!(dos.date() >> 9, 40);
        assert_eq!((dos.date() >> 5) & 0x0F, 1);
        assert_eq!(dos.date() & 0x1F, 1);
        assert_eq!(dos.time(), 0);
    }

    #[test]
    fn test_bit_layout() {
        // 2001-09-09 01:46:40 UTC
        let packed = unix_to_dos(1_000_000_000);
        assert_eq!(packed >> 25, 21);
        assert_eq!((packed >> 21) & 0x0F, 9);
        assert_eq!((packed >> 16) & 0x1F, 9);
        assert_eq!((packed >> 11) & 0x1F, 1);
        assert_eq!((packed >> 5) & 0x3F, 46);
        assert_eq!(packed & 0x1F, 20);
    }

    #[test]
    fn test_odd_seconds_round_down() {
        let packed = unix_to_dos(1_000_000_001);
        assert_eq!(dos_to_unix(packed), Some(1_000_000_000));
    }

    #[test]
    fn test_far_future_clamps() {
        assert_eq!(DosDateTime::from_unix(i64::MAX), DosDateTime::MAX);
        // 2200-01-01
        assert_eq!(DosDateTime::from_unix(7_258_118_400), DosDateTime::MAX);
    }

    #[test]
    fn test_invalid_fields() {
        assert_eq!(dos_to_unix(0), None);
    }
}
