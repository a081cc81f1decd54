/// Wildcard octet: the field is unspecified.
pub const UNSPECIFIED: u8 = 0xFF;

/// BACnet date. Any field may be [`UNSPECIFIED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub year_since_1900: u8,
    pub month: u8,
    pub day: u8,
    /// 1 = Monday .. 7 = Sunday.
    pub weekday: u8,
}

impl Date {
    pub const fn from_octets([year_since_1900, month, day, weekday]: [u8; 4]) -> Self {
        Self {
            year_since_1900,
            month,
            day,
            weekday,
        }
    }

    pub const fn to_octets(self) -> [u8; 4] {
        [self.year_since_1900, self.month, self.day, self.weekday]
    }

    /// Calendar year, unless unspecified.
    pub fn year(self) -> Option<u16> {
        (self.year_since_1900 != UNSPECIFIED).then(|| 1900 + u16::from(self.year_since_1900))
    }
}

/// BACnet time of day. Any field may be [`UNSPECIFIED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub hundredths: u8,
}

impl Time {
    pub const fn from_octets([hour, minute, second, hundredths]: [u8; 4]) -> Self {
        Self {
            hour,
            minute,
            second,
            hundredths,
        }
    }

    pub const fn to_octets(self) -> [u8; 4] {
        [self.hour, self.minute, self.second, self.hundredths]
    }
}
