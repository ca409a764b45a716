/// Response-code taxonomy carried in the first byte of a response body.
///
/// Ordinals 0 through 4 are fixed wire values; anything else round-trips
/// through `Other` as an opaque failure code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    InvalidArgs,
    NoRoute,
    NoPermission,
    NotFound,
    Other(u8),
}

impl ResponseCode {
    pub fn from_wire(byte: u8) -> Self {
        match byte {
            0 => Self::Success,
            1 => Self::InvalidArgs,
            2 => Self::NoRoute,
            3 => Self::NoPermission,
            4 => Self::NotFound,
            other => Self::Other(other),
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::InvalidArgs => 1,
            Self::NoRoute => 2,
            Self::NoPermission => 3,
            Self::NotFound => 4,
            Self::Other(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}
