use static_assertions::assert_impl_all;
use std::fmt;
use std::str::FromStr;

const BASE_UUID_BYTES: [u8; 16] = [0, 0, 0, 0, 0, 0, 0x10, 0, 0x80, 0, 0, 0x80, 0x5F, 0x9B, 0x34, 0xFB];

/// Bluetooth-tailored UUID.
///
/// Identifies peripherals as well as services. Two peripherals are considered the same
/// peripheral if and only if their UUIDs are equal.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Uuid([u8; 16]);

assert_impl_all!(Uuid: Send, Sync);

impl Uuid {
    /// Returns UUID with all bytes set to zero.
    pub const fn zeroed() -> Self {
        Self([0; 16])
    }

    /// Returns the Base UUID (`00000000-0000-1000-8000-00805F9B34FB`) as defined by the specs.
    pub const fn base() -> Self {
        Self(BASE_UUID_BYTES)
    }

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Expands the 16-bit assigned number to the full UUID.
    pub const fn from_u16(v: u16) -> Self {
        Self::from_u32(v as u32)
    }

    /// Expands the 32-bit assigned number to the full UUID.
    pub const fn from_u32(v: u32) -> Self {
        let mut r = BASE_UUID_BYTES;
        let b = v.to_be_bytes();
        r[0] = b[0];
        r[1] = b[1];
        r[2] = b[2];
        r[3] = b[3];
        Self(r)
    }

    pub fn bytes(&self) -> [u8; 16] {
        self.0
    }

    /// Returns the assigned number if this UUID is derived from the Base UUID.
    pub fn assigned_number(&self) -> Option<u32> {
        if self.0[4..] == BASE_UUID_BYTES[4..] {
            Some(u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]))
        } else {
            None
        }
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if let 4 | 6 | 8 | 10 = i {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Uuid({})", self)
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(v: [u8; 16]) -> Self {
        Self::from_bytes(v)
    }
}

impl FromStr for Uuid {
    type Err = UuidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.as_bytes();
        if s.len() != 36 {
            return Err(UuidParseError(()));
        }

        fn dig(c: u8) -> Result<u8, UuidParseError> {
            Ok(match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => c - b'a' + 10,
                b'A'..=b'F' => c - b'A' + 10,
                _ => return Err(UuidParseError(())),
            })
        }

        let mut buf = [0; 16];
        let mut digits = Vec::with_capacity(32);
        for (i, &c) in s.iter().enumerate() {
            match i {
                8 | 13 | 18 | 23 => if c != b'-' {
                    return Err(UuidParseError(()));
                }
                _ => digits.push(dig(c)?),
            }
        }
        for (d, pair) in buf.iter_mut().zip(digits.chunks(2)) {
            *d = (pair[0] << 4) | pair[1];
        }
        Ok(buf.into())
    }
}

#[derive(Debug)]
pub struct UuidParseError(());

impl fmt::Display for UuidParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid UUID string")
    }
}

impl std::error::Error for UuidParseError {}
