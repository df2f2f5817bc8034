//! Serial - Cheap-to-clone camera serial
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Number of raw identifier bytes a device reports.
pub const SERIAL_RAW_LEN: usize = 12;

/// Camera serial with cheap cloning.
///
/// Serials are created once at scan time and cloned into bindings, handles
/// and every log line that names a device.
///
/// # Examples
/// ```
/// use contracts::Serial;
///
/// let serial = Serial::from_raw(b"AB12CD34EF56");
/// assert_eq!(serial.as_str(), "AB12-CD34-EF56");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Serial(Arc<str>);

impl Serial {
    /// Create a new Serial from an already formatted string.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Format the 12 raw identifier bytes as `XXXX-XXXX-XXXX`.
    pub fn from_raw(raw: &[u8; SERIAL_RAW_LEN]) -> Self {
        let groups: Vec<String> = raw
            .chunks(4)
            .map(|chunk| chunk.iter().map(|&b| b as char).collect())
            .collect();
        Self(Arc::from(groups.join("-")))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Serial {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Serial {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Serial {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Serial {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for Serial {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Debug for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Serial({:?})", &*self.0)
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Serial {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Serial {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Serialize for Serial {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Serial {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_raw_groups_by_four() {
        let serial = Serial::from_raw(b"U3CAM0001234");
        assert_eq!(serial, "U3CA-M000-1234");
    }

    #[test]
    fn test_clone_shares_allocation() {
        let a = Serial::new("AB12-CD34-EF56");
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn test_hashmap_lookup_by_str() {
        let mut map: HashMap<Serial, u32> = HashMap::new();
        map.insert(Serial::new("AB12-CD34-EF56"), 3);
        assert_eq!(map.get("AB12-CD34-EF56"), Some(&3));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let serial = Serial::new("AB12-CD34-EF56");
        let json = serde_json::to_string(&serial).unwrap();
        assert_eq!(json, "\"AB12-CD34-EF56\"");
        let back: Serial = serde_json::from_str(&json).unwrap();
        assert_eq!(back, serial);
    }
}
