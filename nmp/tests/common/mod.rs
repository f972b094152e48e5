//! Synthetic pack writer shared by unit tests, integration tests and benches.
//!
//! Only std is used so the file can be included from inside the crate as well.

#![allow(dead_code)]

use std::collections::BTreeMap;

pub const MAGIC: [u8; 4] = *b"UKPP";
pub const LUT_ENTRIES: usize = 26 * 36;

/// Extents used unless a test overrides them: exactly representable, so
/// normalized 0 and 65535 map to whole degrees.
pub const TEST_BBOX: [f64; 4] = [-8.0, 2.0, 49.0, 61.0];

/// How a record stores its postcode code.
#[derive(Debug, Clone, Copy)]
pub enum Code {
    /// 3-byte absolute code.
    Absolute(u32),
    /// 3-byte absolute code flagged as outward-only.
    OutwardOnly(u32),
    /// Step of 1..=64 from the previous code, stored in the format byte.
    Delta(u8),
}

/// How a record stores its coordinates.
#[derive(Debug, Clone, Copy)]
pub enum Coords {
    /// Absolute normalized `(lat, long)`.
    Absolute(u16, u16),
    /// Signed step from the previous record.
    Delta(i8, i8),
}

/// Encodes a record stream for one bucket.
#[derive(Debug, Clone, Default)]
pub struct Records {
    pub bytes: Vec<u8>,
}

impl Records {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, code: Code, coords: Coords) -> Self {
        let mut format = match code {
            Code::Absolute(_) => 0x00,
            Code::OutwardOnly(_) => 0x20,
            Code::Delta(step) => {
                assert!((1..=64).contains(&step), "delta step must be 1..=64");
                0x80 | (step - 1)
            }
        };
        if matches!(coords, Coords::Delta(..)) {
            format |= 0x40;
        }
        self.bytes.push(format);

        if let Code::Absolute(c) | Code::OutwardOnly(c) = code {
            self.bytes.extend_from_slice(&c.to_le_bytes()[..3]);
        }
        match coords {
            Coords::Absolute(lat, long) => {
                self.bytes.extend_from_slice(&lat.to_le_bytes());
                self.bytes.extend_from_slice(&long.to_le_bytes());
            }
            Coords::Delta(dlat, dlong) => {
                self.bytes.push(dlat as u8);
                self.bytes.push(dlong as u8);
            }
        }
        self
    }

    pub fn absolute(self, code: u32, lat: u16, long: u16) -> Self {
        self.push(Code::Absolute(code), Coords::Absolute(lat, long))
    }

    pub fn outward_only(self, code: u32, lat: u16, long: u16) -> Self {
        self.push(Code::OutwardOnly(code), Coords::Absolute(lat, long))
    }

    pub fn delta(self, step: u8, dlat: i8, dlong: i8) -> Self {
        self.push(Code::Delta(step), Coords::Delta(dlat, dlong))
    }
}

/// Builds a complete pack file in memory.
#[derive(Debug, Clone)]
pub struct PackFixture {
    pub magic: [u8; 4],
    pub version: u32,
    pub timestamp: (u32, u32),
    pub bbox: [f64; 4],
    buckets: BTreeMap<usize, Vec<u8>>,
}

impl Default for PackFixture {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: 2,
            timestamp: (1_700_000_000, 0),
            bbox: TEST_BBOX,
            buckets: BTreeMap::new(),
        }
    }
}

/// Table slot for a prefix of `A`–`Z` followed by `0`–`9` or `A`–`Z`.
pub fn slot(prefix: &[u8; 2]) -> usize {
    let second = match prefix[1] {
        c @ b'0'..=b'9' => (c - b'0') as usize,
        c @ b'A'..=b'Z' => (c - b'A') as usize + 10,
        c => panic!("no slot for second character {:?}", c as char),
    };
    (prefix[0] - b'A') as usize * 36 + second
}

impl PackFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    pub fn bbox(mut self, bbox: [f64; 4]) -> Self {
        self.bbox = bbox;
        self
    }

    /// Place records in the bucket for `prefix`.
    pub fn bucket(self, prefix: &[u8; 2], records: Records) -> Self {
        self.bucket_at(slot(prefix), records)
    }

    /// Place records at a raw table slot.
    pub fn bucket_at(mut self, index: usize, records: Records) -> Self {
        assert!(index < LUT_ENTRIES);
        self.buckets.insert(index, records.bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.magic);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.timestamp.0.to_le_bytes());
        out.extend_from_slice(&self.timestamp.1.to_le_bytes());
        for v in self.bbox {
            out.extend_from_slice(&v.to_le_bytes());
        }

        let mut stream = Vec::new();
        for index in 0..LUT_ENTRIES {
            out.extend_from_slice(&(stream.len() as u32).to_le_bytes());
            if let Some(bytes) = self.buckets.get(&index) {
                stream.extend_from_slice(bytes);
            }
        }
        out.extend_from_slice(&(stream.len() as u32).to_le_bytes());
        out.extend_from_slice(&stream);
        out
    }
}
