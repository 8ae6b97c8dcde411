use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Multibase prefix for lower-case base16.
const MULTIBASE_BASE16: char = 'f';

/// The only identifier version this crate reads or writes.
const CID_VERSION: u64 = 1;

/// Codec tag carried by every identifier.
///
/// The codec says how a block's bytes are to be interpreted. Only three values
/// matter to the migration: the two raw tags and the linked-node tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Codec(u64);

impl Codec {
    /// Uninterpreted bytes, canonical tag.
    pub const RAW: Self = Self(0x55);
    /// Uninterpreted bytes, legacy tag that the migration retires.
    pub const LEGACY_RAW: Self = Self(0x72);
    /// A node with ordered links and an opaque data payload.
    pub const DAG_NODE: Self = Self(0x70);

    pub const fn new(code: u64) -> Self {
        Self(code)
    }

    pub const fn code(&self) -> u64 {
        self.0
    }

    pub fn is_legacy_raw(&self) -> bool {
        *self == Self::LEGACY_RAW
    }

    pub fn is_dag_node(&self) -> bool {
        *self == Self::DAG_NODE
    }

    /// Short human-readable name, or `None` for codecs this crate does not know.
    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::RAW => Some("raw"),
            Self::LEGACY_RAW => Some("legacy-raw"),
            Self::DAG_NODE => Some("dag-node"),
            _ => None,
        }
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Codec({name})"),
            None => write!(f, "Codec({:#x})", self.0),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

/// A self-describing hash: hash function code plus digest bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Multihash {
    code: u64,
    digest: Vec<u8>,
}

impl Multihash {
    /// Multihash code for BLAKE3 with a 32-byte digest.
    pub const BLAKE3: u64 = 0x1e;

    /// Wrap an existing digest.
    pub fn new(code: u64, digest: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            digest: digest.into(),
        }
    }

    /// Hash `data` with the canonical hash function (BLAKE3).
    pub fn blake3(data: &[u8]) -> Self {
        Self::new(Self::BLAKE3, blake3::hash(data).as_bytes().to_vec())
    }

    pub fn code(&self) -> u64 {
        self.code
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }
}

impl fmt::Debug for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multihash({:#x}:{})", self.code, hex::encode(&self.digest))
    }
}

/// Content identifier: a codec tag plus the multihash of the block's bytes.
///
/// Two identifiers are equal only if both the codec and the multihash match,
/// so the same bytes stored under two codecs are two distinct blocks.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cid {
    codec: Codec,
    hash: Multihash,
}

impl Cid {
    pub fn new(codec: Codec, hash: Multihash) -> Self {
        Self { codec, hash }
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn hash(&self) -> &Multihash {
        &self.hash
    }

    /// Relabel a legacy-raw identifier to the canonical raw codec.
    ///
    /// Any other identifier is returned unchanged. The multihash is preserved:
    /// the two raw codecs describe the same bytes.
    pub fn to_canonical_raw(&self) -> Cid {
        if !self.codec.is_legacy_raw() {
            return self.clone();
        }
        Cid::new(Codec::RAW, self.hash.clone())
    }

    /// Binary form: `varint(version) varint(codec) varint(hash code) varint(len) digest`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.hash.digest.len() + 8);
        write_varint(&mut out, CID_VERSION);
        write_varint(&mut out, self.codec.code());
        write_varint(&mut out, self.hash.code);
        write_varint(&mut out, self.hash.digest.len() as u64);
        out.extend_from_slice(&self.hash.digest);
        out
    }

    /// Parse the binary form produced by [`Cid::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let mut cursor = bytes;
        let version = read_varint(&mut cursor)?;
        if version != CID_VERSION {
            return Err(TypeError::UnsupportedVersion(version));
        }
        let codec = Codec::new(read_varint(&mut cursor)?);
        let code = read_varint(&mut cursor)?;
        let len = read_varint(&mut cursor)? as usize;
        if cursor.len() != len {
            return Err(TypeError::InvalidLength {
                expected: len,
                actual: cursor.len(),
            });
        }
        Ok(Self::new(codec, Multihash::new(code, cursor)))
    }

    /// Text form: multibase base16 (`f` prefix) of the binary form.
    pub fn to_text(&self) -> String {
        let mut s = String::with_capacity(1 + 2 * (self.hash.digest.len() + 8));
        s.push(MULTIBASE_BASE16);
        s.push_str(&hex::encode(self.to_bytes()));
        s
    }

    /// Short text form for log fields (prefix of the digest only).
    pub fn short(&self) -> String {
        let end = self.hash.digest.len().min(4);
        format!("{}:{}", self.codec, hex::encode(&self.hash.digest[..end]))
    }
}

/// Apply the rewrite rule. Same as [`Cid::to_canonical_raw`].
pub fn rewrite(cid: &Cid) -> Cid {
    cid.to_canonical_raw()
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", self.short())
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for Cid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(MULTIBASE_BASE16)
            .ok_or_else(|| TypeError::InvalidMultibase(s.chars().next()))?;
        let bytes = hex::decode(rest).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn read_varint(input: &mut &[u8]) -> Result<u64, TypeError> {
    let bytes: &[u8] = input;
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            *input = &bytes[i + 1..];
            return Ok(value);
        }
    }
    Err(TypeError::InvalidVarint)
}
