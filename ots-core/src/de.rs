//! Binary `.ots` parser.
//!
//! The grammar is recursive and tagged:
//!
//! ```text
//! OtsFile     := Magic(31B) Version:varuint HashTag:1B FileDigest:N Timestamp
//! Timestamp   := (0xFF Branch)* Branch
//! Branch      := 0x00 Attestation | Operation Timestamp
//! Attestation := AttTag:8B VarBytes
//! VarBytes    := Length:varuint Bytes(Length)
//! ```
//!
//! A node with k branches carries (k-1) `0xFF` fork markers. Every
//! varuint is unsigned LEB128 and must stay below 2^53; every varbytes
//! length is capped; recursion is capped at 256 levels. The caps guard
//! memory against pathological inputs, not just numerics.

use crate::attestation::{
    Attestation, BITCOIN_TAG, ETHEREUM_TAG, LITECOIN_TAG, PENDING_TAG,
};
use crate::crypto::{constant_time_eq, HashAlgorithm};
use crate::error::{Error, Result};
use crate::op::{Operation, TAG_APPEND, TAG_HEXLIFY, TAG_PREPEND, TAG_REVERSE};
use crate::timestamp::{OtsFile, Timestamp};

/// The 31-byte file header every `.ots` document starts with.
pub const MAGIC: [u8; 31] =
    *b"\x00OpenTimestamps\x00\x00Proof\x00\xbf\x89\xe2\xe8\x84\xe8\x92\x94";

/// The only supported format version.
pub const VERSION: u64 = 1;

/// Fork marker separating sibling branches.
pub(crate) const FORK_MARKER: u8 = 0xff;

/// Attestation marker opening an attestation branch.
pub(crate) const ATTESTATION_MARKER: u8 = 0x00;

/// Parser bounds.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum length of a single varbytes field.
    pub max_varbytes: usize,
    /// Maximum tree depth for the parser and the walkers.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_varbytes: 1 << 20,
            max_depth: 256,
        }
    }
}

/// Byte cursor over an input slice.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn peek(&self) -> Result<u8> {
        self.buf.get(self.pos).copied().ok_or(Error::UnexpectedEof)
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof);
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Unsigned LEB128, rejecting values at or above 2^53.
    ///
    /// The eighth byte carries the bits at shift 49; a payload above 15
    /// there, or any ninth byte, overflows.
    fn read_varuint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.read_u8()?;
            let payload = u64::from(byte & 0x7f);
            if shift > 49 || (shift == 49 && payload > 15) {
                return Err(Error::VaruintOverflow);
            }
            value |= payload << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    fn read_varbytes(&mut self, limits: &Limits) -> Result<&'a [u8]> {
        let len = self.read_varuint()?;
        if len > limits.max_varbytes as u64 {
            return Err(Error::VarbytesTooLarge {
                len,
                max: limits.max_varbytes as u64,
            });
        }
        self.read_bytes(len as usize)
    }
}

impl OtsFile {
    /// Parse a complete `.ots` document with default limits.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, &Limits::default())
    }

    /// Parse a complete `.ots` document with explicit limits.
    ///
    /// The whole input must be consumed; trailing bytes are an error.
    pub fn from_bytes_with(bytes: &[u8], limits: &Limits) -> Result<Self> {
        let mut cur = Cursor::new(bytes);
        let magic = cur.read_bytes(MAGIC.len())?;
        if !constant_time_eq(magic, &MAGIC) {
            return Err(Error::BadMagic);
        }
        let version = cur.read_varuint()?;
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let hash_op = HashAlgorithm::from_tag(cur.read_u8()?)?;
        let file_digest = cur.read_bytes(hash_op.digest_len())?.to_vec();
        let timestamp = parse_timestamp(&mut cur, 0, limits)?;
        if cur.remaining() != 0 {
            return Err(Error::TrailingBytes);
        }
        Ok(Self {
            hash_op,
            file_digest,
            timestamp,
        })
    }
}

impl Timestamp {
    /// Parse a standalone timestamp (e.g. a calendar response body)
    /// with default limits.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, &Limits::default())
    }

    /// Parse a standalone timestamp with explicit limits.
    ///
    /// Uses the same grammar as a timestamp at any internal node of a
    /// document; the whole input must be consumed.
    pub fn from_bytes_with(bytes: &[u8], limits: &Limits) -> Result<Self> {
        let mut cur = Cursor::new(bytes);
        let node = parse_timestamp(&mut cur, 0, limits)?;
        if cur.remaining() != 0 {
            return Err(Error::TrailingBytes);
        }
        Ok(node)
    }
}

/// Parse one node: every leading fork marker introduces one sibling
/// branch, then exactly one final branch follows bare.
fn parse_timestamp(cur: &mut Cursor<'_>, depth: usize, limits: &Limits) -> Result<Timestamp> {
    if depth > limits.max_depth {
        return Err(Error::DepthExceeded {
            max: limits.max_depth,
        });
    }
    let mut node = Timestamp::new();
    while cur.peek()? == FORK_MARKER {
        cur.read_u8()?;
        parse_branch(cur, &mut node, depth, limits)?;
    }
    parse_branch(cur, &mut node, depth, limits)?;
    Ok(node)
}

fn parse_branch(
    cur: &mut Cursor<'_>,
    node: &mut Timestamp,
    depth: usize,
    limits: &Limits,
) -> Result<()> {
    if cur.peek()? == ATTESTATION_MARKER {
        cur.read_u8()?;
        node.attestations.push(parse_attestation(cur, limits)?);
    } else {
        let op = parse_operation(cur, limits)?;
        let child = parse_timestamp(cur, depth + 1, limits)?;
        node.ops.push((op, child));
    }
    Ok(())
}

fn parse_operation(cur: &mut Cursor<'_>, limits: &Limits) -> Result<Operation> {
    let tag = cur.read_u8()?;
    match tag {
        TAG_APPEND => Ok(Operation::Append(cur.read_varbytes(limits)?.to_vec())),
        TAG_PREPEND => Ok(Operation::Prepend(cur.read_varbytes(limits)?.to_vec())),
        TAG_REVERSE => Ok(Operation::Reverse),
        TAG_HEXLIFY => Ok(Operation::Hexlify),
        0x08 => Ok(Operation::Sha256),
        0x02 => Ok(Operation::Sha1),
        0x03 => Ok(Operation::Ripemd160),
        0x67 => Ok(Operation::Keccak256),
        other => Err(Error::UnknownOpTag(other)),
    }
}

fn parse_attestation(cur: &mut Cursor<'_>, limits: &Limits) -> Result<Attestation> {
    let mut tag = [0u8; 8];
    tag.copy_from_slice(cur.read_bytes(8)?);
    let payload = cur.read_varbytes(limits)?;
    match tag {
        BITCOIN_TAG => Ok(Attestation::Bitcoin {
            height: parse_height(payload)?,
        }),
        LITECOIN_TAG => Ok(Attestation::Litecoin {
            height: parse_height(payload)?,
        }),
        ETHEREUM_TAG => Ok(Attestation::Ethereum {
            height: parse_height(payload)?,
        }),
        PENDING_TAG => {
            let mut inner = Cursor::new(payload);
            let uri_bytes = inner.read_varbytes(limits)?;
            if inner.remaining() != 0 {
                return Err(Error::TrailingBytes);
            }
            let uri = std::str::from_utf8(uri_bytes)
                .map_err(|_| Error::InvalidUri)?
                .to_string();
            Ok(Attestation::Pending { uri })
        }
        _ => Ok(Attestation::Unknown {
            tag,
            payload: payload.to_vec(),
        }),
    }
}

/// A known height payload is a single varuint, fully consumed.
fn parse_height(payload: &[u8]) -> Result<u64> {
    let mut cur = Cursor::new(payload);
    let height = cur.read_varuint()?;
    if cur.remaining() != 0 {
        return Err(Error::TrailingBytes);
    }
    Ok(height)
}
