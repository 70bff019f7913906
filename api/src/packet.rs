//! Shared vocabulary between the dissection engine and whoever hands it frames or
//! renders its results.
//!
//! Nothing in here parses bytes. A [`Frame`] borrows the captured bytes, [`Protocol`]
//! names every layer the engine knows how to decode, and [`Status`] / [`Validation`]
//! describe how far dissection got and what it thought of the embedded checksums and
//! length fields.

use anyhow::{anyhow, Result};
use serde::Serialize;

#[derive(Clone, Copy, Debug)]
/// One captured link-layer unit
pub struct Frame<'a> {
    /// Captured bytes, already cut down to the capture length
    raw: &'a [u8],
    /// Original length on the wire, if the capture source reported one
    wire_len: Option<usize>,
}

impl<'a> Frame<'a> {
    /// Create a frame from a capture buffer and the number of bytes actually captured
    ///
    /// The capture buffer may be larger than the captured length (ring buffers, fixed-size
    /// receive buffers), but never smaller.
    pub fn new(buf: &'a [u8], caplen: usize) -> Result<Self> {
        if caplen > buf.len() {
            return Err(anyhow!(
                "Capture length {} exceeds buffer size {}",
                caplen,
                buf.len()
            ));
        }

        Ok(Self {
            raw: &buf[..caplen],
            wire_len: None,
        })
    }

    /// Attach the original on-wire length reported by the capture source
    pub fn with_wire_len(mut self, wire_len: usize) -> Self {
        self.wire_len = Some(wire_len);
        self
    }

    /// Get raw packet data
    #[inline]
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Get packet capture length
    #[inline]
    pub fn caplen(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn wire_len(&self) -> Option<usize> {
        self.wire_len
    }

    /// Whether the capture source cut this frame short (snap length smaller than the frame)
    #[inline]
    pub fn is_truncated(&self) -> bool {
        match self.wire_len {
            Some(len) => len > self.raw.len(),
            None => false,
        }
    }
}

impl<'a> From<&'a [u8]> for Frame<'a> {
    fn from(raw: &'a [u8]) -> Self {
        Self {
            raw,
            wire_len: None,
        }
    }
}

#[repr(u8)]
#[derive(
    AsRefStr, Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[allow(non_camel_case_types)]
/// Protocol collection, 1 byte
pub enum Protocol {
    // Data link layer protocols
    ETHERNET,
    VLAN,
    ARP,

    // Vendor link layer protocols
    HOMEPLUG,
    HOMEPLUG_AV,
    LLTD,
    PROFINET,
    IEEE_1905,

    // Network layer protocols
    IPV4,
    IPV6,
    IPV6_EXT,
    ICMP,
    ICMPV6,
    IGMP,

    // Transport layer protocols
    TCP,
    UDP,

    // Application layer protocols
    DNS,

    // Unknown protocol
    UNKNOWN,
}

impl Default for Protocol {
    #[inline]
    fn default() -> Self {
        Protocol::UNKNOWN
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Outcome of a checksum or length check on a single layer
///
/// A mismatch never stops dissection: checksum offloading and snap length truncation
/// both produce frames whose checksums are wrong while the headers are perfectly fine.
pub enum Validation {
    Ok,
    Mismatch,
    /// The layer has no such field, the check is disabled, or the covered bytes are not
    /// all available (fragments).
    Unchecked,
}

impl Default for Validation {
    fn default() -> Self {
        Validation::Unchecked
    }
}

impl Validation {
    #[inline]
    pub fn from_check(ok: bool) -> Self {
        if ok {
            Validation::Ok
        } else {
            Validation::Mismatch
        }
    }

    #[inline]
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Validation::Mismatch)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
/// Why dissection stopped
pub enum Status {
    /// Every header was decoded; whatever is left is opaque payload
    Complete,
    /// `protocol` handed over to a protocol identifier nobody is registered for
    UnknownProtocol { protocol: Protocol, id: u32 },
    /// `protocol` is recognized but carries an encoding the engine deliberately skips
    Unsupported {
        protocol: Protocol,
        reason: &'static str,
    },
    /// Fewer bytes remained than `protocol`'s header needs
    Truncated { protocol: Protocol },
    /// `protocol`'s header violates a structural invariant
    Malformed {
        protocol: Protocol,
        reason: &'static str,
    },
}

impl Default for Status {
    fn default() -> Self {
        Status::Complete
    }
}

impl Status {
    /// Stopped because the input was broken, as opposed to a normal terminal state
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Truncated { .. } | Status::Malformed { .. })
    }
}
