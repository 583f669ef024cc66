//! Message codec (panic-free).
//!
//! Layout of every frame:
//! ```text
//! [u8]  message tag
//! [i64] sender participant id
//! ...   type-specific fields, written and read in schema order
//! ```
//! Scalars are little-endian. `vector3` is three `f32`, `quaternion` is
//! `x, y, z, w` as `f32`, strings are an `i64` byte length followed by the bytes.
//!
//! Parsing rules:
//! - Never index (`buf[0]`); always check `remaining()` before a `get_*`.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use glam::{Quat, Vec3};

use crate::error::{Result, SyncError};
use crate::protocol::ParticipantId;

/// Header size: tag (1) + sender (8).
pub const HEADER_LEN: usize = 9;

/// Upper bound for a single string field.
pub const MAX_STRING_LEN: usize = 64 * 1024;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub tag: u8,
    pub sender: ParticipantId,
}

/// Builder for an outgoing frame bound to one tag.
#[derive(Debug)]
pub struct MessageWriter {
    buf: BytesMut,
}

impl MessageWriter {
    /// Start a frame; the header is written immediately.
    pub fn new(tag: u8, sender: ParticipantId) -> Self {
        let mut buf = BytesMut::with_capacity(64);
        buf.put_u8(tag);
        buf.put_i64_le(sender.get());
        Self { buf }
    }

    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.buf.put_u8(v);
        self
    }

    pub fn put_bool(&mut self, v: bool) -> &mut Self {
        self.buf.put_u8(u8::from(v));
        self
    }

    pub fn put_i64(&mut self, v: i64) -> &mut Self {
        self.buf.put_i64_le(v);
        self
    }

    pub fn put_f32(&mut self, v: f32) -> &mut Self {
        self.buf.put_f32_le(v);
        self
    }

    pub fn put_vec3(&mut self, v: Vec3) -> &mut Self {
        self.put_f32(v.x).put_f32(v.y).put_f32(v.z)
    }

    pub fn put_quat(&mut self, q: Quat) -> &mut Self {
        self.put_f32(q.x).put_f32(q.y).put_f32(q.z).put_f32(q.w)
    }

    /// Length-prefixed string. Lengths are bounded by `MAX_STRING_LEN` on read;
    /// senders reject longer values up front (`SyncMessage::check_lengths`), and
    /// the writer truncates at a char boundary rather than emit an unreadable field.
    pub fn put_str(&mut self, s: &str) -> &mut Self {
        let mut end = s.len().min(MAX_STRING_LEN);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        if end < s.len() {
            tracing::warn!(len = s.len(), kept = end, "string field truncated");
        }
        let bytes = &s.as_bytes()[..end];
        self.buf.put_i64_le(bytes.len() as i64);
        self.buf.put_slice(bytes);
        self
    }

    /// Current encoded length, header included.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Sequential reader over an incoming frame. The header is consumed by `new`.
#[derive(Debug)]
pub struct MessageReader {
    header: FrameHeader,
    buf: Bytes,
}

impl MessageReader {
    pub fn new(mut buf: Bytes) -> Result<Self> {
        need(&buf, HEADER_LEN, "header")?;
        let tag = buf.get_u8();
        let sender = ParticipantId(buf.get_i64_le());
        Ok(Self {
            header: FrameHeader { tag, sender },
            buf,
        })
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn tag(&self) -> u8 {
        self.header.tag
    }

    pub fn sender(&self) -> ParticipantId {
        self.header.sender
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        need(&self.buf, 1, "u8")?;
        Ok(self.buf.get_u8())
    }

    /// Any non-zero byte reads as `true`.
    pub fn get_bool(&mut self) -> Result<bool> {
        Ok(self.get_u8()? != 0)
    }

    pub fn get_i64(&mut self) -> Result<i64> {
        need(&self.buf, 8, "i64")?;
        Ok(self.buf.get_i64_le())
    }

    pub fn get_f32(&mut self) -> Result<f32> {
        need(&self.buf, 4, "f32")?;
        Ok(self.buf.get_f32_le())
    }

    pub fn get_vec3(&mut self) -> Result<Vec3> {
        need(&self.buf, 12, "vector3")?;
        Ok(Vec3::new(
            self.buf.get_f32_le(),
            self.buf.get_f32_le(),
            self.buf.get_f32_le(),
        ))
    }

    pub fn get_quat(&mut self) -> Result<Quat> {
        need(&self.buf, 16, "quaternion")?;
        Ok(Quat::from_xyzw(
            self.buf.get_f32_le(),
            self.buf.get_f32_le(),
            self.buf.get_f32_le(),
            self.buf.get_f32_le(),
        ))
    }

    pub fn get_string(&mut self) -> Result<String> {
        let len = self.get_i64()?;
        let len = usize::try_from(len)
            .map_err(|_| SyncError::InvalidPayload(format!("negative string length: {len}")))?;
        if len > MAX_STRING_LEN {
            return Err(SyncError::InvalidPayload(format!(
                "string length {len} exceeds {MAX_STRING_LEN}"
            )));
        }
        need(&self.buf, len, "string bytes")?;
        let raw = self.buf.copy_to_bytes(len);
        String::from_utf8(raw.to_vec())
            .map_err(|e| SyncError::InvalidPayload(format!("string is not utf-8: {e}")))
    }
}

fn need(buf: &Bytes, needed: usize, field: &'static str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(SyncError::Truncated {
            field,
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}
