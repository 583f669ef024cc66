//! Bitmask-gated transform payloads.
//!
//! ```text
//! [u8] target   (0 volume, 1 cursor, 2 tools)
//! [u8] flags    (bit N set => field N follows)
//! position        vector3     flag 0x01
//! rotation        quaternion  flag 0x02
//! local_position  vector3     flag 0x04
//! local_rotation  quaternion  flag 0x08
//! local_scale     vector3     flag 0x10
//! ```
//! Fields always follow in that order. A receiver applies only the fields whose
//! bit is set; everything else keeps its prior value.

use glam::{Quat, Vec3};

use crate::error::{Result, SyncError};
use crate::protocol::codec::{MessageReader, MessageWriter};

/// Which synchronized object a transform update addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransformTarget {
    Volume = 0,
    Cursor = 1,
    Tools = 2,
}

impl TransformTarget {
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(TransformTarget::Volume),
            1 => Ok(TransformTarget::Cursor),
            2 => Ok(TransformTarget::Tools),
            other => Err(SyncError::InvalidPayload(format!(
                "unknown transform target: {other}"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TransformTarget::Volume => "volume",
            TransformTarget::Cursor => "cursor",
            TransformTarget::Tools => "tools",
        }
    }
}

/// Field selector bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformFlags(u8);

impl TransformFlags {
    pub const POSITION: TransformFlags = TransformFlags(0x01);
    pub const ROTATION: TransformFlags = TransformFlags(0x02);
    pub const LOCAL_POSITION: TransformFlags = TransformFlags(0x04);
    pub const LOCAL_ROTATION: TransformFlags = TransformFlags(0x08);
    pub const LOCAL_SCALE: TransformFlags = TransformFlags(0x10);

    const KNOWN: u8 = 0x1f;

    pub const fn empty() -> Self {
        TransformFlags(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Rejects unknown bits: their fields would shift every later read.
    pub fn from_bits(bits: u8) -> Result<Self> {
        if bits & !Self::KNOWN != 0 {
            return Err(SyncError::InvalidPayload(format!(
                "unknown transform flag bits: {bits:#04x}"
            )));
        }
        Ok(TransformFlags(bits))
    }

    pub const fn contains(self, other: TransformFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Encoded size of the selected fields.
    pub fn payload_len(self) -> usize {
        let mut n = 0;
        if self.contains(Self::POSITION) {
            n += 12;
        }
        if self.contains(Self::ROTATION) {
            n += 16;
        }
        if self.contains(Self::LOCAL_POSITION) {
            n += 12;
        }
        if self.contains(Self::LOCAL_ROTATION) {
            n += 16;
        }
        if self.contains(Self::LOCAL_SCALE) {
            n += 12;
        }
        n
    }
}

impl std::ops::BitOr for TransformFlags {
    type Output = TransformFlags;

    fn bitor(self, rhs: TransformFlags) -> TransformFlags {
        TransformFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for TransformFlags {
    fn bitor_assign(&mut self, rhs: TransformFlags) {
        self.0 |= rhs.0;
    }
}

/// Optional transform fields. `None` means "leave the receiver's value alone".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformFields {
    /// Frame-relative position.
    pub position: Option<Vec3>,
    /// Frame-relative rotation.
    pub rotation: Option<Quat>,
    pub local_position: Option<Vec3>,
    pub local_rotation: Option<Quat>,
    pub local_scale: Option<Vec3>,
}

impl TransformFields {
    pub fn flags(&self) -> TransformFlags {
        let mut f = TransformFlags::empty();
        if self.position.is_some() {
            f |= TransformFlags::POSITION;
        }
        if self.rotation.is_some() {
            f |= TransformFlags::ROTATION;
        }
        if self.local_position.is_some() {
            f |= TransformFlags::LOCAL_POSITION;
        }
        if self.local_rotation.is_some() {
            f |= TransformFlags::LOCAL_ROTATION;
        }
        if self.local_scale.is_some() {
            f |= TransformFlags::LOCAL_SCALE;
        }
        f
    }
}

/// One `UpdateTransform` body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformUpdate {
    pub target: TransformTarget,
    pub fields: TransformFields,
}

impl TransformUpdate {
    /// Bytes after the frame header: target + flags + selected fields.
    pub fn body_len(&self) -> usize {
        2 + self.fields.flags().payload_len()
    }

    pub fn encode(&self, w: &mut MessageWriter) {
        let f = &self.fields;
        w.put_u8(self.target as u8).put_u8(f.flags().bits());
        if let Some(v) = f.position {
            w.put_vec3(v);
        }
        if let Some(q) = f.rotation {
            w.put_quat(q);
        }
        if let Some(v) = f.local_position {
            w.put_vec3(v);
        }
        if let Some(q) = f.local_rotation {
            w.put_quat(q);
        }
        if let Some(v) = f.local_scale {
            w.put_vec3(v);
        }
    }

    pub fn decode(r: &mut MessageReader) -> Result<Self> {
        let target = TransformTarget::from_u8(r.get_u8()?)?;
        let flags = TransformFlags::from_bits(r.get_u8()?)?;

        let mut fields = TransformFields::default();
        if flags.contains(TransformFlags::POSITION) {
            fields.position = Some(r.get_vec3()?);
        }
        if flags.contains(TransformFlags::ROTATION) {
            fields.rotation = Some(r.get_quat()?);
        }
        if flags.contains(TransformFlags::LOCAL_POSITION) {
            fields.local_position = Some(r.get_vec3()?);
        }
        if flags.contains(TransformFlags::LOCAL_ROTATION) {
            fields.local_rotation = Some(r.get_quat()?);
        }
        if flags.contains(TransformFlags::LOCAL_SCALE) {
            fields.local_scale = Some(r.get_vec3()?);
        }

        Ok(Self { target, fields })
    }
}
