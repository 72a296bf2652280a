//! Packet abstraction for encoded media data.
//!
//! A packet owns its place in the pipeline (one queue slot or one stage-local
//! variable at a time); the payload itself is reference counted so the demuxer
//! and duplicate writers can share bytes without copying.

use crate::timestamp::NO_PTS;
use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

bitflags! {
    /// Flags for packet properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PacketFlags: u32 {
        /// This packet contains a keyframe.
        const KEYFRAME = 0x0001;
        /// Packet data is corrupted.
        const CORRUPT = 0x0002;
    }
}

/// An encoded media packet.
#[derive(Clone)]
pub struct Packet {
    /// Reference-counted payload bytes.
    data: Arc<[u8]>,
    /// Presentation timestamp in the source stream's time base.
    pub pts: i64,
    /// Decode timestamp.
    pub dts: i64,
    /// Duration in the source stream's time base.
    pub duration: i64,
    /// Stream index this packet belongs to.
    pub stream_index: u32,
    /// Packet flags.
    pub flags: PacketFlags,
}

impl Packet {
    /// Create a new packet owning the given bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: data.into(),
            pts: NO_PTS,
            dts: NO_PTS,
            duration: 0,
            stream_index: 0,
            flags: PacketFlags::empty(),
        }
    }

    /// Create an empty packet.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Get the packet data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the size of the packet data.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if this packet carries no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if this is a keyframe packet.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(PacketFlags::KEYFRAME)
    }

    /// Check if the presentation timestamp is defined.
    pub fn has_pts(&self) -> bool {
        self.pts != NO_PTS
    }

    /// Builder: set timestamps.
    pub fn with_timestamps(mut self, pts: i64, dts: i64) -> Self {
        self.pts = pts;
        self.dts = dts;
        self
    }

    /// Builder: set duration.
    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = duration;
        self
    }

    /// Builder: set stream index.
    pub fn with_stream_index(mut self, index: u32) -> Self {
        self.stream_index = index;
        self
    }

    /// Builder: set flags.
    pub fn with_flags(mut self, flags: PacketFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("size", &self.size())
            .field("pts", &self.pts)
            .field("dts", &self.dts)
            .field("stream_index", &self.stream_index)
            .field("flags", &self.flags)
            .finish()
    }
}

impl Default for Packet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_creation() {
        let packet = Packet::new(vec![0u8; 100]);
        assert_eq!(packet.size(), 100);
        assert!(!packet.is_empty());
        assert!(!packet.has_pts());
    }

    #[test]
    fn test_packet_builders() {
        let packet = Packet::new(vec![1, 2, 3])
            .with_timestamps(42, 40)
            .with_duration(1)
            .with_stream_index(1)
            .with_flags(PacketFlags::KEYFRAME);
        assert_eq!(packet.pts, 42);
        assert_eq!(packet.dts, 40);
        assert_eq!(packet.stream_index, 1);
        assert!(packet.is_keyframe());
    }

    #[test]
    fn test_clone_shares_payload() {
        let packet = Packet::new(vec![7u8; 64]);
        let copy = packet.clone();
        // Same allocation behind both handles.
        assert!(std::ptr::eq(packet.data().as_ptr(), copy.data().as_ptr()));
    }
}
