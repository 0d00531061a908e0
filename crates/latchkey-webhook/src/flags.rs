//! Event trigger flags.
//!
//! The bridge models "which events should this webhook fire for" as nine
//! named boolean fields in the registration body, but signs and stores
//! them as a 9-bit mask. Bit *i* of the mask maps to trigger field *i*.

use serde::Serialize;
use std::fmt;
use std::ops::BitOr;

// ---------------------------------------------------------------------------
// EventFlags — 9-bit trigger mask
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventFlags(u16);

impl EventFlags {
    pub const STATE_CHANGED_OPEN: EventFlags = EventFlags(1 << 0);
    pub const STATE_CHANGED_LATCH: EventFlags = EventFlags(1 << 1);
    pub const STATE_CHANGED_NIGHT_LOCK: EventFlags = EventFlags(1 << 2);
    pub const STATE_CHANGED_UNKNOWN: EventFlags = EventFlags(1 << 3);
    pub const STATE_GOTO_OPEN: EventFlags = EventFlags(1 << 4);
    pub const STATE_GOTO_LATCH: EventFlags = EventFlags(1 << 5);
    pub const STATE_GOTO_NIGHT_LOCK: EventFlags = EventFlags(1 << 6);
    pub const BATTERY: EventFlags = EventFlags(1 << 7);
    pub const ONLINE_STATUS: EventFlags = EventFlags(1 << 8);

    /// All nine defined trigger bits.
    pub const ALL: EventFlags = EventFlags(0x1FF);

    /// Construct from a raw mask, discarding undefined high bits.
    pub fn from_bits(bits: u16) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, other: EventFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// The 4-byte big-endian form covered by the registration signature.
    pub fn to_signing_bytes(self) -> [u8; 4] {
        (self.0 as u32).to_be_bytes()
    }
}

impl BitOr for EventFlags {
    type Output = EventFlags;

    fn bitor(self, rhs: EventFlags) -> EventFlags {
        EventFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for EventFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#011b}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TriggerFields — the registration body's named booleans
// ---------------------------------------------------------------------------

/// Expansion of an [`EventFlags`] mask into the registration body's nine
/// trigger fields, in mask bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TriggerFields {
    pub trigger_state_changed_open: bool,
    pub trigger_state_changed_latch: bool,
    pub trigger_state_changed_night_lock: bool,
    pub trigger_state_changed_unknown: bool,
    pub trigger_state_goto_open: bool,
    pub trigger_state_goto_latch: bool,
    pub trigger_state_goto_night_lock: bool,
    pub trigger_battery: bool,
    pub trigger_online_status: bool,
}

impl From<EventFlags> for TriggerFields {
    fn from(flags: EventFlags) -> Self {
        Self {
            trigger_state_changed_open: flags.contains(EventFlags::STATE_CHANGED_OPEN),
            trigger_state_changed_latch: flags.contains(EventFlags::STATE_CHANGED_LATCH),
            trigger_state_changed_night_lock: flags
                .contains(EventFlags::STATE_CHANGED_NIGHT_LOCK),
            trigger_state_changed_unknown: flags.contains(EventFlags::STATE_CHANGED_UNKNOWN),
            trigger_state_goto_open: flags.contains(EventFlags::STATE_GOTO_OPEN),
            trigger_state_goto_latch: flags.contains(EventFlags::STATE_GOTO_LATCH),
            trigger_state_goto_night_lock: flags.contains(EventFlags::STATE_GOTO_NIGHT_LOCK),
            trigger_battery: flags.contains(EventFlags::BATTERY),
            trigger_online_status: flags.contains(EventFlags::ONLINE_STATUS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_nine_bits() {
        assert_eq!(EventFlags::ALL.bits(), 511);
    }

    #[test]
    fn test_from_bits_discards_undefined_bits() {
        assert_eq!(EventFlags::from_bits(0xFFFF).bits(), 511);
        assert_eq!(EventFlags::from_bits(512).bits(), 0);
    }

    #[test]
    fn test_all_flags_expand_to_all_true() {
        let fields = TriggerFields::from(EventFlags::from_bits(511));
        assert!(fields.trigger_state_changed_open);
        assert!(fields.trigger_state_changed_latch);
        assert!(fields.trigger_state_changed_night_lock);
        assert!(fields.trigger_state_changed_unknown);
        assert!(fields.trigger_state_goto_open);
        assert!(fields.trigger_state_goto_latch);
        assert!(fields.trigger_state_goto_night_lock);
        assert!(fields.trigger_battery);
        assert!(fields.trigger_online_status);
    }

    #[test]
    fn test_flag_one_expands_to_first_field_only() {
        let fields = TriggerFields::from(EventFlags::from_bits(1));
        assert!(fields.trigger_state_changed_open);
        assert!(!fields.trigger_state_changed_latch);
        assert!(!fields.trigger_state_changed_night_lock);
        assert!(!fields.trigger_state_changed_unknown);
        assert!(!fields.trigger_state_goto_open);
        assert!(!fields.trigger_state_goto_latch);
        assert!(!fields.trigger_state_goto_night_lock);
        assert!(!fields.trigger_battery);
        assert!(!fields.trigger_online_status);
    }

    #[test]
    fn test_bit_positions_map_in_order() {
        let battery = TriggerFields::from(EventFlags::BATTERY);
        assert!(battery.trigger_battery);
        assert!(!battery.trigger_online_status);

        let online = TriggerFields::from(EventFlags::ONLINE_STATUS);
        assert!(online.trigger_online_status);
        assert!(!online.trigger_battery);
    }

    #[test]
    fn test_signing_bytes_are_big_endian_u32() {
        assert_eq!(EventFlags::ALL.to_signing_bytes(), [0, 0, 1, 255]);
        assert_eq!(EventFlags::from_bits(1).to_signing_bytes(), [0, 0, 0, 1]);
    }

    #[test]
    fn test_serializes_as_booleans() {
        let json = serde_json::to_value(TriggerFields::from(EventFlags::from_bits(1))).unwrap();
        assert_eq!(json["trigger_state_changed_open"], serde_json::json!(true));
        assert_eq!(json["trigger_battery"], serde_json::json!(false));
    }

    #[test]
    fn test_bitor_composes_masks() {
        let flags = EventFlags::BATTERY | EventFlags::ONLINE_STATUS;
        assert_eq!(flags.bits(), 0b110000000);
        assert!(flags.contains(EventFlags::BATTERY));
        assert!(!flags.contains(EventFlags::STATE_CHANGED_OPEN));
    }
}
