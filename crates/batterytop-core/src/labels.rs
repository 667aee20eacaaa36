//! Human-readable labels for battery status, health and plug codes
//!
//! The tables follow the integer codes battery telemetry is delivered with.
//! Any code missing from a table is rendered as the raw number in angle
//! brackets, so [`describe`] is total.

use core::fmt;

/// A fixed code-to-label mapping
pub type LabelTable = &'static [(i64, &'static str)];

pub const STATUS: LabelTable = &[
    (STATUS_UNKNOWN, "unknown"),
    (STATUS_CHARGING, "charging"),
    (STATUS_DISCHARGING, "discharging"),
    (STATUS_NOT_CHARGING, "not charging"),
    (STATUS_FULL, "full"),
];

pub const HEALTH: LabelTable = &[
    (HEALTH_UNKNOWN, "unknown"),
    (HEALTH_GOOD, "good"),
    (HEALTH_OVERHEAT, "overheat"),
    (HEALTH_DEAD, "dead"),
    (HEALTH_OVER_VOLTAGE, "over voltage"),
    (HEALTH_UNSPECIFIED_FAILURE, "unspecified failure"),
    (HEALTH_COLD, "cold"),
];

pub const PLUGGED: LabelTable = &[
    (PLUGGED_NONE as i64, "unplugged"),
    (PLUGGED_AC as i64, "ac"),
    (PLUGGED_USB as i64, "usb"),
    (PLUGGED_WIRELESS as i64, "wireless"),
    (PLUGGED_DOCK as i64, "dock"),
];

// Codes referenced by the host adapters when translating textual states.
pub const STATUS_UNKNOWN: i64 = 1;
pub const STATUS_CHARGING: i64 = 2;
pub const STATUS_DISCHARGING: i64 = 3;
pub const STATUS_NOT_CHARGING: i64 = 4;
pub const STATUS_FULL: i64 = 5;

pub const HEALTH_UNKNOWN: i64 = 1;
pub const HEALTH_GOOD: i64 = 2;
pub const HEALTH_OVERHEAT: i64 = 3;
pub const HEALTH_DEAD: i64 = 4;
pub const HEALTH_OVER_VOLTAGE: i64 = 5;
pub const HEALTH_UNSPECIFIED_FAILURE: i64 = 6;
pub const HEALTH_COLD: i64 = 7;

pub const PLUGGED_NONE: i32 = 0;
pub const PLUGGED_AC: i32 = 1;
pub const PLUGGED_USB: i32 = 2;
pub const PLUGGED_WIRELESS: i32 = 4;
pub const PLUGGED_DOCK: i32 = 8;

/// Result of a table lookup, rendered through [`fmt::Display`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Known(&'static str),
    Unknown(i64),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(label) => f.write_str(label),
            Self::Unknown(code) => write!(f, "<{}>", code),
        }
    }
}

/// Look up `code` in `table`, falling back to the raw code
pub fn describe(code: i64, table: LabelTable) -> Label {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|&(_, label)| Label::Known(label))
        .unwrap_or(Label::Unknown(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_known_codes() {
        assert_eq!(describe(STATUS_DISCHARGING, STATUS).to_string(), "discharging");
        assert_eq!(describe(HEALTH_OVERHEAT, HEALTH).to_string(), "overheat");
        assert_eq!(describe(PLUGGED_USB as i64, PLUGGED).to_string(), "usb");
        assert_eq!(describe(0, PLUGGED).to_string(), "unplugged");
        assert_eq!(describe(PLUGGED_DOCK as i64, PLUGGED).to_string(), "dock");
    }

    #[test]
    fn test_unknown_code_fallback_is_stable() {
        let first = describe(999, STATUS).to_string();
        let second = describe(999, STATUS).to_string();
        assert_eq!(first, "<999>");
        assert_eq!(first, second);

        assert_eq!(describe(0, STATUS), Label::Unknown(0));
        assert_eq!(describe(-3, PLUGGED).to_string(), "<-3>");
    }

    #[test]
    fn test_tables_have_unique_codes() {
        for table in [STATUS, HEALTH, PLUGGED] {
            for (i, (code, _)) in table.iter().enumerate() {
                assert!(
                    table[i + 1..].iter().all(|(other, _)| other != code),
                    "duplicate code {}",
                    code
                );
            }
        }
    }
}
