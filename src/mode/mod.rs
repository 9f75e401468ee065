//! Channel member mode changes.

mod parse;

pub use self::parse::{member_changes, parse_runs};

/// Direction of a mode run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    /// `+`: the flag is set.
    Plus,
    /// `-`: the flag is cleared.
    Minus,
}

/// One sign-prefixed run of flag characters, e.g. `+ov`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeRun {
    /// Whether the run adds or removes flags.
    pub sign: Sign,
    /// Flag characters in order of appearance.
    pub flags: Vec<char>,
}

/// Member flags tracked by the channel registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberFlag {
    /// Channel operator (`o`).
    Op,
    /// Voiced (`v`).
    Voice,
}

impl MemberFlag {
    /// Map a mode character to a tracked flag.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'o' => Some(MemberFlag::Op),
            'v' => Some(MemberFlag::Voice),
            _ => None,
        }
    }
}

/// A single flag change applied to one member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberModeChange {
    /// Nick the change applies to.
    pub target: String,
    /// Flag being changed.
    pub flag: MemberFlag,
    /// New value of the flag.
    pub enabled: bool,
}
