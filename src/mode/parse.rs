//! MODE string parsing.
//!
//! A mode string such as `+o-v` is split into sign-prefixed runs. Run `i`
//! applies to target user `i`; every flag character in a run applies to
//! that same user. Pairing is strict: a run without a sign, a sign without
//! flags, or a run count that differs from the target count rejects the
//! whole string.

use crate::error::ModeParseError;

use super::{MemberFlag, MemberModeChange, ModeRun, Sign};

/// Split a mode string into sign-prefixed runs.
pub fn parse_runs(modes: &str) -> Result<Vec<ModeRun>, ModeParseError> {
    let mut runs: Vec<ModeRun> = Vec::new();

    for c in modes.chars() {
        match c {
            '+' | '-' => {
                if let Some(prev) = runs.last() {
                    if prev.flags.is_empty() {
                        return Err(ModeParseError::EmptyModeRun {
                            sign: sign_char(prev.sign),
                        });
                    }
                }
                let sign = if c == '+' { Sign::Plus } else { Sign::Minus };
                runs.push(ModeRun {
                    sign,
                    flags: Vec::new(),
                });
            }
            _ => match runs.last_mut() {
                Some(run) => run.flags.push(c),
                None => return Err(ModeParseError::MissingModeModifier),
            },
        }
    }

    if let Some(last) = runs.last() {
        if last.flags.is_empty() {
            return Err(ModeParseError::EmptyModeRun {
                sign: sign_char(last.sign),
            });
        }
    }

    Ok(runs)
}

/// Pair runs with target users and expand them into member flag changes.
///
/// Flag characters the registry does not track (anything but `o` and `v`)
/// still count towards pairing but produce no change.
pub fn member_changes(
    modes: &str,
    targets: &[String],
) -> Result<Vec<MemberModeChange>, ModeParseError> {
    let runs = parse_runs(modes)?;

    if runs.len() != targets.len() {
        return Err(ModeParseError::TargetCountMismatch {
            runs: runs.len(),
            targets: targets.len(),
        });
    }

    let mut changes = Vec::new();
    for (run, target) in runs.iter().zip(targets) {
        let enabled = run.sign == Sign::Plus;
        for flag in run.flags.iter().copied().filter_map(MemberFlag::from_char) {
            changes.push(MemberModeChange {
                target: target.clone(),
                flag,
                enabled,
            });
        }
    }

    Ok(changes)
}

fn sign_char(sign: Sign) -> char {
    match sign {
        Sign::Plus => '+',
        Sign::Minus => '-',
    }
}
