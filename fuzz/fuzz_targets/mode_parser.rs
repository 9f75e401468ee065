//! Fuzz target for MODE string pairing

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_bot::mode::member_changes;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut parts = input.split(' ');
        let modes = parts.next().unwrap_or_default();
        let targets: Vec<String> = parts.map(str::to_string).collect();
        if let Ok(changes) = member_changes(modes, &targets) {
            assert!(changes.iter().all(|c| targets.contains(&c.target)));
        }
    }
});
