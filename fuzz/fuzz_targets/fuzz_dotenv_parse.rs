#![no_main]

use envinject::{FileParser, FromEnvValue};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // === Parsing arbitrary bytes never panics and always yields a map ===
    let outcome = FileParser::new().parse_bytes(data);
    let (variables, errors) = outcome.into_parts();
    let variables = variables.expect("in-memory input always produces a map");

    // === Every line is either stored or reported ===
    let text = String::from_utf8_lossy(data);
    assert!(variables.count() + errors.count() <= text.lines().count());

    // === Line helpers agree with the parser ===
    for line in text.lines() {
        if FileParser::is_line_valid(line) {
            let (name, _) = FileParser::split_assignment(FileParser::sanitize_line(line));
            assert!(variables.contains(name));
        }
    }

    // === Error rendering never panics ===
    for flagged in &errors {
        let _ = flagged.to_string();
        let _ = flagged.metadata();
    }

    // === Coercion of stored values never panics ===
    for (_, value) in variables.iter() {
        let _ = bool::from_env_value(value);
        let _ = i64::from_env_value(value);
        let _ = u16::from_env_value(value);
        let _ = f32::from_env_value(value);
    }
});
