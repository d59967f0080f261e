#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the license expression parser.
///
/// Anything that parses must render to an expression that parses again.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(license) = antenna::parse_license_expression(s) {
            let rendered = license.evaluate();
            let _ = antenna::parse_license_expression(&rendered);
            let _ = license.licenses();
        }
    }
});
