#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz coordinate and selector parsing.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(coordinate) = antenna::Coordinate::parse(s) {
            let _ = coordinate.to_purl();
        }
        let _ = antenna::model::CoordinateSelector::parse(s);
    }
});
