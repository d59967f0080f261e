#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz CSV import. Malformed cells must be skipped, never panic.
fuzz_target!(|data: &[u8]| {
    let mapper = antenna::CsvArtifactMapper::new().with_base_dir(std::env::temp_dir());
    let _ = mapper.read_from(data);
});
