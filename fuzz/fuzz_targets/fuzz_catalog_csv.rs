#![no_main]
use audit_tools::catalog::{parse_answers, parse_catalog, SourceFormat};
use libfuzzer_sys::fuzz_target;

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz catalog and answer-sheet CSV import.
///
/// Also prefixes input with a known header so row handling is reached
/// rather than failing at column detection.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_catalog(s, SourceFormat::Csv);
        let _ = parse_answers(s, SourceFormat::Csv);

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!("Domaine;ID;Item;Contrôle;Niveau;Preuves\n{s}");
            let _ = parse_catalog(&wrapped, SourceFormat::Csv);
            let _ = parse_answers(&wrapped, SourceFormat::Csv);
        }
    }
});
