#![no_main]
use audit_tools::model::ComplianceLevel;
use libfuzzer_sys::fuzz_target;

/// Normalization must accept any text and land on a canonical level.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let level = ComplianceLevel::normalize(s);
        assert!(ComplianceLevel::ALL.contains(&level));
        assert_eq!(ComplianceLevel::normalize(level.as_str()), level);
    }
});
