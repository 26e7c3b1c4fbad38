#![no_main]
use audit_tools::store::migrate::{migrate, CURRENT_VERSION};
use audit_tools::store::StoreDocument;
use libfuzzer_sys::fuzz_target;

/// Any document that migrates must decode as a current store document.
fuzz_target!(|data: &[u8]| {
    let Ok(doc) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(migrated) = migrate(doc) {
        assert_eq!(migrated["version"], CURRENT_VERSION);
        let _ = serde_json::from_value::<StoreDocument>(migrated);
    }
});
