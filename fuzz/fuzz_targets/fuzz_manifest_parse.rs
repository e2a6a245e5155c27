#![no_main]

use archivalos_core::environment::{EnvironmentManifest, EnvironmentSnapshot};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(manifest) = EnvironmentManifest::from_json_bytes(data) else {
        return;
    };
    let Ok(snapshot) = EnvironmentSnapshot::from_manifest("python", &manifest) else {
        return;
    };
    let block = snapshot.record_block();
    assert!(block.contains_key("os"));
    assert!(block.contains_key("arch"));
    assert!(block.contains_key("python"));
    assert!(!snapshot.platform_detail.is_empty());
});
