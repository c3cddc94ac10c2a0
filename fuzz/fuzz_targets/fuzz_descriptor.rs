// Run locally (from the repo root):
//   cargo +nightly fuzz run fuzz_descriptor -- -runs=1000
#![no_main]

use libfuzzer_sys::fuzz_target;
use veil_classfile::{parse_field_descriptor, parse_method_descriptor, remap_descriptor};

mod utils;

fuzz_target!(|data: &[u8]| {
    let Some(text) = utils::truncate_utf8(data) else {
        return;
    };

    // Oracle: a descriptor that parses can be remapped, and the result parses
    // to the same shape.
    if let Ok(method) = parse_method_descriptor(text) {
        let renamed = remap_descriptor(text, |name| Some(format!("z/{name}")))
            .expect("remapping a valid method descriptor failed");
        let again = parse_method_descriptor(&renamed).expect("remapped descriptor does not parse");
        assert_eq!(method.params.len(), again.params.len());
    }
    if parse_field_descriptor(text).is_ok() {
        let renamed = remap_descriptor(text, |_| None).expect("identity remap failed");
        assert_eq!(renamed, text);
    }
});
