#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // The decoder must be total: any input yields a typed frame or a
        // typed error, never a panic.
        let _ = banter_proto::ServerFrame::decode(text);
    }
});
