#![no_main]

use convdiff_core::ConvParams;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|line: &str| {
    if let Ok(params) = ConvParams::parse_header(line) {
        // A parsed header must survive a render/parse round trip.
        let rendered = params.to_string();
        assert_eq!(ConvParams::parse_header(&rendered), Ok(params));
    }
});
