#![no_main]

use convdiff_core::HarnessSettings;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw: &str| {
    let settings = HarnessSettings::parse(raw);
    // Typed accessors must stay total no matter what the file held.
    let _ = settings.regenerate_input();
    let _ = settings.num_tests();
    let _ = settings.epsilon();
    let _ = settings.cpp_file();
    let _ = settings.exe_name();
    let _ = settings.mars_jar();
    let _ = settings.asm_file();
});
