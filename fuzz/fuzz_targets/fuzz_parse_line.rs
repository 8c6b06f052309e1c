#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // A malformed catalog line may be skipped but must never panic
    let _ = bookdex::catalog::parser::parse_line(data, "fuzz");
});
