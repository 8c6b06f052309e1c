#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (a, b) = data;
    let norm = bookdex::utils::normalize(a);
    assert_eq!(bookdex::utils::normalize(&norm), norm);

    let _ = bookdex::utils::transliterate(a);

    let sim = bookdex::utils::similarity(a, b);
    assert!((0.0..=1.0).contains(&sim));
});
