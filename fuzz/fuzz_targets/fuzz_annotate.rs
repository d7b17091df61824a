#![no_main]

//! Fuzz target for signature extraction
//!
//! Arbitrary source text must never panic, and every extracted name must be
//! a trimmed, non-empty token.

use libfuzzer_sys::fuzz_target;
use named_injector::{Signature, annotate};

fuzz_target!(|source: &str| {
    let names = annotate(source);

    for name in &names {
        assert!(!name.is_empty());
        assert_eq!(name.trim(), name);
    }

    // Memoized parse agrees with the direct one
    let signature = Signature::source(source.to_owned());
    assert_eq!(signature.names(), names.as_slice());
    assert_eq!(signature.names(), names.as_slice());
});
