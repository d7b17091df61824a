#![no_main]

//! Fuzz target for child containers
//!
//! Tests parent delegation, shadowing and dropped intermediate handles.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use named_injector::{Container, DiError};

const NAMES: [&str; 4] = ["app", "db", "request", "user"];

fn name(index: u8) -> &'static str {
    NAMES[index as usize % NAMES.len()]
}

/// Operations for scoped containers
#[derive(Debug, Arbitrary)]
enum ScopedOp {
    // Root operations
    RegisterInRoot { name: u8, value: u32 },
    ResolveFromRoot { name: u8 },

    // Scope creation
    CreateChild,
    CreateNestedChild,

    // Scoped operations
    RegisterInScope { name: u8, value: u32 },
    ResolveFromScope { name: u8 },
    HasInScope { name: u8 },

    // Cleanup
    DropScope,
    DropMiddleScope,
}

fuzz_target!(|ops: Vec<ScopedOp>| {
    let root = Container::new();
    let mut scopes: Vec<Container> = Vec::new();

    for op in ops.into_iter().take(100) { // Limit operations to prevent OOM
        match op {
            ScopedOp::RegisterInRoot { name: n, value } => {
                root.value(name(n), value);
            }
            ScopedOp::ResolveFromRoot { name: n } => {
                let _ = root.try_resolve(name(n));
            }
            ScopedOp::CreateChild => {
                if scopes.len() < 10 { // Limit depth
                    scopes.push(root.create_child());
                }
            }
            ScopedOp::CreateNestedChild => {
                if let Some(parent) = scopes.last() {
                    if scopes.len() < 10 {
                        let child = parent.create_child();
                        assert_eq!(child.depth(), parent.depth() + 1);
                        scopes.push(child);
                    }
                }
            }
            ScopedOp::RegisterInScope { name: n, value } => {
                if let Some(scope) = scopes.last() {
                    scope.value(name(n), value);
                    // Local registrations shadow every ancestor
                    assert_eq!(*scope.resolve_as::<u32>(name(n)).unwrap(), value);
                }
            }
            ScopedOp::ResolveFromScope { name: n } => {
                if let Some(scope) = scopes.last() {
                    match scope.resolve(name(n)) {
                        Ok(_) => assert!(scope.contains(name(n))),
                        Err(DiError::UnresolvedDependency { .. }) => {
                            assert!(!scope.contains(name(n)))
                        }
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
            }
            ScopedOp::HasInScope { name: n } => {
                if let Some(scope) = scopes.last() {
                    if scope.has(name(n)) {
                        assert!(scope.try_resolve(name(n)).is_some());
                    }
                }
            }
            ScopedOp::DropScope => {
                scopes.pop();
            }
            ScopedOp::DropMiddleScope => {
                if scopes.len() > 2 {
                    let leaf = &scopes[scopes.len() - 1];
                    let before: Vec<bool> = NAMES.iter().map(|n| leaf.contains(n)).collect();
                    scopes.remove(scopes.len() / 2);
                    // Children keep their ancestors alive
                    let leaf = &scopes[scopes.len() - 1];
                    for (n, was_visible) in NAMES.iter().zip(before) {
                        assert_eq!(leaf.contains(n), was_visible);
                    }
                }
            }
        }
    }

    // Root is unaffected by anything done in its children
    for n in NAMES {
        let _ = root.try_resolve(n);
    }
});
