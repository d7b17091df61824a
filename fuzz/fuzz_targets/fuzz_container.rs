#![no_main]

//! Fuzz target for basic container operations
//!
//! Registers and resolves under a small pool of names so lookups,
//! overwrites, locals and nested factories all collide often.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use named_injector::{Container, Injectable, Locals, value};

const NAMES: [&str; 6] = ["alpha", "beta", "gamma", "delta", "$scope", "_private"];

fn name(index: u8) -> &'static str {
    NAMES[index as usize % NAMES.len()]
}

/// Operations to perform on the container
#[derive(Debug, Arbitrary)]
enum ContainerOp {
    RegisterValue { name: u8, value: u32 },
    RegisterText { name: u8, text: String },
    RegisterFactory { name: u8, deps: Vec<u8> },
    Resolve { name: u8 },
    Invoke { deps: Vec<u8>, local: Option<(u8, u32)> },
    Has { name: u8 },
    Names,
}

fuzz_target!(|ops: Vec<ContainerOp>| {
    let container = Container::new();

    for op in ops.into_iter().take(200) {
        match op {
            ContainerOp::RegisterValue { name: n, value: v } => {
                container.value(name(n), v);
                assert!(container.has(name(n)));
            }
            ContainerOp::RegisterText { name: n, text } => {
                container.value(name(n), text.clone());
                let resolved = container.resolve_as::<String>(name(n)).unwrap();
                assert_eq!(*resolved, text);
            }
            ContainerOp::RegisterFactory { name: n, deps } => {
                // Factories only depend on names that sort before their own,
                // so the graph stays acyclic
                let own = n as usize % NAMES.len();
                let deps: Vec<&str> = deps
                    .into_iter()
                    .take(4)
                    .map(|d| d as usize % NAMES.len())
                    .filter(|&d| d < own)
                    .map(|d| NAMES[d])
                    .collect();
                container.factory(
                    name(n),
                    Injectable::annotated(deps, |arguments| Ok(value(arguments.len()))),
                );
            }
            ContainerOp::Resolve { name: n } => {
                let result = container.resolve(name(n));
                if !container.has(name(n)) {
                    assert!(result.unwrap_err().is_unresolved());
                }
            }
            ContainerOp::Invoke { deps, local } => {
                let deps: Vec<&str> = deps.into_iter().take(8).map(name).collect();
                let expected = deps.len();
                let locals = local.map(|(n, v)| Locals::new().with(name(n), v));
                let get = Injectable::annotated(deps, |arguments| Ok(value(arguments.len())));

                if let Ok(out) = container.invoke(&get, None, locals.as_ref()) {
                    assert_eq!(out.downcast_ref::<usize>(), Some(&expected));
                }
            }
            ContainerOp::Has { name: n } => {
                let _ = container.has(name(n));
            }
            ContainerOp::Names => {
                let names = container.names();
                assert_eq!(names.len(), container.len());
            }
        }
    }

    assert!(container.len() <= NAMES.len());
});
