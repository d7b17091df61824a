//! # Named Injector - Name-Keyed Dependency Injection for Rust
//!
//! A runtime container that maps string names to providers, and builds
//! callables and types by supplying their declared dependencies by name.
//!
//! ## Features
//!
//! - **Name-keyed** - Dependencies are registered and resolved by name
//! - **Signature extraction** - Parameter names come from the callable itself
//!   via [`inject!`], or are listed explicitly
//! - **Fresh on every resolve** - Providers run each time; nothing is cached
//! - **Hierarchical scopes** - Children shadow and fall back to their parent
//! - **Locals overlay** - Per-call overrides ahead of the container
//! - **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use named_injector::{inject, Container};
//!
//! let container = Container::new();
//!
//! container
//!     .value("host", String::from("localhost"))
//!     .value("port", 5432u16)
//!     .factory("url", inject!(|host: String, port: u16| format!("postgres://{host}:{port}")));
//!
//! let url = container.resolve_as::<String>("url").unwrap();
//! assert_eq!(*url, "postgres://localhost:5432");
//! ```
//!
//! ## Services
//!
//! Types implementing [`Constructor`] (usually through `#[derive(Inject)]`)
//! can be registered as services; each resolution builds a new instance.
//!
//! ```rust
//! # #[cfg(feature = "derive")]
//! # {
//! use named_injector::{Container, Inject};
//! use std::sync::Arc;
//!
//! #[derive(Inject)]
//! struct Repository {
//!     #[inject]
//!     url: Arc<String>,
//! }
//!
//! let container = Container::new();
//! container
//!     .value("url", String::from("postgres://localhost"))
//!     .service::<Repository>("repository");
//!
//! let repo = container.resolve_as::<Repository>("repository").unwrap();
//! assert_eq!(*repo.url, "postgres://localhost");
//! # }
//! ```
//!
//! ## Scoped Containers
//!
//! ```rust
//! use named_injector::Container;
//!
//! let root = Container::new();
//! root.value("app", "MyApp");
//!
//! // Per-request scope - falls back to root
//! let request = root.create_child();
//! request.value("request_id", "req-123");
//!
//! assert!(request.contains("app"));
//! assert!(!request.has("app"));
//! assert!(root.resolve("request_id").is_err());
//! ```

// Lets derive output name `::named_injector` from inside this crate
extern crate self as named_injector;

mod container;
mod error;
mod injectable;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod signature;
mod storage;

pub use container::*;
pub use error::*;
pub use injectable::*;
pub use provider::*;
pub use signature::*;

#[cfg(feature = "derive")]
pub use named_injector_derive::Inject;

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Arguments, Construction, Constructor, Container, DiError, Injectable, Locals, Provider,
        Result, Signature, Value, annotate, inject, value,
    };
    #[cfg(feature = "derive")]
    pub use crate::Inject;
    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_value_same_every_time() {
        let container = Container::new();
        container.value("config", vec![1, 2, 3]);

        let a = container.resolve_as::<Vec<i32>>("config").unwrap();
        let b = container.resolve_as::<Vec<i32>>("config").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, [1, 2, 3]);
    }

    #[test]
    fn test_registration_chains() {
        let container = Container::new();
        let returned = container.value("a", 1u8).factory("b", inject!(|| 2u8));
        assert!(std::ptr::eq(returned, &container));
    }

    #[test]
    fn test_nested_factories() {
        static BUILT: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        container
            .value("dsn", String::from("sqlite::memory:"))
            .factory(
                "pool",
                inject!(|dsn: String| {
                    BUILT.fetch_add(1, Ordering::SeqCst);
                    format!("pool<{dsn}>")
                }),
            )
            .factory("repo", inject!(|pool: String| format!("repo<{pool}>")));

        let repo = container.resolve_as::<String>("repo").unwrap();
        assert_eq!(*repo, "repo<pool<sqlite::memory:>>");

        container.resolve("repo").unwrap();
        assert_eq!(BUILT.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_override_in_scope() {
        let root = Container::new();
        root.value("database", "production");

        let test_scope = root.scope();
        test_scope.value("database", "test");

        assert_eq!(*root.resolve_as::<&str>("database").unwrap(), "production");
        assert_eq!(*test_scope.resolve_as::<&str>("database").unwrap(), "test");
    }

    #[test]
    fn test_not_found_error() {
        let container = Container::new();
        let result = container.resolve("database");
        assert!(matches!(result, Err(DiError::UnresolvedDependency { name }) if name == "database"));
    }

    #[cfg(feature = "derive")]
    mod derived {
        use super::*;

        #[derive(Debug, Inject)]
        struct Config {
            #[inject]
            name: Arc<String>,
            retries: u32,
        }

        #[derive(Inject)]
        struct Service {
            #[inject(name = "appConfig")]
            config: Arc<Config>,
            #[inject]
            clock: Value,
        }

        #[derive(Inject, Default)]
        struct Empty {
            hits: u64,
        }

        #[test]
        fn test_derive_dependencies() {
            assert_eq!(Config::dependencies().names(), ["name"]);
            assert_eq!(Service::dependencies().names(), ["appConfig", "clock"]);
            assert!(Empty::dependencies().is_empty());
        }

        #[test]
        fn test_derive_builds_graph() {
            let container = Container::new();
            container
                .value("name", String::from("app"))
                .value("clock", 12u64)
                .service::<Config>("appConfig")
                .service::<Service>("service");

            let service = container.resolve_as::<Service>("service").unwrap();
            assert_eq!(*service.config.name, "app");
            assert_eq!(service.config.retries, 0);
            assert_eq!(service.clock.downcast_ref::<u64>(), Some(&12));

            let again = container.resolve_as::<Service>("service").unwrap();
            assert!(!Arc::ptr_eq(&service.config, &again.config));
        }

        #[test]
        fn test_derive_no_dependencies() {
            let container = Container::new();
            let empty = container.instantiate_as::<Empty>(None).unwrap();
            assert_eq!(empty.hits, 0);
        }

        #[test]
        fn test_derive_type_mismatch() {
            let container = Container::new();
            container.value("name", 5u8);

            let err = container.instantiate_as::<Config>(None).unwrap_err();
            assert_eq!(err, DiError::type_mismatch::<String>("name"));
        }
    }
}
