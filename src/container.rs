//! Name-keyed dependency injection container
//!
//! The `Container` maps dependency names to providers and resolves them by
//! invoking the provider's getter with its own dependencies supplied by name.
//! Nothing is cached: every resolution runs the getter again.

use crate::storage::ProviderStorage;
use crate::{
    Arguments, Constructor, DiError, Injectable, Locals, Provider, Result, Signature, Value,
};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Dependency injection container.
///
/// A `Container` is a cheap handle; clones share the same registrations.
/// Child containers created with [`create_child`](Container::create_child)
/// fall back to their parent for names they do not register themselves, and
/// shadow the parent for names they do. A child keeps its whole ancestor
/// chain alive.
///
/// # Examples
///
/// ```rust
/// use named_injector::{inject, Container};
///
/// let container = Container::new();
/// container
///     .value("url", String::from("postgres://localhost"))
///     .factory("pool", inject!(|url: String| format!("pool({url})")));
///
/// let pool = container.resolve_as::<String>("pool").unwrap();
/// assert_eq!(*pool, "pool(postgres://localhost)");
/// ```
#[derive(Clone)]
pub struct Container {
    /// Registration table (holds the parent table)
    storage: Arc<ProviderStorage>,
    /// Scope depth (0 = root)
    depth: u32,
}

impl Container {
    /// Create a new root container.
    ///
    /// Use [`with_parent`](Container::with_parent) or
    /// [`create_child`](Container::create_child) for a container with a parent.
    #[inline]
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "named_injector",
            depth = 0,
            "Creating new root DI container"
        );

        Self {
            storage: Arc::new(ProviderStorage::new()),
            depth: 0,
        }
    }

    /// Create a root container with pre-allocated capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Arc::new(ProviderStorage::with_capacity(capacity)),
            depth: 0,
        }
    }

    /// Create a child container whose parent is `self`.
    ///
    /// The child starts empty. Names it registers shadow the same names in
    /// any ancestor, for resolutions performed through the child.
    ///
    /// ```rust
    /// use named_injector::Container;
    ///
    /// let root = Container::new();
    /// root.value("env", "production");
    ///
    /// let request = root.create_child();
    /// assert!(request.contains("env"));
    /// assert!(!request.has("env"));
    /// ```
    #[inline]
    pub fn create_child(&self) -> Self {
        let child_depth = self.depth + 1;

        #[cfg(feature = "logging")]
        debug!(
            target: "named_injector",
            parent_depth = self.depth,
            child_depth = child_depth,
            parent_providers = self.storage.len(),
            "Creating child container"
        );

        Self {
            storage: Arc::new(self.storage.child()),
            depth: child_depth,
        }
    }

    /// Create a container whose parent is `parent`.
    ///
    /// Same as `parent.create_child()`.
    #[inline]
    pub fn with_parent(parent: &Container) -> Self {
        parent.create_child()
    }

    /// Alias for `create_child()`.
    #[inline]
    pub fn scope(&self) -> Self {
        self.create_child()
    }

    /// The parent container, if this is a child.
    pub fn parent(&self) -> Option<Container> {
        let storage = Arc::clone(self.storage.parent()?);
        Some(Self {
            storage,
            depth: self.depth.saturating_sub(1),
        })
    }

    // =========================================================================
    // Registration Methods
    // =========================================================================

    /// Register a provider under `name`.
    ///
    /// Re-registering a name replaces the previous provider.
    #[inline]
    pub fn provider(&self, name: impl Into<String>, provider: Provider) -> &Self {
        self.register(name.into(), provider, "provider")
    }

    /// Register a factory: the getter is invoked anew on every resolution.
    ///
    /// ```rust
    /// use named_injector::{inject, Container};
    /// use std::sync::atomic::{AtomicU32, Ordering};
    /// use std::sync::Arc;
    ///
    /// let calls = Arc::new(AtomicU32::new(0));
    /// let counter = Arc::clone(&calls);
    ///
    /// let container = Container::new();
    /// container.factory("tick", inject!(move || counter.fetch_add(1, Ordering::SeqCst)));
    ///
    /// container.resolve("tick").unwrap();
    /// container.resolve("tick").unwrap();
    /// assert_eq!(calls.load(Ordering::SeqCst), 2);
    /// ```
    #[inline]
    pub fn factory(&self, name: impl Into<String>, get: Injectable) -> &Self {
        self.register(name.into(), Provider::new(get), "factory")
    }

    /// Register a service: each resolution instantiates `T` through this
    /// container, resolving its dependencies afresh.
    ///
    /// The provider holds only a weak link to this container; resolving it
    /// after the container is gone fails with [`DiError::ContainerDropped`].
    pub fn service<T: Constructor>(&self, name: impl Into<String>) -> &Self {
        let owner = Arc::downgrade(&self.storage);
        let depth = self.depth;

        let get = Injectable::new(Signature::empty(), move |_, _| {
            let storage = owner.upgrade().ok_or(DiError::ContainerDropped)?;
            Container { storage, depth }.instantiate::<T>(None)
        });

        self.register(name.into(), Provider::new(get), "service")
    }

    /// Register a literal value, returned unchanged on every resolution.
    #[inline]
    pub fn value<T: Send + Sync + 'static>(&self, name: impl Into<String>, value: T) -> &Self {
        self.register_value(name, Arc::new(value))
    }

    /// Register an already-erased value.
    #[inline]
    pub fn register_value(&self, name: impl Into<String>, value: Value) -> &Self {
        self.register(name.into(), Provider::new(Injectable::constant(value)), "value")
    }

    fn register(&self, name: String, provider: Provider, kind: &'static str) -> &Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "named_injector",
            dependency = name.as_str(),
            kind = kind,
            depth = self.depth,
            dependencies = ?provider.get().dependencies(),
            "Registering dependency"
        );

        let replaced = self.storage.insert(name, provider);

        #[cfg(feature = "logging")]
        if replaced {
            trace!(
                target: "named_injector",
                kind = kind,
                depth = self.depth,
                "Replaced an existing registration"
            );
        }
        #[cfg(not(feature = "logging"))]
        let _ = (replaced, kind);

        self
    }

    // =========================================================================
    // Resolution Methods
    // =========================================================================

    /// Resolve a dependency by name.
    ///
    /// Looks in this container first, then walks the parent chain. The
    /// provider's getter runs against the container that registered it, so
    /// its own dependencies resolve from there. Every call invokes the getter
    /// again.
    ///
    /// A provider graph with a cycle recurses without bound; avoiding cycles
    /// is up to the caller.
    ///
    /// # Errors
    ///
    /// [`DiError::UnresolvedDependency`] if no container in the chain has
    /// `name`, or whatever the getter (or any nested resolution) fails with.
    pub fn resolve(&self, name: &str) -> Result<Value> {
        #[cfg(feature = "logging")]
        trace!(
            target: "named_injector",
            dependency = name,
            depth = self.depth,
            "Resolving dependency"
        );

        // Local registrations first (most common case)
        if let Some(provider) = self.storage.get(name) {
            return self.invoke(provider.get(), None, None);
        }

        if self.depth == 0 {
            #[cfg(feature = "logging")]
            debug!(
                target: "named_injector",
                dependency = name,
                "Dependency not found in root container"
            );
            return Err(DiError::unresolved(name));
        }

        self.resolve_from_parents(name)
    }

    /// Resolve from the parent chain (internal)
    #[cold]
    fn resolve_from_parents(&self, name: &str) -> Result<Value> {
        let Some(parent) = self.storage.parent() else {
            return Err(DiError::unresolved(name));
        };

        match parent.find_in_chain(name) {
            Some((storage, provider, hops)) => {
                let depth = self.depth.saturating_sub(1 + hops);

                #[cfg(feature = "logging")]
                trace!(
                    target: "named_injector",
                    dependency = name,
                    depth = self.depth,
                    ancestor_depth = depth,
                    "Dependency found in ancestor container"
                );

                Container { storage, depth }.invoke(provider.get(), None, None)
            }
            None => {
                #[cfg(feature = "logging")]
                debug!(
                    target: "named_injector",
                    dependency = name,
                    depth = self.depth,
                    "Dependency not found in container or parent chain"
                );

                Err(DiError::unresolved(name))
            }
        }
    }

    /// Resolve and downcast to `T`.
    pub fn resolve_as<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        self.resolve(name)?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(name))
    }

    /// Resolve, returning `None` on any failure.
    #[inline]
    pub fn try_resolve(&self, name: &str) -> Option<Value> {
        self.resolve(name).ok()
    }

    /// Invoke a callable with its dependencies supplied by name.
    ///
    /// Each dependency comes from `locals` when it has that exact name,
    /// otherwise from [`resolve`](Container::resolve). Arguments are passed in
    /// signature order; `context` is handed to the callable as its receiver.
    ///
    /// ```rust
    /// use named_injector::{Container, Injectable, value};
    ///
    /// let container = Container::new();
    /// container.value("foo", "A").value("bar", "B");
    ///
    /// let names = ["foo", "bar"];
    /// let concat = Injectable::annotated(&names, |mut args| {
    ///     let foo = args.take::<&str>()?;
    ///     let bar = args.take::<&str>()?;
    ///     Ok(value(format!("{foo}{bar}")))
    /// });
    ///
    /// let out = container.invoke(&concat, None, None).unwrap();
    /// assert_eq!(out.downcast_ref::<String>().unwrap(), "AB");
    /// assert_eq!(names.len(), 2);
    /// ```
    pub fn invoke(
        &self,
        injectable: &Injectable,
        context: Option<&Value>,
        locals: Option<&Locals>,
    ) -> Result<Value> {
        let names = injectable.dependencies();
        let mut arguments = Vec::with_capacity(names.len());

        for name in names {
            let value = match locals.and_then(|locals| locals.get(name)) {
                Some(local) => {
                    #[cfg(feature = "logging")]
                    trace!(
                        target: "named_injector",
                        dependency = name.as_str(),
                        "Dependency supplied by locals"
                    );
                    Arc::clone(local)
                }
                None => self.resolve(name)?,
            };
            arguments.push((name.clone(), value));
        }

        injectable.call(context, Arguments::new(arguments))
    }

    /// Build a `T` with its dependencies injected.
    ///
    /// Yields the new instance, or the replacement value if the constructor
    /// returned one instead.
    pub fn instantiate<T: Constructor>(&self, locals: Option<&Locals>) -> Result<Value> {
        #[cfg(feature = "logging")]
        trace!(
            target: "named_injector",
            constructor = std::any::type_name::<T>(),
            depth = self.depth,
            "Instantiating"
        );

        self.invoke(&Injectable::constructor::<T>(), None, locals)
    }

    /// Build a `T` and downcast the result.
    ///
    /// Fails with [`DiError::TypeMismatch`] if the constructor replaced its
    /// instance with a value of another type.
    pub fn instantiate_as<T: Constructor>(&self, locals: Option<&Locals>) -> Result<Arc<T>> {
        self.instantiate::<T>(locals)?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(std::any::type_name::<T>()))
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    /// Check if `name` is registered directly on this container.
    ///
    /// Ancestors are not consulted; see [`contains`](Container::contains).
    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.storage.contains(name)
    }

    /// Check if `name` is resolvable here or through the parent chain.
    pub fn contains(&self, name: &str) -> bool {
        self.storage.find_in_chain(name).is_some()
    }

    /// Get the number of names registered on this container (not parents).
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if this container has no registrations of its own.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Names registered on this container, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.storage.names()
    }

    /// Get the scope depth (0 = root).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("providers", &self.storage.len())
            .field("depth", &self.depth)
            .field("has_parent", &self.storage.has_parent())
            .finish()
    }
}
