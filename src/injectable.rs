//! Injectable callables
//!
//! An [`Injectable`] pairs a [`Signature`] (the names of the dependencies it
//! wants) with a type-erased getter that receives those dependencies
//! positionally as [`Arguments`].

use crate::{Constructor, Construction, DiError, Result, Signature};
use ahash::RandomState;
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// A resolved dependency.
///
/// The container never looks inside; callers downcast to what they expect.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Wrap any shareable value as a [`Value`].
#[inline]
pub fn value<T: Send + Sync + 'static>(inner: T) -> Value {
    Arc::new(inner)
}

// =============================================================================
// Arguments
// =============================================================================

/// Positional arguments handed to a getter, in signature order.
///
/// Each argument remembers the dependency name it was resolved for, so a
/// failed downcast reports which dependency had the wrong type.
pub struct Arguments {
    entries: std::vec::IntoIter<(String, Value)>,
    position: usize,
}

impl Arguments {
    /// Build an argument list from `(name, value)` pairs.
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        Self {
            entries: entries.into_iter(),
            position: 0,
        }
    }

    /// An empty argument list.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Take the next argument as a raw [`Value`].
    pub fn take_value(&mut self) -> Result<Value> {
        self.take_entry().map(|(_, value)| value)
    }

    /// Take the next argument, downcast to `T`.
    pub fn take<T: Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        let (name, value) = self.take_entry()?;
        value
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(name))
    }

    fn take_entry(&mut self) -> Result<(String, Value)> {
        let position = self.position;
        let entry = self
            .entries
            .next()
            .ok_or(DiError::MissingArgument { position })?;
        self.position += 1;
        Ok(entry)
    }

    /// Names of the arguments not yet taken.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.as_slice().iter().map(|(name, _)| name.as_str())
    }

    /// Number of arguments not yet taken.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether every argument has been taken.
    pub fn is_empty(&self) -> bool {
        self.entries.as_slice().is_empty()
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arguments")
            .field("position", &self.position)
            .field("remaining", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Locals
// =============================================================================

/// Per-call overrides consulted before the container.
///
/// # Examples
///
/// ```rust
/// use named_injector::{inject, Container, Locals};
///
/// let container = Container::new();
/// container.value("greeting", String::from("hello"));
///
/// let greet = inject!(|greeting: String, name: String| format!("{greeting}, {name}"));
/// let locals = Locals::new().with("name", String::from("world"));
///
/// let out = container.invoke(&greet, None, Some(&locals)).unwrap();
/// assert_eq!(out.downcast_ref::<String>().unwrap(), "hello, world");
/// ```
#[derive(Clone, Default)]
pub struct Locals {
    values: HashMap<String, Value, RandomState>,
}

impl Locals {
    /// Create an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style.
    pub fn with<T: Send + Sync + 'static>(mut self, name: impl Into<String>, inner: T) -> Self {
        self.values.insert(name.into(), value(inner));
        self
    }

    /// Add an already-erased value, builder style.
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Insert an already-erased value, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for Locals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

// =============================================================================
// Injectable
// =============================================================================

/// Type-erased getter: optional receiver plus positional arguments.
type Getter = dyn Fn(Option<&Value>, Arguments) -> Result<Value> + Send + Sync;

/// A callable whose parameters are supplied by name.
///
/// Cloning is cheap; the getter is shared.
#[derive(Clone)]
pub struct Injectable {
    signature: Signature,
    getter: Arc<Getter>,
}

impl Injectable {
    /// Create from a signature and a getter that may use a receiver.
    pub fn new<F>(signature: Signature, getter: F) -> Self
    where
        F: Fn(Option<&Value>, Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            signature,
            getter: Arc::new(getter),
        }
    }

    /// Create from source text; dependency names are extracted from it.
    ///
    /// ```rust
    /// use named_injector::{value, Injectable};
    ///
    /// let sum = Injectable::from_source("|a, b| a + b", |mut args| {
    ///     let a = args.take::<u32>()?;
    ///     let b = args.take::<u32>()?;
    ///     Ok(value(*a + *b))
    /// });
    /// assert_eq!(sum.dependencies(), ["a", "b"]);
    /// ```
    pub fn from_source<F>(source: impl Into<Cow<'static, str>>, getter: F) -> Self
    where
        F: Fn(Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(Signature::source(source), move |_, arguments| getter(arguments))
    }

    /// Create with dependency names given explicitly.
    ///
    /// The names are copied out of `names`; a borrowed slice is left as it was.
    pub fn annotated<I, S, F>(names: I, getter: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(Signature::explicit(names), move |_, arguments| getter(arguments))
    }

    /// Create a method-form callable that needs a receiver of type `R`.
    ///
    /// Invoking it without a context holding an `R` fails with
    /// [`DiError::MissingReceiver`].
    pub fn method<R, F>(source: impl Into<Cow<'static, str>>, getter: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&R, Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(Signature::source(source), move |context, arguments| {
            let receiver = context
                .and_then(|context| context.downcast_ref::<R>())
                .ok_or_else(DiError::missing_receiver::<R>)?;
            getter(receiver, arguments)
        })
    }

    /// A zero-dependency callable that always returns `value`.
    pub fn constant(value: Value) -> Self {
        Self::new(Signature::empty(), move |_, _| Ok(Arc::clone(&value)))
    }

    /// A callable that builds `T` through its [`Constructor`] impl.
    pub fn constructor<T: Constructor>() -> Self {
        Self::new(T::dependencies(), |_, arguments| {
            T::construct(arguments).map(Construction::into_value)
        })
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The ordered dependency names.
    #[inline]
    pub fn dependencies(&self) -> &[String] {
        self.signature.names()
    }

    /// Run the getter with already-resolved arguments.
    #[inline]
    pub fn call(&self, context: Option<&Value>, arguments: Arguments) -> Result<Value> {
        (self.getter)(context, arguments)
    }
}

impl std::fmt::Debug for Injectable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injectable")
            .field("dependencies", &self.dependencies())
            .finish()
    }
}

/// Build an [`Injectable`] from a closure, taking dependency names from its
/// parameters.
///
/// Untyped parameters receive the raw [`Value`]; a parameter written
/// `name: T` receives `Arc<T>` (a failed downcast is
/// [`DiError::TypeMismatch`]). The body's result is wrapped with
/// [`value`]. Use [`Injectable::from_source`] to return an existing `Value`
/// unchanged.
///
/// ```rust
/// use named_injector::{inject, Container};
///
/// let container = Container::new();
/// container.value("host", String::from("localhost")).value("port", 8080u16);
///
/// let address = inject!(|host: String, port: u16| format!("{host}:{port}"));
/// let out = container.invoke(&address, None, None).unwrap();
/// assert_eq!(out.downcast_ref::<String>().unwrap(), "localhost:8080");
/// ```
#[macro_export]
macro_rules! inject {
    (@take $arguments:ident, $ty:ty) => {
        $arguments.take::<$ty>()?
    };
    (@take $arguments:ident) => {
        $arguments.take_value()?
    };
    (move || $body:expr) => {
        $crate::Injectable::from_source(
            ::core::stringify!(move || $body),
            move |_arguments: $crate::Arguments| ::core::result::Result::Ok($crate::value($body)),
        )
    };
    (|| $body:expr) => {
        $crate::Injectable::from_source(
            ::core::stringify!(|| $body),
            |_arguments: $crate::Arguments| ::core::result::Result::Ok($crate::value($body)),
        )
    };
    (move |$($name:ident $(: $ty:ty)?),+ $(,)?| $body:expr) => {
        $crate::Injectable::from_source(
            ::core::stringify!(move |$($name $(: $ty)?),+| $body),
            move |mut arguments: $crate::Arguments| {
                $(let $name = $crate::inject!(@take arguments $(, $ty)?);)+
                ::core::result::Result::Ok($crate::value($body))
            },
        )
    };
    (|$($name:ident $(: $ty:ty)?),+ $(,)?| $body:expr) => {
        $crate::Injectable::from_source(
            ::core::stringify!(|$($name $(: $ty)?),+| $body),
            |mut arguments: $crate::Arguments| {
                $(let $name = $crate::inject!(@take arguments $(, $ty)?);)+
                ::core::result::Result::Ok($crate::value($body))
            },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, Value)]) -> Arguments {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), Arc::clone(value)))
            .collect()
    }

    #[test]
    fn test_arguments_take_in_order() {
        let mut arguments = args(&[("a", value(1u8)), ("b", value("two"))]);
        assert_eq!(arguments.len(), 2);
        assert_eq!(*arguments.take::<u8>().unwrap(), 1);
        assert_eq!(arguments.names().collect::<Vec<_>>(), ["b"]);
        assert_eq!(*arguments.take::<&str>().unwrap(), "two");
        assert!(arguments.is_empty());
    }

    #[test]
    fn test_arguments_errors() {
        let mut arguments = args(&[("port", value("8080"))]);
        assert_eq!(
            arguments.take::<u16>().unwrap_err(),
            DiError::type_mismatch::<u16>("port")
        );
        assert_eq!(
            arguments.take_value().unwrap_err(),
            DiError::MissingArgument { position: 1 }
        );
    }

    #[test]
    fn test_macro_names() {
        assert!(inject!(|| 1).dependencies().is_empty());
        assert!(inject!(move || 1).dependencies().is_empty());
        assert_eq!(inject!(|a, b: u32| (a, b)).dependencies(), ["a", "b"]);
        assert_eq!(inject!(move |config: String,| config).dependencies(), ["config"]);
    }

    #[test]
    fn test_macro_call() {
        let add = inject!(|a: u32, b: u32| *a + *b);
        let out = add
            .call(None, args(&[("a", value(2u32)), ("b", value(3u32))]))
            .unwrap();
        assert_eq!(*out.downcast::<u32>().unwrap(), 5);
    }

    #[test]
    fn test_method_requires_receiver() {
        struct Counter {
            base: u32,
        }

        let bump = Injectable::method::<Counter, _>("fn bump(&self, step)", |counter, mut args| {
            let step = args.take::<u32>()?;
            Ok(value(counter.base + *step))
        });
        assert_eq!(bump.dependencies(), ["step"]);

        let receiver = value(Counter { base: 10 });
        let out = bump
            .call(Some(&receiver), args(&[("step", value(5u32))]))
            .unwrap();
        assert_eq!(*out.downcast::<u32>().unwrap(), 15);

        let err = bump.call(None, args(&[("step", value(5u32))])).unwrap_err();
        assert!(matches!(err, DiError::MissingReceiver { .. }));
    }

    #[test]
    fn test_constant() {
        let shared = value(String::from("fixed"));
        let constant = Injectable::constant(Arc::clone(&shared));
        let out = constant.call(None, Arguments::empty()).unwrap();
        assert!(Arc::ptr_eq(&out, &shared));
    }

    #[test]
    fn test_locals() {
        let locals = Locals::new().with("a", 1u8).with_value("b", value(2u8));
        assert!(locals.contains("a"));
        assert!(!locals.contains("c"));
        assert_eq!(locals.len(), 2);
        assert_eq!(locals.get("b").unwrap().downcast_ref::<u8>(), Some(&2));
    }
}
