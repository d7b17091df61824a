//! Providers and constructors
//!
//! A [`Provider`] is what the container stores under a name. Types that can be
//! built by the container implement [`Constructor`], usually via
//! `#[derive(Inject)]`.

use crate::{Arguments, Injectable, Result, Signature, Value};
use std::sync::Arc;

/// The unit of registration: a getter invoked to produce a dependency.
///
/// The getter's own parameters are resolved from the container each time
/// it runs.
#[derive(Clone, Debug)]
pub struct Provider {
    get: Injectable,
}

impl Provider {
    #[inline]
    pub fn new(get: Injectable) -> Self {
        Self { get }
    }

    /// The getter.
    #[inline]
    pub fn get(&self) -> &Injectable {
        &self.get
    }
}

impl From<Injectable> for Provider {
    fn from(get: Injectable) -> Self {
        Self::new(get)
    }
}

/// Outcome of running a [`Constructor`].
///
/// A constructor normally yields its own instance. It may instead hand back
/// some other value, which then replaces the instance as the result.
pub enum Construction<T> {
    /// A freshly built instance of the constructor's type
    Instance(T),
    /// A value returned in place of the instance
    Replacement(Value),
}

impl<T: Send + Sync + 'static> Construction<T> {
    /// Erase into the value the container hands out.
    #[inline]
    pub fn into_value(self) -> Value {
        match self {
            Construction::Instance(instance) => Arc::new(instance),
            Construction::Replacement(value) => value,
        }
    }

    #[inline]
    pub fn is_instance(&self) -> bool {
        matches!(self, Construction::Instance(_))
    }
}

impl<T> std::fmt::Debug for Construction<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Construction::Instance(_) => f.write_str("Instance"),
            Construction::Replacement(_) => f.write_str("Replacement"),
        }
    }
}

/// A type the container can build by injecting its declared dependencies.
///
/// # Examples
///
/// ```rust
/// use named_injector::{Arguments, Construction, Constructor, Container, Result, Signature};
/// use std::sync::Arc;
///
/// struct Greeter {
///     greeting: Arc<String>,
/// }
///
/// impl Constructor for Greeter {
///     fn dependencies() -> Signature {
///         Signature::explicit(["greeting"])
///     }
///
///     fn construct(mut args: Arguments) -> Result<Construction<Self>> {
///         Ok(Construction::Instance(Greeter { greeting: args.take()? }))
///     }
/// }
///
/// let container = Container::new();
/// container.value("greeting", String::from("hi"));
///
/// let greeter = container.instantiate_as::<Greeter>(None).unwrap();
/// assert_eq!(*greeter.greeting, "hi");
/// ```
pub trait Constructor: Send + Sync + Sized + 'static {
    /// Names of the dependencies `construct` takes, in order.
    fn dependencies() -> Signature;

    /// Build from resolved dependencies.
    fn construct(arguments: Arguments) -> Result<Construction<Self>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    struct Widget(u8);

    #[test]
    fn test_instance_into_value() {
        let erased = Construction::Instance(Widget(3)).into_value();
        assert_eq!(erased.downcast_ref::<Widget>().map(|w| w.0), Some(3));
    }

    #[test]
    fn test_replacement_wins() {
        let replacement = value("other");
        let construction: Construction<Widget> = Construction::Replacement(Arc::clone(&replacement));
        assert!(!construction.is_instance());

        let erased = construction.into_value();
        assert!(Arc::ptr_eq(&erased, &replacement));
        assert!(erased.downcast_ref::<Widget>().is_none());
    }

    #[test]
    fn test_provider_from_injectable() {
        let provider = Provider::from(Injectable::constant(value(1u8)));
        assert!(provider.get().dependencies().is_empty());
    }
}
