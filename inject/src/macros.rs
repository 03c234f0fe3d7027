//! Public macros for declaring contracts and for ergonomic resolution.

/// Declares that a type can be exposed as one or more trait-object contracts.
///
/// Expands to an [`Implements`](crate::Implements) impl per contract.
///
/// ```
/// use fibre_inject::implements;
///
/// trait Reader: Send + Sync {}
/// trait Writer: Send + Sync {}
///
/// struct Buffer;
/// impl Reader for Buffer {}
/// impl Writer for Buffer {}
///
/// implements!(Buffer => dyn Reader, dyn Writer);
/// ```
#[macro_export]
macro_rules! implements {
  ($implementation:ty => $($contract:ty),+ $(,)?) => {
    $(
      impl $crate::Implements<$contract> for $implementation {
        fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$contract> {
          self
        }
      }
    )+
  };
}

/// Resolves a service from a container, panicking if it cannot be resolved.
///
/// This is the shorthand for code that treats a missing dependency as a
/// programming error. Use `Container::resolve` or `Container::try_resolve`
/// to handle the failure instead.
///
/// # Panics
///
/// Panics with the resolution error if the service cannot be resolved.
///
/// # Examples
///
/// ```
/// use fibre_inject::{resolve, Container};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct English;
/// impl Greeter for English { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// let container = Container::new();
/// container.register_instance::<String>(Arc::new("hello".to_string()));
/// container.register_instance::<dyn Greeter>(Arc::new(English));
///
/// let message = resolve!(container, String);
/// assert_eq!(*message, "hello");
///
/// let greeter = resolve!(container, trait Greeter);
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! resolve {
  // resolve!(container, trait MyTrait)
  ($container:expr, trait $trait_ident:ident) => {
    $container
      .resolve::<dyn $trait_ident>()
      .unwrap_or_else(|err| panic!("Failed to resolve required trait service: {}", err))
  };

  // resolve!(container, component MyComponent)
  ($container:expr, component $type:ty) => {
    $container
      .resolve_component::<$type>()
      .unwrap_or_else(|err| panic!("Failed to resolve required component: {}", err))
  };

  // resolve!(container, MyService)
  ($container:expr, $type:ty) => {
    $container
      .resolve::<$type>()
      .unwrap_or_else(|err| panic!("Failed to resolve required service: {}", err))
  };
}
