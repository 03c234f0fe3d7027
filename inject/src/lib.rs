//! # Fibre Inject
//!
//! A thread-safe dependency injection container for Rust.
//!
//! Fibre Inject maps contract types (usually trait objects) to the way they
//! are produced, builds object graphs through constructor and member
//! injection, and caches singletons per container.
//!
//! ## Core Concepts
//!
//! - **Container**: holds one rule per contract and the singletons it built.
//!   There is no global container; create as many as you need.
//! - **Rules**: a contract resolves to a registered instance, a custom
//!   resolver function, or a component type to construct. Resolver and
//!   component rules are singletons unless marked transient through the
//!   [`ResolutionOptions`] handle returned at registration.
//! - **Components**: types implementing [`Component`] describe their
//!   constructors in declaration order; the first one whose parameters all
//!   resolve is used. Unregistered components are constructed by convention.
//! - **Injection**: types implementing [`Injectable`] list members the
//!   container fills, either right after construction or on demand through
//!   [`Container::inject_dependencies_into`].
//! - **Inheritance**: [`Container::create_inherited_container`] snapshots the
//!   rules into an independent child with its own singleton cache.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_inject::{implements, Component, Constructor, Constructors, Container, Injectable};
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {
//!   fn now(&self) -> u64;
//! }
//!
//! struct FixedClock;
//! impl Clock for FixedClock {
//!   fn now(&self) -> u64 {
//!     42
//!   }
//! }
//! impl Injectable for FixedClock {}
//! impl Component for FixedClock {
//!   fn constructors(constructors: &mut Constructors<Self>) {
//!     constructors.add(Constructor::new("new", |_| Ok(FixedClock)));
//!   }
//! }
//! implements!(FixedClock => dyn Clock);
//!
//! struct Scheduler {
//!   clock: Arc<dyn Clock>,
//! }
//! impl Injectable for Scheduler {}
//! impl Component for Scheduler {
//!   fn constructors(constructors: &mut Constructors<Self>) {
//!     constructors.add(
//!       Constructor::new("new", |args| Ok(Scheduler { clock: args.take()? }))
//!         .param::<dyn Clock>("clock"),
//!     );
//!   }
//! }
//!
//! let container = Container::new();
//! container.register::<dyn Clock, FixedClock>();
//!
//! // `Scheduler` is not registered; it is constructed by convention.
//! let scheduler = container.resolve_component::<Scheduler>().unwrap();
//! assert_eq!(scheduler.clock.now(), 42);
//!
//! // Singleton by default.
//! let a = container.resolve::<dyn Clock>().unwrap();
//! let b = container.resolve::<dyn Clock>().unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//! ```

mod component;
mod config;
mod container;
mod core;
mod error;
mod injector;
mod macros;
mod registration;
mod resolver;

pub use crate::core::{Instance, TypeKey};
pub use component::{
  Arguments, Component, Constructor, Constructors, ContractType, Contracts, Dispose,
  Implementation, Implements, Injectable, InjectionPoints,
};
pub use config::ContainerConfig;
pub use container::Container;
pub use error::{Error, Result};
pub use registration::ResolutionOptions;
pub use resolver::Request;
