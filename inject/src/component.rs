//! Describing types to the container.
//!
//! Rust has no runtime reflection, so a type opts in by describing itself:
//!
//! - [`Injectable`] lists the members the container fills after construction
//!   (the "injectable" marker). Any object can be injectable, whether or not
//!   the container builds it.
//! - [`Component`] additionally lists the type's constructors, in declaration
//!   order, and the contracts it can be exposed as.
//! - [`Implements`] is the compile-time proof that `Arc<Self>` can be viewed
//!   as `Arc<C>`; the [`implements!`](crate::implements) macro writes it for
//!   trait-object contracts.

use crate::container::Container;
use crate::core::{Instance, TypeKey};
use crate::error::{Error, Result};
use crate::resolver::{construct_component, probe_component};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Converts the shared concrete value produced by a component into an
/// instance of one specific contract.
pub(crate) type Caster = fn(Arc<dyn Any + Send + Sync>) -> Option<Instance>;

/// Releases a singleton the container built.
pub(crate) type Disposer = Box<dyn FnOnce() + Send>;

/// A freshly built component value, before it is cast to a contract.
pub(crate) struct Built {
  pub(crate) value: Arc<dyn Any + Send + Sync>,
  pub(crate) disposer: Option<Disposer>,
}

/// Proof that `Arc<Self>` can be exposed as `Arc<C>`.
///
/// Every type implements it for itself. For trait-object contracts use
/// [`implements!`](crate::implements):
///
/// ```
/// use fibre_inject::{implements, Implements};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {}
/// struct SystemClock;
/// impl Clock for SystemClock {}
/// implements!(SystemClock => dyn Clock);
///
/// let clock: Arc<dyn Clock> = Implements::<dyn Clock>::upcast(Arc::new(SystemClock));
/// # let _ = clock;
/// ```
pub trait Implements<C: ?Sized> {
  fn upcast(self: Arc<Self>) -> Arc<C>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
  fn upcast(self: Arc<Self>) -> Arc<T> {
    self
  }
}

/// Explicit resource release for singletons built by a container.
///
/// A container calls `dispose` exactly once for each singleton it built whose
/// [`Component::as_dispose`] returns `Some`, when the container is disposed.
pub trait Dispose {
  fn dispose(&self);
}

/// A type whose members the container can populate.
///
/// The default lists no members.
pub trait Injectable: Sized + Send + Sync + 'static {
  fn injection_points(_points: &mut InjectionPoints<Self>) {}
}

/// A concrete type the container knows how to construct.
pub trait Component: Injectable {
  /// The type's constructors, in declaration order. The first one whose
  /// parameters all resolve is used.
  fn constructors(constructors: &mut Constructors<Self>);

  /// Contracts, besides `Self`, that the component may be registered under at runtime.
  fn contracts(_contracts: &mut Contracts<Self>) {}

  fn as_dispose(&self) -> Option<&dyn Dispose> {
    None
  }
}

/// A contract type as a runtime value.
///
/// `ContractType::of` describes any type, including trait objects, and can
/// only be satisfied by a registration. `ContractType::component` also carries
/// the component's recipe, so an unregistered component can still be
/// constructed by convention.
#[derive(Clone, Copy)]
pub struct ContractType {
  key: TypeKey,
  component: Option<Implementation>,
}

impl ContractType {
  pub fn of<C: ?Sized + Send + Sync + 'static>() -> Self {
    Self {
      key: TypeKey::of::<C>(),
      component: None,
    }
  }

  pub fn component<T: Component>() -> Self {
    Self {
      key: TypeKey::of::<T>(),
      component: Some(Implementation::of::<T>()),
    }
  }

  pub fn key(&self) -> TypeKey {
    self.key
  }

  pub fn name(&self) -> &'static str {
    self.key.name()
  }

  /// Whether the contract carries a recipe for construction by convention.
  pub fn is_constructible(&self) -> bool {
    self.component.is_some()
  }

  pub(crate) fn recipe(&self) -> Option<Implementation> {
    self.component
  }
}

impl fmt::Debug for ContractType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ContractType")
      .field("key", &self.key)
      .field("constructible", &self.is_constructible())
      .finish()
  }
}

/// A component type as a runtime value, used by [`Container::register_type`].
#[derive(Clone, Copy)]
pub struct Implementation {
  key: TypeKey,
  construct: fn(&Container) -> Result<Built>,
  probe: fn(&Container, &mut Vec<TypeKey>) -> Result<()>,
  cast_to: fn(TypeKey) -> Option<Caster>,
}

impl Implementation {
  pub fn of<T: Component>() -> Self {
    Self {
      key: TypeKey::of::<T>(),
      construct: construct_component::<T>,
      probe: probe_component::<T>,
      cast_to: caster_for::<T>,
    }
  }

  pub fn key(&self) -> TypeKey {
    self.key
  }

  pub fn name(&self) -> &'static str {
    self.key.name()
  }

  /// Whether this implementation may be registered under `contract`.
  pub fn is_assignable_to(&self, contract: &ContractType) -> bool {
    (self.cast_to)(contract.key()).is_some()
  }

  pub(crate) fn caster(&self, contract: TypeKey) -> Option<Caster> {
    (self.cast_to)(contract)
  }

  pub(crate) fn construct(&self, container: &Container) -> Result<Built> {
    (self.construct)(container)
  }

  pub(crate) fn probe(&self, container: &Container, visiting: &mut Vec<TypeKey>) -> Result<()> {
    (self.probe)(container, visiting)
  }
}

impl fmt::Debug for Implementation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Implementation({})", self.key.name())
  }
}

pub(crate) fn cast<T, C>(value: Arc<dyn Any + Send + Sync>) -> Option<Instance>
where
  T: Implements<C> + Send + Sync + 'static,
  C: ?Sized + Send + Sync + 'static,
{
  value
    .downcast::<T>()
    .ok()
    .map(|value| Instance::new(T::upcast(value)))
}

fn caster_for<T: Component>(contract: TypeKey) -> Option<Caster> {
  if contract == TypeKey::of::<T>() {
    return Some(cast::<T, T>);
  }
  let mut contracts = Contracts::new();
  T::contracts(&mut contracts);
  contracts
    .entries
    .into_iter()
    .find(|(key, _)| *key == contract)
    .map(|(_, caster)| caster)
}

/// The runtime-registrable contracts of a component. See [`Component::contracts`].
pub struct Contracts<T> {
  entries: Vec<(TypeKey, Caster)>,
  _component: std::marker::PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Contracts<T> {
  pub(crate) fn new() -> Self {
    Self {
      entries: Vec::new(),
      _component: std::marker::PhantomData,
    }
  }

  pub fn add<C>(&mut self) -> &mut Self
  where
    C: ?Sized + Send + Sync + 'static,
    T: Implements<C>,
  {
    self.entries.push((TypeKey::of::<C>(), cast::<T, C>));
    self
  }
}

pub(crate) struct Parameter {
  pub(crate) name: &'static str,
  pub(crate) contract: ContractType,
}

/// One public constructor of a component: its parameters and how to call it.
///
/// ```
/// use fibre_inject::{Arguments, Constructor};
/// use std::sync::Arc;
///
/// struct Greeting(Arc<String>);
///
/// let constructor = Constructor::new("new", |args: &mut Arguments| Ok(Greeting(args.take()?)))
///   .param::<String>("text");
/// assert_eq!(constructor.name(), "new");
/// assert_eq!(constructor.arity(), 1);
/// ```
pub struct Constructor<T> {
  name: &'static str,
  parameters: Vec<Parameter>,
  build: Box<dyn Fn(&mut Arguments) -> Result<T>>,
}

impl<T> Constructor<T> {
  pub fn new(name: &'static str, build: impl Fn(&mut Arguments) -> Result<T> + 'static) -> Self {
    Self {
      name,
      parameters: Vec::new(),
      build: Box::new(build),
    }
  }

  /// Adds a parameter resolved through registrations only.
  pub fn param<C: ?Sized + Send + Sync + 'static>(self, name: &'static str) -> Self {
    self.contract(name, ContractType::of::<C>())
  }

  /// Adds a parameter that may also be constructed by convention.
  pub fn component<D: Component>(self, name: &'static str) -> Self {
    self.contract(name, ContractType::component::<D>())
  }

  pub fn contract(mut self, name: &'static str, contract: ContractType) -> Self {
    self.parameters.push(Parameter { name, contract });
    self
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn arity(&self) -> usize {
    self.parameters.len()
  }

  pub(crate) fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  pub(crate) fn invoke(&self, mut arguments: Arguments) -> Result<T> {
    (self.build)(&mut arguments)
  }
}

/// The constructors of a component, in declaration order.
pub struct Constructors<T> {
  list: Vec<Constructor<T>>,
}

impl<T> Constructors<T> {
  pub(crate) fn new() -> Self {
    Self { list: Vec::new() }
  }

  pub fn add(&mut self, constructor: Constructor<T>) -> &mut Self {
    self.list.push(constructor);
    self
  }

  pub fn len(&self) -> usize {
    self.list.len()
  }

  pub fn is_empty(&self) -> bool {
    self.list.is_empty()
  }

  pub(crate) fn iter(&self) -> std::slice::Iter<'_, Constructor<T>> {
    self.list.iter()
  }
}

/// The resolved parameter values handed to a constructor, in parameter order.
pub struct Arguments {
  values: std::vec::IntoIter<Instance>,
}

impl Arguments {
  pub(crate) fn new(values: Vec<Instance>) -> Self {
    Self {
      values: values.into_iter(),
    }
  }

  /// Takes the next argument as an `Arc<C>`.
  pub fn take<C: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<C>> {
    match self.values.next() {
      Some(instance) => instance.downcast_or_mismatch::<C>(),
      None => Err(Error::TypeMismatch {
        expected: std::any::type_name::<C>(),
        actual: "<no remaining argument>",
      }),
    }
  }

  pub fn remaining(&self) -> usize {
    self.values.len()
  }
}

pub(crate) struct InjectionPoint<T> {
  member: &'static str,
  contract: ContractType,
  assign: Box<dyn Fn(&mut T, Instance) -> Result<()>>,
}

impl<T> InjectionPoint<T> {
  pub(crate) fn member(&self) -> &'static str {
    self.member
  }

  pub(crate) fn contract(&self) -> &ContractType {
    &self.contract
  }

  pub(crate) fn assign(&self, target: &mut T, instance: Instance) -> Result<()> {
    (self.assign)(target, instance)
  }
}

/// The members of an [`Injectable`] type, in declaration order.
pub struct InjectionPoints<T> {
  points: Vec<InjectionPoint<T>>,
}

impl<T: 'static> InjectionPoints<T> {
  pub(crate) fn new() -> Self {
    Self { points: Vec::new() }
  }

  pub(crate) fn collect() -> Self
  where
    T: Injectable,
  {
    let mut points = Self::new();
    T::injection_points(&mut points);
    points
  }

  /// Marks a member filled by resolving contract `C`.
  pub fn member<C: ?Sized + Send + Sync + 'static>(
    &mut self,
    member: &'static str,
    assign: impl Fn(&mut T, Arc<C>) + 'static,
  ) -> &mut Self {
    self.push(member, ContractType::of::<C>(), move |target, instance| {
      assign(target, instance.downcast_or_mismatch::<C>()?);
      Ok(())
    })
  }

  /// Marks a member filled by resolving component `D`, constructing it by convention if needed.
  pub fn component<D: Component>(
    &mut self,
    member: &'static str,
    assign: impl Fn(&mut T, Arc<D>) + 'static,
  ) -> &mut Self {
    self.push(member, ContractType::component::<D>(), move |target, instance| {
      assign(target, instance.downcast_or_mismatch::<D>()?);
      Ok(())
    })
  }

  /// Includes the members of an embedded injectable value, at this position.
  pub fn embed<B: Injectable>(&mut self, project: fn(&mut T) -> &mut B) -> &mut Self {
    for point in InjectionPoints::<B>::collect().points {
      let assign = point.assign;
      self.points.push(InjectionPoint {
        member: point.member,
        contract: point.contract,
        assign: Box::new(move |target: &mut T, instance: Instance| assign(project(target), instance)),
      });
    }
    self
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  pub(crate) fn iter(&self) -> std::slice::Iter<'_, InjectionPoint<T>> {
    self.points.iter()
  }

  fn push(
    &mut self,
    member: &'static str,
    contract: ContractType,
    assign: impl Fn(&mut T, Instance) -> Result<()> + 'static,
  ) -> &mut Self {
    self.points.push(InjectionPoint {
      member,
      contract,
      assign: Box::new(assign),
    });
    self
  }
}
