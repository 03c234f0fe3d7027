//! The resolution engine.
//!
//! Precedence for a contract, first match wins:
//!
//! 1. a registered instance is returned as-is;
//! 2. a custom resolver is invoked (and cached unless transient);
//! 3. a registered implementation is constructed (and cached unless transient);
//! 4. an unregistered contract that carries a component recipe is constructed
//!    by convention and cached.
//!
//! Construction tries the component's constructors in declaration order and
//! uses the first one whose parameters all resolve. Every parameter list is
//! probed before anything is built, so a rejected constructor never causes
//! partial construction of its dependencies.

use crate::component::{
  Arguments, Built, Caster, Component, Constructor, Constructors, ContractType, Disposer,
  Implementation,
};
use crate::container::Container;
use crate::core::{describe_cycle, Instance, ResolutionGuard, TypeKey};
use crate::error::{Error, Result};
use crate::registration::Rule;
use std::any::Any;
use std::sync::Arc;
use tracing::trace;

/// What a custom resolver is asked for.
pub struct Request<'a> {
  container: &'a Container,
  contract: &'a ContractType,
  target: TypeKey,
}

impl<'a> Request<'a> {
  /// The container resolving the contract, for nested resolution.
  pub fn container(&self) -> &'a Container {
    self.container
  }

  /// The contract being resolved.
  pub fn contract(&self) -> &'a ContractType {
    self.contract
  }

  /// The type that needs the contract. Equal to the contract for top-level requests.
  pub fn target(&self) -> TypeKey {
    self.target
  }
}

impl Container {
  /// Resolves contract `C` from the registrations.
  ///
  /// A bare type parameter carries no construction recipe, so an unregistered
  /// `C` fails; use [`resolve_component`](Self::resolve_component) to allow
  /// construction by convention.
  pub fn resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>> {
    self
      .resolve_type(&ContractType::of::<C>())?
      .downcast_or_mismatch::<C>()
  }

  /// Resolves component `T`, constructing it by convention if it is not registered.
  pub fn resolve_component<T: Component>(&self) -> Result<Arc<T>> {
    self
      .resolve_type(&ContractType::component::<T>())?
      .downcast_or_mismatch::<T>()
  }

  pub fn resolve_type(&self, contract: &ContractType) -> Result<Instance> {
    self.resolve_for(contract.key(), contract)
  }

  /// Resolves `contract` on behalf of `target`, the type that needs it.
  pub fn resolve_for(&self, target: TypeKey, contract: &ContractType) -> Result<Instance> {
    self.ensure_live()?;
    let key = contract.key();
    let _guard = ResolutionGuard::enter(self.id(), key, self.config().max_depth)?;

    let resolved = match self.rules().get(&key) {
      Some(Rule::Instance(instance)) => {
        trace!(contract = %key, "resolved registered instance");
        Ok(instance)
      }
      Some(Rule::CustomResolver { resolver, options }) => {
        let request = Request {
          container: self,
          contract,
          target,
        };
        trace!(contract = %key, consumer = %target, transient = options.is_transient(), "invoking custom resolver");
        if options.is_transient() {
          (*resolver)(&request)
        } else {
          self.cached(key, || (*resolver)(&request))
        }
      }
      Some(Rule::Implementation {
        implementation,
        cast,
        options,
      }) => {
        trace!(contract = %key, implementation = %implementation.key(), transient = options.is_transient(), "constructing registered implementation");
        if options.is_transient() {
          self.build(key, &implementation, cast, false)
        } else {
          self.cached(key, || self.build(key, &implementation, cast, true))
        }
      }
      None => match contract.recipe() {
        Some(implementation) if self.config().resolve_by_convention => {
          trace!(contract = %key, "constructing by convention");
          let cast = implementation
            .caster(key)
            .ok_or_else(|| Error::NotAssignable {
              contract: key.name(),
              implementation: implementation.name(),
            })?;
          self.cached(key, || self.build(key, &implementation, cast, true))
        }
        _ => Err(Error::Unresolvable {
          contract: key.name(),
          consumer: (target != key).then(|| target.name()),
        }),
      },
    };

    // The container may have been disposed while this resolution was running.
    self.ensure_live()?;
    resolved
  }

  pub fn try_resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<C>> {
    self
      .try_resolve_type(&ContractType::of::<C>())
      .and_then(|instance| instance.downcast::<C>())
  }

  pub fn try_resolve_component<T: Component>(&self) -> Option<Arc<T>> {
    self
      .try_resolve_type(&ContractType::component::<T>())
      .and_then(|instance| instance.downcast::<T>())
  }

  /// Like [`resolve_type`](Self::resolve_type), reporting any failure as `None`.
  pub fn try_resolve_type(&self, contract: &ContractType) -> Option<Instance> {
    match self.resolve_type(contract) {
      Ok(instance) => Some(instance),
      Err(err) => {
        trace!(contract = %contract.key(), unresolvable = err.is_unresolvable(), error = %err, "try_resolve failed");
        None
      }
    }
  }

  pub fn can_resolve<C: ?Sized + Send + Sync + 'static>(&self) -> bool {
    self.can_resolve_type(&ContractType::of::<C>())
  }

  pub fn can_resolve_component<T: Component>(&self) -> bool {
    self.can_resolve_type(&ContractType::component::<T>())
  }

  /// Answers whether resolving `contract` would succeed, without constructing
  /// or caching anything.
  ///
  /// Registered instances and custom resolvers always count as resolvable;
  /// components are resolvable when one of their constructors and all of
  /// their injection points are.
  pub fn can_resolve_type(&self, contract: &ContractType) -> bool {
    let mut visiting = ResolutionGuard::active(self.id());
    self.probe(contract, &mut visiting).is_ok()
  }

  /// The dry-run counterpart of [`resolve_for`](Self::resolve_for).
  pub(crate) fn probe(&self, contract: &ContractType, visiting: &mut Vec<TypeKey>) -> Result<()> {
    self.ensure_live()?;
    let key = contract.key();

    if visiting.contains(&key) {
      return Err(Error::CircularDependency {
        chain: describe_cycle(visiting, key),
      });
    }
    if visiting.len() >= self.config().max_depth {
      return Err(Error::DepthExceeded {
        contract: key.name(),
        max_depth: self.config().max_depth,
      });
    }

    let implementation = match self.rules().get(&key) {
      Some(Rule::Instance(_)) | Some(Rule::CustomResolver { .. }) => return Ok(()),
      Some(Rule::Implementation {
        implementation,
        options,
        ..
      }) => {
        if !options.is_transient() && self.is_cached(&key) {
          return Ok(());
        }
        implementation
      }
      None => match contract.recipe() {
        Some(implementation) if self.config().resolve_by_convention => {
          if self.is_cached(&key) {
            return Ok(());
          }
          implementation
        }
        _ => {
          return Err(Error::Unresolvable {
            contract: key.name(),
            consumer: visiting.last().map(TypeKey::name),
          })
        }
      },
    };

    visiting.push(key);
    let result = implementation.probe(self, visiting);
    visiting.pop();
    result
  }

  /// Builds `T`: selects a constructor, invokes it and injects its members.
  pub(crate) fn construct<T: Component>(&self) -> Result<T> {
    let component = TypeKey::of::<T>();
    let mut constructors = Constructors::new();
    T::constructors(&mut constructors);

    let mut rejection = None;
    for constructor in constructors.iter() {
      match self.satisfy(component, constructor) {
        Ok(arguments) => {
          trace!(component = %component, constructor = constructor.name(), "invoking constructor");
          let value = constructor.invoke(arguments)?;
          return self.inject_into(value);
        }
        Err((parameter, source)) => {
          trace!(component = %component, constructor = constructor.name(), parameter, error = %source, "constructor rejected");
          rejection.get_or_insert(Error::NoSatisfiableConstructor {
            component: component.name(),
            constructor: constructor.name(),
            parameter,
            source: Box::new(source),
          });
        }
      }
    }

    Err(rejection.unwrap_or(Error::NoConstructors {
      component: component.name(),
    }))
  }

  /// Resolves every parameter of `constructor`, or names the first one that fails.
  fn satisfy<T>(
    &self,
    component: TypeKey,
    constructor: &Constructor<T>,
  ) -> std::result::Result<Arguments, (&'static str, Error)> {
    let mut visiting = ResolutionGuard::active(self.id());
    for parameter in constructor.parameters() {
      self
        .probe(&parameter.contract, &mut visiting)
        .map_err(|err| (parameter.name, err))?;
    }

    let values = constructor
      .parameters()
      .iter()
      .map(|parameter| {
        self
          .resolve_for(component, &parameter.contract)
          .map_err(|err| (parameter.name, err))
      })
      .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Arguments::new(values))
  }

  fn build(
    &self,
    contract: TypeKey,
    implementation: &Implementation,
    cast: Caster,
    owned: bool,
  ) -> Result<Instance> {
    let Built { value, disposer } = implementation.construct(self)?;
    let instance = cast(value).ok_or_else(|| Error::TypeMismatch {
      expected: contract.name(),
      actual: implementation.name(),
    })?;
    if owned {
      if let Some(disposer) = disposer {
        self.track(implementation.key(), disposer)?;
      }
    }
    Ok(instance)
  }

  /// Returns the cached singleton for `contract`, running `init` at most once
  /// even when several threads race for it.
  fn cached(&self, contract: TypeKey, init: impl FnOnce() -> Result<Instance>) -> Result<Instance> {
    let cell = self.singleton_cell(contract);
    cell.get_or_try_init(init).cloned()
  }
}

pub(crate) fn construct_component<T: Component>(container: &Container) -> Result<Built> {
  let value = Arc::new(container.construct::<T>()?);
  let disposer = value.as_dispose().is_some().then(|| {
    let owned = Arc::clone(&value);
    Box::new(move || {
      if let Some(disposable) = owned.as_dispose() {
        disposable.dispose();
      }
    }) as Disposer
  });
  Ok(Built {
    value: value as Arc<dyn Any + Send + Sync>,
    disposer,
  })
}

pub(crate) fn probe_component<T: Component>(
  container: &Container,
  visiting: &mut Vec<TypeKey>,
) -> Result<()> {
  let component = TypeKey::of::<T>();
  let mut constructors = Constructors::new();
  T::constructors(&mut constructors);

  let mut rejection = None;
  for constructor in constructors.iter() {
    let failed = constructor.parameters().iter().find_map(|parameter| {
      container
        .probe(&parameter.contract, visiting)
        .err()
        .map(|err| (parameter.name, err))
    });
    match failed {
      None => return container.probe_members::<T>(visiting),
      Some((parameter, source)) => {
        rejection.get_or_insert(Error::NoSatisfiableConstructor {
          component: component.name(),
          constructor: constructor.name(),
          parameter,
          source: Box::new(source),
        });
      }
    }
  }

  Err(rejection.unwrap_or(Error::NoConstructors {
    component: component.name(),
  }))
}
