//! The main `Container` struct: registration, inheritance and disposal.

use crate::component::{cast, Component, ContractType, Disposer, Implementation, Implements};
use crate::config::ContainerConfig;
use crate::core::{next_container_id, Instance, TypeKey};
use crate::error::{Error, Result};
use crate::registration::{RegistrationTable, ResolutionOptions, Rule};
use crate::resolver::Request;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The dependency injection container.
///
/// Holds one resolution rule per contract and a cache of the singletons it
/// built. Registration is meant to happen during setup; once configured, a
/// container can be shared across threads and resolved from concurrently.
pub struct Container {
  id: u64,
  config: ContainerConfig,
  rules: RegistrationTable,
  singletons: DashMap<TypeKey, Arc<OnceCell<Instance>>>,
  owned: Mutex<Vec<(TypeKey, Disposer)>>,
  disposed: AtomicBool,
}

impl Default for Container {
  fn default() -> Self {
    Self::new()
  }
}

impl Container {
  /// Creates a container with the default configuration.
  pub fn new() -> Self {
    Self::with_config(ContainerConfig::default())
  }

  /// Creates a container with `config`. The configuration itself is
  /// registered as an instance of [`ContainerConfig`].
  pub fn with_config(config: ContainerConfig) -> Self {
    let container = Self {
      id: next_container_id(),
      config,
      rules: RegistrationTable::default(),
      singletons: DashMap::new(),
      owned: Mutex::new(Vec::new()),
      disposed: AtomicBool::new(false),
    };
    container.register_instance(Arc::new(container.config.clone()));
    debug!(container = container.id, "created container");
    container
  }

  pub fn config(&self) -> &ContainerConfig {
    &self.config
  }

  // --- PRIVATE HELPERS ---

  pub(crate) fn id(&self) -> u64 {
    self.id
  }

  pub(crate) fn rules(&self) -> &RegistrationTable {
    &self.rules
  }

  pub(crate) fn ensure_live(&self) -> Result<()> {
    if self.is_disposed() {
      Err(Error::Disposed)
    } else {
      Ok(())
    }
  }

  pub(crate) fn singleton_cell(&self, contract: TypeKey) -> Arc<OnceCell<Instance>> {
    self.singletons.entry(contract).or_default().clone()
  }

  pub(crate) fn is_cached(&self, contract: &TypeKey) -> bool {
    self
      .singletons
      .get(contract)
      .map_or(false, |cell| cell.value().get().is_some())
  }

  /// Takes ownership of a freshly built singleton's disposer. A container
  /// disposed while the build was running disposes the value right away.
  pub(crate) fn track(&self, component: TypeKey, disposer: Disposer) -> Result<()> {
    let mut owned = self.owned.lock();
    if self.is_disposed() {
      drop(owned);
      debug!(container = self.id, component = %component, "disposing singleton built during dispose");
      disposer();
      return Err(Error::Disposed);
    }
    owned.push((component, disposer));
    Ok(())
  }

  fn insert_rule(&self, contract: TypeKey, rule: Rule) {
    if self.is_disposed() {
      warn!(container = self.id, contract = %contract, "ignoring registration on a disposed container");
      return;
    }
    debug!(container = self.id, contract = %contract, rule = rule.kind(), "registered");
    if let Some(previous) = self.rules.insert(contract, rule) {
      trace!(container = self.id, contract = %contract, previous = previous.kind(), "replaced rule");
    }
    // Last registration wins, including over an already cached singleton.
    self.singletons.remove(&contract);
  }

  // --- Implementation Registration ---

  /// Maps contract `C` to component `I`. The returned options start as singleton.
  pub fn register<C, I>(&self) -> Arc<ResolutionOptions>
  where
    C: ?Sized + Send + Sync + 'static,
    I: Component + Implements<C>,
  {
    let options = ResolutionOptions::new();
    self.insert_rule(
      TypeKey::of::<C>(),
      Rule::Implementation {
        implementation: Implementation::of::<I>(),
        cast: cast::<I, C>,
        options: Arc::clone(&options),
      },
    );
    options
  }

  /// Maps `contract` to `implementation`, checking assignability now.
  pub fn register_type(
    &self,
    contract: &ContractType,
    implementation: &Implementation,
  ) -> Result<Arc<ResolutionOptions>> {
    self.ensure_live()?;
    let cast = implementation
      .caster(contract.key())
      .ok_or(Error::NotAssignable {
        contract: contract.name(),
        implementation: implementation.name(),
      })?;

    let options = ResolutionOptions::new();
    self.insert_rule(
      contract.key(),
      Rule::Implementation {
        implementation: *implementation,
        cast,
        options: Arc::clone(&options),
      },
    );
    Ok(options)
  }

  // --- Instance Registration ---

  /// Registers an already constructed value. It is returned as-is by every
  /// resolution and is never disposed by the container.
  pub fn register_instance<C: ?Sized + Send + Sync + 'static>(&self, instance: Arc<C>) {
    self.insert_rule(TypeKey::of::<C>(), Rule::Instance(Instance::new(instance)));
  }

  pub fn register_instance_type(&self, contract: &ContractType, instance: Instance) -> Result<()> {
    self.ensure_live()?;
    if instance.contract() != contract.key() {
      return Err(Error::NotAssignable {
        contract: contract.name(),
        implementation: instance.contract().name(),
      });
    }
    self.insert_rule(contract.key(), Rule::Instance(instance));
    Ok(())
  }

  // --- Custom Resolver Registration ---

  /// Registers a function producing `C`. The returned options start as singleton.
  pub fn register_custom_resolver<C, F>(&self, resolver: F) -> Arc<ResolutionOptions>
  where
    C: ?Sized + Send + Sync + 'static,
    F: Fn(&Request<'_>) -> Result<Arc<C>> + Send + Sync + 'static,
  {
    let options = ResolutionOptions::new();
    self.insert_rule(
      TypeKey::of::<C>(),
      Rule::CustomResolver {
        resolver: Arc::new(move |request: &Request<'_>| resolver(request).map(Instance::new)),
        options: Arc::clone(&options),
      },
    );
    options
  }

  /// Registers an untyped resolver for `contract`. Instances it returns for
  /// any other contract are rejected with `TypeMismatch`.
  pub fn register_custom_resolver_type<F>(
    &self,
    contract: &ContractType,
    resolver: F,
  ) -> Arc<ResolutionOptions>
  where
    F: Fn(&Request<'_>) -> Result<Instance> + Send + Sync + 'static,
  {
    let expected = contract.key();
    let options = ResolutionOptions::new();
    self.insert_rule(
      expected,
      Rule::CustomResolver {
        resolver: Arc::new(move |request: &Request<'_>| {
          let instance = resolver(request)?;
          if instance.contract() == expected {
            Ok(instance)
          } else {
            Err(Error::TypeMismatch {
              expected: expected.name(),
              actual: instance.contract().name(),
            })
          }
        }),
        options: Arc::clone(&options),
      },
    );
    options
  }

  // --- Introspection ---

  pub fn is_registered<C: ?Sized + Send + Sync + 'static>(&self) -> bool {
    self.rules.contains(&TypeKey::of::<C>())
  }

  pub fn is_registered_type(&self, contract: &ContractType) -> bool {
    self.rules.contains(&contract.key())
  }

  /// The contracts with a rule in this container, in no particular order.
  pub fn registered_contracts(&self) -> Vec<TypeKey> {
    self.rules.contracts()
  }

  // --- Inheritance ---

  /// Creates a child container starting from a snapshot of this container's rules.
  ///
  /// The two tables evolve independently afterwards. Rules are shared, not
  /// copied: registered instances, resolver functions and lifetime options
  /// are the same objects in both. The child's singleton cache starts empty,
  /// so it builds its own singletons from inherited implementation rules.
  pub fn create_inherited_container(&self) -> Container {
    let child = Container {
      id: next_container_id(),
      config: self.config.clone(),
      rules: self.rules.snapshot(),
      singletons: DashMap::new(),
      owned: Mutex::new(Vec::new()),
      disposed: AtomicBool::new(false),
    };
    debug!(
      parent = self.id,
      child = child.id,
      rules = child.rules.len(),
      "created inherited container"
    );
    child
  }

  // --- Disposal ---

  /// Disposes every singleton this container built, newest first, and
  /// rejects further use. Calling it again does nothing.
  ///
  /// Registered instances and singletons cached by other containers are left alone.
  pub fn dispose(&self) {
    let owned = {
      let mut owned = self.owned.lock();
      if self.disposed.swap(true, Ordering::AcqRel) {
        return;
      }
      std::mem::take(&mut *owned)
    };
    debug!(container = self.id, singletons = owned.len(), "disposing container");
    for (component, disposer) in owned.into_iter().rev() {
      trace!(container = self.id, component = %component, "disposing singleton");
      disposer();
    }
    self.singletons.clear();
  }

  pub fn is_disposed(&self) -> bool {
    self.disposed.load(Ordering::Acquire)
  }
}

impl Drop for Container {
  fn drop(&mut self) {
    if self.config.dispose_on_drop {
      self.dispose();
    }
  }
}
