//! The registration table: one resolution rule per contract.

use crate::component::{Caster, Implementation};
use crate::core::{Instance, TypeKey};
use crate::error::Result;
use crate::resolver::Request;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub(crate) type ResolverFn = Arc<dyn Fn(&Request<'_>) -> Result<Instance> + Send + Sync>;

/// Lifetime options of a registered rule.
///
/// Registration methods return the same `Arc` the stored rule holds, so
/// changing the options afterwards changes how the rule resolves from then on:
///
/// ```
/// use fibre_inject::Container;
/// use std::sync::Arc;
///
/// let container = Container::new();
/// let options = container.register_custom_resolver::<String, _>(|_| Ok(Arc::new("x".to_string())));
/// options.transient();
///
/// let a = container.resolve::<String>().unwrap();
/// let b = container.resolve::<String>().unwrap();
/// assert!(!Arc::ptr_eq(&a, &b));
/// ```
#[derive(Default)]
pub struct ResolutionOptions {
  transient: AtomicBool,
}

impl ResolutionOptions {
  pub(crate) fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  /// Every resolution produces a new value.
  pub fn transient(&self) -> &Self {
    self.transient.store(true, Ordering::Release);
    self
  }

  /// The first resolution's value is cached and reused. This is the default.
  pub fn singleton(&self) -> &Self {
    self.transient.store(false, Ordering::Release);
    self
  }

  pub fn is_transient(&self) -> bool {
    self.transient.load(Ordering::Acquire)
  }
}

impl fmt::Debug for ResolutionOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResolutionOptions")
      .field("transient", &self.is_transient())
      .finish()
  }
}

/// How a contract is satisfied. Cloning is shallow: instances, resolver
/// functions and options are shared.
#[derive(Clone)]
pub(crate) enum Rule {
  Instance(Instance),
  CustomResolver {
    resolver: ResolverFn,
    options: Arc<ResolutionOptions>,
  },
  Implementation {
    implementation: Implementation,
    cast: Caster,
    options: Arc<ResolutionOptions>,
  },
}

impl Rule {
  pub(crate) fn kind(&self) -> &'static str {
    match self {
      Rule::Instance(_) => "instance",
      Rule::CustomResolver { .. } => "custom resolver",
      Rule::Implementation { .. } => "implementation",
    }
  }
}

#[derive(Default)]
pub(crate) struct RegistrationTable {
  rules: DashMap<TypeKey, Rule>,
}

impl RegistrationTable {
  /// Stores `rule`, returning the rule it replaced.
  pub(crate) fn insert(&self, contract: TypeKey, rule: Rule) -> Option<Rule> {
    self.rules.insert(contract, rule)
  }

  /// Returns a copy of the rule so no map guard outlives the call.
  pub(crate) fn get(&self, contract: &TypeKey) -> Option<Rule> {
    self.rules.get(contract).map(|entry| entry.value().clone())
  }

  pub(crate) fn contains(&self, contract: &TypeKey) -> bool {
    self.rules.contains_key(contract)
  }

  pub(crate) fn contracts(&self) -> Vec<TypeKey> {
    self.rules.iter().map(|entry| *entry.key()).collect()
  }

  pub(crate) fn len(&self) -> usize {
    self.rules.len()
  }

  /// An independent table holding the same rules.
  pub(crate) fn snapshot(&self) -> Self {
    let rules = DashMap::with_capacity(self.rules.len());
    for entry in self.rules.iter() {
      rules.insert(*entry.key(), entry.value().clone());
    }
    Self { rules }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn options_handle_toggles_lifetime() {
    let options = ResolutionOptions::new();
    assert!(!options.is_transient());

    options.transient();
    assert!(options.is_transient());

    options.singleton();
    assert!(!options.is_transient());
  }

  #[test]
  fn last_insert_wins() {
    let table = RegistrationTable::default();
    let key = TypeKey::of::<u32>();

    assert!(table.insert(key, Rule::Instance(Instance::new(Arc::new(1_u32)))).is_none());
    let replaced = table.insert(key, Rule::Instance(Instance::new(Arc::new(2_u32))));

    assert_eq!(replaced.map(|rule| rule.kind()), Some("instance"));
    assert_eq!(table.len(), 1);
    match table.get(&key) {
      Some(Rule::Instance(instance)) => assert_eq!(*instance.downcast::<u32>().unwrap(), 2),
      _ => panic!("expected an instance rule"),
    }
  }

  #[test]
  fn snapshot_is_independent_but_shares_rules() {
    let table = RegistrationTable::default();
    let shared = Instance::new(Arc::new(5_u8));
    table.insert(TypeKey::of::<u8>(), Rule::Instance(shared.clone()));

    let copy = table.snapshot();
    table.insert(TypeKey::of::<u16>(), Rule::Instance(Instance::new(Arc::new(6_u16))));
    copy.insert(TypeKey::of::<u32>(), Rule::Instance(Instance::new(Arc::new(7_u32))));

    assert!(!copy.contains(&TypeKey::of::<u16>()));
    assert!(!table.contains(&TypeKey::of::<u32>()));
    match copy.get(&TypeKey::of::<u8>()) {
      Some(Rule::Instance(instance)) => assert!(instance.ptr_eq(&shared)),
      _ => panic!("expected the shared instance rule"),
    }
  }
}
