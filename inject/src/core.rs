//! Core data structures shared by the registration table, the resolver and the injector.

use crate::error::{Error, Result};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

thread_local! {
  // The contracts currently being resolved on this thread, innermost last.
  // Entries are tagged with the owning container so that a custom resolver
  // hopping into another container is not mistaken for a cycle.
  static RESOLVING_STACK: RefCell<Vec<(u64, TypeKey)>> = RefCell::new(Vec::new());
}

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_container_id() -> u64 {
  NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)
}

/// An opaque identifier for a type, usable for sized types and trait objects alike.
///
/// Equality and hashing only consider the underlying [`TypeId`]; the name is
/// carried for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
  id: TypeId,
  name: &'static str,
}

impl TypeKey {
  /// Returns the key for `T`.
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  /// The fully qualified type name, as reported by [`std::any::type_name`].
  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl PartialEq for TypeKey {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeKey({})", self.name)
  }
}

impl fmt::Display for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

/// A type-erased value produced for a contract.
///
/// The payload is always an `Arc<C>` for the contract `C` the instance was
/// created for, so trait-object contracts survive the erasure. Cloning an
/// `Instance` shares the payload.
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  // Address of the shared `C`, not of the erased box around it.
  payload: usize,
  contract: TypeKey,
}

impl Instance {
  /// Wraps a shared value as an instance of contract `C`.
  pub fn new<C: ?Sized + Send + Sync + 'static>(value: Arc<C>) -> Self {
    Self {
      payload: Arc::as_ptr(&value) as *const () as usize,
      value: Arc::new(value),
      contract: TypeKey::of::<C>(),
    }
  }

  /// The contract this instance was created for.
  pub fn contract(&self) -> TypeKey {
    self.contract
  }

  /// Recovers the typed value, or `None` if `C` is not the instance's contract.
  pub fn downcast<C: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<C>> {
    self.value.downcast_ref::<Arc<C>>().cloned()
  }

  pub(crate) fn downcast_or_mismatch<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>> {
    self.downcast::<C>().ok_or_else(|| Error::TypeMismatch {
      expected: std::any::type_name::<C>(),
      actual: self.contract.name(),
    })
  }

  /// Returns `true` if both instances share the same payload.
  pub fn ptr_eq(&self, other: &Instance) -> bool {
    self.payload == other.payload
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({})", self.contract.name)
  }
}

/// Formats a dependency cycle as `A -> B -> A`.
pub(crate) fn describe_cycle(path: &[TypeKey], repeated: TypeKey) -> String {
  let start = path.iter().position(|key| *key == repeated).unwrap_or(0);
  path[start..]
    .iter()
    .chain(std::iter::once(&repeated))
    .map(TypeKey::name)
    .collect::<Vec<_>>()
    .join(" -> ")
}

/// An RAII guard marking a contract as "being resolved" on the current thread.
///
/// Entering a contract that is already on the stack for the same container is
/// a circular dependency and is reported as an error. The guard pops its entry
/// when dropped.
pub(crate) struct ResolutionGuard {
  _private: (),
}

impl ResolutionGuard {
  pub(crate) fn enter(container: u64, key: TypeKey, max_depth: usize) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      let path: Vec<TypeKey> = stack
        .iter()
        .filter(|(owner, _)| *owner == container)
        .map(|(_, key)| *key)
        .collect();

      if path.contains(&key) {
        return Err(Error::CircularDependency {
          chain: describe_cycle(&path, key),
        });
      }
      if path.len() >= max_depth {
        return Err(Error::DepthExceeded {
          contract: key.name(),
          max_depth,
        });
      }

      stack.push((container, key));
      Ok(Self { _private: () })
    })
  }

  /// The contracts of `container` currently being resolved on this thread, outermost first.
  pub(crate) fn active(container: u64) -> Vec<TypeKey> {
    RESOLVING_STACK.with(|stack| {
      stack
        .borrow()
        .iter()
        .filter(|(owner, _)| *owner == container)
        .map(|(_, key)| *key)
        .collect()
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().pop();
    });
  }
}
