//! Tests for the `resolve!` and `implements!` macros.

use fibre_inject::{implements, resolve, Component, Constructor, Constructors, Container, Injectable};
use std::sync::Arc;

// --- Test Fixtures ---

struct MacroTestService {
  value: i32,
}

trait MacroTestTrait: Send + Sync {
  fn value(&self) -> i32;
}
impl MacroTestTrait for MacroTestService {
  fn value(&self) -> i32 {
    self.value
  }
}

trait Doubled: Send + Sync {
  fn doubled(&self) -> i32;
}
impl Doubled for MacroTestService {
  fn doubled(&self) -> i32 {
    self.value * 2
  }
}

impl Injectable for MacroTestService {}
impl Component for MacroTestService {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(Constructor::new("new", |_| Ok(MacroTestService { value: 21 })));
  }
}
implements!(MacroTestService => dyn MacroTestTrait, dyn Doubled);

struct UnregisteredService;

// --- resolve! ---

#[test]
fn test_resolve_concrete_service() {
  // Arrange
  let container = Container::new();
  container.register_instance(Arc::new(MacroTestService { value: 42 }));

  // Act
  let service = resolve!(container, MacroTestService);

  // Assert
  assert_eq!(service.value, 42);
}

#[test]
fn test_resolve_trait_service() {
  // Arrange
  let container = Container::new();
  container.register::<dyn MacroTestTrait, MacroTestService>();

  // Act
  let service = resolve!(container, trait MacroTestTrait);

  // Assert
  assert_eq!(service.value(), 21);
}

#[test]
fn test_resolve_component_by_convention() {
  // Arrange
  let container = Container::new();

  // Act
  let service = resolve!(container, component MacroTestService);

  // Assert
  assert_eq!(service.value, 21);
}

#[test]
#[should_panic(expected = "Failed to resolve required service:")]
fn test_resolve_panics_on_missing_service() {
  let container = Container::new();
  let _ = resolve!(container, UnregisteredService);
}

#[test]
#[should_panic(expected = "Failed to resolve required trait service:")]
fn test_resolve_panics_on_missing_trait() {
  let container = Container::new();
  let _ = resolve!(container, trait Doubled);
}

#[test]
#[should_panic(expected = "Failed to resolve required component:")]
fn test_resolve_panics_when_component_cannot_be_built() {
  let container = Container::new();
  container.dispose();
  let _ = resolve!(container, component MacroTestService);
}

// --- implements! ---

#[test]
fn test_one_component_behind_several_contracts() {
  // Arrange
  let container = Container::new();
  container.register::<dyn MacroTestTrait, MacroTestService>();
  container.register::<dyn Doubled, MacroTestService>();

  // Act
  let plain = resolve!(container, trait MacroTestTrait);
  let doubled = resolve!(container, trait Doubled);

  // Assert
  assert_eq!(plain.value(), 21);
  assert_eq!(doubled.doubled(), 42);
}
