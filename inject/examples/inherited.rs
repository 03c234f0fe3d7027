use fibre_inject::{implements, Component, Constructor, Constructors, Container, Injectable};
use std::sync::Arc;

trait Storage: Send + Sync {
  fn describe(&self) -> String;
}

struct DiskStorage;
impl Storage for DiskStorage {
  fn describe(&self) -> String {
    "disk".to_string()
  }
}
impl Injectable for DiskStorage {}
impl Component for DiskStorage {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(Constructor::new("new", |_| Ok(DiskStorage)));
  }
}
implements!(DiskStorage => dyn Storage);

struct MemoryStorage;
impl Storage for MemoryStorage {
  fn describe(&self) -> String {
    "memory".to_string()
  }
}
impl Injectable for MemoryStorage {}
impl Component for MemoryStorage {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(Constructor::new("new", |_| Ok(MemoryStorage)));
  }
}
implements!(MemoryStorage => dyn Storage);

// A function that runs against whatever container it is given.
fn process_data(container: &Container) -> String {
  let storage = container
    .resolve::<dyn Storage>()
    .unwrap_or_else(|err| panic!("storage not configured: {}", err));
  let name = container.resolve::<String>().map(|name| name.to_string()).unwrap_or_default();
  format!("{} stored on {}", name, storage.describe())
}

fn main() {
  let app = Container::new();
  app.register::<dyn Storage, DiskStorage>();
  app.register_instance(Arc::new("report".to_string()));

  // --- A child container for tests ---
  // It starts from the parent's rules, then diverges.
  let test_container = app.create_inherited_container();
  test_container.register::<dyn Storage, MemoryStorage>();

  println!("app:  {}", process_data(&app));
  println!("test: {}", process_data(&test_container));
  assert_eq!(process_data(&app), "report stored on disk");
  assert_eq!(process_data(&test_container), "report stored on memory");

  // --- Verify Isolation ---
  test_container.register_instance(Arc::new(7_u32));
  assert!(app.try_resolve::<u32>().is_none());

  // The shared instance is the same object in both containers.
  let a = app.resolve::<String>().unwrap();
  let b = test_container.resolve::<String>().unwrap();
  assert!(Arc::ptr_eq(&a, &b));

  println!("\nVerified that the child container is isolated from its parent.");
}
