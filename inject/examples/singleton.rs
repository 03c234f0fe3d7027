use fibre_inject::{resolve, Component, Constructor, Constructors, Container, Injectable};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

impl Injectable for RequestTracker {}
impl Component for RequestTracker {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(Constructor::new("new", |_| {
      println!("Creating RequestTracker...");
      Ok(RequestTracker {
        id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
      })
    }));
  }
}

fn main() {
  let container = Container::new();

  // --- Singleton Registration ---
  // The constructor will only be called ONCE.
  let options = container.register::<RequestTracker, RequestTracker>();

  println!("--- Resolving Singletons ---");
  let s1 = resolve!(container, RequestTracker);
  let s2 = resolve!(container, RequestTracker);
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert_eq!(s1.id, 0);
  assert!(
    Arc::ptr_eq(&s1, &s2),
    "Singleton instances should be identical"
  );
  println!("Singleton instances are the same pointer, as expected.\n");

  // --- Switching to Transient ---
  // The handle returned at registration changes the rule in place.
  options.transient();

  println!("--- Resolving Transients ---");
  let t1 = resolve!(container, RequestTracker);
  let t2 = resolve!(container, RequestTracker);
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert_eq!(t1.id, 1);
  assert_eq!(t2.id, 2);
  assert!(
    !Arc::ptr_eq(&t1, &t2),
    "Transient instances should be different"
  );
  println!("Transient instances are different pointers, as expected.");
}
