use fibre_inject::{resolve, Container};
use std::panic;

trait Mailer: Send + Sync {}

struct UnregisteredService;

fn main() {
  let container = Container::new();

  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a service that was never registered...");

  let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
    // This line will panic!
    let _service = resolve!(container, UnregisteredService);
  }));

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the fallible methods ---
  println!("\nNow, asking before resolving...");
  assert!(!container.can_resolve::<dyn Mailer>());

  match container.try_resolve::<dyn Mailer>() {
    Some(_) => panic!("Should not have found the service!"),
    None => println!("Correctly received `None` for the missing service."),
  }

  match container.resolve::<dyn Mailer>() {
    Ok(_) => panic!("Should not have resolved the service!"),
    Err(err) => println!("resolve() explains why: {}", err),
  }
}
