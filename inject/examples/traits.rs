use fibre_inject::{
  implements, resolve, Component, Constructor, Constructors, Container, Injectable, InjectionPoints,
};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}
impl Injectable for ConsoleLogger {}
impl Component for ConsoleLogger {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(Constructor::new("new", |_| Ok(ConsoleLogger)));
  }
}
implements!(ConsoleLogger => dyn Logger);

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
  title: Option<Arc<String>>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    if let Some(title) = &self.title {
      self.logger.log(&format!("Title: {}", title));
    }
    self.logger.log("Finished report generation.");
  }
}

// The logger arrives through the constructor, the title through member injection.
impl Injectable for ReportService {
  fn injection_points(points: &mut InjectionPoints<Self>) {
    points.member::<String>("title", |service, title| service.title = Some(title));
  }
}
impl Component for ReportService {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(
      Constructor::new("new", |args| {
        Ok(ReportService {
          logger: args.take()?,
          title: None,
        })
      })
      .param::<dyn Logger>("logger"),
    );
  }
}

fn main() {
  let container = Container::new();

  // --- Registration ---
  // The container builds an Arc<ConsoleLogger> but serves it as Arc<dyn Logger>.
  container.register::<dyn Logger, ConsoleLogger>();
  container.register_instance(Arc::new("Quarterly numbers".to_string()));

  // --- Resolution and Usage ---
  // ReportService is not registered; it is constructed by convention.
  println!("Resolving the high-level service...");
  let report_service = resolve!(container, component ReportService);

  println!("Using the service...");
  report_service.generate_report();
}
