#![allow(dead_code)]

use fibre_inject::{
  implements, Component, Constructor, Constructors, Contracts, Dispose, Injectable,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- Contracts ---

pub trait Logger: Send + Sync {
  fn log(&self, message: &str) -> String;
}

pub trait Clock: Send + Sync {
  fn now(&self) -> u64;
}

/// A contract nothing implements.
pub trait Unregistered: Send + Sync {}

// --- Components ---

pub struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) -> String {
    format!("[console] {}", message)
  }
}
impl Injectable for ConsoleLogger {}
impl Component for ConsoleLogger {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(Constructor::new("new", |_| Ok(ConsoleLogger)));
  }
  fn contracts(contracts: &mut Contracts<Self>) {
    contracts.add::<dyn Logger>();
  }
}
implements!(ConsoleLogger => dyn Logger);

pub struct FileLogger;
impl Logger for FileLogger {
  fn log(&self, message: &str) -> String {
    format!("[file] {}", message)
  }
}
impl Injectable for FileLogger {}
impl Component for FileLogger {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(Constructor::new("new", |_| Ok(FileLogger)));
  }
}
implements!(FileLogger => dyn Logger);

pub struct FixedClock(pub u64);
impl Clock for FixedClock {
  fn now(&self) -> u64 {
    self.0
  }
}

/// A component with a single parameterless constructor.
pub struct Widget;
impl Injectable for Widget {}
impl Component for Widget {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(Constructor::new("new", |_| Ok(Widget)));
  }
}

/// Depends on `dyn Logger` through its only constructor.
pub struct Greeter {
  pub logger: Arc<dyn Logger>,
}
impl Injectable for Greeter {}
impl Component for Greeter {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(
      Constructor::new("new", |args| Ok(Greeter { logger: args.take()? })).param::<dyn Logger>("logger"),
    );
  }
}

// --- Disposal bookkeeping ---

/// Shared record of what the container built and released. Registered as an
/// instance so components can reach it through their constructors.
#[derive(Default)]
pub struct Ledger {
  created: AtomicUsize,
  disposed: Mutex<Vec<usize>>,
}

impl Ledger {
  pub fn next_id(&self) -> usize {
    self.created.fetch_add(1, Ordering::SeqCst) + 1
  }

  pub fn created(&self) -> usize {
    self.created.load(Ordering::SeqCst)
  }

  pub fn dispose_id(&self, id: usize) {
    self.disposed.lock().push(id);
  }

  pub fn disposed(&self) -> Vec<usize> {
    self.disposed.lock().clone()
  }
}

/// A disposable component that records its id in the ledger on dispose.
pub struct Connection {
  pub id: usize,
  ledger: Arc<Ledger>,
}

impl Connection {
  pub fn new(ledger: Arc<Ledger>) -> Self {
    Connection {
      id: ledger.next_id(),
      ledger,
    }
  }
}

impl Dispose for Connection {
  fn dispose(&self) {
    self.ledger.disposed.lock().push(self.id);
  }
}
impl Injectable for Connection {}
impl Component for Connection {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(
      Constructor::new("new", |args| Ok(Connection::new(args.take()?))).param::<Ledger>("ledger"),
    );
  }
  fn as_dispose(&self) -> Option<&dyn Dispose> {
    Some(self)
  }
}

/// A second disposable component, to observe disposal order.
pub struct Session {
  pub id: usize,
  ledger: Arc<Ledger>,
}

impl Dispose for Session {
  fn dispose(&self) {
    self.ledger.disposed.lock().push(self.id);
  }
}
impl Injectable for Session {}
impl Component for Session {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(
      Constructor::new("new", |args| {
        let ledger: Arc<Ledger> = args.take()?;
        Ok(Session {
          id: ledger.next_id(),
          ledger,
        })
      })
      .param::<Ledger>("ledger"),
    );
  }
  fn as_dispose(&self) -> Option<&dyn Dispose> {
    Some(self)
  }
}
