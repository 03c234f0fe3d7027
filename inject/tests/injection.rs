mod common;

use common::*;
use fibre_inject::{
  Component, Constructor, Constructors, Container, Error, Injectable, InjectionPoints,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

// --- Test Fixtures ---

#[derive(Default)]
struct Form {
  id: u32,
  logger: Option<Arc<dyn Logger>>,
  // Not an injection point, even though a `String` is registered.
  title: Option<Arc<String>>,
}

impl Injectable for Form {
  fn injection_points(points: &mut InjectionPoints<Self>) {
    points.member::<dyn Logger>("logger", |form, logger| form.logger = Some(logger));
  }
}

#[derive(Default)]
struct Timed {
  clock: Option<Arc<dyn Clock>>,
}

impl Injectable for Timed {
  fn injection_points(points: &mut InjectionPoints<Self>) {
    points.member::<dyn Clock>("clock", |timed, clock| timed.clock = Some(clock));
  }
}

/// Records the order its members are assigned in.
#[derive(Default)]
struct Ordered {
  order: Vec<&'static str>,
}

impl Injectable for Ordered {
  fn injection_points(points: &mut InjectionPoints<Self>) {
    points
      .member::<u8>("first", |ordered, _| ordered.order.push("first"))
      .member::<u16>("second", |ordered, _| ordered.order.push("second"))
      .member::<u32>("third", |ordered, _| ordered.order.push("third"));
  }
}

#[derive(Default)]
struct Page {
  base: Timed,
  widget: Option<Arc<Widget>>,
}

impl Injectable for Page {
  fn injection_points(points: &mut InjectionPoints<Self>) {
    points
      .embed(|page| &mut page.base)
      .component::<Widget>("widget", |page, widget| page.widget = Some(widget));
  }
}

/// A component whose members are filled right after its constructor runs.
struct Panel {
  logger: Arc<dyn Logger>,
  clock: Option<Arc<dyn Clock>>,
}

impl Injectable for Panel {
  fn injection_points(points: &mut InjectionPoints<Self>) {
    points.member::<dyn Clock>("clock", |panel, clock| panel.clock = Some(clock));
  }
}

impl Component for Panel {
  fn constructors(constructors: &mut Constructors<Self>) {
    constructors.add(
      Constructor::new("new", |args| {
        Ok(Panel {
          logger: args.take()?,
          clock: None,
        })
      })
      .param::<dyn Logger>("logger"),
    );
  }
}

// --- Member Injection ---

#[test]
fn test_only_marked_members_are_populated() {
  // Arrange
  let container = Container::new();
  container.register::<dyn Logger, ConsoleLogger>();
  container.register_instance(Arc::new("title".to_string()));
  let form = Form {
    id: 12,
    ..Form::default()
  };

  // Act
  let form = container.inject_dependencies_into(form).unwrap();

  // Assert
  assert_eq!(form.id, 12);
  assert_eq!(form.logger.as_ref().unwrap().log("m"), "[console] m");
  assert!(form.title.is_none());
}

#[test]
fn test_injected_members_share_singletons() {
  // Arrange
  let container = Container::new();
  container.register::<dyn Logger, ConsoleLogger>();

  // Act
  let form = container.inject_dependencies_into(Form::default()).unwrap();
  let logger = container.resolve::<dyn Logger>().unwrap();

  // Assert
  assert!(Arc::ptr_eq(form.logger.as_ref().unwrap(), &logger));
}

#[test]
fn test_failure_names_the_member_and_target() {
  // Arrange
  let container = Container::new();

  // Act
  let err = container.inject_dependencies_into(Timed::default()).err().unwrap();

  // Assert
  match &err {
    Error::Injection {
      target,
      member,
      source,
    } => {
      assert!(target.ends_with("Timed"));
      assert_eq!(*member, "clock");
      assert!(source.is_unresolvable());
    }
    other => panic!("unexpected error: {:?}", other),
  }
  assert!(err.to_string().contains("`clock`"), "{}", err);
}

#[test]
fn test_members_are_injected_in_declaration_order() {
  // Arrange
  let container = Container::new();
  container.register_instance(Arc::new(1_u8));
  container.register_instance(Arc::new(2_u16));
  container.register_instance(Arc::new(3_u32));

  // Act
  let ordered = container.inject_dependencies_into(Ordered::default()).unwrap();

  // Assert
  assert_eq!(ordered.order, vec!["first", "second", "third"]);
}

#[test]
fn test_embedded_members_are_injected() {
  // Arrange
  let container = Container::new();
  container.register_instance::<dyn Clock>(Arc::new(FixedClock(5)));

  // Act
  let page = container.inject_dependencies_into(Page::default()).unwrap();

  // Assert
  assert_eq!(page.base.clock.as_ref().unwrap().now(), 5);
  let widget = container.resolve_component::<Widget>().unwrap();
  assert!(Arc::ptr_eq(page.widget.as_ref().unwrap(), &widget));
}

#[test]
fn test_constructed_components_get_their_members_injected() {
  // Arrange
  let container = Container::new();
  container.register::<dyn Logger, FileLogger>();
  container.register_instance::<dyn Clock>(Arc::new(FixedClock(11)));

  // Act
  let panel = container.resolve_component::<Panel>().unwrap();

  // Assert
  assert_eq!(panel.logger.log("p"), "[file] p");
  assert_eq!(panel.clock.as_ref().unwrap().now(), 11);
}

#[test]
fn test_unresolvable_member_makes_the_component_unresolvable() {
  // Arrange
  let container = Container::new();
  container.register::<dyn Logger, FileLogger>();

  // Act
  let can = container.can_resolve_component::<Panel>();
  let result = container.resolve_component::<Panel>();

  // Assert
  assert!(!can);
  assert!(matches!(result, Err(Error::Injection { member: "clock", .. })));
}

#[test]
fn test_injection_into_a_disposed_container_fails() {
  // Arrange
  let container = Container::new();
  container.dispose();

  // Act
  let result = container.inject_dependencies_into(Ordered::default());

  // Assert
  assert!(matches!(result, Err(Error::Disposed)));
}
