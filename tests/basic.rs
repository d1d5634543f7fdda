use bindery::{value, Concrete, Container, Error, TypeSpec};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- Test Fixtures ---

// A simple struct for testing.
#[derive(Debug, PartialEq, Eq)]
struct SimpleService {
  id: u32,
}

struct Widget {
  label: &'static str,
}

// --- Basic Tests ---

#[test]
fn test_singleton_binding_resolves_once() {
  // Arrange
  let container = Container::new();
  container.singleton(
    "tracker",
    Some(Concrete::factory(|_| Ok(value(SimpleService { id: 101 })))),
  );

  // Act
  let r1 = container.get_as::<SimpleService>("tracker").unwrap();
  let r2 = container.get_as::<SimpleService>("tracker").unwrap();

  // Assert
  assert_eq!(r1.id, 101);
  // Ensure it's a singleton by checking pointer equality.
  assert!(Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_transient_binding_resolves_fresh() {
  // Arrange
  let container = Container::new();
  container.bind(
    "tracker",
    Some(Concrete::factory(|_| Ok(value(SimpleService { id: 303 })))),
    false,
  );

  // Act
  let r1 = container.get_as::<SimpleService>("tracker").unwrap();
  let r2 = container.get_as::<SimpleService>("tracker").unwrap();

  // Assert
  assert_eq!(r1.id, 303);
  assert_eq!(r2.id, 303);
  // Ensure it's a transient by checking the pointers are different.
  assert!(!Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_instance_registration_is_terminal() {
  // Arrange
  let container = Container::new();
  let config = value(SimpleService { id: 202 });
  container.instance("config", config.clone());

  // Act
  let got = container.get("config").unwrap();

  // Assert: the exact registered value comes back.
  assert!(Arc::ptr_eq(&config, &got));
}

#[test]
fn test_self_binding_autowires_the_identifier() {
  // `bind("Widget")` with no concrete behaves as `bind("Widget", "Widget")`.
  let container = Container::new();
  container.register_type(TypeSpec::new("Widget", |_| value(Widget { label: "w1" })));
  container.bind("Widget", None, false);

  let widget = container.get_as::<Widget>("Widget").unwrap();
  assert_eq!(widget.label, "w1");
}

#[test]
fn test_has_covers_every_table() {
  let container = Container::new();
  assert!(!container.has("anything"));

  container.bind(
    "bound",
    Some(Concrete::factory(|_| Ok(value(1_u32)))),
    false,
  );
  container.instance("instanced", value(2_u32));
  container.alias("bound", "aliased").unwrap();
  container.register_type(TypeSpec::new("Constructable", |_| value(3_u32)));

  assert!(container.has("bound"));
  assert!(container.has("instanced"));
  assert!(container.has("aliased"));
  assert!(container.has("Constructable"));
}

#[test]
fn test_get_missing_service_fails() {
  let container = Container::new();

  let err = container.get("ghost").unwrap_err();

  assert!(matches!(err, Error::ServiceNotFound(id) if id == "ghost"));
}

#[test]
fn test_get_as_wrong_type_fails() {
  let container = Container::new();
  container.instance("number", value(7_u32));

  let err = container.get_as::<String>("number").unwrap_err();

  assert!(matches!(err, Error::TypeMismatch(id) if id == "number"));
}

#[test]
fn test_make_is_get() {
  let container = Container::new();
  container.instance("config", value(SimpleService { id: 7 }));

  let a = container.make("config").unwrap();
  let b = container.get("config").unwrap();

  assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_bind_if_keeps_existing_binding() {
  // Arrange
  let container = Container::new();
  container.singleton(
    "service",
    Some(Concrete::factory(|_| Ok(value(SimpleService { id: 1 })))),
  );

  // Act: the second registration must be a no-op.
  container.bind_if(
    "service",
    Some(Concrete::factory(|_| Ok(value(SimpleService { id: 2 })))),
    false,
  );

  // Assert
  let got = container.get_as::<SimpleService>("service").unwrap();
  assert_eq!(got.id, 1);
}

#[test]
fn test_singleton_if_respects_instances() {
  // `has` covers the instance cache, so `singleton_if` must back off for an
  // identifier that only has an instance registered.
  let container = Container::new();
  container.instance("config", value(SimpleService { id: 5 }));

  container.singleton_if(
    "config",
    Some(Concrete::factory(|_| Ok(value(SimpleService { id: 6 })))),
  );

  let got = container.get_as::<SimpleService>("config").unwrap();
  assert_eq!(got.id, 5);
}

// --- Scope Tests ---

#[test]
fn test_scope_reexecutes_callback() {
  // Arrange
  let container = Container::new();
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = calls.clone();
  container
    .scope("request", move |_| {
      Ok(value(counter.fetch_add(1, Ordering::SeqCst)))
    })
    .unwrap();

  // Act
  let first = container.get_scope("request").unwrap();
  let second = container.get_scope("request").unwrap();

  // Assert: every call re-executed the callback, nothing was cached.
  assert_eq!(*first.downcast::<usize>().unwrap(), 0);
  assert_eq!(*second.downcast::<usize>().unwrap(), 1);
  assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_scope_duplicate_registration_fails() {
  let container = Container::new();
  container.scope("request", |_| Ok(value(1_u32))).unwrap();

  let err = container.scope("request", |_| Ok(value(2_u32))).unwrap_err();

  assert!(matches!(err, Error::ScopeAlreadyDefined(name) if name == "request"));
}

#[test]
fn test_scope_if_keeps_first_callback() {
  let container = Container::new();
  container.scope_if("job", |_| Ok(value("first")));
  container.scope_if("job", |_| Ok(value("second")));

  let got = container.get_scope("job").unwrap();

  assert_eq!(*got.downcast::<&str>().unwrap(), "first");
}

#[test]
fn test_get_scope_missing_fails() {
  let container = Container::new();
  assert!(matches!(
    container.get_scope("ghost"),
    Err(Error::ScopeNotFound(_))
  ));
}

// --- Teardown Tests ---

#[test]
fn test_flush_clears_wiring_but_not_scopes() {
  // Arrange
  let container = Container::new();
  container.bind(
    "service",
    Some(Concrete::factory(|_| Ok(value(1_u32)))),
    false,
  );
  container.instance("config", value(2_u32));
  container.alias("service", "svc").unwrap();
  container.set_parameter("retries", value(3_u32));
  container.scope("request", |_| Ok(value(4_u32))).unwrap();

  // Act
  container.flush();

  // Assert: every previously bound/instanced/aliased identifier is gone.
  assert!(!container.has("service"));
  assert!(!container.has("config"));
  assert!(!container.has("svc"));
  // Scope registrations survive a flush.
  let scoped = container.get_scope("request").unwrap();
  assert_eq!(*scoped.downcast::<u32>().unwrap(), 4);
}

#[test]
fn test_flush_keeps_type_descriptors() {
  // Flushing the container does not unload types from the program, so the
  // descriptor registry stays usable afterwards.
  let container = Container::new();
  container.register_type(TypeSpec::new("Widget", |_| value(Widget { label: "w2" })));

  container.flush();

  assert!(container.has("Widget"));
  assert_eq!(container.get_as::<Widget>("Widget").unwrap().label, "w2");
}
