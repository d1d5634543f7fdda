//! Core data structures shared by the container and the autowiring resolver.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::container::Container;
use crate::error::{Error, Result};

thread_local! {
  // This thread-local variable holds the set of identifiers currently being
  // resolved on this specific thread. This is the key to detecting circular
  // dependencies before they overflow the stack.
  static RESOLVING_STACK: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// The type-erased value currency of the container.
///
/// Everything a binding factory produces, an instance registration stores,
/// or a resolution returns is a `Value`. Use [`value`] to lift a concrete
/// type into one and [`downcast`] (or `Container::get_as`) to get it back.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Lifts a concrete value into the container's type-erased [`Value`].
pub fn value<T: Any + Send + Sync>(v: T) -> Value {
  Arc::new(v)
}

/// Downcasts a [`Value`] to a concrete type, returning `None` when the
/// stored type does not match.
pub fn downcast<T: Any + Send + Sync>(v: &Value) -> Option<Arc<T>> {
  v.clone().downcast::<T>().ok()
}

/// A binding factory: takes the container, returns a value.
pub type FactoryFn = Arc<dyn Fn(&Container) -> Result<Value> + Send + Sync>;

/// A scope callback, evaluated fresh on every `get_scope` call.
pub type ScopeFn = Arc<dyn Fn(&Container) -> Result<Value> + Send + Sync>;

/// The construction strategy of a binding: either a factory closure or the
/// name of a type to autowire.
#[derive(Clone)]
pub enum Concrete {
  Factory(FactoryFn),
  TypeName(String),
}

impl Concrete {
  /// Wraps a factory closure. The factory receives the container so it can
  /// resolve nested dependencies, and propagates their failures with `?`.
  pub fn factory(f: impl Fn(&Container) -> Result<Value> + Send + Sync + 'static) -> Self {
    Concrete::Factory(Arc::new(f))
  }

  /// Names a type to be autowired through its registered descriptor.
  pub fn type_name(name: impl Into<String>) -> Self {
    Concrete::TypeName(name.into())
  }
}

impl fmt::Debug for Concrete {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Concrete::Factory(_) => write!(f, "Concrete::Factory"),
      Concrete::TypeName(name) => write!(f, "Concrete::TypeName({})", name),
    }
  }
}

/// A registered construction strategy plus its singleton flag.
///
/// Singleton bindings carry a shared cell so that a lazy initialization
/// racing across threads runs the factory exactly once. Rebinding replaces
/// the whole record, which starts the next resolution from a fresh cell.
#[derive(Clone)]
pub struct Binding {
  concrete: Concrete,
  singleton: bool,
  cell: Arc<OnceCell<Value>>,
}

impl Binding {
  pub(crate) fn new(concrete: Concrete, singleton: bool) -> Self {
    Self {
      concrete,
      singleton,
      cell: Arc::new(OnceCell::new()),
    }
  }

  pub fn concrete(&self) -> &Concrete {
    &self.concrete
  }

  pub fn is_singleton(&self) -> bool {
    self.singleton
  }

  pub(crate) fn cell(&self) -> &OnceCell<Value> {
    &self.cell
  }
}

impl fmt::Debug for Binding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Binding")
      .field("concrete", &self.concrete)
      .field("singleton", &self.singleton)
      .field("produced", &self.cell.get().is_some())
      .finish()
  }
}

/// An RAII guard over the thread-local resolution stack.
///
/// When created, it adds an identifier to the set of services currently
/// being resolved on this thread. If the identifier is already present the
/// graph is cyclic, and `enter` fails with `CircularDependency` instead of
/// letting the recursion overflow the stack. Dropping the guard removes the
/// identifier again.
pub(crate) struct ResolutionGuard {
  key: String,
}

impl ResolutionGuard {
  pub(crate) fn enter(key: &str) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      // `insert` returns `false` if the value was already present.
      if stack.borrow_mut().insert(key.to_owned()) {
        Ok(())
      } else {
        Err(Error::CircularDependency(key.to_owned()))
      }
    })?;
    Ok(Self { key: key.to_owned() })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().remove(&self.key);
    });
  }
}
