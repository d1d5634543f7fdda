//! The main `Container` struct and its associated methods.

use std::any::Any;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use tracing::{debug, trace};

use crate::autowire::TypeSpec;
use crate::core::{Binding, Concrete, ResolutionGuard, ScopeFn, Value};
use crate::error::{Error, Result};

/// The Inversion of Control (IoC) container.
///
/// The container maps string service identifiers to construction strategies,
/// resolves object graphs by walking registered constructor descriptors, and
/// caches singleton instances. It is thread-safe; the intended lifecycle is
/// a wiring phase that registers bindings, instances, aliases, and
/// parameters, followed by a burst of resolutions. Rebinding after
/// resolution is supported and invalidates the affected cached instances,
/// but concurrent rebinding and resolution of the same identifier is the
/// caller's race to avoid.
#[derive(Default)]
pub struct Container {
  pub(crate) bindings: DashMap<String, Binding>,
  pub(crate) instances: DashMap<String, Value>,
  pub(crate) aliases: DashMap<String, String>,
  pub(crate) parameters: DashMap<String, Value>,
  pub(crate) scopes: DashMap<String, ScopeFn>,
  pub(crate) types: DashMap<String, Arc<TypeSpec>>,
  pub(crate) resolved: DashSet<String>,
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- Registration ---

  /// Registers (or rebinds) a construction strategy for `id`.
  ///
  /// When `concrete` is `None` the identifier binds to itself, autowiring
  /// the type of the same name. If `id` has already been resolved, the
  /// cached instance of `id` and of every alias pointing at `id` is
  /// invalidated so the next resolution reflects the new binding.
  pub fn bind(&self, id: &str, concrete: Option<Concrete>, singleton: bool) {
    let concrete = concrete.unwrap_or_else(|| Concrete::TypeName(id.to_owned()));
    if self.resolved.contains(id) {
      debug!(id, singleton, "rebinding previously resolved service");
      self.forget_instances_of(id);
    } else {
      debug!(id, singleton, "binding registered");
    }
    self
      .bindings
      .insert(id.to_owned(), Binding::new(concrete, singleton));
  }

  /// As [`bind`](Container::bind), but a no-op when `has(id)` is already
  /// true. Guards against idempotent setup code running twice.
  pub fn bind_if(&self, id: &str, concrete: Option<Concrete>, singleton: bool) {
    if !self.has(id) {
      self.bind(id, concrete, singleton);
    }
  }

  /// Shorthand for [`bind`](Container::bind) with the singleton flag set.
  pub fn singleton(&self, id: &str, concrete: Option<Concrete>) {
    self.bind(id, concrete, true);
  }

  /// As [`singleton`](Container::singleton), but a no-op when `has(id)` is
  /// already true.
  pub fn singleton_if(&self, id: &str, concrete: Option<Concrete>) {
    self.bind_if(id, concrete, true);
  }

  /// Places an already-produced value directly into the instance cache,
  /// bypassing the binding table, and marks `id` resolved.
  ///
  /// The value is also propagated under every alias of `id` that already
  /// exists, so an alias created before `instance()` still observes it;
  /// aliases created afterwards observe it through redirection instead.
  pub fn instance(&self, id: &str, instance: Value) {
    for entry in self.aliases.iter() {
      if entry.value() == id {
        self.instances.insert(entry.key().clone(), instance.clone());
      }
    }
    self.instances.insert(id.to_owned(), instance);
    self.resolved.insert(id.to_owned());
    debug!(id, "instance registered");
  }

  /// Registers `alias_name` as a secondary identifier redirecting to `id`.
  ///
  /// Fails with `AliasTargetMissing` unless `id` already has a binding, a
  /// cached instance, or a registered constructable type. Creating an alias
  /// never triggers resolution.
  pub fn alias(&self, id: &str, alias_name: &str) -> Result<()> {
    if !self.bindings.contains_key(id)
      && !self.instances.contains_key(id)
      && !self.types.contains_key(id)
    {
      return Err(Error::AliasTargetMissing(id.to_owned()));
    }
    self.aliases.insert(alias_name.to_owned(), id.to_owned());
    debug!(id, alias = alias_name, "alias registered");
    Ok(())
  }

  /// Stores a named value used as a constructor-parameter fallback.
  pub fn set_parameter(&self, name: &str, value: Value) {
    self.parameters.insert(name.to_owned(), value);
  }

  /// Registers the constructor descriptor for a constructable type, making
  /// it available to autowiring. Descriptors are the compiled-target
  /// substitute for runtime reflection and survive [`flush`](Container::flush).
  pub fn register_type(&self, spec: TypeSpec) {
    self.types.insert(spec.name().to_owned(), Arc::new(spec));
  }

  // --- Scopes ---

  /// Registers a named on-demand factory, independent of the binding and
  /// singleton machinery. Fails with `ScopeAlreadyDefined` on duplicate
  /// registration; scopes do not overwrite silently.
  pub fn scope(
    &self,
    name: &str,
    callback: impl Fn(&Container) -> Result<Value> + Send + Sync + 'static,
  ) -> Result<()> {
    match self.scopes.entry(name.to_owned()) {
      Entry::Occupied(_) => Err(Error::ScopeAlreadyDefined(name.to_owned())),
      Entry::Vacant(slot) => {
        slot.insert(Arc::new(callback));
        debug!(name, "scope registered");
        Ok(())
      }
    }
  }

  /// As [`scope`](Container::scope), but a no-op when the name is already
  /// registered.
  pub fn scope_if(
    &self,
    name: &str,
    callback: impl Fn(&Container) -> Result<Value> + Send + Sync + 'static,
  ) {
    self
      .scopes
      .entry(name.to_owned())
      .or_insert_with(|| Arc::new(callback));
  }

  /// Invokes the named scope callback and returns its result, uncached.
  /// Every call re-executes the callback.
  pub fn get_scope(&self, name: &str) -> Result<Value> {
    let callback = match self.scopes.get(name) {
      Some(entry) => Arc::clone(entry.value()),
      None => return Err(Error::ScopeNotFound(name.to_owned())),
    };
    callback(self)
  }

  // --- Resolution ---

  /// Resolves a service from the container.
  ///
  /// Aliases are substituted first. A cached instance is the terminal
  /// answer; otherwise the binding is resolved (and cached when it is a
  /// singleton); otherwise an identifier naming a registered constructable
  /// type is autowired fresh, without caching.
  pub fn get(&self, id: &str) -> Result<Value> {
    let eid = self.canonical(id);
    let _guard = ResolutionGuard::enter(&eid)?;

    if let Some(existing) = self.instances.get(&eid) {
      return Ok(existing.value().clone());
    }

    // Clone the binding out so no map reference is held across the
    // recursive resolution of its dependencies.
    let binding = self.bindings.get(&eid).map(|entry| entry.value().clone());
    if let Some(binding) = binding {
      return self.resolve_binding(&eid, &binding);
    }

    if self.types.contains_key(&eid) {
      return self.resolve_type(&eid);
    }

    Err(Error::ServiceNotFound(eid))
  }

  /// Alias for [`get`](Container::get).
  pub fn make(&self, id: &str) -> Result<Value> {
    self.get(id)
  }

  /// Resolves a service and downcasts it to `T`, failing with
  /// `TypeMismatch` when the stored value is of a different type.
  pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
    self
      .get(id)?
      .downcast::<T>()
      .map_err(|_| Error::TypeMismatch(id.to_owned()))
  }

  /// True when an instance, a binding, an alias, or a registered
  /// constructable type exists for `id`.
  pub fn has(&self, id: &str) -> bool {
    self.instances.contains_key(id)
      || self.bindings.contains_key(id)
      || self.aliases.contains_key(id)
      || self.types.contains_key(id)
  }

  // --- Teardown ---

  /// Clears the binding, instance, alias, and parameter tables along with
  /// the resolved flags. Scope registrations and type descriptors survive a
  /// flush: scopes are deliberate long-lived wiring, and flushing the
  /// container does not unload types from the program.
  pub fn flush(&self) {
    self.bindings.clear();
    self.instances.clear();
    self.aliases.clear();
    self.parameters.clear();
    self.resolved.clear();
    debug!("container flushed");
  }

  // --- PRIVATE HELPERS ---

  fn resolve_binding(&self, eid: &str, binding: &Binding) -> Result<Value> {
    let produced = if binding.is_singleton() {
      // The shared cell makes racing lazy initializations run the factory
      // exactly once; the instance cache stays the source of truth for
      // subsequent lookups.
      let produced = binding
        .cell()
        .get_or_try_init(|| self.resolve_concrete(binding.concrete()))?
        .clone();
      self.instances.insert(eid.to_owned(), produced.clone());
      produced
    } else {
      self.resolve_concrete(binding.concrete())?
    };
    self.resolved.insert(eid.to_owned());
    trace!(id = eid, singleton = binding.is_singleton(), "binding resolved");
    Ok(produced)
  }

  fn resolve_concrete(&self, concrete: &Concrete) -> Result<Value> {
    match concrete {
      Concrete::Factory(factory) => factory(self),
      Concrete::TypeName(name) => self.resolve_type(name),
    }
  }

  // Single-hop alias substitution, performed at the start of every
  // top-level lookup.
  fn canonical(&self, id: &str) -> String {
    match self.aliases.get(id) {
      Some(entry) => entry.value().clone(),
      None => id.to_owned(),
    }
  }

  // Rebind invalidation: drop the cached instance of `id` and of every
  // alias pointing at `id`, and clear the resolved flag.
  fn forget_instances_of(&self, id: &str) {
    self.instances.remove(id);
    self.resolved.remove(id);
    for entry in self.aliases.iter() {
      if entry.value() == id {
        self.instances.remove(entry.key());
      }
    }
  }
}
