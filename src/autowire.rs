//! Type metadata descriptors and the autowiring resolver.
//!
//! Rust has no runtime reflection, so the constructor introspection the
//! container relies on is supplied explicitly: the host registers a
//! [`TypeSpec`] per constructable type, listing its parameters in
//! declaration order together with a construction closure that receives the
//! resolved argument list. The resolver walks those descriptors and decides,
//! per parameter, between container-resolved dependency, pre-registered
//! parameter value, raw binding record, cached instance, alias target, or
//! declared default.

use std::any::Any;
use std::sync::Arc;

use tracing::trace;

use crate::container::Container;
use crate::core::{value, Value};
use crate::error::{Error, Result};

/// Descriptor for a single constructor or callable parameter.
#[derive(Clone)]
pub struct ParamSpec {
  pub(crate) name: String,
  pub(crate) service: Option<String>,
  pub(crate) default: Option<Value>,
}

impl ParamSpec {
  /// A parameter whose declared type names a resolvable service. It is
  /// satisfied by a recursive top-level resolution of that type name, which
  /// always wins over any name-directed lookup.
  pub fn service(name: impl Into<String>, type_name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      service: Some(type_name.into()),
      default: None,
    }
  }

  /// A parameter with a builtin or absent declared type. It is satisfied by
  /// name against the parameter, binding, instance, and alias tables, in
  /// that order.
  pub fn value(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      service: None,
      default: None,
    }
  }

  /// Attaches a declared default, used when every other rule fails.
  pub fn with_default(mut self, default: Value) -> Self {
    self.default = Some(default);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

/// The resolved argument list handed to a construction or invocation
/// closure, in parameter declaration order.
pub struct Args {
  values: Vec<Value>,
}

impl Args {
  pub(crate) fn new(values: Vec<Value>) -> Self {
    Self { values }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// The raw type-erased value at `index`.
  pub fn raw(&self, index: usize) -> &Value {
    &self.values[index]
  }

  /// The argument at `index`, downcast to its concrete type.
  ///
  /// # Panics
  ///
  /// Panics when `index` is out of bounds or the argument is not a `T`.
  /// Either means the closure disagrees with its own parameter descriptors,
  /// which is a wiring bug, not a recoverable condition.
  pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Arc<T> {
    self.values[index]
      .clone()
      .downcast::<T>()
      .unwrap_or_else(|_| {
        panic!(
          "Argument {} is not of type {}",
          index,
          std::any::type_name::<T>()
        )
      })
  }
}

/// Constructor metadata for one constructable type: its name, its ordered
/// parameter descriptors, and the closure that builds an instance from the
/// resolved arguments.
///
/// A type without constructor parameters is simply a `TypeSpec` with no
/// `param` calls.
pub struct TypeSpec {
  pub(crate) name: String,
  pub(crate) params: Vec<ParamSpec>,
  pub(crate) construct: Arc<dyn Fn(&Args) -> Value + Send + Sync>,
}

impl TypeSpec {
  pub fn new(name: impl Into<String>, construct: impl Fn(&Args) -> Value + Send + Sync + 'static) -> Self {
    Self {
      name: name.into(),
      params: Vec::new(),
      construct: Arc::new(construct),
    }
  }

  /// Appends a parameter descriptor. Order of calls is the declaration
  /// order the constructor closure will observe.
  pub fn param(mut self, param: ParamSpec) -> Self {
    self.params.push(param);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

/// A free callable with autowired parameters.
pub struct Callable {
  pub(crate) params: Vec<ParamSpec>,
  pub(crate) func: Box<dyn Fn(&Args) -> Value + Send + Sync>,
}

impl Callable {
  pub fn new(func: impl Fn(&Args) -> Value + Send + Sync + 'static) -> Self {
    Self {
      params: Vec::new(),
      func: Box::new(func),
    }
  }

  pub fn param(mut self, param: ParamSpec) -> Self {
    self.params.push(param);
    self
  }
}

/// A method with autowired parameters, invoked on a container-resolved
/// receiver.
pub struct Method {
  pub(crate) params: Vec<ParamSpec>,
  pub(crate) func: Box<dyn Fn(&Value, &Args) -> Value + Send + Sync>,
}

impl Method {
  pub fn new(func: impl Fn(&Value, &Args) -> Value + Send + Sync + 'static) -> Self {
    Self {
      params: Vec::new(),
      func: Box::new(func),
    }
  }

  pub fn param(mut self, param: ParamSpec) -> Self {
    self.params.push(param);
    self
  }
}

// --- The resolver ---

impl Container {
  pub(crate) fn resolve_type(&self, type_name: &str) -> Result<Value> {
    let spec = match self.types.get(type_name) {
      Some(entry) => Arc::clone(entry.value()),
      None => return Err(Error::NotInstantiable(type_name.to_owned())),
    };
    trace!(type_name, params = spec.params.len(), "autowiring type");
    let args = self.resolve_params(&spec.params, type_name)?;
    Ok((spec.construct)(&args))
  }

  pub(crate) fn resolve_params(&self, params: &[ParamSpec], context: &str) -> Result<Args> {
    let mut values = Vec::with_capacity(params.len());
    for param in params {
      values.push(self.resolve_param(param, context)?);
    }
    Ok(Args::new(values))
  }

  // One constructor parameter, resolved by the precedence: declared service
  // type, then by name against the parameter, binding, instance, and alias
  // tables, then the declared default. First match wins.
  fn resolve_param(&self, param: &ParamSpec, context: &str) -> Result<Value> {
    if let Some(service) = &param.service {
      // A declared service type always wins; its failure is final rather
      // than falling through to the name-directed rules. Cycles keep their
      // own error so the cyclic identifier stays visible.
      return self.get(service).map_err(|err| match err {
        err @ Error::CircularDependency(_) => err,
        other => Error::UnresolvableDependency {
          parameter: param.name.clone(),
          context: context.to_owned(),
          source: Some(Box::new(other)),
        },
      });
    }
    if let Some(entry) = self.parameters.get(&param.name) {
      return Ok(entry.value().clone());
    }
    if let Some(entry) = self.bindings.get(&param.name) {
      // The raw binding record itself, not its resolution. An escape hatch
      // for passing binding metadata as a value.
      return Ok(value(entry.value().clone()));
    }
    if let Some(entry) = self.instances.get(&param.name) {
      return Ok(entry.value().clone());
    }
    if let Some(entry) = self.aliases.get(&param.name) {
      // The alias's target identifier string, not a resolved instance.
      return Ok(value(entry.value().clone()));
    }
    if let Some(default) = &param.default {
      return Ok(default.clone());
    }
    Err(Error::UnresolvableDependency {
      parameter: param.name.clone(),
      context: context.to_owned(),
      source: None,
    })
  }

  /// Resolves the callable's parameters exactly like constructor parameters,
  /// then invokes it with the resulting argument list.
  pub fn call(&self, callable: &Callable) -> Result<Value> {
    let args = self.resolve_params(&callable.params, "callable")?;
    Ok((callable.func)(&args))
  }

  /// Resolves `target` through the container, resolves the method's
  /// parameters, and invokes the method on the resolved receiver.
  pub fn call_method(&self, target: &str, method: &Method) -> Result<Value> {
    let receiver = self.get(target)?;
    let args = self.resolve_params(&method.params, target)?;
    Ok((method.func)(&receiver, &args))
  }
}
