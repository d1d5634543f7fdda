use thiserror::Error;

/// The main error type for the `bindery` container.
///
/// Every variant is a configuration error: it signals an incomplete or
/// inconsistent wiring graph and is meant to surface during development or
/// startup. The container never retries, falls back, or logs on its own;
/// errors propagate unmodified to the caller.
#[derive(Debug, Error)]
pub enum Error {
  /// The named type has no constructor descriptor registered, so it cannot
  /// be autowired.
  #[error("Type '{0}' is not instantiable: no constructor descriptor is registered for it")]
  NotInstantiable(String),

  /// A constructor or callable parameter could not be satisfied: either its
  /// declared service type failed to resolve (the cause is carried as the
  /// source), or no parameter/binding/instance/alias entry exists under its
  /// name and it declares no default.
  #[error("Cannot resolve parameter '{parameter}' while constructing '{context}'")]
  UnresolvableDependency {
    parameter: String,
    context: String,
    #[source]
    source: Option<Box<Error>>,
  },

  /// `get` was called for an identifier with no instance, no binding, and
  /// no registered constructable type.
  #[error("No service registered under '{0}'")]
  ServiceNotFound(String),

  /// `alias` was called for a target that is not resolvable.
  #[error("Alias target '{0}' has no binding and is not a constructable type")]
  AliasTargetMissing(String),

  /// `scope` was called for a name that already has a callback. Scopes do
  /// not overwrite silently, unlike bindings.
  #[error("Scope '{0}' is already defined")]
  ScopeAlreadyDefined(String),

  /// `get_scope` was called for an unregistered scope name.
  #[error("No scope registered under '{0}'")]
  ScopeNotFound(String),

  /// Resolution re-entered an identifier that is already being resolved on
  /// this thread (A needs B needs A).
  #[error("Circular dependency detected while resolving '{0}'")]
  CircularDependency(String),

  /// The stored value for the identifier is not of the requested type.
  #[error("Service '{0}' is not of the requested type")]
  TypeMismatch(String),
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
