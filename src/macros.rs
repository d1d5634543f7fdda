//! Public macros for ergonomic service resolution.

/// Resolves a service from the global container.
///
/// This macro panics if the requested service cannot be resolved, ensuring
/// that all required dependencies are present at runtime. For a
/// non-panicking version, use `global().get(...)` or `global().get_as(...)`
/// directly.
///
/// # Panics
///
/// Panics when resolution fails for any reason: missing service, missing
/// dependency, circular graph, or type mismatch.
///
/// # Examples
///
/// ```
/// use bindery::{global, resolve, value};
///
/// // Register a simple value
/// global().instance("motd_message", value(String::from("hello")));
///
/// // Resolve it, downcast to the expected type
/// let message = resolve!(String, "motd_message");
/// assert_eq!(*message, "hello");
/// ```
///
/// ```
/// use bindery::{global, resolve, value};
///
/// global().instance("raw_value", value(42_u32));
///
/// // The untyped arm yields the type-erased `Value`.
/// let raw = resolve!("raw_value");
/// assert_eq!(*raw.downcast::<u32>().unwrap(), 42);
/// ```
#[macro_export]
macro_rules! resolve {
  // Arm for resolving the type-erased value: resolve!("id")
  ($id:expr) => {
    $crate::global().get($id).unwrap_or_else(|err| {
      panic!("Failed to resolve required service '{}': {}", $id, err)
    })
  };

  // Arm for resolving and downcasting: resolve!(MyService, "id")
  ($type:ty, $id:expr) => {
    $crate::global().get_as::<$type>($id).unwrap_or_else(|err| {
      panic!("Failed to resolve required service '{}': {}", $id, err)
    })
  };
}
