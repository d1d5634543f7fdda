//! The global container instance and access function.

use once_cell::sync::Lazy;

use crate::container::Container;

// The one and only global container instance.
// It will be created on its first access in a thread-safe manner.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(Container::default);

/// Provides a reference to the global container instance.
///
/// This function allows for direct interaction with the container, such as
/// registering services from anywhere in an application. Explicitly
/// constructed containers remain fully isolated from it.
///
/// # Examples
///
/// ```
/// use bindery::{global, value};
///
/// fn register_services() {
///   // Get the global container and register a value.
///   global().instance("motd", value(String::from("Hello from global!")));
/// }
/// ```
pub fn global() -> &'static Container {
  &GLOBAL_CONTAINER
}
