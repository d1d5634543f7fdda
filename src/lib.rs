//! # Bindery
//!
//! A dynamic, string-keyed Inversion of Control (IoC) container for Rust.
//!
//! Bindery maps abstract service identifiers to construction strategies,
//! resolves object graphs by walking registered constructor descriptors,
//! and caches singleton instances. Registration is dynamic: bindings,
//! instances, aliases, and parameters can be added at any point during the
//! application's lifecycle, and rebinding an already-resolved identifier
//! invalidates its cached instance.
//!
//! ## Core Concepts
//!
//! - **Container**: the central registry for all your services.
//! - **Binding**: a construction strategy, either a factory closure or the
//!   name of a type to autowire, plus a singleton flag.
//! - **Autowiring**: constructor parameters are resolved from registered
//!   [`TypeSpec`] descriptors, recursively resolving declared service types
//!   and falling back to named parameters, defaults, and a few escape
//!   hatches in a fixed precedence order.
//! - **Alias**: a secondary identifier transparently redirecting to a
//!   canonical one.
//! - **Scope**: a named, uncached, on-demand factory distinct from the
//!   binding machinery.
//! - **Global container**: a static, process-wide container, accessible via
//!   [`global()`]; services can be resolved from it with the [`resolve!`]
//!   macro, which panics if a dependency is missing.
//!
//! ## Quick Start
//!
//! ```
//! use bindery::{value, Concrete, Container, ParamSpec, TypeSpec};
//! use std::sync::Arc;
//!
//! struct Logger {
//!   level: String,
//! }
//!
//! struct Mailer {
//!   logger: Arc<Logger>,
//! }
//!
//! let container = Container::new();
//!
//! // Bind a singleton through a factory.
//! container.singleton(
//!   "Logger",
//!   Some(Concrete::factory(|_| Ok(value(Logger { level: "info".into() })))),
//! );
//!
//! // Describe how `Mailer` is constructed, then bind it to itself.
//! container.register_type(
//!   TypeSpec::new("Mailer", |args| {
//!     value(Mailer { logger: args.get::<Logger>(0) })
//!   })
//!   .param(ParamSpec::service("logger", "Logger")),
//! );
//! container.bind("Mailer", None, false);
//!
//! let mailer = container.get_as::<Mailer>("Mailer").unwrap();
//! let logger = container.get_as::<Logger>("Logger").unwrap();
//!
//! // The mailer was autowired against the same singleton logger.
//! assert!(Arc::ptr_eq(&mailer.logger, &logger));
//! assert_eq!(mailer.logger.level, "info");
//! ```

mod autowire;
mod container;
mod core;
mod error;
mod global;
mod macros;

pub use autowire::{Args, Callable, Method, ParamSpec, TypeSpec};
pub use container::Container;
pub use self::core::{downcast, value, Binding, Concrete, FactoryFn, ScopeFn, Value};
pub use error::{Error, Result};
pub use global::global;
