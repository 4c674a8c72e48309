// glplatform/src/lib.rs
//
//! A thin, uniform layer over the native OpenGL platforms.
//!
//! Each native platform (GLX on X11, CGL on macOS) is a backend implementing the `Backend` trait.
//! A `Platform<B>` loads the backend's GL library for one GL API; from it you connect a display,
//! choose a config, and create contexts and windows. Native objects are released explicitly
//! through the backend's `*_destroy` methods.
//!
//! With the `capi` feature, the same operations are exported as `extern "C"` functions and
//! per-backend dispatch tables.

pub mod backend;
pub use crate::backend::{Backend, BackendKind};

pub mod config;
pub use crate::config::{ConfigAttributeFlags, ConfigAttributes};

pub mod error;
pub use crate::error::{Error, ErrorCode, WindowingApiError};

mod info;
pub use crate::info::{GLApi, GLProfile, GLVersion};

pub mod library;
pub use crate::library::{Library, LibraryLoader, NativeLibrary, SystemLoader};

pub mod platform;
pub use crate::platform::Platform;

#[cfg(feature = "capi")]
pub mod capi;

#[cfg(test)]
mod tests;
