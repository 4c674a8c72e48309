// glplatform/src/backend.rs
//
//! The abstract interface that all backends conform to.
//!
//! An implementation of `Backend` is the dispatch table of one native platform. It is chosen
//! when a `Platform` is created, by type, and never changes afterward.

use crate::config::ConfigAttributes;
use crate::info::GLApi;
use crate::platform::Platform;
use crate::Error;

use euclid::default::Size2D;
use std::os::raw::c_void;

/// Identifies a backend at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Glx,
    Cgl,
}

impl BackendKind {
    pub const RAW_GLX: i32 = 0x0014;
    pub const RAW_CGL: i32 = 0x0015;

    /// Converts a raw backend code received through the C interface.
    pub fn from_raw(raw: i32) -> Result<BackendKind, Error> {
        match raw {
            BackendKind::RAW_GLX => Ok(BackendKind::Glx),
            BackendKind::RAW_CGL => Ok(BackendKind::Cgl),
            _ => Err(Error::Internal(format!("platform has bad value {:#x}", raw))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Glx => "GLX",
            BackendKind::Cgl => "CGL",
        }
    }
}

/// The operations every native platform provides.
pub trait Backend: Sized + 'static {
    /// A connection to the native windowing system.
    type Display;
    /// A framebuffer configuration.
    type Config;
    /// An OpenGL rendering context.
    type Context;
    /// A native window that can be rendered to.
    type Window;

    const KIND: BackendKind;

    /// Returns the native GL library that serves `gl_api`.
    ///
    /// Fails with `Error::BadAttribute` if this backend does not support `gl_api`.
    fn library_name(gl_api: GLApi) -> Result<&'static str, Error>;

    /// Connects to the windowing system. `name` is backend-specific and may be ignored.
    fn display_connect(platform: &Platform<Self>, name: Option<&str>)
                       -> Result<Self::Display, Error>;

    /// Releases a display connection.
    fn display_disconnect(display: Self::Display) -> Result<(), Error>;

    /// Returns true if contexts of `api` can be created on `display`. Has no side effects.
    fn display_supports_context_api(display: &Self::Display, api: GLApi) -> bool;

    fn config_choose(display: &Self::Display, attributes: &ConfigAttributes)
                     -> Result<Self::Config, Error>;

    fn config_destroy(config: Self::Config) -> Result<(), Error>;

    fn context_create(config: &Self::Config, share_with: Option<&Self::Context>)
                      -> Result<Self::Context, Error>;

    fn context_destroy(context: Self::Context) -> Result<(), Error>;

    fn window_create(config: &Self::Config, size: Size2D<i32>) -> Result<Self::Window, Error>;

    fn window_destroy(window: Self::Window) -> Result<(), Error>;

    fn window_swap_buffers(window: &Self::Window) -> Result<(), Error>;

    /// Binds `context` and `window` to the calling thread. Passing `None` for both releases the
    /// current context.
    fn make_current(display: &Self::Display,
                    window: Option<&Self::Window>,
                    context: Option<&Self::Context>)
                    -> Result<(), Error>;

    /// Looks up a GL entry point through the windowing system.
    fn get_proc_address(platform: &Platform<Self>, name: &str) -> *const c_void;

    /// Looks up a symbol directly in the loaded GL library.
    #[inline]
    fn dlsym_gl(platform: &Platform<Self>, name: &str) -> *const c_void {
        platform.library().symbol(name)
    }
}
