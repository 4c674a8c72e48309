// glplatform/src/platform/glx/mod.rs
//
//! The GLX backend for X11, which loads `libGL.so.1`.

use crate::backend::{Backend, BackendKind};
use crate::config::ConfigAttributes;
use crate::info::GLApi;
use crate::platform::Platform;
use crate::Error;

use euclid::default::Size2D;
use std::os::raw::c_void;

pub mod config;
pub mod context;
pub mod display;
pub mod window;

mod error;
mod ffi;

pub use self::config::Config;
pub use self::context::Context;
pub use self::display::{Display, GlxExtensions};
pub use self::window::Window;

const LIBGL_NAME: &str = "libGL.so.1";

/// The GLX backend.
#[derive(Clone, Copy, Debug)]
pub struct Glx;

impl Backend for Glx {
    type Display = Display;
    type Config = Config;
    type Context = Context;
    type Window = Window;

    const KIND: BackendKind = BackendKind::Glx;

    fn library_name(gl_api: GLApi) -> Result<&'static str, Error> {
        match gl_api {
            GLApi::OpenGL => Ok(LIBGL_NAME),
            api => Err(Error::BadAttribute(format!("GLX does not support {}", api))),
        }
    }

    #[inline]
    fn display_connect(platform: &Platform<Glx>, name: Option<&str>) -> Result<Display, Error> {
        Display::connect(platform, name)
    }

    #[inline]
    fn display_disconnect(display: Display) -> Result<(), Error> {
        display.disconnect()
    }

    #[inline]
    fn display_supports_context_api(display: &Display, api: GLApi) -> bool {
        display.supports_context_api(api)
    }

    #[inline]
    fn config_choose(display: &Display, attributes: &ConfigAttributes) -> Result<Config, Error> {
        Config::choose(display, attributes)
    }

    #[inline]
    fn config_destroy(config: Config) -> Result<(), Error> {
        config.destroy()
    }

    #[inline]
    fn context_create(config: &Config, share_with: Option<&Context>) -> Result<Context, Error> {
        Context::create(config, share_with)
    }

    #[inline]
    fn context_destroy(context: Context) -> Result<(), Error> {
        context.destroy()
    }

    #[inline]
    fn window_create(config: &Config, size: Size2D<i32>) -> Result<Window, Error> {
        Window::create(config, size)
    }

    #[inline]
    fn window_destroy(window: Window) -> Result<(), Error> {
        window.destroy()
    }

    #[inline]
    fn window_swap_buffers(window: &Window) -> Result<(), Error> {
        window.swap_buffers()
    }

    #[inline]
    fn make_current(display: &Display, window: Option<&Window>, context: Option<&Context>)
                    -> Result<(), Error> {
        context::make_current(display, window, context)
    }

    #[inline]
    fn get_proc_address(platform: &Platform<Glx>, name: &str) -> *const c_void {
        display::get_proc_address(platform.library(), name)
    }
}
