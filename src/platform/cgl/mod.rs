// glplatform/src/platform/cgl/mod.rs
//
//! The Core OpenGL backend for macOS.
//!
//! CGL only offers desktop OpenGL and has no window system of its own, so windows are
//! unsupported here.

use crate::backend::{Backend, BackendKind};
use crate::config::ConfigAttributes;
use crate::info::GLApi;
use crate::platform::Platform;
use crate::Error;

use euclid::default::Size2D;
use std::os::raw::c_void;

pub mod context;
pub mod display;

mod error;

pub use self::context::{Config, Context};
pub use self::display::Display;

const OPENGL_FRAMEWORK_PATH: &str = "/System/Library/Frameworks/OpenGL.framework/OpenGL";

/// The CGL backend.
#[derive(Clone, Copy, Debug)]
pub struct Cgl;

/// CGL windows cannot be created, so no value of this type exists.
pub enum Window {}

impl Backend for Cgl {
    type Display = Display;
    type Config = Config;
    type Context = Context;
    type Window = Window;

    const KIND: BackendKind = BackendKind::Cgl;

    fn library_name(gl_api: GLApi) -> Result<&'static str, Error> {
        match gl_api {
            GLApi::OpenGL => Ok(OPENGL_FRAMEWORK_PATH),
            api => Err(Error::BadAttribute(format!("CGL does not support {}", api))),
        }
    }

    #[inline]
    fn display_connect(platform: &Platform<Cgl>, name: Option<&str>) -> Result<Display, Error> {
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
        drop(config);
        Ok(())
    }

    #[inline]
    fn context_create(config: &Config, share_with: Option<&Context>) -> Result<Context, Error> {
        Context::create(config, share_with)
    }

    #[inline]
    fn context_destroy(context: Context) -> Result<(), Error> {
        context.destroy()
    }

    fn window_create(_: &Config, _: Size2D<i32>) -> Result<Window, Error> {
        Err(Error::UnsupportedOnThisPlatform)
    }

    fn window_destroy(window: Window) -> Result<(), Error> {
        match window {}
    }

    fn window_swap_buffers(window: &Window) -> Result<(), Error> {
        match *window {}
    }

    fn make_current(_: &Display, window: Option<&Window>, context: Option<&Context>)
                    -> Result<(), Error> {
        if let Some(window) = window {
            match *window {}
        }
        context::make_current(context)
    }

    #[inline]
    fn get_proc_address(platform: &Platform<Cgl>, name: &str) -> *const c_void {
        platform.library().symbol(name)
    }
}
