// glplatform/src/platform/glx/window.rs
//
//! X11 windows that GLX contexts can render to.

use crate::{Error, WindowingApiError};
use super::config::Config;
use super::display::OwnedDisplay;
use super::error::{self, ErrorTrap};
use super::ffi::X_BAD_ALLOC;

use euclid::default::Size2D;
use std::mem;
use std::os::raw::{c_uint, c_ulong};
use std::rc::Rc;
use std::thread;
use x11_dl::xlib::{self, Colormap, XSetWindowAttributes};

/// An unmapped X window created with a config's visual.
///
/// A window must be explicitly destroyed with `Glx::window_destroy()`, or a panic will occur.
pub struct Window {
    pub(crate) native_display: Rc<OwnedDisplay>,
    pub(crate) x_window: xlib::Window,
    colormap: Colormap,
    size: Size2D<i32>,
}

impl Drop for Window {
    #[inline]
    fn drop(&mut self) {
        if self.x_window != 0 && !thread::panicking() {
            panic!("Windows must be destroyed explicitly with `window_destroy`!")
        }
    }
}

impl Window {
    pub(crate) fn create(config: &Config, size: Size2D<i32>) -> Result<Window, Error> {
        if size.width <= 0 || size.height <= 0 {
            return Err(Error::BadParameter(format!("window size {}x{} is not positive",
                                                   size.width,
                                                   size.height)));
        }

        let native_display = &config.native_display;
        let xlib = &native_display.xlib;
        let x_display = native_display.x_display;

        unsafe {
            let error_trap = ErrorTrap::new(xlib, x_display);

            let root_window = (xlib.XRootWindow)(x_display, native_display.screen);
            let colormap = (xlib.XCreateColormap)(x_display,
                                                  root_window,
                                                  config.visual,
                                                  xlib::AllocNone);

            let mut window_attributes: XSetWindowAttributes = mem::zeroed();
            window_attributes.colormap = colormap;
            window_attributes.border_pixel = 0;
            window_attributes.event_mask = xlib::ExposureMask | xlib::StructureNotifyMask |
                xlib::KeyPressMask;
            let mask: c_ulong = xlib::CWBorderPixel | xlib::CWColormap | xlib::CWEventMask;

            let x_window = (xlib.XCreateWindow)(x_display,
                                                root_window,
                                                0,
                                                0,
                                                size.width as c_uint,
                                                size.height as c_uint,
                                                0,
                                                config.depth,
                                                xlib::InputOutput as c_uint,
                                                config.visual,
                                                mask,
                                                &mut window_attributes);

            if let Some(x_error) = error_trap.finish() {
                if x_window != 0 {
                    (xlib.XDestroyWindow)(x_display, x_window);
                }
                (xlib.XFreeColormap)(x_display, colormap);
                if x_error == X_BAD_ALLOC {
                    return Err(Error::OutOfMemory);
                }
                let windowing_api_error =
                    error::xlib_error_to_windowing_api_error(xlib, x_display, x_error);
                return Err(Error::SurfaceCreationFailed(windowing_api_error));
            }
            if x_window == 0 {
                (xlib.XFreeColormap)(x_display, colormap);
                return Err(Error::SurfaceCreationFailed(WindowingApiError::Failed));
            }

            log::debug!("created {}x{} X window {:#x}", size.width, size.height, x_window);
            Ok(Window { native_display: native_display.clone(), x_window, colormap, size })
        }
    }

    pub(crate) fn destroy(mut self) -> Result<(), Error> {
        let x_window = mem::replace(&mut self.x_window, 0);
        let native_display = &self.native_display;
        unsafe {
            let error_trap = ErrorTrap::new(&native_display.xlib, native_display.x_display);
            (native_display.xlib.XDestroyWindow)(native_display.x_display, x_window);
            (native_display.xlib.XFreeColormap)(native_display.x_display, self.colormap);
            if let Some(x_error) = error_trap.finish() {
                let windowing_api_error =
                    error::xlib_error_to_windowing_api_error(&native_display.xlib,
                                                             native_display.x_display,
                                                             x_error);
                return Err(Error::Unknown(format!("failed to destroy X window {:#x}: {:?}",
                                                  x_window,
                                                  windowing_api_error)));
            }
        }
        Ok(())
    }

    pub(crate) fn swap_buffers(&self) -> Result<(), Error> {
        let native_display = &self.native_display;
        unsafe {
            let error_trap = ErrorTrap::new(&native_display.xlib, native_display.x_display);
            native_display.glx.SwapBuffers(native_display.glx_display(), self.x_window);
            if let Some(x_error) = error_trap.finish() {
                let windowing_api_error =
                    error::xlib_error_to_windowing_api_error(&native_display.xlib,
                                                             native_display.x_display,
                                                             x_error);
                return Err(Error::Unknown(format!("glXSwapBuffers failed: {:?}",
                                                  windowing_api_error)));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> Size2D<i32> {
        self.size
    }

    /// Returns the X window ID.
    #[inline]
    pub fn x_window(&self) -> xlib::Window {
        self.x_window
    }
}
