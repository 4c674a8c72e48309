// glplatform/src/platform/glx/display.rs
//
//! A wrapper for X11 server connections (`DISPLAY` variables).

use crate::info::GLApi;
use crate::library::Library;
use crate::platform::Platform;
use crate::Error;
use super::config;
use super::ffi::glx::Glx as GlxFunctions;
use super::Glx;

use bitflags::bitflags;
use std::ffi::{CStr, CString};
use std::mem;
use std::os::raw::{c_int, c_void};
use std::ptr;
use std::rc::Rc;
use x11_dl::xlib::{self, Xlib};

/// A connection to an X server, with the GLX entry points resolved for it.
///
/// Configs, contexts and windows share the connection; it is closed when the display and all of
/// them have been released.
pub struct Display {
    pub(crate) native_display: Rc<OwnedDisplay>,
}

bitflags! {
    /// GLX extensions that change how contexts are created.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct GlxExtensions: u8 {
        const CREATE_CONTEXT         = 0x01;
        const CREATE_CONTEXT_PROFILE = 0x02;
    }
}

pub(crate) struct OwnedDisplay {
    pub(crate) xlib: Xlib,
    pub(crate) glx: GlxFunctions,
    pub(crate) x_display: *mut xlib::Display,
    pub(crate) screen: c_int,
    pub(crate) gl_api: GLApi,
    pub(crate) extensions: GlxExtensions,
    // Keeps the GLX entry points above alive.
    _library: Rc<Library>,
}

impl Display {
    pub(crate) fn connect(platform: &Platform<Glx>, name: Option<&str>) -> Result<Display, Error> {
        let name = match name.map(CString::new).transpose() {
            Ok(name) => name,
            Err(_) => {
                return Err(Error::BadParameter("display name contains a NUL".to_owned()))
            }
        };

        let xlib = match Xlib::open() {
            Ok(xlib) => xlib,
            Err(err) => return Err(Error::Unknown(format!("failed to load Xlib: {}", err))),
        };

        let library = platform.retain_library();
        let glx = load_glx_functions(&library)?;

        unsafe {
            let x_display = (xlib.XOpenDisplay)(name.as_ref().map_or(ptr::null(), |name| {
                name.as_ptr()
            }));
            if x_display.is_null() {
                return Err(Error::ConnectionFailed);
            }

            let screen = (xlib.XDefaultScreen)(x_display);
            let mut native_display = OwnedDisplay {
                xlib,
                glx,
                x_display,
                screen,
                gl_api: platform.gl_api(),
                extensions: GlxExtensions::empty(),
                _library: library,
            };

            let (mut major, mut minor) = (0, 0);
            let ok = native_display.glx.QueryVersion(x_display as *mut _, &mut major, &mut minor);
            if ok == xlib::False {
                return Err(Error::Unknown("glXQueryVersion failed".to_owned()));
            }
            if (major, minor) < (1, 3) {
                return Err(Error::Unknown(format!("GLX 1.3 or later is required, found {}.{}",
                                                  major,
                                                  minor)));
            }

            native_display.extensions = native_display.query_extensions();
            log::debug!("connected to X display with GLX {}.{} ({:?})",
                        major,
                        minor,
                        native_display.extensions);

            Ok(Display { native_display: Rc::new(native_display) })
        }
    }

    /// Closes the connection, unless configs, contexts or windows still use it.
    pub(crate) fn disconnect(self) -> Result<(), Error> {
        match Rc::try_unwrap(self.native_display) {
            Ok(native_display) => native_display.close(),
            Err(_) => {
                log::debug!("X display is still in use; deferring close");
                Ok(())
            }
        }
    }

    /// True exactly when `Glx::config_choose` accepts configs for `api` on this display.
    pub(crate) fn supports_context_api(&self, api: GLApi) -> bool {
        config::check_api(self.native_display.gl_api, api).is_ok()
    }

    #[inline]
    pub fn extensions(&self) -> GlxExtensions {
        self.native_display.extensions
    }

    /// Returns the raw Xlib `Display` pointer.
    #[inline]
    pub fn x_display(&self) -> *mut xlib::Display {
        self.native_display.x_display
    }
}

impl OwnedDisplay {
    #[inline]
    pub(crate) fn glx_display(&self) -> *mut super::ffi::glx::types::Display {
        self.x_display as *mut _
    }

    unsafe fn query_extensions(&self) -> GlxExtensions {
        let string = self.glx.QueryExtensionsString(self.glx_display(), self.screen);
        if string.is_null() {
            return GlxExtensions::empty();
        }
        parse_extensions(&CStr::from_ptr(string).to_string_lossy())
    }

    fn close(mut self) -> Result<(), Error> {
        let x_display = mem::replace(&mut self.x_display, ptr::null_mut());
        let result = unsafe { (self.xlib.XCloseDisplay)(x_display) };
        if result != 0 {
            return Err(Error::Unknown("XCloseDisplay failed".to_owned()));
        }
        Ok(())
    }
}

impl Drop for OwnedDisplay {
    fn drop(&mut self) {
        if self.x_display.is_null() {
            return;
        }
        unsafe {
            if (self.xlib.XCloseDisplay)(self.x_display) != 0 {
                log::warn!("XCloseDisplay failed");
            }
        }
    }
}

fn parse_extensions(string: &str) -> GlxExtensions {
    let mut extensions = GlxExtensions::empty();
    for name in string.split_whitespace() {
        match name {
            "GLX_ARB_create_context" => extensions.insert(GlxExtensions::CREATE_CONTEXT),
            "GLX_ARB_create_context_profile" => {
                extensions.insert(GlxExtensions::CREATE_CONTEXT_PROFILE)
            }
            _ => {}
        }
    }
    extensions
}

/// Resolves a GLX entry point through `glXGetProcAddress`.
pub(crate) fn get_proc_address(library: &Library, symbol_name: &str) -> *const c_void {
    let mut function = library.symbol("glXGetProcAddress");
    if function.is_null() {
        function = library.symbol("glXGetProcAddressARB");
    }
    if function.is_null() {
        return ptr::null();
    }
    let symbol_name = match CString::new(symbol_name) {
        Ok(symbol_name) => symbol_name,
        Err(_) => return ptr::null(),
    };
    unsafe {
        let function: unsafe extern "C" fn(*const u8) -> *mut c_void = mem::transmute(function);
        function(symbol_name.as_ptr() as *const u8) as *const c_void
    }
}

fn load_glx_functions(library: &Library) -> Result<GlxFunctions, Error> {
    let glx = GlxFunctions::load_with(|symbol_name| {
        let symbol = library.symbol(symbol_name);
        if symbol.is_null() {
            get_proc_address(library, symbol_name)
        } else {
            symbol
        }
    });

    let required = [
        glx.ChooseFBConfig.is_loaded(),
        glx.GetVisualFromFBConfig.is_loaded(),
        glx.CreateNewContext.is_loaded(),
        glx.DestroyContext.is_loaded(),
        glx.MakeCurrent.is_loaded(),
        glx.SwapBuffers.is_loaded(),
        glx.QueryVersion.is_loaded(),
        glx.QueryExtensionsString.is_loaded(),
    ];
    if required.iter().any(|&is_loaded| !is_loaded) {
        log::error!("\"{}\" does not export the GLX 1.3 entry points", library.name());
        return Err(Error::GLFunctionNotFound);
    }
    Ok(glx)
}
