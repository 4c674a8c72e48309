// glplatform/src/platform/glx/error.rs
//
//! Capture and translation of X11 errors.

use crate::WindowingApiError;
use super::ffi::{X_BAD_ALLOC, X_BAD_DRAWABLE, X_BAD_MATCH, X_BAD_VALUE, X_BAD_WINDOW};

use std::cell::Cell;
use std::os::raw::{c_char, c_int};
use x11_dl::xlib::{self, Display, XErrorEvent, Xlib};

type XErrorHandler = Option<unsafe extern "C" fn(*mut Display, *mut XErrorEvent) -> c_int>;

thread_local! {
    static LAST_X_ERROR_CODE: Cell<u8> = Cell::new(0);
}

unsafe extern "C" fn xlib_error_handler(_: *mut Display, event: *mut XErrorEvent) -> c_int {
    LAST_X_ERROR_CODE.with(|last_x_error_code| last_x_error_code.set((*event).error_code));
    0
}

/// Routes X errors raised on this thread to a local slot instead of the default handler, which
/// exits the process. The previous handler is restored on drop.
pub(crate) struct ErrorTrap<'a> {
    xlib: &'a Xlib,
    display: *mut Display,
    prev_error_handler: XErrorHandler,
}

impl<'a> ErrorTrap<'a> {
    pub(crate) unsafe fn new(xlib: &'a Xlib, display: *mut Display) -> ErrorTrap<'a> {
        LAST_X_ERROR_CODE.with(|last_x_error_code| last_x_error_code.set(0));
        let prev_error_handler = (xlib.XSetErrorHandler)(Some(xlib_error_handler));
        ErrorTrap { xlib, display, prev_error_handler }
    }

    /// Flushes outstanding requests and returns the first error code they raised, if any.
    pub(crate) fn finish(self) -> Option<u8> {
        unsafe {
            (self.xlib.XSync)(self.display, xlib::False);
        }
        match LAST_X_ERROR_CODE.with(|last_x_error_code| last_x_error_code.get()) {
            0 => None,
            code => Some(code),
        }
    }
}

impl<'a> Drop for ErrorTrap<'a> {
    fn drop(&mut self) {
        unsafe {
            (self.xlib.XSetErrorHandler)(self.prev_error_handler);
        }
    }
}

pub(crate) fn xlib_error_to_windowing_api_error(xlib: &Xlib,
                                                display: *mut Display,
                                                xlib_error: u8)
                                                -> WindowingApiError {
    match xlib_error {
        X_BAD_VALUE => return WindowingApiError::BadValue,
        X_BAD_WINDOW => return WindowingApiError::BadWindow,
        X_BAD_MATCH => return WindowingApiError::BadMatch,
        X_BAD_DRAWABLE => return WindowingApiError::BadDrawable,
        X_BAD_ALLOC => return WindowingApiError::BadAlloc,
        _ => {}
    }

    // GLX errors are numbered relative to the extension's error base, so go by name.
    unsafe {
        let mut error_text: Vec<u8> = vec![0; 256];
        (xlib.XGetErrorText)(display,
                             xlib_error as c_int,
                             error_text.as_mut_ptr() as *mut c_char,
                             error_text.len() as c_int - 1);
        if error_text.starts_with(b"GLXBadFBConfig\0") {
            WindowingApiError::BadPixelFormat
        } else if error_text.starts_with(b"GLXBadContext\0") {
            WindowingApiError::BadContext
        } else {
            WindowingApiError::Failed
        }
    }
}
