// glplatform/src/capi.rs
//
//! The C interface.
//!
//! Every object handed out through this interface is an opaque pointer to a heap allocation whose
//! first field is the `NativeDispatch` table of the backend that created it. The `glp_*` entry
//! points use that field to route calls; the table entries use it to reject objects that belong to
//! another backend.
//!
//! Functions report failure by returning null or `false` and recording the error in a per-thread
//! slot, which stays set until the next failure or `glp_error_reset()`.

use crate::backend::{Backend, BackendKind};
use crate::config::ConfigAttributes;
use crate::error::{Error, ErrorCode};
use crate::info::GLApi;
use crate::library::{LibraryLoader, SystemLoader};
use crate::platform::Platform;

use euclid::default::Size2D;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

#[cfg(cgl_backend)]
use crate::platform::cgl::Cgl;
#[cfg(glx_backend)]
use crate::platform::glx::Glx;

/// An opaque platform handle.
#[repr(C)]
pub struct GlpPlatform {
    _private: [u8; 0],
}

/// An opaque display handle.
#[repr(C)]
pub struct GlpDisplay {
    _private: [u8; 0],
}

/// An opaque config handle.
#[repr(C)]
pub struct GlpConfig {
    _private: [u8; 0],
}

/// An opaque context handle.
#[repr(C)]
pub struct GlpContext {
    _private: [u8; 0],
}

/// An opaque window handle.
#[repr(C)]
pub struct GlpWindow {
    _private: [u8; 0],
}

/// The per-backend table of C entry points.
#[repr(C)]
pub struct NativeDispatch {
    pub backend: i32,
    pub platform_destroy: unsafe extern "C" fn(*mut GlpPlatform) -> bool,
    pub display_connect: unsafe extern "C" fn(*mut GlpPlatform, *const c_char) -> *mut GlpDisplay,
    pub display_disconnect: unsafe extern "C" fn(*mut GlpDisplay) -> bool,
    pub display_supports_context_api: unsafe extern "C" fn(*mut GlpDisplay, i32) -> bool,
    pub config_choose: unsafe extern "C" fn(*mut GlpDisplay, *const i32) -> *mut GlpConfig,
    pub config_destroy: unsafe extern "C" fn(*mut GlpConfig) -> bool,
    pub context_create: unsafe extern "C" fn(*mut GlpConfig, *mut GlpContext) -> *mut GlpContext,
    pub context_destroy: unsafe extern "C" fn(*mut GlpContext) -> bool,
    pub window_create: unsafe extern "C" fn(*mut GlpConfig, i32, i32) -> *mut GlpWindow,
    pub window_destroy: unsafe extern "C" fn(*mut GlpWindow) -> bool,
    pub window_swap_buffers: unsafe extern "C" fn(*mut GlpWindow) -> bool,
    pub make_current:
        unsafe extern "C" fn(*mut GlpDisplay, *mut GlpWindow, *mut GlpContext) -> bool,
    pub get_proc_address: unsafe extern "C" fn(*mut GlpPlatform, *const c_char) -> *const c_void,
    pub dlsym_gl: unsafe extern "C" fn(*mut GlpPlatform, *const c_char) -> *const c_void,
}

impl NativeDispatch {
    /// Builds the table for `B`.
    pub const fn of<B>() -> NativeDispatch where B: NativeBackend {
        NativeDispatch {
            backend: match B::KIND {
                BackendKind::Glx => BackendKind::RAW_GLX,
                BackendKind::Cgl => BackendKind::RAW_CGL,
            },
            platform_destroy: platform_destroy::<B>,
            display_connect: display_connect::<B>,
            display_disconnect: display_disconnect::<B>,
            display_supports_context_api: display_supports_context_api::<B>,
            config_choose: config_choose::<B>,
            config_destroy: config_destroy::<B>,
            context_create: context_create::<B>,
            context_destroy: context_destroy::<B>,
            window_create: window_create::<B>,
            window_destroy: window_destroy::<B>,
            window_swap_buffers: window_swap_buffers::<B>,
            make_current: make_current::<B>,
            get_proc_address: get_proc_address::<B>,
            dlsym_gl: dlsym_gl::<B>,
        }
    }
}

/// A backend with a process-wide C dispatch table.
pub trait NativeBackend: Backend {
    fn dispatch() -> &'static NativeDispatch;
}

macro_rules! native_backend {
    ($backend:ty, $table:ident) => {
        static $table: NativeDispatch = NativeDispatch::of::<$backend>();

        impl NativeBackend for $backend {
            #[inline]
            fn dispatch() -> &'static NativeDispatch {
                &$table
            }
        }
    };
}

impl<B> Platform<B> where B: NativeBackend {
    /// Returns the C dispatch table of this platform's backend.
    #[inline]
    pub fn dispatch(&self) -> &'static NativeDispatch {
        B::dispatch()
    }
}

#[cfg(glx_backend)]
native_backend!(Glx, GLX_DISPATCH);
#[cfg(cgl_backend)]
native_backend!(Cgl, CGL_DISPATCH);

#[repr(C)]
struct Handle<T> {
    dispatch: &'static NativeDispatch,
    value: T,
}

impl<T> Handle<T> {
    fn into_raw<B, O>(value: T) -> *mut O where B: NativeBackend {
        Box::into_raw(Box::new(Handle { dispatch: B::dispatch(), value })) as *mut O
    }

    unsafe fn get<'a, B, O>(object: *mut O, what: &str) -> Result<&'a T, Error>
                            where B: NativeBackend {
        check_handle::<B, O>(object, what)?;
        Ok(&(*(object as *mut Handle<T>)).value)
    }

    unsafe fn get_optional<'a, B, O>(object: *mut O, what: &str) -> Result<Option<&'a T>, Error>
                                     where B: NativeBackend {
        if object.is_null() {
            return Ok(None);
        }
        Self::get::<B, O>(object, what).map(Some)
    }

    unsafe fn take<B, O>(object: *mut O, what: &str) -> Result<T, Error> where B: NativeBackend {
        check_handle::<B, O>(object, what)?;
        Ok(Box::from_raw(object as *mut Handle<T>).value)
    }
}

unsafe fn dispatch_of<O>(object: *mut O) -> &'static NativeDispatch {
    *(object as *const &'static NativeDispatch)
}

unsafe fn check_handle<B, O>(object: *mut O, what: &str) -> Result<(), Error>
                             where B: NativeBackend {
    if object.is_null() {
        return Err(Error::BadParameter(format!("{} is null", what)));
    }
    let dispatch = dispatch_of(object);
    if !ptr::eq(dispatch, B::dispatch()) {
        return Err(Error::Internal(format!("{} does not belong to the {} dispatch table",
                                           what,
                                           B::KIND.name())));
    }
    Ok(())
}

thread_local! {
    static LAST_ERROR: RefCell<Option<(ErrorCode, CString)>> = const { RefCell::new(None) };
}

fn set_last_error(error: &Error) {
    log::debug!("reporting error through the C interface: {}", error);
    let message = CString::new(error.to_string().replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|last_error| *last_error.borrow_mut() = Some((error.code(), message)));
}

// Runs `f`, recording its error (or panic) in the per-thread slot.
fn call<T, F>(f: F) -> Option<T> where F: FnOnce() -> Result<T, Error> {
    let result = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => Err(Error::Internal("panic in the native backend".to_owned())),
    };
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            set_last_error(&error);
            None
        }
    }
}

unsafe fn optional_str<'a>(string: *const c_char, what: &str) -> Result<Option<&'a str>, Error> {
    if string.is_null() {
        return Ok(None);
    }
    match CStr::from_ptr(string).to_str() {
        Ok(string) => Ok(Some(string)),
        Err(_) => Err(Error::BadParameter(format!("{} is not valid UTF-8", what))),
    }
}

unsafe fn required_str<'a>(string: *const c_char, what: &str) -> Result<&'a str, Error> {
    match optional_str(string, what)? {
        Some(string) => Ok(string),
        None => Err(Error::BadParameter(format!("{} is null", what))),
    }
}

// Attribute lists are `(key, value)` pairs ending at the first zero key.
unsafe fn attrib_list<'a>(list: *const i32) -> &'a [i32] {
    const EMPTY: [i32; 1] = [0];
    if list.is_null() {
        return &EMPTY;
    }
    let mut len = 0;
    while *list.add(len) != 0 {
        len += 2;
    }
    std::slice::from_raw_parts(list, len + 1)
}

/// Creates a platform for backend `B`, loading its GL library with `loader`.
///
/// On success, `B`'s dispatch table is written to `dispatch` if it is non-null.
///
/// # Safety
///
/// `dispatch` must be null or valid for writes.
pub unsafe fn platform_create_with_loader<B>(gl_api: i32,
                                             loader: &dyn LibraryLoader,
                                             dispatch: *mut *const NativeDispatch)
                                             -> *mut GlpPlatform
                                             where B: NativeBackend {
    let platform = call(|| {
        let gl_api = GLApi::from_raw(gl_api)?;
        Platform::<B>::create_with_loader(gl_api, loader)
    });
    match platform {
        Some(platform) => {
            if !dispatch.is_null() {
                *dispatch = B::dispatch();
            }
            Handle::into_raw::<B, GlpPlatform>(platform)
        }
        None => ptr::null_mut(),
    }
}

unsafe extern "C" fn platform_destroy<B>(platform: *mut GlpPlatform) -> bool
                                         where B: NativeBackend {
    if platform.is_null() {
        return true;
    }
    call(|| Handle::<Platform<B>>::take::<B, _>(platform, "platform")?.destroy()).is_some()
}

unsafe extern "C" fn display_connect<B>(platform: *mut GlpPlatform, name: *const c_char)
                                        -> *mut GlpDisplay
                                        where B: NativeBackend {
    let display = call(|| {
        let platform = Handle::<Platform<B>>::get::<B, _>(platform, "platform")?;
        let name = optional_str(name, "display name")?;
        B::display_connect(platform, name)
    });
    display.map_or(ptr::null_mut(), Handle::into_raw::<B, GlpDisplay>)
}

unsafe extern "C" fn display_disconnect<B>(display: *mut GlpDisplay) -> bool
                                           where B: NativeBackend {
    if display.is_null() {
        return true;
    }
    call(|| B::display_disconnect(Handle::<B::Display>::take::<B, _>(display, "display")?))
        .is_some()
}

unsafe extern "C" fn display_supports_context_api<B>(display: *mut GlpDisplay, api: i32) -> bool
                                                     where B: NativeBackend {
    // An API code this crate does not know is simply unsupported.
    let api = match GLApi::from_raw(api) {
        Ok(api) => api,
        Err(_) => return false,
    };
    call(|| {
        let display = Handle::<B::Display>::get::<B, _>(display, "display")?;
        Ok(B::display_supports_context_api(display, api))
    }).unwrap_or(false)
}

unsafe extern "C" fn config_choose<B>(display: *mut GlpDisplay, attributes: *const i32)
                                      -> *mut GlpConfig
                                      where B: NativeBackend {
    let config = call(|| {
        let display = Handle::<B::Display>::get::<B, _>(display, "display")?;
        let attributes = ConfigAttributes::from_attrib_list(attrib_list(attributes))?;
        B::config_choose(display, &attributes)
    });
    config.map_or(ptr::null_mut(), Handle::into_raw::<B, GlpConfig>)
}

unsafe extern "C" fn config_destroy<B>(config: *mut GlpConfig) -> bool where B: NativeBackend {
    if config.is_null() {
        return true;
    }
    call(|| B::config_destroy(Handle::<B::Config>::take::<B, _>(config, "config")?)).is_some()
}

unsafe extern "C" fn context_create<B>(config: *mut GlpConfig, share_with: *mut GlpContext)
                                       -> *mut GlpContext
                                       where B: NativeBackend {
    let context = call(|| {
        let config = Handle::<B::Config>::get::<B, _>(config, "config")?;
        let share_with = Handle::<B::Context>::get_optional::<B, _>(share_with, "share context")?;
        B::context_create(config, share_with)
    });
    context.map_or(ptr::null_mut(), Handle::into_raw::<B, GlpContext>)
}

unsafe extern "C" fn context_destroy<B>(context: *mut GlpContext) -> bool
                                        where B: NativeBackend {
    if context.is_null() {
        return true;
    }
    call(|| B::context_destroy(Handle::<B::Context>::take::<B, _>(context, "context")?)).is_some()
}

unsafe extern "C" fn window_create<B>(config: *mut GlpConfig, width: i32, height: i32)
                                      -> *mut GlpWindow
                                      where B: NativeBackend {
    let window = call(|| {
        let config = Handle::<B::Config>::get::<B, _>(config, "config")?;
        B::window_create(config, Size2D::new(width, height))
    });
    window.map_or(ptr::null_mut(), Handle::into_raw::<B, GlpWindow>)
}

unsafe extern "C" fn window_destroy<B>(window: *mut GlpWindow) -> bool where B: NativeBackend {
    if window.is_null() {
        return true;
    }
    call(|| B::window_destroy(Handle::<B::Window>::take::<B, _>(window, "window")?)).is_some()
}

unsafe extern "C" fn window_swap_buffers<B>(window: *mut GlpWindow) -> bool
                                            where B: NativeBackend {
    call(|| B::window_swap_buffers(Handle::<B::Window>::get::<B, _>(window, "window")?)).is_some()
}

unsafe extern "C" fn make_current<B>(display: *mut GlpDisplay,
                                     window: *mut GlpWindow,
                                     context: *mut GlpContext)
                                     -> bool
                                     where B: NativeBackend {
    call(|| {
        let display = Handle::<B::Display>::get::<B, _>(display, "display")?;
        let window = Handle::<B::Window>::get_optional::<B, _>(window, "window")?;
        let context = Handle::<B::Context>::get_optional::<B, _>(context, "context")?;
        B::make_current(display, window, context)
    }).is_some()
}

unsafe extern "C" fn get_proc_address<B>(platform: *mut GlpPlatform, name: *const c_char)
                                         -> *const c_void
                                         where B: NativeBackend {
    call(|| {
        let platform = Handle::<Platform<B>>::get::<B, _>(platform, "platform")?;
        Ok(B::get_proc_address(platform, required_str(name, "symbol name")?))
    }).unwrap_or(ptr::null())
}

unsafe extern "C" fn dlsym_gl<B>(platform: *mut GlpPlatform, name: *const c_char) -> *const c_void
                                 where B: NativeBackend {
    call(|| {
        let platform = Handle::<Platform<B>>::get::<B, _>(platform, "platform")?;
        Ok(B::dlsym_gl(platform, required_str(name, "symbol name")?))
    }).unwrap_or(ptr::null())
}

/// Creates a platform for `backend` and `gl_api`, writing the backend's dispatch table to
/// `dispatch`. Returns null on failure.
///
/// # Safety
///
/// `dispatch` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn glp_platform_create(backend: i32,
                                             gl_api: i32,
                                             dispatch: *mut *const NativeDispatch)
                                             -> *mut GlpPlatform {
    let backend = match call(|| BackendKind::from_raw(backend)) {
        Some(backend) => backend,
        None => return ptr::null_mut(),
    };
    match backend {
        #[cfg(glx_backend)]
        BackendKind::Glx => platform_create_with_loader::<Glx>(gl_api, &SystemLoader, dispatch),
        #[cfg(cgl_backend)]
        BackendKind::Cgl => platform_create_with_loader::<Cgl>(gl_api, &SystemLoader, dispatch),
        #[allow(unreachable_patterns)]
        _ => {
            set_last_error(&Error::UnsupportedOnThisPlatform);
            ptr::null_mut()
        }
    }
}

/// Destroys a platform. A null `platform` is accepted and ignored.
///
/// The handle is freed even when unloading the GL library fails; `false` is returned then.
///
/// # Safety
///
/// `platform` must be null or a live handle from `glp_platform_create()`.
#[no_mangle]
pub unsafe extern "C" fn glp_platform_destroy(platform: *mut GlpPlatform) -> bool {
    if platform.is_null() {
        return true;
    }
    (dispatch_of(platform).platform_destroy)(platform)
}

/// # Safety
///
/// `platform` must be a live platform handle. `name` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn glp_display_connect(platform: *mut GlpPlatform, name: *const c_char)
                                             -> *mut GlpDisplay {
    if platform.is_null() {
        set_last_error(&Error::BadParameter("platform is null".to_owned()));
        return ptr::null_mut();
    }
    (dispatch_of(platform).display_connect)(platform, name)
}

/// # Safety
///
/// `display` must be null or a live display handle.
#[no_mangle]
pub unsafe extern "C" fn glp_display_disconnect(display: *mut GlpDisplay) -> bool {
    if display.is_null() {
        return true;
    }
    (dispatch_of(display).display_disconnect)(display)
}

/// # Safety
///
/// `display` must be a live display handle.
#[no_mangle]
pub unsafe extern "C" fn glp_display_supports_context_api(display: *mut GlpDisplay,
                                                          gl_api: i32)
                                                          -> bool {
    if display.is_null() {
        set_last_error(&Error::BadParameter("display is null".to_owned()));
        return false;
    }
    (dispatch_of(display).display_supports_context_api)(display, gl_api)
}

/// Returns the code of the last error on this thread, or `Success` if there is none.
#[no_mangle]
pub extern "C" fn glp_error_get_code() -> i32 {
    LAST_ERROR.with(|last_error| {
        last_error.borrow().as_ref().map_or(ErrorCode::Success, |&(code, _)| code) as i32
    })
}

/// Returns the message of the last error on this thread, or null if there is none.
///
/// The string stays valid until the next error on this thread or `glp_error_reset()`.
#[no_mangle]
pub extern "C" fn glp_error_get_message() -> *const c_char {
    LAST_ERROR.with(|last_error| {
        last_error.borrow().as_ref().map_or(ptr::null(), |(_, message)| message.as_ptr())
    })
}

#[no_mangle]
pub extern "C" fn glp_error_reset() {
    LAST_ERROR.with(|last_error| *last_error.borrow_mut() = None);
}
