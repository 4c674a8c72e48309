// glplatform/src/library.rs
//
//! Dynamic loading of the native GL library.
//!
//! A loaded library is owned by exactly one `Library` value. It is unloaded either explicitly
//! with `Library::close()`, which reports failure, or implicitly when the value is dropped, which
//! only logs it.

use crate::Error;

use std::ffi::{CStr, CString};
use std::fmt;
use std::os::raw::c_void;
use std::ptr;

/// A handle to a loaded shared object.
pub trait NativeLibrary {
    /// The file name the library was loaded from.
    fn name(&self) -> &str;
    /// Looks up `symbol`, returning null if the library does not export it.
    fn symbol(&self, symbol: &str) -> *const c_void;
    fn is_closed(&self) -> bool;
    /// Unloads the library. Symbols looked up earlier must not be used afterward.
    unsafe fn close(&mut self) -> Result<(), Error>;
}

/// Opens shared objects.
///
/// `SystemLoader` is the real implementation; tests substitute an instrumented one.
pub trait LibraryLoader {
    fn open(&self, name: &str) -> Result<Box<dyn NativeLibrary>, Error>;
}

/// An owned, loaded library.
pub struct Library {
    native_library: Box<dyn NativeLibrary>,
}

impl Library {
    /// Loads `name` with `loader`.
    pub fn open(loader: &dyn LibraryLoader, name: &str) -> Result<Library, Error> {
        let native_library = loader.open(name)?;
        log::debug!("loaded GL library \"{}\"", native_library.name());
        Ok(Library { native_library })
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.native_library.name()
    }

    #[inline]
    pub fn symbol(&self, symbol: &str) -> *const c_void {
        debug_assert!(!self.native_library.is_closed());
        self.native_library.symbol(symbol)
    }

    /// Unloads the library, reporting failure.
    ///
    /// The handle is released even when the unload fails.
    pub fn close(mut self) -> Result<(), Error> {
        unsafe { self.native_library.close() }
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        if self.native_library.is_closed() {
            return;
        }
        if let Err(err) = unsafe { self.native_library.close() } {
            log::warn!("failed to unload GL library: {}", err);
        }
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Library").field("name", &self.name()).finish()
    }
}

/// Loads libraries with `dlopen(RTLD_LAZY)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLoader;

impl LibraryLoader for SystemLoader {
    #[cfg(unix)]
    fn open(&self, name: &str) -> Result<Box<dyn NativeLibrary>, Error> {
        let c_name = match CString::new(name) {
            Ok(c_name) => c_name,
            Err(_) => {
                return Err(Error::BadParameter(format!("library name \"{}\" contains a NUL", name)))
            }
        };
        unsafe {
            let handle = libc::dlopen(c_name.as_ptr(), libc::RTLD_LAZY);
            if handle.is_null() {
                return Err(Error::Unknown(format!("dlopen(\"{}\") failed: {}", name, dl_error())));
            }
            Ok(Box::new(DlLibrary { name: name.to_owned(), handle }))
        }
    }

    #[cfg(not(unix))]
    fn open(&self, _: &str) -> Result<Box<dyn NativeLibrary>, Error> {
        Err(Error::UnsupportedOnThisPlatform)
    }
}

#[cfg(unix)]
struct DlLibrary {
    name: String,
    handle: *mut c_void,
}

#[cfg(unix)]
impl NativeLibrary for DlLibrary {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self, symbol: &str) -> *const c_void {
        let symbol = match CString::new(symbol) {
            Ok(symbol) => symbol,
            Err(_) => return ptr::null(),
        };
        unsafe { libc::dlsym(self.handle, symbol.as_ptr()) as *const c_void }
    }

    #[inline]
    fn is_closed(&self) -> bool {
        self.handle.is_null()
    }

    unsafe fn close(&mut self) -> Result<(), Error> {
        assert!(!self.is_closed());
        let result = libc::dlclose(self.handle);
        self.handle = ptr::null_mut();
        if result != 0 {
            return Err(Error::Unknown(format!("dlclose() failed on \"{}\": {}",
                                              self.name,
                                              dl_error())));
        }
        log::debug!("unloaded GL library \"{}\"", self.name);
        Ok(())
    }
}

#[cfg(unix)]
fn dl_error() -> String {
    unsafe {
        let message = libc::dlerror();
        if message.is_null() {
            "unknown error".to_owned()
        } else {
            CStr::from_ptr(message).to_string_lossy().into_owned()
        }
    }
}
