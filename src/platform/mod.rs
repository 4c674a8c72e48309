// glplatform/src/platform/mod.rs
//
//! The platform handle and the platform-specific backends.

use crate::backend::Backend;
use crate::info::GLApi;
use crate::library::{Library, LibraryLoader, SystemLoader};
use crate::Error;

use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_void;
use std::rc::Rc;

#[cfg(cgl_backend)]
pub mod cgl;
#[cfg(cgl_backend)]
pub use cgl as default;

#[cfg(glx_backend)]
pub mod glx;
#[cfg(glx_backend)]
pub use glx as default;

/// The top-level object for one backend. It owns the loaded native GL library.
///
/// A platform is created for a single GL API and must outlive every display, config, context and
/// window created through it. Destroy it with `destroy()` to learn whether the library unloaded
/// cleanly; dropping it unloads the library too, but only logs a failure.
pub struct Platform<B> where B: Backend {
    library: Rc<Library>,
    gl_api: GLApi,
    phantom: PhantomData<B>,
}

impl<B> Platform<B> where B: Backend {
    /// Creates a platform for `gl_api`, loading the backend's GL library from the system.
    #[inline]
    pub fn create(gl_api: GLApi) -> Result<Platform<B>, Error> {
        Platform::create_with_loader(gl_api, &SystemLoader)
    }

    /// Creates a platform for `gl_api`, loading the backend's GL library with `loader`.
    ///
    /// If `gl_api` is unsupported by the backend, nothing is loaded and `Error::BadAttribute` is
    /// returned. If loading fails, nothing stays loaded.
    pub fn create_with_loader(gl_api: GLApi, loader: &dyn LibraryLoader)
                              -> Result<Platform<B>, Error> {
        let library_name = B::library_name(gl_api)?;
        let library = Library::open(loader, library_name)?;
        log::debug!("created {} platform for {}", B::KIND.name(), gl_api);
        Ok(Platform { library: Rc::new(library), gl_api, phantom: PhantomData })
    }

    /// Destroys the platform and unloads its GL library.
    ///
    /// The platform is consumed even if unloading fails. If displays still hold the library,
    /// unloading is deferred until the last of them is released.
    pub fn destroy(self) -> Result<(), Error> {
        match Rc::try_unwrap(self.library) {
            Ok(library) => library.close(),
            Err(library) => {
                log::debug!("GL library \"{}\" is still in use; deferring unload", library.name());
                Ok(())
            }
        }
    }

    #[inline]
    pub fn gl_api(&self) -> GLApi {
        self.gl_api
    }

    #[inline]
    pub fn library_name(&self) -> &str {
        self.library.name()
    }

    #[inline]
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Returns a new reference to the loaded library, for objects that keep entry points
    /// resolved from it.
    #[inline]
    pub fn retain_library(&self) -> Rc<Library> {
        self.library.clone()
    }

    #[inline]
    pub fn connect(&self, name: Option<&str>) -> Result<B::Display, Error> {
        B::display_connect(self, name)
    }

    #[inline]
    pub fn get_proc_address(&self, name: &str) -> *const c_void {
        B::get_proc_address(self, name)
    }

    #[inline]
    pub fn dlsym_gl(&self, name: &str) -> *const c_void {
        B::dlsym_gl(self, name)
    }
}

impl<B> fmt::Debug for Platform<B> where B: Backend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Platform")
         .field("backend", &B::KIND)
         .field("gl_api", &self.gl_api)
         .field("library", &self.library.name())
         .finish()
    }
}
