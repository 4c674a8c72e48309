// glplatform/src/platform/glx/context.rs
//
//! Wrapper for GLX contexts.

use crate::config::{ConfigAttributeFlags, ConfigAttributes};
use crate::info::{GLProfile, GLVersion};
use crate::{Error, WindowingApiError};
use super::config::Config;
use super::display::{Display, GlxExtensions, OwnedDisplay};
use super::error::{self, ErrorTrap};
use super::ffi::glx::types::GLXContext;
use super::ffi::{GLX_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB, GLX_CONTEXT_CORE_PROFILE_BIT_ARB};
use super::ffi::{GLX_CONTEXT_DEBUG_BIT_ARB, GLX_CONTEXT_FLAGS_ARB};
use super::ffi::{GLX_CONTEXT_FORWARD_COMPATIBLE_BIT_ARB, GLX_CONTEXT_MAJOR_VERSION_ARB};
use super::ffi::{GLX_CONTEXT_MINOR_VERSION_ARB, GLX_CONTEXT_PROFILE_MASK_ARB, GLX_RGBA_TYPE};
use super::window::Window;

use std::os::raw::{c_int, c_void};
use std::ptr;
use std::rc::Rc;
use std::thread;
use x11_dl::xlib;

/// Represents a GLX rendering context.
///
/// A context must be explicitly destroyed with `Glx::context_destroy()`, or a panic will occur.
pub struct Context {
    pub(crate) native_display: Rc<OwnedDisplay>,
    pub(crate) glx_context: GLXContext,
    attributes: ConfigAttributes,
}

impl Drop for Context {
    #[inline]
    fn drop(&mut self) {
        if !self.glx_context.is_null() && !thread::panicking() {
            panic!("Contexts must be destroyed explicitly with `context_destroy`!")
        }
    }
}

impl Context {
    pub(crate) fn create(config: &Config, share_with: Option<&Context>) -> Result<Context, Error> {
        let native_display = &config.native_display;
        let share_context = match share_with {
            None => ptr::null(),
            Some(share_with) if Rc::ptr_eq(&share_with.native_display, native_display) => {
                share_with.glx_context
            }
            Some(_) => return Err(Error::IncompatibleDisplay),
        };

        let attributes = &config.attributes;
        let has_create_context =
            native_display.extensions.contains(GlxExtensions::CREATE_CONTEXT) &&
            native_display.glx.CreateContextAttribsARB.is_loaded();

        unsafe {
            let error_trap = ErrorTrap::new(&native_display.xlib, native_display.x_display);
            let glx_context = if has_create_context {
                let context_attributes =
                    context_attribute_list(native_display.extensions, attributes)?;
                native_display.glx.CreateContextAttribsARB(native_display.glx_display(),
                                                           config.glx_fb_config,
                                                           share_context,
                                                           xlib::True,
                                                           context_attributes.as_ptr())
            } else if is_legacy_compatible(attributes) {
                native_display.glx.CreateNewContext(native_display.glx_display(),
                                                    config.glx_fb_config,
                                                    GLX_RGBA_TYPE,
                                                    share_context,
                                                    xlib::True)
            } else {
                log::warn!("GLX_ARB_create_context is unavailable; cannot create a {} {}.{} \
                            context",
                           attributes.api,
                           attributes.version.major,
                           attributes.version.minor);
                return Err(Error::UnsupportedOnThisPlatform);
            };

            let x_error = error_trap.finish();
            if let Some(x_error) = x_error {
                if !glx_context.is_null() {
                    native_display.glx.DestroyContext(native_display.glx_display(), glx_context);
                }
                let windowing_api_error =
                    error::xlib_error_to_windowing_api_error(&native_display.xlib,
                                                             native_display.x_display,
                                                             x_error);
                return Err(Error::ContextCreationFailed(windowing_api_error));
            }
            if glx_context.is_null() {
                return Err(Error::ContextCreationFailed(WindowingApiError::Failed));
            }

            Ok(Context {
                native_display: native_display.clone(),
                glx_context,
                attributes: *attributes,
            })
        }
    }

    pub(crate) fn destroy(mut self) -> Result<(), Error> {
        let glx_context = self.glx_context;
        self.glx_context = ptr::null();
        unsafe {
            let native_display = &self.native_display;
            let error_trap = ErrorTrap::new(&native_display.xlib, native_display.x_display);
            native_display.glx.DestroyContext(native_display.glx_display(), glx_context);
            if let Some(x_error) = error_trap.finish() {
                let windowing_api_error =
                    error::xlib_error_to_windowing_api_error(&native_display.xlib,
                                                             native_display.x_display,
                                                             x_error);
                return Err(Error::ContextDestructionFailed(windowing_api_error));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn attributes(&self) -> &ConfigAttributes {
        &self.attributes
    }

    /// Returns the raw `GLXContext`.
    #[inline]
    pub fn glx_context(&self) -> *const c_void {
        self.glx_context as *const c_void
    }
}

pub(crate) fn make_current(display: &Display,
                           window: Option<&Window>,
                           context: Option<&Context>)
                           -> Result<(), Error> {
    check_current_pair(window.is_some(), context.is_some())?;

    let native_display = &display.native_display;
    let window_display = window.map(|window| &window.native_display);
    let context_display = context.map(|context| &context.native_display);
    for other in window_display.into_iter().chain(context_display) {
        if !Rc::ptr_eq(other, native_display) {
            return Err(Error::IncompatibleDisplay);
        }
    }

    let drawable = window.map_or(0, |window| window.x_window);
    let glx_context = context.map_or(ptr::null(), |context| context.glx_context);
    unsafe {
        let error_trap = ErrorTrap::new(&native_display.xlib, native_display.x_display);
        let ok = native_display.glx.MakeCurrent(native_display.glx_display(),
                                                drawable,
                                                glx_context);
        if let Some(x_error) = error_trap.finish() {
            let windowing_api_error =
                error::xlib_error_to_windowing_api_error(&native_display.xlib,
                                                         native_display.x_display,
                                                         x_error);
            return Err(Error::MakeCurrentFailed(windowing_api_error));
        }
        if ok == xlib::False {
            return Err(Error::MakeCurrentFailed(WindowingApiError::Failed));
        }
    }
    Ok(())
}

// GLX cannot bind a context without a drawable or the reverse; both `None` releases.
fn check_current_pair(has_window: bool, has_context: bool) -> Result<(), Error> {
    if has_window != has_context {
        return Err(Error::BadParameter("a window and a context must be made current together"
                                           .to_owned()));
    }
    Ok(())
}

// Configs only exist for desktop GL, so the profile mask is one of the ARB ones.
fn context_attribute_list(extensions: GlxExtensions, attributes: &ConfigAttributes)
                          -> Result<Vec<c_int>, Error> {
    let version = attributes.version;
    let mut list = vec![
        GLX_CONTEXT_MAJOR_VERSION_ARB, version.major as c_int,
        GLX_CONTEXT_MINOR_VERSION_ARB, version.minor as c_int,
    ];

    let profile_mask = match attributes.profile {
        None => None,
        Some(GLProfile::Core) => Some(GLX_CONTEXT_CORE_PROFILE_BIT_ARB),
        Some(GLProfile::Compatibility) => Some(GLX_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB),
    };
    if let Some(profile_mask) = profile_mask {
        if !extensions.contains(GlxExtensions::CREATE_CONTEXT_PROFILE) {
            return Err(Error::UnsupportedOnThisPlatform);
        }
        list.extend_from_slice(&[GLX_CONTEXT_PROFILE_MASK_ARB, profile_mask]);
    }

    let mut flags = 0;
    if attributes.flags.contains(ConfigAttributeFlags::DEBUG) {
        flags |= GLX_CONTEXT_DEBUG_BIT_ARB;
    }
    if attributes.flags.contains(ConfigAttributeFlags::FORWARD_COMPATIBLE) {
        flags |= GLX_CONTEXT_FORWARD_COMPATIBLE_BIT_ARB;
    }
    if flags != 0 {
        list.extend_from_slice(&[GLX_CONTEXT_FLAGS_ARB, flags]);
    }

    list.push(0);
    Ok(list)
}

// `glXCreateNewContext` returns whatever version the driver likes, which is acceptable only for
// plain desktop GL up to 3.0.
fn is_legacy_compatible(attributes: &ConfigAttributes) -> bool {
    attributes.profile.is_none() &&
        attributes.version <= GLVersion::new(3, 0) &&
        !attributes.flags.intersects(ConfigAttributeFlags::DEBUG |
                                     ConfigAttributeFlags::FORWARD_COMPATIBLE)
}

#[cfg(test)]
mod tests {
    use super::{check_current_pair, context_attribute_list, is_legacy_compatible};
    use crate::config::{ConfigAttributeFlags, ConfigAttributes};
    use crate::info::{GLApi, GLProfile, GLVersion};
    use crate::platform::glx::display::GlxExtensions;
    use crate::platform::glx::ffi::GLX_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB;
    use crate::platform::glx::ffi::{GLX_CONTEXT_CORE_PROFILE_BIT_ARB, GLX_CONTEXT_DEBUG_BIT_ARB};
    use crate::platform::glx::ffi::{GLX_CONTEXT_FLAGS_ARB, GLX_CONTEXT_FORWARD_COMPATIBLE_BIT_ARB};
    use crate::platform::glx::ffi::{GLX_CONTEXT_MAJOR_VERSION_ARB, GLX_CONTEXT_MINOR_VERSION_ARB};
    use crate::platform::glx::ffi::GLX_CONTEXT_PROFILE_MASK_ARB;
    use crate::Error;

    fn gl_attributes(major: u8, minor: u8) -> ConfigAttributes {
        let mut attributes = ConfigAttributes::new(GLApi::OpenGL);
        attributes.version = GLVersion::new(major, minor);
        attributes
    }

    #[test]
    fn test_window_and_context_go_together() {
        assert!(check_current_pair(true, true).is_ok());
        assert!(check_current_pair(false, false).is_ok());
        assert!(matches!(check_current_pair(false, true), Err(Error::BadParameter(_))));
        assert!(matches!(check_current_pair(true, false), Err(Error::BadParameter(_))));
    }

    #[test]
    fn test_attribute_list_without_profile() {
        let list = context_attribute_list(GlxExtensions::CREATE_CONTEXT, &gl_attributes(2, 1))
            .unwrap();
        assert_eq!(list, vec![
            GLX_CONTEXT_MAJOR_VERSION_ARB, 2,
            GLX_CONTEXT_MINOR_VERSION_ARB, 1,
            0,
        ]);
    }

    #[test]
    fn test_attribute_list_with_profile_and_flags() {
        let mut attributes = gl_attributes(3, 3);
        attributes.profile = Some(GLProfile::Core);
        attributes.flags |= ConfigAttributeFlags::DEBUG | ConfigAttributeFlags::FORWARD_COMPATIBLE;
        let extensions = GlxExtensions::CREATE_CONTEXT | GlxExtensions::CREATE_CONTEXT_PROFILE;
        let list = context_attribute_list(extensions, &attributes).unwrap();
        assert_eq!(list, vec![
            GLX_CONTEXT_MAJOR_VERSION_ARB, 3,
            GLX_CONTEXT_MINOR_VERSION_ARB, 3,
            GLX_CONTEXT_PROFILE_MASK_ARB, GLX_CONTEXT_CORE_PROFILE_BIT_ARB,
            GLX_CONTEXT_FLAGS_ARB,
            GLX_CONTEXT_DEBUG_BIT_ARB | GLX_CONTEXT_FORWARD_COMPATIBLE_BIT_ARB,
            0,
        ]);

        attributes.profile = Some(GLProfile::Compatibility);
        attributes.flags = ConfigAttributeFlags::DOUBLE_BUFFERED;
        let list = context_attribute_list(extensions, &attributes).unwrap();
        assert_eq!(&list[4..], &[
            GLX_CONTEXT_PROFILE_MASK_ARB, GLX_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB,
            0,
        ]);
    }

    #[test]
    fn test_profile_needs_profile_extension() {
        let mut attributes = gl_attributes(3, 2);
        attributes.profile = Some(GLProfile::Core);
        assert!(matches!(context_attribute_list(GlxExtensions::CREATE_CONTEXT, &attributes),
                         Err(Error::UnsupportedOnThisPlatform)));
    }

    #[test]
    fn test_legacy_compatibility() {
        assert!(is_legacy_compatible(&gl_attributes(1, 0)));
        assert!(is_legacy_compatible(&gl_attributes(3, 0)));
        assert!(!is_legacy_compatible(&gl_attributes(3, 1)));

        let mut attributes = gl_attributes(2, 1);
        attributes.flags |= ConfigAttributeFlags::DEBUG;
        assert!(!is_legacy_compatible(&attributes));

        let mut attributes = gl_attributes(3, 2);
        attributes.profile = Some(GLProfile::Compatibility);
        assert!(!is_legacy_compatible(&attributes));
    }
}
