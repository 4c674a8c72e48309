// glplatform/src/platform/cgl/context.rs
//
//! Wrapper for Core OpenGL pixel formats and contexts.

use crate::config::{ConfigAttributeFlags, ConfigAttributes};
use crate::info::{GLProfile, GLVersion};
use crate::Error;
use super::display::Display;
use super::error::{kCGLNoError, ToWindowingApiError};

use cgl::{kCGLPFAAlphaSize, kCGLPFAColorSize, kCGLPFADepthSize, kCGLPFADoubleBuffer};
use cgl::{kCGLPFAOpenGLProfile, kCGLPFASampleBuffers, kCGLPFASamples, kCGLPFAStencilSize};
use cgl::{CGLChoosePixelFormat, CGLContextObj, CGLCreateContext, CGLDestroyContext};
use cgl::{CGLPixelFormatAttribute, CGLPixelFormatObj, CGLReleasePixelFormat};
use cgl::CGLSetCurrentContext;
use std::ptr;
use std::thread;

// Choose a renderer compatible with GL 1.0.
#[allow(non_upper_case_globals)]
const kCGLOGLPVersion_Legacy: CGLPixelFormatAttribute = 0x1000;
// Choose a renderer capable of GL3.2 or later.
#[allow(non_upper_case_globals)]
const kCGLOGLPVersion_3_2_Core: CGLPixelFormatAttribute = 0x3200;
// Choose a renderer capable of GL4.1 or later.
#[allow(non_upper_case_globals)]
const kCGLOGLPVersion_GL4_Core: CGLPixelFormatAttribute = 0x4100;

/// A CGL pixel format.
pub struct Config {
    pub(crate) cgl_pixel_format: CGLPixelFormatObj,
    pub(crate) attributes: ConfigAttributes,
}

impl Drop for Config {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            CGLReleasePixelFormat(self.cgl_pixel_format);
        }
    }
}

impl Config {
    pub(crate) fn choose(display: &Display, attributes: &ConfigAttributes)
                         -> Result<Config, Error> {
        attributes.validate()?;
        if !display.supports_context_api(attributes.api) {
            return Err(Error::BadAttribute(format!("CGL does not support {}", attributes.api)));
        }
        if attributes.api != display.gl_api {
            return Err(Error::BadAttribute(format!(
                "the config requests {}, but the platform was created for {}",
                attributes.api, display.gl_api
            )));
        }

        let cgl_pixel_format_attributes = pixel_format_attributes(attributes)?;

        unsafe {
            let (mut cgl_pixel_format, mut cgl_pixel_format_count) = (ptr::null_mut(), 0);
            let err = CGLChoosePixelFormat(cgl_pixel_format_attributes.as_ptr(),
                                           &mut cgl_pixel_format,
                                           &mut cgl_pixel_format_count);
            if err != kCGLNoError {
                log::debug!("CGLChoosePixelFormat failed: {:?}", err.to_windowing_api_error());
                return Err(Error::NoPixelFormatFound);
            }
            if cgl_pixel_format_count == 0 || cgl_pixel_format.is_null() {
                return Err(Error::NoPixelFormatFound);
            }

            Ok(Config { cgl_pixel_format, attributes: *attributes })
        }
    }

    #[inline]
    pub fn attributes(&self) -> &ConfigAttributes {
        &self.attributes
    }
}

// Anything newer than 2.1 is only available as a core profile.
fn renderer_profile(attributes: &ConfigAttributes) -> Result<CGLPixelFormatAttribute, Error> {
    let version = attributes.version;
    let profile = if version >= GLVersion::new(4, 0) {
        kCGLOGLPVersion_GL4_Core
    } else if version > GLVersion::new(2, 1) {
        kCGLOGLPVersion_3_2_Core
    } else {
        kCGLOGLPVersion_Legacy
    };
    if profile != kCGLOGLPVersion_Legacy &&
            attributes.profile == Some(GLProfile::Compatibility) {
        return Err(Error::UnsupportedOnThisPlatform);
    }
    Ok(profile)
}

fn pixel_format_attributes(attributes: &ConfigAttributes)
                           -> Result<Vec<CGLPixelFormatAttribute>, Error> {
    let color_size = match (attributes.red_size, attributes.green_size, attributes.blue_size) {
        (None, None, None) => None,
        (red, green, blue) => {
            Some(red.unwrap_or(0) + green.unwrap_or(0) + blue.unwrap_or(0))
        }
    };

    let mut list = vec![kCGLPFAOpenGLProfile, renderer_profile(attributes)?];
    let sizes = [
        (kCGLPFAColorSize, color_size),
        (kCGLPFAAlphaSize, attributes.alpha_size),
        (kCGLPFADepthSize, attributes.depth_size),
        (kCGLPFAStencilSize, attributes.stencil_size),
    ];
    for &(key, size) in &sizes {
        if let Some(size) = size {
            list.extend_from_slice(&[key, size as CGLPixelFormatAttribute]);
        }
    }
    if attributes.flags.contains(ConfigAttributeFlags::DOUBLE_BUFFERED) {
        list.push(kCGLPFADoubleBuffer);
    }
    if attributes.flags.contains(ConfigAttributeFlags::SAMPLE_BUFFERS) {
        list.extend_from_slice(&[
            kCGLPFASampleBuffers, 1,
            kCGLPFASamples, attributes.samples as CGLPixelFormatAttribute,
        ]);
    }
    list.extend_from_slice(&[0, 0]);
    Ok(list)
}

/// Represents a CGL rendering context.
///
/// A context must be explicitly destroyed with `Cgl::context_destroy()`, or a panic will occur.
pub struct Context {
    pub(crate) cgl_context: CGLContextObj,
}

impl Drop for Context {
    #[inline]
    fn drop(&mut self) {
        if !self.cgl_context.is_null() && !thread::panicking() {
            panic!("Contexts must be destroyed explicitly with `context_destroy`!")
        }
    }
}

impl Context {
    pub(crate) fn create(config: &Config, share_with: Option<&Context>) -> Result<Context, Error> {
        unsafe {
            let mut cgl_context = ptr::null_mut();
            let err = CGLCreateContext(config.cgl_pixel_format,
                                       share_with.map_or(ptr::null_mut(), |ctx| ctx.cgl_context),
                                       &mut cgl_context);
            if err != kCGLNoError {
                return Err(Error::ContextCreationFailed(err.to_windowing_api_error()));
            }
            debug_assert!(!cgl_context.is_null());
            Ok(Context { cgl_context })
        }
    }

    pub(crate) fn destroy(mut self) -> Result<(), Error> {
        let cgl_context = self.cgl_context;
        self.cgl_context = ptr::null_mut();
        unsafe {
            let err = CGLDestroyContext(cgl_context);
            if err != kCGLNoError {
                return Err(Error::ContextDestructionFailed(err.to_windowing_api_error()));
            }
        }
        Ok(())
    }

    /// Returns the raw `CGLContextObj`.
    #[inline]
    pub fn cgl_context(&self) -> CGLContextObj {
        self.cgl_context
    }
}

pub(crate) fn make_current(context: Option<&Context>) -> Result<(), Error> {
    unsafe {
        let err = CGLSetCurrentContext(context.map_or(ptr::null_mut(), |ctx| ctx.cgl_context));
        if err != kCGLNoError {
            return Err(Error::MakeCurrentFailed(err.to_windowing_api_error()));
        }
    }
    Ok(())
}
