// glplatform/src/platform/glx/config.rs
//
//! GLX framebuffer configurations.

use crate::config::{ConfigAttributeFlags, ConfigAttributes};
use crate::info::GLApi;
use crate::Error;
use super::display::{Display, OwnedDisplay};
use super::ffi::glx::types::GLXFBConfig;
use super::ffi::{GLX_ALPHA_SIZE, GLX_BLUE_SIZE, GLX_DEPTH_SIZE, GLX_DONT_CARE, GLX_DOUBLEBUFFER};
use super::ffi::{GLX_DRAWABLE_TYPE, GLX_GREEN_SIZE, GLX_RED_SIZE, GLX_RENDER_TYPE, GLX_RGBA_BIT};
use super::ffi::{GLX_SAMPLES, GLX_SAMPLE_BUFFERS, GLX_STENCIL_SIZE, GLX_TRUE_COLOR};
use super::ffi::{GLX_WINDOW_BIT, GLX_X_RENDERABLE, GLX_X_VISUAL_TYPE};

use std::os::raw::{c_int, c_void};
use std::rc::Rc;
use x11_dl::xlib::{self, Visual, VisualID, XVisualInfo};

/// A framebuffer configuration together with the X visual that windows must use with it.
pub struct Config {
    pub(crate) native_display: Rc<OwnedDisplay>,
    pub(crate) glx_fb_config: GLXFBConfig,
    pub(crate) visual: *mut Visual,
    pub(crate) visual_id: VisualID,
    pub(crate) depth: c_int,
    pub(crate) attributes: ConfigAttributes,
}

impl Config {
    pub(crate) fn choose(display: &Display, attributes: &ConfigAttributes)
                         -> Result<Config, Error> {
        attributes.validate()?;

        let native_display = &display.native_display;
        check_api(native_display.gl_api, attributes.api)?;

        let flags = attributes.flags;
        let double_buffered = flags.contains(ConfigAttributeFlags::DOUBLE_BUFFERED);
        let sample_buffers = flags.contains(ConfigAttributeFlags::SAMPLE_BUFFERS);

        let fb_config_attributes = [
            GLX_X_RENDERABLE,       xlib::True,
            GLX_DRAWABLE_TYPE,      GLX_WINDOW_BIT,
            GLX_RENDER_TYPE,        GLX_RGBA_BIT,
            GLX_X_VISUAL_TYPE,      GLX_TRUE_COLOR,
            GLX_RED_SIZE,           size_or_dont_care(attributes.red_size),
            GLX_GREEN_SIZE,         size_or_dont_care(attributes.green_size),
            GLX_BLUE_SIZE,          size_or_dont_care(attributes.blue_size),
            GLX_ALPHA_SIZE,         size_or_dont_care(attributes.alpha_size),
            GLX_DEPTH_SIZE,         size_or_dont_care(attributes.depth_size),
            GLX_STENCIL_SIZE,       size_or_dont_care(attributes.stencil_size),
            GLX_DOUBLEBUFFER,       double_buffered as c_int,
            GLX_SAMPLE_BUFFERS,     sample_buffers as c_int,
            GLX_SAMPLES,            attributes.samples as c_int,
            0,
        ];

        unsafe {
            let glx = &native_display.glx;
            let glx_display = native_display.glx_display();

            let mut config_count = 0;
            let configs = glx.ChooseFBConfig(glx_display,
                                             native_display.screen,
                                             fb_config_attributes.as_ptr(),
                                             &mut config_count);
            if configs.is_null() || config_count == 0 {
                if !configs.is_null() {
                    (native_display.xlib.XFree)(configs as *mut c_void);
                }
                return Err(Error::NoPixelFormatFound);
            }

            // The list is sorted best match first.
            let glx_fb_config = *configs;
            (native_display.xlib.XFree)(configs as *mut c_void);

            let visual_info = glx.GetVisualFromFBConfig(glx_display, glx_fb_config)
                as *mut XVisualInfo;
            if visual_info.is_null() {
                return Err(Error::NoPixelFormatFound);
            }
            let (visual, visual_id, depth) =
                ((*visual_info).visual, (*visual_info).visualid, (*visual_info).depth);
            (native_display.xlib.XFree)(visual_info as *mut c_void);

            log::debug!("chose GLX framebuffer config with visual {:#x}, depth {}",
                        visual_id,
                        depth);

            Ok(Config {
                native_display: native_display.clone(),
                glx_fb_config,
                visual,
                visual_id,
                depth,
                attributes: *attributes,
            })
        }
    }

    #[inline]
    pub fn attributes(&self) -> &ConfigAttributes {
        &self.attributes
    }

    /// The X visual that windows rendered with this config must be created with.
    #[inline]
    pub fn visual_id(&self) -> VisualID {
        self.visual_id
    }

    pub(crate) fn destroy(self) -> Result<(), Error> {
        // GLX framebuffer configs belong to the display and are never freed individually.
        Ok(())
    }
}

/// GLX only drives desktop GL, and a config must match the API the platform loaded.
pub(crate) fn check_api(platform_api: GLApi, api: GLApi) -> Result<(), Error> {
    if api != GLApi::OpenGL {
        return Err(Error::BadAttribute(format!("GLX does not support {}", api)));
    }
    if api != platform_api {
        return Err(Error::BadAttribute(format!(
            "the config requests {}, but the platform was created for {}",
            api, platform_api
        )));
    }
    Ok(())
}

fn size_or_dont_care(size: Option<u32>) -> c_int {
    size.map_or(GLX_DONT_CARE, |size| size as c_int)
}

#[cfg(test)]
mod tests {
    use super::check_api;
    use crate::{Error, GLApi};

    const ALL_APIS: [GLApi; 4] =
        [GLApi::OpenGL, GLApi::OpenGLES1, GLApi::OpenGLES2, GLApi::OpenGLES3];

    #[test]
    fn test_only_desktop_gl_is_accepted() {
        assert!(check_api(GLApi::OpenGL, GLApi::OpenGL).is_ok());
        for &api in &ALL_APIS[1..] {
            match check_api(GLApi::OpenGL, api) {
                Err(Error::BadAttribute(message)) => assert!(message.contains(&api.to_string())),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn test_config_api_must_match_platform() {
        for &platform_api in &ALL_APIS {
            for &api in &ALL_APIS {
                assert_eq!(check_api(platform_api, api).is_ok(),
                           platform_api == GLApi::OpenGL && api == GLApi::OpenGL);
            }
        }
    }
}
