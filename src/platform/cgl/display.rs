// glplatform/src/platform/cgl/display.rs
//
//! CGL has no display connection; this stands in for one.

use crate::info::GLApi;
use crate::library::Library;
use crate::platform::Platform;
use crate::Error;
use super::Cgl;

use std::rc::Rc;

/// The process-wide Core OpenGL "display".
pub struct Display {
    pub(crate) gl_api: GLApi,
    _library: Rc<Library>,
}

impl Display {
    pub(crate) fn connect(platform: &Platform<Cgl>, name: Option<&str>) -> Result<Display, Error> {
        if let Some(name) = name {
            log::debug!("ignoring display name \"{}\" on CGL", name);
        }
        Ok(Display { gl_api: platform.gl_api(), _library: platform.retain_library() })
    }

    #[inline]
    pub(crate) fn disconnect(self) -> Result<(), Error> {
        Ok(())
    }

    #[inline]
    pub(crate) fn supports_context_api(&self, api: GLApi) -> bool {
        api == GLApi::OpenGL
    }
}
