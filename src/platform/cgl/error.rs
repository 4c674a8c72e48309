// glplatform/src/platform/cgl/error.rs
//
//! Translation of errors from the CGL API.

use crate::WindowingApiError;
use cgl::CGLError;

// No CGL error occurred.
#[allow(non_upper_case_globals)]
pub(crate) const kCGLNoError: CGLError = 0;

pub(crate) trait ToWindowingApiError {
    fn to_windowing_api_error(self) -> WindowingApiError;
}

impl ToWindowingApiError for CGLError {
    fn to_windowing_api_error(self) -> WindowingApiError {
        match self {
            10000 => WindowingApiError::BadAttribute,
            10002 => WindowingApiError::BadPixelFormat,
            10004 => WindowingApiError::BadContext,
            10005 => WindowingApiError::BadDrawable,
            10006 => WindowingApiError::BadDisplay,
            10008 => WindowingApiError::BadValue,
            10009 => WindowingApiError::BadMatch,
            10010 => WindowingApiError::BadEnumeration,
            10013 => WindowingApiError::BadWindow,
            10016 => WindowingApiError::BadAlloc,
            _ => WindowingApiError::Failed,
        }
    }
}
