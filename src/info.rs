// glplatform/src/info.rs
//
//! OpenGL information.

use crate::Error;

use std::fmt::{self, Display, Formatter};

/// The GL variant that a platform, config or context is requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GLApi {
    /// Desktop OpenGL.
    OpenGL,
    /// OpenGL ES 1.x.
    OpenGLES1,
    /// OpenGL ES 2.x.
    OpenGLES2,
    /// OpenGL ES 3.x.
    OpenGLES3,
}

impl GLApi {
    pub const RAW_OPENGL: i32 = 0x020b;
    pub const RAW_OPENGL_ES1: i32 = 0x020c;
    pub const RAW_OPENGL_ES2: i32 = 0x020d;
    pub const RAW_OPENGL_ES3: i32 = 0x0214;

    /// Converts a raw API code received through the C interface.
    ///
    /// A value outside the known set is a programming error upstream and is reported as
    /// `Error::Internal`.
    pub fn from_raw(raw: i32) -> Result<GLApi, Error> {
        match raw {
            GLApi::RAW_OPENGL => Ok(GLApi::OpenGL),
            GLApi::RAW_OPENGL_ES1 => Ok(GLApi::OpenGLES1),
            GLApi::RAW_OPENGL_ES2 => Ok(GLApi::OpenGLES2),
            GLApi::RAW_OPENGL_ES3 => Ok(GLApi::OpenGLES3),
            _ => Err(Error::Internal(format!("gl_api has bad value {:#x}", raw))),
        }
    }

    #[inline]
    pub fn to_raw(self) -> i32 {
        match self {
            GLApi::OpenGL => GLApi::RAW_OPENGL,
            GLApi::OpenGLES1 => GLApi::RAW_OPENGL_ES1,
            GLApi::OpenGLES2 => GLApi::RAW_OPENGL_ES2,
            GLApi::OpenGLES3 => GLApi::RAW_OPENGL_ES3,
        }
    }

    #[inline]
    pub fn is_gles(self) -> bool {
        self != GLApi::OpenGL
    }
}

impl Display for GLApi {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match *self {
            GLApi::OpenGL => "OpenGL",
            GLApi::OpenGLES1 => "OpenGL ES1",
            GLApi::OpenGLES2 => "OpenGL ES2",
            GLApi::OpenGLES3 => "OpenGL ES3",
        })
    }
}

/// Describes the OpenGL version that is requested when a context is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GLVersion {
    /// The major OpenGL version (e.g. 4 in 4.2).
    pub major: u8,
    /// The minor OpenGL version (e.g. 2 in 4.2).
    pub minor: u8,
}

impl GLVersion {
    #[inline]
    pub fn new(major: u8, minor: u8) -> GLVersion {
        GLVersion { major, minor }
    }

    /// The lowest version that makes sense for `api`.
    pub fn default_for(api: GLApi) -> GLVersion {
        match api {
            GLApi::OpenGL | GLApi::OpenGLES1 => GLVersion::new(1, 0),
            GLApi::OpenGLES2 => GLVersion::new(2, 0),
            GLApi::OpenGLES3 => GLVersion::new(3, 0),
        }
    }
}

/// The desktop OpenGL profile. Only meaningful for OpenGL 3.2 and later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GLProfile {
    Core,
    Compatibility,
}

impl GLProfile {
    pub const RAW_CORE: i32 = 0x0211;
    pub const RAW_COMPATIBILITY: i32 = 0x0212;
}

#[cfg(test)]
mod tests {
    use super::{GLApi, GLVersion};
    use crate::Error;

    #[test]
    fn test_raw_api_values() {
        for &api in &[GLApi::OpenGL, GLApi::OpenGLES1, GLApi::OpenGLES2, GLApi::OpenGLES3] {
            assert_eq!(GLApi::from_raw(api.to_raw()), Ok(api));
        }
    }

    #[test]
    fn test_unknown_raw_api_is_internal() {
        match GLApi::from_raw(0x7777) {
            Err(Error::Internal(message)) => assert!(message.contains("0x7777")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_version_ordering() {
        assert!(GLVersion::new(3, 2) > GLVersion::new(3, 1));
        assert!(GLVersion::new(4, 0) > GLVersion::new(3, 3));
        assert_eq!(GLVersion::default_for(GLApi::OpenGLES2), GLVersion::new(2, 0));
    }
}
