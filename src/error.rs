// glplatform/src/error.rs
//
//! Various errors that methods can produce.

use std::fmt::{self, Display, Formatter};

/// Various errors that methods can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// An attribute or GL API was requested that this backend does not support.
    ///
    /// This is recoverable: the caller should pick another backend or API.
    BadAttribute(String),
    /// A parameter passed to a method was out of range.
    BadParameter(String),
    /// A value outside every known enumeration reached this library. This indicates a defect in
    /// the caller or in upstream validation.
    Internal(String),
    /// A native allocation failed.
    OutOfMemory,
    /// The operating system or native library reported a failure, for example when loading or
    /// unloading the GL library.
    Unknown(String),
    /// The platform doesn't support this method.
    UnsupportedOnThisPlatform,
    /// A connection to the display server could not be opened.
    ConnectionFailed,
    /// The system couldn't choose an OpenGL pixel format.
    NoPixelFormatFound,
    /// The system couldn't create an OpenGL context.
    ContextCreationFailed(WindowingApiError),
    /// The system couldn't destroy the OpenGL context.
    ContextDestructionFailed(WindowingApiError),
    /// The system couldn't make the OpenGL context current or not current.
    MakeCurrentFailed(WindowingApiError),
    /// The system couldn't create a window.
    SurfaceCreationFailed(WindowingApiError),
    /// Objects created on different displays were used together.
    IncompatibleDisplay,
    /// Looking up a required GL or windowing-system function failed.
    GLFunctionNotFound,
}

/// The error codes reported through the C interface.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0x00,
    FatalError = 0x01,
    UnknownError = 0x02,
    InternalError = 0x03,
    BadAlloc = 0x04,
    NotInitialized = 0x05,
    AlreadyInitialized = 0x06,
    BadAttribute = 0x08,
    BadParameter = 0x10,
    BadDisplayMatch = 0x11,
    UnsupportedOnPlatform = 0x12,
}

/// Abstraction of the errors that CGL, GLX and Xlib return.
///
/// They all tend to follow similar patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowingApiError {
    /// Miscellaneous error.
    Failed,
    /// CGL: Invalid pixel format attribute.
    /// X11: Attribute to get is bad.
    BadAttribute,
    /// CGL: Invalid pixel format object.
    /// X11: Invalid framebuffer configuration, including an unsupported OpenGL version.
    BadPixelFormat,
    /// CGL: Invalid context object.
    /// X11: The context is invalid.
    BadContext,
    /// Invalid drawable.
    BadDrawable,
    /// CGL: Invalid display.
    BadDisplay,
    /// CGL: Invalid numerical value.
    /// X11: Invalid value.
    BadValue,
    /// CGL: Invalid share context.
    /// X11: Parameters do not match.
    BadMatch,
    /// CGL: Invalid enumerant (constant).
    /// X11: Invalid enum value.
    BadEnumeration,
    /// CGL: Invalid window.
    /// X11: The window does not exist.
    BadWindow,
    /// CGL: Invalid memory allocation.
    /// X11: The server failed to allocate the requested resource.
    BadAlloc,
    /// X11: Screen number is bad.
    BadScreen,
    /// X11: The GLX extension is unavailable on the server.
    NoExtension,
    /// X11: Visual number not known by GLX.
    BadVisual,
}

impl Error {
    /// Returns the C-visible code for this error.
    pub fn code(&self) -> ErrorCode {
        match *self {
            Error::BadAttribute(_) => ErrorCode::BadAttribute,
            Error::BadParameter(_) => ErrorCode::BadParameter,
            Error::Internal(_) => ErrorCode::InternalError,
            Error::OutOfMemory => ErrorCode::BadAlloc,
            Error::UnsupportedOnThisPlatform => ErrorCode::UnsupportedOnPlatform,
            Error::IncompatibleDisplay => ErrorCode::BadDisplayMatch,
            Error::Unknown(_) |
            Error::ConnectionFailed |
            Error::NoPixelFormatFound |
            Error::ContextCreationFailed(_) |
            Error::ContextDestructionFailed(_) |
            Error::MakeCurrentFailed(_) |
            Error::SurfaceCreationFailed(_) |
            Error::GLFunctionNotFound => ErrorCode::UnknownError,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Error::BadAttribute(ref message) |
            Error::BadParameter(ref message) |
            Error::Unknown(ref message) => f.write_str(message),
            Error::Internal(ref message) => write!(f, "internal error: {}", message),
            Error::OutOfMemory => f.write_str("out of memory"),
            Error::UnsupportedOnThisPlatform => {
                f.write_str("the operation is not supported on this platform")
            }
            Error::ConnectionFailed => f.write_str("failed to connect to the display server"),
            Error::NoPixelFormatFound => f.write_str("no matching pixel format was found"),
            Error::ContextCreationFailed(err) => write!(f, "context creation failed: {:?}", err),
            Error::ContextDestructionFailed(err) => {
                write!(f, "context destruction failed: {:?}", err)
            }
            Error::MakeCurrentFailed(err) => write!(f, "make current failed: {:?}", err),
            Error::SurfaceCreationFailed(err) => write!(f, "window creation failed: {:?}", err),
            Error::IncompatibleDisplay => {
                f.write_str("the objects were created on different displays")
            }
            Error::GLFunctionNotFound => f.write_str("a required GL function was not found"),
        }
    }
}

impl std::error::Error for Error {}
