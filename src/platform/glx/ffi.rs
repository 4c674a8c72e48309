// glplatform/src/platform/glx/ffi.rs
//
//! GLX entry points and constants.

#![allow(non_upper_case_globals, dead_code)]

use std::os::raw::c_int;

#[allow(non_camel_case_types, non_snake_case, clippy::all)]
pub(crate) mod glx {
    include!(concat!(env!("OUT_DIR"), "/glx_bindings.rs"));
}

pub(crate) const GLX_RGBA_TYPE: c_int = 0x8014;
pub(crate) const GLX_DONT_CARE: c_int = -1;

// Framebuffer config attributes.
pub(crate) const GLX_DOUBLEBUFFER: c_int = 5;
pub(crate) const GLX_RED_SIZE: c_int = 8;
pub(crate) const GLX_GREEN_SIZE: c_int = 9;
pub(crate) const GLX_BLUE_SIZE: c_int = 10;
pub(crate) const GLX_ALPHA_SIZE: c_int = 11;
pub(crate) const GLX_DEPTH_SIZE: c_int = 12;
pub(crate) const GLX_STENCIL_SIZE: c_int = 13;
pub(crate) const GLX_X_VISUAL_TYPE: c_int = 0x22;
pub(crate) const GLX_TRUE_COLOR: c_int = 0x8002;
pub(crate) const GLX_DRAWABLE_TYPE: c_int = 0x8010;
pub(crate) const GLX_RENDER_TYPE: c_int = 0x8011;
pub(crate) const GLX_X_RENDERABLE: c_int = 0x8012;
pub(crate) const GLX_WINDOW_BIT: c_int = 0x0001;
pub(crate) const GLX_RGBA_BIT: c_int = 0x0001;
pub(crate) const GLX_SAMPLE_BUFFERS: c_int = 100000;
pub(crate) const GLX_SAMPLES: c_int = 100001;

// GLX_ARB_create_context and GLX_ARB_create_context_profile.
pub(crate) const GLX_CONTEXT_MAJOR_VERSION_ARB: c_int = 0x2091;
pub(crate) const GLX_CONTEXT_MINOR_VERSION_ARB: c_int = 0x2092;
pub(crate) const GLX_CONTEXT_FLAGS_ARB: c_int = 0x2094;
pub(crate) const GLX_CONTEXT_PROFILE_MASK_ARB: c_int = 0x9126;
pub(crate) const GLX_CONTEXT_DEBUG_BIT_ARB: c_int = 0x0001;
pub(crate) const GLX_CONTEXT_FORWARD_COMPATIBLE_BIT_ARB: c_int = 0x0002;
pub(crate) const GLX_CONTEXT_CORE_PROFILE_BIT_ARB: c_int = 0x0001;
pub(crate) const GLX_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB: c_int = 0x0002;

// Core X protocol error codes.
pub(crate) const X_BAD_VALUE: u8 = 2;
pub(crate) const X_BAD_WINDOW: u8 = 3;
pub(crate) const X_BAD_MATCH: u8 = 8;
pub(crate) const X_BAD_DRAWABLE: u8 = 9;
pub(crate) const X_BAD_ALLOC: u8 = 11;
