// glplatform/src/config.rs
//
//! Attributes that describe a framebuffer configuration ("pixel format").

use crate::info::{GLApi, GLProfile, GLVersion};
use crate::Error;

use bitflags::bitflags;

/// Terminates an attribute list.
pub const ATTRIB_NONE: i32 = 0;
/// Value meaning "no preference" for any size or boolean attribute.
pub const DONT_CARE: i32 = -1;

pub const RED_SIZE: i32 = 0x0201;
pub const GREEN_SIZE: i32 = 0x0202;
pub const BLUE_SIZE: i32 = 0x0203;
pub const ALPHA_SIZE: i32 = 0x0204;
pub const DEPTH_SIZE: i32 = 0x0205;
pub const STENCIL_SIZE: i32 = 0x0206;
pub const SAMPLE_BUFFERS: i32 = 0x0207;
pub const SAMPLES: i32 = 0x0208;
pub const DOUBLE_BUFFERED: i32 = 0x0209;
pub const CONTEXT_API: i32 = 0x020a;
pub const CONTEXT_MAJOR_VERSION: i32 = 0x020e;
pub const CONTEXT_MINOR_VERSION: i32 = 0x020f;
pub const CONTEXT_PROFILE: i32 = 0x0210;
pub const CONTEXT_FORWARD_COMPATIBLE: i32 = 0x0215;
pub const CONTEXT_DEBUG: i32 = 0x0216;

bitflags! {
    /// Boolean attributes of a config.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ConfigAttributeFlags: u8 {
        const DOUBLE_BUFFERED    = 0x01;
        const SAMPLE_BUFFERS     = 0x02;
        const FORWARD_COMPATIBLE = 0x04;
        const DEBUG              = 0x08;
    }
}

/// Requirements for a framebuffer configuration and the contexts created from it.
///
/// Channel sizes of `None` mean "don't care".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConfigAttributes {
    pub api: GLApi,
    pub version: GLVersion,
    pub profile: Option<GLProfile>,
    pub red_size: Option<u32>,
    pub green_size: Option<u32>,
    pub blue_size: Option<u32>,
    pub alpha_size: Option<u32>,
    pub depth_size: Option<u32>,
    pub stencil_size: Option<u32>,
    pub samples: u32,
    pub flags: ConfigAttributeFlags,
}

impl ConfigAttributes {
    /// Default attributes for `api`: lowest version, no profile, double-buffered, no
    /// preference on channel sizes.
    pub fn new(api: GLApi) -> ConfigAttributes {
        ConfigAttributes {
            api,
            version: GLVersion::default_for(api),
            profile: None,
            red_size: None,
            green_size: None,
            blue_size: None,
            alpha_size: None,
            depth_size: None,
            stencil_size: None,
            samples: 0,
            flags: ConfigAttributeFlags::DOUBLE_BUFFERED,
        }
    }

    /// Parses a `(key, value)` list terminated by `ATTRIB_NONE`.
    ///
    /// `CONTEXT_API` is required. Later occurrences of a key override earlier ones.
    pub fn from_attrib_list(list: &[i32]) -> Result<ConfigAttributes, Error> {
        let mut api = None;
        let mut major = None;
        let mut minor = None;
        let mut profile = None;
        let mut sizes = [None; 6];
        let mut samples = 0;
        let mut flags = ConfigAttributeFlags::DOUBLE_BUFFERED;

        let mut pairs = list.chunks(2);
        loop {
            let (key, value) = match pairs.next() {
                Some(&[ATTRIB_NONE, ..]) => break,
                Some(&[key, value]) => (key, value),
                Some(_) | None => {
                    return Err(Error::BadAttribute(
                        "attribute list is not terminated by ATTRIB_NONE".to_owned(),
                    ))
                }
            };

            match key {
                CONTEXT_API => {
                    api = Some(GLApi::from_raw(value).map_err(|_| bad_value(key, value))?)
                }
                CONTEXT_MAJOR_VERSION => major = Some(version_component(key, value)?),
                CONTEXT_MINOR_VERSION => minor = Some(version_component(key, value)?),
                CONTEXT_PROFILE => {
                    profile = match value {
                        ATTRIB_NONE => None,
                        GLProfile::RAW_CORE => Some(GLProfile::Core),
                        GLProfile::RAW_COMPATIBILITY => Some(GLProfile::Compatibility),
                        _ => return Err(bad_value(key, value)),
                    }
                }
                RED_SIZE | GREEN_SIZE | BLUE_SIZE | ALPHA_SIZE | DEPTH_SIZE | STENCIL_SIZE => {
                    sizes[(key - RED_SIZE) as usize] = size(key, value)?;
                }
                SAMPLES => samples = size(key, value)?.unwrap_or(0),
                SAMPLE_BUFFERS => {
                    set_flag(&mut flags, ConfigAttributeFlags::SAMPLE_BUFFERS, key, value)?
                }
                DOUBLE_BUFFERED => {
                    set_flag(&mut flags, ConfigAttributeFlags::DOUBLE_BUFFERED, key, value)?
                }
                CONTEXT_FORWARD_COMPATIBLE => {
                    set_flag(&mut flags, ConfigAttributeFlags::FORWARD_COMPATIBLE, key, value)?
                }
                CONTEXT_DEBUG => set_flag(&mut flags, ConfigAttributeFlags::DEBUG, key, value)?,
                _ => {
                    return Err(Error::BadAttribute(format!("unrecognized attribute {:#x}", key)))
                }
            }
        }

        let api = match api {
            Some(api) => api,
            None => return Err(Error::BadAttribute("CONTEXT_API is required".to_owned())),
        };

        let default_version = GLVersion::default_for(api);
        let version = match (major, minor) {
            (None, None) => default_version,
            (Some(major), minor) => GLVersion::new(major, minor.unwrap_or(0)),
            (None, Some(minor)) => GLVersion::new(default_version.major, minor),
        };

        let attributes = ConfigAttributes {
            api,
            version,
            profile,
            red_size: sizes[0],
            green_size: sizes[1],
            blue_size: sizes[2],
            alpha_size: sizes[3],
            depth_size: sizes[4],
            stencil_size: sizes[5],
            samples,
            flags,
        };
        attributes.validate()?;
        Ok(attributes)
    }

    /// Checks that the attributes are coherent with each other.
    pub fn validate(&self) -> Result<(), Error> {
        let version = self.version;
        match self.api {
            GLApi::OpenGL => {
                if self.profile.is_some() && version < GLVersion::new(3, 2) {
                    return Err(Error::BadAttribute(format!(
                        "a context profile requires OpenGL 3.2 or later, not {}.{}",
                        version.major, version.minor
                    )));
                }
                if self.flags.contains(ConfigAttributeFlags::FORWARD_COMPATIBLE) &&
                        version < GLVersion::new(3, 0) {
                    return Err(Error::BadAttribute(
                        "forward-compatible contexts require OpenGL 3.0 or later".to_owned(),
                    ));
                }
            }
            api => {
                let expected_major = match api {
                    GLApi::OpenGLES1 => 1,
                    GLApi::OpenGLES2 => 2,
                    _ => 3,
                };
                if version.major != expected_major {
                    return Err(Error::BadAttribute(format!(
                        "version {}.{} is invalid for {}",
                        version.major, version.minor, api
                    )));
                }
                if self.profile.is_some() {
                    return Err(Error::BadAttribute(format!("{} has no context profiles", api)));
                }
                if self.flags.contains(ConfigAttributeFlags::FORWARD_COMPATIBLE) {
                    return Err(Error::BadAttribute(format!(
                        "{} has no forward-compatible contexts",
                        api
                    )));
                }
            }
        }
        Ok(())
    }
}

fn bad_value(key: i32, value: i32) -> Error {
    Error::BadAttribute(format!("attribute {:#x} has bad value {:#x}", key, value))
}

fn version_component(key: i32, value: i32) -> Result<u8, Error> {
    if (0..=u8::MAX as i32).contains(&value) {
        Ok(value as u8)
    } else {
        Err(bad_value(key, value))
    }
}

fn size(key: i32, value: i32) -> Result<Option<u32>, Error> {
    match value {
        DONT_CARE => Ok(None),
        value if value >= 0 => Ok(Some(value as u32)),
        _ => Err(bad_value(key, value)),
    }
}

fn set_flag(flags: &mut ConfigAttributeFlags,
            flag: ConfigAttributeFlags,
            key: i32,
            value: i32)
            -> Result<(), Error> {
    match value {
        DONT_CARE => {}
        0 => flags.remove(flag),
        1 => flags.insert(flag),
        _ => return Err(bad_value(key, value)),
    }
    Ok(())
}
