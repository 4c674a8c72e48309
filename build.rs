// glplatform/build.rs
//
//! The `glplatform` build script.

use cfg_aliases::cfg_aliases;
use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};
use std::env;
use std::fs::File;
use std::path::PathBuf;

fn main() {
    // Setup aliases for #[cfg] checks
    cfg_aliases! {
        // Platforms
        macos: { target_os = "macos" },
        android: { target_os = "android" },
        linux: { all(unix, not(any(macos, android, target_env = "ohos"))) },

        // Backends
        glx_backend: { all(linux, feature = "glx") },
        cgl_backend: { macos },
    }

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap();
    let target_family = env::var("CARGO_CFG_TARGET_FAMILY").ok();
    let dest = PathBuf::from(&env::var("OUT_DIR").unwrap());

    // Generate GLX bindings.
    let is_unix = target_family.as_ref().map_or(false, |f| f == "unix");
    if is_unix && target_os != "macos" && target_os != "android" {
        let mut file = File::create(dest.join("glx_bindings.rs")).unwrap();
        let registry = Registry::new(
            Api::Glx,
            (1, 4),
            Profile::Core,
            Fallbacks::All,
            [
                "GLX_ARB_create_context",
                "GLX_ARB_create_context_profile",
            ],
        );
        registry.write_bindings(StructGenerator, &mut file).unwrap();
    }
}
