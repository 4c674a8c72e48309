// glplatform/src/tests.rs
//
//! Unit tests.

use crate::backend::{Backend, BackendKind};
use crate::config::ConfigAttributes;
use crate::library::{Library, LibraryLoader, NativeLibrary};
use crate::{Error, GLApi, Platform};

use euclid::default::Size2D;
use std::cell::Cell;
use std::os::raw::c_void;
use std::ptr;
use std::rc::Rc;

static MOCK_FUNCTION: u8 = 0;
const MOCK_FUNCTION_NAME: &str = "glMockFunction";

#[derive(Default)]
struct LoaderState {
    opens: Cell<usize>,
    closes: Cell<usize>,
    fail_open: Cell<bool>,
    fail_close: Cell<bool>,
}

/// A loader that counts the handles it hands out and can be told to fail.
#[derive(Clone, Default)]
struct MockLoader {
    state: Rc<LoaderState>,
}

impl MockLoader {
    fn open_handles(&self) -> usize {
        self.state.opens.get() - self.state.closes.get()
    }
}

impl LibraryLoader for MockLoader {
    fn open(&self, name: &str) -> Result<Box<dyn NativeLibrary>, Error> {
        if self.state.fail_open.get() {
            return Err(Error::Unknown(format!("dlopen(\"{}\") failed: mock", name)));
        }
        self.state.opens.set(self.state.opens.get() + 1);
        Ok(Box::new(MockLibrary {
            name: name.to_owned(),
            state: self.state.clone(),
            closed: false,
        }))
    }
}

struct MockLibrary {
    name: String,
    state: Rc<LoaderState>,
    closed: bool,
}

impl NativeLibrary for MockLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self, symbol: &str) -> *const c_void {
        if symbol == MOCK_FUNCTION_NAME {
            &MOCK_FUNCTION as *const u8 as *const c_void
        } else {
            ptr::null()
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    unsafe fn close(&mut self) -> Result<(), Error> {
        assert!(!self.closed, "library closed twice");
        self.closed = true;
        self.state.closes.set(self.state.closes.get() + 1);
        if self.state.fail_close.get() {
            return Err(Error::Unknown(format!("dlclose() failed on \"{}\": mock", self.name)));
        }
        Ok(())
    }
}

/// A backend that supports desktop GL and ES2 and has no native objects.
struct MockBackend<const N: u8>;

type Mock = MockBackend<0>;

struct MockDisplay {
    gl_api: GLApi,
    _library: Rc<Library>,
}

struct MockContext;

impl<const N: u8> Backend for MockBackend<N> {
    type Display = MockDisplay;
    type Config = ConfigAttributes;
    type Context = MockContext;
    type Window = Size2D<i32>;

    const KIND: BackendKind = BackendKind::Glx;

    fn library_name(gl_api: GLApi) -> Result<&'static str, Error> {
        match gl_api {
            GLApi::OpenGL | GLApi::OpenGLES2 => Ok("libmock.so"),
            api => Err(Error::BadAttribute(format!("Mock does not support {}", api))),
        }
    }

    fn display_connect(platform: &Platform<Self>, name: Option<&str>)
                       -> Result<MockDisplay, Error> {
        match name {
            Some("unreachable") => Err(Error::ConnectionFailed),
            _ => Ok(MockDisplay { gl_api: platform.gl_api(), _library: platform.retain_library() }),
        }
    }

    fn display_disconnect(_: MockDisplay) -> Result<(), Error> {
        Ok(())
    }

    fn display_supports_context_api(_: &MockDisplay, api: GLApi) -> bool {
        api == GLApi::OpenGL || api == GLApi::OpenGLES2
    }

    fn config_choose(display: &MockDisplay, attributes: &ConfigAttributes)
                     -> Result<ConfigAttributes, Error> {
        attributes.validate()?;
        if attributes.api != display.gl_api {
            return Err(Error::BadAttribute(format!("no {} configs", attributes.api)));
        }
        Ok(*attributes)
    }

    fn config_destroy(_: ConfigAttributes) -> Result<(), Error> {
        Ok(())
    }

    fn context_create(_: &ConfigAttributes, _: Option<&MockContext>) -> Result<MockContext, Error> {
        Ok(MockContext)
    }

    fn context_destroy(_: MockContext) -> Result<(), Error> {
        Ok(())
    }

    fn window_create(_: &ConfigAttributes, size: Size2D<i32>) -> Result<Size2D<i32>, Error> {
        if size.width <= 0 || size.height <= 0 {
            return Err(Error::BadParameter("window size is not positive".to_owned()));
        }
        Ok(size)
    }

    fn window_destroy(_: Size2D<i32>) -> Result<(), Error> {
        Ok(())
    }

    fn window_swap_buffers(_: &Size2D<i32>) -> Result<(), Error> {
        Ok(())
    }

    fn make_current(_: &MockDisplay, _: Option<&Size2D<i32>>, _: Option<&MockContext>)
                    -> Result<(), Error> {
        Ok(())
    }

    fn get_proc_address(platform: &Platform<Self>, name: &str) -> *const c_void {
        platform.library().symbol(name)
    }
}

#[test]
fn test_unsupported_api_reports_bad_attribute() {
    let loader = MockLoader::default();
    for &api in &[GLApi::OpenGLES1, GLApi::OpenGLES3] {
        match Platform::<Mock>::create_with_loader(api, &loader) {
            Err(Error::BadAttribute(message)) => assert!(message.contains(&api.to_string())),
            other => panic!("unexpected result: {:?}", other),
        }
    }
    assert_eq!(loader.state.opens.get(), 0);
}

#[test]
fn test_create_and_destroy() {
    let loader = MockLoader::default();
    for &api in &[GLApi::OpenGL, GLApi::OpenGLES2] {
        let platform = Platform::<Mock>::create_with_loader(api, &loader).unwrap();
        assert_eq!(platform.gl_api(), api);
        assert_eq!(platform.library_name(), "libmock.so");
        assert_eq!(loader.open_handles(), 1);
        platform.destroy().unwrap();
        assert_eq!(loader.open_handles(), 0);
    }
}

#[test]
fn test_load_failure_leaves_nothing_open() {
    let loader = MockLoader::default();
    loader.state.fail_open.set(true);
    match Platform::<Mock>::create_with_loader(GLApi::OpenGL, &loader) {
        Err(Error::Unknown(message)) => assert!(message.contains("libmock.so")),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(loader.open_handles(), 0);
}

#[test]
fn test_destroy_reports_unload_failure() {
    let loader = MockLoader::default();
    loader.state.fail_close.set(true);
    let platform = Platform::<Mock>::create_with_loader(GLApi::OpenGL, &loader).unwrap();
    match platform.destroy() {
        Err(Error::Unknown(message)) => assert!(message.starts_with("dlclose() failed")),
        other => panic!("unexpected result: {:?}", other),
    }
    // The handle is released regardless, and never closed a second time.
    assert_eq!(loader.state.closes.get(), 1);
    assert_eq!(loader.open_handles(), 0);
}

#[test]
fn test_drop_unloads_library() {
    let loader = MockLoader::default();
    loader.state.fail_close.set(true);
    drop(Platform::<Mock>::create_with_loader(GLApi::OpenGL, &loader).unwrap());
    assert_eq!(loader.open_handles(), 0);
}

#[test]
fn test_unload_deferred_while_display_is_alive() {
    let loader = MockLoader::default();
    let platform = Platform::<Mock>::create_with_loader(GLApi::OpenGL, &loader).unwrap();
    let display = platform.connect(None).unwrap();
    platform.destroy().unwrap();
    assert_eq!(loader.open_handles(), 1);
    Mock::display_disconnect(display).unwrap();
    assert_eq!(loader.open_handles(), 0);
}

#[test]
fn test_symbol_lookup() {
    let loader = MockLoader::default();
    let platform = Platform::<Mock>::create_with_loader(GLApi::OpenGL, &loader).unwrap();
    assert!(!platform.dlsym_gl(MOCK_FUNCTION_NAME).is_null());
    assert!(!platform.get_proc_address(MOCK_FUNCTION_NAME).is_null());
    assert!(platform.dlsym_gl("glDoesNotExist").is_null());
    platform.destroy().unwrap();
}

#[test]
fn test_display_objects() {
    let loader = MockLoader::default();
    let platform = Platform::<Mock>::create_with_loader(GLApi::OpenGLES2, &loader).unwrap();
    assert_eq!(platform.connect(Some("unreachable")).err(), Some(Error::ConnectionFailed));

    let display = platform.connect(None).unwrap();
    assert!(Mock::display_supports_context_api(&display, GLApi::OpenGLES2));
    assert!(!Mock::display_supports_context_api(&display, GLApi::OpenGLES1));

    let attributes = ConfigAttributes::new(GLApi::OpenGL);
    assert!(matches!(Mock::config_choose(&display, &attributes), Err(Error::BadAttribute(_))));

    let config = Mock::config_choose(&display, &ConfigAttributes::new(GLApi::OpenGLES2)).unwrap();
    let context = Mock::context_create(&config, None).unwrap();
    assert!(matches!(Mock::window_create(&config, Size2D::new(0, 10)),
                     Err(Error::BadParameter(_))));
    let window = Mock::window_create(&config, Size2D::new(64, 64)).unwrap();
    Mock::make_current(&display, Some(&window), Some(&context)).unwrap();
    Mock::window_swap_buffers(&window).unwrap();
    Mock::make_current(&display, None, None).unwrap();
    Mock::window_destroy(window).unwrap();
    Mock::context_destroy(context).unwrap();
    Mock::config_destroy(config).unwrap();
    Mock::display_disconnect(display).unwrap();
    platform.destroy().unwrap();
}

#[cfg(feature = "capi")]
mod capi {
    use super::{Mock, MockBackend, MockLoader, MOCK_FUNCTION_NAME};
    use crate::capi::{self, NativeBackend, NativeDispatch};
    use crate::config::{ATTRIB_NONE, CONTEXT_API, DEPTH_SIZE};
    use crate::{BackendKind, ErrorCode, GLApi, Platform};

    use std::ffi::{CStr, CString};
    use std::ptr;

    type OtherMock = MockBackend<1>;

    static MOCK_DISPATCH: NativeDispatch = NativeDispatch::of::<Mock>();
    static OTHER_MOCK_DISPATCH: NativeDispatch = NativeDispatch::of::<OtherMock>();

    impl NativeBackend for Mock {
        fn dispatch() -> &'static NativeDispatch {
            &MOCK_DISPATCH
        }
    }

    impl NativeBackend for OtherMock {
        fn dispatch() -> &'static NativeDispatch {
            &OTHER_MOCK_DISPATCH
        }
    }

    fn last_error() -> (i32, Option<String>) {
        let message = capi::glp_error_get_message();
        let message = if message.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned())
        };
        (capi::glp_error_get_code(), message)
    }

    #[test]
    fn test_platform_dispatch_accessor() {
        let loader = MockLoader::default();
        let platform = Platform::<Mock>::create_with_loader(GLApi::OpenGL, &loader).unwrap();
        assert!(ptr::eq(platform.dispatch(), &MOCK_DISPATCH));
        platform.destroy().unwrap();
    }

    #[test]
    fn test_destroy_null_platform() {
        unsafe {
            assert!(capi::glp_platform_destroy(ptr::null_mut()));
            assert!(capi::glp_display_disconnect(ptr::null_mut()));
        }
    }

    #[test]
    fn test_create_fills_dispatch() {
        let loader = MockLoader::default();
        unsafe {
            let mut dispatch = ptr::null();
            let platform = capi::platform_create_with_loader::<Mock>(GLApi::RAW_OPENGL,
                                                                     &loader,
                                                                     &mut dispatch);
            assert!(!platform.is_null());
            assert!(ptr::eq(dispatch, Mock::dispatch()));
            assert!(!ptr::eq(dispatch, OtherMock::dispatch()));

            let dispatch = &*dispatch;
            assert_eq!(dispatch.backend, BackendKind::RAW_GLX);
            let entries = [
                dispatch.platform_destroy as usize,
                dispatch.display_connect as usize,
                dispatch.display_disconnect as usize,
                dispatch.display_supports_context_api as usize,
                dispatch.config_choose as usize,
                dispatch.config_destroy as usize,
                dispatch.context_create as usize,
                dispatch.context_destroy as usize,
                dispatch.window_create as usize,
                dispatch.window_destroy as usize,
                dispatch.window_swap_buffers as usize,
                dispatch.make_current as usize,
                dispatch.get_proc_address as usize,
                dispatch.dlsym_gl as usize,
            ];
            assert!(entries.iter().all(|&entry| entry != 0));

            let name = CString::new(MOCK_FUNCTION_NAME).unwrap();
            assert!(!(dispatch.get_proc_address)(platform, name.as_ptr()).is_null());
            assert!(!(dispatch.dlsym_gl)(platform, name.as_ptr()).is_null());

            assert_eq!(loader.open_handles(), 1);
            assert!(capi::glp_platform_destroy(platform));
            assert_eq!(loader.open_handles(), 0);
        }
    }

    #[test]
    fn test_unsupported_api() {
        let loader = MockLoader::default();
        capi::glp_error_reset();
        unsafe {
            let mut dispatch = ptr::null();
            let platform = capi::platform_create_with_loader::<Mock>(GLApi::RAW_OPENGL_ES1,
                                                                     &loader,
                                                                     &mut dispatch);
            assert!(platform.is_null());
            assert!(dispatch.is_null());
        }
        let (code, message) = last_error();
        assert_eq!(code, ErrorCode::BadAttribute as i32);
        assert!(message.unwrap().contains("OpenGL ES1"));
        assert_eq!(loader.open_handles(), 0);

        capi::glp_error_reset();
        assert_eq!(last_error(), (ErrorCode::Success as i32, None));
    }

    #[test]
    fn test_bad_raw_values() {
        let loader = MockLoader::default();
        unsafe {
            let platform =
                capi::platform_create_with_loader::<Mock>(0x1234, &loader, ptr::null_mut());
            assert!(platform.is_null());
        }
        let (code, message) = last_error();
        assert_eq!(code, ErrorCode::InternalError as i32);
        assert!(message.unwrap().contains("gl_api has bad value 0x1234"));
        assert_eq!(loader.state.opens.get(), 0);

        unsafe {
            assert!(capi::glp_platform_create(0x7777, GLApi::RAW_OPENGL, ptr::null_mut())
                .is_null());
        }
        assert_eq!(capi::glp_error_get_code(), ErrorCode::InternalError as i32);
    }

    #[test]
    fn test_dispatch_mismatch() {
        let loader = MockLoader::default();
        unsafe {
            let platform = capi::platform_create_with_loader::<Mock>(GLApi::RAW_OPENGL,
                                                                     &loader,
                                                                     ptr::null_mut());
            assert!(!platform.is_null());

            capi::glp_error_reset();
            let display = (OtherMock::dispatch().display_connect)(platform, ptr::null());
            assert!(display.is_null());
            assert_eq!(capi::glp_error_get_code(), ErrorCode::InternalError as i32);

            assert!(!(OtherMock::dispatch().platform_destroy)(platform));
            assert_eq!(loader.open_handles(), 1);
            assert!(capi::glp_platform_destroy(platform));
            assert_eq!(loader.open_handles(), 0);
        }
    }

    #[test]
    fn test_destroy_frees_handle_when_unload_fails() {
        let loader = MockLoader::default();
        loader.state.fail_close.set(true);
        unsafe {
            let platform = capi::platform_create_with_loader::<Mock>(GLApi::RAW_OPENGL,
                                                                     &loader,
                                                                     ptr::null_mut());
            assert!(!platform.is_null());
            assert!(!capi::glp_platform_destroy(platform));
        }
        assert_eq!(capi::glp_error_get_code(), ErrorCode::UnknownError as i32);
        assert_eq!(loader.state.closes.get(), 1);
        assert_eq!(loader.open_handles(), 0);
    }

    #[test]
    fn test_display_objects() {
        let loader = MockLoader::default();
        unsafe {
            let mut dispatch = ptr::null();
            let platform = capi::platform_create_with_loader::<Mock>(GLApi::RAW_OPENGL,
                                                                     &loader,
                                                                     &mut dispatch);
            let dispatch = &*dispatch;

            let display = capi::glp_display_connect(platform, ptr::null());
            assert!(!display.is_null());
            assert!(capi::glp_display_supports_context_api(display, GLApi::RAW_OPENGL));
            assert!(!capi::glp_display_supports_context_api(display, GLApi::RAW_OPENGL_ES1));
            capi::glp_error_reset();
            assert!(!capi::glp_display_supports_context_api(display, 0x4321));
            assert_eq!(capi::glp_error_get_code(), ErrorCode::Success as i32);

            let unknown_key = [CONTEXT_API, GLApi::RAW_OPENGL, 0x7fff, 1, ATTRIB_NONE];
            assert!((dispatch.config_choose)(display, unknown_key.as_ptr()).is_null());
            assert_eq!(capi::glp_error_get_code(), ErrorCode::BadAttribute as i32);

            let attributes = [CONTEXT_API, GLApi::RAW_OPENGL, DEPTH_SIZE, 24, ATTRIB_NONE];
            let config = (dispatch.config_choose)(display, attributes.as_ptr());
            assert!(!config.is_null());

            let context = (dispatch.context_create)(config, ptr::null_mut());
            assert!(!context.is_null());
            assert!((dispatch.window_create)(config, -1, 10).is_null());
            assert_eq!(capi::glp_error_get_code(), ErrorCode::BadParameter as i32);
            let window = (dispatch.window_create)(config, 32, 32);
            assert!(!window.is_null());

            assert!((dispatch.make_current)(display, window, context));
            assert!((dispatch.window_swap_buffers)(window));
            assert!((dispatch.make_current)(display, ptr::null_mut(), ptr::null_mut()));

            assert!((dispatch.window_destroy)(window));
            assert!((dispatch.context_destroy)(context));
            assert!((dispatch.config_destroy)(config));
            assert!(capi::glp_display_disconnect(display));
            assert!(capi::glp_platform_destroy(platform));
        }
        assert_eq!(loader.open_handles(), 0);
    }
}

#[cfg(glx_backend)]
mod glx {
    use crate::platform::glx::Glx;
    use crate::{Error, GLApi, Platform};

    use serial_test::serial;

    #[test]
    fn test_glx_rejects_gles() {
        for &api in &[GLApi::OpenGLES1, GLApi::OpenGLES2, GLApi::OpenGLES3] {
            match Platform::<Glx>::create(api) {
                Err(Error::BadAttribute(message)) => {
                    assert_eq!(message, format!("GLX does not support {}", api))
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    // Accepts either outcome, since libGL may be absent on the test machine.
    #[test]
    #[serial]
    fn test_glx_desktop_gl() {
        match Platform::<Glx>::create(GLApi::OpenGL) {
            Ok(platform) => {
                assert_eq!(platform.library_name(), "libGL.so.1");
                assert!(!platform.get_proc_address("glGetString").is_null());
                assert!(!platform.dlsym_gl("glXGetProcAddressARB").is_null());
                platform.destroy().unwrap();
            }
            Err(Error::Unknown(message)) => assert!(message.contains("libGL.so.1")),
            Err(err) => panic!("unexpected error: {:?}", err),
        }
    }
}
