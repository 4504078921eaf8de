//! C FFI layer for cross-language interoperability.

use crate::expand::ExpandConfig;
use crate::render::MathBackend;
use libc::{c_char, c_int};
use std::ffi::{CStr, CString};
use std::ptr;

/// Configuration for rendering.
#[repr(C)]
pub struct MathModeConfig {
    /// Math backend: 0 = KaTeX, 1 = MathJax, 2 = MathML
    pub math_backend: c_int,
    /// Whether to generate standalone HTML (with DOCTYPE, head, etc.)
    pub standalone: c_int,
}

impl Default for MathModeConfig {
    fn default() -> Self {
        Self {
            math_backend: 0,
            standalone: 0,
        }
    }
}

/// Result type for FFI operations.
#[repr(C)]
pub struct MathModeResult {
    /// Pointer to result string (caller must free with mathmode_free_result)
    pub data: *mut c_char,
    /// Error message if data is null (caller must free with mathmode_free_result)
    pub error: *mut c_char,
    /// Non-zero when a math region failed to render and evaluation was halted
    pub halted: c_int,
}

impl MathModeResult {
    fn ok(data: String) -> Self {
        match CString::new(data) {
            Ok(c_string) => Self {
                data: c_string.into_raw(),
                error: ptr::null_mut(),
                halted: 0,
            },
            Err(e) => Self::err(
                format!("Output contains a NUL byte at offset {}", e.nul_position()),
                false,
            ),
        }
    }

    fn err(error: String, halted: bool) -> Self {
        Self {
            data: ptr::null_mut(),
            error: into_c_string(error.replace('\0', "\\0")),
            halted: c_int::from(halted),
        }
    }
}

fn into_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_string) => c_string.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Parse and expand a document in one step.
///
/// # Safety
///
/// - `input` must be a valid null-terminated UTF-8 string.
/// - `config` may be null or must point to a valid `MathModeConfig`.
/// - The returned result must be freed with `mathmode_free_result`.
#[no_mangle]
pub unsafe extern "C" fn mathmode_render(
    input: *const c_char,
    config: *const MathModeConfig,
) -> MathModeResult {
    if input.is_null() {
        return MathModeResult::err("Null input pointer".to_string(), false);
    }

    let input = match CStr::from_ptr(input).to_str() {
        Ok(s) => s,
        Err(_) => return MathModeResult::err("Invalid UTF-8 input".to_string(), false),
    };

    let expand_config = if config.is_null() {
        ExpandConfig::default()
    } else {
        let cfg = &*config;
        ExpandConfig {
            math_backend: match cfg.math_backend {
                1 => MathBackend::MathJax,
                2 => MathBackend::MathML,
                _ => MathBackend::KaTeX,
            },
            standalone: cfg.standalone != 0,
            ..Default::default()
        }
    };

    match crate::render(input, Some(&expand_config)) {
        Ok(output) => MathModeResult::ok(output),
        Err(e) => MathModeResult::err(e.to_string(), e.is_halt()),
    }
}

/// Free a string returned by this library.
///
/// # Safety
///
/// `s` must be null or a pointer previously returned by this library.
#[no_mangle]
pub unsafe extern "C" fn mathmode_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Free both strings of a result.
///
/// # Safety
///
/// `result` must come from `mathmode_render` and not have been freed already.
#[no_mangle]
pub unsafe extern "C" fn mathmode_free_result(result: MathModeResult) {
    mathmode_free_string(result.data);
    mathmode_free_string(result.error);
}
