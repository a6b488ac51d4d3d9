//! String conversion between Rust and the VST3 C/UTF-16 buffers.

use std::ffi::{c_char, CStr, CString};

use vst3::Steinberg::Vst::TChar;

/// Copy into a fixed C-string field, truncating and always NUL-terminating.
pub fn copy_cstring(src: &str, dst: &mut [c_char]) {
    let Some(capacity) = dst.len().checked_sub(1) else {
        return;
    };

    let c_string = CString::new(src).unwrap_or_default();
    let bytes = c_string.as_bytes();
    let len = bytes.len().min(capacity);

    for (dst, src) in dst.iter_mut().zip(&bytes[..len]) {
        *dst = *src as c_char;
    }
    dst[len] = 0;
}

/// Copy into a fixed UTF-16 field, truncating and always NUL-terminating.
pub fn copy_wstring(src: &str, dst: &mut [TChar]) {
    let Some(capacity) = dst.len().checked_sub(1) else {
        return;
    };

    let mut len = 0;
    for (dst, unit) in dst.iter_mut().take(capacity).zip(src.encode_utf16()) {
        *dst = unit as TChar;
        len += 1;
    }
    dst[len] = 0;
}

/// Read a UTF-16 field up to its first NUL (or its end).
pub fn wstring_to_string(src: &[TChar]) -> Option<String> {
    let len = src.iter().position(|&c| c == 0).unwrap_or(src.len());
    let units: Vec<u16> = src[..len].iter().map(|&c| c as u16).collect();
    String::from_utf16(&units).ok()
}

/// Borrow a host C-string as UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_cstring_truncates() {
        let mut dst = [1 as c_char; 4];
        copy_cstring("FogPad", &mut dst);
        assert_eq!(dst, [b'F' as c_char, b'o' as c_char, b'g' as c_char, 0]);
    }

    #[test]
    fn test_wstring_round_trip() {
        let mut dst = [0 as TChar; 16];
        copy_wstring("Stereo In", &mut dst);
        assert_eq!(wstring_to_string(&dst).as_deref(), Some("Stereo In"));
    }

    #[test]
    fn test_wstring_without_terminator() {
        let mut dst = [0 as TChar; 3];
        copy_wstring("Mono", &mut dst);
        assert_eq!(wstring_to_string(&dst).as_deref(), Some("Mo"));
    }

    #[test]
    fn test_cstr_to_str() {
        let id = c"BinaryMessage";
        assert_eq!(unsafe { cstr_to_str(id.as_ptr()) }, Some("BinaryMessage"));
        assert_eq!(unsafe { cstr_to_str(std::ptr::null()) }, None);
    }
}
