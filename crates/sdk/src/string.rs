//! UTF-16 string slices owned by the native side

/// A borrowed UTF-16 string as laid out by the native observer
///
/// The bridge never frees the buffer; it only copies out of it.
#[repr(C)]
#[derive(Debug)]
pub struct NativeString {
    /// Pointer to the first UTF-16 code unit
    pub string: *const u16,
    /// Number of code units (not bytes)
    pub length: u32,
}

impl NativeString {
    /// Build a view over an existing UTF-16 buffer
    ///
    /// `length` is a `u32`, so buffers longer than `u32::MAX` units are cut
    /// to their first `u32::MAX` units.
    pub const fn from_units(units: &[u16]) -> Self {
        Self {
            string: units.as_ptr(),
            length: clamp_length(units.len()),
        }
    }

    /// Copy the string out, replacing invalid surrogates
    ///
    /// # Safety
    /// `string` must point to `length` readable code units, or be null.
    pub unsafe fn to_string_lossy(&self) -> String {
        if self.string.is_null() || self.length == 0 {
            return String::new();
        }
        let units = std::slice::from_raw_parts(self.string, self.length as usize);
        String::from_utf16_lossy(units)
    }
}

const fn clamp_length(len: usize) -> u32 {
    if len > u32::MAX as usize {
        u32::MAX
    } else {
        len as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_string_roundtrip() {
        let units: Vec<u16> = "intersectionchange".encode_utf16().collect();
        let native = NativeString::from_units(&units);
        assert_eq!(native.length, 18);
        assert_eq!(unsafe { native.to_string_lossy() }, "intersectionchange");
    }

    #[test]
    fn test_native_string_null() {
        let native = NativeString {
            string: std::ptr::null(),
            length: 4,
        };
        assert_eq!(unsafe { native.to_string_lossy() }, "");
    }

    #[test]
    fn test_length_saturates() {
        assert_eq!(clamp_length(0), 0);
        assert_eq!(clamp_length(u32::MAX as usize), u32::MAX);
        assert_eq!(clamp_length(usize::MAX), u32::MAX);
    }
}
