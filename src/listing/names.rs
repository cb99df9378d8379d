//! Display names.
//!
//! Midnight Commander's extfs parser drops the leading space of a file name
//! in a listing line, so such an entry could never be addressed again. The
//! listing therefore shows `~name` instead of ` name`, and operations map
//! the displayed name back through the snapshot.

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};

/// Replace a single leading space with `~`.
///
/// Only the first byte is touched: `b"  foo"` becomes `b"~ foo"`.
pub fn map_name(name: &[u8]) -> Cow<'_, [u8]> {
    match name.split_first() {
        Some((b' ', rest)) => {
            let mut mapped = Vec::with_capacity(name.len());
            mapped.push(b'~');
            mapped.extend_from_slice(rest);
            Cow::Owned(mapped)
        }
        _ => Cow::Borrowed(name),
    }
}

/// Text form of [`map_name`].
pub fn map_name_str(name: &str) -> Cow<'_, str> {
    match name.strip_prefix(' ') {
        Some(rest) => Cow::Owned(format!("~{rest}")),
        None => Cow::Borrowed(name),
    }
}

/// Byte view of an OS string. Lossless on Unix.
pub fn os_to_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Cow::Borrowed(s.as_bytes())
    }

    #[cfg(not(unix))]
    {
        match s.to_string_lossy() {
            Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
            Cow::Owned(text) => Cow::Owned(text.into_bytes()),
        }
    }
}

/// OS string holding `bytes`. Lossless on Unix.
pub fn bytes_to_os(bytes: &[u8]) -> OsString {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        OsStr::from_bytes(bytes).to_os_string()
    }

    #[cfg(not(unix))]
    {
        OsString::from(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_leading_space_becomes_tilde() {
        assert_eq!(&*map_name(b" foo"), b"~foo");
        assert_eq!(map_name_str(" foo"), "~foo");
    }

    #[test]
    fn only_first_space_is_replaced() {
        assert_eq!(&*map_name(b"  foo"), b"~ foo");
        assert_eq!(map_name_str("  foo"), "~ foo");
    }

    #[test]
    fn other_names_are_untouched() {
        for name in ["foo", "foo ", "dir/ foo", "~foo", ""] {
            assert!(matches!(map_name(name.as_bytes()), Cow::Borrowed(_)));
            assert_eq!(map_name_str(name), name);
        }
    }

    #[test]
    fn non_utf8_names_keep_their_bytes() {
        assert_eq!(&*map_name(b" \xff\xfe"), b"~\xff\xfe");
    }

    #[cfg(unix)]
    #[test]
    fn os_conversion_round_trips_arbitrary_bytes() {
        let raw = b"caf\xe9/ x";
        assert_eq!(&*os_to_bytes(&bytes_to_os(raw)), raw);
    }
}
