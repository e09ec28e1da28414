//! Truncated `Debug` output for large pixel buffers.
//!
//! Mipmap payloads and raster buffers can run into the megabytes; printing
//! them in full makes `{:#?}` output unusable. This mirrors the trimming
//! helper the wider workspace keeps in its internal `wow-utils` crate, cut
//! down to the one shape this crate actually needs (byte slices).

use std::{cmp, fmt};

const FIRST_N_ELEMENTS: usize = 3;

/// Formats `bytes` as the first few elements plus a trailing count, e.g.
/// `[1, 2, 3] + 125 elements`. Used via `#[debug(with = debug::trimmed_bytes_fmt)]`.
pub fn trimmed_bytes_fmt(bytes: &Vec<u8>, f: &mut fmt::Formatter) -> fmt::Result {
    let shown = cmp::min(FIRST_N_ELEMENTS, bytes.len());
    let head = &bytes[..shown];
    let remaining = bytes.len() - shown;

    if remaining == 0 {
        write!(f, "{head:?}")
    } else {
        write!(f, "{head:?} + {remaining} elements")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct W(Vec<u8>);
    impl fmt::Debug for W {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            trimmed_bytes_fmt(&self.0, f)
        }
    }

    #[test]
    fn short_buffer_prints_fully() {
        assert_eq!(format!("{:?}", W(vec![1, 2])), "[1, 2]");
    }

    #[test]
    fn long_buffer_is_trimmed() {
        let data = vec![0u8; 10];
        assert_eq!(format!("{:?}", W(data)), "[0, 0, 0] + 7 elements");
    }
}
