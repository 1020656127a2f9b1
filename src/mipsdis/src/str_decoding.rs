/* SPDX-FileCopyrightText: © 2024 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{string::String, vec::Vec};

/// Which character encoding the rodata C-string guesser should validate
/// candidate bytes against. Corresponds to spec's `RODATA_STRING_ENCODING`
/// config toggle: most games only ever use plain ASCII text, but some
/// (mostly Japanese titles) embed Shift-JIS or EUC-JP text in their rodata.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Encoding {
    Ascii,
    ShiftJis,
    EucJp,
    Utf8,
}

impl Encoding {
    const fn encoding_rs(self) -> &'static encoding_rs::Encoding {
        match self {
            Encoding::Ascii => encoding_rs::WINDOWS_1252,
            Encoding::ShiftJis => encoding_rs::SHIFT_JIS,
            Encoding::EucJp => encoding_rs::EUC_JP,
            Encoding::Utf8 => encoding_rs::UTF_8,
        }
    }

    /// Checks whether `bytes` starts with a validly-encoded, NUL-terminated
    /// string under this encoding. On success returns the byte length of the
    /// string including its terminator (but not padding past it).
    pub(crate) fn check_valid(self, bytes: &[u8]) -> Result<usize, ()> {
        let Some(end) = bytes.iter().position(|b| *b == 0) else {
            return Err(());
        };
        let candidate = &bytes[..end];

        match self {
            Encoding::Ascii => {
                if candidate.iter().all(|b| (0x20..0x7F).contains(b) || matches!(b, 0x07..=0x0D)) {
                    Ok(end + 1)
                } else {
                    Err(())
                }
            }
            _ => {
                let (_, _, had_errors) = self.encoding_rs().decode(candidate);
                if had_errors {
                    Err(())
                } else {
                    Ok(end + 1)
                }
            }
        }
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Ascii
    }
}

// TODO: improve this thingy
pub(crate) fn escape_string(val: &str) -> String {
    let mut escaped_buf = Vec::with_capacity(val.len());
    let bytes = val.as_bytes();

    for b in bytes {
        // The cases of this switch are sorted by ASCII order
        match b {
            0x07 => {
                // \a
                escaped_buf.push(b'\\');
                escaped_buf.push(b'a');
            }
            b'\t' => {
                escaped_buf.push(b'\\');
                escaped_buf.push(b't');
            }
            b'\n' => {
                escaped_buf.push(b'\\');
                escaped_buf.push(b'n');
            }
            0x0C => {
                // \f
                escaped_buf.push(b'\\');
                escaped_buf.push(b'f');
            }
            b'\r' => {
                escaped_buf.push(b'\\');
                escaped_buf.push(b'r');
            }
            b'\"' => {
                escaped_buf.push(b'\\');
                escaped_buf.push(b'"');
            }
            b'\\' => {
                // \a
                escaped_buf.push(b'\\');
                escaped_buf.push(b'\\');
            }
            x => escaped_buf.push(*x),
        }
    }

    String::from_utf8(escaped_buf).unwrap()
}
