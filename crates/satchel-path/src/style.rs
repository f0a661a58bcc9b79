// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Separator conventions and root detection

use serde::{Deserialize, Serialize};

/// Path separator convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Single `/` separator
    Posix,
    /// `\` or `/` separators, drive letters and UNC prefixes
    Win32,
}

impl Style {
    /// The style of the host platform
    pub const fn native() -> Self {
        if cfg!(windows) { Style::Win32 } else { Style::Posix }
    }

    /// Preferred segment separator
    pub const fn sep(self) -> char {
        match self {
            Style::Posix => '/',
            Style::Win32 => '\\',
        }
    }

    /// Path list delimiter (`:` on POSIX, `;` on Win32)
    pub const fn delimiter(self) -> char {
        match self {
            Style::Posix => ':',
            Style::Win32 => ';',
        }
    }

    /// Whether `c` separates segments in this style
    pub fn is_sep(self, c: char) -> bool {
        c == '/' || (self == Style::Win32 && c == '\\')
    }

    pub(crate) fn is_sep_byte(self, b: u8) -> bool {
        b == b'/' || (self == Style::Win32 && b == b'\\')
    }

    /// Length in bytes of the root prefix of `path`.
    ///
    /// POSIX roots are `/`. Win32 recognises `\\` (UNC), `C:\`, `C:` and a
    /// single leading separator, in that order.
    pub fn root_len(self, path: &str) -> usize {
        let bytes = path.as_bytes();
        let Some(&first) = bytes.first() else {
            return 0;
        };

        match self {
            Style::Posix => usize::from(first == b'/'),
            Style::Win32 => {
                if self.is_sep_byte(first) {
                    if bytes.len() > 2 && self.is_sep_byte(bytes[1]) {
                        2
                    } else {
                        1
                    }
                } else if has_drive_prefix(bytes) {
                    if bytes.len() > 2 && self.is_sep_byte(bytes[2]) {
                        3
                    } else {
                        2
                    }
                } else {
                    0
                }
            }
        }
    }
}

/// `[a-zA-Z]:` at the start of the path
pub(crate) fn has_drive_prefix(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
