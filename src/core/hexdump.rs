// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Two-line hex dump used for parser diagnostics and the `debug` subcommand.
//!
//! Each block of `width` bytes is rendered as an ASCII line (non-printable
//! bytes shown as `..`) above a hex line, both prefixed with the offset of
//! the block.

use std::fmt::Write as _;

/// Render `data` as paired ASCII/hex lines of `width` bytes each.
///
/// A `byte_limit` of 0 means no limit. The output never ends with a
/// trailing newline.
pub fn hex_lines(data: &[u8], byte_limit: usize, width: usize) -> String {
    let limit = if byte_limit > 0 {
        data.len().min(byte_limit)
    } else {
        data.len()
    };
    let data = &data[..limit];
    let width = if width > 0 { width } else { data.len().max(1) };

    let mut out = String::new();
    for (block_index, block) in data.chunks(width).enumerate() {
        if block_index > 0 {
            out.push('\n');
        }
        let start = block_index * width;
        for line in 0..2 {
            let _ = write!(out, "0x{start:06x}: ");
            for &byte in block {
                match line {
                    0 => {
                        if !(b' '..=b'~').contains(&byte) {
                            out.push_str("..");
                        } else {
                            let _ = write!(out, " {}", byte as char);
                        }
                    }
                    _ => {
                        let _ = write!(out, "{byte:02x}");
                    }
                }
            }
            if line == 0 {
                out.push('\n');
            }
        }
    }
    out
}
