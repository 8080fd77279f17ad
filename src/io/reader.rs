// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Parse facade: format detection plus dispatch to the concrete parser.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::core::{Result, RoscoError};
use crate::io::detection::{classify, DashcamFormat};
use crate::io::formats::{xc, xc4};
use crate::io::records::FileInfo;

/// Parse a dashcam recording from a reader.
///
/// Peeks the leading magic to pick the parser; the parser then re-reads the
/// stream from byte 0. With `header_only` set, only the header region is
/// consumed and the chunk list comes back empty.
pub fn parse_reader<R: Read>(mut reader: R, header_only: bool) -> Result<FileInfo> {
    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|_| RoscoError::truncated("file magic", 4))?;

    let format = classify(&magic);
    debug!(format = %format, "detected format");

    // Hand the parser a stream that still begins at byte 0.
    let chained = std::io::Cursor::new(magic).chain(reader);
    match format {
        DashcamFormat::Xc4 => xc4::parse_xc4(chained, header_only),
        DashcamFormat::Xc => xc::parse_xc(chained, header_only),
    }
}

/// Parse a dashcam recording from a file path.
pub fn parse_file<P: AsRef<Path>>(path: P, header_only: bool) -> Result<FileInfo> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| RoscoError::io(format!("open {}", path.display()), e.to_string()))?;
    parse_reader(BufReader::new(file), header_only)
}
