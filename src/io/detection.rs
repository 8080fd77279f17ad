// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dashcam format detection from the leading magic bytes.
//!
//! Only the first four bytes are consulted. XC4/NVR files open with the
//! ASCII magic `SAYS`; XC/ASD files open with their header packet type byte
//! 0x14. Anything else is handed to the XC4 parser, which rejects it with
//! its own header check.

/// XC4 file magic.
pub const XC4_MAGIC: &[u8; 4] = b"SAYS";

/// XC header packet type byte.
pub const XC_HEADER_BYTE: u8 = 0x14;

/// Detected dashcam container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashcamFormat {
    /// Block-structured XC4/NVR format
    Xc4,
    /// Packet-based XC/ASD format
    Xc,
}

impl std::fmt::Display for DashcamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashcamFormat::Xc4 => write!(f, "XC4"),
            DashcamFormat::Xc => write!(f, "XC"),
        }
    }
}

/// Classify a file by its first four bytes.
pub fn classify(magic: &[u8; 4]) -> DashcamFormat {
    if magic == XC4_MAGIC {
        return DashcamFormat::Xc4;
    }
    if magic[0] == XC_HEADER_BYTE {
        return DashcamFormat::Xc;
    }
    DashcamFormat::Xc4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_xc4() {
        assert_eq!(classify(b"SAYS"), DashcamFormat::Xc4);
    }

    #[test]
    fn test_classify_xc() {
        assert_eq!(classify(&[0x14, 0x00, 0x00, 0x00]), DashcamFormat::Xc);
    }

    #[test]
    fn test_classify_unknown_falls_back_to_xc4() {
        assert_eq!(classify(b"RIFF"), DashcamFormat::Xc4);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(DashcamFormat::Xc4.to_string(), "XC4");
        assert_eq!(DashcamFormat::Xc.to_string(), "XC");
    }
}
