// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for roscodec.
//!
//! Provides error types for dashcam file operations:
//! - Container parsing (XC4 and XC)
//! - Metadata tree decoding
//! - Audio transcoding
//! - RIFF/AVI serialization

use std::fmt;

/// Errors that can occur while parsing dashcam recordings or writing output
/// containers.
#[derive(Debug, Clone)]
pub enum RoscoError {
    /// Header magic did not match any known format
    UnsupportedFileType {
        /// The magic bytes that were read
        magic: Vec<u8>,
    },

    /// Short read where a fixed number of bytes was required
    TruncatedInput {
        /// What was being read
        context: String,
        /// Bytes required
        requested: usize,
    },

    /// Unrecognized chunk type in an XC4 stream
    UnknownChunkType {
        /// Chunk index within the file
        index: usize,
        /// The two type bytes, as read
        chunk_type: String,
    },

    /// Unrecognized packet type in an XC stream
    UnknownPacketType {
        /// The type byte
        packet_type: u8,
    },

    /// Unrecognized metadata entry type tag
    UnknownMetadataType {
        /// Entry index within the metadata buffer
        entry: usize,
        /// The type tag
        type_tag: i8,
    },

    /// Sentinel mismatch or consistency invariant violated
    CorruptPacket {
        /// What was being parsed
        context: String,
        /// Description of the violation
        message: String,
    },

    /// Byte sequence is not a well-formed JFIF stream
    MalformedJpeg {
        /// Offset within the scanned stream
        offset: usize,
        /// Description of the violation
        message: String,
    },

    /// Raw audio emitter encountered a depth other than 8 or 16
    UnsupportedBitDepth {
        /// The offending bit depth
        bit_depth: u32,
    },

    /// RIFF writer received a non-4-byte identifier
    BadFourCC {
        /// The offending identifier
        fourcc: String,
    },

    /// Codec failure (Opus packet, embedded JPEG pixels)
    Decode {
        /// Codec context (e.g., "Opus", "JPEG")
        codec: String,
        /// Error message
        message: String,
    },

    /// File open/create/write failure
    Io {
        /// What was being done
        context: String,
        /// Error message
        message: String,
    },
}

impl RoscoError {
    /// Create an unsupported-file-type error.
    pub fn unsupported_file_type(magic: impl Into<Vec<u8>>) -> Self {
        RoscoError::UnsupportedFileType {
            magic: magic.into(),
        }
    }

    /// Create a truncated-input error.
    pub fn truncated(context: impl Into<String>, requested: usize) -> Self {
        RoscoError::TruncatedInput {
            context: context.into(),
            requested,
        }
    }

    /// Create an unknown-chunk-type error.
    pub fn unknown_chunk_type(index: usize, chunk_type: impl Into<String>) -> Self {
        RoscoError::UnknownChunkType {
            index,
            chunk_type: chunk_type.into(),
        }
    }

    /// Create an unknown-packet-type error.
    pub fn unknown_packet_type(packet_type: u8) -> Self {
        RoscoError::UnknownPacketType { packet_type }
    }

    /// Create an unknown-metadata-type error.
    pub fn unknown_metadata_type(entry: usize, type_tag: i8) -> Self {
        RoscoError::UnknownMetadataType { entry, type_tag }
    }

    /// Create a corrupt-packet error.
    pub fn corrupt(context: impl Into<String>, message: impl Into<String>) -> Self {
        RoscoError::CorruptPacket {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a malformed-JPEG error.
    pub fn malformed_jpeg(offset: usize, message: impl Into<String>) -> Self {
        RoscoError::MalformedJpeg {
            offset,
            message: message.into(),
        }
    }

    /// Create an unsupported-bit-depth error.
    pub fn unsupported_bit_depth(bit_depth: u32) -> Self {
        RoscoError::UnsupportedBitDepth { bit_depth }
    }

    /// Create a bad-FourCC error.
    pub fn bad_fourcc(fourcc: impl Into<String>) -> Self {
        RoscoError::BadFourCC {
            fourcc: fourcc.into(),
        }
    }

    /// Create a codec decode error.
    pub fn decode(codec: impl Into<String>, message: impl Into<String>) -> Self {
        RoscoError::Decode {
            codec: codec.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, message: impl Into<String>) -> Self {
        RoscoError::Io {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            RoscoError::UnsupportedFileType { magic } => {
                vec![("magic", format!("{magic:02x?}"))]
            }
            RoscoError::TruncatedInput { context, requested } => vec![
                ("context", context.clone()),
                ("requested", requested.to_string()),
            ],
            RoscoError::UnknownChunkType { index, chunk_type } => vec![
                ("index", index.to_string()),
                ("chunk_type", chunk_type.clone()),
            ],
            RoscoError::UnknownPacketType { packet_type } => {
                vec![("packet_type", format!("{packet_type:#04x}"))]
            }
            RoscoError::UnknownMetadataType { entry, type_tag } => vec![
                ("entry", entry.to_string()),
                ("type_tag", type_tag.to_string()),
            ],
            RoscoError::CorruptPacket { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            RoscoError::MalformedJpeg { offset, message } => vec![
                ("offset", offset.to_string()),
                ("message", message.clone()),
            ],
            RoscoError::UnsupportedBitDepth { bit_depth } => {
                vec![("bit_depth", bit_depth.to_string())]
            }
            RoscoError::BadFourCC { fourcc } => vec![("fourcc", fourcc.clone())],
            RoscoError::Decode { codec, message } => {
                vec![("codec", codec.clone()), ("message", message.clone())]
            }
            RoscoError::Io { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
        }
    }
}

impl fmt::Display for RoscoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoscoError::UnsupportedFileType { magic } => {
                write!(f, "Unsupported file type (magic: {magic:02x?})")
            }
            RoscoError::TruncatedInput { context, requested } => {
                write!(f, "Truncated input in {context}: needed {requested} bytes")
            }
            RoscoError::UnknownChunkType { index, chunk_type } => {
                write!(f, "Unknown chunk type for chunk {index}: '{chunk_type}'")
            }
            RoscoError::UnknownPacketType { packet_type } => {
                write!(f, "Unknown packet type: {packet_type:#04x}")
            }
            RoscoError::UnknownMetadataType { entry, type_tag } => {
                write!(f, "Unknown metadata type on entry {entry}: {type_tag}")
            }
            RoscoError::CorruptPacket { context, message } => {
                write!(f, "Corrupt packet in {context}: {message}")
            }
            RoscoError::MalformedJpeg { offset, message } => {
                write!(f, "Malformed JPEG at offset {offset}: {message}")
            }
            RoscoError::UnsupportedBitDepth { bit_depth } => {
                write!(f, "Unsupported bit depth: {bit_depth}")
            }
            RoscoError::BadFourCC { fourcc } => {
                write!(f, "FourCC must be 4 bytes long: '{fourcc}'")
            }
            RoscoError::Decode { codec, message } => {
                write!(f, "{codec} decode error: {message}")
            }
            RoscoError::Io { context, message } => {
                write!(f, "I/O error in {context}: {message}")
            }
        }
    }
}

impl std::error::Error for RoscoError {}

impl From<std::io::Error> for RoscoError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            RoscoError::TruncatedInput {
                context: "read".to_string(),
                requested: 0,
            }
        } else {
            RoscoError::Io {
                context: "read".to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Result type for roscodec operations.
pub type Result<T> = std::result::Result<T, RoscoError>;
