// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte-exact JFIF boundary scanner.
//!
//! Reads exactly one JFIF image from a stream and returns every byte it
//! consumed, never reading past the end-of-image marker. General-purpose
//! JPEG decoders buffer ahead, which loses the stream position when the
//! image is followed by more chunk data; this scanner exists so the XC4
//! chunk loop can resume at the first byte after the image.

use std::io::Read;

use crate::core::{Result, RoscoError};

/// Scan one JFIF stream from start-of-image through end-of-image.
///
/// Returns the bytes read. The reader is left positioned at the first byte
/// after the image.
pub fn scan_jpeg<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut result: Vec<u8> = Vec::with_capacity(4096);

    loop {
        // Each segment starts with 0xff and a marker byte.
        let byte = read_byte(reader, &result)?;
        result.push(byte);
        if byte != 0xff {
            return Err(RoscoError::malformed_jpeg(
                result.len() - 1,
                format!("expected ff, found {byte:02x}"),
            ));
        }

        let mut marker = read_byte(reader, &result)?;
        result.push(marker);
        if marker == 0 {
            continue;
        }

        // A marker may be preceded by a padding run of 0xff bytes.
        while marker == 0xff {
            marker = read_byte(reader, &result)?;
            result.push(marker);
        }

        match marker {
            0xd9 => {
                // End of image.
                return Ok(result);
            }
            0xd8 | 0xd0..=0xd7 => {
                // No payload.
            }
            0xc0 | 0xc2 | 0xc4 | 0xdb | 0xdd | 0xe0..=0xef | 0xfe => {
                read_sized_payload(reader, &mut result)?;
            }
            0xda => {
                // Start of scan: sized payload, then entropy-coded data
                // until 0xff 0xd9. A 0xff 0x00 pair is a stuffed byte and
                // does not terminate.
                read_sized_payload(reader, &mut result)?;
                let mut last_was_ff = false;
                loop {
                    let byte = read_byte(reader, &result)?;
                    result.push(byte);
                    if last_was_ff && byte == 0xd9 {
                        return Ok(result);
                    }
                    last_was_ff = byte == 0xff;
                }
            }
            _ => {
                return Err(RoscoError::malformed_jpeg(
                    result.len() - 1,
                    format!("unexpected marker byte: {marker:02x}"),
                ));
            }
        }
    }
}

fn read_byte<R: Read>(reader: &mut R, consumed: &[u8]) -> Result<u8> {
    let mut buffer = [0u8; 1];
    reader.read_exact(&mut buffer).map_err(|_| {
        RoscoError::malformed_jpeg(consumed.len(), "stream ended inside image".to_string())
    })?;
    Ok(buffer[0])
}

fn read_sized_payload<R: Read>(reader: &mut R, result: &mut Vec<u8>) -> Result<()> {
    let mut length_bytes = [0u8; 2];
    reader.read_exact(&mut length_bytes).map_err(|_| {
        RoscoError::malformed_jpeg(result.len(), "stream ended in segment length".to_string())
    })?;
    result.extend_from_slice(&length_bytes);

    let length = usize::from(u16::from_be_bytes(length_bytes));
    if length < 2 {
        return Err(RoscoError::malformed_jpeg(
            result.len() - 2,
            format!("segment length {length} too small"),
        ));
    }
    let mut payload = vec![0u8; length - 2];
    reader.read_exact(&mut payload).map_err(|_| {
        RoscoError::malformed_jpeg(result.len(), "stream ended inside segment".to_string())
    })?;
    result.extend_from_slice(&payload);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A tiny but structurally complete JFIF stream: SOI, APP0, SOS with
    /// stuffed-byte entropy data, EOI.
    fn tiny_jfif() -> Vec<u8> {
        let mut image = Vec::new();
        image.extend_from_slice(&[0xff, 0xd8]); // SOI
        image.extend_from_slice(&[0xff, 0xe0, 0x00, 0x04, 0x4a, 0x46]); // APP0
        image.extend_from_slice(&[0xff, 0xda, 0x00, 0x03, 0x01]); // SOS header
        image.extend_from_slice(&[0x12, 0xff, 0x00, 0x34]); // entropy w/ stuffed ff
        image.extend_from_slice(&[0xff, 0xd9]); // EOI
        image
    }

    #[test]
    fn test_scans_exactly_one_image() {
        let image = tiny_jfif();
        let mut stream = image.clone();
        stream.extend_from_slice(b"TRAILING");

        let mut cursor = Cursor::new(stream);
        let scanned = scan_jpeg(&mut cursor).unwrap();
        assert_eq!(scanned, image);

        // The reader must be positioned at the first trailing byte.
        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"TRAILING");
    }

    #[test]
    fn test_stuffed_ff00_does_not_terminate() {
        let image = tiny_jfif();
        let mut cursor = Cursor::new(image.clone());
        let scanned = scan_jpeg(&mut cursor).unwrap();
        // The stuffed 0xff 0x00 inside the entropy data was consumed.
        assert!(scanned.len() == image.len());
    }

    #[test]
    fn test_restart_markers_have_no_payload() {
        let mut image = Vec::new();
        image.extend_from_slice(&[0xff, 0xd8]); // SOI
        image.extend_from_slice(&[0xff, 0xd0]); // RST0, no payload
        image.extend_from_slice(&[0xff, 0xd9]); // EOI
        let mut cursor = Cursor::new(image.clone());
        assert_eq!(scan_jpeg(&mut cursor).unwrap(), image);
    }

    #[test]
    fn test_ff_padding_before_marker() {
        let mut image = Vec::new();
        image.extend_from_slice(&[0xff, 0xd8]); // SOI
        image.extend_from_slice(&[0xff, 0xff, 0xff, 0xd9]); // padded EOI
        let mut cursor = Cursor::new(image.clone());
        assert_eq!(scan_jpeg(&mut cursor).unwrap(), image);
    }

    #[test]
    fn test_comment_segment() {
        let mut image = Vec::new();
        image.extend_from_slice(&[0xff, 0xd8]);
        image.extend_from_slice(&[0xff, 0xfe, 0x00, 0x05, b'h', b'i', b'!']); // COM
        image.extend_from_slice(&[0xff, 0xd9]);
        let mut cursor = Cursor::new(image.clone());
        assert_eq!(scan_jpeg(&mut cursor).unwrap(), image);
    }

    #[test]
    fn test_rejects_missing_ff() {
        let mut cursor = Cursor::new(vec![0x00, 0xd8]);
        let err = scan_jpeg(&mut cursor).unwrap_err();
        assert!(matches!(err, RoscoError::MalformedJpeg { .. }));
    }

    #[test]
    fn test_rejects_unexpected_marker() {
        // 0xc1 is not in the marker table.
        let mut cursor = Cursor::new(vec![0xff, 0xd8, 0xff, 0xc1]);
        let err = scan_jpeg(&mut cursor).unwrap_err();
        assert!(matches!(err, RoscoError::MalformedJpeg { .. }));
    }

    #[test]
    fn test_rejects_truncated_entropy_data() {
        let mut image = Vec::new();
        image.extend_from_slice(&[0xff, 0xd8]);
        image.extend_from_slice(&[0xff, 0xda, 0x00, 0x03, 0x01, 0x12]); // never reaches EOI
        let mut cursor = Cursor::new(image);
        let err = scan_jpeg(&mut cursor).unwrap_err();
        assert!(matches!(err, RoscoError::MalformedJpeg { .. }));
    }

    #[test]
    fn test_real_encoder_output_round_trips() {
        // Encode a small image with the image crate and make sure the
        // scanner consumes exactly the encoder's output.
        let rgb = image::RgbImage::from_pixel(8, 8, image::Rgb([200u8, 100, 50]));
        let dynamic = image::DynamicImage::ImageRgb8(rgb);
        let mut encoded = Vec::new();
        dynamic
            .write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Jpeg)
            .unwrap();

        let mut stream = encoded.clone();
        stream.extend_from_slice(&[0xde, 0xad]);
        let mut cursor = Cursor::new(stream);
        let scanned = scan_jpeg(&mut cursor).unwrap();
        assert_eq!(scanned, encoded);
    }
}
