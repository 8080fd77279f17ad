// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XC parser integration tests: packet stream parsing and timebase
//! normalization.

mod common;

use std::io::Cursor;

use common::{xc_audio_packet, xc_end_packet, xc_header_packet, xc_video_packet};
use roscodec::{parse_reader, RoscoError};

#[test]
fn test_wall_clock_timestamps_are_rebased_to_file_zero() {
    // Header 1000s..1002s; audio at 1000.5s; video at 1001.0s.
    let mut data = xc_header_packet((1000, 0), (1002, 0));
    data.extend_from_slice(&xc_audio_packet(1000, 500_000, &[1, 2, 3, 4]));
    data.extend_from_slice(&xc_video_packet(1, 0, 1001, 0, &[5, 6]));
    data.extend_from_slice(&xc_end_packet());

    let info = parse_reader(Cursor::new(data), false).unwrap();
    assert_eq!(info.chunks.len(), 2);

    let audio = info.chunks[0].audio().unwrap();
    assert_eq!(info.chunks[0].id, "17");
    assert_eq!(info.chunks[0].chunk_type, "wb");
    assert_eq!(audio.timestamp, 500_000);

    let video = info.chunks[1].video().unwrap();
    assert_eq!(info.chunks[1].id, "10");
    assert_eq!(info.chunks[1].chunk_type, "dc");
    assert_eq!(video.timestamp, 1_000_000);

    assert_eq!(info.duration_seconds(), Some(2));
}

#[test]
fn test_minimum_timestamp_is_zero_after_normalization() {
    let mut data = xc_header_packet((5000, 0), (5010, 0));
    for (seconds, micros) in [(5003u32, 125_000u32), (5001, 0), (5002, 500_000)] {
        data.extend_from_slice(&xc_video_packet(1, 0, seconds, micros, &[0]));
    }
    data.extend_from_slice(&xc_end_packet());

    let info = parse_reader(Cursor::new(data), false).unwrap();
    let timestamps: Vec<u64> = info.chunks.iter().map(|c| c.timestamp().unwrap()).collect();
    assert_eq!(*timestamps.iter().min().unwrap(), 0);
    // Relative ordering of the raw clock values is preserved.
    assert_eq!(timestamps, vec![2_125_000, 0, 1_500_000]);
}

#[test]
fn test_synthesized_metadata_reports_16_bit_audio() {
    let data = xc_header_packet((1000, 0), (1002, 0));
    let info = parse_reader(Cursor::new(data), true).unwrap();
    assert_eq!(info.audio_bit_depth(), 16);
    assert_eq!(info.duration_seconds(), Some(2));
    assert!(info.filename.starts_with("rec-"));
    assert!(info.filename.ends_with(".asd"));
}

#[test]
fn test_video_stream_id_combines_number_and_type() {
    let mut data = xc_header_packet((1000, 0), (1002, 0));
    data.extend_from_slice(&xc_video_packet(2, 1, 1000, 0, &[9]));
    data.extend_from_slice(&xc_end_packet());

    let info = parse_reader(Cursor::new(data), false).unwrap();
    assert_eq!(info.chunks[0].id, "21");
}

#[test]
fn test_audio_payload_bytes_survive_intact() {
    let payload: Vec<u8> = (0..64u8).collect();
    let mut data = xc_header_packet((1000, 0), (1002, 0));
    data.extend_from_slice(&xc_audio_packet(1000, 0, &payload));
    data.extend_from_slice(&xc_end_packet());

    let info = parse_reader(Cursor::new(data), false).unwrap();
    assert_eq!(info.chunks[0].audio().unwrap().media, payload);
}

#[test]
fn test_data_after_end_packet_is_ignored() {
    let mut data = xc_header_packet((1000, 0), (1002, 0));
    data.extend_from_slice(&xc_end_packet());
    data.extend_from_slice(&[0xffu8; 100]);

    let info = parse_reader(Cursor::new(data), false).unwrap();
    assert!(info.chunks.is_empty());
}

#[test]
fn test_corrupt_sentinel_fails_the_parse() {
    let mut data = xc_header_packet((1000, 0), (1002, 0));
    let mut packet = xc_audio_packet(1000, 0, &[]);
    packet[1] = 0x7f;
    data.extend_from_slice(&packet);

    let err = parse_reader(Cursor::new(data), false).unwrap_err();
    assert!(matches!(err, RoscoError::CorruptPacket { .. }));
}

#[test]
fn test_unknown_packet_type_fails_the_parse() {
    let mut data = xc_header_packet((1000, 0), (1002, 0));
    data.push(0x55);

    let err = parse_reader(Cursor::new(data), false).unwrap_err();
    assert!(matches!(
        err,
        RoscoError::UnknownPacketType { packet_type: 0x55 }
    ));
}
