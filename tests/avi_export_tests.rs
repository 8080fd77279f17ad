// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AVI export integration tests: geometry discovery, rate derivation,
//! index integrity, and the full parse-mux-serialize pipeline.

mod common;

use std::io::Cursor;

use common::{annexb, build_sps, xc4_header, xc4_video_chunk};
use roscodec::convert::make_avi;
use roscodec::io::records::{AudioChunk, Chunk, ChunkPayload, FileInfo, VideoChunk};
use roscodec::riff::write::write_avi;
use roscodec::riff::StreamFormat;
use roscodec::{parse_reader, RoscoError};

fn video_chunk(id: &str, timestamp: u64, media: Vec<u8>) -> Chunk {
    Chunk {
        id: id.to_string(),
        chunk_type: "dc".to_string(),
        payload: ChunkPayload::Video(VideoChunk {
            codec: "H264".to_string(),
            timestamp,
            media,
            ..VideoChunk::default()
        }),
    }
}

fn audio_chunk(id: &str, timestamp: u64, media: Vec<u8>) -> Chunk {
    Chunk {
        id: id.to_string(),
        chunk_type: "wb".to_string(),
        payload: ChunkPayload::Audio(AudioChunk {
            timestamp,
            media,
            extra_media: None,
        }),
    }
}

/// Thirty frames spanning exactly one second: three keyframes on the
/// keyframe substream, twenty-seven interframes.
fn thirty_frame_file() -> FileInfo {
    let mut info = FileInfo::default();
    for index in 0..30u64 {
        let timestamp = index * 1_000_000 / 29;
        let id = if index % 10 == 0 { "10" } else { "11" };
        info.chunks.push(video_chunk(id, timestamp, vec![index as u8]));
    }
    info
}

#[test]
fn test_thirty_frames_over_one_second() {
    let file = make_avi(&thirty_frame_file(), "1").unwrap();

    assert_eq!(file.header.total_frames, 30);
    assert_eq!(file.header.streams, 1);
    assert_eq!(file.header.micro_sec_per_frame, 33333);
    assert_eq!(file.streams[0].header.rate, 30000);
    assert_eq!(file.streams[0].header.scale, 1000);
    assert_eq!(file.streams[0].header.length, 30);

    let keyframes = file.streams[0]
        .chunks
        .iter()
        .filter(|c| c.is_keyframe)
        .count();
    assert_eq!(keyframes, 3);
}

#[test]
fn test_idx1_has_one_entry_per_chunk_with_keyframe_flags() {
    let file = make_avi(&thirty_frame_file(), "1").unwrap();
    let mut out = Vec::new();
    write_avi(&mut out, &file).unwrap();

    let idx1_pos = out
        .windows(4)
        .position(|w| w == b"idx1")
        .expect("idx1 present");
    let length = u32::from_le_bytes([
        out[idx1_pos + 4],
        out[idx1_pos + 5],
        out[idx1_pos + 6],
        out[idx1_pos + 7],
    ]) as usize;
    assert_eq!(length, 30 * 16);

    let entries = &out[idx1_pos + 8..idx1_pos + 8 + length];
    let flagged = entries
        .chunks(16)
        .filter(|entry| u32::from_le_bytes([entry[4], entry[5], entry[6], entry[7]]) == 0x10)
        .count();
    assert_eq!(flagged, 3);
}

#[test]
fn test_geometry_is_running_max_over_sps() {
    let mut info = FileInfo::default();
    let mut media = annexb(&build_sps(100, 640, 480));
    media.extend_from_slice(&annexb(&[0x65, 0x01, 0x02])); // IDR slice
    info.chunks.push(video_chunk("10", 0, media));
    info.chunks
        .push(video_chunk("10", 33_000, annexb(&build_sps(66, 1920, 1080))));
    info.chunks
        .push(video_chunk("10", 66_000, annexb(&build_sps(66, 1280, 720))));

    let file = make_avi(&info, "1").unwrap();
    assert_eq!(file.header.width, 1920);
    assert_eq!(file.header.height, 1080);
    assert_eq!(file.streams[0].header.width, 1920);
    match &file.streams[0].format {
        StreamFormat::Video(format) => {
            assert_eq!(format.size_image, 1920 * 1080 * 3);
            assert_eq!(format.bit_count, 24);
            assert_eq!(&format.compression, b"H264");
        }
        StreamFormat::Audio(_) => panic!("expected video format"),
    }
}

#[test]
fn test_no_sps_means_zero_geometry() {
    let mut info = FileInfo::default();
    info.chunks.push(video_chunk("10", 0, vec![0x65, 0x88]));
    let file = make_avi(&info, "1").unwrap();
    assert_eq!(file.header.width, 0);
    assert_eq!(file.header.height, 0);
}

#[test]
fn test_interframes_before_first_keyframe_are_dropped() {
    let mut info = FileInfo::default();
    info.chunks.push(video_chunk("11", 0, vec![1]));
    info.chunks.push(video_chunk("11", 10_000, vec![2]));
    info.chunks.push(video_chunk("10", 20_000, vec![3]));
    info.chunks.push(video_chunk("11", 30_000, vec![4]));

    let file = make_avi(&info, "1").unwrap();
    assert_eq!(file.streams[0].chunks.len(), 2);
    assert_eq!(file.header.total_frames, 2);
    assert!(file.streams[0].chunks[0].is_keyframe);
}

#[test]
fn test_mulaw_audio_joins_as_second_stream() {
    let mut info = thirty_frame_file();
    info.chunks.push(audio_chunk("17", 0, vec![0x10, 0x20]));
    info.chunks.push(audio_chunk("17", 500_000, vec![0x30]));

    let file = make_avi(&info, "1").unwrap();
    assert_eq!(file.header.streams, 2);
    assert_eq!(file.streams.len(), 2);

    let audio = &file.streams[1];
    assert_eq!(&audio.header.fcc_type, b"auds");
    assert_eq!(audio.header.rate, 8000);
    assert_eq!(audio.chunks.len(), 2);
    assert_eq!(audio.chunks[0].id, "01wb");
    assert_eq!(audio.chunks[1].timestamp, 500_000);
    match &audio.format {
        StreamFormat::Audio(format) => {
            assert_eq!(format.format_tag, 0x0007);
            assert_eq!(format.bits_per_sample, 8);
        }
        StreamFormat::Video(_) => panic!("expected audio format"),
    }
}

#[test]
fn test_exact_selector_picks_one_substream() {
    let mut info = FileInfo::default();
    info.chunks.push(video_chunk("10", 0, vec![1]));
    info.chunks.push(video_chunk("20", 0, vec![2]));

    let file = make_avi(&info, "20").unwrap();
    assert_eq!(file.streams[0].chunks.len(), 1);
    assert_eq!(file.streams[0].chunks[0].data, vec![2]);
}

#[test]
fn test_parse_mux_serialize_pipeline() {
    // Build an XC4 file whose keyframe chunk carries a real SPS, then run
    // the whole pipeline and sanity-check the output container.
    let sps_media = annexb(&build_sps(66, 320, 240));
    let mut data = xc4_header("trip.nvr", Some("v1.6.5"));
    data.extend_from_slice(&xc4_video_chunk("10", 0, &sps_media));
    data.extend_from_slice(&xc4_video_chunk("11", 33_333, &[0x41, 0x9a]));
    data.extend_from_slice(&xc4_video_chunk("11", 66_666, &[0x41, 0x9b]));

    let info = parse_reader(Cursor::new(data), false).unwrap();
    let avi = make_avi(&info, "1").unwrap();
    assert_eq!(avi.header.width, 320);
    assert_eq!(avi.header.total_frames, 3);

    let mut out = Vec::new();
    write_avi(&mut out, &avi).unwrap();
    assert_eq!(&out[0..4], b"RIFF");
    assert_eq!(&out[8..12], b"AVI ");
    let declared = u32::from_le_bytes([out[4], out[5], out[6], out[7]]) as usize;
    assert_eq!(declared, out.len() - 8);
    assert!(out.windows(4).any(|w| w == b"movi"));
    assert!(out.windows(4).any(|w| w == b"idx1"));
}

#[test]
fn test_bad_stream_chunk_fourcc_surfaces_from_writer() {
    let mut file = make_avi(&thirty_frame_file(), "1").unwrap();
    file.streams[0].chunks[0].id = "bad".to_string();
    let mut out = Vec::new();
    assert!(matches!(
        write_avi(&mut out, &file).unwrap_err(),
        RoscoError::BadFourCC { .. }
    ));
}
