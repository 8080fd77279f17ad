// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! RIFF writer integrity: chunk padding, idx1 offsets, and FourCC checks.

use roscodec::riff::write::write_avi;
use roscodec::riff::{
    AviFile, AviHeader, Stream, StreamChunk, StreamFormat, StreamHeader, VideoFormat,
    AVIF_HAS_INDEX, AVIIF_KEYFRAME,
};
use roscodec::RoscoError;

fn stream_chunk(id: &str, data: &[u8], is_keyframe: bool, timestamp: u64) -> StreamChunk {
    StreamChunk {
        id: id.to_string(),
        data: data.to_vec(),
        is_keyframe,
        timestamp,
    }
}

fn indexed_file(chunks: Vec<StreamChunk>) -> AviFile {
    AviFile {
        header: AviHeader {
            flags: AVIF_HAS_INDEX,
            ..AviHeader::default()
        },
        streams: vec![Stream {
            header: StreamHeader {
                fcc_type: *b"vids",
                handler: *b"H264",
                ..StreamHeader::default()
            },
            format: StreamFormat::Video(VideoFormat::default()),
            chunks,
        }],
    }
}

/// Locate a top-level or nested chunk payload and its absolute position.
fn find_chunk(data: &[u8], fourcc: &str) -> (usize, usize) {
    let mut offset = 0;
    while offset + 8 <= data.len() {
        if &data[offset..offset + 4] == fourcc.as_bytes() {
            let length = u32::from_le_bytes([
                data[offset + 4],
                data[offset + 5],
                data[offset + 6],
                data[offset + 7],
            ]) as usize;
            return (offset + 8, length);
        }
        offset += 1;
    }
    panic!("chunk {fourcc} not found");
}

/// Locate the absolute position of the movi list's type code.
fn find_movi_fourcc(data: &[u8]) -> usize {
    let mut offset = 0;
    while offset + 12 <= data.len() {
        if &data[offset..offset + 4] == b"LIST" && &data[offset + 8..offset + 12] == b"movi" {
            return offset + 8;
        }
        offset += 1;
    }
    panic!("movi list not found");
}

#[test]
fn test_idx1_offsets_point_at_chunk_data() {
    let file = indexed_file(vec![
        stream_chunk("00dc", &[1, 2, 3], true, 0),
        stream_chunk("00dc", &[4, 5], false, 1),
        stream_chunk("00dc", &[6, 7, 8, 9, 10], false, 2),
    ]);
    let mut out = Vec::new();
    write_avi(&mut out, &file).unwrap();

    let movi_fourcc_pos = find_movi_fourcc(&out);
    let (idx1_pos, idx1_len) = find_chunk(&out, "idx1");
    assert_eq!(idx1_len, 3 * 16);

    let expected = [(true, vec![1u8, 2, 3]), (false, vec![4, 5]), (false, vec![6, 7, 8, 9, 10])];
    for (entry_index, (is_keyframe, data)) in expected.iter().enumerate() {
        let entry = &out[idx1_pos + entry_index * 16..idx1_pos + (entry_index + 1) * 16];
        assert_eq!(&entry[0..4], b"00dc");

        let flags = u32::from_le_bytes([entry[4], entry[5], entry[6], entry[7]]);
        assert_eq!(flags == AVIIF_KEYFRAME, *is_keyframe);

        let offset = u32::from_le_bytes([entry[8], entry[9], entry[10], entry[11]]) as usize;
        let length = u32::from_le_bytes([entry[12], entry[13], entry[14], entry[15]]) as usize;
        assert_eq!(length, data.len(), "length excludes padding");

        // offset + 8 is the chunk data position, measured from the movi
        // list's type code.
        let data_pos = movi_fourcc_pos + offset + 8;
        assert_eq!(&out[data_pos..data_pos + length], &data[..]);
    }
}

#[test]
fn test_odd_chunks_get_one_pad_byte() {
    let file = indexed_file(vec![
        stream_chunk("00dc", &[1, 2, 3], true, 0),
        stream_chunk("00dc", &[4, 5], false, 1),
    ]);
    let mut out = Vec::new();
    write_avi(&mut out, &file).unwrap();

    let movi_fourcc_pos = find_movi_fourcc(&out);
    // movi data: "00dc" len=3 [1,2,3] pad, "00dc" len=2 [4,5]
    let movi = &out[movi_fourcc_pos + 4..];
    assert_eq!(&movi[0..4], b"00dc");
    assert_eq!(u32::from_le_bytes([movi[4], movi[5], movi[6], movi[7]]), 3);
    assert_eq!(movi[11], 0, "pad byte after odd-length data");
    assert_eq!(&movi[12..16], b"00dc");
}

#[test]
fn test_even_chunks_are_unpadded() {
    let file = indexed_file(vec![
        stream_chunk("00dc", &[1, 2], true, 0),
        stream_chunk("00dc", &[3, 4], false, 1),
    ]);
    let mut out = Vec::new();
    write_avi(&mut out, &file).unwrap();

    let movi_fourcc_pos = find_movi_fourcc(&out);
    let movi = &out[movi_fourcc_pos + 4..];
    // Second chunk header follows immediately after the first's data.
    assert_eq!(&movi[10..14], b"00dc");
}

#[test]
fn test_riff_length_covers_whole_payload() {
    let file = indexed_file(vec![stream_chunk("00dc", &[1], true, 0)]);
    let mut out = Vec::new();
    write_avi(&mut out, &file).unwrap();

    assert_eq!(&out[0..4], b"RIFF");
    let declared = u32::from_le_bytes([out[4], out[5], out[6], out[7]]) as usize;
    assert_eq!(declared, out.len() - 8);
    assert_eq!(&out[8..12], b"AVI ");
}

#[test]
fn test_short_fourcc_is_rejected() {
    let file = indexed_file(vec![stream_chunk("0dc", &[1], true, 0)]);
    let mut out = Vec::new();
    let err = write_avi(&mut out, &file).unwrap_err();
    match err {
        RoscoError::BadFourCC { fourcc } => assert_eq!(fourcc, "0dc"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_long_fourcc_is_rejected() {
    let file = indexed_file(vec![stream_chunk("00dcx", &[1], true, 0)]);
    let mut out = Vec::new();
    assert!(matches!(
        write_avi(&mut out, &file).unwrap_err(),
        RoscoError::BadFourCC { .. }
    ));
}
