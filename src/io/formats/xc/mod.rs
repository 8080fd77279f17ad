// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XC (ASD) container parser.
//!
//! An XC file is a sequence of tagged, fixed-size packets plus variable
//! payloads. The header packet carries wall-clock start and end times;
//! media packet timestamps are also wall-clock, so after parsing they are
//! rebased to a per-file monotonic microsecond timeline (the smallest
//! timestamp becomes zero).
//!
//! Most packet bodies open with a 0xFF sentinel byte; a mismatch means the
//! stream is corrupt.

use std::io::Read;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::{Result, RoscoError};
use crate::encoding::cursor::ByteCursor;
use crate::encoding::meta::{Metadata, MetadataValue, TYPE_INT64};
use crate::io::records::{
    AudioChunk, Chunk, ChunkPayload, FileInfo, VideoChunk, META_AUDIO_BIT_DEPTH, META_DURATION,
};

/// Packet type tags.
const PACKET_HEADER: u8 = 0x14;
const PACKET_UNKNOWN_00: u8 = 0x00;
const PACKET_UNKNOWN_01: u8 = 0x01;
const PACKET_GPS: u8 = 0x02;
const PACKET_AUDIO: u8 = 0x03;
const PACKET_VIDEO: u8 = 0x80;
const PACKET_END: u8 = 0x06;

/// Total packet sizes, including the type byte.
const HEADER_PACKET_SIZE: usize = 0x52;
const UNKNOWN_00_PACKET_SIZE: usize = 0x16;
const UNKNOWN_01_PACKET_SIZE: usize = 0x06;
const GPS_PACKET_SIZE: usize = 0x5e;
const AUDIO_PACKET_SIZE: usize = 0x12;
const VIDEO_PACKET_SIZE: usize = 0x14;
const END_PACKET_SIZE: usize = 0x06;

/// A wall-clock instant: seconds plus microseconds, both little-endian
/// 32-bit on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WallClock {
    seconds: u32,
    microseconds: u32,
}

impl WallClock {
    fn read(cursor: &mut ByteCursor<'_>, context: &str) -> Result<Self> {
        let seconds = cursor.read_u32(context)?;
        let microseconds = cursor.read_u32(context)?;
        Ok(Self {
            seconds,
            microseconds,
        })
    }

    fn as_nanos(&self) -> u64 {
        u64::from(self.seconds) * 1_000_000_000 + u64::from(self.microseconds) * 1_000
    }

    fn as_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(
            i64::from(self.seconds),
            self.microseconds.saturating_mul(1_000),
        )
    }
}

/// Parse an XC stream. The reader must be positioned at byte 0.
pub fn parse_xc<R: Read>(mut reader: R, header_only: bool) -> Result<FileInfo> {
    let mut type_byte = [0u8; 1];
    reader
        .read_exact(&mut type_byte)
        .map_err(|_| RoscoError::truncated("packet type", 1))?;
    if type_byte[0] != PACKET_HEADER {
        return Err(RoscoError::corrupt(
            "file header",
            "could not find the header packet",
        ));
    }

    let header = parse_header_packet(&mut reader)?;
    let mut file_info = FileInfo {
        filename: synthesize_filename(&header),
        header_unknown: Vec::new(),
        metadata: synthesize_metadata(&header),
        chunks: Vec::new(),
    };

    if header_only {
        return Ok(file_info);
    }

    // Raw wall-clock nanoseconds, parallel to file_info.chunks.
    let mut raw_timestamps: Vec<u64> = Vec::new();

    let mut done = false;
    while !done {
        let mut type_byte = [0u8; 1];
        match reader.read(&mut type_byte) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => return Err(RoscoError::io("packet type", e.to_string())),
        }

        match type_byte[0] {
            PACKET_HEADER => {
                return Err(RoscoError::corrupt(
                    "packet stream",
                    "unexpected second file header",
                ));
            }
            PACKET_UNKNOWN_00 => {
                let packet = parse_unknown_00_packet(&mut reader)?;
                debug!(
                    sequence = packet.sequence,
                    timestamp = packet.timestamp.as_nanos(),
                    "unknown-00 packet"
                );
            }
            PACKET_UNKNOWN_01 => {
                let sequence = parse_unknown_01_packet(&mut reader)?;
                debug!(sequence, "unknown-01 packet");
            }
            PACKET_GPS => {
                let packet = parse_gps_packet(&mut reader)?;
                debug!(
                    latitude = packet.latitude,
                    longitude = packet.longitude,
                    speed = packet.speed,
                    date = %format!(
                        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                        packet.year,
                        packet.month,
                        packet.day,
                        packet.hour,
                        packet.minute,
                        packet.second
                    ),
                    "GPS packet"
                );
            }
            PACKET_AUDIO => {
                let packet = parse_audio_packet(&mut reader)?;
                debug!(
                    bytes = packet.payload.len(),
                    timestamp = packet.timestamp.as_nanos(),
                    "audio packet"
                );
                raw_timestamps.push(packet.timestamp.as_nanos());
                file_info.chunks.push(Chunk {
                    id: "17".to_string(),
                    chunk_type: "wb".to_string(),
                    payload: ChunkPayload::Audio(AudioChunk {
                        timestamp: 0, // rebased below
                        media: packet.payload,
                        extra_media: None,
                    }),
                });
            }
            PACKET_VIDEO => {
                let packet = parse_video_packet(&mut reader)?;
                debug!(
                    stream_number = packet.stream_number,
                    stream_type = packet.stream_type,
                    bytes = packet.payload.len(),
                    timestamp = packet.timestamp.as_nanos(),
                    "video packet"
                );
                raw_timestamps.push(packet.timestamp.as_nanos());
                file_info.chunks.push(Chunk {
                    id: format!("{}{}", packet.stream_number, packet.stream_type),
                    chunk_type: "dc".to_string(),
                    payload: ChunkPayload::Video(VideoChunk {
                        timestamp: 0, // rebased below
                        media: packet.payload,
                        ..VideoChunk::default()
                    }),
                });
            }
            PACKET_END => {
                let number = parse_end_packet(&mut reader)?;
                debug!(number, "end packet");
                done = true;
            }
            other => return Err(RoscoError::unknown_packet_type(other)),
        }
    }

    normalize_timestamps(&mut file_info.chunks, &raw_timestamps);

    // Anything after the end packet is ignored.
    let mut remaining = Vec::new();
    reader
        .read_to_end(&mut remaining)
        .map_err(|e| RoscoError::io("trailing data", e.to_string()))?;
    debug!(bytes = remaining.len(), "remaining data");

    Ok(file_info)
}

/// Rebase wall-clock timestamps so the smallest becomes zero, in
/// microseconds.
fn normalize_timestamps(chunks: &mut [Chunk], raw_timestamps: &[u64]) {
    let Some(&smallest) = raw_timestamps.iter().min() else {
        return;
    };
    for (chunk, &raw) in chunks.iter_mut().zip(raw_timestamps) {
        let normalized = (raw - smallest) / 1_000;
        match &mut chunk.payload {
            ChunkPayload::Audio(audio) => audio.timestamp = normalized,
            ChunkPayload::Video(video) => video.timestamp = normalized,
            ChunkPayload::Image(_) => {}
        }
    }
}

fn synthesize_filename(header: &HeaderPacket) -> String {
    match (
        header.start_time.as_datetime(),
        header.end_time.as_datetime(),
    ) {
        (Some(start), Some(end)) => format!(
            "rec-{}-{}-{}.asd",
            start.format("%Y%m%d"),
            start.format("%H%M%S"),
            end.format("%H%M%S")
        ),
        _ => "rec.asd".to_string(),
    }
}

fn synthesize_metadata(header: &HeaderPacket) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.push(TYPE_INT64, META_AUDIO_BIT_DEPTH, MetadataValue::Int64(16));
    metadata.push(
        TYPE_INT64,
        META_DURATION,
        MetadataValue::Int64(
            i64::from(header.end_time.seconds) - i64::from(header.start_time.seconds),
        ),
    );
    metadata
}

#[derive(Debug)]
struct HeaderPacket {
    start_time: WallClock,
    end_time: WallClock,
}

#[derive(Debug)]
struct Unknown00Packet {
    sequence: u32,
    timestamp: WallClock,
}

#[derive(Debug)]
struct GpsPacket {
    latitude: f64,
    longitude: f64,
    speed: u32,
    year: i32,
    month: i32,
    day: i32,
    hour: i32,
    minute: i32,
    second: i32,
}

#[derive(Debug)]
struct AudioPacket {
    timestamp: WallClock,
    payload: Vec<u8>,
}

#[derive(Debug)]
struct VideoPacket {
    stream_number: i8,
    stream_type: i8,
    timestamp: WallClock,
    payload: Vec<u8>,
}

/// Read the fixed body of a packet (everything after the type byte).
fn read_body<R: Read>(reader: &mut R, packet_size: usize, context: &str) -> Result<Vec<u8>> {
    let body_size = packet_size - 1;
    let mut body = vec![0u8; body_size];
    reader
        .read_exact(&mut body)
        .map_err(|_| RoscoError::truncated(context, body_size))?;
    Ok(body)
}

/// Validate the 0xFF sentinel that opens most packet bodies.
fn read_sentinel(cursor: &mut ByteCursor<'_>, context: &str) -> Result<()> {
    let byte = cursor.read_u8(context)?;
    if byte != 0xff {
        return Err(RoscoError::corrupt(
            context,
            format!("incorrect first byte: {byte:#04x}"),
        ));
    }
    Ok(())
}

fn parse_header_packet<R: Read>(reader: &mut R) -> Result<HeaderPacket> {
    let body = read_body(reader, HEADER_PACKET_SIZE, "header packet")?;
    let mut cursor = ByteCursor::new(&body);

    let unknown1 = cursor.read_bytes(11, "header packet")?;
    debug!(unknown1 = ?unknown1, "header packet prefix");

    let start_time = WallClock::read(&mut cursor, "header start time")?;
    let end_time = WallClock::read(&mut cursor, "header end time")?;
    debug!(tail = cursor.remaining(), "header packet tail");

    Ok(HeaderPacket {
        start_time,
        end_time,
    })
}

fn parse_unknown_00_packet<R: Read>(reader: &mut R) -> Result<Unknown00Packet> {
    let body = read_body(reader, UNKNOWN_00_PACKET_SIZE, "unknown-00 packet")?;
    let mut cursor = ByteCursor::new(&body);

    read_sentinel(&mut cursor, "unknown-00 packet")?;
    let sequence = cursor.read_u32("unknown-00 sequence")?;
    cursor.skip(8, "unknown-00 packet")?;
    let timestamp = WallClock::read(&mut cursor, "unknown-00 timestamp")?;

    Ok(Unknown00Packet {
        sequence,
        timestamp,
    })
}

fn parse_unknown_01_packet<R: Read>(reader: &mut R) -> Result<u32> {
    let body = read_body(reader, UNKNOWN_01_PACKET_SIZE, "unknown-01 packet")?;
    let mut cursor = ByteCursor::new(&body);

    read_sentinel(&mut cursor, "unknown-01 packet")?;
    cursor.read_u32("unknown-01 sequence")
}

fn parse_gps_packet<R: Read>(reader: &mut R) -> Result<GpsPacket> {
    let body = read_body(reader, GPS_PACKET_SIZE, "GPS packet")?;
    let mut cursor = ByteCursor::new(&body);

    read_sentinel(&mut cursor, "GPS packet")?;
    let _sequence = cursor.read_u32("GPS sequence")?;
    cursor.skip(1, "GPS packet")?;
    let latitude_direction = cursor.read_u8("GPS latitude direction")?;
    let longitude_direction = cursor.read_u8("GPS longitude direction")?;
    cursor.skip(1, "GPS packet")?;
    cursor.skip(4, "GPS packet")?;
    let speed = cursor.read_u32("GPS speed")?;
    cursor.skip(12, "GPS packet")?;

    let latitude = read_ascii_float(&mut cursor, "GPS latitude")?;
    let longitude = read_ascii_float(&mut cursor, "GPS longitude")?;
    debug!(
        latitude_direction = %(latitude_direction as char),
        longitude_direction = %(longitude_direction as char),
        "GPS directions"
    );

    cursor.skip(2, "GPS packet")?;
    let _timestamp = WallClock::read(&mut cursor, "GPS timestamp")?;

    let year = cursor.read_i32("GPS year")?;
    let month = cursor.read_i32("GPS month")?;
    let day = cursor.read_i32("GPS day")?;
    let hour = cursor.read_i32("GPS hour")?;
    let minute = cursor.read_i32("GPS minute")?;
    let second = cursor.read_i32("GPS second")?;

    Ok(GpsPacket {
        latitude,
        longitude,
        speed,
        year,
        month,
        day,
        hour,
        minute,
        second,
    })
}

/// Read a 15-byte NUL-padded ASCII decimal field.
fn read_ascii_float(cursor: &mut ByteCursor<'_>, context: &str) -> Result<f64> {
    let raw = cursor.read_bytes(15, context)?;
    let text: String = raw
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();
    text.trim()
        .parse::<f64>()
        .map_err(|e| RoscoError::corrupt(context, format!("bad decimal field {text:?}: {e}")))
}

fn parse_audio_packet<R: Read>(reader: &mut R) -> Result<AudioPacket> {
    let body = read_body(reader, AUDIO_PACKET_SIZE, "audio packet")?;
    let mut cursor = ByteCursor::new(&body);

    read_sentinel(&mut cursor, "audio packet")?;
    let _sequence = cursor.read_u32("audio sequence")?;
    let timestamp = WallClock::read(&mut cursor, "audio timestamp")?;
    let payload_size = cursor.read_i32("audio payload size")?;

    let payload_size = payload_size.max(0) as usize;
    let mut payload = vec![0u8; payload_size];
    reader
        .read_exact(&mut payload)
        .map_err(|_| RoscoError::truncated("audio payload", payload_size))?;

    Ok(AudioPacket { timestamp, payload })
}

fn parse_video_packet<R: Read>(reader: &mut R) -> Result<VideoPacket> {
    let body = read_body(reader, VIDEO_PACKET_SIZE, "video packet")?;
    let mut cursor = ByteCursor::new(&body);

    cursor.skip(3, "video packet")?;
    let stream_number = cursor.read_i8("video stream number")?;
    cursor.skip(2, "video packet")?;
    let stream_type = cursor.read_i8("video stream type")?;
    let payload_size = cursor.read_i32("video payload size")?;
    let timestamp = WallClock::read(&mut cursor, "video timestamp")?;

    let payload_size = payload_size.max(0) as usize;
    let mut payload = vec![0u8; payload_size];
    reader
        .read_exact(&mut payload)
        .map_err(|_| RoscoError::truncated("video payload", payload_size))?;

    Ok(VideoPacket {
        stream_number,
        stream_type,
        timestamp,
        payload,
    })
}

fn parse_end_packet<R: Read>(reader: &mut R) -> Result<i32> {
    let body = read_body(reader, END_PACKET_SIZE, "end packet")?;
    let mut cursor = ByteCursor::new(&body);

    read_sentinel(&mut cursor, "end packet")?;
    cursor.read_i32("end number")
}
