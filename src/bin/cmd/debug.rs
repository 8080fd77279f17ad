// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Debug command - dump one chunk of one stream through the hex formatter.

use std::path::PathBuf;

use clap::Args;

use crate::cmd::info::print_metadata;
use crate::common::{parse_recording, Result};
use roscodec::core::hexdump::hex_lines;

/// Show debug information for one chunk of one stream.
#[derive(Args, Clone, Debug)]
pub struct DebugCmd {
    /// Input file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Stream ID (e.g. "17")
    #[arg(value_name = "STREAM")]
    stream: String,

    /// Chunk index within the stream
    #[arg(value_name = "CHUNK")]
    chunk: usize,

    /// The number of bytes to print (when printing raw data); use 0 for no
    /// limit
    #[arg(long, default_value_t = 120)]
    byte_limit: usize,
}

impl DebugCmd {
    pub fn run(self) -> Result<()> {
        println!("File: {}", self.file.display());
        let info = parse_recording(&self.file, false)?;

        println!("Stream: {}", self.stream);
        let chunks = info.chunks_for_stream(&self.stream);
        println!("Chunks: {}", chunks.len());

        println!("Chunk index: {}", self.chunk);
        let Some(chunk) = chunks.get(self.chunk) else {
            anyhow::bail!("invalid chunk index: {}", self.chunk);
        };

        println!("ID: {}", chunk.id);
        println!("Type: {}", chunk.chunk_type);
        if let Some(audio) = chunk.audio() {
            println!("This is an audio chunk.");
            println!("Timestamp: {}", audio.timestamp);
            println!("Media: ({})", audio.media.len());
            println!("{}", hex_lines(&audio.media, self.byte_limit, 80));
            if let Some(extra) = &audio.extra_media {
                println!("Extra Media: ({})", extra.len());
                println!("{}", hex_lines(extra, self.byte_limit, 80));
            }
        }
        if let Some(video) = chunk.video() {
            println!("This is a video chunk.");
            println!("Codec: {}", video.codec);
            println!("Timestamp: {}", video.timestamp);
            println!("Unknown1: {:02x?}", video.unknown1);
            println!("Small metadata length: {}", video.metadata_length_small);
            print_metadata(&video.metadata);
            println!("Media: ({})", video.media.len());
            println!("{}", hex_lines(&video.media, self.byte_limit, 80));
        }
        if let Some(still) = chunk.image() {
            println!("This is an image chunk.");
            println!(
                "Image: {}x{} ({} JFIF bytes)",
                still.image.width(),
                still.image.height(),
                still.jfif.len()
            );
        }

        Ok(())
    }
}
