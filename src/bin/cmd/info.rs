// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Info command - show metadata, streams, and per-stream totals.

use std::path::PathBuf;

use clap::Args;

use crate::common::{parse_recording, Result};
use roscodec::encoding::meta::{Metadata, TYPE_SUB};
use roscodec::FileInfo;

/// Show the information from the given file(s).
#[derive(Args, Clone, Debug)]
pub struct InfoCmd {
    /// Input files (NVR or ASD)
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Dump out everything about the file
    #[arg(long)]
    dump: bool,

    /// Only read the header data
    #[arg(long)]
    header_only: bool,
}

impl InfoCmd {
    pub fn run(self) -> Result<()> {
        let mut failures = 0usize;
        for path in &self.files {
            println!("File: {}", path.display());
            let info = match parse_recording(path, self.header_only) {
                Ok(info) => info,
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    failures += 1;
                    continue;
                }
            };
            print_file_info(&info);

            if self.dump {
                println!("{info:#?}");
            }
        }

        if failures > 0 {
            anyhow::bail!("{failures} file(s) could not be parsed");
        }
        Ok(())
    }
}

/// Print a metadata tree, one level of nesting deep.
pub fn print_metadata(metadata: &Metadata) {
    println!("Metadata: ({})", metadata.entries.len());
    for entry in &metadata.entries {
        if entry.type_tag == TYPE_SUB {
            println!("   * {}:", entry.name);
            if let Some(sub) = entry.value.as_sub() {
                for sub_entry in &sub.entries {
                    println!("      * {} = {}", sub_entry.name, sub_entry.value);
                }
            }
        } else {
            println!("   * {} = {}", entry.name, entry.value);
        }
    }
}

fn print_file_info(info: &FileInfo) {
    if !info.filename.is_empty() {
        println!("Filename: {}", info.filename);
    }
    print_metadata(&info.metadata);

    let stream_ids = info.stream_ids();
    println!("Streams: ({})", stream_ids.len());
    for (index, stream_id) in stream_ids.iter().enumerate() {
        println!("   {index}. {stream_id}");
    }

    for stream_id in &stream_ids {
        println!("Stream: {stream_id}");
        let chunks = info.chunks_for_stream(stream_id);
        let mut audio_bytes = 0usize;
        let mut video_bytes = 0usize;
        for chunk in &chunks {
            if let Some(audio) = chunk.audio() {
                audio_bytes += audio.media.len();
            }
            if let Some(video) = chunk.video() {
                video_bytes += video.media.len();
            }
        }
        println!("   Chunks: {}", chunks.len());
        println!("   Audio: {audio_bytes} bytes");
        println!("   Video: {video_bytes} bytes");
    }
}
