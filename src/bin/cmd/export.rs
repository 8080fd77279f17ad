// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Export commands - audio, video, and batch (dvpro) exports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::common::{parse_recording, ProgressBar, Result};
use roscodec::convert::{collect_stream_audio, make_avi};
use roscodec::riff::wav::{write_wav, WAVE_FORMAT_MULAW, WAVE_FORMAT_PCM};
use roscodec::riff::write::write_avi;

/// Export a stream from a file.
#[derive(Subcommand, Clone, Debug)]
pub enum ExportCmd {
    /// Export an audio stream from a file
    Audio {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Stream selector: 1 character for a logical camera, 2 for an
        /// exact substream
        #[arg(value_name = "STREAM")]
        stream: String,

        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// The output file format (can be one of: raw, wav)
        #[arg(long, default_value = "wav")]
        format: String,
    },

    /// Export a video stream from a file
    Video {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Stream selector: 1 character for a logical camera, 2 for an
        /// exact substream
        #[arg(value_name = "STREAM")]
        stream: String,

        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// The output file format (can be one of: avi)
        #[arg(long, default_value = "avi")]
        format: String,
    },

    /// Export the video streams from a list of files and/or directories
    Dvpro {
        /// Input files or directories to scan for .nvr files
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// The output directory; if not specified, the new files will be
        /// created next to the NVR files
        #[arg(long)]
        output_directory: Option<PathBuf>,
    },
}

impl ExportCmd {
    pub fn run(self) -> Result<()> {
        match self {
            ExportCmd::Audio {
                input,
                stream,
                output,
                format,
            } => cmd_audio(input, stream, output, format),
            ExportCmd::Video {
                input,
                stream,
                output,
                format,
            } => cmd_video(input, stream, output, format),
            ExportCmd::Dvpro {
                inputs,
                output_directory,
            } => cmd_dvpro(inputs, output_directory),
        }
    }
}

/// Cmd: Export audio
fn cmd_audio(input: PathBuf, stream: String, output: PathBuf, format: String) -> Result<()> {
    let info = parse_recording(&input, false)?;

    let Some(audio) = collect_stream_audio(&info, &stream)? else {
        anyhow::bail!("could not find any audio data in stream {stream}");
    };
    println!("Exporting audio data from stream {}...", audio.stream_id);

    match format.as_str() {
        "raw" => {
            let raw_bytes = audio.buffer.raw_bytes()?;
            std::fs::write(&output, raw_bytes)?;
        }
        "wav" => {
            let format_tag = if audio.raw_pcm {
                WAVE_FORMAT_MULAW
            } else {
                WAVE_FORMAT_PCM
            };
            println!(
                "WAV encoder: Sample rate: {}, Bit Depth: {}, Channels: {}, Format: {:#06x}",
                audio.buffer.sample_rate,
                audio.buffer.source_bit_depth,
                audio.buffer.channels,
                format_tag
            );
            let mut out = BufWriter::new(File::create(&output)?);
            write_wav(&mut out, format_tag, &audio.buffer)?;
        }
        other => anyhow::bail!("invalid audio format: {other}"),
    }

    Ok(())
}

/// Cmd: Export video
fn cmd_video(input: PathBuf, stream: String, output: PathBuf, format: String) -> Result<()> {
    let info = parse_recording(&input, false)?;

    match format.as_str() {
        "avi" => {
            println!("Exporting video data from stream {stream}...");
            let file = make_avi(&info, &stream)?;
            let mut out = BufWriter::new(File::create(&output)?);
            write_avi(&mut out, &file)?;
            out.flush()?;
        }
        other => anyhow::bail!("invalid video format: {other}"),
    }

    Ok(())
}

/// Cmd: Batch-export every logical camera of every NVR file
fn cmd_dvpro(inputs: Vec<PathBuf>, output_directory: Option<PathBuf>) -> Result<()> {
    let mut input_files = Vec::new();
    for input in &inputs {
        let file_info = std::fs::metadata(input)?;
        if file_info.is_dir() {
            for entry in std::fs::read_dir(input)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some("nvr")
                {
                    input_files.push(path);
                }
            }
        } else {
            input_files.push(input.clone());
        }
    }
    input_files.sort();

    let progress = ProgressBar::new(input_files.len() as u64, "dvpro");
    let mut exported = 0usize;
    for input_file in &input_files {
        let info = parse_recording(input_file, false)?;

        let mut logical_stream_ids: Vec<String> = info
            .stream_ids()
            .iter()
            .filter_map(|id| id.chars().next())
            .map(String::from)
            .collect();
        logical_stream_ids.sort();
        logical_stream_ids.dedup();

        for (stream_index, stream_id) in logical_stream_ids.iter().enumerate() {
            println!("Exporting video data from stream {stream_id}...");
            let file = make_avi(&info, stream_id)?;

            let destination = dvpro_destination(input_file, stream_index, &output_directory);
            println!("-> {}", destination.display());
            let mut out = BufWriter::new(File::create(&destination)?);
            write_avi(&mut out, &file)?;
            out.flush()?;
            exported += 1;
        }
        progress.inc();
    }
    progress.finish_with_message(format!("{exported} stream(s) exported"));

    Ok(())
}

fn dvpro_destination(
    input_file: &Path,
    stream_index: usize,
    output_directory: &Option<PathBuf>,
) -> PathBuf {
    let folder = output_directory
        .clone()
        .unwrap_or_else(|| input_file.parent().unwrap_or(Path::new(".")).to_path_buf());
    let base = input_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    folder.join(format!("{base}_{}.avi", stream_index + 1))
}
