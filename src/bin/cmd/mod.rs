// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod debug;
mod export;
mod info;

pub use debug::DebugCmd;
pub use export::ExportCmd;
pub use info::InfoCmd;
