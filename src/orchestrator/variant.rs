// src/orchestrator/variant.rs

use std::ffi::OsString;
use std::path::Path;

use crate::capture::CapturePlan;

/// Binary that takes `output <path>` instead of `--saveprefix <path>`.
pub const SIMPLE_COLORING: &str = "simple_coloring";
/// Binary that prints its result on stdout instead of writing a file.
pub const TSC: &str = "TSC";

/// How a binary produces its output, chosen once from the binary's file name.
///
/// Carries both the argv rule (which flag, if any, names the output path) and
/// the capture rule (what happens to stdout and stderr).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRouting {
    /// The binary writes the output itself; `flag` precedes the output path.
    /// Stdout and stderr are both logged as one stream.
    SelfWritingOutput { flag: &'static str },
    /// The binary prints its output on stdout, which is copied verbatim to the
    /// output path. Stderr is logged separately so stdout stays clean.
    StdoutCaptureOutput,
}

impl OutputRouting {
    pub fn from_binary(binary: &Path) -> Self {
        let name = binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match name.as_str() {
            SIMPLE_COLORING => OutputRouting::SelfWritingOutput { flag: "output" },
            TSC => OutputRouting::StdoutCaptureOutput,
            _ => OutputRouting::SelfWritingOutput {
                flag: "--saveprefix",
            },
        }
    }

    /// Arguments appended after the common `--graph`/`--format` arguments.
    pub fn output_args(&self, output: &Path) -> Vec<OsString> {
        match self {
            OutputRouting::SelfWritingOutput { flag } => {
                vec![OsString::from(*flag), output.as_os_str().to_os_string()]
            }
            OutputRouting::StdoutCaptureOutput => Vec::new(),
        }
    }

    pub fn capture_plan(&self, output: &Path) -> CapturePlan {
        match self {
            OutputRouting::SelfWritingOutput { .. } => CapturePlan::merged(),
            OutputRouting::StdoutCaptureOutput => CapturePlan::stdout_to(output),
        }
    }

    pub fn merges_stderr(&self) -> bool {
        matches!(self, OutputRouting::SelfWritingOutput { .. })
    }
}
