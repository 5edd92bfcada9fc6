//! Platform toolchains.
//!
//! The planner stays platform-agnostic; everything per-platform (tool names,
//! linker argument assembly, whether autolink directives need extracting)
//! sits behind the [`Toolchain`] trait with one implementation per supported
//! platform family.

use crate::{
    diagnostics::DiagnosticEngine,
    error::{DriverError, Result},
    job::ArgTemplate,
    mode::{CompilerMode, LinkOutputType},
    options::{Opt, ParsedOptions},
    path::{TypedVirtualPath, VirtualPath},
    target::Triple,
};
use std::path::{Path, PathBuf};

mod darwin;
mod unix;

pub use darwin::DarwinToolchain;
pub use unix::GenericUnixToolchain;

/// The tools a toolchain can be asked to locate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    SwiftCompiler,
    Linker,
    StaticLinker,
    AutolinkExtract,
    DsymUtil,
}

/// Everything the linker argument builder needs from the resolved
/// configuration.
pub struct LinkContext<'a> {
    pub output_type: LinkOutputType,
    pub output: &'a VirtualPath,
    pub inputs: &'a [TypedVirtualPath],
    pub target: &'a Triple,
    pub sdk_path: Option<&'a Path>,
    pub library_search_paths: &'a [String],
}

pub trait Toolchain: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Resolves a tool to the executable the job will invoke. Resolution is
    /// by name; `PATH` lookup happens at execution time.
    fn find_tool(&self, tool: Tool) -> PathBuf;

    /// Whether objects carry embedded autolink directives that must be
    /// extracted into a separate file before linking.
    fn requires_autolink_extract(&self) -> bool;

    /// The SDK to fall back to when neither `-sdk` nor `SDKROOT` is given.
    fn default_sdk_path(&self) -> Option<PathBuf> {
        None
    }

    /// The output name used when no `-o` was given.
    fn default_linker_output_name(&self, output_type: LinkOutputType, module_name: &str)
        -> String;

    /// Builds the link invocation: the tool plus its full argument list.
    fn link_job(&self, ctx: &LinkContext<'_>) -> (PathBuf, Vec<ArgTemplate>);
}

/// Picks the toolchain for a target triple.
pub fn toolchain_for_target(triple: &Triple) -> Result<Box<dyn Toolchain>> {
    use crate::target::TargetOs;
    match triple.os {
        TargetOs::MacOs | TargetOs::Ios | TargetOs::TvOs | TargetOs::WatchOs => {
            Ok(Box::new(DarwinToolchain))
        }
        TargetOs::Linux | TargetOs::FreeBsd | TargetOs::Haiku => {
            Ok(Box::new(GenericUnixToolchain))
        }
        TargetOs::Unknown => Err(DriverError::UnknownTarget(triple.as_str().to_string())),
    }
}

/// Resolves the SDK path: explicit `-sdk`, then `SDKROOT`, then (for the
/// interactive modes on macOS) the toolchain default. A missing directory is
/// only a warning.
pub fn resolve_sdk_path(
    opts: &ParsedOptions,
    working_dir: Option<&Path>,
    env_sdkroot: Option<&str>,
    mode: &CompilerMode,
    triple: &Triple,
    toolchain: &dyn Toolchain,
    diags: &DiagnosticEngine,
) -> Option<PathBuf> {
    let raw = opts
        .last_value(Opt::Sdk)
        .map(str::to_string)
        .or_else(|| env_sdkroot.map(str::to_string))
        .or_else(|| {
            let interactive =
                matches!(mode, CompilerMode::Immediate | CompilerMode::Repl);
            if interactive && triple.is_macos() {
                toolchain.default_sdk_path().map(|p| p.display().to_string())
            } else {
                None
            }
        })?;

    let trimmed = raw.trim_end_matches('/');
    let mut path = PathBuf::from(if trimmed.is_empty() { "/" } else { trimmed });
    if let Some(wd) = working_dir {
        if !path.is_absolute() {
            path = wd.join(path);
        }
    }
    if !path.exists() {
        diags.warning(format!("no such SDK: '{}'", path.display()));
    }
    debug!(sdk = %path.display(), "resolved SDK path");
    Some(path)
}
