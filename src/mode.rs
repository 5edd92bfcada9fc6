//! Derivation of the compilation mode and primary output settings.
//!
//! Every rule here is a pure function of the parsed options; no I/O happens.
//! Conflicts are diagnosed and resolved to a documented default so planning
//! can still proceed.

use crate::{
    diagnostics::DiagnosticEngine,
    file_types::FileType,
    options::{DriverKind, Opt, ParsedOptions, DEBUG_INFO_GROUP, OUTPUT_MODE_GROUP},
};

/// User knobs for batch partitioning; all optional, defaults applied by the
/// partitioner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchModeInfo {
    pub count: Option<usize>,
    pub size_limit: Option<usize>,
    /// Reserved for future shuffling of partition assignment.
    pub seed: Option<usize>,
}

impl BatchModeInfo {
    fn from_options(opts: &ParsedOptions, diags: &DiagnosticEngine) -> Self {
        BatchModeInfo {
            count: parse_count(opts, Opt::DriverBatchCount, "-driver-batch-count", diags),
            size_limit: parse_count(opts, Opt::DriverBatchSizeLimit, "-driver-batch-size-limit", diags),
            seed: parse_count(opts, Opt::DriverBatchSeed, "-driver-batch-seed", diags),
        }
    }
}

fn parse_count(
    opts: &ParsedOptions,
    opt: Opt,
    spelling: &str,
    diags: &DiagnosticEngine,
) -> Option<usize> {
    let value = opts.last_value(opt)?;
    match value.parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            diags.error(format!("invalid value '{value}' in '{spelling}'"));
            None
        }
    }
}

/// How the frontend is invoked over the primary inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompilerMode {
    /// One frontend job per primary input.
    StandardCompile,
    /// Multiple primary inputs per frontend job.
    BatchCompile(BatchModeInfo),
    /// A single frontend job covering the whole module.
    SingleCompile,
    /// `swift foo.swift`: compile and run.
    Immediate,
    Repl,
}

impl CompilerMode {
    /// Whether all primaries are compiled by one frontend job.
    pub const fn is_single_compilation(&self) -> bool {
        matches!(self, CompilerMode::SingleCompile | CompilerMode::Immediate | CompilerMode::Repl)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            CompilerMode::StandardCompile => "standard compilation",
            CompilerMode::BatchCompile(_) => "batch compilation",
            CompilerMode::SingleCompile => "whole module optimization",
            CompilerMode::Immediate => "immediate compilation",
            CompilerMode::Repl => "REPL",
        }
    }
}

/// What the link step, if any, produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkOutputType {
    Executable,
    DynamicLibrary,
    StaticLibrary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugInfoLevel {
    /// Line tables plus full AST type information.
    AstTypes,
    LineTables,
    /// Line tables plus DWARF type information lowered from the AST.
    DwarfTypes,
}

impl DebugInfoLevel {
    /// Whether the debugger needs the module file to interpret this level of
    /// debug info; line tables alone do not reference the AST.
    pub const fn requires_module(&self) -> bool {
        !matches!(self, DebugInfoLevel::LineTables)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugInfoFormat {
    #[default]
    Dwarf,
    CodeView,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugInfo {
    pub level: Option<DebugInfoLevel>,
    pub format: DebugInfoFormat,
}

/// Primary outputs of the compiler and (optionally) the linker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputInfo {
    pub compiler_output_type: Option<FileType>,
    pub linker_output_type: Option<LinkOutputType>,
}

pub(crate) fn compute_compiler_mode(
    opts: &ParsedOptions,
    kind: DriverKind,
    diags: &DiagnosticEngine,
) -> CompilerMode {
    if let Some(mode_opt) = opts.last_of(OUTPUT_MODE_GROUP) {
        match mode_opt.opt {
            Opt::EmitPch | Opt::EmitImportedModules | Opt::IndexFile => {
                return CompilerMode::SingleCompile
            }
            Opt::Repl | Opt::LldbRepl | Opt::DeprecatedIntegratedRepl => {
                return CompilerMode::Repl
            }
            _ => {}
        }
    }

    if kind.is_interactive() {
        return if opts.has_inputs() { CompilerMode::Immediate } else { CompilerMode::Repl };
    }

    if opts.has(Opt::WholeModuleOptimization) {
        return CompilerMode::SingleCompile;
    }

    // Batch mode has to be requested; -disable-batch-mode later on the
    // command line forces standard compilation again.
    if let Some(batch) = opts.last_of(&[Opt::EnableBatchMode, Opt::DisableBatchMode]) {
        if batch.opt == Opt::EnableBatchMode {
            return CompilerMode::BatchCompile(BatchModeInfo::from_options(opts, diags));
        }
    }

    CompilerMode::StandardCompile
}

pub(crate) fn compute_output_info(
    opts: &ParsedOptions,
    kind: DriverKind,
    diags: &DiagnosticEngine,
) -> OutputInfo {
    let Some(mode_opt) = opts.last_of(OUTPUT_MODE_GROUP) else {
        // No explicit mode: `swiftc` builds an executable, `swift` runs.
        if kind.is_interactive() {
            return OutputInfo::default();
        }
        return OutputInfo {
            compiler_output_type: Some(FileType::Object),
            linker_output_type: Some(LinkOutputType::Executable),
        };
    };

    match mode_opt.opt {
        Opt::EmitExecutable => {
            if opts.has(Opt::Static) {
                diags.error("-static may not be used with -emit-executable");
            }
            OutputInfo {
                compiler_output_type: Some(FileType::Object),
                linker_output_type: Some(LinkOutputType::Executable),
            }
        }
        Opt::EmitLibrary => OutputInfo {
            compiler_output_type: Some(FileType::Object),
            linker_output_type: Some(if opts.has(Opt::Static) {
                LinkOutputType::StaticLibrary
            } else {
                LinkOutputType::DynamicLibrary
            }),
        },
        Opt::EmitObject | Opt::C => out(FileType::Object),
        Opt::EmitAssembly => out(FileType::Assembly),
        Opt::EmitSil => out(FileType::Sil),
        Opt::EmitSilgen => out(FileType::RawSil),
        Opt::EmitSib => out(FileType::Sib),
        Opt::EmitSibgen => out(FileType::RawSib),
        Opt::EmitIr => out(FileType::LlvmIr),
        Opt::EmitBc => out(FileType::LlvmBitcode),
        Opt::DumpAst => out(FileType::Ast),
        Opt::EmitPch => out(FileType::Pch),
        Opt::EmitImportedModules => out(FileType::ImportedModules),
        Opt::IndexFile => out(FileType::IndexData),
        // Produces fix-it remap files and never links.
        Opt::UpdateCode => out(FileType::Remap),
        Opt::I => {
            diags.error(
                "the flag '-i' is no longer required and has been removed; \
                 use 'swift input-filename'",
            );
            OutputInfo::default()
        }
        // Parse-only and REPL modes have no compiler output.
        _ => OutputInfo::default(),
    }
}

const fn out(ty: FileType) -> OutputInfo {
    OutputInfo { compiler_output_type: Some(ty), linker_output_type: None }
}

pub(crate) fn compute_debug_info(opts: &ParsedOptions, diags: &DiagnosticEngine) -> DebugInfo {
    let level_opt = opts.last_of(DEBUG_INFO_GROUP);
    let level = match level_opt.map(|o| o.opt) {
        Some(Opt::G) => Some(DebugInfoLevel::AstTypes),
        Some(Opt::GlineTablesOnly) => Some(DebugInfoLevel::LineTables),
        Some(Opt::GdwarfTypes) => Some(DebugInfoLevel::DwarfTypes),
        Some(Opt::Gnone) | None => None,
        Some(other) => unreachable!("{other:?} is not a debug-info option"),
    };

    let format = match opts.last_value(Opt::DebugInfoFormat) {
        None => DebugInfoFormat::Dwarf,
        Some("dwarf") => DebugInfoFormat::Dwarf,
        Some("codeview") => DebugInfoFormat::CodeView,
        Some(value) => {
            diags.error(format!("invalid value '{value}' in '-debug-info-format='"));
            DebugInfoFormat::Dwarf
        }
    };

    if opts.has(Opt::DebugInfoFormat) && level_opt.is_none() {
        diags.error("option '-debug-info-format=' is missing a required argument (-g)");
    }
    if format == DebugInfoFormat::CodeView {
        if let Some(spelling) = match level {
            Some(DebugInfoLevel::LineTables) => Some("-gline-tables-only"),
            Some(DebugInfoLevel::DwarfTypes) => Some("-gdwarf-types"),
            _ => None,
        } {
            diags.error(format!("'-debug-info-format=codeview' is not supported with '{spelling}'"));
        }
    }

    DebugInfo { level, format }
}

/// Number of threads for multithreaded whole-module compilation. Zero means
/// single threaded; batch mode never multithreads.
pub(crate) fn compute_num_threads(
    opts: &ParsedOptions,
    mode: &CompilerMode,
    diags: &DiagnosticEngine,
) -> usize {
    let mut threads = match opts.last_value(Opt::NumThreads) {
        None => 0,
        Some(value) => match value.parse::<usize>() {
            Ok(n) => n,
            Err(_) => {
                diags.error(format!("invalid value '{value}' in '-num-threads'"));
                0
            }
        },
    };
    if threads > 0 && matches!(mode, CompilerMode::BatchCompile(_)) {
        diags.warning("ignoring -num-threads argument; cannot multithread batch mode");
        threads = 0;
    }
    threads
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IncrementalMode {
    pub enabled: bool,
    pub show_decisions: bool,
}

pub(crate) fn compute_incremental(
    opts: &ParsedOptions,
    diags: &DiagnosticEngine,
) -> IncrementalMode {
    let show_decisions = opts.has(Opt::DriverShowIncremental);
    let requested = opts.has(Opt::Incremental);

    let disable_reason = if !requested {
        None
    } else if opts.has(Opt::WholeModuleOptimization) {
        Some("is not compatible with whole module optimization")
    } else if opts.has(Opt::EmbedBitcode) {
        Some("is not currently compatible with embedding LLVM IR bitcode")
    } else {
        None
    };

    if let Some(reason) = disable_reason {
        if show_decisions {
            diags.note(format!("incremental compilation has been disabled, because it {reason}"));
        }
    }

    IncrementalMode { enabled: requested && disable_reason.is_none(), show_decisions }
}
