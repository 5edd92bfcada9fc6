//! The option surface the driver core consults.
//!
//! Raw argv is turned into a [`ParsedOptions`] value once, up front; every
//! later derivation (mode, outputs, module, batching) queries it without
//! touching the command line again. Repeated options follow a last-wins
//! policy throughout.

use crate::{
    diagnostics::DiagnosticEngine,
    error::{DriverError, Result},
};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

/// The personality the driver was invoked as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverKind {
    /// `swift`: run code, or drop into the REPL with no inputs.
    Interactive,
    /// `swiftc`: batch compilation.
    Batch,
    /// `swift-autolink-extract`, handled as a pass-through subcommand.
    AutolinkExtract,
    /// `swift-indent`, handled as a pass-through subcommand.
    Indent,
}

impl DriverKind {
    pub fn from_driver_name(name: &str) -> Result<DriverKind> {
        match name {
            "swift" => Ok(DriverKind::Interactive),
            // The development binary behaves like the batch driver.
            "swiftc" | "swift-driver" => Ok(DriverKind::Batch),
            "swift-autolink-extract" => Ok(DriverKind::AutolinkExtract),
            "swift-indent" => Ok(DriverKind::Indent),
            other => Err(DriverError::InvalidDriverName(other.to_string())),
        }
    }

    pub const fn is_interactive(&self) -> bool {
        matches!(self, DriverKind::Interactive)
    }
}

/// Determines the driver personality from `argv[0]` and an optional
/// `--driver-mode=` override (the override wins, last occurrence counts).
pub fn determine_driver_kind(argv0: &str, args: &[String]) -> Result<DriverKind> {
    let mut name = Path::new(argv0)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| argv0.to_string());
    for arg in args {
        if let Some(mode) = arg.strip_prefix("--driver-mode=") {
            name = mode.to_string();
        }
    }
    DriverKind::from_driver_name(&name)
}

/// Every option the core reasons about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opt {
    // Output mode (mutually exclusive group).
    EmitExecutable,
    EmitLibrary,
    EmitObject,
    C,
    EmitAssembly,
    EmitSil,
    EmitSilgen,
    EmitSib,
    EmitSibgen,
    EmitIr,
    EmitBc,
    DumpAst,
    EmitPch,
    EmitImportedModules,
    IndexFile,
    UpdateCode,
    Parse,
    Typecheck,
    ResolveImports,
    DumpParse,
    EmitSyntax,
    PrintAst,
    DumpTypeRefinementContexts,
    DumpScopeMaps,
    DumpInterfaceHash,
    I,
    Repl,
    LldbRepl,
    DeprecatedIntegratedRepl,

    // Module emission.
    EmitModule,
    EmitModulePath,
    ModuleName,
    EmitModuleDoc,
    EmitModuleDocPath,
    EmitModuleInterface,
    EmitModuleInterfacePath,
    EmitObjcHeader,
    EmitObjcHeaderPath,

    // Supplementary outputs.
    EmitDependencies,
    EmitDependenciesPath,
    EmitReferenceDependencies,
    EmitReferenceDependenciesPath,
    SerializeDiagnostics,
    SerializeDiagnosticsPath,
    EmitLoadedModuleTrace,
    EmitLoadedModuleTracePath,
    EmitTbd,
    EmitTbdPath,
    SaveOptimizationRecord,
    SaveOptimizationRecordPath,

    // Debug info.
    G,
    Gnone,
    GlineTablesOnly,
    GdwarfTypes,
    DebugInfoFormat,

    // Linking.
    Output,
    Static,
    Sdk,
    Target,
    LibrarySearchPath,

    // Compilation shape.
    WholeModuleOptimization,
    NumThreads,
    EnableBatchMode,
    DisableBatchMode,
    DriverBatchCount,
    DriverBatchSizeLimit,
    DriverBatchSeed,
    Incremental,
    DriverShowIncremental,
    EmbedBitcode,
    ParseAsLibrary,
    ParseStdlib,

    // Misc.
    WorkingDirectory,
    DriverMode,
    ImportObjcHeader,
    OutputFileMap,
    DriverPrintJobs,
}

/// Output-mode options, the mutually exclusive group of §6. Order is
/// irrelevant; the *last* one on the command line decides.
pub const OUTPUT_MODE_GROUP: &[Opt] = &[
    Opt::EmitExecutable,
    Opt::EmitLibrary,
    Opt::EmitObject,
    Opt::C,
    Opt::EmitAssembly,
    Opt::EmitSil,
    Opt::EmitSilgen,
    Opt::EmitSib,
    Opt::EmitSibgen,
    Opt::EmitIr,
    Opt::EmitBc,
    Opt::DumpAst,
    Opt::EmitPch,
    Opt::EmitImportedModules,
    Opt::IndexFile,
    Opt::UpdateCode,
    Opt::Parse,
    Opt::Typecheck,
    Opt::ResolveImports,
    Opt::DumpParse,
    Opt::EmitSyntax,
    Opt::PrintAst,
    Opt::DumpTypeRefinementContexts,
    Opt::DumpScopeMaps,
    Opt::DumpInterfaceHash,
    Opt::I,
    Opt::Repl,
    Opt::LldbRepl,
    Opt::DeprecatedIntegratedRepl,
];

/// Debug-level options, again resolved last-wins.
pub const DEBUG_INFO_GROUP: &[Opt] =
    &[Opt::G, Opt::Gnone, Opt::GlineTablesOnly, Opt::GdwarfTypes];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OptKind {
    /// Bare flag, no value.
    Flag,
    /// Value is the following argument.
    Separate,
    /// Value is joined to the spelling (spelling ends in `=`).
    Joined,
}

struct OptionInfo {
    spelling: &'static str,
    opt: Opt,
    kind: OptKind,
}

macro_rules! opt {
    ($spelling:literal, $opt:ident, $kind:ident) => {
        OptionInfo { spelling: $spelling, opt: Opt::$opt, kind: OptKind::$kind }
    };
}

#[rustfmt::skip]
static OPTION_TABLE: &[OptionInfo] = &[
    opt!("-emit-executable", EmitExecutable, Flag),
    opt!("-emit-library", EmitLibrary, Flag),
    opt!("-emit-object", EmitObject, Flag),
    opt!("-c", C, Flag),
    opt!("-emit-assembly", EmitAssembly, Flag),
    opt!("-S", EmitAssembly, Flag),
    opt!("-emit-sil", EmitSil, Flag),
    opt!("-emit-silgen", EmitSilgen, Flag),
    opt!("-emit-sib", EmitSib, Flag),
    opt!("-emit-sibgen", EmitSibgen, Flag),
    opt!("-emit-ir", EmitIr, Flag),
    opt!("-emit-bc", EmitBc, Flag),
    opt!("-dump-ast", DumpAst, Flag),
    opt!("-emit-pch", EmitPch, Flag),
    opt!("-emit-imported-modules", EmitImportedModules, Flag),
    opt!("-index-file", IndexFile, Flag),
    opt!("-update-code", UpdateCode, Flag),
    opt!("-parse", Parse, Flag),
    opt!("-typecheck", Typecheck, Flag),
    opt!("-resolve-imports", ResolveImports, Flag),
    opt!("-dump-parse", DumpParse, Flag),
    opt!("-emit-syntax", EmitSyntax, Flag),
    opt!("-print-ast", PrintAst, Flag),
    opt!("-dump-type-refinement-contexts", DumpTypeRefinementContexts, Flag),
    opt!("-dump-scope-maps", DumpScopeMaps, Flag),
    opt!("-dump-interface-hash", DumpInterfaceHash, Flag),
    opt!("-i", I, Flag),
    opt!("-repl", Repl, Flag),
    opt!("-lldb-repl", LldbRepl, Flag),
    opt!("-deprecated-integrated-repl", DeprecatedIntegratedRepl, Flag),

    opt!("-emit-module", EmitModule, Flag),
    opt!("-emit-module-path", EmitModulePath, Separate),
    opt!("-module-name", ModuleName, Separate),
    opt!("-emit-module-doc", EmitModuleDoc, Flag),
    opt!("-emit-module-doc-path", EmitModuleDocPath, Separate),
    opt!("-emit-module-interface", EmitModuleInterface, Flag),
    opt!("-emit-module-interface-path", EmitModuleInterfacePath, Separate),
    opt!("-emit-objc-header", EmitObjcHeader, Flag),
    opt!("-emit-objc-header-path", EmitObjcHeaderPath, Separate),

    opt!("-emit-dependencies", EmitDependencies, Flag),
    opt!("-emit-dependencies-path", EmitDependenciesPath, Separate),
    opt!("-emit-reference-dependencies", EmitReferenceDependencies, Flag),
    opt!("-emit-reference-dependencies-path", EmitReferenceDependenciesPath, Separate),
    opt!("-serialize-diagnostics", SerializeDiagnostics, Flag),
    opt!("-serialize-diagnostics-path", SerializeDiagnosticsPath, Separate),
    opt!("-emit-loaded-module-trace", EmitLoadedModuleTrace, Flag),
    opt!("-emit-loaded-module-trace-path", EmitLoadedModuleTracePath, Separate),
    opt!("-emit-tbd", EmitTbd, Flag),
    opt!("-emit-tbd-path", EmitTbdPath, Separate),
    opt!("-save-optimization-record", SaveOptimizationRecord, Flag),
    opt!("-save-optimization-record-path", SaveOptimizationRecordPath, Separate),

    opt!("-g", G, Flag),
    opt!("-gnone", Gnone, Flag),
    opt!("-gline-tables-only", GlineTablesOnly, Flag),
    opt!("-gdwarf-types", GdwarfTypes, Flag),
    opt!("-debug-info-format=", DebugInfoFormat, Joined),

    opt!("-o", Output, Separate),
    opt!("-static", Static, Flag),
    opt!("-sdk", Sdk, Separate),
    opt!("-target", Target, Separate),
    opt!("-L", LibrarySearchPath, Separate),

    opt!("-whole-module-optimization", WholeModuleOptimization, Flag),
    opt!("-wmo", WholeModuleOptimization, Flag),
    opt!("-num-threads", NumThreads, Separate),
    opt!("-enable-batch-mode", EnableBatchMode, Flag),
    opt!("-disable-batch-mode", DisableBatchMode, Flag),
    opt!("-driver-batch-count", DriverBatchCount, Separate),
    opt!("-driver-batch-size-limit", DriverBatchSizeLimit, Separate),
    opt!("-driver-batch-seed", DriverBatchSeed, Separate),
    opt!("-incremental", Incremental, Flag),
    opt!("-driver-show-incremental", DriverShowIncremental, Flag),
    opt!("-embed-bitcode", EmbedBitcode, Flag),
    opt!("-parse-as-library", ParseAsLibrary, Flag),
    opt!("-parse-stdlib", ParseStdlib, Flag),

    opt!("-working-directory", WorkingDirectory, Separate),
    opt!("--driver-mode=", DriverMode, Joined),
    opt!("-import-objc-header", ImportObjcHeader, Separate),
    opt!("-output-file-map", OutputFileMap, Separate),
    opt!("-driver-print-jobs", DriverPrintJobs, Flag),
    opt!("-###", DriverPrintJobs, Flag),
];

fn lookup(token: &str) -> Option<(&'static OptionInfo, Option<String>)> {
    for info in OPTION_TABLE {
        match info.kind {
            OptKind::Flag | OptKind::Separate => {
                if token == info.spelling {
                    return Some((info, None));
                }
            }
            OptKind::Joined => {
                if let Some(value) = token.strip_prefix(info.spelling) {
                    return Some((info, Some(value.to_string())));
                }
            }
        }
    }
    None
}

/// One recognized occurrence of an option, with its position in argv so
/// last-wins queries can compare across options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedOption {
    pub opt: Opt,
    pub value: Option<String>,
    pub index: usize,
}

/// All recognized options plus the raw input tokens, in command-line order.
#[derive(Clone, Debug, Default)]
pub struct ParsedOptions {
    options: Vec<ParsedOption>,
    inputs: Vec<String>,
}

impl ParsedOptions {
    /// Parses the argument list (without argv[0]). Unknown options and
    /// missing values are diagnosed; parsing always completes so all issues
    /// surface in one pass.
    pub fn parse(args: &[String], diags: &DiagnosticEngine) -> ParsedOptions {
        let mut options = Vec::new();
        let mut inputs = Vec::new();

        let mut iter = args.iter().enumerate();
        while let Some((index, token)) = iter.next() {
            if token == "-" || !token.starts_with('-') {
                inputs.push(token.clone());
                continue;
            }
            let Some((info, joined_value)) = lookup(token) else {
                diags.error(format!("unknown argument: '{token}'"));
                continue;
            };
            let value = match info.kind {
                OptKind::Flag => None,
                OptKind::Joined => joined_value,
                OptKind::Separate => match iter.next() {
                    Some((_, v)) => Some(v.clone()),
                    None => {
                        diags.error(format!("missing argument value for '{token}'"));
                        continue;
                    }
                },
            };
            options.push(ParsedOption { opt: info.opt, value, index });
        }

        trace!(options = options.len(), inputs = inputs.len(), "parsed driver arguments");
        ParsedOptions { options, inputs }
    }

    pub fn has(&self, opt: Opt) -> bool {
        self.options.iter().any(|o| o.opt == opt)
    }

    pub fn has_any(&self, opts: &[Opt]) -> bool {
        opts.iter().any(|&o| self.has(o))
    }

    /// The value of the last occurrence of `opt`.
    pub fn last_value(&self, opt: Opt) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|o| o.opt == opt)
            .and_then(|o| o.value.as_deref())
    }

    /// Every value given for `opt`, in command-line order.
    pub fn values(&self, opt: Opt) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.opt == opt)
            .filter_map(|o| o.value.as_deref())
            .collect()
    }

    /// The last occurrence of any option in `group`, across the whole
    /// command line.
    pub fn last_of(&self, group: &[Opt]) -> Option<&ParsedOption> {
        self.options
            .iter()
            .filter(|o| group.contains(&o.opt))
            .max_by_key(|o| o.index)
    }

    /// Raw input tokens, in order.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn has_inputs(&self) -> bool {
        !self.inputs.is_empty()
    }
}

/// Replaces `@file` tokens naming readable absolute paths with the file's
/// lines (empties discarded). Unreadable or relative response files pass
/// through unchanged. Expansion is recursive; a visited set breaks cycles.
pub fn expand_response_files(args: Vec<String>) -> Vec<String> {
    let mut visited = HashSet::new();
    expand_response_files_inner(args, &mut visited)
}

fn expand_response_files_inner(args: Vec<String>, visited: &mut HashSet<PathBuf>) -> Vec<String> {
    let mut expanded = Vec::with_capacity(args.len());
    for arg in args {
        let Some(file) = arg.strip_prefix('@') else {
            expanded.push(arg);
            continue;
        };
        let path = Path::new(file);
        if !path.is_absolute() || !visited.insert(path.to_path_buf()) {
            expanded.push(arg);
            continue;
        }
        match fs::read_to_string(path) {
            Ok(contents) => {
                debug!(file, "expanding response file");
                let lines: Vec<String> =
                    contents.lines().filter(|l| !l.is_empty()).map(str::to_string).collect();
                expanded.extend(expand_response_files_inner(lines, visited));
            }
            Err(_) => expanded.push(arg),
        }
    }
    expanded
}
