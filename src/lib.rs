#![doc = include_str!("../README.md")]
#![warn(rustdoc::all)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

pub mod error;
pub use error::{DriverError, Result};

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticEngine, Severity};

pub mod options;
pub use options::{DriverKind, Opt, ParsedOptions};

pub mod file_types;
pub use file_types::FileType;

pub mod path;
pub use path::{TypedVirtualPath, VirtualPath};

pub mod mode;
pub use mode::{
    BatchModeInfo, CompilerMode, DebugInfo, DebugInfoFormat, DebugInfoLevel, LinkOutputType,
};

pub mod module;
pub use module::{ModuleInfo, ModuleOutput};

pub mod outputs;
pub use outputs::SupplementaryOutputs;

pub mod output_file_map;
pub use output_file_map::OutputFileMap;

pub mod target;
pub use target::Triple;

pub mod toolchain;
pub use toolchain::{Tool, Toolchain};

pub mod job;
pub use job::{ArgTemplate, Job, JobKind};

pub mod batch;
pub use batch::BatchPartitions;

mod planner;

use crate::{mode::IncrementalMode, options::determine_driver_kind};
use std::{collections::HashMap, path::PathBuf};

/// The resolved driver configuration.
///
/// Constructed once from the raw invocation; immutable afterwards. All
/// recoverable problems encountered during construction are recorded in
/// [`Driver::diagnostics`], and [`Driver::plan_build`] still produces as much
/// of a plan as the sanitized configuration allows.
#[derive(Debug)]
pub struct Driver {
    /// The personality the driver was invoked as.
    pub kind: DriverKind,
    /// Sink for everything user visible; the driver never writes to stderr.
    pub diagnostics: DiagnosticEngine,
    /// The recognized options, queried throughout planning.
    pub parsed_options: ParsedOptions,
    /// `-working-directory`, against which relative path arguments resolve.
    pub working_directory: Option<PathBuf>,
    /// The classified inputs, in command-line order.
    pub inputs: Vec<TypedVirtualPath>,
    pub compiler_mode: CompilerMode,
    /// What each frontend invocation produces; `None` for parse-only modes.
    pub compiler_output_type: Option<FileType>,
    /// What the link step produces; `None` when nothing is linked.
    pub linker_output_type: Option<LinkOutputType>,
    pub debug_info: DebugInfo,
    /// Threads for multithreaded whole-module builds; 0 is single threaded.
    pub num_threads: usize,
    pub incremental: IncrementalMode,
    pub module_output: Option<ModuleOutput>,
    pub module_name: String,
    pub supplementary_outputs: SupplementaryOutputs,
    pub output_file_map: OutputFileMap,
    /// `-import-objc-header`, forwarded to every frontend job.
    pub bridging_header: Option<VirtualPath>,
    /// `-L` values, forwarded to the linker.
    pub library_search_paths: Vec<String>,
    pub parse_as_library: bool,
    pub parse_stdlib: bool,
    pub target: Triple,
    pub toolchain: Box<dyn Toolchain>,
    pub sdk_path: Option<PathBuf>,
}

impl Driver {
    /// Builds the configuration from a full argv (including the executable
    /// name), reading the environment of the current process.
    pub fn new(args: Vec<String>) -> Result<Driver> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Driver::new_with_env(args, &env)
    }

    /// Like [`Driver::new`], with an explicit environment.
    pub fn new_with_env(args: Vec<String>, env: &HashMap<String, String>) -> Result<Driver> {
        let (argv0, rest) = args
            .split_first()
            .ok_or_else(|| DriverError::InvalidDriverName(String::new()))?;

        // `swift -frontend ...` and friends are somebody else's job.
        if let Some(first) = rest.first() {
            if first == "-frontend" || first == "-modulewrap" {
                return Err(DriverError::SubcommandPassthrough(format!("swift {first}")));
            }
        }

        let expanded = options::expand_response_files(rest.to_vec());
        let kind = determine_driver_kind(argv0, &expanded)?;
        match kind {
            DriverKind::AutolinkExtract => {
                return Err(DriverError::SubcommandPassthrough(
                    "swift-autolink-extract".to_string(),
                ))
            }
            DriverKind::Indent => {
                return Err(DriverError::SubcommandPassthrough("swift-indent".to_string()))
            }
            DriverKind::Interactive | DriverKind::Batch => {}
        }
        info!(?kind, "configuring driver");

        let diagnostics = DiagnosticEngine::new();
        let parsed_options = ParsedOptions::parse(&expanded, &diagnostics);

        let working_directory =
            parsed_options.last_value(Opt::WorkingDirectory).map(PathBuf::from);
        let inputs = classify_inputs(&parsed_options, working_directory.as_deref(), &diagnostics);

        let compiler_mode = mode::compute_compiler_mode(&parsed_options, kind, &diagnostics);
        let output_info = mode::compute_output_info(&parsed_options, kind, &diagnostics);
        let debug_info = mode::compute_debug_info(&parsed_options, &diagnostics);
        let num_threads =
            mode::compute_num_threads(&parsed_options, &compiler_mode, &diagnostics);
        let incremental = mode::compute_incremental(&parsed_options, &diagnostics);

        // A bare `-o` can only name one compiled product.
        if parsed_options.has(Opt::Output)
            && output_info.linker_output_type.is_none()
            && output_info.compiler_output_type.is_some()
            && compiler_mode != CompilerMode::SingleCompile
            && inputs.iter().filter(|i| i.file_type.is_part_of_swift_compilation()).count() > 1
        {
            diagnostics.error("cannot specify -o when generating multiple output files");
        }

        let module_info = module::compute_module_info(
            &parsed_options,
            &compiler_mode,
            &output_info,
            debug_info.level,
            &inputs,
            working_directory.as_deref(),
            &diagnostics,
        );

        let supplementary_outputs = outputs::compute_supplementary_outputs(
            &parsed_options,
            output_info.compiler_output_type,
            &module_info.name,
            working_directory.as_deref(),
            &diagnostics,
        );

        let target = parsed_options
            .last_value(Opt::Target)
            .map(Triple::parse)
            .unwrap_or_else(Triple::host);
        let toolchain = toolchain::toolchain_for_target(&target)?;
        let sdk_path = toolchain::resolve_sdk_path(
            &parsed_options,
            working_directory.as_deref(),
            env.get("SDKROOT").map(String::as_str),
            &compiler_mode,
            &target,
            toolchain.as_ref(),
            &diagnostics,
        );

        let output_file_map = match parsed_options.last_value(Opt::OutputFileMap) {
            Some(path) => {
                let path = match working_directory.as_deref() {
                    Some(wd) if !std::path::Path::new(path).is_absolute() => wd.join(path),
                    _ => PathBuf::from(path),
                };
                OutputFileMap::load(&path, working_directory.as_deref())?
            }
            None => OutputFileMap::default(),
        };

        let bridging_header = parsed_options
            .last_value(Opt::ImportObjcHeader)
            .and_then(|value| VirtualPath::from_arg(value, working_directory.as_deref()).ok());
        let library_search_paths = parsed_options
            .values(Opt::LibrarySearchPath)
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(Driver {
            kind,
            diagnostics,
            parse_as_library: parsed_options.has(Opt::ParseAsLibrary),
            parse_stdlib: parsed_options.has(Opt::ParseStdlib),
            parsed_options,
            working_directory,
            inputs,
            compiler_mode,
            compiler_output_type: output_info.compiler_output_type,
            linker_output_type: output_info.linker_output_type,
            debug_info,
            num_threads,
            incremental,
            module_output: module_info.output,
            module_name: module_info.name,
            supplementary_outputs,
            output_file_map,
            bridging_header,
            library_search_paths,
            target,
            toolchain,
            sdk_path,
        })
    }

    /// The parallelism assumed when sizing batch partitions: the configured
    /// thread count, or the machine's core count.
    pub fn parallelism(&self) -> usize {
        if self.num_threads > 0 {
            self.num_threads
        } else {
            num_cpus::get()
        }
    }
}

/// Classifies the raw input tokens (`-` is Swift source on stdin; unknown
/// extensions deliberately fall back to relocatable objects).
fn classify_inputs(
    opts: &ParsedOptions,
    working_dir: Option<&std::path::Path>,
    diags: &DiagnosticEngine,
) -> Vec<TypedVirtualPath> {
    let mut inputs = Vec::with_capacity(opts.inputs().len());
    for token in opts.inputs() {
        let file = match VirtualPath::from_arg(token, working_dir) {
            Ok(file) => file,
            Err(err) => {
                diags.error(err.to_string());
                continue;
            }
        };
        let file_type = if file == VirtualPath::StandardInput {
            FileType::Swift
        } else {
            file.extension()
                .and_then(|ext| FileType::from_extension(&ext))
                .unwrap_or(FileType::Object)
        };
        inputs.push(TypedVirtualPath::new(file, file_type));
    }
    inputs
}
