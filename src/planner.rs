//! Build planning: from the resolved configuration to the ordered job list.
//!
//! The plan is produced eagerly on one thread. Jobs are appended in
//! dependency order and never touched again; the only mutation during
//! planning is accumulation into the planner's local collections.

use crate::{
    batch,
    error::{DriverError, Result},
    file_types::FileType,
    job::{ArgTemplate, Job, JobKind},
    mode::CompilerMode,
    path::{TypedVirtualPath, VirtualPath},
    toolchain::{LinkContext, Tool},
    Driver,
};
use std::collections::HashSet;

/// Above this many inputs the frontend invocation switches to `-filelist`.
const FILELIST_THRESHOLD: usize = 128;

impl Driver {
    /// Plans the build: per-partition compile jobs, optional module and
    /// autolink-extract steps, the link, and debug-symbol generation.
    ///
    /// Every job's inputs are either external files or outputs of jobs
    /// earlier in the returned list.
    pub fn plan_build(&self) -> Result<Vec<Job>> {
        match self.compiler_mode {
            CompilerMode::Repl => return Err(DriverError::Unimplemented("REPL")),
            CompilerMode::Immediate => return Err(DriverError::Unimplemented("immediate")),
            _ => {}
        }
        BuildPlanner::new(self).plan()
    }
}

struct BuildPlanner<'a> {
    driver: &'a Driver,
    jobs: Vec<Job>,
    /// Objects, autolink files and (for debugging) modules handed to the
    /// linker, in discovery order.
    linker_inputs: Vec<TypedVirtualPath>,
    /// Raw module files feeding the merge-module step.
    module_inputs: Vec<TypedVirtualPath>,
    used_temp_names: HashSet<String>,
    filelist_counter: usize,
}

impl<'a> BuildPlanner<'a> {
    fn new(driver: &'a Driver) -> Self {
        BuildPlanner {
            driver,
            jobs: Vec::new(),
            linker_inputs: Vec::new(),
            module_inputs: Vec::new(),
            used_temp_names: HashSet::new(),
            filelist_counter: 0,
        }
    }

    fn plan(mut self) -> Result<Vec<Job>> {
        let driver = self.driver;
        let swift_inputs: Vec<TypedVirtualPath> = driver
            .inputs
            .iter()
            .filter(|input| input.file_type.is_part_of_swift_compilation())
            .cloned()
            .collect();

        self.classify_other_inputs();

        let separate_module_job = driver.module_output.is_some()
            && driver.compiler_mode != CompilerMode::SingleCompile
            && !swift_inputs.is_empty();

        if separate_module_job {
            self.add_emit_module_job(&swift_inputs);
        }

        if !swift_inputs.is_empty() {
            match driver.compiler_mode {
                CompilerMode::SingleCompile => {
                    self.add_compile_job(&swift_inputs, &swift_inputs);
                }
                CompilerMode::BatchCompile(info) => {
                    match batch::partition(&swift_inputs, &info, driver.parallelism()) {
                        Some(batches) => {
                            // One job per partition, placed where its first
                            // file appears in the input order.
                            let mut planned = vec![false; batches.partitions.len()];
                            for input in &swift_inputs {
                                let index = batches.assignment[input];
                                if !planned[index] {
                                    planned[index] = true;
                                    self.add_compile_job(
                                        &batches.partitions[index],
                                        &swift_inputs,
                                    );
                                }
                            }
                        }
                        None => self.add_single_file_jobs(&swift_inputs),
                    }
                }
                CompilerMode::StandardCompile => self.add_single_file_jobs(&swift_inputs),
                CompilerMode::Immediate | CompilerMode::Repl => unreachable!(),
            }
        }

        self.add_merge_module_job();
        self.add_autolink_extract_job();
        let link_output = self.add_link_job();
        if let Some(output) = link_output {
            self.add_dsym_job(output);
        }

        debug!(jobs = self.jobs.len(), "planned build");
        Ok(self.jobs)
    }

    fn add_single_file_jobs(&mut self, swift_inputs: &[TypedVirtualPath]) {
        for input in swift_inputs {
            self.add_compile_job(std::slice::from_ref(input), swift_inputs);
        }
    }

    /// Routes inputs the frontend does not compile: linker food, raw modules
    /// for the merge step, or a diagnostic.
    fn classify_other_inputs(&mut self) {
        let driver = self.driver;
        let linking = driver.linker_output_type.is_some();
        for input in &driver.inputs {
            match input.file_type {
                ty if ty.is_part_of_swift_compilation() => {}
                FileType::Object | FileType::Autolink => {
                    if linking {
                        self.linker_inputs.push(input.clone());
                    } else {
                        driver
                            .diagnostics
                            .error(format!("unexpected input file: {}", input.file));
                    }
                }
                FileType::SwiftModule | FileType::SwiftDocumentation => {
                    if driver.module_output.is_some() && !linking {
                        self.module_inputs.push(input.clone());
                    } else if linking {
                        // Passed on so the debugger can find the AST.
                        self.linker_inputs.push(input.clone());
                    } else {
                        driver
                            .diagnostics
                            .error(format!("unexpected input file: {}", input.file));
                    }
                }
                _ => {
                    driver.diagnostics.error(format!("unexpected input file: {}", input.file));
                }
            }
        }
    }

    fn add_emit_module_job(&mut self, swift_inputs: &[TypedVirtualPath]) {
        let driver = self.driver;
        let Some(module_output) = &driver.module_output else { return };

        // When raw modules also feed a merge step, the frontend's product is
        // an intermediate the merge consumes.
        let module_path = if self.module_inputs.is_empty() {
            module_output.path().clone()
        } else {
            let name = self.unique_temp_name(format!("{}-partial.swiftmodule", driver.module_name));
            let partial = VirtualPath::temporary(name);
            self.module_inputs
                .insert(0, TypedVirtualPath::new(partial.clone(), FileType::SwiftModule));
            partial
        };

        let mut args = vec![ArgTemplate::flag("-frontend"), ArgTemplate::flag("-emit-module")];
        self.append_input_args(&mut args, swift_inputs, &[]);
        self.append_common_frontend_args(&mut args);

        let mut outputs =
            vec![TypedVirtualPath::new(module_path.clone(), FileType::SwiftModule)];
        args.push(ArgTemplate::flag("-o"));
        args.push(ArgTemplate::Path(module_path));

        let supplementary = &driver.supplementary_outputs;
        for (path, ty, flag) in [
            (&supplementary.module_doc, FileType::SwiftDocumentation, "-emit-module-doc-path"),
            (&supplementary.module_interface, FileType::SwiftInterface, "-emit-module-interface-path"),
            (&supplementary.objc_header, FileType::ObjcHeader, "-emit-objc-header-path"),
            (&supplementary.loaded_module_trace, FileType::ModuleTrace, "-emit-loaded-module-trace-path"),
            (&supplementary.tbd, FileType::Tbd, "-emit-tbd-path"),
            (&supplementary.optimization_record, FileType::OptimizationRecord, "-save-optimization-record-path"),
        ] {
            if let Some(path) = path {
                args.push(ArgTemplate::flag(flag));
                args.push(ArgTemplate::Path(path.clone()));
                outputs.push(TypedVirtualPath::new(path.clone(), ty));
            }
        }

        self.push_job(Job::new(
            JobKind::EmitModule,
            driver.toolchain.find_tool(Tool::SwiftCompiler),
            args,
            swift_inputs.to_vec(),
            outputs,
        ));
    }

    fn add_compile_job(
        &mut self,
        primaries: &[TypedVirtualPath],
        swift_inputs: &[TypedVirtualPath],
    ) {
        let driver = self.driver;
        let mut args = vec![ArgTemplate::flag("-frontend")];
        args.push(ArgTemplate::flag(frontend_action(driver.compiler_output_type)));
        self.append_input_args(&mut args, swift_inputs, primaries);
        self.append_common_frontend_args(&mut args);

        let mut outputs = Vec::new();
        if let Some(ty) = driver.compiler_output_type {
            if driver.compiler_mode == CompilerMode::SingleCompile {
                // One product for the whole module.
                let path = self.whole_module_output_path(ty);
                args.push(ArgTemplate::flag("-o"));
                args.push(ArgTemplate::Path(path.clone()));
                outputs.push(TypedVirtualPath::new(path, ty));
            } else {
                for primary in primaries {
                    let path = self.primary_output_path(primary, ty);
                    args.push(ArgTemplate::flag("-o"));
                    args.push(ArgTemplate::Path(path.clone()));
                    outputs.push(TypedVirtualPath::new(path, ty));
                }
            }
        }
        self.append_supplementary_outputs(&mut args, &mut outputs, primaries);

        // Whole-module outputs that ride on the compile when no separate
        // module job exists.
        if driver.compiler_mode == CompilerMode::SingleCompile {
            let supplementary = &driver.supplementary_outputs;
            for (path, ty, flag) in [
                (&supplementary.module_doc, FileType::SwiftDocumentation, "-emit-module-doc-path"),
                (&supplementary.module_interface, FileType::SwiftInterface, "-emit-module-interface-path"),
                (&supplementary.objc_header, FileType::ObjcHeader, "-emit-objc-header-path"),
                (&supplementary.loaded_module_trace, FileType::ModuleTrace, "-emit-loaded-module-trace-path"),
                (&supplementary.tbd, FileType::Tbd, "-emit-tbd-path"),
                (&supplementary.optimization_record, FileType::OptimizationRecord, "-save-optimization-record-path"),
            ] {
                if let Some(path) = path {
                    args.push(ArgTemplate::flag(flag));
                    args.push(ArgTemplate::Path(path.clone()));
                    outputs.push(TypedVirtualPath::new(path.clone(), ty));
                }
            }
            if let Some(module_output) = &driver.module_output {
                let path = module_output.path().clone();
                args.push(ArgTemplate::flag("-emit-module-path"));
                args.push(ArgTemplate::Path(path.clone()));
                outputs.push(TypedVirtualPath::new(path, FileType::SwiftModule));
            }
        }

        let job = Job::new(
            JobKind::Compile,
            driver.toolchain.find_tool(Tool::SwiftCompiler),
            args,
            swift_inputs.to_vec(),
            outputs,
        );
        self.push_job(job);
    }

    /// Object and autolink outputs accumulate for the linker; module outputs
    /// accumulate for the merge step.
    fn push_job(&mut self, job: Job) {
        for output in &job.outputs {
            match output.file_type {
                FileType::Object | FileType::Autolink
                    if self.driver.linker_output_type.is_some()
                        && job.kind == JobKind::Compile =>
                {
                    self.linker_inputs.push(output.clone());
                }
                _ => {}
            }
        }
        self.jobs.push(job);
    }

    /// `-primary-file` markers select the files this job emits output for;
    /// everything else is loaded for context only. Large input sets spill to
    /// file lists.
    fn append_input_args(
        &mut self,
        args: &mut Vec<ArgTemplate>,
        swift_inputs: &[TypedVirtualPath],
        primaries: &[TypedVirtualPath],
    ) {
        if swift_inputs.len() > FILELIST_THRESHOLD {
            let name = self.unique_temp_name("sources".to_string());
            args.push(ArgTemplate::flag("-filelist"));
            args.push(ArgTemplate::FileList {
                name,
                paths: swift_inputs.iter().map(|i| i.file.clone()).collect(),
            });
            if !primaries.is_empty() && primaries.len() < swift_inputs.len() {
                let name = self.unique_temp_name("primary-sources".to_string());
                args.push(ArgTemplate::flag("-primary-filelist"));
                args.push(ArgTemplate::FileList {
                    name,
                    paths: primaries.iter().map(|i| i.file.clone()).collect(),
                });
            }
            return;
        }

        let primary_set: HashSet<&TypedVirtualPath> = primaries.iter().collect();
        let all_primary = primaries.len() == swift_inputs.len();
        for input in swift_inputs {
            if !all_primary && primary_set.contains(input) {
                args.push(ArgTemplate::flag("-primary-file"));
            }
            args.push(ArgTemplate::Path(input.file.clone()));
        }
    }

    fn append_common_frontend_args(&self, args: &mut Vec<ArgTemplate>) {
        let driver = self.driver;
        args.push(ArgTemplate::flag("-module-name"));
        args.push(ArgTemplate::flag(driver.module_name.clone()));
        args.push(ArgTemplate::flag("-target"));
        args.push(ArgTemplate::flag(driver.target.as_str().to_string()));
        if let Some(sdk) = &driver.sdk_path {
            args.push(ArgTemplate::flag("-sdk"));
            args.push(ArgTemplate::flag(sdk.display().to_string()));
        }
        if let Some(header) = &driver.bridging_header {
            args.push(ArgTemplate::flag("-import-objc-header"));
            args.push(ArgTemplate::Path(header.clone()));
        }
        if let Some(level) = driver.debug_info.level {
            args.push(ArgTemplate::flag(match level {
                crate::mode::DebugInfoLevel::AstTypes => "-g",
                crate::mode::DebugInfoLevel::LineTables => "-gline-tables-only",
                crate::mode::DebugInfoLevel::DwarfTypes => "-gdwarf-types",
            }));
            if driver.debug_info.format == crate::mode::DebugInfoFormat::CodeView {
                args.push(ArgTemplate::flag("-debug-info-format=codeview"));
            }
        }
        if driver.num_threads > 0 {
            args.push(ArgTemplate::flag("-num-threads"));
            args.push(ArgTemplate::flag(driver.num_threads.to_string()));
        }
        if driver.parse_as_library {
            args.push(ArgTemplate::flag("-parse-as-library"));
        }
        if driver.parse_stdlib {
            args.push(ArgTemplate::flag("-parse-stdlib"));
        }
    }

    /// Where a primary's main output goes: the output file map wins, then
    /// `-o` when this is the build's sole compiled product, then a name
    /// derived from the primary (scratch space when a link step consumes it).
    fn primary_output_path(&mut self, primary: &TypedVirtualPath, ty: FileType) -> VirtualPath {
        let driver = self.driver;
        if let Some(path) = driver.output_file_map.lookup(&primary.file, ty) {
            return path.clone();
        }

        let linking = driver.linker_output_type.is_some();
        if !linking {
            if let Some(output) = driver.parsed_options.last_value(crate::options::Opt::Output) {
                if self.sole_compiled_output() {
                    return VirtualPath::from_arg(output, driver.working_directory.as_deref())
                        .unwrap_or_else(|_| VirtualPath::Relative(output.into()));
                }
            }
        }

        let stem = match driver.compiler_mode {
            CompilerMode::SingleCompile => driver.module_name.clone(),
            _ => primary.file.basename_without_ext(),
        };
        let filename = format!("{stem}.{}", ty.extension());
        if linking {
            VirtualPath::temporary(self.unique_temp_name(filename))
        } else {
            VirtualPath::Relative(filename.into())
        }
    }

    /// The single output of a whole-module job.
    fn whole_module_output_path(&mut self, ty: FileType) -> VirtualPath {
        let driver = self.driver;
        if let Some(path) = driver.output_file_map.module_level(ty) {
            return path.clone();
        }
        if driver.linker_output_type.is_some() {
            let filename = format!("{}.{}", driver.module_name, ty.extension());
            return VirtualPath::temporary(self.unique_temp_name(filename));
        }
        if let Some(output) = driver.parsed_options.last_value(crate::options::Opt::Output) {
            return VirtualPath::from_arg(output, driver.working_directory.as_deref())
                .unwrap_or_else(|_| VirtualPath::Relative(output.into()));
        }
        VirtualPath::Relative(format!("{}.{}", driver.module_name, ty.extension()).into())
    }

    /// Whether exactly one compiled output exists overall, making a bare
    /// `-o` unambiguous.
    fn sole_compiled_output(&self) -> bool {
        let driver = self.driver;
        match driver.compiler_mode {
            CompilerMode::SingleCompile => true,
            _ => {
                driver
                    .inputs
                    .iter()
                    .filter(|i| i.file_type.is_part_of_swift_compilation())
                    .count()
                    == 1
            }
        }
    }

    fn append_supplementary_outputs(
        &mut self,
        args: &mut Vec<ArgTemplate>,
        outputs: &mut Vec<TypedVirtualPath>,
        primaries: &[TypedVirtualPath],
    ) {
        let driver = self.driver;
        let supplementary = &driver.supplementary_outputs;
        // Whole-module jobs (and a build whose only compiled product comes
        // from one primary) emit a single file per kind; otherwise each
        // primary gets its own, named after it.
        let whole_module = driver.compiler_mode == CompilerMode::SingleCompile;
        let single_primary = primaries.len() == 1 && self.sole_compiled_output();
        for (configured, ty, flag) in [
            (&supplementary.dependencies, FileType::Dependencies, "-emit-dependencies-path"),
            (
                &supplementary.reference_dependencies,
                FileType::SwiftDeps,
                "-emit-reference-dependencies-path",
            ),
            (
                &supplementary.serialized_diagnostics,
                FileType::Diagnostics,
                "-serialize-diagnostics-path",
            ),
        ] {
            let Some(configured) = configured else { continue };
            if whole_module || single_primary {
                let path = primaries
                    .first()
                    .and_then(|p| driver.output_file_map.lookup(&p.file, ty))
                    .cloned()
                    .unwrap_or_else(|| configured.clone());
                args.push(ArgTemplate::flag(flag));
                args.push(ArgTemplate::Path(path.clone()));
                outputs.push(TypedVirtualPath::new(path, ty));
            } else {
                for primary in primaries {
                    let path = match driver.output_file_map.lookup(&primary.file, ty) {
                        Some(path) => path.clone(),
                        None => primary.file.replacing_extension(ty),
                    };
                    outputs.push(TypedVirtualPath::new(path, ty));
                }
            }
        }
    }

    fn add_merge_module_job(&mut self) {
        let driver = self.driver;
        let Some(module_output) = &driver.module_output else { return };
        if self.module_inputs.is_empty() {
            return;
        }

        let mut args = vec![
            ArgTemplate::flag("-frontend"),
            ArgTemplate::flag("-merge-modules"),
            ArgTemplate::flag("-emit-module"),
        ];
        for input in &self.module_inputs {
            if input.file_type == FileType::SwiftModule {
                args.push(ArgTemplate::Path(input.file.clone()));
            }
        }
        self.append_common_frontend_args(&mut args);
        args.push(ArgTemplate::flag("-o"));
        args.push(ArgTemplate::Path(module_output.path().clone()));

        self.push_job(Job::new(
            JobKind::MergeModule,
            driver.toolchain.find_tool(Tool::SwiftCompiler),
            args,
            self.module_inputs.clone(),
            vec![TypedVirtualPath::new(module_output.path().clone(), FileType::SwiftModule)],
        ));
    }

    fn add_autolink_extract_job(&mut self) {
        let driver = self.driver;
        if !driver.toolchain.requires_autolink_extract() {
            return;
        }
        let objects: Vec<TypedVirtualPath> = self
            .linker_inputs
            .iter()
            .filter(|input| input.file_type == FileType::Object)
            .cloned()
            .collect();
        if objects.is_empty() {
            return;
        }

        let name = self.unique_temp_name(format!("{}.autolink", driver.module_name));
        let output = VirtualPath::temporary(name);
        let mut args: Vec<ArgTemplate> =
            objects.iter().map(|o| ArgTemplate::Path(o.file.clone())).collect();
        args.push(ArgTemplate::flag("-o"));
        args.push(ArgTemplate::Path(output.clone()));

        self.jobs.push(Job::new(
            JobKind::AutolinkExtract,
            driver.toolchain.find_tool(Tool::AutolinkExtract),
            args,
            objects,
            vec![TypedVirtualPath::new(output.clone(), FileType::Autolink)],
        ));
        self.linker_inputs.push(TypedVirtualPath::new(output, FileType::Autolink));
    }

    fn add_link_job(&mut self) -> Option<TypedVirtualPath> {
        let driver = self.driver;
        let output_type = driver.linker_output_type?;
        if self.linker_inputs.is_empty() {
            return None;
        }

        // The module rides into the link when the debugger will need it.
        if let Some(module_output) = &driver.module_output {
            if driver.debug_info.level.is_some_and(|l| l.requires_module()) {
                self.linker_inputs.push(TypedVirtualPath::new(
                    module_output.path().clone(),
                    FileType::SwiftModule,
                ));
            }
        }

        let output = match driver.parsed_options.last_value(crate::options::Opt::Output) {
            Some(value) => {
                VirtualPath::from_arg(value, driver.working_directory.as_deref())
                    .unwrap_or_else(|_| VirtualPath::Relative(value.into()))
            }
            None => {
                let name =
                    driver.toolchain.default_linker_output_name(output_type, &driver.module_name);
                VirtualPath::Relative(name.into())
            }
        };

        let ctx = LinkContext {
            output_type,
            output: &output,
            inputs: &self.linker_inputs,
            target: &driver.target,
            sdk_path: driver.sdk_path.as_deref(),
            library_search_paths: &driver.library_search_paths,
        };
        let (tool, args) = driver.toolchain.link_job(&ctx);

        let typed_output = TypedVirtualPath::new(output, FileType::Image);
        self.jobs.push(Job::new(
            JobKind::Link,
            tool,
            args,
            self.linker_inputs.clone(),
            vec![typed_output.clone()],
        ));
        Some(typed_output)
    }

    fn add_dsym_job(&mut self, link_output: TypedVirtualPath) {
        let driver = self.driver;
        if !driver.target.is_darwin() || driver.debug_info.level.is_none() {
            return;
        }
        let output = link_output.file.appending_extension("dSYM");
        let args = vec![
            ArgTemplate::Path(link_output.file.clone()),
            ArgTemplate::flag("-o"),
            ArgTemplate::Path(output.clone()),
        ];
        self.jobs.push(Job::new(
            JobKind::GenerateDsym,
            driver.toolchain.find_tool(Tool::DsymUtil),
            args,
            vec![link_output],
            vec![TypedVirtualPath::new(output, FileType::DSym)],
        ));
    }

    /// Scratch names are unique within one invocation; clashing stems get a
    /// counter suffix.
    fn unique_temp_name(&mut self, name: String) -> String {
        if self.used_temp_names.insert(name.clone()) {
            return name;
        }
        loop {
            self.filelist_counter += 1;
            let candidate = match name.rsplit_once('.') {
                Some((stem, ext)) => format!("{stem}-{}.{ext}", self.filelist_counter),
                None => format!("{name}-{}", self.filelist_counter),
            };
            if self.used_temp_names.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// The frontend action flag for a requested output type.
fn frontend_action(output: Option<FileType>) -> &'static str {
    match output {
        Some(FileType::Object) => "-c",
        Some(FileType::Assembly) => "-S",
        Some(FileType::Sil) => "-emit-sil",
        Some(FileType::RawSil) => "-emit-silgen",
        Some(FileType::Sib) => "-emit-sib",
        Some(FileType::RawSib) => "-emit-sibgen",
        Some(FileType::LlvmIr) => "-emit-ir",
        Some(FileType::LlvmBitcode) => "-emit-bc",
        Some(FileType::Ast) => "-dump-ast",
        Some(FileType::Pch) => "-emit-pch",
        Some(FileType::ImportedModules) => "-emit-imported-modules",
        Some(FileType::IndexData) => "-index-file",
        Some(FileType::Remap) => "-update-code",
        _ => "-typecheck",
    }
}
