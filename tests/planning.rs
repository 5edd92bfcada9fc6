//! End-to-end planning scenarios: invocation in, job sequence out.

use pretty_assertions::assert_eq;
use std::collections::HashMap;
use swift_driver::{
    Driver, FileType, Job, JobKind, LinkOutputType, ModuleOutput, VirtualPath,
};

const MACOS: &str = "x86_64-apple-macosx10.15";
const LINUX: &str = "x86_64-unknown-linux-gnu";

fn plan(args: &[&str]) -> (Driver, Vec<Job>) {
    let mut argv = vec!["swiftc".to_string()];
    argv.extend(args.iter().map(|s| s.to_string()));
    let driver = Driver::new_with_env(argv, &HashMap::new()).expect("driver configuration");
    let jobs = driver.plan_build().expect("planning");
    (driver, jobs)
}

fn kinds(jobs: &[Job]) -> Vec<JobKind> {
    jobs.iter().map(|j| j.kind).collect()
}

/// Every job's inputs are external files or outputs of earlier jobs.
fn assert_topologically_ordered(jobs: &[Job]) {
    for (index, job) in jobs.iter().enumerate() {
        for input in &job.inputs {
            let produced_at = jobs
                .iter()
                .position(|other| other.outputs.iter().any(|out| out == input));
            if let Some(producer) = produced_at {
                assert!(
                    producer < index,
                    "job #{index} ({}) consumes an output of job #{producer} that runs later",
                    job.kind
                );
            }
        }
    }
}

#[test]
fn compile_and_link_a_single_file() {
    let (driver, jobs) = plan(&["a.swift", "-o", "a.out", "-target", MACOS]);
    assert!(!driver.diagnostics.has_errors());
    assert_eq!(kinds(&jobs), vec![JobKind::Compile, JobKind::Link]);

    let compile = &jobs[0];
    assert_eq!(compile.outputs.len(), 1);
    assert_eq!(compile.outputs[0].file_type, FileType::Object);
    assert_eq!(compile.outputs[0].file, VirtualPath::temporary("a.o"));

    let link = &jobs[1];
    assert_eq!(link.inputs, compile.outputs);
    assert_eq!(link.outputs[0].file, VirtualPath::Relative("a.out".into()));
    assert_topologically_ordered(&jobs);
}

#[test]
fn library_with_separate_module_emission() {
    let (driver, jobs) = plan(&[
        "a.swift", "b.swift", "c.swift", "-emit-module", "-o", "lib.dylib", "-emit-library",
        "-target", MACOS,
    ]);
    assert!(!driver.diagnostics.has_errors());
    assert_eq!(
        kinds(&jobs),
        vec![
            JobKind::EmitModule,
            JobKind::Compile,
            JobKind::Compile,
            JobKind::Compile,
            JobKind::Link
        ]
    );

    assert_eq!(driver.module_name, "lib");
    assert_eq!(
        driver.module_output,
        Some(ModuleOutput::TopLevel(VirtualPath::Relative("lib.swiftmodule".into())))
    );
    assert_eq!(driver.linker_output_type, Some(LinkOutputType::DynamicLibrary));

    let emit_module = &jobs[0];
    assert_eq!(emit_module.inputs.len(), 3);
    assert!(emit_module
        .outputs
        .iter()
        .any(|o| o.file == VirtualPath::Relative("lib.swiftmodule".into())));

    let link = jobs.last().unwrap();
    let objects: Vec<_> =
        link.inputs.iter().filter(|i| i.file_type == FileType::Object).collect();
    assert_eq!(objects.len(), 3);
    assert_eq!(link.outputs[0].file, VirtualPath::Relative("lib.dylib".into()));
    assert_topologically_ordered(&jobs);
}

#[test]
fn batch_mode_partitions_into_four_jobs() {
    let files: Vec<String> = (1..=100).map(|i| format!("f{i}.swift")).collect();
    let mut args: Vec<&str> = files.iter().map(String::as_str).collect();
    args.extend(["-enable-batch-mode", "-driver-batch-count", "4", "-target", MACOS]);

    let (driver, jobs) = plan(&args);
    assert!(!driver.diagnostics.has_errors());
    assert_eq!(
        kinds(&jobs),
        vec![
            JobKind::Compile,
            JobKind::Compile,
            JobKind::Compile,
            JobKind::Compile,
            JobKind::Link
        ]
    );
    for compile in &jobs[..4] {
        let objects =
            compile.outputs.iter().filter(|o| o.file_type == FileType::Object).count();
        assert_eq!(objects, 25);
    }
    let link = jobs.last().unwrap();
    assert_eq!(
        link.inputs.iter().filter(|i| i.file_type == FileType::Object).count(),
        100
    );
    assert_topologically_ordered(&jobs);
}

#[test]
fn batch_count_of_one_falls_back_to_per_file_jobs() {
    let (_, jobs) = plan(&[
        "a.swift", "b.swift", "c.swift", "-enable-batch-mode", "-driver-batch-count", "1", "-c",
        "-target", MACOS,
    ]);
    assert_eq!(kinds(&jobs), vec![JobKind::Compile; 3]);
}

#[test]
fn emit_ir_compiles_without_linking() {
    let (driver, jobs) = plan(&["a.swift", "-emit-ir", "-target", MACOS]);
    assert_eq!(driver.compiler_output_type, Some(FileType::LlvmIr));
    assert_eq!(kinds(&jobs), vec![JobKind::Compile]);
    assert_eq!(jobs[0].outputs[0].file, VirtualPath::Relative("a.ll".into()));
}

#[test]
fn raw_objects_and_modules_feed_the_linker() {
    let (driver, jobs) = plan(&["a.o", "b.swiftmodule", "-o", "out", "-target", MACOS]);
    assert!(!driver.diagnostics.has_errors());
    assert_eq!(kinds(&jobs), vec![JobKind::Link]);

    let link = &jobs[0];
    assert_eq!(
        link.inputs.iter().map(|i| i.file_type).collect::<Vec<_>>(),
        vec![FileType::Object, FileType::SwiftModule]
    );
    // The module is handed to ld64 as an AST path for the debugger.
    let rendered: Vec<String> = link.args.iter().map(|a| a.to_string()).collect();
    assert!(rendered.windows(2).any(|w| w[0] == "-add_ast_path" && w[1] == "-Xlinker"
        || w[0] == "-add_ast_path" && w[1] == "b.swiftmodule"));
    assert_eq!(link.outputs[0].file, VirtualPath::Relative("out".into()));
}

#[test]
fn conflicting_debug_format_is_diagnosed() {
    let argv: Vec<String> = [
        "swiftc", "a.swift", "-g", "-debug-info-format=codeview", "-gline-tables-only",
        "-target", MACOS,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let driver = Driver::new_with_env(argv, &HashMap::new()).unwrap();
    assert!(driver.diagnostics.has_errors());
}

#[test]
fn unix_targets_extract_autolink_directives() {
    let (driver, jobs) = plan(&["a.swift", "b.swift", "-o", "app", "-target", LINUX]);
    assert!(!driver.diagnostics.has_errors());
    assert_eq!(
        kinds(&jobs),
        vec![JobKind::Compile, JobKind::Compile, JobKind::AutolinkExtract, JobKind::Link]
    );

    let extract = &jobs[2];
    assert_eq!(extract.inputs.len(), 2);
    assert_eq!(extract.outputs[0].file_type, FileType::Autolink);

    let link = &jobs[3];
    assert!(link.inputs.contains(&extract.outputs[0]));
    assert_topologically_ordered(&jobs);
}

#[test]
fn debug_builds_on_darwin_generate_dsyms() {
    let (driver, jobs) = plan(&["a.swift", "-g", "-o", "a.out", "-target", MACOS]);
    assert!(!driver.diagnostics.has_errors());
    assert_eq!(
        kinds(&jobs),
        vec![JobKind::EmitModule, JobKind::Compile, JobKind::Link, JobKind::GenerateDsym]
    );

    // -g forces an auxiliary module that rides into the link for lldb.
    assert!(matches!(driver.module_output, Some(ModuleOutput::Auxiliary(_))));
    let link = &jobs[2];
    assert!(link.inputs.iter().any(|i| i.file_type == FileType::SwiftModule));

    let dsym = &jobs[3];
    assert_eq!(dsym.inputs, link.outputs);
    assert_eq!(dsym.outputs[0].file, VirtualPath::Relative("a.out.dSYM".into()));
    assert_topologically_ordered(&jobs);
}

#[test]
fn merge_module_collects_raw_modules() {
    let (driver, jobs) = plan(&[
        "a.swift", "b.swiftmodule", "-emit-module", "-c", "-module-name", "A", "-target", MACOS,
    ]);
    assert!(!driver.diagnostics.has_errors());
    assert_eq!(
        kinds(&jobs),
        vec![JobKind::EmitModule, JobKind::Compile, JobKind::MergeModule]
    );

    // The frontend's module product becomes an intermediate the merge
    // consumes together with the raw module input.
    let emit = &jobs[0];
    assert!(emit.outputs[0].file.is_temporary());
    let merge = &jobs[2];
    assert!(merge.inputs.contains(&emit.outputs[0]));
    assert_eq!(
        merge.outputs[0].file,
        VirtualPath::Relative("A.swiftmodule".into())
    );
    assert_topologically_ordered(&jobs);
}

#[test]
fn unexpected_inputs_are_diagnosed_per_file() {
    let (driver, jobs) = plan(&["a.o", "b.swiftdoc", "-emit-ir", "-target", MACOS]);
    // No link step: both the object and the documentation file are
    // unexpected, and both are reported.
    assert_eq!(kinds(&jobs), vec![]);
    let messages: Vec<String> =
        driver.diagnostics.diagnostics().into_iter().map(|d| d.message).collect();
    assert_eq!(
        messages,
        vec!["unexpected input file: a.o", "unexpected input file: b.swiftdoc"]
    );
}

#[test]
fn repl_planning_is_fatal() {
    let argv: Vec<String> = ["swift", "--driver-mode=swift"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let driver = Driver::new_with_env(argv, &HashMap::new()).unwrap();
    assert!(driver.plan_build().is_err());
}

#[test]
fn whole_module_optimization_plans_one_compile() {
    let (driver, jobs) = plan(&[
        "a.swift", "b.swift", "-wmo", "-num-threads", "2", "-emit-module", "-o", "app",
        "-target", MACOS,
    ]);
    assert!(!driver.diagnostics.has_errors());
    assert_eq!(kinds(&jobs), vec![JobKind::Compile, JobKind::Link]);

    let compile = &jobs[0];
    // One object for the whole module, named after it.
    let objects: Vec<_> =
        compile.outputs.iter().filter(|o| o.file_type == FileType::Object).collect();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].file, VirtualPath::temporary("app.o"));
    // The module is emitted by the same job, not a separate one.
    assert!(compile.outputs.iter().any(|o| o.file_type == FileType::SwiftModule));
    let rendered: Vec<String> = compile.args.iter().map(|a| a.to_string()).collect();
    assert!(rendered.windows(2).any(|w| w[0] == "-num-threads" && w[1] == "2"));
}
