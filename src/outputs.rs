//! Paths for the artifacts produced alongside the primary output.
//!
//! Each kind follows the same precedence: explicit `-...-path` value, then a
//! name derived from `-o`, then a name derived from the module name. An
//! unset `-emit-...` flag means no output at all.

use crate::{
    diagnostics::DiagnosticEngine,
    file_types::FileType,
    options::{Opt, ParsedOptions},
    path::VirtualPath,
};
use std::path::Path;

/// The resolved supplementary output paths; `None` everywhere the artifact
/// was not requested.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SupplementaryOutputs {
    pub dependencies: Option<VirtualPath>,
    pub reference_dependencies: Option<VirtualPath>,
    pub serialized_diagnostics: Option<VirtualPath>,
    pub objc_header: Option<VirtualPath>,
    pub loaded_module_trace: Option<VirtualPath>,
    pub tbd: Option<VirtualPath>,
    pub module_doc: Option<VirtualPath>,
    pub module_interface: Option<VirtualPath>,
    pub optimization_record: Option<VirtualPath>,
}

pub(crate) fn compute_supplementary_outputs(
    opts: &ParsedOptions,
    compiler_output_type: Option<FileType>,
    module_name: &str,
    working_dir: Option<&Path>,
    diags: &DiagnosticEngine,
) -> SupplementaryOutputs {
    if opts.has(Opt::ImportObjcHeader)
        && opts.has_any(&[Opt::EmitModuleInterface, Opt::EmitModuleInterfacePath])
    {
        diags.error("using bridging headers with module interfaces is unsupported");
    }

    let resolve = |ty: FileType, is_output: Opt, path_opt: Opt| {
        supplementary_output_path(
            opts,
            ty,
            is_output,
            path_opt,
            compiler_output_type,
            module_name,
            working_dir,
        )
    };

    SupplementaryOutputs {
        dependencies: resolve(
            FileType::Dependencies,
            Opt::EmitDependencies,
            Opt::EmitDependenciesPath,
        ),
        reference_dependencies: resolve(
            FileType::SwiftDeps,
            Opt::EmitReferenceDependencies,
            Opt::EmitReferenceDependenciesPath,
        ),
        serialized_diagnostics: resolve(
            FileType::Diagnostics,
            Opt::SerializeDiagnostics,
            Opt::SerializeDiagnosticsPath,
        ),
        objc_header: resolve(FileType::ObjcHeader, Opt::EmitObjcHeader, Opt::EmitObjcHeaderPath),
        loaded_module_trace: resolve(
            FileType::ModuleTrace,
            Opt::EmitLoadedModuleTrace,
            Opt::EmitLoadedModuleTracePath,
        ),
        tbd: resolve(FileType::Tbd, Opt::EmitTbd, Opt::EmitTbdPath),
        module_doc: resolve(
            FileType::SwiftDocumentation,
            Opt::EmitModuleDoc,
            Opt::EmitModuleDocPath,
        ),
        module_interface: resolve(
            FileType::SwiftInterface,
            Opt::EmitModuleInterface,
            Opt::EmitModuleInterfacePath,
        ),
        optimization_record: resolve(
            FileType::OptimizationRecord,
            Opt::SaveOptimizationRecord,
            Opt::SaveOptimizationRecordPath,
        ),
    }
}

fn supplementary_output_path(
    opts: &ParsedOptions,
    ty: FileType,
    is_output: Opt,
    path_opt: Opt,
    compiler_output_type: Option<FileType>,
    module_name: &str,
    working_dir: Option<&Path>,
) -> Option<VirtualPath> {
    // An explicit path wins outright and also consumes the bare flag.
    if let Some(path) = opts.last_value(path_opt) {
        return VirtualPath::from_arg(path, working_dir).ok();
    }
    if !opts.has(is_output) {
        return None;
    }
    if let Some(output) = opts.last_value(Opt::Output) {
        let output = VirtualPath::from_arg(output, working_dir).ok()?;
        if compiler_output_type == Some(ty) {
            return Some(output);
        }
        return Some(output.replacing_extension(ty));
    }
    let filename = format!("{module_name}.{}", ty.extension());
    VirtualPath::from_arg(&filename, working_dir).ok()
}
