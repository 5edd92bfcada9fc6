//! Whether a module file is emitted, what it is called, and where it goes.

use crate::{
    diagnostics::DiagnosticEngine,
    mode::{CompilerMode, DebugInfoLevel, LinkOutputType, OutputInfo},
    options::{Opt, ParsedOptions},
    path::{TypedVirtualPath, VirtualPath},
};
use once_cell::sync::Lazy;
use std::{collections::HashSet, path::Path};

/// Sentinel module name used after an invalid name was diagnosed, so that
/// downstream planning stays well defined.
pub const BAD_MODULE_NAME: &str = "__bad__";

/// The module artifact, and whether it is a build product in its own right
/// or an intermediate consumed by later jobs (debug info for the link).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleOutput {
    TopLevel(VirtualPath),
    Auxiliary(VirtualPath),
}

impl ModuleOutput {
    pub fn path(&self) -> &VirtualPath {
        match self {
            ModuleOutput::TopLevel(path) | ModuleOutput::Auxiliary(path) => path,
        }
    }

    pub const fn is_top_level(&self) -> bool {
        matches!(self, ModuleOutput::TopLevel(_))
    }
}

/// Resolved module settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleInfo {
    pub output: Option<ModuleOutput>,
    pub name: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ModuleOutputKind {
    TopLevel,
    Auxiliary,
}

pub(crate) fn compute_module_info(
    opts: &ParsedOptions,
    mode: &CompilerMode,
    output_info: &OutputInfo,
    debug_info_level: Option<DebugInfoLevel>,
    inputs: &[TypedVirtualPath],
    working_dir: Option<&Path>,
    diags: &DiagnosticEngine,
) -> ModuleInfo {
    let linker_output_type = output_info.linker_output_type;
    let mut kind = if opts.has(Opt::EmitModule) || opts.has(Opt::EmitModulePath) {
        Some(ModuleOutputKind::TopLevel)
    } else if debug_info_level.is_some_and(|l| l.requires_module())
        && linker_output_type.is_some()
    {
        Some(ModuleOutputKind::Auxiliary)
    } else if *mode != CompilerMode::SingleCompile
        && opts.has_any(&[
            Opt::EmitObjcHeader,
            Opt::EmitObjcHeaderPath,
            Opt::EmitModuleInterface,
            Opt::EmitModuleInterfacePath,
        ])
    {
        Some(ModuleOutputKind::Auxiliary)
    } else {
        None
    };

    if matches!(mode, CompilerMode::Repl | CompilerMode::Immediate) && kind.is_some() {
        diags.warning(format!("ignoring module emission in {} mode", mode.name()));
        kind = None;
    }

    let name = compute_module_name(opts, mode, output_info, inputs, diags);

    let output = kind.map(|kind| {
        let path = match opts.last_value(Opt::EmitModulePath) {
            Some(value) => path_for_arg(value, working_dir),
            None => {
                let filename = format!("{name}.swiftmodule");
                match kind {
                    ModuleOutputKind::TopLevel => path_for_arg(&filename, working_dir),
                    ModuleOutputKind::Auxiliary => VirtualPath::temporary(filename),
                }
            }
        };
        match kind {
            ModuleOutputKind::TopLevel => ModuleOutput::TopLevel(path),
            ModuleOutputKind::Auxiliary => ModuleOutput::Auxiliary(path),
        }
    });

    ModuleInfo { output, name }
}

fn path_for_arg(value: &str, working_dir: Option<&Path>) -> VirtualPath {
    VirtualPath::from_arg(value, working_dir)
        .unwrap_or_else(|_| VirtualPath::Relative(value.into()))
}

fn compute_module_name(
    opts: &ParsedOptions,
    mode: &CompilerMode,
    output_info: &OutputInfo,
    inputs: &[TypedVirtualPath],
    diags: &DiagnosticEngine,
) -> String {
    let name = raw_module_name(opts, mode, output_info, inputs);

    if name == "Swift" && !opts.has(Opt::ParseStdlib) {
        diags.error("module name \"Swift\" is reserved for the standard library");
        return BAD_MODULE_NAME.to_string();
    }
    if !name.is_empty() && !is_valid_identifier(&name) {
        diags.error(format!("module name \"{name}\" is not a valid identifier"));
        return BAD_MODULE_NAME.to_string();
    }
    name
}

fn raw_module_name(
    opts: &ParsedOptions,
    mode: &CompilerMode,
    output_info: &OutputInfo,
    inputs: &[TypedVirtualPath],
) -> String {
    let linker_output_type = output_info.linker_output_type;
    if let Some(name) = opts.last_value(Opt::ModuleName) {
        return name.to_string();
    }
    if *mode == CompilerMode::Repl {
        return "REPL".to_string();
    }
    if let Some(output) = opts.last_value(Opt::Output) {
        let path = Path::new(output);
        let mut stem =
            path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let is_library = matches!(
            linker_output_type,
            Some(LinkOutputType::DynamicLibrary) | Some(LinkOutputType::StaticLibrary)
        );
        if is_library
            && stem.len() > "lib".len()
            && stem.starts_with("lib")
            && path.extension().is_some()
        {
            stem = stem["lib".len()..].to_string();
        }
        return stem;
    }
    if inputs.len() == 1 {
        return inputs[0].file.basename_without_ext();
    }
    if output_info.compiler_output_type.is_none()
        || maybe_building_executable(opts, linker_output_type, inputs)
    {
        // No way to name the module from the outputs; fall back the way a
        // `main.swift`-style build would.
        return "main".to_string();
    }
    String::new()
}

// Deliberately heuristic when no linker output was resolved: a single input
// with default parsing semantics is probably turning into an executable.
fn maybe_building_executable(
    opts: &ParsedOptions,
    linker_output_type: Option<LinkOutputType>,
    inputs: &[TypedVirtualPath],
) -> bool {
    match linker_output_type {
        Some(LinkOutputType::Executable) => return true,
        Some(_) => return false,
        None => {}
    }
    !opts.has(Opt::ParseAsLibrary) && !opts.has(Opt::ParseStdlib) && inputs.len() == 1
}

static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "associatedtype", "class", "deinit", "enum", "extension", "fileprivate", "func",
        "import", "init", "inout", "internal", "let", "open", "operator", "private",
        "protocol", "public", "static", "struct", "subscript", "typealias", "var", "break",
        "case", "continue", "default", "defer", "do", "else", "fallthrough", "for", "guard",
        "if", "in", "repeat", "return", "switch", "where", "while", "as", "catch", "false",
        "is", "nil", "rethrows", "super", "self", "Self", "throw", "throws", "true", "try",
    ]
    .into_iter()
    .collect()
});

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else { return false };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    !RESERVED_WORDS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_types::FileType;

    fn parse(args: &[&str]) -> (ParsedOptions, DiagnosticEngine) {
        let diags = DiagnosticEngine::new();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let opts = ParsedOptions::parse(&args, &diags);
        (opts, diags)
    }

    fn swift_inputs(names: &[&str]) -> Vec<TypedVirtualPath> {
        names
            .iter()
            .map(|n| {
                TypedVirtualPath::new(VirtualPath::from_arg(n, None).unwrap(), FileType::Swift)
            })
            .collect()
    }

    fn out_info(link: Option<LinkOutputType>) -> OutputInfo {
        OutputInfo { compiler_output_type: Some(FileType::Object), linker_output_type: link }
    }

    fn resolve(args: &[&str], inputs: &[&str], link: Option<LinkOutputType>) -> ModuleInfo {
        let (opts, diags) = parse(args);
        compute_module_info(
            &opts,
            &CompilerMode::StandardCompile,
            &out_info(link),
            None,
            &swift_inputs(inputs),
            None,
            &diags,
        )
    }

    #[test]
    fn explicit_emit_module_is_top_level() {
        let info = resolve(&["-emit-module"], &["a.swift"], None);
        assert_eq!(
            info.output,
            Some(ModuleOutput::TopLevel(VirtualPath::Relative("a.swiftmodule".into())))
        );
        assert_eq!(info.name, "a");
    }

    #[test]
    fn debug_info_with_link_implies_auxiliary_module() {
        let (opts, diags) = parse(&["-g"]);
        let info = compute_module_info(
            &opts,
            &CompilerMode::StandardCompile,
            &out_info(Some(LinkOutputType::Executable)),
            Some(DebugInfoLevel::AstTypes),
            &swift_inputs(&["a.swift"]),
            None,
            &diags,
        );
        assert_eq!(
            info.output,
            Some(ModuleOutput::Auxiliary(VirtualPath::temporary("a.swiftmodule")))
        );

        // Line tables do not need the module.
        let info = compute_module_info(
            &opts,
            &CompilerMode::StandardCompile,
            &out_info(Some(LinkOutputType::Executable)),
            Some(DebugInfoLevel::LineTables),
            &swift_inputs(&["a.swift"]),
            None,
            &diags,
        );
        assert_eq!(info.output, None);
    }

    #[test]
    fn objc_header_implies_auxiliary_module_outside_single_compile() {
        let info = resolve(&["-emit-objc-header"], &["a.swift", "b.swift"], None);
        assert!(matches!(info.output, Some(ModuleOutput::Auxiliary(_))));

        let (opts, diags) = parse(&["-emit-objc-header"]);
        let info = compute_module_info(
            &opts,
            &CompilerMode::SingleCompile,
            &out_info(None),
            None,
            &swift_inputs(&["a.swift", "b.swift"]),
            None,
            &diags,
        );
        assert_eq!(info.output, None);
    }

    #[test]
    fn repl_forces_module_output_off() {
        let (opts, diags) = parse(&["-emit-module"]);
        let info = compute_module_info(
            &opts,
            &CompilerMode::Repl,
            &out_info(None),
            None,
            &[],
            None,
            &diags,
        );
        assert_eq!(info.output, None);
        assert_eq!(info.name, "REPL");
        assert!(!diags.is_empty());
    }

    #[test]
    fn module_name_from_output_strips_library_prefix() {
        let info = resolve(
            &["-emit-library", "-o", "libGreeting.dylib"],
            &["a.swift", "b.swift"],
            Some(LinkOutputType::DynamicLibrary),
        );
        assert_eq!(info.name, "Greeting");

        // Without an extension the `lib` prefix is kept.
        let info = resolve(
            &["-emit-library", "-o", "libGreeting"],
            &["a.swift", "b.swift"],
            Some(LinkOutputType::DynamicLibrary),
        );
        assert_eq!(info.name, "libGreeting");

        // Executables keep their name verbatim.
        let info = resolve(
            &["-o", "libtool.out"],
            &["a.swift", "b.swift"],
            Some(LinkOutputType::Executable),
        );
        assert_eq!(info.name, "libtool");
    }

    #[test]
    fn fallback_names() {
        let info = resolve(&[], &["hello.swift"], Some(LinkOutputType::Executable));
        assert_eq!(info.name, "hello");

        let info = resolve(&[], &["a.swift", "b.swift"], Some(LinkOutputType::Executable));
        assert_eq!(info.name, "main");
    }

    #[test]
    fn invalid_names_become_the_sentinel() {
        let (opts, diags) = parse(&["-module-name", "12three"]);
        let info = compute_module_info(
            &opts,
            &CompilerMode::StandardCompile,
            &out_info(None),
            None,
            &swift_inputs(&["a.swift"]),
            None,
            &diags,
        );
        assert_eq!(info.name, BAD_MODULE_NAME);
        assert!(diags.has_errors());

        let (opts, diags) = parse(&["-module-name", "class"]);
        let info = compute_module_info(
            &opts,
            &CompilerMode::StandardCompile,
            &out_info(None),
            None,
            &[],
            None,
            &diags,
        );
        assert_eq!(info.name, BAD_MODULE_NAME);
        assert!(diags.has_errors());
    }

    #[test]
    fn swift_module_name_needs_parse_stdlib() {
        let (opts, diags) = parse(&["-module-name", "Swift"]);
        let info = compute_module_info(
            &opts,
            &CompilerMode::StandardCompile,
            &out_info(None),
            None,
            &[],
            None,
            &diags,
        );
        assert_eq!(info.name, BAD_MODULE_NAME);
        assert!(diags.has_errors());

        let (opts, diags) = parse(&["-module-name", "Swift", "-parse-stdlib"]);
        let info = compute_module_info(
            &opts,
            &CompilerMode::StandardCompile,
            &out_info(None),
            None,
            &[],
            None,
            &diags,
        );
        assert_eq!(info.name, "Swift");
        assert!(!diags.has_errors());
    }

    #[test]
    fn explicit_module_path_wins() {
        let (opts, diags) = parse(&["-emit-module-path", "/tmp/Out.swiftmodule"]);
        let info = compute_module_info(
            &opts,
            &CompilerMode::StandardCompile,
            &out_info(None),
            None,
            &swift_inputs(&["a.swift"]),
            None,
            &diags,
        );
        assert_eq!(
            info.output,
            Some(ModuleOutput::TopLevel(VirtualPath::Absolute("/tmp/Out.swiftmodule".into())))
        );
    }
}
