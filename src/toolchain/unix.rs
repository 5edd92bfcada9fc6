//! Linux, FreeBSD and Haiku: `clang` drives the system linker, archives go
//! through `ar`, and autolink directives must be extracted from objects
//! before the link.

use super::{LinkContext, Tool, Toolchain};
use crate::{file_types::FileType, job::ArgTemplate, mode::LinkOutputType};
use std::path::PathBuf;

#[derive(Debug)]
pub struct GenericUnixToolchain;

impl Toolchain for GenericUnixToolchain {
    fn name(&self) -> &'static str {
        "generic-unix"
    }

    fn find_tool(&self, tool: Tool) -> PathBuf {
        let name = match tool {
            Tool::SwiftCompiler => "swift",
            Tool::Linker => "clang",
            Tool::StaticLinker => "ar",
            Tool::AutolinkExtract => "swift-autolink-extract",
            Tool::DsymUtil => "dsymutil",
        };
        PathBuf::from(name)
    }

    /// ELF linkers do not read the `.swift1_autolink_entries` section; the
    /// directives are extracted into a response file first.
    fn requires_autolink_extract(&self) -> bool {
        true
    }

    fn default_linker_output_name(
        &self,
        output_type: LinkOutputType,
        module_name: &str,
    ) -> String {
        match output_type {
            LinkOutputType::Executable => module_name.to_string(),
            LinkOutputType::DynamicLibrary => format!("lib{module_name}.so"),
            LinkOutputType::StaticLibrary => format!("lib{module_name}.a"),
        }
    }

    fn link_job(&self, ctx: &LinkContext<'_>) -> (PathBuf, Vec<ArgTemplate>) {
        if ctx.output_type == LinkOutputType::StaticLibrary {
            let mut args = vec![ArgTemplate::flag("crs"), ArgTemplate::Path(ctx.output.clone())];
            args.extend(
                ctx.inputs
                    .iter()
                    .filter(|input| input.file_type == FileType::Object)
                    .map(|input| ArgTemplate::Path(input.file.clone())),
            );
            return (self.find_tool(Tool::StaticLinker), args);
        }

        let mut args = Vec::new();
        if ctx.output_type == LinkOutputType::DynamicLibrary {
            args.push(ArgTemplate::flag("-shared"));
        }
        for input in ctx.inputs {
            match input.file_type {
                FileType::Object => args.push(ArgTemplate::Path(input.file.clone())),
                // The extracted directives file is a linker response file.
                FileType::Autolink => args.push(ArgTemplate::Path(input.file.clone())),
                _ => {}
            }
        }
        for dir in ctx.library_search_paths {
            args.push(ArgTemplate::flag("-L"));
            args.push(ArgTemplate::flag(dir.clone()));
        }
        args.push(ArgTemplate::flag("-target"));
        args.push(ArgTemplate::flag(ctx.target.as_str().to_string()));
        if let Some(sdk) = ctx.sdk_path {
            args.push(ArgTemplate::flag("--sysroot"));
            args.push(ArgTemplate::flag(sdk.display().to_string()));
        }
        args.push(ArgTemplate::flag("-o"));
        args.push(ArgTemplate::Path(ctx.output.clone()));

        (self.find_tool(Tool::Linker), args)
    }
}
