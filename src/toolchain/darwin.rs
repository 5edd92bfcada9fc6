//! Apple platforms: `clang` drives `ld64`, archives go through `libtool`,
//! and debug symbols are collected by `dsymutil`.

use super::{LinkContext, Tool, Toolchain};
use crate::{file_types::FileType, job::ArgTemplate, mode::LinkOutputType};
use std::path::PathBuf;

#[derive(Debug)]
pub struct DarwinToolchain;

impl Toolchain for DarwinToolchain {
    fn name(&self) -> &'static str {
        "darwin"
    }

    fn find_tool(&self, tool: Tool) -> PathBuf {
        let name = match tool {
            Tool::SwiftCompiler => "swift",
            Tool::Linker => "clang",
            Tool::StaticLinker => "libtool",
            Tool::AutolinkExtract => "swift-autolink-extract",
            Tool::DsymUtil => "dsymutil",
        };
        PathBuf::from(name)
    }

    /// ld64 reads autolink directives straight out of the object files.
    fn requires_autolink_extract(&self) -> bool {
        false
    }

    // Full installations resolve this through `xcrun --show-sdk-path`; when
    // that is unavailable the environment's SDKROOT is the only source.
    fn default_sdk_path(&self) -> Option<PathBuf> {
        None
    }

    fn default_linker_output_name(
        &self,
        output_type: LinkOutputType,
        module_name: &str,
    ) -> String {
        match output_type {
            LinkOutputType::Executable => module_name.to_string(),
            LinkOutputType::DynamicLibrary => format!("lib{module_name}.dylib"),
            LinkOutputType::StaticLibrary => format!("lib{module_name}.a"),
        }
    }

    fn link_job(&self, ctx: &LinkContext<'_>) -> (PathBuf, Vec<ArgTemplate>) {
        if ctx.output_type == LinkOutputType::StaticLibrary {
            let mut args = vec![ArgTemplate::flag("-static"), ArgTemplate::flag("-o")];
            args.push(ArgTemplate::Path(ctx.output.clone()));
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
            args.push(ArgTemplate::flag("-dynamiclib"));
        }
        for input in ctx.inputs {
            match input.file_type {
                FileType::Object | FileType::Autolink => {
                    args.push(ArgTemplate::Path(input.file.clone()))
                }
                // The debugger finds the module through the linked image.
                FileType::SwiftModule => {
                    args.push(ArgTemplate::flag("-Xlinker"));
                    args.push(ArgTemplate::flag("-add_ast_path"));
                    args.push(ArgTemplate::flag("-Xlinker"));
                    args.push(ArgTemplate::Path(input.file.clone()));
                }
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
            args.push(ArgTemplate::flag("-isysroot"));
            args.push(ArgTemplate::flag(sdk.display().to_string()));
        }
        args.push(ArgTemplate::flag("-o"));
        args.push(ArgTemplate::Path(ctx.output.clone()));

        (self.find_tool(Tool::Linker), args)
    }
}
