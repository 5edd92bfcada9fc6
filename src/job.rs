//! Immutable description of one sub-process invocation.

use crate::path::{TypedVirtualPath, VirtualPath};
use itertools::Itertools;
use serde::Serialize;
use std::{fmt, path::PathBuf};

/// One argument slot of a job's command line.
///
/// Templates decouple argument construction from resolution: a `Flag` is a
/// verbatim token, a `Path` is resolved against the working directory at
/// execution time, and a `FileList` spills its contents to a scratch file
/// whose path is substituted. The job executor consumes this indirection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgTemplate {
    Flag(String),
    Path(VirtualPath),
    FileList {
        name: String,
        paths: Vec<VirtualPath>,
    },
}

impl ArgTemplate {
    pub fn flag(flag: impl Into<String>) -> Self {
        ArgTemplate::Flag(flag.into())
    }

    pub fn path(path: impl Into<VirtualPath>) -> Self {
        ArgTemplate::Path(path.into())
    }
}

impl fmt::Display for ArgTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgTemplate::Flag(flag) => f.write_str(flag),
            ArgTemplate::Path(path) => write!(f, "{path}"),
            ArgTemplate::FileList { name, .. } => write!(f, "@{name}"),
        }
    }
}

/// What a job does, independent of the tool that does it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    Compile,
    EmitModule,
    MergeModule,
    AutolinkExtract,
    Link,
    GenerateDsym,
}

impl JobKind {
    pub const fn name(&self) -> &'static str {
        match self {
            JobKind::Compile => "compile",
            JobKind::EmitModule => "emit-module",
            JobKind::MergeModule => "merge-module",
            JobKind::AutolinkExtract => "autolink-extract",
            JobKind::Link => "link",
            JobKind::GenerateDsym => "generate-dsym",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A planned sub-process invocation. Never mutated after the planner appends
/// it to the plan.
#[derive(Clone, Debug, Serialize)]
pub struct Job {
    pub kind: JobKind,
    /// Resolved executable.
    pub tool: PathBuf,
    pub args: Vec<ArgTemplate>,
    pub inputs: Vec<TypedVirtualPath>,
    pub outputs: Vec<TypedVirtualPath>,
}

impl Job {
    pub fn new(
        kind: JobKind,
        tool: PathBuf,
        args: Vec<ArgTemplate>,
        inputs: Vec<TypedVirtualPath>,
        outputs: Vec<TypedVirtualPath>,
    ) -> Self {
        Self { kind, tool, args, inputs, outputs }
    }
}

impl fmt::Display for Job {
    /// Renders the command line the way `-driver-print-jobs` shows it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool.display())?;
        if !self.args.is_empty() {
            write!(f, " {}", self.args.iter().format(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_types::FileType;

    #[test]
    fn renders_a_command_line() {
        let job = Job::new(
            JobKind::Compile,
            PathBuf::from("swift"),
            vec![
                ArgTemplate::flag("-frontend"),
                ArgTemplate::flag("-c"),
                ArgTemplate::Path(VirtualPath::from_arg("a.swift", None).unwrap()),
                ArgTemplate::flag("-o"),
                ArgTemplate::Path(VirtualPath::temporary("a.o")),
            ],
            vec![TypedVirtualPath::new(
                VirtualPath::from_arg("a.swift", None).unwrap(),
                FileType::Swift,
            )],
            vec![TypedVirtualPath::new(VirtualPath::temporary("a.o"), FileType::Object)],
        );
        assert_eq!(job.to_string(), "swift -frontend -c a.swift -o a.o");
    }

    #[test]
    fn file_lists_render_as_response_files() {
        let arg = ArgTemplate::FileList {
            name: "sources-1".to_string(),
            paths: vec![VirtualPath::from_arg("a.swift", None).unwrap()],
        };
        assert_eq!(arg.to_string(), "@sources-1");
    }
}
