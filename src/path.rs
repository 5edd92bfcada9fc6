//! Paths as the driver sees them.
//!
//! Planning happens before any process runs, so outputs that do not exist yet
//! (and scratch files that never hit the command line verbatim) are
//! represented virtually and only resolved by the job executor.

use crate::file_types::FileType;
use serde::Serialize;
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// A path-like value flowing between jobs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VirtualPath {
    /// An absolute path on disk.
    Absolute(PathBuf),
    /// A path relative to the working directory of the invocation.
    Relative(PathBuf),
    /// The `-` pseudo path.
    StandardInput,
    /// A scratch file, materialized by the executor under a private directory.
    Temporary(String),
    /// A response-style file list: the executor spills `contents` to a
    /// scratch file and substitutes its path.
    FileList {
        name: String,
        contents: Vec<VirtualPath>,
    },
}

impl VirtualPath {
    /// Classifies a raw command-line token as a path.
    ///
    /// `-` is preserved verbatim as standard input. Relative tokens are
    /// anchored at `working_dir` when one was configured.
    pub fn from_arg(arg: &str, working_dir: Option<&Path>) -> crate::Result<Self> {
        if arg == "-" {
            return Ok(VirtualPath::StandardInput);
        }
        if arg.is_empty() {
            return Err(crate::DriverError::msg("invalid input path: ''"));
        }
        let path = Path::new(arg);
        if path.is_absolute() {
            Ok(VirtualPath::Absolute(path.to_path_buf()))
        } else if let Some(cwd) = working_dir {
            Ok(VirtualPath::Absolute(cwd.join(path)))
        } else {
            Ok(VirtualPath::Relative(path.to_path_buf()))
        }
    }

    pub fn temporary(name: impl Into<String>) -> Self {
        VirtualPath::Temporary(name.into())
    }

    /// The user-facing name of the path: the path itself for on-disk paths,
    /// the scratch name otherwise.
    pub fn name(&self) -> String {
        match self {
            VirtualPath::Absolute(p) | VirtualPath::Relative(p) => p.display().to_string(),
            VirtualPath::StandardInput => "-".to_string(),
            VirtualPath::Temporary(name) => name.clone(),
            VirtualPath::FileList { name, .. } => name.clone(),
        }
    }

    /// Final path component without its extension. Standard input stems to
    /// `-`, which callers treat as an opaque name.
    pub fn basename_without_ext(&self) -> String {
        match self {
            VirtualPath::Absolute(p) | VirtualPath::Relative(p) => p
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            VirtualPath::StandardInput => "-".to_string(),
            VirtualPath::Temporary(name) | VirtualPath::FileList { name, .. } => {
                Path::new(name)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }
        }
    }

    pub fn extension(&self) -> Option<String> {
        match self {
            VirtualPath::Absolute(p) | VirtualPath::Relative(p) => {
                p.extension().map(|e| e.to_string_lossy().into_owned())
            }
            VirtualPath::Temporary(name) | VirtualPath::FileList { name, .. } => {
                Path::new(name).extension().map(|e| e.to_string_lossy().into_owned())
            }
            VirtualPath::StandardInput => None,
        }
    }

    /// Replaces (or adds) the extension, keeping the path's flavor.
    pub fn replacing_extension(&self, ty: FileType) -> VirtualPath {
        match self {
            VirtualPath::Absolute(p) => {
                VirtualPath::Absolute(replace_path_extension(p, ty.extension()))
            }
            VirtualPath::Relative(p) => {
                VirtualPath::Relative(replace_path_extension(p, ty.extension()))
            }
            VirtualPath::Temporary(name) | VirtualPath::FileList { name, .. } => {
                let replaced = replace_path_extension(Path::new(name), ty.extension());
                VirtualPath::Temporary(replaced.to_string_lossy().into_owned())
            }
            VirtualPath::StandardInput => {
                VirtualPath::Temporary(format!("stdin.{}", ty.extension()))
            }
        }
    }

    /// Appends `.suffix` to the full name, e.g. `a.out` -> `a.out.dSYM`.
    pub fn appending_extension(&self, suffix: &str) -> VirtualPath {
        match self {
            VirtualPath::Absolute(p) => {
                VirtualPath::Absolute(PathBuf::from(format!("{}.{suffix}", p.display())))
            }
            VirtualPath::Relative(p) => {
                VirtualPath::Relative(PathBuf::from(format!("{}.{suffix}", p.display())))
            }
            VirtualPath::Temporary(name) | VirtualPath::FileList { name, .. } => {
                VirtualPath::Temporary(format!("{name}.{suffix}"))
            }
            VirtualPath::StandardInput => VirtualPath::Temporary(format!("-.{suffix}")),
        }
    }

    pub const fn is_temporary(&self) -> bool {
        matches!(self, VirtualPath::Temporary(_) | VirtualPath::FileList { .. })
    }
}

// Unlike `Path::with_extension`, compound extensions like `trace.json` stay
// intact.
fn replace_path_extension(path: &Path, ext: &str) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!("{stem}.{ext}"))
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A [`VirtualPath`] with the semantic [`FileType`] the driver assigned to
/// it. The primary currency of job inputs and outputs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypedVirtualPath {
    pub file: VirtualPath,
    #[serde(rename = "type")]
    pub file_type: FileType,
}

impl TypedVirtualPath {
    pub fn new(file: VirtualPath, file_type: FileType) -> Self {
        Self { file, file_type }
    }
}

impl fmt::Display for TypedVirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_arguments() {
        assert_eq!(VirtualPath::from_arg("-", None).unwrap(), VirtualPath::StandardInput);
        assert_eq!(
            VirtualPath::from_arg("/abs/a.swift", None).unwrap(),
            VirtualPath::Absolute(PathBuf::from("/abs/a.swift"))
        );
        assert_eq!(
            VirtualPath::from_arg("a.swift", None).unwrap(),
            VirtualPath::Relative(PathBuf::from("a.swift"))
        );
        assert!(VirtualPath::from_arg("", None).is_err());
    }

    #[test]
    fn working_directory_anchors_relative_paths() {
        let wd = Path::new("/work");
        assert_eq!(
            VirtualPath::from_arg("sub/a.swift", Some(wd)).unwrap(),
            VirtualPath::Absolute(PathBuf::from("/work/sub/a.swift"))
        );
        // `-` stays verbatim even with a working directory.
        assert_eq!(VirtualPath::from_arg("-", Some(wd)).unwrap(), VirtualPath::StandardInput);
    }

    #[test]
    fn extension_replacement_keeps_flavor() {
        let rel = VirtualPath::from_arg("dir/a.swift", None).unwrap();
        assert_eq!(
            rel.replacing_extension(FileType::Object),
            VirtualPath::Relative(PathBuf::from("dir/a.o"))
        );

        let tmp = VirtualPath::temporary("a.swiftmodule");
        assert_eq!(
            tmp.replacing_extension(FileType::SwiftDocumentation),
            VirtualPath::Temporary("a.swiftdoc".to_string())
        );
    }

    #[test]
    fn compound_extensions_survive_replacement() {
        let rel = VirtualPath::from_arg("a.swift", None).unwrap();
        assert_eq!(
            rel.replacing_extension(FileType::ModuleTrace),
            VirtualPath::Relative(PathBuf::from("a.trace.json"))
        );
    }

    #[test]
    fn appends_bundle_suffix() {
        let out = VirtualPath::from_arg("a.out", None).unwrap();
        assert_eq!(
            out.appending_extension("dSYM"),
            VirtualPath::Relative(PathBuf::from("a.out.dSYM"))
        );
    }
}
