//! The `-output-file-map` document: per-input output paths supplied by an
//! outer build system.
//!
//! ```json
//! {
//!   "a.swift": { "object": "build/a.o", "dependencies": "build/a.d" },
//!   "": { "swift-dependencies": "build/module.swiftdeps" }
//! }
//! ```
//!
//! Paths in the map take precedence over every derived output path.

use crate::{
    error::{DriverError, Result},
    file_types::FileType,
    path::VirtualPath,
};
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

#[derive(Clone, Debug, Default)]
pub struct OutputFileMap {
    entries: HashMap<VirtualPath, HashMap<FileType, VirtualPath>>,
    /// Outputs under the empty key, which apply to the module as a whole.
    module_entries: HashMap<FileType, VirtualPath>,
}

impl OutputFileMap {
    pub fn load(path: &Path, working_dir: Option<&Path>) -> Result<OutputFileMap> {
        let contents = fs::read_to_string(path)?;
        let raw: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(&contents)
            .map_err(|source| DriverError::OutputFileMap { path: path.to_path_buf(), source })?;

        let mut map = OutputFileMap::default();
        for (input, outputs) in raw {
            let mut typed = HashMap::new();
            for (kind, output) in outputs {
                let Some(ty) = FileType::from_name(&kind) else {
                    debug!(%kind, %input, "skipping unknown artifact kind in output file map");
                    continue;
                };
                typed.insert(ty, VirtualPath::from_arg(&output, working_dir)?);
            }
            if input.is_empty() {
                map.module_entries = typed;
            } else {
                map.entries.insert(VirtualPath::from_arg(&input, working_dir)?, typed);
            }
        }
        trace!(entries = map.entries.len(), "loaded output file map");
        Ok(map)
    }

    /// The configured output of type `ty` for `input`, if the map has one.
    pub fn lookup(&self, input: &VirtualPath, ty: FileType) -> Option<&VirtualPath> {
        self.entries.get(input)?.get(&ty)
    }

    /// Module-level outputs (the empty-key entry).
    pub fn module_level(&self, ty: FileType) -> Option<&VirtualPath> {
        self.module_entries.get(&ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn looks_up_per_input_and_module_level_paths() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "a.swift": {{ "object": "build/a.o", "dependencies": "build/a.d" }},
                "": {{ "swift-dependencies": "build/module.swiftdeps" }}
            }}"#
        )
        .unwrap();

        let map = OutputFileMap::load(file.path(), None).unwrap();
        let input = VirtualPath::from_arg("a.swift", None).unwrap();
        assert_eq!(
            map.lookup(&input, FileType::Object),
            Some(&VirtualPath::Relative("build/a.o".into()))
        );
        assert_eq!(map.lookup(&input, FileType::SwiftModule), None);
        assert_eq!(
            map.module_level(FileType::SwiftDeps),
            Some(&VirtualPath::Relative("build/module.swiftdeps".into()))
        );
    }

    #[test]
    fn malformed_json_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            OutputFileMap::load(file.path(), None),
            Err(DriverError::OutputFileMap { .. })
        ));
    }
}
