//! The closed set of artifact kinds the driver reasons about.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a file the driver consumes or produces.
///
/// Classification of raw inputs goes through [`FileType::from_extension`];
/// unknown extensions are deliberately treated as relocatable objects rather
/// than rejected, so arbitrary linker inputs can be listed on the command
/// line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    Swift,
    Sil,
    Sib,
    Object,
    Autolink,
    SwiftModule,
    SwiftDocumentation,
    SwiftInterface,
    SwiftDeps,
    Assembly,
    LlvmIr,
    LlvmBitcode,
    Ast,
    Pch,
    ImportedModules,
    IndexData,
    Remap,
    Diagnostics,
    Dependencies,
    ObjcHeader,
    ModuleTrace,
    Tbd,
    OptimizationRecord,
    RawSil,
    RawSib,
    /// A linked image (executable or library).
    Image,
    /// A dSYM debug-symbol bundle.
    DSym,
}

impl FileType {
    /// The canonical file extension for this type.
    pub const fn extension(self) -> &'static str {
        match self {
            FileType::Swift => "swift",
            FileType::Sil | FileType::RawSil => "sil",
            FileType::Sib | FileType::RawSib => "sib",
            FileType::Object => "o",
            FileType::Autolink => "autolink",
            FileType::SwiftModule => "swiftmodule",
            FileType::SwiftDocumentation => "swiftdoc",
            FileType::SwiftInterface => "swiftinterface",
            FileType::SwiftDeps => "swiftdeps",
            FileType::Assembly => "s",
            FileType::LlvmIr => "ll",
            FileType::LlvmBitcode => "bc",
            FileType::Ast => "ast",
            FileType::Pch => "pch",
            FileType::ImportedModules => "importedmodules",
            FileType::IndexData => "indexdata",
            FileType::Remap => "remap",
            FileType::Diagnostics => "dia",
            FileType::Dependencies => "d",
            FileType::ObjcHeader => "h",
            FileType::ModuleTrace => "trace.json",
            FileType::Tbd => "tbd",
            FileType::OptimizationRecord => "opt.yaml",
            // Linked images carry whatever name the user asked for.
            FileType::Image => "",
            FileType::DSym => "dSYM",
        }
    }

    /// Maps a file extension back to a type. Partial; raw SIL/SIB share their
    /// extension with the non-raw kinds and resolve to those.
    pub fn from_extension(ext: &str) -> Option<FileType> {
        let ty = match ext {
            "swift" => FileType::Swift,
            "sil" => FileType::Sil,
            "sib" => FileType::Sib,
            "o" => FileType::Object,
            "autolink" => FileType::Autolink,
            "swiftmodule" => FileType::SwiftModule,
            "swiftdoc" => FileType::SwiftDocumentation,
            "swiftinterface" => FileType::SwiftInterface,
            "swiftdeps" => FileType::SwiftDeps,
            "s" => FileType::Assembly,
            "ll" => FileType::LlvmIr,
            "bc" => FileType::LlvmBitcode,
            "ast" => FileType::Ast,
            "pch" => FileType::Pch,
            "importedmodules" => FileType::ImportedModules,
            "indexdata" => FileType::IndexData,
            "remap" => FileType::Remap,
            "dia" => FileType::Diagnostics,
            "d" => FileType::Dependencies,
            "h" => FileType::ObjcHeader,
            "trace.json" => FileType::ModuleTrace,
            "tbd" => FileType::Tbd,
            "opt.yaml" => FileType::OptimizationRecord,
            "dSYM" => FileType::DSym,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether files of this type are handed to the frontend as compilation
    /// inputs (as opposed to linker or module inputs).
    pub const fn is_part_of_swift_compilation(self) -> bool {
        matches!(self, FileType::Swift | FileType::Sil | FileType::Sib)
    }

    /// The artifact name used in output file maps and job descriptions.
    pub const fn name(self) -> &'static str {
        match self {
            FileType::Swift => "swift",
            FileType::Sil => "sil",
            FileType::Sib => "sib",
            FileType::Object => "object",
            FileType::Autolink => "autolink",
            FileType::SwiftModule => "swiftmodule",
            FileType::SwiftDocumentation => "swiftdoc",
            FileType::SwiftInterface => "swiftinterface",
            FileType::SwiftDeps => "swift-dependencies",
            FileType::Assembly => "assembly",
            FileType::LlvmIr => "llvm-ir",
            FileType::LlvmBitcode => "llvm-bc",
            FileType::Ast => "ast-dump",
            FileType::Pch => "pch",
            FileType::ImportedModules => "imported-modules",
            FileType::IndexData => "index-data",
            FileType::Remap => "remap",
            FileType::Diagnostics => "diagnostics",
            FileType::Dependencies => "dependencies",
            FileType::ObjcHeader => "objc-header",
            FileType::ModuleTrace => "module-trace",
            FileType::Tbd => "tbd",
            FileType::OptimizationRecord => "yaml-opt-record",
            FileType::RawSil => "raw-sil",
            FileType::RawSib => "raw-sib",
            FileType::Image => "image",
            FileType::DSym => "dSYM",
        }
    }

    pub fn from_name(name: &str) -> Option<FileType> {
        let ty = match name {
            "swift" => FileType::Swift,
            "sil" => FileType::Sil,
            "sib" => FileType::Sib,
            "object" => FileType::Object,
            "autolink" => FileType::Autolink,
            "swiftmodule" => FileType::SwiftModule,
            "swiftdoc" => FileType::SwiftDocumentation,
            "swiftinterface" => FileType::SwiftInterface,
            "swift-dependencies" => FileType::SwiftDeps,
            "assembly" => FileType::Assembly,
            "llvm-ir" => FileType::LlvmIr,
            "llvm-bc" => FileType::LlvmBitcode,
            "ast-dump" => FileType::Ast,
            "pch" => FileType::Pch,
            "imported-modules" => FileType::ImportedModules,
            "index-data" => FileType::IndexData,
            "remap" => FileType::Remap,
            "diagnostics" => FileType::Diagnostics,
            "dependencies" => FileType::Dependencies,
            "objc-header" => FileType::ObjcHeader,
            "module-trace" => FileType::ModuleTrace,
            "tbd" => FileType::Tbd,
            "yaml-opt-record" => FileType::OptimizationRecord,
            "raw-sil" => FileType::RawSil,
            "raw-sib" => FileType::RawSib,
            "image" => FileType::Image,
            "dSYM" => FileType::DSym,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[FileType] = &[
        FileType::Swift,
        FileType::Sil,
        FileType::Sib,
        FileType::Object,
        FileType::Autolink,
        FileType::SwiftModule,
        FileType::SwiftDocumentation,
        FileType::SwiftInterface,
        FileType::SwiftDeps,
        FileType::Assembly,
        FileType::LlvmIr,
        FileType::LlvmBitcode,
        FileType::Ast,
        FileType::Pch,
        FileType::ImportedModules,
        FileType::IndexData,
        FileType::Remap,
        FileType::Diagnostics,
        FileType::Dependencies,
        FileType::ObjcHeader,
        FileType::ModuleTrace,
        FileType::Tbd,
        FileType::OptimizationRecord,
        FileType::RawSil,
        FileType::RawSib,
        FileType::Image,
        FileType::DSym,
    ];

    #[test]
    fn extension_round_trips() {
        for ty in ALL.iter().copied() {
            // Linked images have no canonical extension.
            if ty.extension().is_empty() {
                continue;
            }
            let back = FileType::from_extension(ty.extension())
                .unwrap_or_else(|| panic!("no mapping for extension of {ty:?}"));
            // Raw SIL/SIB share "sil"/"sib" with the non-raw kinds, so the
            // round trip is on the extension, not the variant.
            assert_eq!(back.extension(), ty.extension());
        }
    }

    #[test]
    fn name_round_trips() {
        for ty in ALL.iter().copied() {
            assert_eq!(FileType::from_name(ty.name()), Some(ty));
        }
    }

    #[test]
    fn unknown_extension_is_unmapped() {
        assert_eq!(FileType::from_extension("txt"), None);
        assert_eq!(FileType::from_extension(""), None);
    }

    #[test]
    fn swift_compilation_inputs() {
        assert!(FileType::Swift.is_part_of_swift_compilation());
        assert!(FileType::Sil.is_part_of_swift_compilation());
        assert!(FileType::Sib.is_part_of_swift_compilation());
        assert!(!FileType::Object.is_part_of_swift_compilation());
        assert!(!FileType::SwiftModule.is_part_of_swift_compilation());
    }
}
