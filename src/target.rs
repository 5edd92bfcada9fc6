//! Minimal target-triple handling: just enough to pick a toolchain and shape
//! platform-specific job planning.

use std::fmt;

/// Operating-system family of a target triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetOs {
    MacOs,
    Ios,
    TvOs,
    WatchOs,
    Linux,
    FreeBsd,
    Haiku,
    Unknown,
}

/// A parsed `arch-vendor-os` triple. The OS component may carry a version
/// suffix (`macosx10.15`), which is ignored for classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Triple {
    raw: String,
    pub arch: String,
    pub os: TargetOs,
}

impl Triple {
    pub fn parse(triple: &str) -> Triple {
        let mut parts = triple.split('-');
        let arch = parts.next().unwrap_or_default().to_string();
        let os = parts
            .map(classify_os)
            .find(|os| *os != TargetOs::Unknown)
            .unwrap_or(TargetOs::Unknown);
        Triple { raw: triple.to_string(), arch, os }
    }

    /// The triple of the machine the driver itself runs on, used when no
    /// `-target` is given.
    pub fn host() -> Triple {
        let raw = if cfg!(target_os = "macos") {
            "x86_64-apple-macosx10.15"
        } else if cfg!(target_os = "freebsd") {
            "x86_64-unknown-freebsd"
        } else {
            "x86_64-unknown-linux-gnu"
        };
        Triple::parse(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub const fn is_darwin(&self) -> bool {
        matches!(self.os, TargetOs::MacOs | TargetOs::Ios | TargetOs::TvOs | TargetOs::WatchOs)
    }

    pub const fn is_macos(&self) -> bool {
        matches!(self.os, TargetOs::MacOs)
    }
}

fn classify_os(component: &str) -> TargetOs {
    // Version suffixes ride on the OS component ("macosx10.15", "ios13.0").
    let name: String = component.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    match name.as_str() {
        "darwin" | "macosx" | "macos" => TargetOs::MacOs,
        "ios" => TargetOs::Ios,
        "tvos" => TargetOs::TvOs,
        "watchos" => TargetOs::WatchOs,
        "linux" => TargetOs::Linux,
        "freebsd" => TargetOs::FreeBsd,
        "haiku" => TargetOs::Haiku,
        _ => TargetOs::Unknown,
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
