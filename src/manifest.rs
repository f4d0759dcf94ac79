//! Release version lookup from the project manifest.

use crate::error::{HeraldError, Result};
use crate::log_debug;

use std::fs;
use std::path::Path;

/// Manifests checked, in order, when no explicit path is given
pub const MANIFEST_FILENAMES: &[&str] = &["package.json", "Cargo.toml"];

/// Find the first known manifest in `dir` and return its version as a `v`-prefixed tag
pub fn extract_version_tag(dir: &Path) -> Result<String> {
    let path = MANIFEST_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .ok_or_else(|| HeraldError::Manifest {
            path: dir.display().to_string(),
            reason: format!("none of {} found", MANIFEST_FILENAMES.join(", ")),
        })?;

    read_version_tag(&path)
}

/// Read the version field of a `package.json` or `Cargo.toml`
pub fn read_version_tag(path: &Path) -> Result<String> {
    let manifest_error = |reason: String| HeraldError::Manifest {
        path: path.display().to_string(),
        reason,
    };

    let content = fs::read_to_string(path).map_err(|e| manifest_error(e.to_string()))?;

    let version = if is_toml(path) {
        let manifest: toml::Value =
            toml::from_str(&content).map_err(|e| manifest_error(e.to_string()))?;
        manifest
            .get("package")
            .and_then(|p| p.get("version"))
            .or_else(|| {
                manifest
                    .get("workspace")
                    .and_then(|w| w.get("package"))
                    .and_then(|p| p.get("version"))
            })
            .and_then(toml::Value::as_str)
            .map(str::to_string)
    } else {
        let manifest: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| manifest_error(e.to_string()))?;
        manifest
            .get("version")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    };

    let version = version
        .map(|v| v.trim().trim_start_matches('v').to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| manifest_error("no version field".to_string()))?;

    log_debug!("Read version {} from {}", version, path.display());
    Ok(format!("v{version}"))
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Resolve an explicit `--manifest` argument, which may be a file or a directory
pub fn version_tag_from(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path.is_dir() => extract_version_tag(path),
        Some(path) => read_version_tag(path),
        None => extract_version_tag(Path::new(".")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_package_json_version() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "test-package", "version": "1.2.3", "description": "Test package"}"#,
        )
        .expect("write manifest");

        assert_eq!(extract_version_tag(dir.path()).expect("version"), "v1.2.3");
    }

    #[test]
    fn test_cargo_toml_version() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"demo\"\nversion = \"0.4.0\"\n",
        )
        .expect("write manifest");

        assert_eq!(extract_version_tag(dir.path()).expect("version"), "v0.4.0");
    }

    #[test]
    fn test_workspace_version() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("Cargo.toml");
        fs::write(&path, "[workspace.package]\nversion = \"2.0.1\"\n").expect("write manifest");

        assert_eq!(read_version_tag(&path).expect("version"), "v2.0.1");
    }

    #[test]
    fn test_explicit_path_may_be_file_or_dir() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"version": "v3.1.0"}"#).expect("write manifest");

        assert_eq!(version_tag_from(Some(&path)).expect("file"), "v3.1.0");
        assert_eq!(version_tag_from(Some(dir.path())).expect("dir"), "v3.1.0");
    }

    #[test]
    fn test_missing_manifest() {
        let dir = TempDir::new().expect("temp dir");
        let err = extract_version_tag(dir.path()).expect_err("no manifest present");
        assert!(matches!(err, HeraldError::Manifest { .. }));
    }

    #[test]
    fn test_missing_version_field() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"name": "test-package"}"#).expect("write manifest");

        let err = read_version_tag(&path).expect_err("no version field");
        assert!(err.to_string().contains("no version field"));
    }
}
