//! Bare-module resolution for `/@modules/` requests.
//!
//! Maps a package name to one browser-targeted entry file under the
//! project's `node_modules` directory. The map is pluggable: explicit
//! entries win, and unknown names fall back to the package manifest's
//! `module`/`main` field. Failed lookups are hard errors — a request
//! inside the reserved namespace must never fall through to static
//! serving.

use crate::error::Error;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Bare-name → physical-entry-path map.
#[derive(Debug, Clone)]
pub struct ModuleMap {
    /// Dependency directory (`<root>/node_modules`).
    dir: PathBuf,
    /// Explicit entries, keyed by package name.
    entries: HashMap<String, PathBuf>,
}

impl ModuleMap {
    /// Create an empty map rooted at `root`'s dependency directory.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join("node_modules"),
            entries: HashMap::new(),
        }
    }

    /// Create a map pre-seeded with the `vue` browser runtime entry.
    #[must_use]
    pub fn with_defaults(root: &Path) -> Self {
        let mut map = Self::new(root);
        map.insert(
            "vue",
            "@vue/runtime-dom/dist/runtime-dom.esm-browser.js",
        );
        map
    }

    /// Register an entry. Relative paths are taken relative to the
    /// dependency directory.
    pub fn insert(&mut self, name: impl Into<String>, entry: impl AsRef<Path>) {
        let entry = entry.as_ref();
        let path = if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            self.dir.join(entry)
        };
        self.entries.insert(name.into(), path);
    }

    /// The dependency directory this map resolves against.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a bare name to its physical entry file.
    ///
    /// Explicit entries take precedence; otherwise the package's
    /// `package.json` `module` (preferred) or `main` field is consulted.
    pub fn resolve(&self, name: &str) -> crate::Result<PathBuf> {
        if let Some(path) = self.entries.get(name) {
            return Ok(path.clone());
        }
        self.resolve_from_manifest(name)
            .ok_or_else(|| Error::UnresolvedModule {
                name: name.to_string(),
                dir: self.dir.clone(),
            })
    }

    /// Read the resolved entry file's full contents.
    pub fn load(&self, name: &str) -> crate::Result<String> {
        let path = self.resolve(name)?;
        fs::read_to_string(&path).map_err(|source| Error::Read { path, source })
    }

    /// Entry lookup via the package manifest's `module`/`main` field.
    fn resolve_from_manifest(&self, name: &str) -> Option<PathBuf> {
        let pkg_dir = self.dir.join(name);
        let manifest = fs::read_to_string(pkg_dir.join("package.json")).ok()?;
        let manifest: serde_json::Value = serde_json::from_str(&manifest).ok()?;

        let entry = manifest
            .get("module")
            .or_else(|| manifest.get("main"))
            .and_then(|v| v.as_str())?;

        let path = pkg_dir.join(entry);
        path.is_file().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_explicit_entry_resolves() {
        let tmp = tempfile::tempdir().unwrap();
        let entry = tmp
            .path()
            .join("node_modules/@vue/runtime-dom/dist/runtime-dom.esm-browser.js");
        write(&entry, "export const createApp = () => {};\n");

        let map = ModuleMap::with_defaults(tmp.path());
        assert_eq!(map.resolve("vue").unwrap(), entry);
        assert_eq!(
            map.load("vue").unwrap(),
            "export const createApp = () => {};\n"
        );
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let map = ModuleMap::with_defaults(tmp.path());
        let err = map.resolve("unknown-pkg").unwrap_err();
        assert!(matches!(err, Error::UnresolvedModule { ref name, .. } if name == "unknown-pkg"));
    }

    #[test]
    fn test_manifest_module_field_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("node_modules/leftpad");
        write(
            &pkg.join("package.json"),
            r#"{"name":"leftpad","module":"dist/index.mjs","main":"dist/index.cjs"}"#,
        );
        write(&pkg.join("dist/index.mjs"), "export default 1;\n");

        let map = ModuleMap::new(tmp.path());
        assert_eq!(map.resolve("leftpad").unwrap(), pkg.join("dist/index.mjs"));
    }

    #[test]
    fn test_manifest_main_field_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("node_modules/plain");
        write(&pkg.join("package.json"), r#"{"main":"index.js"}"#);
        write(&pkg.join("index.js"), "module.exports = 1;\n");

        let map = ModuleMap::new(tmp.path());
        assert_eq!(map.resolve("plain").unwrap(), pkg.join("index.js"));
    }

    #[test]
    fn test_manifest_entry_pointing_nowhere_is_unresolved() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("node_modules/ghost");
        write(&pkg.join("package.json"), r#"{"main":"missing.js"}"#);

        let map = ModuleMap::new(tmp.path());
        assert!(matches!(
            map.resolve("ghost").unwrap_err(),
            Error::UnresolvedModule { .. }
        ));
    }

    #[test]
    fn test_explicit_entry_missing_file_is_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let map = ModuleMap::with_defaults(tmp.path());
        // Mapped but the file itself is absent.
        assert!(matches!(map.load("vue").unwrap_err(), Error::Read { .. }));
    }
}
