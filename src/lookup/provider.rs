//! Type providers: where types that are not compiled from source come from.
//!
//! A provider answers "given a qualified name, return the declaring stub
//! source or nothing". Providers with a `module-info.java` form a named
//! module; the others contribute to the unnamed module (the classpath).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::consts::{MODULE_INFO_FILE, PACKAGE_INFO_FILE};
use crate::error::{Error, Result};

/// Source text of an external compilation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSource {
    /// `file:///abs/p/X.java` or `memory:<entry>/p/X.java`.
    pub uri: String,
    pub source: String,
}

pub trait TypeProvider {
    /// Display name used in logs.
    fn name(&self) -> &str;

    /// The module descriptor source, when this entry is a module.
    fn module_source(&self) -> Option<TypeSource>;

    /// Packages that hold at least one type.
    fn packages(&self) -> Vec<String>;

    /// The unit declaring the top-level type `qualified_name`.
    fn find_type(&self, qualified_name: &str) -> Option<TypeSource>;

    fn has_package(&self, package: &str) -> bool {
        self.packages().iter().any(|p| p == package)
    }

    /// Source of `package-info.java` for `package`, if any.
    fn package_info(&self, package: &str) -> Option<TypeSource> {
        let _ = package;
        None
    }
}

/// `p/q/X.java` to `("p.q", "X")`.
fn split_relative(path: &str) -> Option<(String, String)> {
    let stem = path.strip_suffix(".java")?;
    let mut parts: Vec<&str> = stem.split('/').filter(|s| !s.is_empty()).collect();
    let name = parts.pop()?.to_string();
    Some((parts.join("."), name))
}

fn relative_path(qualified_name: &str) -> String {
    format!("{}.java", qualified_name.replace('.', "/"))
}

/// Split a `:`-separated (`;` on Windows) classpath string into entries.
pub fn parse_classpath_entries(classpath: &str) -> Vec<String> {
    let separator = if cfg!(windows) { ';' } else { ':' };
    classpath
        .split(separator)
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// A directory tree of stub sources.
pub struct DirectoryProvider {
    name: String,
    root: PathBuf,
    /// Relative `/`-separated paths of all `.java` files.
    files: BTreeSet<String>,
}

impl DirectoryProvider {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let unreadable = |reason: String| Error::UnreadableClasspath { path: root.to_path_buf(), reason };
        let metadata = fs::metadata(root).map_err(|e| unreadable(e.to_string()))?;
        if !metadata.is_dir() {
            return Err(unreadable("not a directory".to_string()));
        }
        let root = root.canonicalize().map_err(|e| unreadable(e.to_string()))?;

        let mut files = BTreeSet::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| unreadable(e.to_string()))?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().map(|e| e == "java").unwrap_or(false) {
                if let Ok(relative) = path.strip_prefix(&root) {
                    let relative: Vec<String> =
                        relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
                    files.insert(relative.join("/"));
                }
            }
        }
        log::debug!("classpath directory {} holds {} source files", root.display(), files.len());
        Ok(Self { name: root.display().to_string(), root, files })
    }

    fn read(&self, relative: &str) -> Option<TypeSource> {
        if !self.files.contains(relative) {
            return None;
        }
        let path = self.root.join(relative);
        match fs::read_to_string(&path) {
            Ok(source) => Some(TypeSource { uri: format!("file://{}", path.display()), source }),
            Err(err) => {
                log::warn!("cannot read {}: {}", path.display(), err);
                None
            }
        }
    }
}

impl TypeProvider for DirectoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_source(&self) -> Option<TypeSource> {
        self.read(MODULE_INFO_FILE)
    }

    fn packages(&self) -> Vec<String> {
        packages_of(self.files.iter().map(|f| f.as_str()))
    }

    fn find_type(&self, qualified_name: &str) -> Option<TypeSource> {
        self.read(&relative_path(qualified_name))
    }

    fn package_info(&self, package: &str) -> Option<TypeSource> {
        let relative = if package.is_empty() {
            PACKAGE_INFO_FILE.to_string()
        } else {
            format!("{}/{}", package.replace('.', "/"), PACKAGE_INFO_FILE)
        };
        self.read(&relative)
    }
}

fn packages_of<'a>(paths: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut packages = BTreeSet::new();
    for path in paths {
        if path.ends_with(MODULE_INFO_FILE) || path.ends_with(PACKAGE_INFO_FILE) {
            continue;
        }
        if let Some((package, _)) = split_relative(path) {
            packages.insert(package);
        }
    }
    packages.into_iter().collect()
}

/// Stub sources held in memory, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    name: String,
    files: BTreeMap<String, String>,
}

impl InMemoryProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), files: BTreeMap::new() }
    }

    /// Add a file such as `("p/X.java", "package p; public class X {}")`.
    pub fn with_file(mut self, path: &str, source: &str) -> Self {
        self.add_file(path, source);
        self
    }

    pub fn add_file(&mut self, path: &str, source: &str) {
        self.files.insert(path.trim_start_matches('/').to_string(), source.to_string());
    }

    pub fn with_module(self, source: &str) -> Self {
        self.with_file(MODULE_INFO_FILE, source)
    }

    fn read(&self, relative: &str) -> Option<TypeSource> {
        self.files.get(relative).map(|source| TypeSource {
            uri: format!("memory:{}/{}", self.name, relative),
            source: source.clone(),
        })
    }
}

impl TypeProvider for InMemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_source(&self) -> Option<TypeSource> {
        self.read(MODULE_INFO_FILE)
    }

    fn packages(&self) -> Vec<String> {
        packages_of(self.files.keys().map(|k| k.as_str()))
    }

    fn find_type(&self, qualified_name: &str) -> Option<TypeSource> {
        self.read(&relative_path(qualified_name))
    }

    fn package_info(&self, package: &str) -> Option<TypeSource> {
        let relative = if package.is_empty() {
            PACKAGE_INFO_FILE.to_string()
        } else {
            format!("{}/{}", package.replace('.', "/"), PACKAGE_INFO_FILE)
        };
        self.read(&relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_lookup_by_qualified_name() {
        let provider = InMemoryProvider::new("lib")
            .with_file("p/q/X.java", "package p.q; public class X {}")
            .with_file("Top.java", "public class Top {}");
        let found = provider.find_type("p.q.X").expect("X is provided");
        assert_eq!(found.uri, "memory:lib/p/q/X.java");
        assert!(provider.find_type("p.q.Y").is_none());
        assert_eq!(provider.packages(), vec!["".to_string(), "p.q".to_string()]);
        assert!(provider.module_source().is_none());
    }

    #[test]
    fn directory_provider_reads_tree() {
        let dir = tempfile::tempdir().expect("temp dir");
        let package = dir.path().join("a").join("b");
        fs::create_dir_all(&package).expect("package dirs");
        fs::write(package.join("C.java"), "package a.b; public class C {}").expect("write stub");
        fs::write(dir.path().join(MODULE_INFO_FILE), "module lib { exports a.b; }").expect("write module");

        let provider = DirectoryProvider::new(dir.path()).expect("readable");
        assert_eq!(provider.packages(), vec!["a.b".to_string()]);
        let found = provider.find_type("a.b.C").expect("C is provided");
        assert!(found.uri.starts_with("file://"));
        assert!(found.uri.ends_with("a/b/C.java"));
        assert!(provider.module_source().is_some());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let err = DirectoryProvider::new("/definitely/not/here").err().expect("missing dir");
        assert!(matches!(err, Error::UnreadableClasspath { .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn classpath_entries_split_and_trim() {
        let separator = if cfg!(windows) { ";" } else { ":" };
        let joined = format!("lib1{sep} lib2 {sep}{sep}", sep = separator);
        assert_eq!(parse_classpath_entries(&joined), vec!["lib1".to_string(), "lib2".to_string()]);
    }
}
