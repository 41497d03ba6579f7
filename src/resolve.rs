//! Config file location.
//!
//! A file reference (usually from `--config`) is looked up in order:
//! 1. As given, made absolute against the current working directory.
//! 2. Under the invoking user's home directory.
//!
//! When neither exists, a default file is written under the home directory
//! from the store's current (default-seeded) tree, and that path is used.
//! This lets one binary work from an explicit path, from a repo-local file
//! during development, and from a per-user file once installed.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::constants::DEFAULT_FILE_MODE;
use crate::env::Env;
use crate::store::{Store, StoreError};

/// Errors while locating the config file.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("config file path not specified")]
    NoReference,

    #[error("failed to determine current directory: {source}")]
    CurrentDir { source: io::Error },

    #[error("failed to determine home directory of the current user")]
    HomeDir,

    #[error("failed to create default config file {path}: {source}")]
    Create { path: PathBuf, source: StoreError },
}

/// Lexically normalise a path: drop `.`, fold `..` into its parent.
///
/// `..` never climbs above the root of an absolute path; leading `..` of a
/// relative path are kept. The filesystem is not consulted.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Join `reference` under `base`, even when `reference` is absolute.
fn join_under(base: &Path, reference: &Path) -> PathBuf {
    let relative: PathBuf = reference
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    clean_path(&base.join(relative))
}

/// Locates, or creates, the config file for a reference.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    env: Env,
}

impl PathResolver {
    pub fn new(env: Env) -> Self {
        Self { env }
    }

    /// Resolve `reference` to the absolute path of an existing file.
    ///
    /// May write a new default file through `store` (see the module docs).
    pub fn resolve(&self, reference: &str, store: &dyn Store) -> Result<PathBuf, ResolveError> {
        if reference.is_empty() {
            return Err(ResolveError::NoReference);
        }
        let reference = Path::new(reference);

        let direct = if reference.is_absolute() {
            clean_path(reference)
        } else {
            let cwd = self
                .env
                .current_dir()
                .map_err(|source| ResolveError::CurrentDir { source })?;
            clean_path(&cwd.join(reference))
        };
        if direct.exists() {
            return Ok(direct);
        }
        tracing::info!(
            path = %direct.display(),
            "config file not found, looking in home directory"
        );

        let home = self.env.home_dir().ok_or(ResolveError::HomeDir)?;
        let in_home = join_under(&home, reference);
        if in_home.exists() {
            return Ok(in_home);
        }

        tracing::info!(
            path = %in_home.display(),
            "config file not found in home directory, creating it"
        );
        store
            .write_config_file(&in_home, DEFAULT_FILE_MODE)
            .map_err(|source| ResolveError::Create {
                path: in_home.clone(),
                source,
            })?;
        Ok(in_home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ConfigNode;
    use crate::store::YamlStore;
    use pretty_assertions::assert_eq;

    struct Dirs {
        _root: tempfile::TempDir,
        cwd: PathBuf,
        home: PathBuf,
    }

    fn dirs() -> Dirs {
        let root = tempfile::tempdir().unwrap();
        let cwd = root.path().join("work");
        let home = root.path().join("home");
        std::fs::create_dir_all(&cwd).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        Dirs {
            _root: root,
            cwd,
            home,
        }
    }

    #[test]
    fn clean_path_folds_dots() {
        assert_eq!(clean_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(clean_path(Path::new("../a/..")), PathBuf::from(".."));
        assert_eq!(clean_path(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(clean_path(Path::new("./a//b/")), PathBuf::from("a/b"));
    }

    #[test]
    fn join_under_strips_the_root() {
        assert_eq!(
            join_under(Path::new("/home/u"), Path::new("/etc/app.yaml")),
            PathBuf::from("/home/u/etc/app.yaml")
        );
        assert_eq!(
            join_under(Path::new("/home/u"), Path::new("../x.yaml")),
            PathBuf::from("/home/x.yaml")
        );
    }

    #[test]
    fn empty_reference_is_rejected() {
        let err = PathResolver::default()
            .resolve("", &YamlStore::new())
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoReference));
    }

    #[test]
    fn absolute_reference_skips_cwd_and_home() {
        let d = dirs();
        let file = d.cwd.join("app.yaml");
        std::fs::write(&file, "a: 1\n").unwrap();

        // Neither directory lookup may be consulted.
        let env = Env::mock("/nonexistent-cwd", "/nonexistent-home").without_home();
        let resolver = PathResolver::new(env);
        let reference = format!("{}/./app.yaml", d.cwd.display());
        let path = resolver.resolve(&reference, &YamlStore::new()).unwrap();
        assert_eq!(path, file);
    }

    #[test]
    fn relative_reference_resolves_against_cwd() {
        let d = dirs();
        std::fs::create_dir_all(d.cwd.join("conf")).unwrap();
        std::fs::write(d.cwd.join("conf/app.yaml"), "a: 1\n").unwrap();

        let resolver = PathResolver::new(Env::mock(&d.cwd, &d.home));
        let path = resolver.resolve("conf/../conf/app.yaml", &YamlStore::new()).unwrap();
        assert_eq!(path, d.cwd.join("conf/app.yaml"));
    }

    #[test]
    fn falls_back_to_existing_home_file() {
        let d = dirs();
        std::fs::write(d.home.join(".app.yaml"), "a: 1\n").unwrap();

        let resolver = PathResolver::new(Env::mock(&d.cwd, &d.home));
        let path = resolver.resolve(".app.yaml", &YamlStore::new()).unwrap();
        assert_eq!(path, d.home.join(".app.yaml"));
    }

    #[test]
    fn creates_default_file_in_home() {
        let d = dirs();
        let store = YamlStore::new();
        store.set("server:port", ConfigNode::Int(8080));

        let resolver = PathResolver::new(Env::mock(&d.cwd, &d.home));
        let path = resolver.resolve(".config/app/app.yaml", &store).unwrap();

        assert_eq!(path, d.home.join(".config/app/app.yaml"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("port: 8080"), "got: {written}");
    }

    #[test]
    fn second_resolve_reuses_created_file() {
        let d = dirs();
        let store = YamlStore::new();
        let resolver = PathResolver::new(Env::mock(&d.cwd, &d.home));

        let first = resolver.resolve("app.yaml", &store).unwrap();
        std::fs::write(&first, "marker: true\n").unwrap();
        let second = resolver.resolve("app.yaml", &store).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "marker: true\n");
    }

    #[test]
    fn missing_home_is_an_error() {
        let d = dirs();
        let resolver = PathResolver::new(Env::mock(&d.cwd, &d.home).without_home());
        let err = resolver.resolve("app.yaml", &YamlStore::new()).unwrap_err();
        assert!(matches!(err, ResolveError::HomeDir));
    }

    #[test]
    fn unreadable_cwd_fails_relative_reference() {
        let d = dirs();
        let resolver = PathResolver::new(Env::mock(&d.cwd, &d.home).without_current_dir());
        let err = resolver.resolve("app.yaml", &YamlStore::new()).unwrap_err();
        assert!(matches!(err, ResolveError::CurrentDir { .. }));
        assert!(!d.home.join("app.yaml").exists());
    }

    #[test]
    fn unreadable_cwd_still_resolves_absolute_reference() {
        let d = dirs();
        let file = d.home.join("abs.yaml");
        std::fs::write(&file, "a: 1\n").unwrap();
        let resolver = PathResolver::new(Env::mock(&d.cwd, &d.home).without_current_dir());
        let path = resolver
            .resolve(&file.display().to_string(), &YamlStore::new())
            .unwrap();
        assert_eq!(path, file);
    }

    #[test]
    fn create_failure_names_the_path() {
        let d = dirs();
        // A file where the parent directory should be.
        std::fs::write(d.home.join("blocker"), "").unwrap();
        let resolver = PathResolver::new(Env::mock(&d.cwd, &d.home));

        let err = resolver
            .resolve("blocker/app.yaml", &YamlStore::new())
            .unwrap_err();
        assert!(matches!(err, ResolveError::Create { .. }));
        assert!(err.to_string().contains("blocker"));
    }
}
