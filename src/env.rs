//! Process environment abstraction for testability.
//!
//! Production code uses [`Env::real()`] which asks the operating system for
//! the current working directory and the invoking user's home directory.
//! Tests use [`Env::mock()`] with explicit directories, eliminating the need
//! to `chdir` the test process or rewrite `$HOME`.

use std::io;
use std::path::PathBuf;

/// Working-directory and home-directory lookup.
///
/// A `None` override means "ask the OS". A `Some(None)` override simulates a
/// lookup that fails: no resolvable home, or an unreadable working directory.
#[derive(Clone, Debug, Default)]
pub struct Env {
    current_dir: Option<Option<PathBuf>>,
    home_dir: Option<Option<PathBuf>>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self::default()
    }

    /// Create an `Env` backed by explicit directories.
    pub fn mock(current_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: Some(Some(current_dir.into())),
            home_dir: Some(Some(home_dir.into())),
        }
    }

    /// Pretend the invoking user has no home directory.
    pub fn without_home(mut self) -> Self {
        self.home_dir = Some(None);
        self
    }

    /// Pretend the working directory cannot be determined, as when it has
    /// been removed underneath the process.
    pub fn without_current_dir(mut self) -> Self {
        self.current_dir = Some(None);
        self
    }

    /// The process's current working directory.
    pub fn current_dir(&self) -> io::Result<PathBuf> {
        match &self.current_dir {
            Some(Some(dir)) => Ok(dir.clone()),
            Some(None) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "current directory is not available",
            )),
            None => std::env::current_dir(),
        }
    }

    /// The invoking user's home directory, if one can be determined.
    pub fn home_dir(&self) -> Option<PathBuf> {
        match &self.home_dir {
            Some(home) => home.clone(),
            None => dirs::home_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_env_reads_current_dir() {
        let env = Env::real();
        assert_eq!(env.current_dir().unwrap(), std::env::current_dir().unwrap());
    }

    #[test]
    fn mock_env_returns_set_values() {
        let env = Env::mock("/work", "/home/alice");
        assert_eq!(env.current_dir().unwrap(), PathBuf::from("/work"));
        assert_eq!(env.home_dir(), Some(PathBuf::from("/home/alice")));
    }

    #[test]
    fn without_home_hides_home_dir() {
        let env = Env::mock("/work", "/home/alice").without_home();
        assert!(env.home_dir().is_none());
        assert!(env.current_dir().is_ok());
    }

    #[test]
    fn without_current_dir_fails_lookup() {
        let env = Env::mock("/work", "/home/alice").without_current_dir();
        let err = env.current_dir().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(env.home_dir(), Some(PathBuf::from("/home/alice")));
    }
}
