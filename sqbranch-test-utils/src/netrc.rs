//! `.netrc` isolation for credential tests

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// RAII guard for test `.netrc` files
///
/// Creates a temporary HOME containing a `.netrc` with the given content and
/// restores the original HOME when dropped.
pub struct NetrcGuard {
  temp_dir: TempDir,
  netrc_path: PathBuf,
  original_home: Option<OsString>,
}

impl NetrcGuard {
  /// Create a new NetrcGuard with the given content
  pub fn new(content: &str) -> Self {
    let original_home = env::var_os("HOME");

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let netrc_path = temp_dir.path().join(".netrc");
    fs::write(&netrc_path, content).expect("Failed to write test .netrc");

    unsafe {
      env::set_var("HOME", temp_dir.path());
    }

    Self {
      temp_dir,
      netrc_path,
      original_home,
    }
  }

  /// Get the path to the .netrc file
  pub fn netrc_path(&self) -> &Path {
    &self.netrc_path
  }
}

impl Drop for NetrcGuard {
  fn drop(&mut self) {
    match &self.original_home {
      Some(home) => unsafe {
        env::set_var("HOME", home);
      },
      None => unsafe {
        env::remove_var("HOME");
      },
    }
  }
}
