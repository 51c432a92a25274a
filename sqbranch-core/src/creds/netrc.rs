//! Helpers for reading and writing credentials stored in `.netrc` files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::Credentials;

/// Returns the path to the `.netrc` file for the provided home directory.
///
/// ```
/// use std::path::Path;
/// use sqbranch_core::creds::netrc::netrc_path_in;
///
/// assert_eq!(netrc_path_in(Path::new("/home/user")), Path::new("/home/user/.netrc"));
/// ```
pub fn netrc_path_in(home: &Path) -> PathBuf {
  home.join(".netrc")
}

/// Parses a `.netrc` file and returns credentials for the requested machine.
///
/// Both single-line (`machine host login token`) and multi-line layouts are
/// accepted, and lines starting with `#` are ignored. An entry needs a
/// `login`; the `password` is optional because SonarQube tokens are stored as
/// the login alone.
///
/// # Arguments
///
/// * `path` - Location of the `.netrc` file
/// * `target_machine` - Machine name as produced by [`normalize_host`]
///
/// # Returns
///
/// * `Ok(Some(Credentials))` when the machine has a `login`.
/// * `Ok(None)` when the entry is missing or has no `login`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn parse_netrc_file(path: &Path, target_machine: &str) -> Result<Option<Credentials>> {
  let content = fs::read_to_string(path).context("Failed to read .netrc file")?;
  Ok(parse_netrc(&content, target_machine))
}

const KEYWORDS: [&str; 4] = ["machine", "default", "login", "password"];

fn parse_netrc(content: &str, target_machine: &str) -> Option<Credentials> {
  let mut in_target = false;
  let mut login: Option<String> = None;
  let mut password: Option<String> = None;

  for line in content.lines() {
    let line = line.trim();
    if line.starts_with('#') {
      continue;
    }

    // Values are only read from the same line, and never a keyword.
    let parts: Vec<&str> = line.split_whitespace().collect();
    let mut i = 0;
    while i < parts.len() {
      let keyword = parts[i];
      let value = parts.get(i + 1).copied().filter(|value| !KEYWORDS.contains(value));

      match keyword {
        "machine" | "default" => {
          if in_target && let Some(login) = login.take() {
            return Some(Credentials { login, password });
          }
          in_target = keyword == "machine" && value == Some(target_machine);
          login = None;
          password = None;
          if keyword == "machine" && value.is_some() {
            i += 1;
          }
        }
        "login" | "password" => {
          let slot = if keyword == "login" { &mut login } else { &mut password };
          *slot = value.map(str::to_string);
          if value.is_some() {
            i += 1;
          }
        }
        _ => {}
      }
      i += 1;
    }
  }

  if in_target && let Some(login) = login {
    return Some(Credentials { login, password });
  }

  None
}

/// Writes or updates a `.netrc` entry for the given machine.
///
/// An existing entry for the machine is replaced, otherwise a new entry is
/// appended. On Unix the file is restricted to mode `600`.
///
/// # Arguments
///
/// * `path` - Location of the `.netrc` file, created when missing
/// * `machine` - Machine name the entry is stored under
/// * `credentials` - Login and optional password to store
///
/// # Errors
///
/// Returns an error if the file cannot be read, written or restricted.
pub fn write_netrc_entry(path: &Path, machine: &str, credentials: &Credentials) -> Result<()> {
  let existing_content = if path.exists() {
    fs::read_to_string(path).context("Failed to read existing .netrc file")?
  } else {
    String::new()
  };

  let mut entry = format!("machine {machine}\n  login {}\n", credentials.login);
  if let Some(password) = &credentials.password {
    entry.push_str(&format!("  password {password}\n"));
  }

  let machine_line = format!("machine {machine}");
  let machine_exists = existing_content.lines().any(|line| {
    let trimmed = line.trim();
    trimmed == machine_line || trimmed.starts_with(&format!("{machine_line} "))
  });

  if machine_exists {
    let mut new_content = String::new();
    let mut skipping = false;

    for line in existing_content.lines() {
      let trimmed = line.trim();
      if trimmed.starts_with("machine ") || trimmed.starts_with("default") {
        skipping = trimmed == machine_line || trimmed.starts_with(&format!("{machine_line} "));
        if skipping {
          new_content.push_str(&entry);
          continue;
        }
      }
      if !skipping {
        new_content.push_str(line);
        new_content.push('\n');
      }
    }

    fs::write(path, new_content).context("Failed to write updated .netrc file")?;
  } else {
    let mut file = fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .context("Failed to open .netrc file for writing")?;

    if !existing_content.is_empty() && !existing_content.ends_with('\n') {
      writeln!(file)?;
    }
    file.write_all(entry.as_bytes()).context("Failed to append to .netrc file")?;
  }

  set_secure_permissions(path)
}

#[cfg(unix)]
fn set_secure_permissions(path: &Path) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;

  let mut perms = fs::metadata(path).context("Failed to get file metadata")?.permissions();
  perms.set_mode(0o600);
  fs::set_permissions(path, perms).context("Failed to set secure permissions")
}

#[cfg(not(unix))]
fn set_secure_permissions(_path: &Path) -> Result<()> {
  Ok(())
}

/// Normalizes a server URL to the host used as the `.netrc` machine name.
///
/// ```
/// use sqbranch_core::creds::normalize_host;
///
/// assert_eq!(normalize_host("https://sonarcloud.io/"), "sonarcloud.io");
/// assert_eq!(normalize_host("http://localhost:9000/sonar"), "localhost:9000");
/// ```
pub fn normalize_host(raw_host: &str) -> String {
  let without_scheme = raw_host.trim_start_matches("https://").trim_start_matches("http://");
  without_scheme
    .split('/')
    .next()
    .unwrap_or(without_scheme)
    .to_string()
}
