//! Commit distance between HEAD and a candidate branch.
//!
//! Histories are compared as two newest-first lists; merge topology is
//! ignored. The distance is the smallest `i + j` where `head[i]` equals
//! `candidate[j]`, searched in order of `i` so the first hit wins.

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;

use super::CommitId;

/// Number of commits separating HEAD from a candidate branch.
///
/// `NoMatch` orders after every finite distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distance {
  Commits(usize),
  NoMatch,
}

impl Distance {
  pub const fn is_match(self) -> bool {
    matches!(self, Self::Commits(_))
  }

  /// Largest number of commits a search bounded by `self` may report.
  const fn bound(self) -> usize {
    match self {
      Self::Commits(n) => n,
      Self::NoMatch => usize::MAX,
    }
  }
}

impl fmt::Display for Distance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Commits(n) => write!(f, "{n}"),
      Self::NoMatch => f.write_str("no match"),
    }
  }
}

/// Compute the distance from `head_commits` to `candidate_history`.
///
/// `head_commits` is HEAD's history, newest first, already materialised so it
/// can be shared across candidates. `candidate_history` is pulled lazily and
/// never further than `current_best` entries. The result is either
/// [`Distance::NoMatch`] or strictly smaller than `current_best`.
pub fn compute_distance<I>(head_commits: &[CommitId], candidate_history: I, current_best: Distance) -> Result<Distance>
where
  I: IntoIterator<Item = Result<CommitId>>,
{
  let bound = current_best.bound();
  let mut history = candidate_history.into_iter();
  let mut positions: HashMap<CommitId, usize> = HashMap::new();
  let mut consumed = 0usize;
  let mut exhausted = false;

  for (i, head_commit) in head_commits.iter().enumerate() {
    if i >= bound {
      break;
    }
    let window = bound - i;

    if let Some(&j) = positions.get(head_commit)
      && j < window
    {
      return Ok(Distance::Commits(i + j));
    }

    while !exhausted && consumed < window {
      match history.next() {
        Some(commit) => {
          let commit = commit?;
          let j = consumed;
          consumed += 1;
          if commit == *head_commit {
            return Ok(Distance::Commits(i + j));
          }
          positions.entry(commit).or_insert(j);
        }
        None => exhausted = true,
      }
    }
  }

  Ok(Distance::NoMatch)
}
