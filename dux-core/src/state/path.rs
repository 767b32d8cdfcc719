//! Paths into the state tree.
//!
//! A path is an ordered list of segments. Callers usually write it as a
//! dotted string (`"user.name"`) but may also pass pre-split segments. The
//! empty path is the whole-state sentinel and is spelled `"."` (or `""`).

use std::fmt;

use smallvec::SmallVec;

use super::value::Value;

/// A location in the state tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: SmallVec<[String; 4]>,
}

impl Path {
    /// The whole-state path.
    pub fn whole() -> Self {
        Self::default()
    }

    /// Parse a dotted path. `"."` and `""` are the whole-state path.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() || path == "." {
            return Self::whole();
        }
        Self {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn is_whole(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Append `other` to this path. Joining with the whole path is a no-op.
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Path { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            f.write_str(".")
        } else {
            f.write_str(&self.segments.join("."))
        }
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Path::parse(path)
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        Path::parse(&path)
    }
}

impl From<&String> for Path {
    fn from(path: &String) -> Self {
        Path::parse(path)
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Path {
            segments: segments.into_iter().collect(),
        }
    }
}

impl From<&[&str]> for Path {
    fn from(segments: &[&str]) -> Self {
        Path {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(segments: [&str; N]) -> Self {
        Path::from(&segments[..])
    }
}

/// Resolve `path` against `root`.
///
/// Walks the segments in order. As soon as the current value is falsy the
/// walk stops and that value is returned, so `{a: 0}` resolves `"a.b"` to
/// `0`, and a missing key resolves to `Undefined`. Never fails.
pub fn resolve(root: &Value, path: &Path) -> Value {
    let mut current = root.clone();
    for segment in path.segments() {
        if !current.is_truthy() {
            return current;
        }
        current = current.index(segment);
    }
    current
}
