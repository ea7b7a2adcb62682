//! Namespaced identifiers (`Acme::Widgets::Gear`).

use std::fmt;
use std::fmt::{Display, Formatter};

pub const PATH_SEPARATOR: &str = "::";

/// An ordered, non-empty sequence of name segments.
///
/// Identifiers are immutable; every operation that "changes" one returns a new
/// value. The first segment is treated as the owning namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    segments: Vec<String>,
}

impl Identifier {
    /// Build an identifier from its segments. Returns `None` for an empty
    /// sequence or if any segment is empty.
    pub fn new(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            None
        } else {
            Some(Identifier { segments })
        }
    }

    /// Parse `A::B::C`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::new(s.trim().split(PATH_SEPARATOR).map(str::to_string).collect())
    }

    /// Single-segment identifier; `name` comes from the parser and is never empty.
    pub(crate) fn single(name: &str) -> Self {
        Identifier {
            segments: vec![name.to_string()],
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment.
    pub fn namespace(&self) -> &str {
        &self.segments[0]
    }

    /// The last segment.
    pub fn name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Everything after the namespace segment. Empty for single-segment identifiers.
    pub fn tail(&self) -> &[String] {
        &self.segments[1..]
    }

    /// `self::other`.
    pub fn join(&self, other: &Identifier) -> Identifier {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Identifier { segments }
    }

    /// `self::name`.
    pub fn child(&self, name: &str) -> Identifier {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Identifier { segments }
    }

    /// Appends `suffix` to the last segment: `Acme::Widget` + `Controller`
    /// gives `Acme::WidgetController`.
    pub fn with_suffix(&self, suffix: &str) -> Identifier {
        let mut segments = self.segments.clone();
        let last = segments.len() - 1;
        segments[last].push_str(suffix);
        Identifier { segments }
    }

    /// `segments[from..]` where `from` is known to be in range.
    pub(crate) fn rest_from(&self, from: usize) -> Identifier {
        Identifier {
            segments: self.segments[from..].to_vec(),
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(PATH_SEPARATOR))
    }
}
