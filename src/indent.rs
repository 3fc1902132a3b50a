// SPDX-License-Identifier: MIT OR Apache-2.0

//! Indentation strategies.
//!
//! An [`IndentStrategy`] turns the depth stack of a [`ScopeLogger`](crate::ScopeLogger)
//! into the prefix written in front of each message. Strategies are pure: the same
//! stack always renders the same prefix.
//!
//! | Strategy           | `[1]`  | `[1, 2]`  | `[1, 2, 3]`   |
//! |--------------------|--------|-----------|---------------|
//! | [`NoneIndent`]     | `""`   | `""`      | `""`          |
//! | [`SpaceIndent`]    | `""`   | `" "`     | `"  "`        |
//! | [`NumberedIndent`] | `"1. "`| `"1. 2. "`| `"1. 2. 3. "` |
//!
//! ```rust
//! use scopelog::{IndentStrategy, NumberedIndent, SpaceIndent};
//!
//! assert_eq!(NumberedIndent.render(&[1, 2, 3]), "1. 2. 3. ");
//! assert_eq!(SpaceIndent::new("-").render(&[0, 1]), "-");
//! ```

use std::fmt::Debug;
use std::sync::Arc;

/// Renders a depth stack into a line prefix.
pub trait IndentStrategy: Debug + Send + Sync {
    /**
    Renders the prefix for a line logged at `depth`.

    `depth` is never empty; the first element is the root counter.
    */
    fn render(&self, depth: &[u32]) -> String;
}

/// Renders nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NoneIndent;

impl IndentStrategy for NoneIndent {
    #[inline]
    fn render(&self, _depth: &[u32]) -> String {
        String::new()
    }
}

/// Repeats a fill string once per level below the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpaceIndent {
    fill: String,
}

impl SpaceIndent {
    pub fn new(fill: impl Into<String>) -> Self {
        Self { fill: fill.into() }
    }

    pub fn fill(&self) -> &str {
        &self.fill
    }
}

impl Default for SpaceIndent {
    fn default() -> Self {
        Self::new(" ")
    }
}

impl IndentStrategy for SpaceIndent {
    fn render(&self, depth: &[u32]) -> String {
        self.fill.repeat(depth.len().saturating_sub(1))
    }
}

/// Outline numbering, one `"{n}. "` per counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NumberedIndent;

impl IndentStrategy for NumberedIndent {
    fn render(&self, depth: &[u32]) -> String {
        let mut out = String::with_capacity(depth.len() * 3);
        for counter in depth {
            out.push_str(&counter.to_string());
            out.push_str(". ");
        }
        out
    }
}

/// A shared [`NoneIndent`].
pub fn none_indent() -> Arc<dyn IndentStrategy> {
    Arc::new(NoneIndent)
}

/// A shared [`SpaceIndent`] with the given fill.
///
/// The default fill is a single space, the same as [`SpaceIndent::default`]:
///
/// ```
/// use scopelog::{IndentStrategy, SpaceIndent, space_indent};
///
/// assert_eq!(space_indent(" ").render(&[1, 2, 3]), "  ");
/// assert_eq!(SpaceIndent::default().fill(), " ");
/// ```
pub fn space_indent(fill: impl Into<String>) -> Arc<dyn IndentStrategy> {
    Arc::new(SpaceIndent::new(fill))
}

/// A shared [`NumberedIndent`].
pub fn numbered_indent() -> Arc<dyn IndentStrategy> {
    Arc::new(NumberedIndent)
}
