//! Path filters and glob translation.
//!
//! Filters are shell globs matched against the full archived path:
//!
//! | Glob     | Matches                                   |
//! |----------|-------------------------------------------|
//! | `*`      | any run of characters, including `/`      |
//! | `?`      | exactly one character                     |
//! | `[abc]`  | one character from the class              |
//! | `[!abc]` | one character not in the class (or `[^`)  |
//!
//! Case-sensitive filters go to SQLite's native `GLOB` operator untouched
//! (apart from `[!` becoming `[^`). Case-insensitive filters are translated
//! to a `LIKE` pattern, which has no character classes, so `[` is rejected
//! there. Either way the pattern is validated up front so a bad filter fails
//! when the query is built, not halfway through reading the store.

use crate::error::{ErrorKind, Result};

/// Escape character used in translated `LIKE` patterns.
pub const LIKE_ESCAPE: char = '\\';

/// A single compiled path filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFilter {
    /// Pattern for SQLite's case-sensitive `GLOB` operator.
    Glob(String),
    /// Pattern for SQLite's (ASCII) case-insensitive `LIKE` operator, using
    /// [`LIKE_ESCAPE`].
    Like(String),
}
impl PathFilter {
    /// Compile a case-sensitive glob.
    pub fn new(glob: impl AsRef<str>) -> Result<Self> {
        let glob = glob.as_ref();
        validate_glob(glob)?;
        Ok(Self::Glob(normalize_negation(glob)))
    }

    /// Compile a case-insensitive glob.
    ///
    /// SQLite only folds ASCII letters, so `Ä` and `ä` are still distinct.
    pub fn case_insensitive(glob: impl AsRef<str>) -> Result<Self> {
        Ok(Self::Like(glob_to_like(glob.as_ref())?))
    }

    /// Compile either flavour.
    pub fn with_case(glob: impl AsRef<str>, case_sensitive: bool) -> Result<Self> {
        match case_sensitive {
            true => Self::new(glob),
            false => Self::case_insensitive(glob),
        }
    }

    /// Match exactly one literal path, whatever characters it contains.
    pub fn exact(path: impl AsRef<str>) -> Self {
        let path = path.as_ref();
        let mut pattern = String::with_capacity(path.len());
        for c in path.chars() {
            match c {
                // A single-character class is the only way to write a literal
                // metacharacter in a GLOB pattern.
                '*' | '?' | '[' => {
                    pattern.push('[');
                    pattern.push(c);
                    pattern.push(']');
                },
                _ => pattern.push(c),
            }
        }
        Self::Glob(pattern)
    }

    /// The compiled pattern, ready to be bound as a parameter.
    pub fn pattern(&self) -> &str {
        match self {
            Self::Glob(p) | Self::Like(p) => p,
        }
    }
}

/// Check that a glob is something SQLite's `GLOB` will interpret the way a
/// shell would.
///
/// Rejects empty patterns, NUL bytes and unterminated character classes.
pub fn validate_glob(glob: &str) -> Result<()> {
    if glob.is_empty() {
        exn::bail!(ErrorKind::InvalidFilter(glob.to_string()));
    }
    if glob.contains('\0') {
        exn::bail!(ErrorKind::InvalidFilter(glob.escape_default().to_string()));
    }
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '[' {
            continue;
        }
        // Negation marker, then a leading `]` is a literal member.
        if matches!(chars.peek(), Some('!' | '^')) {
            chars.next();
        }
        if chars.peek() == Some(&']') {
            chars.next();
        }
        if !chars.by_ref().any(|c| c == ']') {
            exn::bail!(ErrorKind::InvalidFilter(glob.to_string()));
        }
    }
    Ok(())
}

/// Translate a glob into a `LIKE` pattern escaped with [`LIKE_ESCAPE`].
///
/// `*` becomes `%`, `?` becomes `_`, and literal `%`, `_` and `\` are
/// escaped. Character classes cannot be expressed and are rejected.
pub fn glob_to_like(glob: &str) -> Result<String> {
    if glob.is_empty() || glob.contains('\0') {
        exn::bail!(ErrorKind::InvalidFilter(glob.escape_default().to_string()));
    }
    let mut pattern = String::with_capacity(glob.len() + 4);
    for c in glob.chars() {
        match c {
            '*' => pattern.push('%'),
            '?' => pattern.push('_'),
            '%' | '_' | LIKE_ESCAPE => {
                pattern.push(LIKE_ESCAPE);
                pattern.push(c);
            },
            '[' => exn::bail!(ErrorKind::InvalidFilter(format!(
                "{glob} (character classes need a case-sensitive filter)"
            ))),
            _ => pattern.push(c),
        }
    }
    Ok(pattern)
}

/// Shells spell class negation `[!...]`, SQLite spells it `[^...]`.
///
/// Expects a glob that already passed [`validate_glob`].
fn normalize_negation(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len());
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c != '[' {
            continue;
        }
        match chars.peek() {
            Some('!') => {
                chars.next();
                out.push('^');
            },
            Some('^') => out.extend(chars.next()),
            _ => {},
        }
        if chars.peek() == Some(&']') {
            out.extend(chars.next());
        }
        // Copy the class body verbatim so a `[` inside it isn't mistaken for
        // the start of another class.
        for c in chars.by_ref() {
            out.push(c);
            if c == ']' {
                break;
            }
        }
    }
    out
}
