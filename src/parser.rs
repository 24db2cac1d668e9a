//! Structural parsing of Yarn v1 lock-file text
//!
//! The lock-file format is a restricted, indentation-sensitive cousin of
//! YAML. A file consists of blocks opened by a colon-terminated key line and
//! filled by indented children, key/value lines whose key and value are
//! separated by the first space (either side may be double-quoted), blank
//! lines, and `#` comments:
//!
//! ```text
//! # yarn lockfile v1
//!
//! "@babel/runtime@^7.12.0":
//!   version "7.22.5"
//!   resolved "https://registry.yarnpkg.com/@babel/runtime/..."
//!   dependencies:
//!     regenerator-runtime "^0.13.11"
//! ```
//!
//! Structure is enforced strictly. The first indented line fixes both the
//! indentation character (space or tab, never mixed) and the indentation
//! unit; every later line must indent by an exact multiple of that unit and
//! may nest at most one level below the block opened by the preceding line.
//! An opened block must receive at least one child before the input dedents
//! or ends. Violations abort parsing with a [`YarnLockError`] carrying the
//! offending line number.
//!
//! [`parse`] produces the tree form ([`Map`] of [`Value`]); building the
//! package graph on top of it is the job of [`crate::lock::YarnLock`]. The
//! two header-splitting helpers used by the graph builder,
//! [`split_requests`] and [`split_name_range`], live here as well because
//! they operate on the same textual conventions.
//!
//! # Examples
//!
//! ```rust
//! use yarn_lock::{Value, parser};
//!
//! let tree = parser::parse("left-pad@^1.3.0:\n  version \"1.3.0\"\n").unwrap();
//! let entry = &tree["left-pad@^1.3.0"];
//! assert_eq!(entry.get("version").and_then(Value::as_str), Some("1.3.0"));
//! ```

use tracing::debug;

use crate::error::{Result, YarnLockError};
use crate::value::{Map, Value};

/// Parses lock-file text into its ordered tree form.
///
/// The returned map holds one entry per top-level line: header blocks map to
/// nested [`Value::Map`]s, loose key/value lines map to scalars. Entry order
/// follows the file.
///
/// # Errors
///
/// Returns the first structural violation encountered; see [`YarnLockError`]
/// for the individual conditions. No partial tree is ever returned.
pub fn parse(input: &str) -> Result<Map> {
    let mut parser = Parser::new();
    let mut last_line = 0;
    for (index, raw) in input.lines().enumerate() {
        last_line = index + 1;
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }
        parser.feed(last_line, line)?;
    }
    let tree = parser.finish(last_line)?;
    debug!("parsed {} top-level entries", tree.len());
    Ok(tree)
}

/// Splits a comma-joined header into its request strings.
///
/// Commas inside double-quoted segments do not split; matched wrapping
/// quotes are stripped from the returned entries. Surrounding whitespace is
/// consumed and empty trailing segments are dropped.
///
/// # Examples
///
/// ```rust
/// use yarn_lock::parser::split_requests;
///
/// assert_eq!(
///     split_requests(r#"minimatch@^3.0.0, minimatch@^3.0.2, "minimatch@2 || 3""#),
///     vec!["minimatch@^3.0.0", "minimatch@^3.0.2", "minimatch@2 || 3"],
/// );
/// ```
#[must_use]
pub fn split_requests(header: &str) -> Vec<&str> {
    let mut requests = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (index, ch) in header.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                requests.push(unquote(&header[start..index]));
                start = index + 1;
            }
            _ => {}
        }
    }
    requests.push(unquote(&header[start..]));
    while requests.last().is_some_and(|request| request.is_empty()) {
        requests.pop();
    }
    requests
}

/// Splits a single `name@range` request at its last `@`.
///
/// Splitting at the last `@` keeps scoped names intact. A request without an
/// `@` yields an empty name and the whole input as the range.
///
/// # Examples
///
/// ```rust
/// use yarn_lock::parser::split_name_range;
///
/// assert_eq!(split_name_range("pkg@2.6.4"), ("pkg", "2.6.4"));
/// assert_eq!(split_name_range("@scope/pkg@^1.0.0"), ("@scope/pkg", "^1.0.0"));
/// ```
#[must_use]
pub fn split_name_range(request: &str) -> (&str, &str) {
    match request.rfind('@') {
        Some(at) => (&request[..at], &request[at + 1..]),
        None => ("", request),
    }
}

fn unquote(segment: &str) -> &str {
    let segment = segment.trim();
    if segment.len() >= 2 && segment.starts_with('"') && segment.ends_with('"') {
        &segment[1..segment.len() - 1]
    } else {
        segment
    }
}

/// Line-by-line parser state: the established indentation discipline plus
/// the stack of blocks currently open.
struct Parser {
    indent_char: Option<u8>,
    unit: Option<usize>,
    require_child: bool,
    root: Map,
    stack: Vec<(String, Map)>,
}

impl Parser {
    fn new() -> Self {
        Self {
            indent_char: None,
            unit: None,
            require_child: false,
            root: Map::new(),
            stack: Vec::new(),
        }
    }

    /// Processes one trimmed, non-blank line.
    fn feed(&mut self, line_no: usize, line: &str) -> Result<()> {
        let offset = self.scan_indent(line_no, line)?;
        let content = &line[offset..];
        if content.starts_with('#') {
            return Ok(());
        }
        let level = self.level_of(line_no, offset)?;
        self.close_to(line_no, level)?;
        if let Some(key) = content.strip_suffix(':') {
            self.stack.push((key.trim().to_string(), Map::new()));
            self.require_child = true;
        } else {
            let (key, value) = split_entry(line_no, content)?;
            self.insert(key, Value::from_scalar(value));
            self.require_child = false;
        }
        Ok(())
    }

    /// Validates the leading whitespace run and returns its byte width.
    ///
    /// The first whitespace character seen anywhere in the file becomes the
    /// required indentation character, comment lines included.
    fn scan_indent(&mut self, line_no: usize, line: &str) -> Result<usize> {
        let bytes = line.as_bytes();
        let mut offset = 0;
        while offset < bytes.len() && (bytes[offset] == b' ' || bytes[offset] == b'\t') {
            let expected = *self.indent_char.get_or_insert(bytes[offset]);
            if bytes[offset] != expected {
                return Err(YarnLockError::MixedIndentStyle { line: line_no });
            }
            offset += 1;
        }
        Ok(offset)
    }

    /// Converts an indentation width into a nesting level.
    ///
    /// The first non-zero run defines the unit and names level one; later
    /// runs must be exact multiples. No run may nest deeper than the number
    /// of open blocks.
    fn level_of(&mut self, line_no: usize, offset: usize) -> Result<usize> {
        if offset == 0 {
            return Ok(0);
        }
        let Some(unit) = self.unit else {
            if self.stack.is_empty() {
                return Err(YarnLockError::UnexpectedIndentation { line: line_no });
            }
            self.unit = Some(offset);
            return Ok(1);
        };
        if offset % unit != 0 {
            return Err(YarnLockError::MixedIndentSize { line: line_no });
        }
        let level = offset / unit;
        if level > self.stack.len() {
            return Err(YarnLockError::UnexpectedIndentation { line: line_no });
        }
        Ok(level)
    }

    /// Pops open blocks until the stack matches `level`, folding each
    /// finished block into its parent.
    fn close_to(&mut self, line_no: usize, level: usize) -> Result<()> {
        if level < self.stack.len() && self.require_child {
            return Err(YarnLockError::MissingProperty { line: line_no });
        }
        while self.stack.len() > level {
            if let Some((key, block)) = self.stack.pop() {
                self.insert(key, Value::Map(block));
            }
        }
        Ok(())
    }

    /// Writes into the innermost open block, or the root when none is open.
    /// Rebinding an existing key replaces its value in place.
    fn insert(&mut self, key: String, value: Value) {
        let target = match self.stack.last_mut() {
            Some((_, block)) => block,
            None => &mut self.root,
        };
        target.insert(key, value);
    }

    fn finish(mut self, last_line: usize) -> Result<Map> {
        if self.require_child {
            return Err(YarnLockError::UnexpectedEof { line: last_line });
        }
        self.close_to(last_line, 0)?;
        Ok(self.root)
    }
}

/// Splits a key/value line into its key and raw value token.
fn split_entry(line_no: usize, content: &str) -> Result<(String, &str)> {
    if let Some(rest) = content.strip_prefix('"') {
        return Ok(match rest.find('"') {
            Some(end) => (rest[..end].to_string(), rest[end + 1..].trim_start()),
            None => (rest.to_string(), ""),
        });
    }
    match content.split_once(' ') {
        Some((key, value)) => Ok((key.to_string(), value.trim_start())),
        None => Err(YarnLockError::MissingValue { line: line_no }),
    }
}
