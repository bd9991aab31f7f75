//! Regex guard
//!
//! Three layers keep pattern rules cheap:
//!
//! 1. [`is_pattern_safe`] scans the pattern source for shapes that cause
//!    catastrophic backtracking in backtracking engines. It is a heuristic
//!    gate, not a proof: it rejects some harmless patterns and cannot catch
//!    every exponential one.
//! 2. [`test_sync`] refuses inputs above a length cap before matching.
//! 3. [`test_async`] additionally races the match against a tokio timer.
//!
//! The timer in (3) only bounds how long the caller waits for an answer. The
//! match itself runs as one non-preemptible step on the same task as the
//! timer, so the timer can fire only between polls and never interrupts a
//! match already in progress. Real cancellation would need the match to run
//! on an isolated worker, which this crate does not do. The `regex` crate
//! matches in linear time, so the length cap is the cost bound that matters
//! here; the gate and timer keep rule chains portable to backtracking
//! engines.

use crate::config::{DEFAULT_MAX_INPUT_LENGTH, DEFAULT_REGEX_TIMEOUT_MS};
use crate::error::RegexError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Default timeout for [`test_async`]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_REGEX_TIMEOUT_MS);

/// Most compiled patterns kept in the process-wide cache
pub const REGEX_CACHE_CAPACITY: usize = 256;

static REGEX_CACHE: Lazy<Mutex<HashMap<String, Regex>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Compile a pattern, reusing earlier compilations of the same source
///
/// Does not run the safety heuristics; see [`compile_safe`]. At most
/// [`REGEX_CACHE_CAPACITY`] patterns are cached; once full, new patterns are
/// compiled on every call.
pub fn compile(source: &str) -> Result<Regex, RegexError> {
    let mut cache = REGEX_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(regex) = cache.get(source) {
        tracing::trace!(pattern = source, "Regex cache hit");
        return Ok(regex.clone());
    }

    let regex = Regex::new(source).map_err(|e| RegexError::InvalidPattern {
        pattern: source.to_string(),
        message: e.to_string(),
    })?;
    if cache.len() < REGEX_CACHE_CAPACITY {
        cache.insert(source.to_string(), regex.clone());
    } else {
        tracing::debug!(pattern = source, "Regex cache full, not caching");
    }
    Ok(regex)
}

/// Compile a pattern after it passes [`is_pattern_safe`]
pub fn compile_safe(source: &str) -> Result<Regex, RegexError> {
    if !is_pattern_safe(source) {
        tracing::warn!(pattern = source, "Rejected potentially unsafe regex pattern");
        return Err(RegexError::UnsafePattern(source.to_string()));
    }
    compile(source)
}

/// Match `text` against `regex` unless it is longer than `max_length`
/// characters
pub fn test_sync(regex: &Regex, text: &str, max_length: usize) -> Result<bool, RegexError> {
    check_length(text, max_length)?;
    Ok(regex.is_match(text))
}

/// Match with the default length cap and a timeout race
///
/// See the module docs for what the timeout can and cannot guarantee.
pub async fn test_async(regex: &Regex, text: &str, timeout: Duration) -> Result<bool, RegexError> {
    test_async_with_limit(regex, text, timeout, DEFAULT_MAX_INPUT_LENGTH).await
}

/// [`test_async`] with an explicit length cap
pub async fn test_async_with_limit(
    regex: &Regex,
    text: &str,
    timeout: Duration,
    max_length: usize,
) -> Result<bool, RegexError> {
    check_length(text, max_length)?;

    if !is_pattern_safe(regex.as_str()) {
        return Err(RegexError::UnsafePattern(regex.as_str().to_string()));
    }

    let matching = async { regex.is_match(text) };
    match tokio::time::timeout(timeout, matching).await {
        Ok(matched) => Ok(matched),
        Err(_) => {
            tracing::warn!(pattern = regex.as_str(), ?timeout, "Regex match timed out");
            Err(RegexError::Timeout(timeout))
        }
    }
}

fn check_length(text: &str, max_length: usize) -> Result<(), RegexError> {
    let length = text.chars().count();
    if length > max_length {
        return Err(RegexError::InputTooLong {
            length,
            max: max_length,
        });
    }
    Ok(())
}

/// Heuristic check for catastrophic-backtracking shapes
///
/// A pattern is unsafe if any of these hold:
/// - a quantified group whose body contains `+`, `*`, `?` or an open-ended
///   `{n,}` (`(a+)+`, `(a{1,})*`). This also covers repeated wildcards such
///   as `(.*)+`.
/// - a quantified alternation with duplicate or prefix-overlapping branches
///   (`(a|a)*`, `(a|aa)+`)
/// - two quantifiers back to back (`a+*`, `a*?`)
/// - two quantified alternations directly in sequence (`(a|b)+(c|d)*`)
///
/// Escaped characters and character-class contents never count as
/// quantifiers. Bounded braces (`{n}`, `{n,m}`) inside a group do not either.
pub fn is_pattern_safe(pattern: &str) -> bool {
    Scanner::new(pattern).run().is_ok()
}

/// Which heuristic flagged a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hazard {
    NestedQuantifier,
    OverlappingAlternation,
    AdjacentQuantifiers,
    SequentialAlternations,
}

/// One open group, or the whole pattern at the bottom of the stack
#[derive(Debug, Default)]
struct Frame {
    /// Index of the opening paren
    open: usize,
    /// Start of each top-level branch in the body
    branch_starts: Vec<usize>,
    has_quantifier: bool,
    /// End of the quantifier of the last quantified alternation closed
    /// directly inside this frame
    last_alternation_end: Option<usize>,
}

impl Frame {
    fn new(open: usize, body_start: usize) -> Self {
        Self {
            open,
            branch_starts: vec![body_start],
            ..Self::default()
        }
    }

    fn has_alternation(&self) -> bool {
        self.branch_starts.len() > 1
    }
}

/// A `{n}`, `{n,}` or `{n,m}` quantifier
#[derive(Debug, Clone, Copy)]
struct Braces {
    end: usize,
    /// `{n,}` has no upper bound and repeats like `+`
    open_ended: bool,
}

struct Scanner {
    chars: Vec<char>,
    stack: Vec<Frame>,
    pos: usize,
    prev_quantifier: bool,
}

impl Scanner {
    fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            stack: vec![Frame::new(0, 0)],
            pos: 0,
            prev_quantifier: false,
        }
    }

    fn run(mut self) -> Result<(), Hazard> {
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            match c {
                '\\' => {
                    self.atom();
                    self.pos += 2;
                }
                '[' => {
                    self.atom();
                    self.pos = self.skip_class(self.pos);
                }
                '(' => self.open_group(),
                ')' => self.close_group()?,
                '|' => {
                    let next = self.pos + 1;
                    self.top().branch_starts.push(next);
                    self.atom();
                    self.pos = next;
                }
                '+' | '*' | '?' => {
                    if self.prev_quantifier {
                        return Err(Hazard::AdjacentQuantifiers);
                    }
                    self.top().has_quantifier = true;
                    self.prev_quantifier = true;
                    self.pos += 1;
                }
                '{' => match self.braces(self.pos) {
                    Some(braces) => {
                        if self.prev_quantifier {
                            return Err(Hazard::AdjacentQuantifiers);
                        }
                        if braces.open_ended {
                            self.top().has_quantifier = true;
                        }
                        self.prev_quantifier = true;
                        self.pos = braces.end;
                    }
                    None => {
                        self.atom();
                        self.pos += 1;
                    }
                },
                _ => {
                    self.atom();
                    self.pos += 1;
                }
            }
        }
        Ok(())
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn atom(&mut self) {
        self.prev_quantifier = false;
    }

    fn open_group(&mut self) {
        let open = self.pos;
        let mut body = open + 1;

        // Group syntax: (?:...), (?i), (?i:...), (?P<name>...), (?<name>...), (?=...)
        if self.chars.get(body) == Some(&'?') {
            body += 1;
            while let Some(&c) = self.chars.get(body) {
                if c.is_ascii_alphabetic() || c == '-' {
                    body += 1;
                } else {
                    break;
                }
            }
            match self.chars.get(body) {
                Some(&')') => {
                    // Flag-only group, no body
                    self.atom();
                    self.pos = body + 1;
                    return;
                }
                Some(&'<') if !matches!(self.chars.get(body + 1), Some(&'=') | Some(&'!')) => {
                    while body < self.chars.len() && self.chars[body] != '>' {
                        body += 1;
                    }
                    body += 1;
                }
                Some(&':') | Some(&'=') | Some(&'!') => body += 1,
                Some(&'<') => body += 2,
                _ => {}
            }
        }

        self.stack.push(Frame::new(open, body));
        self.atom();
        self.pos = body;
    }

    fn close_group(&mut self) -> Result<(), Hazard> {
        let close = self.pos;
        if self.stack.len() == 1 {
            // Unbalanced paren, let the compiler report it
            self.atom();
            self.pos += 1;
            return Ok(());
        }
        let frame = self.stack.pop().unwrap_or_default();
        let quantifier = self.quantifier_at(close + 1);

        if quantifier.is_some() {
            if frame.has_quantifier {
                return Err(Hazard::NestedQuantifier);
            }
            if frame.has_alternation() && self.branches_overlap(&frame, close) {
                return Err(Hazard::OverlappingAlternation);
            }
        }

        let parent = self.top();
        if let Some(end) = quantifier {
            if frame.has_alternation() {
                if parent.last_alternation_end == Some(frame.open) {
                    return Err(Hazard::SequentialAlternations);
                }
                parent.last_alternation_end = Some(end);
            }
        }
        parent.has_quantifier |= frame.has_quantifier || quantifier.is_some();

        self.atom();
        self.pos = close + 1;
        Ok(())
    }

    /// End index of the quantifier starting at `at`, if there is one
    fn quantifier_at(&self, at: usize) -> Option<usize> {
        match self.chars.get(at) {
            Some(&'+') | Some(&'*') | Some(&'?') => Some(at + 1),
            Some(&'{') => self.braces(at).map(|braces| braces.end),
            _ => None,
        }
    }

    /// Brace quantifier starting at `at`
    fn braces(&self, at: usize) -> Option<Braces> {
        let mut i = at + 1;
        let mut digits = 0;
        let mut commas = 0;
        while let Some(&c) = self.chars.get(i) {
            match c {
                '0'..='9' => digits += 1,
                ',' => commas += 1,
                '}' => {
                    let valid = digits > 0 && commas <= 1 && self.chars[at + 1] != ',';
                    return valid.then_some(Braces {
                        end: i + 1,
                        open_ended: commas == 1 && self.chars[i - 1] == ',',
                    });
                }
                _ => return None,
            }
            i += 1;
        }
        None
    }

    /// Index just past the character class starting at `at`
    fn skip_class(&self, at: usize) -> usize {
        let mut i = at + 1;
        if self.chars.get(i) == Some(&'^') {
            i += 1;
        }
        // A leading ']' is a literal
        if self.chars.get(i) == Some(&']') {
            i += 1;
        }
        let mut depth = 1;
        while i < self.chars.len() {
            match self.chars[i] {
                '\\' => i += 1,
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        self.chars.len()
    }

    fn branches_overlap(&self, frame: &Frame, close: usize) -> bool {
        let mut branches: Vec<String> = Vec::with_capacity(frame.branch_starts.len());
        for (idx, &start) in frame.branch_starts.iter().enumerate() {
            let end = frame
                .branch_starts
                .get(idx + 1)
                .map_or(close, |next| next - 1);
            branches.push(self.chars[start..end.max(start)].iter().collect());
        }

        for (i, a) in branches.iter().enumerate() {
            for b in &branches[i + 1..] {
                if a == b {
                    return true;
                }
                let prefixed = a.starts_with(b.as_str()) || b.starts_with(a.as_str());
                if !a.is_empty() && !b.is_empty() && prefixed {
                    return true;
                }
            }
        }
        false
    }
}
