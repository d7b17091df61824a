//! Signature extraction
//!
//! Dependencies are looked up by the *names* of a callable's parameters.
//! Rust has no runtime reflection over parameter names, so extraction works
//! on the callable's source text instead: [`inject!`](crate::inject) captures
//! it with `stringify!`, and [`annotate`] turns it into the ordered list of
//! names to resolve.
//!
//! Recognized forms:
//!
//! - `fn name(a, b)` / `function name(a, b)` / `function* name(a, b)`
//!   (optionally `pub`/`async`)
//! - closures: `|a, b| ...`, `move |a| ...`, `|| ...`
//! - arrows: `a => ...`, `(a, b) => ...`
//! - methods: `name(a, b)`
//!
//! Anything that cannot be parsed is treated as having no dependencies.

use once_cell::sync::OnceCell;
use std::borrow::Cow;
use std::sync::Arc;

/// Extract the ordered dependency names declared by a callable's source text.
///
/// Comments are removed first, so they never leak into the names. Rust type
/// ascriptions and `mut` are stripped down to the binding name, and receiver
/// parameters (`self`, `&self`, `&mut self`) are skipped.
///
/// # Examples
///
/// ```rust
/// use named_injector::annotate;
///
/// assert_eq!(annotate("fn build(db, cache) {}"), ["db", "cache"]);
/// assert_eq!(annotate("|config: Config, /* unused */ log| config"), ["config", "log"]);
/// assert_eq!(annotate("clock => clock.now()"), ["clock"]);
/// assert!(annotate("not a callable").is_empty());
/// ```
pub fn annotate(source: &str) -> Vec<String> {
    let text = strip_comments(source);

    match parameter_list(&text) {
        Some(list) => split_parameters(list),
        None => Vec::new(),
    }
}

/// Remove `// line` and `/* block */` comments.
fn strip_comments(source: &str) -> Cow<'_, str> {
    if !source.contains("//") && !source.contains("/*") {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match (c, next) {
            ('/', Some('/')) => {
                // Keep the newline so tokens on either side stay separated
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    Cow::Owned(out)
}

/// Locate the raw text of the parameter list.
fn parameter_list(text: &str) -> Option<&str> {
    let mut rest = text.trim_start();

    while let Some(after) = ["pub", "async", "unsafe"]
        .iter()
        .find_map(move |kw| strip_keyword(rest, kw))
    {
        rest = after.trim_start();
    }

    // fn name<T>(..) / function name(..) / function* name(..)
    if let Some(after) = strip_keyword(rest, "fn").or_else(|| strip_keyword(rest, "function")) {
        let name = after.trim_start().strip_prefix('*').unwrap_or(after).trim_start();
        let after = skip_generics(name.trim_start_matches(is_ident_char).trim_start())?;
        return enclosed(after, '(', ')').map(|(list, _)| list);
    }

    // |a, b| / move |a| / ||
    let closure = strip_keyword(rest, "move").map_or(rest, str::trim_start);
    if closure.starts_with("||") {
        return Some("");
    }
    if let Some(after) = closure.strip_prefix('|') {
        let end = after.find('|')?;
        return Some(&after[..end]);
    }

    // (a, b) => ..
    if rest.starts_with('(') {
        let (list, after) = enclosed(rest, '(', ')')?;
        return after.trim_start().starts_with("=>").then_some(list);
    }

    // a => .. / name(a, b)
    let ident_len = rest.len() - rest.trim_start_matches(is_ident_char).len();
    if ident_len == 0 || rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let (ident, after) = rest.split_at(ident_len);
    let after = after.trim_start();
    if after.starts_with("=>") {
        return Some(ident);
    }
    enclosed(skip_generics(after)?, '(', ')').map(|(list, _)| list)
}

/// Split a parameter list on top-level commas into binding names.
fn split_parameters(list: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = list.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            // `->` and `=>` are not closing brackets
            b'-' | b'=' if bytes.get(i + 1) == Some(&b'>') => i += 1,
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                names.extend(binding_name(&list[start..i]));
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    names.extend(binding_name(&list[start..]));

    names
}

/// Reduce one parameter to its name, or `None` for blanks and receivers.
fn binding_name(segment: &str) -> Option<String> {
    let mut name = segment.trim();
    if name.is_empty() {
        return None;
    }

    if let Some(colon) = top_level_colon(name) {
        name = name[..colon].trim_end();
    }
    if let Some(after) = strip_keyword(name, "mut") {
        name = after.trim_start();
    }

    if name.is_empty() || is_receiver(name) {
        return None;
    }

    Some(name.to_string())
}

fn top_level_colon(segment: &str) -> Option<usize> {
    let bytes = segment.as_bytes();
    let mut depth = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => {
                let doubled = bytes.get(i + 1) == Some(&b':') || (i > 0 && bytes[i - 1] == b':');
                if !doubled {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_receiver(name: &str) -> bool {
    let Some(mut rest) = name.strip_prefix('&') else {
        return name == "self";
    };
    rest = rest.trim_start();
    if rest.starts_with('\'') {
        rest = rest[1..].trim_start_matches(is_ident_char).trim_start();
    }
    if let Some(after) = strip_keyword(rest, "mut") {
        rest = after.trim_start();
    }
    rest == "self"
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Strip `keyword` when it stands as a whole word at the start of `text`.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    match rest.chars().next() {
        Some(c) if is_ident_char(c) => None,
        _ => Some(rest),
    }
}

/// Skip a leading `<...>` generic parameter list, if any.
fn skip_generics(text: &str) -> Option<&str> {
    if text.starts_with('<') {
        enclosed(text, '<', '>').map(|(_, rest)| rest.trim_start())
    } else {
        Some(text)
    }
}

/// Split `open ... close` off the front of `text`, honoring nesting.
fn enclosed(text: &str, open: char, close: char) -> Option<(&str, &str)> {
    let inner = text.strip_prefix(open)?;
    let mut depth = 1usize;
    let mut prev = '\0';

    for (i, c) in inner.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close && !(close == '>' && prev == '-') {
            depth -= 1;
            if depth == 0 {
                return Some((&inner[..i], &inner[i + c.len_utf8()..]));
            }
        }
        prev = c;
    }
    None
}

// =============================================================================
// Signature
// =============================================================================

/// The dependency names of an [`Injectable`](crate::Injectable).
///
/// Either an explicit list supplied by the caller (the "invoke array" form,
/// which bypasses extraction), or source text that is annotated on first use.
/// Only the parse is memoized; resolved values never are.
#[derive(Debug, Clone)]
pub struct Signature {
    repr: Repr,
}

#[derive(Debug, Clone)]
enum Repr {
    Explicit(Arc<[String]>),
    Source {
        text: Cow<'static, str>,
        names: OnceCell<Arc<[String]>>,
    },
}

impl Signature {
    /// A signature with names given verbatim.
    ///
    /// The input is copied, so a borrowed slice is left untouched.
    pub fn explicit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            repr: Repr::Explicit(names.into_iter().map(|s| s.as_ref().to_owned()).collect()),
        }
    }

    /// A signature extracted from source text with [`annotate`].
    pub fn source(text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            repr: Repr::Source {
                text: text.into(),
                names: OnceCell::new(),
            },
        }
    }

    /// A signature with no dependencies.
    pub fn empty() -> Self {
        Self {
            repr: Repr::Explicit(Arc::from([])),
        }
    }

    /// The ordered dependency names.
    pub fn names(&self) -> &[String] {
        match &self.repr {
            Repr::Explicit(names) => names,
            Repr::Source { text, names } => names.get_or_init(|| annotate(text).into()),
        }
    }

    /// The source text this signature was extracted from, if any.
    pub fn source_text(&self) -> Option<&str> {
        match &self.repr {
            Repr::Explicit(_) => None,
            Repr::Source { text, .. } => Some(text),
        }
    }

    /// Whether the names were supplied explicitly.
    pub fn is_explicit(&self) -> bool {
        matches!(self.repr, Repr::Explicit(_))
    }

    /// Number of dependencies.
    pub fn len(&self) -> usize {
        self.names().len()
    }

    /// Whether there are no dependencies.
    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_arity() {
        assert!(annotate("function () { return true; }").is_empty());
        assert_eq!(annotate("function (foo) { return foo(); }"), ["foo"]);
        assert_eq!(annotate("function (foo, bar) { return foo(bar()); }"), ["foo", "bar"]);
        assert_eq!(annotate("function* gen(a, b) { yield a; }"), ["a", "b"]);
        assert_eq!(annotate("function *(seed) {}"), ["seed"]);
    }

    #[test]
    fn test_named_fn() {
        assert_eq!(annotate("fn make_user(db, cache) -> User { todo() }"), ["db", "cache"]);
        assert_eq!(annotate("pub async fn serve(listener) {}"), ["listener"]);
        assert!(annotate("fn ping() {}").is_empty());
    }

    #[test]
    fn test_typed_parameters() {
        assert_eq!(
            annotate("fn wire(db: Arc<Database>, mut routes: HashMap<String, Route>) {}"),
            ["db", "routes"]
        );
        assert_eq!(
            annotate("fn apply<F: Fn(u32) -> u32>(f: F, seed: u32) {}"),
            ["f", "seed"]
        );
        assert_eq!(annotate("|cb: Box<dyn Fn(u8) -> u8>, n| n"), ["cb", "n"]);
    }

    #[test]
    fn test_closure_forms() {
        assert!(annotate("|| 42").is_empty());
        assert_eq!(annotate("|foo, bar| foo + bar"), ["foo", "bar"]);
        assert_eq!(annotate("move |config| config.port"), ["config"]);
    }

    #[test]
    fn test_arrow_forms() {
        assert_eq!(annotate("(a, b) => a + b"), ["a", "b"]);
        assert_eq!(annotate("() => 1"), Vec::<String>::new());
        assert_eq!(annotate("logger => logger.info()"), ["logger"]);
        assert_eq!(annotate("async (req) => req"), ["req"]);
    }

    #[test]
    fn test_method_form() {
        assert_eq!(annotate("handle(request, response) { }"), ["request", "response"]);
        assert_eq!(annotate("fn tick(&mut self, clock: Clock) {}"), ["clock"]);
        assert_eq!(annotate("fn name(&self) -> &str {}"), Vec::<String>::new());
        assert_eq!(annotate("fn by_ref(&'a self, x) {}"), ["x"]);
    }

    #[test]
    fn test_comments_ignored() {
        let source = "function (a, // first\n b /* second, third */, /* c, */ d) {}";
        assert_eq!(annotate(source), ["a", "b", "d"]);

        let multiline = "fn f(\n  /* db,\n   cache, */\n  log // log, sink\n) {}";
        assert_eq!(annotate(multiline), ["log"]);
    }

    #[test]
    fn test_empty_segments_dropped() {
        assert_eq!(annotate("fn f(a, , b,) {}"), ["a", "b"]);
        assert_eq!(annotate("|a,|"), ["a"]);
        assert_eq!(annotate("|: u32, mut, b|"), ["b"]);
    }

    #[test]
    fn test_opaque_parameters() {
        assert_eq!(annotate("function (a = 1, {x, y}) {}"), ["a = 1", "{x, y}"]);
    }

    #[test]
    fn test_malformed_is_empty() {
        assert!(annotate("").is_empty());
        assert!(annotate("42").is_empty());
        assert!(annotate("fn broken(a, b").is_empty());
        assert!(annotate("(a, b) + c").is_empty());
        assert!(annotate("/* only a comment */").is_empty());
    }

    #[test]
    fn test_signature_explicit_copies() {
        let names = vec!["foo", "bar"];
        let sig = Signature::explicit(&names);
        assert_eq!(sig.names(), ["foo", "bar"]);
        assert!(sig.is_explicit());
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_signature_from_source() {
        let sig = Signature::source("|a, b| a");
        assert!(!sig.is_explicit());
        assert_eq!(sig.source_text(), Some("|a, b| a"));
        assert_eq!(sig.names(), ["a", "b"]);
        assert_eq!(sig.len(), 2);
        assert!(Signature::empty().is_empty());
    }
}
