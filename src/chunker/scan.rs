/// Lexical line classification for the chunking scans.
///
/// The engine never parses Solidity; both the chunk builder and the
/// mini-splitter work off this small line classifier plus a running brace
/// balance. Sources are expected to be comment-stripped upstream, so brace
/// counting cannot be corrupted by comment text.
use std::sync::OnceLock;

use regex::Regex;

/// What a single source line means to the scan state machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Opens a `modifier` declaration.
    ModifierDecl,
    /// Opens a control block (`if`, `try`).
    ControlOpener,
    /// Continues a control chain (`else if`, `else`, `catch`).
    ControlContinuation,
    /// Anything else.
    Plain,
}

/// Whether `s` starts with `word` followed by a non-identifier character.
fn starts_with_word(s: &str, word: &str) -> bool {
    match s.strip_prefix(word) {
        Some(rest) => !rest
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_'),
        None => false,
    }
}

/// Classify a raw source line.
///
/// Control keywords are recognized after stripping leading closing braces,
/// so `} else if (x) {` reads as a continuation. Keywords only match on word
/// boundaries (`interface` is not an `if`).
#[must_use]
pub fn classify(line: &str) -> LineKind {
    let stripped = line.trim();
    if starts_with_word(stripped, "modifier") {
        return LineKind::ModifierDecl;
    }

    let check = stripped.trim_start_matches('}').trim_start();
    if starts_with_word(check, "if") || starts_with_word(check, "try") {
        LineKind::ControlOpener
    } else if starts_with_word(check, "else") || starts_with_word(check, "catch") {
        LineKind::ControlContinuation
    } else {
        LineKind::Plain
    }
}

/// Net brace contribution of a line: `{` count minus `}` count.
#[must_use]
pub fn brace_delta(line: &str) -> i32 {
    let opens = line.matches('{').count() as i32;
    let closes = line.matches('}').count() as i32;
    opens - closes
}

/// Whether any line of the accumulated text closes a block.
///
/// The chunk builder refuses to flush an accumulator that has only collected
/// declaration preamble with no `}` yet.
#[must_use]
pub fn has_closing_brace(lines: &[String]) -> bool {
    lines.iter().any(|l| l.contains('}'))
}

fn top_level_decl_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(contract|library|interface)\s+\w+").expect("static pattern")
    })
}

/// Whether a line opens a new top-level declaration.
#[must_use]
pub fn is_top_level_declaration(line: &str) -> bool {
    top_level_decl_regex().is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_modifier() {
        assert_eq!(classify("modifier onlyOwner() {"), LineKind::ModifierDecl);
        assert_eq!(classify("    modifier whenNotPaused {"), LineKind::ModifierDecl);
    }

    #[test]
    fn test_classify_control_openers() {
        assert_eq!(classify("if (x > 0) {"), LineKind::ControlOpener);
        assert_eq!(classify("try other.call() {"), LineKind::ControlOpener);
        assert_eq!(classify("} if (y) {"), LineKind::ControlOpener);
    }

    #[test]
    fn test_classify_continuations() {
        assert_eq!(classify("} else if (x == 2) {"), LineKind::ControlContinuation);
        assert_eq!(classify("} else {"), LineKind::ControlContinuation);
        assert_eq!(classify("} catch (bytes memory err) {"), LineKind::ControlContinuation);
        assert_eq!(classify("else {"), LineKind::ControlContinuation);
    }

    #[test]
    fn test_classify_plain() {
        assert_eq!(classify("uint256 total = 0;"), LineKind::Plain);
        assert_eq!(classify("}"), LineKind::Plain);
        assert_eq!(classify(""), LineKind::Plain);
        // `interface` is a top-level declaration, not an `if`
        assert_eq!(classify("interface IToken {"), LineKind::Plain);
        assert_eq!(classify("iffyValue = 3;"), LineKind::Plain);
        assert_eq!(classify("modifierCount += 1;"), LineKind::Plain);
        assert_eq!(classify("if(x > 0) {"), LineKind::ControlOpener);
    }

    #[test]
    fn test_brace_delta() {
        assert_eq!(brace_delta("function f() {"), 1);
        assert_eq!(brace_delta("}"), -1);
        assert_eq!(brace_delta("if (x) { y(); }"), 0);
        assert_eq!(brace_delta("mapping(uint => uint) m;"), 0);
    }

    #[test]
    fn test_has_closing_brace() {
        let with = vec!["contract A {".to_string(), "}".to_string()];
        let without = vec!["pragma solidity ^0.8.0;".to_string()];
        assert!(has_closing_brace(&with));
        assert!(!has_closing_brace(&without));
    }

    #[test]
    fn test_top_level_declaration() {
        assert!(is_top_level_declaration("contract Token {"));
        assert!(is_top_level_declaration("  library SafeMath {"));
        assert!(is_top_level_declaration("interface IERC20 {"));
        assert!(!is_top_level_declaration("// contract comment"));
        assert!(!is_top_level_declaration("contractAddress = addr;"));
        assert!(!is_top_level_declaration("uint contract_count;"));
    }
}
