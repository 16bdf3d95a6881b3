//! Rule File Parser
//!
//! Line-oriented state machine over one rule file. Recognized lines:
//!
//! - blank lines (ignored)
//! - `c => text` symbol macros, local to the file
//! - `#RRGGBB: k` element declarations, followed by `- "identity"` membership lines
//! - `rule: [NN%] [x] [y]` directives, followed by exactly five rows of 10 terms
//!
//! Diagnostics never stop the parse except for end-of-file inside a rule block.

use super::lexer::{self, LexError, Lexeme};
use super::mirror;
use crate::core::error::{Block, Location, ParseError};
use crate::model::{
    Color, Grid, IdentityRegistry, KeyBindRegistry, MatchTerm, Mirror, ReplaceTerm, Rule,
    RuleSource, RULE_SIZE,
};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

const DIRECTIVE: &str = "rule:";
const TERMS_PER_ROW: usize = RULE_SIZE * 2;

static SYMBOL_DEF: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\S)\s*=>\s*(.+)$").ok());
static ELEMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^#(\S{6}):(?:\s+(\S).*)?$").ok());
static MEMBERSHIP: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"^\s*-\s*"([^"]*)""#).ok());
static CHANCE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"([0-9.]+)%").ok());

fn captures<'t>(pattern: &Option<Regex>, text: &'t str) -> Option<Captures<'t>> {
    pattern.as_ref().and_then(|re| re.captures(text))
}

/// Everything one file produced.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub rules: Vec<Rule>,
    pub diagnostics: Vec<ParseError>,
    /// Set when the file ended inside a rule block; lines after it were never read.
    pub aborted: bool,
}

impl ParsedFile {
    /// Rules synthesized by mirroring rather than written out.
    pub fn mirrored_count(&self) -> usize {
        self.rules
            .iter()
            .filter(|r| r.source().mirror != Mirror::None)
            .count()
    }
}

enum State {
    Top,
    /// Just read an element declaration; membership lines attach to this color.
    Element(Color),
}

/// Parses rule files into rules, registering identities and key binds as it goes.
pub struct RuleParser<'r> {
    identities: &'r mut IdentityRegistry,
    binds: &'r mut KeyBindRegistry,
}

impl<'r> RuleParser<'r> {
    pub fn new(identities: &'r mut IdentityRegistry, binds: &'r mut KeyBindRegistry) -> Self {
        RuleParser { identities, binds }
    }

    pub fn parse(&mut self, file: &str, text: &str) -> ParsedFile {
        let lines: Vec<&str> = text.lines().collect();
        let mut out = ParsedFile::default();
        let mut symbols: HashMap<char, String> = HashMap::new();
        let mut state = State::Top;
        let mut cursor = 0;

        while cursor < lines.len() {
            let line_no = cursor + 1;
            let line = lines[cursor];
            cursor += 1;

            if let State::Element(color) = state {
                if let Some(caps) = captures(&MEMBERSHIP, line) {
                    let id = self.identities.get_or_create(&caps[1]);
                    self.identities.add_member(id, color);
                    continue;
                }
                state = State::Top;
            }

            if line.trim().is_empty() {
                continue;
            }

            if line.starts_with(DIRECTIVE) {
                if cursor + RULE_SIZE > lines.len() {
                    let err = ParseError::UnexpectedEof {
                        at: Location::new(file, lines.len()),
                    };
                    warn!("{}", err);
                    out.diagnostics.push(err);
                    out.aborted = true;
                    break;
                }
                let rows = &lines[cursor..cursor + RULE_SIZE];
                cursor += RULE_SIZE;
                match self.parse_rule(file, line_no, line, rows, &symbols) {
                    Ok(rules) => out.rules.extend(rules),
                    Err(err) => {
                        warn!("{}", err);
                        out.diagnostics.push(err);
                    }
                }
                continue;
            }

            if let Some(caps) = captures(&SYMBOL_DEF, line) {
                let symbol = caps[1].chars().next().unwrap_or(' ');
                if symbols.contains_key(&symbol) {
                    debug!(
                        "[Rules] {} line #{}: symbol '{}' already defined, keeping the first",
                        file, line_no, symbol
                    );
                } else {
                    symbols.insert(symbol, caps[2].trim().to_string());
                }
                continue;
            }

            if let Some(caps) = captures(&ELEMENT, line) {
                let Some(color) = Color::from_hex(&caps[1]) else {
                    let err = ParseError::MalformedColor {
                        at: Location::new(file, line_no),
                        text: format!("#{}", &caps[1]),
                    };
                    warn!("{}", err);
                    out.diagnostics.push(err);
                    continue;
                };
                if let Some(key) = caps.get(2).and_then(|m| m.as_str().chars().next()) {
                    self.binds.bind(key, color);
                }
                state = State::Element(color);
                continue;
            }

            let err = ParseError::UnparsedLine {
                at: Location::new(file, line_no),
            };
            warn!("{}", err);
            out.diagnostics.push(err);
        }

        out
    }

    fn parse_rule(
        &mut self,
        file: &str,
        directive_line: usize,
        directive: &str,
        rows: &[&str],
        symbols: &HashMap<char, String>,
    ) -> Result<Vec<Rule>, ParseError> {
        let probability = parse_probability(file, directive_line, directive)?;
        let markers = &directive[DIRECTIVE.len()..];
        let (flip_x, flip_y) = (markers.contains('x'), markers.contains('y'));
        if flip_x || flip_y {
            debug!(
                "[Rules] {} line #{}: mirror markers x={} y={}",
                file, directive_line, flip_x, flip_y
            );
        }

        let mut match_grid: Grid<MatchTerm> = [[MatchTerm::Wildcard; RULE_SIZE]; RULE_SIZE];
        let mut replace_grid: Grid<ReplaceTerm> = [[ReplaceTerm::Keep; RULE_SIZE]; RULE_SIZE];

        for (row, row_text) in rows.iter().enumerate() {
            let at = Location::new(file, directive_line + 1 + row);
            let mut terms = lexer::tokenize_row(row_text).map_err(|e| ParseError::Unterminated {
                at: at.clone(),
                text: e.0,
            })?;
            if terms.len() == TERMS_PER_ROW + 1 && matches!(terms[RULE_SIZE], "=>" | "->") {
                terms.remove(RULE_SIZE);
            }
            if terms.len() != TERMS_PER_ROW {
                return Err(ParseError::TermCount {
                    at,
                    row: row + 1,
                    found: terms.len(),
                });
            }

            for (col, text) in terms.iter().enumerate() {
                let block = if col < RULE_SIZE { Block::Match } else { Block::Replace };
                let lexeme = resolve(text, symbols).map_err(|kind| {
                    term_error(kind, at.clone(), block, text, row + 1, col % RULE_SIZE + 1)
                })?;
                let unknown = || ParseError::UnknownTerm {
                    at: at.clone(),
                    block,
                    text: text.to_string(),
                    row: row + 1,
                    column: col % RULE_SIZE + 1,
                };
                match block {
                    Block::Match => {
                        match_grid[row][col] = match lexeme {
                            Lexeme::Wildcard => MatchTerm::Wildcard,
                            Lexeme::Color(c) => MatchTerm::Exact(c),
                            Lexeme::Identity(name) => {
                                MatchTerm::Member(self.identities.get_or_create(name))
                            }
                            _ => return Err(unknown()),
                        }
                    }
                    Block::Replace => {
                        replace_grid[row][col - RULE_SIZE] = match lexeme {
                            Lexeme::Wildcard => ReplaceTerm::Keep,
                            Lexeme::Color(c) => ReplaceTerm::Set(c),
                            Lexeme::Offset { dx, dy } => ReplaceTerm::Copy { dx, dy },
                            Lexeme::OffsetEdited { dx, dy, dr, dg, db } => {
                                ReplaceTerm::CopyEdited { dx, dy, dr, dg, db }
                            }
                            Lexeme::Identity(name) => {
                                ReplaceTerm::RandomMember(self.identities.get_or_create(name))
                            }
                            Lexeme::Symbol(_) => return Err(unknown()),
                        }
                    }
                }
            }
        }

        let source = RuleSource {
            file: file.to_string(),
            line: directive_line,
            mirror: Mirror::None,
        };
        let base = Rule::new(match_grid, replace_grid, probability, source);
        Ok(mirror::synthesize(base, flip_x, flip_y))
    }
}

/// Failure to turn a raw term into a lexeme.
enum TermFailure {
    Lex(LexError),
    UnknownSymbol(char),
}

/// Classify a term, expanding a lone symbol once through the file's symbol table.
fn resolve<'a>(
    text: &'a str,
    symbols: &'a HashMap<char, String>,
) -> Result<Lexeme<'a>, TermFailure> {
    match lexer::classify(text).map_err(TermFailure::Lex)? {
        Lexeme::Symbol(c) => {
            let expansion = symbols.get(&c).ok_or(TermFailure::UnknownSymbol(c))?;
            lexer::classify(expansion).map_err(TermFailure::Lex)
        }
        lexeme => Ok(lexeme),
    }
}

fn term_error(
    failure: TermFailure,
    at: Location,
    block: Block,
    text: &str,
    row: usize,
    column: usize,
) -> ParseError {
    match failure {
        TermFailure::UnknownSymbol(symbol) => ParseError::UnknownSymbol { at, symbol },
        TermFailure::Lex(LexError::MalformedColor) => ParseError::MalformedColor {
            at,
            text: text.to_string(),
        },
        TermFailure::Lex(LexError::OutOfRange(number)) => {
            ParseError::NumberOutOfRange { at, text: number }
        }
        TermFailure::Lex(LexError::Unknown) => ParseError::UnknownTerm {
            at,
            block,
            text: text.to_string(),
            row,
            column,
        },
    }
}

/// `NN%` anywhere on the directive line; 1.0 when absent.
fn parse_probability(file: &str, line: usize, directive: &str) -> Result<f32, ParseError> {
    let Some(caps) = captures(&CHANCE, directive) else {
        return Ok(1.0);
    };
    let percent: f32 = caps[1]
        .parse()
        .map_err(|_| ParseError::InvalidProbability {
            at: Location::new(file, line),
            text: caps[0].to_string(),
        })?;
    if percent > 100.0 {
        warn!(
            "[Rules] {} line #{}: probability {}% clamped to 100%",
            file, line, percent
        );
    }
    Ok((percent / 100.0).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (ParsedFile, IdentityRegistry, KeyBindRegistry) {
        let mut ids = IdentityRegistry::new();
        let mut binds = KeyBindRegistry::new();
        let parsed = RuleParser::new(&mut ids, &mut binds).parse("test.rules", text);
        (parsed, ids, binds)
    }

    const SAND_FALLS: &str = "\
S => #E6C878
A => #9BD7E8

rule: 50%
* * * * *    * * * * *
* * * * *    * * * * *
* * S * * => * * A * *
* * A * *    * * S * *
* * * * *    * * * * *
";

    #[test]
    fn parses_rule_with_symbols_and_separator() {
        let (parsed, _, _) = parse(SAND_FALLS);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        assert_eq!(parsed.rules.len(), 1);
        let rule = &parsed.rules[0];
        let sand = Color::pack(0xE6, 0xC8, 0x78);
        assert_eq!(rule.probability(), 0.5);
        assert_eq!(rule.match_term(2, 2), MatchTerm::Exact(sand));
        assert_eq!(rule.replace_term(2, 3), ReplaceTerm::Set(sand));
        assert_eq!(rule.match_term(0, 0), MatchTerm::Wildcard);
        assert_eq!(rule.search_for().len(), 2);
        assert_eq!(rule.source().line, 4);
    }

    #[test]
    fn element_declaration_binds_key_and_memberships() {
        let text = "\
#FF0000: r
- \"solid\"
- \"hot\"

#0000FF:
- \"liquid\"
";
        let (parsed, ids, binds) = parse(text);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let red = Color::pack(255, 0, 0);
        assert_eq!(binds.lookup('R'), Some(red));
        assert_eq!(binds.len(), 1);
        let solid = ids.lookup("solid").unwrap();
        let hot = ids.lookup("hot").unwrap();
        let liquid = ids.lookup("liquid").unwrap();
        assert!(ids.is_member(solid, red));
        assert!(ids.is_member(hot, red));
        assert_eq!(ids.members(liquid), &[Color::pack(0, 0, 255)]);
    }

    #[test]
    fn membership_run_ends_at_first_other_line() {
        let text = "\
#00FF00: g
- \"plant\"
rule:
* * * * * * * * * *
* * * * * * * * * *
* * \"plant\" * * * * * * *
* * * * * * * * * *
* * * * * * * * * *
- \"orphan\"
";
        let (parsed, ids, _) = parse(text);
        assert_eq!(parsed.rules.len(), 1);
        assert!(ids.lookup("orphan").is_none());
        assert!(matches!(
            parsed.diagnostics.as_slice(),
            [ParseError::UnparsedLine { at }] if at.line == 9
        ));
    }

    #[test]
    fn forward_reference_creates_empty_identity() {
        let text = "\
rule:
* * * * * * * * * *
* * * * * * * * * *
* * \"fluid\" * * * * \"fluid\" * *
* * * * * * * * * *
* * * * * * * * * *
";
        let (parsed, ids, _) = parse(text);
        assert_eq!(parsed.rules.len(), 1);
        let fluid = ids.lookup("fluid").unwrap();
        assert!(ids.members(fluid).is_empty());
        assert_eq!(parsed.rules[0].match_term(2, 2), MatchTerm::Member(fluid));
        assert_eq!(parsed.rules[0].replace_term(2, 2), ReplaceTerm::RandomMember(fluid));
    }

    #[test]
    fn bad_rule_is_skipped_and_parsing_resumes() {
        let text = "\
rule:
* * * * * * * * * *
* * * * * * * * *
* * * * * * * * * *
* * * * * * * * * *
* * * * * * * * * *
rule: 25%
* * * * * * * * * *
* * * * * * * * * *
* * #123456 * * * * (0,-1) * *
* * * * * * * * * *
* * * * * * * * * *
";
        let (parsed, _, _) = parse(text);
        assert_eq!(parsed.rules.len(), 1);
        assert_eq!(parsed.rules[0].probability(), 0.25);
        assert_eq!(parsed.rules[0].source().line, 7);
        assert!(matches!(
            parsed.diagnostics.as_slice(),
            [ParseError::TermCount { at, row: 2, found: 9 }] if at.line == 3
        ));
        assert!(!parsed.aborted);
    }

    #[test]
    fn term_errors_are_specific() {
        let rule = |middle: &str| {
            format!(
                "rule:\n{r}\n{r}\n{}\n{r}\n{r}\n",
                middle,
                r = "* * * * * * * * * *"
            )
        };
        let (p, _, _) = parse(&rule("* * Q * * * * * * *"));
        assert!(matches!(p.diagnostics[0], ParseError::UnknownSymbol { symbol: 'Q', .. }));

        let (p, _, _) = parse(&rule("* * #12345 * * * * * * *"));
        assert!(matches!(p.diagnostics[0], ParseError::MalformedColor { .. }));

        let (p, _, _) = parse(&rule("* * (0,1) * * * * * * *"));
        assert!(matches!(
            p.diagnostics[0],
            ParseError::UnknownTerm { block: Block::Match, column: 3, row: 3, .. }
        ));

        let (p, _, _) = parse(&rule("* * * * * * * (0,200) * *"));
        assert!(matches!(p.diagnostics[0], ParseError::NumberOutOfRange { .. }));

        let (p, _, _) = parse(&rule("* * * * * * * (0,1 * *"));
        assert!(matches!(p.diagnostics[0], ParseError::Unterminated { .. }));
        assert!(p.rules.is_empty());
    }

    #[test]
    fn eof_inside_rule_aborts_file_but_keeps_earlier_rules() {
        let text = "\
rule:
* * * * * * * * * *
* * * * * * * * * *
* * * * * * * * * *
* * * * * * * * * *
* * * * * * * * * *
rule:
* * * * * * * * * *
";
        let (parsed, _, _) = parse(text);
        assert!(parsed.aborted);
        assert_eq!(parsed.rules.len(), 1);
        assert!(parsed.diagnostics[0].is_fatal());
    }

    #[test]
    fn mirror_markers_synthesize_variants() {
        let text = "\
rule: 10% x y
* * * * * * * * * *
* * * * * * * * * *
* * #FFFFFF * * * * * (1,1) *
* * * * * * * * * *
* * * * * * * * * *
";
        let (parsed, _, _) = parse(text);
        assert_eq!(parsed.rules.len(), 4);
        assert_eq!(parsed.mirrored_count(), 3);
        assert_eq!(parsed.rules[1].replace_term(1, 2), ReplaceTerm::Copy { dx: -1, dy: 1 });
        assert_eq!(parsed.rules[2].replace_term(3, 2), ReplaceTerm::Copy { dx: 1, dy: -1 });
        assert_eq!(parsed.rules[3].replace_term(1, 2), ReplaceTerm::Copy { dx: -1, dy: -1 });
        assert!(parsed.rules.iter().all(|r| r.probability() == 0.1));
    }

    #[test]
    fn first_symbol_definition_wins() {
        let text = "\
S => #111111
S => #222222
rule:
* * * * * * * * * *
* * * * * * * * * *
* * S * * * * * * *
* * * * * * * * * *
* * * * * * * * * *
";
        let (parsed, _, _) = parse(text);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        assert_eq!(
            parsed.rules[0].match_term(2, 2),
            MatchTerm::Exact(Color::pack(0x11, 0x11, 0x11))
        );
    }

    #[test]
    fn probability_token_forms() {
        assert_eq!(parse_probability("f", 1, "rule:").unwrap(), 1.0);
        assert_eq!(parse_probability("f", 1, "rule: 0%").unwrap(), 0.0);
        assert_eq!(parse_probability("f", 1, "rule: 2.5%").unwrap(), 0.025);
        assert_eq!(parse_probability("f", 1, "rule: 150%").unwrap(), 1.0);
        assert!(matches!(
            parse_probability("f", 1, "rule: 1.2.3%"),
            Err(ParseError::InvalidProbability { .. })
        ));
    }
}
