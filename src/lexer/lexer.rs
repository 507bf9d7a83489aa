use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

macro_rules! pattern {
    ($regex:expr, $handler:expr) => {
        RegexPattern {
            regex: Regex::new($regex).unwrap(),
            handler: $handler,
        }
    };
}

lazy_static! {
    /// Tried in order; the first pattern matching at the current position wins.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern!(r"^\s+", skip_handler),
        pattern!(r"^\d{1,2}\.\d{1,2}\.\d{4}(@\d{1,2}:\d{2}(:\d{2})?)?", date_handler),
        pattern!(r"^(\d+[ywdhms])+\b", timespan_handler),
        pattern!(r"^\d+(\.\d+)?([eE][+-]?\d+)?", number_handler),
        pattern!(r#"^"(\\.|[^"\\])*""#, string_handler),
        pattern!(r#"^""#, unclosed_string_handler),
        pattern!(r"^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern!(r"^\\\(", MK_DEFAULT_HANDLER!(TokenKind::Lambda, "\\(")),
        pattern!(r"^->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
        pattern!(r"^\.\.", MK_DEFAULT_HANDLER!(TokenKind::DotDot, "..")),
        pattern!(r"^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern!(r"^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern!(r"^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern!(r"^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern!(r"^&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
        pattern!(r"^\|\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
        pattern!(r"^\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        pattern!(r"^\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        pattern!(r"^\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern!(r"^\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern!(r"^\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern!(r"^\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern!(r"^!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
        pattern!(r"^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern!(r"^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern!(r"^\$", MK_DEFAULT_HANDLER!(TokenKind::Dollar, "$")),
        pattern!(r"^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern!(r"^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern!(r"^\?", MK_DEFAULT_HANDLER!(TokenKind::Question, "?")),
        pattern!(r"^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern!(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern!(r"^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern!(r"^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern!(r"^\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern!(r"^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
        pattern!(r"^\^", MK_DEFAULT_HANDLER!(TokenKind::Caret, "^")),
    ];
}

pub struct Lexer<'a> {
    tokens: Vec<Token>,
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            tokens: vec![],
            source,
            pos: 0,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn pos(&self) -> u32 {
        self.pos as u32
    }

    pub fn remainder(&self) -> &'a str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn matched(&self, regex: &Regex) -> &'a str {
        regex.find(self.remainder()).map(|m| m.as_str()).unwrap_or("")
    }

    fn span_of(&self, text: &str) -> Span {
        Span::new(self.pos(), self.pos() + text.len() as u32)
    }

    fn push_matched(&mut self, kind: TokenKind, value: String, text: &str) {
        let span = self.span_of(text);
        self.push(MK_TOKEN!(kind, value, span));
        self.advance_n(text.len());
    }
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    Ok(())
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.push_matched(TokenKind::Number, matched.to_string(), matched);
    Ok(())
}

fn date_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);

    if parse_date(matched).is_none() {
        return Err(Error::new(
            ErrorImpl::InvalidDate {
                token: matched.to_string(),
            },
            lexer.span_of(matched),
        ));
    }

    lexer.push_matched(TokenKind::Date, matched.to_string(), matched);
    Ok(())
}

fn timespan_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);

    if parse_timespan(matched).is_none() {
        return Err(Error::new(
            ErrorImpl::InvalidTimespan {
                token: matched.to_string(),
            },
            lexer.span_of(matched),
        ));
    }

    lexer.push_matched(TokenKind::Timespan, matched.to_string(), matched);
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let value = unescape(&matched[1..matched.len() - 1]);
    lexer.push_matched(TokenKind::String, value, matched);
    Ok(())
}

fn unclosed_string_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let rest = lexer.remainder();
    Err(Error::new(ErrorImpl::UnclosedString, lexer.span_of(rest)))
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex);

    if let Some(kind) = RESERVED_LOOKUP.get(value) {
        lexer.push_matched(*kind, value.to_string(), value);
    } else {
        lexer.push_matched(TokenKind::Identifier, value.to_string(), value);
    }

    Ok(())
}

/// Parses `dd.mm.yyyy` with an optional `@hh:mm[:ss]` suffix.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let (date, time) = match text.split_once('@') {
        Some((date, time)) => (date, Some(time)),
        None => (text, None),
    };

    let mut parts = date.split('.').map(|p| p.parse::<u32>().ok());
    let day = parts.next()??;
    let month = parts.next()??;
    let year = parts.next()?? as i32;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    match time {
        None => date.and_hms_opt(0, 0, 0),
        Some(time) => {
            let mut parts = time.split(':').map(|p| p.parse::<u32>().ok());
            let hour = parts.next()??;
            let minute = parts.next()??;
            let second = parts.next().unwrap_or(Some(0))?;
            date.and_hms_opt(hour, minute, second)
        }
    }
}

/// Seconds per timespan unit.
pub fn timespan_unit(unit: char) -> Option<i64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3_600),
        'd' => Some(86_400),
        'w' => Some(604_800),
        'y' => Some(31_536_000),
        _ => None,
    }
}

/// Parses a timespan such as `1d4h10m` into seconds. Every unit may appear
/// at most once.
pub fn parse_timespan(text: &str) -> Option<i64> {
    let mut seen = vec![];
    let mut total: i64 = 0;
    let mut amount: i64 = 0;

    for c in text.chars() {
        if let Some(digit) = c.to_digit(10) {
            amount = amount.checked_mul(10)?.checked_add(digit as i64)?;
        } else {
            if seen.contains(&c) {
                return None;
            }
            seen.push(c);
            total = total.checked_add(amount.checked_mul(timespan_unit(c)?)?)?;
            amount = 0;
        }
    }

    Some(total)
}

pub fn unescape(raw: &str) -> String {
    let mut result = String::new();
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Inverse of [`unescape`], producing the body of a string literal.
pub fn escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());

    for ch in value.chars() {
        match ch {
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            _ => result.push(ch),
        }
    }

    result
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source);

    while !lex.at_eof() {
        let mut matched = false;

        for pattern in PATTERNS.iter() {
            if pattern.regex.is_match(lex.remainder()) {
                (pattern.handler)(&mut lex, &pattern.regex)?;
                matched = true;
                break;
            }
        }

        if !matched {
            let token = lex.remainder().chars().next().map(String::from).unwrap_or_default();
            let span = lex.span_of(&token);
            return Err(Error::new(ErrorImpl::UnrecognisedToken { token }, span));
        }
    }

    let end = lex.pos();
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), Span::new(end, end)));
    trace!(tokens = lex.tokens.len(), "tokenized input");
    Ok(lex.tokens)
}
