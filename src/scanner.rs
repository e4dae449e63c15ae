//! Module `scanner` implements a one‑pass, streaming UTF‑8 lexer for Rox.
//!
//! It transforms a source string into a sequence of [`Token`]s, skipping
//! whitespace and comments, and emitting exactly one `EOF` token at the end.
//! Designed as a `FusedIterator`, it can be chained safely with other
//! iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a lexer for brace‑delimited source.
//!
//! - `Scanner::with_layout(src, Layout::Indentation)`
//!   Create a lexer that turns indentation into synthetic block tokens.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token, LoxError>` on each `.next()`.  An `Err` reports a
//!   lexing error with line information; scanning always continues after it.
//!
//! - `Scanner::scan_tokens(self, &mut Diagnostics) -> Vec<Token>`
//!   Drain the iterator, reporting errors and keeping the best‑effort tokens.
//!
//! # Token Recognition (`scan_token`)
//!
//! Checks run in a fixed order: single‑character punctuators, two‑character
//! operators (`!=`, `==`, `<=`, `>=`), `/` versus `//` comments, whitespace,
//! string literals (with backslash escapes), numbers, identifiers/keywords
//! (perfect‑hash `KEYWORDS` map), and finally "unexpected character".
//!
//! # Block delimiting
//!
//! With [`Layout::Indentation`] the scanner keeps a stack of indentation
//! depths.  A line ending in `:` opens a block; a deeper next line pushes its
//! depth and emits a synthetic `{`, a shallower line pops levels emitting one
//! synthetic `}` per level.  The end of every logical line emits a synthetic
//! `;`.  Blank and comment‑only lines are elided and newlines inside
//! parentheses are ignored, so the parser never sees the difference.

use crate::error::{Diagnostics, LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::collections::VecDeque;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// How blocks and statements are delimited in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// `{ ... }` blocks and explicit `;` terminators.
    #[default]
    Braces,

    /// Significant indentation; `:` at end of line opens a block.
    Indentation,
}

/// A single pass **scanner / lexer** over a UTF‑8 source string.
pub struct Scanner<'a> {
    src: &'a str,
    start: usize,               // byte index of the first byte of the current lexeme
    curr: usize,                // byte index one past the last byte examined
    line: usize,                // 1‑based line counter (\n increments)
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
    finished: bool,             // EOF has been queued

    layout: Layout,
    queue: VecDeque<Result<Token>>, // synthetic tokens waiting to be emitted
    indents: Vec<usize>,            // open indentation depths, bottom is 0
    at_line_start: bool,
    line_has_tokens: bool,
    block_opener: bool, // previous logical line ended with ':'
    paren_depth: usize,
    last: Option<TokenType>,
}

impl<'a> Scanner<'a> {
    /// Create a new brace‑layout lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        Self::with_layout(src, Layout::Braces)
    }

    /// Create a new lexer over `src` using the given block layout.
    pub fn with_layout(src: &'a str, layout: Layout) -> Self {
        info!("Scanner created over {} bytes ({:?})", src.len(), layout);

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
            finished: false,
            layout,
            queue: VecDeque::new(),
            indents: vec![0],
            at_line_start: true,
            line_has_tokens: false,
            block_opener: false,
            paren_depth: 0,
            last: None,
        }
    }

    /// Scan the whole input.  Errors go to `diagnostics`; the returned tokens
    /// are the best‑effort stream and always end with `EOF`.
    pub fn scan_tokens(self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();

        for result in self {
            match result {
                Ok(token) => tokens.push(token),
                Err(e) => diagnostics.report(e),
            }
        }

        info!("Scanned {} tokens", tokens.len());

        tokens
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    /// Are we at (or past) the end of input?
    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Advance one byte and return it.  Callers guard with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes()[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.byte_at(self.curr)
    }

    /// Peek one byte beyond [`peek`].  Safe at EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.byte_at(self.curr + 1)
    }

    #[inline(always)]
    fn byte_at(&self, index: usize) -> u8 {
        self.bytes().get(index).copied().unwrap_or(0)
    }

    /// Decode the full character starting at byte `index`.
    fn char_at(&self, index: usize) -> Option<char> {
        self.src.get(index..).and_then(|rest| rest.chars().next())
    }

    /// Conditionally consume a byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* token starting at `self.curr`.  If the lexeme produces an
    /// actual token the kind is stored in `self.pending`.  Whitespace and
    /// comments are skipped by returning `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            // ── single‑character punctuators ──────────────────────────────
            b'(' => self.pending = Some(TokenType::LEFT_PAREN),
            b')' => self.pending = Some(TokenType::RIGHT_PAREN),
            b'{' => self.pending = Some(TokenType::LEFT_BRACE),
            b'}' => self.pending = Some(TokenType::RIGHT_BRACE),
            b',' => self.pending = Some(TokenType::COMMA),
            b'.' => self.pending = Some(TokenType::DOT),
            b'-' => self.pending = Some(TokenType::MINUS),
            b'+' => self.pending = Some(TokenType::PLUS),
            b';' => self.pending = Some(TokenType::SEMICOLON),
            b'*' => self.pending = Some(TokenType::STAR),
            b':' => {
                if self.layout == Layout::Indentation && self.rest_of_line_is_blank() {
                    // block opener: swallowed, the next line must indent
                    self.block_opener = true;
                    return Ok(());
                }

                self.pending = Some(TokenType::COLON);
            }

            // ── two‑character operators (!=, ==, <=, >=) ─────────────────
            b'!' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::BANG_EQUAL
                } else {
                    TokenType::BANG
                };

                self.pending = Some(tt);
            }

            b'=' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::EQUAL_EQUAL
                } else {
                    TokenType::EQUAL
                };

                self.pending = Some(tt);
            }

            b'<' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::LESS_EQUAL
                } else {
                    TokenType::LESS
                };

                self.pending = Some(tt);
            }

            b'>' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                };

                self.pending = Some(tt);
            }

            // ── comments (// … until newline) ────────────────────────────
            b'/' => {
                if self.match_byte(b'/') {
                    // Fast‑forward to the next newline; the newline itself is
                    // scanned normally so line counting stays in one place.
                    if let Some(pos) = memchr(b'\n', &self.bytes()[self.curr..]) {
                        self.curr += pos;
                    } else {
                        self.curr = self.src.len();
                    }

                    return Ok(());
                }

                self.pending = Some(TokenType::SLASH);
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => {
                return Ok(());
            }

            b'\n' => {
                if self.layout == Layout::Indentation {
                    self.end_of_line();
                }

                self.line += 1;

                return Ok(());
            }

            // ── string literal " … " ─────────────────────────────────────
            b'"' => {
                return self.parse_string();
            }

            // ── number literal (digit‑leading) ───────────────────────────
            b'0'..=b'9' => {
                return self.parse_number();
            }

            // ── identifiers / keywords (alpha or underscore‑leading) ─────
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.parse_identifier();
            }

            // ── multi‑byte characters ────────────────────────────────────
            0x80..=0xff => {
                let ch: char = self.char_at(self.start).unwrap_or(char::REPLACEMENT_CHARACTER);
                self.curr = self.start + ch.len_utf8();

                if ch.is_alphabetic() {
                    self.parse_identifier();
                } else {
                    return Err(LoxError::lex(
                        self.line,
                        format!("Unexpected character: {}", ch),
                    ));
                }
            }

            // ── unexpected character ─────────────────────────────────────
            _ => {
                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", b as char),
                ));
            }
        }

        Ok(())
    }

    /// Parse a double‑quoted string literal, decoding backslash escapes.
    ///
    /// * `self.start` still points to the opening `"`.
    /// * When we return, `self.curr` points **past** the closing `"`.
    fn parse_string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            let b = self.advance();

            if b == b'\n' {
                self.line += 1; // multi‑line strings are allowed
            } else if b == b'\\' && !self.is_at_end() {
                // the escaped byte can never close the string
                if self.advance() == b'\n' {
                    self.line += 1;
                }
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // consume closing quote

        let raw: &str = &self.src[self.start + 1..self.curr - 1];
        let value: String = unescape(raw)
            .ok_or_else(|| LoxError::lex(self.line, "Invalid escape sequence."))?;

        self.pending = Some(TokenType::STRING(value));

        Ok(())
    }

    /// Parse a numeric literal (`123`, `3.14`).  Fractions are optional.
    fn parse_number(&mut self) -> Result<()> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // Optional fractional part.
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: &str = &self.src[self.start..self.curr];
        let n: f64 = text
            .parse::<f64>()
            .map_err(|e| LoxError::lex(self.line, format!("Invalid number '{}': {}", text, e)))?;

        self.pending = Some(TokenType::NUMBER(n));

        Ok(())
    }

    /// Parse an identifier and decide if it is a **keyword** or a generic
    /// `IDENTIFIER` token.
    fn parse_identifier(&mut self) {
        while let Some(c) = self.char_at(self.curr) {
            if c.is_alphanumeric() || c == '_' {
                self.curr += c.len_utf8();
            } else {
                break;
            }
        }

        let slice: &[u8] = &self.bytes()[self.start..self.curr];

        let tt: TokenType = KEYWORDS
            .get(slice)
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER);

        self.pending = Some(tt);
    }

    // ───────────────────────────── block delimiting ─────────────────────────

    /// Only spaces, tabs or a `//` comment remain before the next newline.
    fn rest_of_line_is_blank(&self) -> bool {
        let mut i = self.curr;

        loop {
            match self.byte_at(i) {
                b' ' | b'\t' | b'\r' => i += 1,
                b'/' => return self.byte_at(i + 1) == b'/',
                b'\n' | 0 => return true,
                _ => return false,
            }
        }
    }

    /// A newline outside parentheses ends the logical line.
    fn end_of_line(&mut self) {
        if self.paren_depth > 0 {
            return;
        }

        self.at_line_start = true;

        if self.line_has_tokens {
            self.line_has_tokens = false;
            self.terminate_line();
        }
    }

    /// Queue a synthetic `;` unless the line opened a block or is already
    /// terminated.
    fn terminate_line(&mut self) {
        if self.block_opener {
            return;
        }

        let needs_terminator: bool = !matches!(
            self.last,
            None | Some(TokenType::SEMICOLON)
                | Some(TokenType::LEFT_BRACE)
                | Some(TokenType::RIGHT_BRACE)
        );

        if needs_terminator {
            self.push_synthetic(TokenType::SEMICOLON, ";");
        }
    }

    /// Measure the indentation of a new line and emit block tokens.
    fn indent(&mut self) {
        let mut i = self.curr;
        while matches!(self.byte_at(i), b' ' | b'\t') {
            i += 1;
        }
        let depth: usize = i - self.curr;

        // blank and comment‑only lines never change the block structure
        let blank: bool = match self.byte_at(i) {
            b'\n' | b'\r' | 0 => true,
            b'/' => self.byte_at(i + 1) == b'/',
            _ => false,
        };

        if blank {
            return;
        }

        let top: usize = self.indents.last().copied().unwrap_or(0);
        let opener: bool = std::mem::replace(&mut self.block_opener, false);

        if depth > top {
            if opener {
                debug!("Indent to {} on line {}", depth, self.line);
                self.indents.push(depth);
                self.push_synthetic(TokenType::LEFT_BRACE, "{");
            } else {
                self.queue
                    .push_back(Err(LoxError::lex(self.line, "Unexpected indent.")));
            }

            return;
        }

        if opener {
            self.queue.push_back(Err(LoxError::lex(
                self.line,
                "Expected an indented block.",
            )));
        }

        while depth < self.indents.last().copied().unwrap_or(0) {
            debug!("Dedent below {} on line {}", depth, self.line);
            self.indents.pop();
            self.push_synthetic(TokenType::RIGHT_BRACE, "}");
        }

        if depth != self.indents.last().copied().unwrap_or(0) {
            self.queue.push_back(Err(LoxError::lex(
                self.line,
                "Unindent does not match any outer indentation level.",
            )));
        }
    }

    /// Close the last line and every open block before `EOF`.
    fn flush_blocks(&mut self) {
        if self.line_has_tokens {
            self.line_has_tokens = false;
            self.terminate_line();
        }

        if std::mem::replace(&mut self.block_opener, false) {
            self.queue.push_back(Err(LoxError::lex(
                self.line,
                "Expected an indented block.",
            )));
        }

        while self.indents.len() > 1 {
            self.indents.pop();
            self.push_synthetic(TokenType::RIGHT_BRACE, "}");
        }
    }

    fn push_synthetic(&mut self, tt: TokenType, lexeme: &str) {
        self.last = Some(tt.clone());
        self.queue.push_back(Ok(Token::new(tt, lexeme, self.line)));
    }

    /// Book‑keeping for every real token leaving the scanner.
    fn record(&mut self, tt: &TokenType) {
        match tt {
            TokenType::LEFT_PAREN => self.paren_depth += 1,
            TokenType::RIGHT_PAREN => self.paren_depth = self.paren_depth.saturating_sub(1),
            _ => {}
        }

        self.line_has_tokens = true;
        self.last = Some(tt.clone());
    }
}

/// Decode `\\ \" \n \r \b \t \f \v`.  Returns `None` on any other escape.
fn unescape(raw: &str) -> Option<String> {
    let mut out: String = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let decoded: char = match chars.next()? {
            '\\' => '\\',
            '"' => '"',
            'n' => '\n',
            'r' => '\r',
            'b' => '\u{8}',
            't' => '\t',
            'f' => '\u{c}',
            'v' => '\u{b}',
            _ => return None,
        };

        out.push(decoded);
    }

    Some(out)
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // 1. Synthetic tokens and deferred errors go first.
            if let Some(item) = self.queue.pop_front() {
                return Some(item);
            }

            if self.finished {
                return None; // already yielded EOF
            }

            // 2. EOF guard – close blocks, emit exactly one EOF.
            if self.is_at_end() {
                if self.layout == Layout::Indentation {
                    self.flush_blocks();
                }

                self.finished = true;
                self.queue
                    .push_back(Ok(Token::new(TokenType::EOF, "", self.line)));
                continue;
            }

            // 3. Indentation is measured once per logical line.
            if self.layout == Layout::Indentation && self.at_line_start {
                self.at_line_start = false;
                self.indent();
                continue;
            }

            // 4. Reset per‑token state and scan.
            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            // 5. If a real token was recognised, build and return it.
            if let Some(tt) = self.pending.take() {
                self.record(&tt);
                let lexeme: &str = &self.src[self.start..self.curr];
                debug!("Scanned token ({:?}) on line {}", tt, self.line);

                return Some(Ok(Token::new(tt, lexeme, self.line)));
            }
            // Otherwise it was whitespace / comment → continue loop.
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
