//! Parse proof text into statements.

use std::fmt::{self, Display};
use std::sync::Arc;

use thiserror::Error;

use super::{Expr, Label, Statement, StatementKind, Symbol};

/// Deepest nesting of parentheses, negations, implication chains and `&`/`|`
/// chains accepted by the parser.
///
/// Every tree node below the top `->` is counted, so a parsed formula is only
/// a couple of levels deeper than this. Simplification relies on that bound,
/// see [`crate::simplify::MAX_DEPTH`].
pub const MAX_NESTING: usize = 128;

pub fn parse_program(filename: Option<String>, input: &str) -> Result<Vec<Statement>, ParseError> {
    let (out, _rest) = program(&Context::new(filename, input))?;
    Ok(out)
}

pub fn parse_expr(filename: Option<String>, input: &str) -> Result<Expr, ParseError> {
    let (out, rest) = expr(&Context::new(filename, input))?;
    if !rest.is_at_end() {
        return Err(ParseError::TrailingInput(rest.found_span()));
    }
    Ok(out)
}

/// A [`Span`] contains the file name and a pair of offsets representing the start and the end.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span(Arc<SrcFile>, usize, usize);

lazy_static::lazy_static! {
    pub static ref DUMMY_SPAN: Span = Span(Arc::new(SrcFile {name: None, contents: String::new()}), 0, 0);
}

impl Span {
    pub fn string(&self) -> &str {
        &self.0.contents[self.1..self.2]
    }

    pub fn is_dummy(&self) -> bool {
        self.0.contents.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct SrcFile {
    name: Option<String>,
    contents: String,
}

struct Location {
    line: usize,
    col: usize,
}

impl SrcFile {
    fn get_location(&self, offset: usize) -> Location {
        let mut line = 1;
        let mut col = 1;
        for (i, c) in self.contents.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Location { line, col }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dummy() {
            return write!(f, "In <no source>");
        }
        let start = self.0.get_location(self.1);
        let end = self.0.get_location(self.2.saturating_sub(1).max(self.1));
        let quote = self.string();
        match (&self.0.name, start.line == end.line) {
            (Some(filename), true) => write!(
                f,
                "In {}:{}-{} of {filename}: {quote}",
                start.line, start.col, end.col
            ),
            (Some(filename), false) => write!(
                f,
                "In {}:{}-{}:{} of {filename}: {quote}",
                start.line, start.col, end.line, end.col
            ),
            (None, false) => write!(
                f,
                "In {}:{}-{}:{}: {quote}",
                start.line, start.col, end.line, end.col
            ),
            (None, true) => write!(f, "In {}:{}-{}: {quote}", start.line, start.col, end.col),
        }
    }
}

#[derive(Clone, Debug)]
struct Context {
    source: Arc<SrcFile>,
    index: usize,
    /// End of the last consumed token, before any whitespace or comments.
    token_end: usize,
    depth: usize,
}

impl Context {
    fn new(name: Option<String>, contents: &str) -> Context {
        let mut next = Context {
            source: Arc::new(SrcFile {
                name,
                contents: contents.to_string(),
            }),
            index: 0,
            token_end: 0,
            depth: 0,
        };
        next.advance_past_whitespace();
        next
    }

    fn rest(&self) -> &str {
        &self.source.contents[self.index..]
    }

    fn advance_text(&self, s: &str, skip_whitespace: bool) -> Option<(Span, Context)> {
        if self.rest().starts_with(s) {
            let mut next = self.clone();
            next.index += s.len();
            next.token_end = next.index;
            let span = Span(self.source.clone(), self.index, next.index);
            if skip_whitespace {
                next.advance_past_whitespace();
            }
            Some((span, next))
        } else {
            None
        }
    }

    fn advance_past_whitespace(&mut self) {
        let mut iter = self.source.contents[self.index..].char_indices();
        loop {
            let end = match iter.next() {
                Some((_, c)) if c.is_whitespace() => None,
                Some((_, ';' | '#')) => {
                    loop {
                        match iter.next() {
                            Some((_, '\n' | '\r')) | None => break,
                            Some(_) => {}
                        }
                    }
                    None
                }
                Some((i, _)) => Some(self.index + i),
                None => Some(self.source.contents.len()),
            };
            if let Some(i) = end {
                self.index = i;
                return;
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.index == self.source.contents.len()
    }

    /// Span of the next character, used to report what was found instead of what was expected.
    fn found_span(&self) -> Span {
        let len = self.rest().chars().next().map_or(0, char::len_utf8);
        Span(self.source.clone(), self.index, self.index + len)
    }
}

type Res<T> = Result<(T, Context), ParseError>;

trait Parser<T>: Fn(&Context) -> Res<T> + Clone {}
impl<T, F: Fn(&Context) -> Res<T> + Clone> Parser<T> for F {}

fn text_exact(s: &str) -> impl Parser<Span> + '_ {
    text_internal(s, false)
}

fn text(s: &str) -> impl Parser<Span> + '_ {
    text_internal(s, true)
}

fn text_internal(s: &str, skip_whitespace: bool) -> impl Parser<Span> + '_ {
    move |ctx| {
        if let Some((span, next)) = ctx.advance_text(s, skip_whitespace) {
            Ok((span, next))
        } else {
            Err(ParseError::ExpectedText(ctx.found_span(), format!("`{s}`")))
        }
    }
}

fn repeat_all<T>(parser: impl Parser<T>) -> impl Parser<Vec<T>> {
    move |ctx| {
        let mut vec = Vec::new();
        let mut next = ctx.clone();
        while !next.is_at_end() {
            let (x, rest) = parser(&next)?;
            vec.push(x);
            next = rest;
        }
        Ok((vec, next))
    }
}

/// Tries `a`, then `b`. Fatal errors from `a` are not retried.
fn choice<T>(a: impl Parser<T>, b: impl Parser<T>) -> impl Parser<T> {
    move |ctx| match a(ctx) {
        Err(err) if !err.is_fatal() => b(ctx),
        res => res,
    }
}

macro_rules! choices {
    ( $x:expr , ) => { $x };
    ( $x:expr $( , $xs:expr )+ , ) => {
        choice( $x, choices!( $( $xs , )+ ) )
    };
}

fn map<T, U>(parser: impl Parser<T>, f: impl Fn(T) -> U + Clone) -> impl Parser<U> {
    move |ctx| {
        let (x, next) = parser(ctx)?;
        Ok((f(x), next))
    }
}

fn sequence<T, U>(a: impl Parser<T>, b: impl Parser<U>) -> impl Parser<(T, U)> {
    move |ctx| {
        let (x, next) = a(ctx)?;
        let (y, next) = b(&next)?;
        Ok(((x, y), next))
    }
}

fn sequence3<T, U, V>(
    a: impl Parser<T>,
    b: impl Parser<U>,
    c: impl Parser<V>,
) -> impl Parser<(T, U, V)> {
    move |ctx| {
        let (x, next) = a(ctx)?;
        let (y, next) = b(&next)?;
        let (z, next) = c(&next)?;
        Ok(((x, y, z), next))
    }
}

fn option<T>(parser: impl Parser<T>) -> impl Parser<Option<T>> {
    move |ctx| match parser(ctx) {
        Ok((x, next)) => Ok((Some(x), next)),
        Err(err) if err.is_fatal() => Err(err),
        Err(_) => Ok((None, ctx.clone())),
    }
}

/// Runs `parser` one nesting level deeper, failing once [`MAX_NESTING`] is exceeded.
fn nested<T>(parser: impl Parser<T>) -> impl Parser<T> {
    move |ctx| {
        if ctx.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep(ctx.found_span()));
        }
        let mut inner = ctx.clone();
        inner.depth += 1;
        let (x, mut next) = parser(&inner)?;
        next.depth = ctx.depth;
        Ok((x, next))
    }
}

/// `operand (op operand)*`, folded to the left. Once an operator is read the
/// operand after it is mandatory.
///
/// Every folded operator nests the tree one level deeper, so it counts against
/// [`MAX_NESTING`] like a parenthesis, and the operand after it is parsed at
/// that depth.
fn left_assoc(
    operand: impl Parser<Expr>,
    op: impl Parser<Span>,
    build: fn(Expr, Expr) -> Expr,
) -> impl Parser<Expr> {
    move |ctx| {
        let (mut acc, mut next) = operand(ctx)?;
        let mut depth = ctx.depth;
        while let Ok((_, mut after)) = op(&next) {
            if depth >= MAX_NESTING {
                return Err(ParseError::TooDeep(next.found_span()));
            }
            depth += 1;
            after.depth = depth;
            let (rhs, mut rest) = operand(&after)?;
            rest.depth = ctx.depth;
            acc = build(acc, rhs);
            next = rest;
        }
        Ok((acc, next))
    }
}

fn program(ctx: &Context) -> Res<Vec<Statement>> {
    repeat_all(statement)(ctx)
}

fn statement(ctx: &Context) -> Res<Statement> {
    let start = ctx.index;
    let (kind, next) = choice(
        map(text_exact("P["), |_| StatementKind::Premise),
        map(text_exact("C["), |_| StatementKind::Conclusion),
    )(ctx)
    .map_err(|_| ParseError::ExpectedText(ctx.found_span(), "`P[` or `C[`".into()))?;
    let mut next = next;
    next.advance_past_whitespace();
    let (label, next) = label(&next)?;
    let ((_, _, expr), next) = sequence3(
        text("]"),
        option(choice(text("."), text(":"))),
        expr,
    )(&next)?;
    let span = Span(ctx.source.clone(), start, next.token_end);
    Ok((
        Statement {
            span,
            kind,
            label,
            expr,
        },
        next,
    ))
}

fn label(ctx: &Context) -> Res<Label> {
    let digits = ctx.rest().chars().take_while(char::is_ascii_digit).count();
    let span = Span(ctx.source.clone(), ctx.index, ctx.index + digits);
    if digits == 0 {
        return Err(ParseError::ExpectedLabel(ctx.found_span()));
    }
    let n: Label = span
        .string()
        .parse()
        .map_err(|_| ParseError::ExpectedLabel(span.clone()))?;
    if n == 0 {
        return Err(ParseError::ZeroLabel(span));
    }
    let mut next = ctx.clone();
    next.index += digits;
    next.token_end = next.index;
    next.advance_past_whitespace();
    Ok((n, next))
}

fn expr(ctx: &Context) -> Res<Expr> {
    let (left, next) = disjunction(ctx)?;
    match choice(text("->"), text("→"))(&next) {
        Ok((_, after)) => {
            let (right, rest) = nested(expr)(&after)?;
            Ok((Expr::implies(left, right), rest))
        }
        Err(_) => Ok((left, next)),
    }
}

fn disjunction(ctx: &Context) -> Res<Expr> {
    left_assoc(conjunction, choice(text("|"), text("∨")), Expr::or)(ctx)
}

fn conjunction(ctx: &Context) -> Res<Expr> {
    left_assoc(unary, choice(text("&"), text("∧")), Expr::and)(ctx)
}

fn unary(ctx: &Context) -> Res<Expr> {
    choices!(
        map(
            sequence(choices!(text("¬"), text("~"), text("!"),), nested(unary)),
            |(_, inner)| Expr::not(inner)
        ),
        atom,
    )(ctx)
}

fn atom(ctx: &Context) -> Res<Expr> {
    choices!(
        map(ident, Expr::Var),
        map(nested(sequence3(text("("), expr, text(")"))), |(_, e, _)| e),
    )(ctx)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

fn ident(ctx: &Context) -> Res<Symbol> {
    let len: usize = ctx
        .rest()
        .chars()
        .take_while(|c| is_ident_char(*c))
        .map(char::len_utf8)
        .sum();
    let span = Span(ctx.source.clone(), ctx.index, ctx.index + len);
    // `P[` and `C[` open a new statement
    if len == 0 || ctx.rest()[len..].starts_with('[') {
        return Err(ParseError::ExpectedIdent(ctx.found_span()));
    }

    let mut next = ctx.clone();
    next.index += len;
    next.token_end = next.index;
    next.advance_past_whitespace();

    Ok((Symbol::from(span.string()), next))
}

fn found(span: &Span) -> String {
    if span.string().is_empty() {
        "end of input".to_string()
    } else {
        format!("`{}`", span.string())
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}\nexpected {1}, found {}", found(.0))]
    ExpectedText(Span, String),
    #[error("{0}\nexpected identifier, found {}", found(.0))]
    ExpectedIdent(Span),
    #[error("{0}\nexpected statement number")]
    ExpectedLabel(Span),
    #[error("{0}\nstatement numbers start at 1")]
    ZeroLabel(Span),
    #[error("{0}\nunexpected {} after expression", found(.0))]
    TrailingInput(Span),
    #[error("{0}\nexpression is nested more than {MAX_NESTING} levels deep")]
    TooDeep(Span),
}

impl ParseError {
    /// Fatal errors abort the parse instead of letting an alternative be tried.
    fn is_fatal(&self) -> bool {
        matches!(self, ParseError::TooDeep(_) | ParseError::ZeroLabel(_))
    }
}
