use super::core::ParseError;
use super::core::ParseResult;
use super::core::Parser;
use std::fmt;
use std::marker::PhantomData;

/// Matches one item equal to `value`.
#[derive(Clone)]
pub struct Equal<I> {
    value: I,
}

impl<I> Equal<I> {
    pub fn new(value: I) -> Self {
        Self { value }
    }
}

impl<I: Clone + PartialEq + fmt::Display> Parser<I, I> for Equal<I> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<I> {
        match input.get(pos) {
            Some(found) if *found == self.value => Ok((pos + 1, found.clone())),
            Some(found) => Err(ParseError::Unexpected {
                found: found.to_string(),
                position: pos,
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }
}

/// Matches one item for which `f` returns `Some`.
#[derive(Clone)]
pub struct Satisfy<I, O, F> {
    f: F,
    _phantom: PhantomData<(I, O)>,
}

impl<I, O, F> Satisfy<I, O, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, F> Parser<I, O> for Satisfy<I, O, F>
where
    I: fmt::Display,
    F: Fn(&I) -> Option<O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let item = input.get(pos).ok_or(ParseError::UnexpectedEof)?;
        (self.f)(item)
            .map(|result| (pos + 1, result))
            .ok_or_else(|| ParseError::Unexpected {
                found: item.to_string(),
                position: pos,
            })
    }
}

/// First parser that succeeds wins. Reports the error that got furthest.
pub struct Choice<I, O> {
    parsers: Vec<Box<dyn Parser<I, O>>>,
}

impl<I, O> Choice<I, O> {
    pub fn new(parsers: Vec<Box<dyn Parser<I, O>>>) -> Self {
        Self { parsers }
    }
}

impl<I, O> Parser<I, O> for Choice<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let mut furthest: Option<ParseError> = None;
        for parser in &self.parsers {
            match parser.parse(input, pos) {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if error_position(&error) >= furthest.as_ref().map_or(0, error_position) {
                        furthest = Some(error);
                    }
                }
            }
        }
        Err(furthest.unwrap_or(ParseError::NoAlternative))
    }
}

fn error_position(error: &ParseError) -> usize {
    match error.root() {
        ParseError::Unexpected { position, .. } => *position,
        ParseError::UnexpectedEof => usize::MAX,
        _ => 0,
    }
}

/// Runs two parsers in sequence and keeps both results.
#[derive(Clone)]
pub struct Pair<P1, P2, O1, O2> {
    first: P1,
    second: P2,
    _phantom: PhantomData<(O1, O2)>,
}

impl<P1, P2, O1, O2> Pair<P1, P2, O1, O2> {
    pub fn new(first: P1, second: P2) -> Self {
        Self {
            first,
            second,
            _phantom: PhantomData,
        }
    }
}

impl<I, O1, O2, P1, P2> Parser<I, (O1, O2)> for Pair<P1, P2, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2)> {
        let (pos, first) = self.first.parse(input, pos)?;
        let (pos, second) = self.second.parse(input, pos)?;
        Ok((pos, (first, second)))
    }
}

/// Runs two parsers in sequence and keeps the second result.
#[derive(Clone)]
pub struct Preceded<P1, P2, O1> {
    prefix: P1,
    parser: P2,
    _phantom: PhantomData<O1>,
}

impl<P1, P2, O1> Preceded<P1, P2, O1> {
    pub fn new(prefix: P1, parser: P2) -> Self {
        Self {
            prefix,
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O1, O2, P1, P2> Parser<I, O2> for Preceded<P1, P2, O1>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O2> {
        let (pos, _) = self.prefix.parse(input, pos)?;
        self.parser.parse(input, pos)
    }
}

/// Runs two parsers in sequence and keeps the first result.
#[derive(Clone)]
pub struct Terminated<P1, P2, O2> {
    parser: P1,
    suffix: P2,
    _phantom: PhantomData<O2>,
}

impl<P1, P2, O2> Terminated<P1, P2, O2> {
    pub fn new(parser: P1, suffix: P2) -> Self {
        Self {
            parser,
            suffix,
            _phantom: PhantomData,
        }
    }
}

impl<I, O1, O2, P1, P2> Parser<I, O1> for Terminated<P1, P2, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O1> {
        let (pos, value) = self.parser.parse(input, pos)?;
        let (pos, _) = self.suffix.parse(input, pos)?;
        Ok((pos, value))
    }
}

#[derive(Clone)]
pub struct Map<P, F, A, B> {
    parser: P,
    f: F,
    _phantom: PhantomData<(A, B)>,
}

impl<P, F, A, B> Map<P, F, A, B> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for Map<P, F, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<B> {
        self.parser
            .parse(input, pos)
            .map(|(pos, value)| (pos, (self.f)(value)))
    }
}

/// Zero or more repetitions. Stops at the first failure or when the
/// inner parser stops consuming input.
#[derive(Clone)]
pub struct Many<P, O> {
    parser: P,
    _phantom: PhantomData<O>,
}

impl<P, O> Many<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Vec<O>> for Many<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();
        let mut current_pos = pos;

        while let Ok((new_pos, value)) = self.parser.parse(input, current_pos) {
            if new_pos == current_pos {
                break;
            }
            results.push(value);
            current_pos = new_pos;
        }

        Ok((current_pos, results))
    }
}

#[derive(Clone)]
pub struct Optional<P, O> {
    parser: P,
    _phantom: PhantomData<O>,
}

impl<P, O> Optional<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Option<O>> for Optional<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Option<O>> {
        match self.parser.parse(input, pos) {
            Ok((new_pos, value)) => Ok((new_pos, Some(value))),
            Err(_) => Ok((pos, None)),
        }
    }
}

#[derive(Clone)]
pub struct Delimited<L, P, R, OL, OR> {
    left: L,
    parser: P,
    right: R,
    _phantom: PhantomData<(OL, OR)>,
}

impl<L, P, R, OL, OR> Delimited<L, P, R, OL, OR> {
    pub fn new(left: L, parser: P, right: R) -> Self {
        Self {
            left,
            parser,
            right,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, OL, OR, L, P, R> Parser<I, O> for Delimited<L, P, R, OL, OR>
where
    L: Parser<I, OL>,
    P: Parser<I, O>,
    R: Parser<I, OR>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let (pos, _) = self.left.parse(input, pos)?;
        let (pos, value) = self.parser.parse(input, pos)?;
        let (pos, _) = self.right.parse(input, pos)?;
        Ok((pos, value))
    }
}

/// Succeeds without consuming input when the inner parser would succeed.
#[derive(Clone)]
pub struct Peek<P, O> {
    parser: P,
    _phantom: PhantomData<O>,
}

impl<P, O> Peek<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, ()> for Peek<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<()> {
        self.parser.parse(input, pos).map(|_| (pos, ()))
    }
}

/// Succeeds without consuming input when the inner parser would fail.
#[derive(Clone)]
pub struct Not<P, O> {
    parser: P,
    _phantom: PhantomData<O>,
}

impl<P, O> Not<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, ()> for Not<P, O>
where
    I: fmt::Display,
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<()> {
        match self.parser.parse(input, pos) {
            Ok(_) => Err(ParseError::Unexpected {
                found: input.get(pos).map(ToString::to_string).unwrap_or_default(),
                position: pos,
            }),
            Err(_) => Ok((pos, ())),
        }
    }
}

#[derive(Clone)]
pub struct WithContext<P, C> {
    parser: P,
    context: C,
}

impl<P, C> WithContext<P, C> {
    pub fn new(parser: P, context: C) -> Self {
        Self { parser, context }
    }
}

impl<I, O, P, C: ToString> Parser<I, O> for WithContext<P, C>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        self.parser
            .parse(input, pos)
            .map_err(|e| ParseError::WithContext {
                message: self.context.to_string(),
                inner: Box::new(e),
            })
    }
}

/// Builds the inner parser on use; breaks recursion in grammars.
#[derive(Clone)]
pub struct Lazy<F> {
    f: F,
}

impl<F> Lazy<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<I, O, F, P> Parser<I, O> for Lazy<F>
where
    F: Fn() -> P,
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        (self.f)().parse(input, pos)
    }
}
