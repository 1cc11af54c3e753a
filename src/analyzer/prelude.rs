use super::combinators::*;
use super::core::Parser;
use std::fmt;

pub fn equal<I: Clone + PartialEq + fmt::Display>(value: I) -> Equal<I> {
    Equal::new(value)
}

pub fn satisfy<I, O, F>(f: F) -> Satisfy<I, O, F>
where
    I: fmt::Display,
    F: Fn(&I) -> Option<O>,
{
    Satisfy::new(f)
}

pub fn choice<I, O>(parsers: Vec<Box<dyn Parser<I, O>>>) -> Choice<I, O> {
    Choice::new(parsers)
}

pub fn pair<P1, P2, I, O1, O2>(first: P1, second: P2) -> Pair<P1, P2, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    Pair::new(first, second)
}

pub fn preceded<P1, P2, I, O1, O2>(prefix: P1, parser: P2) -> Preceded<P1, P2, O1>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    Preceded::new(prefix, parser)
}

pub fn terminated<P1, P2, I, O1, O2>(parser: P1, suffix: P2) -> Terminated<P1, P2, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    Terminated::new(parser, suffix)
}

pub fn map<P, F, A, B, I>(parser: P, f: F) -> Map<P, F, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    Map::new(parser, f)
}

pub fn many<P, I, O>(parser: P) -> Many<P, O>
where
    P: Parser<I, O>,
{
    Many::new(parser)
}

pub fn optional<P, I, O>(parser: P) -> Optional<P, O>
where
    P: Parser<I, O>,
{
    Optional::new(parser)
}

pub fn delimited<L, P, R, I, O, OL, OR>(left: L, parser: P, right: R) -> Delimited<L, P, R, OL, OR>
where
    L: Parser<I, OL>,
    P: Parser<I, O>,
    R: Parser<I, OR>,
{
    Delimited::new(left, parser, right)
}

pub fn peek<P, I, O>(parser: P) -> Peek<P, O>
where
    P: Parser<I, O>,
{
    Peek::new(parser)
}

pub fn not<P, I, O>(parser: P) -> Not<P, O>
where
    I: fmt::Display,
    P: Parser<I, O>,
{
    Not::new(parser)
}

pub fn with_context<P, I, O, C: ToString>(parser: P, context: C) -> WithContext<P, C>
where
    P: Parser<I, O>,
{
    WithContext::new(parser, context)
}

pub fn lazy<I, O, F, P>(f: F) -> Lazy<F>
where
    F: Fn() -> P,
    P: Parser<I, O>,
{
    Lazy::new(f)
}
