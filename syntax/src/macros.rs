//! Shorthand for declaring combine parsers over `&str` streams.
//!
//! Every parser in this crate reads a [`combine::stream::RangeStream`] whose
//! ranges are `&'a str`, so slices of the document can be returned without
//! copying.

/// Declare `pub fn $name(args) -> impl Parser<Output = $ret>`.
macro_rules! p (
    ($name:ident( $($arg: ident :  $arg_type: ty),* ) -> $ret:ty, $code:expr) => (
        combine::parser!{
            pub fn $name['a, I]($($arg : $arg_type),*)(I) -> $ret
                where
                [I: combine::stream::RangeStream<
                 Range = &'a str,
                 Token = char>,
                 I::Error: combine::ParseError<
                     char,
                     &'a str,
                     <I as combine::stream::StreamOnce>::Position>,
            ]            {
                $code
            }
        }
    );
);

/// Declare a parser built around another parser `$delegate`. Without an
/// explicit return type, it outputs whatever `$delegate` outputs.
macro_rules! wrapper {
    ($name:ident($delegate: ident), $code:expr) => (
        wrapper!($name($delegate) -> P::Output, $code);
    );
    ($name:ident($delegate: ident) -> $ret:ty, $code:expr) => (
        combine::parser!{
            pub fn $name['a, I, P]($delegate: P)(I) -> $ret
                where
                [I: combine::stream::RangeStream<
                 Range = &'a str,
                 Token = char>,
                 I::Error: combine::ParseError<
                     char,
                     &'a str,
                     <I as combine::stream::StreamOnce>::Position>,
                 P: combine::Parser<I>,
            ]            {
                $code
            }
        }
    );
}
