use anyhow::Result;

#[derive(Debug, thiserror::Error)]
#[error("ParseError on line {line_number} '{line}': {msg}")]
pub struct Error {
    msg: String,
    line_number: usize,
    line: String,
}

pub fn parse(text: &str) -> Result<Vec<crate::ast::Item<'_>>> {
    use combine::EasyParser;
    document::items()
        .easy_parse(text)
        // items() ends with eof, so there is never a remainder:
        .map(|(items, _remainder)| items)
        .map_err(|e| {
            let pos = e.position.translate_position(text);
            // isolate the line in question:
            let before = &text[0..pos];
            let after = &text[pos..text.len()];
            let prefix: String = before.chars().rev().take_while(|&c| c != '\n').collect();
            let prefix: String = prefix.chars().rev().collect();
            let suffix: String = after.chars().take_while(|&c| c != '\n').collect();
            let line = prefix + &suffix;
            // since converting combine's errors is a lifetime nightmare,
            // we just stringify the error before returning it.
            Error {
                line_number: before.matches('\n').count() + 1,
                line,
                msg: format!("{}", e),
            }
            .into()
        })
}

pub mod prelude {
    pub use combine::parser::char::{char, string};
    pub use combine::parser::range::recognize;
    pub use combine::*;
}

pub mod util {

    use super::prelude::*;
    use combine::parser::char::{alpha_num, letter, space};

    p! {
        ident_start() -> char, {
            char('_').or(letter())
        }
    }

    p! {
        ident_rest() -> Vec<char>, {
            many(char('_').or(alpha_num()))
        }
    }

    p! {
        ident() -> &'a str, {
            recognize(ident_start().and(ident_rest()))
        }
    }

    // a reserved word, not just the start of a longer ident:
    p! {
        keyword(word: &'static str) -> &'a str, {
            attempt(recognize(
                string(word).skip(not_followed_by(char('_').or(alpha_num())))
            ))
        }
    }

    p! {
        comment() -> &'a str, {
            recognize(
                char('#')
                .and(skip_many(none_of("\n".chars())))
                .and(char('\n').map(|_| ()).or(eof()))
            )
        }
    }

    p! {
        whitespace() -> (), {
            skip_many1(
                space().map(|_| ()).or(comment().map(|_| ()))
            )
        }
    }

    wrapper! {
        lex(parser), {
            optional(whitespace()).with(parser).skip(optional(whitespace()))
        }
    }

    p! {
        line_internal_whitespace() -> (), {
            skip_many1(satisfy(|c: char| c.is_whitespace() && c != '\n'))
        }
    }

    wrapper! {
        lex_inline(parser), {
            optional(line_internal_whitespace())
                .with(parser)
                .skip(optional(line_internal_whitespace()))
        }
    }

    wrapper! {
        parens(parser), {
            char('(').with(parser).skip(char(')'))
        }
    }

    wrapper! {
        braces(parser), {
            char('{').with(parser).skip(char('}'))
        }
    }

    wrapper! {
        brackets(parser), {
            char('[').with(parser).skip(char(']'))
        }
    }

    // a line may end in a comment:
    p! {
        eol() -> (), {
            eof()
                .or(comment().with(optional(whitespace())).map(|_| ()))
                .or(char('\n').with(optional(whitespace())).map(|_| ()))
        }
    }

    wrapper! {
        line(parser), {
            lex_inline(parser).skip(eol())
        }
    }

    wrapper! {
        comma_delim(parser) -> Vec<P::Output>, {
            sep_by1(lex(parser), char(','))
        }
    }

    #[cfg(test)]
    mod test {
        use anyhow::Result;
        use combine::parser::char::char;
        use combine::EasyParser;
        #[test]
        fn test_ident() -> Result<()> {
            assert_eq!("my_name", super::ident().easy_parse("my_name").unwrap().0);
            assert_eq!(
                "_start_under123",
                super::ident().easy_parse("_start_under123").unwrap().0
            );
            assert!(super::ident().easy_parse("1name").is_err());
            Ok(())
        }
        #[test]
        fn test_keyword() -> Result<()> {
            assert_eq!(
                ("taxa", " {"),
                super::keyword("taxa").easy_parse("taxa {").unwrap()
            );
            assert!(super::keyword("taxa").easy_parse("taxa_tree").is_err());
            Ok(())
        }
        #[test]
        fn test_whitespace() -> Result<()> {
            assert_eq!(
                ((), "and more"),
                super::whitespace().easy_parse(" and more").unwrap()
            );
            assert_eq!(
                ((), "and text"),
                super::whitespace().easy_parse(" # comment\n    and text").unwrap()
            );
            assert_eq!(((), ""), super::whitespace().easy_parse("\n# last").unwrap());
            assert!(super::whitespace().easy_parse("x").is_err());
            Ok(())
        }
        #[test]
        fn test_lex_inline() -> Result<()> {
            assert_eq!(
                'x',
                super::lex_inline(char('x')).easy_parse("  x  ").unwrap().0
            );
            assert!(super::lex_inline(char('x')).easy_parse("\nx").is_err());
            assert_eq!(
                ('x', "\n"),
                super::lex_inline(char('x')).easy_parse("x\n").unwrap()
            );
            Ok(())
        }
        #[test]
        fn test_eol() -> Result<()> {
            assert_eq!(
                ((), "other stuff"),
                super::eol().easy_parse("\n  \n   other stuff").unwrap()
            );
            assert_eq!(((), ""), super::eol().easy_parse("").unwrap());
            assert_eq!(
                ((), "next"),
                super::eol().easy_parse("# trailing\nnext").unwrap()
            );
            Ok(())
        }
    }
}

mod literal {

    use super::prelude::*;

    const FORBID_UNQUOTED: [char; 11] = ['(', ')', '[', ']', '{', '}', ',', '=', '#', '"', '\''];

    wrapper! {
        double_quotes(parser), {
            char('"').with(parser).skip(char('"'))
        }
    }

    p! {
        double_quoted_literal() -> &'a str, {
            double_quotes(recognize(skip_many(none_of("\"".chars()))))
        }
    }

    p! {
        unquoted_literal_char() -> char, {
            satisfy(|c: char|
                !c.is_whitespace() && !FORBID_UNQUOTED.iter().any(|&forbidden| forbidden == c)
            )
        }
    }

    p! {
        unquoted_literal() -> &'a str, {
            recognize(skip_many1(unquoted_literal_char()))
        }
    }

    p! {
        literal() -> &'a str, {
            double_quoted_literal().or(unquoted_literal())
        }
    }

    #[cfg(test)]
    mod test {
        use anyhow::Result;
        use combine::EasyParser;
        #[test]
        fn test_literal() -> Result<()> {
            assert_eq!("ACGT-?", super::literal().easy_parse("ACGT-?").unwrap().0);
            assert_eq!(
                "Homo sapiens",
                super::literal().easy_parse("\"Homo sapiens\"").unwrap().0
            );
            assert_eq!(
                "0.25",
                super::literal().easy_parse("0.25}").unwrap().0
            );
            assert_eq!("a", super::literal().easy_parse("a,b").unwrap().0);
            assert!(super::literal().easy_parse("}").is_err());
            Ok(())
        }
    }
}

mod matrix {

    use super::literal::literal;
    use super::prelude::*;
    use super::util::{braces, eol, keyword, lex, lex_inline, whitespace};
    use crate::ast::{Item, Row};

    p! {
        row_end() -> (), {
            eol().or(look_ahead(char('}')).map(|_| ()))
        }
    }

    p! {
        row() -> Row<'a>, {
            lex_inline(literal())
                .and(many1(lex_inline(literal())))
                .skip(row_end())
        }
    }

    p! {
        rows() -> Vec<Row<'a>>, {
            braces(optional(whitespace()).with(many(row())))
        }
    }

    p! {
        taxa() -> Vec<&'a str>, {
            lex_inline(keyword("taxa")).with(braces(
                optional(whitespace()).with(many(lex(literal())))
            ))
        }
    }

    p! {
        characters() -> Item<'a>, {
            lex_inline(keyword("characters"))
                .with(lex_inline(super::util::ident()))
                .and(rows())
                .map(|(data_type, rows)| Item::Characters { data_type, rows })
        }
    }

    p! {
        distances() -> Vec<Row<'a>>, {
            lex_inline(keyword("distances")).with(rows())
        }
    }

}

mod statement {

    use super::literal::literal;
    use super::prelude::*;
    use super::util::{brackets, comma_delim, ident, keyword, lex_inline, line, parens};
    use crate::ast::{Filter, Options, Step};

    p! {
        option() -> (&'a str, &'a str), {
            ident().skip(lex_inline(char(':'))).and(literal())
        }
    }

    p! {
        options() -> Options<'a>, {
            brackets(comma_delim(option()))
        }
    }

    p! {
        filter() -> Filter<'a>, {
            line(
                lex_inline(keyword("filter"))
                    .with(lex_inline(ident()))
                    .skip(lex_inline(char('=')))
                    .and(lex_inline(ident()))
                    .and(optional(options()))
            ).map(|((target, algorithm), options)| Filter {
                target,
                algorithm,
                options: options.unwrap_or_default(),
            })
        }
    }

    p! {
        step() -> Step<'a>, {
            line(
                lex_inline(ident())
                    .skip(lex_inline(char('=')))
                    .and(lex_inline(ident()))
                    .and(lex_inline(parens(comma_delim(ident()))))
                    .and(optional(options()))
            ).map(|(((name, algorithm), parents), options)| Step {
                name,
                algorithm,
                parents,
                options: options.unwrap_or_default(),
            })
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use combine::EasyParser;
        #[test]
        fn test_options() {
            assert_eq!(
                vec![("exclude", "A B"), ("which", "2")],
                options().easy_parse("[exclude: \"A B\", which: 2]").unwrap().0
            );
        }
        #[test]
        fn test_filter() {
            assert_eq!(
                Filter {
                    target: "input_taxa",
                    algorithm: "TaxaFilter",
                    options: vec![("exclude", "C")],
                },
                filter()
                    .easy_parse("filter input_taxa = TaxaFilter [exclude: C]\n")
                    .unwrap()
                    .0
            );
        }
        #[test]
        fn test_step() {
            assert_eq!(
                Step {
                    name: "dist",
                    algorithm: "JukesCantor",
                    parents: vec!["working"],
                    options: vec![],
                },
                step().easy_parse("dist = JukesCantor(working)").unwrap().0
            );
            assert_eq!(
                vec!["taxa", "input"],
                step().easy_parse("x = Foo(taxa, input) [a: 1]\n").unwrap().0.parents
            );
        }
    }
}

mod document {
    use super::matrix::{characters, distances, taxa};
    use super::prelude::*;
    use super::statement::{filter, step};
    use super::util::{lex, whitespace};
    use crate::ast::Item;

    p! {
        item() -> Item<'a>, {
            choice!(
                taxa().map(Item::Taxa),
                characters(),
                distances().map(Item::Distances),
                filter().map(Item::Filter),
                // anything else that starts with an ident is a step:
                step().map(Item::Step)
            )
        }
    }

    p! {
        items() -> Vec<Item<'a>>, {
            optional(whitespace()).with(many(lex(item()))).skip(eof())
        }
    }
}
