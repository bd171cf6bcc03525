/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The code generator walks the AST, emitting JavaScript behind a fixed
/// runtime-support preamble.
pub mod codegen;

pub mod ast;
pub mod token;

pub mod util {
    pub mod fmt;
    pub mod intern;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

use crate::{token::Spanned, util::intern::Interner};

/// Runs the whole pipeline over the given source, returning the emitted
/// JavaScript.
///
/// Stops at the first stage that reported errors, returning everything that
/// stage collected. Callers wanting the partial results (tokens of an
/// erroneous input, the best-effort AST) should drive the stages themselves.
pub fn compile(src: &str) -> Result<String, CompileError> {
    let (tokens, lex_errors) = lexer::tokenize(src);
    if !lex_errors.is_empty() {
        return Err(CompileError::Lex(lex_errors));
    }

    let mut idents = Interner::with_capacity(64);
    let program = match parser::parse_program(src, &tokens, &mut idents) {
        Ok(program) => program,
        Err((_, errors)) => return Err(CompileError::Parse(errors)),
    };

    Ok(codegen::generate(&program, &idents))
}

#[derive(Debug, PartialEq)]
pub enum CompileError {
    Lex(Vec<Spanned<lexer::Error>>),
    Parse(Vec<Spanned<parser::Error>>),
}

impl CompileError {
    /// Renders every collected error as a `line:column: message` string.
    pub fn render(&self, src: &str) -> Vec<String> {
        use crate::util::fmt::Show;
        let ctx = crate::util::fmt::Context { src };
        match self {
            CompileError::Lex(errors) => {
                errors.iter().map(|e| format!("{:#}", e.display(&ctx))).collect()
            }
            CompileError::Parse(errors) => {
                errors.iter().map(|e| format!("{:#}", e.display(&ctx))).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_reports_lexer_errors() {
        let error = compile("let x = @;").unwrap_err();
        assert_eq!(error.render("let x = @;"), ["1:9: unexpected character"]);
    }

    #[test]
    fn compile_reports_parser_errors() {
        let error = compile("let = 5;").unwrap_err();
        assert_eq!(
            error.render("let = 5;"),
            ["1:5: expected token Identifier, but got Assign"]
        );
    }

    #[test]
    fn compile_emits_preamble_for_empty_program() {
        let code = compile("").unwrap();
        assert_eq!(code, codegen::PREAMBLE);
    }
}
