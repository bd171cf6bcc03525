use crate::{lexer, parser, token::Spanned, util::fmt::Show};

impl Show for Spanned<lexer::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &super::Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{}: ", span.pos(ctx.src))?;
        }

        match error {
            lexer::Error::UnexpectedChar => write!(f, "unexpected character"),
            lexer::Error::UnterminatedString => write!(f, "unterminated string"),
        }
    }
}

impl Show for Spanned<parser::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &super::Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{}: ", span.pos(ctx.src))?;
        }

        use parser::Error::*;
        match error {
            InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            UnexpectedTokenInExpr { token } => {
                write!(f, "unexpected token {token:?} in expression")
            }
            Unexpected { actual, expected } => {
                write!(f, "expected token {expected:?}, but got {actual:?}")
            }
            ForUnsupported => write!(f, "for loops are not yet supported"),
            ParseNumber => write!(f, "invalid number literal"),
        }
    }
}
