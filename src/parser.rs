use crate::{
    ast::{
        BinaryOp, Block, ClassDecl, Decl, Expr, ExprKind, FunctionDecl, Ident, IfStmt, LogicalOp,
        MethodDecl, ObjectEntry, Param, Program, PropertyDecl, ReturnStmt, Stmt, TypeName,
        UnaryOp, VariableDecl, WhileStmt,
    },
    lexer::extract,
    token::{Span, Spanned, Token, TokenKind},
    util::intern::Interner,
};

type Result<T, E = ()> = std::result::Result<T, E>;

/// Best-effort parse result: on failure the partially parsed value is
/// returned alongside the collected errors, never `null`-like emptiness.
pub type ParseResult<T> = Result<T, (T, Vec<Spanned<Error>>)>;

pub fn parse_program(
    src: &str,
    tokens: &[Token],
    idents: &mut Interner<str>,
) -> ParseResult<Program> {
    parse(src, tokens, idents, Parser::parse_program, Program::default)
}

pub fn parse_expr(src: &str, tokens: &[Token], idents: &mut Interner<str>) -> ParseResult<Expr> {
    let default = || Expr::dummy(Span::new_of_length(src.len(), 0));
    parse(src, tokens, idents, Parser::parse_expr, default)
}

fn parse<'src, 'tok, 'ident, T>(
    src: &'src str,
    tokens: &'tok [Token],
    idents: &'ident mut Interner<str>,
    f: impl for<'a> FnOnce(&'a mut Parser<'src, 'tok, 'ident>) -> Result<T>,
    default: impl FnOnce() -> T,
) -> ParseResult<T> {
    let mut p = Parser::new(src, tokens, idents);
    let result = f(&mut p);

    let success = result.is_ok();
    let value = result.unwrap_or_else(|()| default());
    if p.errors.is_empty() {
        assert!(success);
        Ok(value)
    } else {
        Err((value, p.errors))
    }
}

/// Tokens that may start a declaration or statement; used as restart points
/// by [`Parser::synchronize`].
const DECL_STARTERS: &[TokenKind] = &[
    TokenKind::Class,
    TokenKind::Fn,
    TokenKind::Let,
    TokenKind::Mut,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Return,
];

struct Parser<'src, 'tok, 'ident> {
    src: &'src str,
    tokens: &'tok [Token],
    idents: &'ident mut Interner<str>,
    cursor: usize,
    errors: Vec<Spanned<Error>>,
}

impl Parser<'_, '_, '_> {
    fn parse_program(&mut self) -> Result<Program> {
        let mut decls = Vec::new();
        while self.except([]) {
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                // A malformed declaration produces its error(s) and is
                // dropped; parsing resumes at the next statement boundary.
                Err(()) => self.synchronize(),
            }
        }
        self.consume(TokenKind::Eof)?;
        Ok(Program { decls })
    }

    /// Discards tokens until a statement boundary: either the token just
    /// consumed was a `;`, or the next token starts a declaration.
    ///
    /// Every failing `parse_decl` consumes at least one token, so recovery
    /// always makes progress even when the boundary is already reached.
    fn synchronize(&mut self) {
        while self.except([]) {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            if DECL_STARTERS.contains(&self.peek().kind) {
                return;
            }
            self.advance();
        }
    }

    fn parse_decl(&mut self) -> Result<Decl> {
        if self.take(TokenKind::Class) {
            return self.parse_class().map(Decl::Class);
        }
        if self.take(TokenKind::Fn) {
            return self.parse_function().map(Decl::Function);
        }
        if self.is(TokenKind::Let) || self.is(TokenKind::Mut) {
            let mutable = self.advance().kind == TokenKind::Mut;
            return self.parse_variable(mutable).map(Decl::Variable);
        }
        self.parse_stmt().map(Decl::Stmt)
    }

    fn parse_class(&mut self) -> Result<ClassDecl> {
        let name = self.parse_ident()?;
        self.consume(TokenKind::LBrace)?;

        let mut methods = Vec::new();
        let mut properties = Vec::new();
        while self.except([TokenKind::RBrace]) {
            let is_static = self.take(TokenKind::Static);
            if self.take(TokenKind::Fn) {
                methods.push(self.parse_method(is_static)?);
            } else {
                properties.push(self.parse_property(is_static)?);
            }
        }
        self.consume(TokenKind::RBrace)?;

        Ok(ClassDecl {
            name,
            methods,
            properties,
        })
    }

    fn parse_method(&mut self, is_static: bool) -> Result<MethodDecl> {
        let (name, params, return_ty, body) = self.parse_function_parts()?;
        Ok(MethodDecl {
            name,
            params,
            return_ty,
            body,
            is_static,
        })
    }

    fn parse_property(&mut self, is_static: bool) -> Result<PropertyDecl> {
        let name = self.parse_ident()?;
        self.consume(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let init = if self.take(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon)?;
        Ok(PropertyDecl {
            name,
            ty,
            is_static,
            init,
        })
    }

    fn parse_function(&mut self) -> Result<FunctionDecl> {
        let (name, params, return_ty, body) = self.parse_function_parts()?;
        Ok(FunctionDecl {
            name,
            params,
            return_ty,
            body,
        })
    }

    /// Parses `ID '(' params? ')' '->' TYPE '{' decl* '}'`, shared by
    /// function and method declarations (the `fn` keyword is already
    /// consumed).
    fn parse_function_parts(&mut self) -> Result<(Ident, Vec<Param>, TypeName, Block)> {
        let name = self.parse_ident()?;
        self.consume(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.consume(TokenKind::Arrow)?;
        let return_ty = self.parse_type()?;
        self.consume(TokenKind::LBrace)?;
        let body = self.parse_block()?;
        Ok((name, params, return_ty, body))
    }

    /// Parses `[param (',' param)*] ')'`, consuming the closing paren.
    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if self.take(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let name = self.parse_ident()?;
            self.consume(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            params.push(Param { name, ty });
            if !self.take(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_variable(&mut self, mutable: bool) -> Result<VariableDecl> {
        let name = self.parse_ident()?;
        let ty = if self.take(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.consume(TokenKind::Assign)?;
        let init = self.parse_expr()?;
        self.consume(TokenKind::Semicolon)?;
        Ok(VariableDecl {
            name,
            ty,
            mutable,
            init,
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        if self.take(TokenKind::If) {
            return self.parse_if().map(Stmt::If);
        }
        if self.take(TokenKind::While) {
            return self.parse_while().map(Stmt::While);
        }
        if self.take(TokenKind::Return) {
            return self.parse_return().map(Stmt::Return);
        }
        if self.take(TokenKind::LBrace) {
            return self.parse_block().map(Stmt::Block);
        }
        if self.is(TokenKind::For) {
            // Reserved keyword: the loop grammar is not settled yet, so the
            // whole form is rejected instead of guessed at.
            let token = self.advance();
            self.error(token.span().wrap(Error::ForUnsupported));
            return Err(());
        }

        let expr = self.parse_expr()?;
        self.consume(TokenKind::Semicolon)?;
        Ok(Stmt::Expr(expr))
    }

    fn parse_if(&mut self) -> Result<IfStmt> {
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.consume(TokenKind::RParen)?;
        self.consume(TokenKind::LBrace)?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.take(TokenKind::Else) {
            self.consume(TokenKind::LBrace)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(IfStmt {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<WhileStmt> {
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.consume(TokenKind::RParen)?;
        self.consume(TokenKind::LBrace)?;
        let body = self.parse_block()?;
        Ok(WhileStmt { condition, body })
    }

    fn parse_return(&mut self) -> Result<ReturnStmt> {
        let value = self.parse_expr()?;
        self.consume(TokenKind::Semicolon)?;
        Ok(ReturnStmt { value })
    }

    /// Parses `decl* '}'` with the opening brace already consumed.
    fn parse_block(&mut self) -> Result<Block> {
        let mut decls = Vec::new();
        while self.except([TokenKind::RBrace]) {
            decls.push(self.parse_decl()?);
        }
        self.consume(TokenKind::RBrace)?;
        Ok(Block { decls })
    }

    fn parse_type(&mut self) -> Result<TypeName> {
        self.parse_ident().map(TypeName)
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Ident {
            name: self.idents.intern(extract::ident(token, self.src)),
            span: token.span(),
        })
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let lhs_token = self.advance();
        let mut lhs = self.parse_nud(lhs_token)?;

        loop {
            let op_token = self.peek();

            if let Some((lbp, rbp)) = Self::infix_binding_power(op_token.kind) {
                if lbp < min_bp {
                    // Operator binds less tightly than the minimum required
                    break;
                }

                self.advance(); // Operator
                lhs = self.parse_led(op_token, lhs, rbp)?;
            } else {
                // Not an infix operator
                break;
            }
        }

        Ok(lhs)
    }

    /// nud: Parses tokens that start an expression
    /// (prefix operators, literals, grouping, literals of composite values)
    fn parse_nud(&mut self, token: Token) -> Result<Expr> {
        let (kind, span) = match token.kind {
            TokenKind::Identifier => {
                let ident = Ident {
                    name: self.idents.intern(extract::ident(token, self.src)),
                    span: token.span(),
                };
                (ExprKind::Id(ident), token.span())
            }
            TokenKind::Number => {
                let Ok(value) = extract::number(token, self.src) else {
                    self.error(token.span().wrap(Error::ParseNumber));
                    return Err(());
                };
                (ExprKind::Number(value), token.span())
            }
            TokenKind::Str => (
                ExprKind::Str(Box::from(extract::string(token, self.src))),
                token.span(),
            ),
            TokenKind::EscapedStr => (
                ExprKind::Str(extract::escaped_string(token, self.src)),
                token.span(),
            ),
            TokenKind::True => (ExprKind::Bool(true), token.span()),
            TokenKind::False => (ExprKind::Bool(false), token.span()),
            TokenKind::Nil => (ExprKind::Nil, token.span()),
            TokenKind::This => (ExprKind::This, token.span()),

            // Grouping: ( expr )
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                let end = self.consume(TokenKind::RParen)?;
                (
                    ExprKind::Grouping(Box::new(expr)),
                    token.span().to(end.span()),
                )
            }

            // Array literal: [ expr, expr, ... ]
            TokenKind::LBracket => {
                let mut elements = Vec::new();
                if !self.is(TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expr()?);
                        if !self.take(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.consume(TokenKind::RBracket)?;
                (ExprKind::Array(elements), token.span().to(end.span()))
            }

            // Object literal: { name: expr, ... }
            //
            // Only reachable in expression position; a `{` in statement
            // position is a block.
            TokenKind::LBrace => {
                let mut entries = Vec::new();
                if !self.is(TokenKind::RBrace) {
                    loop {
                        let key = self.parse_ident()?;
                        self.consume(TokenKind::Colon)?;
                        let value = self.parse_expr()?;
                        entries.push(ObjectEntry { key, value });
                        if !self.take(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.consume(TokenKind::RBrace)?;
                (ExprKind::Object(entries), token.span().to(end.span()))
            }

            // Instantiation: new Class ( args )
            TokenKind::New => {
                let class_name = self.parse_ident()?;
                self.consume(TokenKind::LParen)?;
                let (args, end) = self.parse_args()?;
                let new = ExprKind::New { class_name, args };
                (new, token.span().to(end.span()))
            }

            // Prefix operators: !, -
            kind @ (TokenKind::Bang | TokenKind::Minus) => {
                let op = match kind {
                    TokenKind::Bang => UnaryOp::Not,
                    TokenKind::Minus => UnaryOp::Neg,
                    _ => unreachable!(),
                };
                // SAFETY: Should have prefix due to above match
                let ((), rbp) = Self::prefix_binding_power(kind).unwrap();

                let operand = self.parse_expr_bp(rbp)?;

                let span = token.span().to(operand.span);
                let unary = ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                };
                (unary, span)
            }

            other => {
                let error = Error::UnexpectedTokenInExpr { token: other };
                self.error(token.span().wrap(error));
                return Err(());
            }
        };

        Ok(Expr { kind, span })
    }

    /// led: Parses tokens that follow a left-hand-side expression
    /// (infix operators and the call/member/index suffix chain)
    fn parse_led(&mut self, op_token: Token, lhs: Expr, rbp: u8) -> Result<Expr> {
        let (kind, span) = match op_token.kind {
            // Binary operators: +, -, *, /, ==, !=, >, >=, <, <=
            kind @ (TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::EqEq
            | TokenKind::BangEq
            | TokenKind::Greater
            | TokenKind::GreaterEq
            | TokenKind::Less
            | TokenKind::LessEq) => {
                let op = match kind {
                    TokenKind::Plus => BinaryOp::Add,
                    TokenKind::Minus => BinaryOp::Sub,
                    TokenKind::Star => BinaryOp::Mul,
                    TokenKind::Slash => BinaryOp::Div,
                    TokenKind::EqEq => BinaryOp::Eq,
                    TokenKind::BangEq => BinaryOp::Neq,
                    TokenKind::Greater => BinaryOp::Gt,
                    TokenKind::GreaterEq => BinaryOp::Gte,
                    TokenKind::Less => BinaryOp::Lt,
                    TokenKind::LessEq => BinaryOp::Lte,
                    _ => unreachable!(),
                };
                let rhs = self.parse_expr_bp(rbp)?;

                let span = lhs.span.to(rhs.span);
                let binary = ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                (binary, span)
            }

            // Logical operators: &&, ||
            kind @ (TokenKind::AndAnd | TokenKind::OrOr) => {
                let op = match kind {
                    TokenKind::AndAnd => LogicalOp::And,
                    TokenKind::OrOr => LogicalOp::Or,
                    _ => unreachable!(),
                };
                let rhs = self.parse_expr_bp(rbp)?;

                let span = lhs.span.to(rhs.span);
                let logical = ExprKind::Logical {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                (logical, span)
            }

            // Assignment: target = expr (right-associative)
            TokenKind::Assign => {
                let is_target = matches!(
                    lhs.kind,
                    ExprKind::Id(_) | ExprKind::Property { .. } | ExprKind::Index { .. }
                );
                if !is_target {
                    self.error(lhs.span.wrap(Error::InvalidAssignmentTarget));
                    return Err(());
                }

                let value = self.parse_expr_bp(rbp)?;
                let span = lhs.span.to(value.span);
                let assign = ExprKind::Assignment {
                    target: Box::new(lhs),
                    value: Box::new(value),
                };
                (assign, span)
            }

            // Call: callee ( args )
            TokenKind::LParen => {
                let (args, end) = self.parse_args()?;
                let span = lhs.span.to(end.span());
                let call = ExprKind::Call {
                    callee: Box::new(lhs),
                    args,
                };
                (call, span)
            }

            // Property access: object . name
            TokenKind::Dot => {
                let name = self.parse_ident()?;
                let span = lhs.span.to(name.span);
                let property = ExprKind::Property {
                    object: Box::new(lhs),
                    name,
                };
                (property, span)
            }

            // Array index: object [ expr ]
            TokenKind::LBracket => {
                let index = self.parse_expr()?;
                let end = self.consume(TokenKind::RBracket)?;
                let span = lhs.span.to(end.span());
                let access = ExprKind::Index {
                    object: Box::new(lhs),
                    index: Box::new(index),
                };
                (access, span)
            }

            other => {
                let error = Error::UnexpectedTokenInExpr { token: other };
                self.error(op_token.span().wrap(error));
                return Err(());
            }
        };

        Ok(Expr { kind, span })
    }

    /// Parses `[expr (',' expr)*] ')'`, consuming the closing paren.
    fn parse_args(&mut self) -> Result<(Vec<Expr>, Token)> {
        let mut args = Vec::new();
        if !self.is(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.take(TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.consume(TokenKind::RParen)?;
        Ok((args, end))
    }

    fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
        let bp = match kind {
            // Assignment (right-associative)
            TokenKind::Assign => (2, 1),

            // Logical or / and
            TokenKind::OrOr => (3, 4),
            TokenKind::AndAnd => (5, 6),

            // Equality
            TokenKind::EqEq | TokenKind::BangEq => (7, 8),

            // Comparison
            TokenKind::Greater | TokenKind::GreaterEq | TokenKind::Less | TokenKind::LessEq => {
                (9, 10)
            }

            // Term / factor
            TokenKind::Plus | TokenKind::Minus => (11, 12),
            TokenKind::Star | TokenKind::Slash => (13, 14),

            // Call / member access / index chain
            TokenKind::LParen | TokenKind::Dot | TokenKind::LBracket => (17, 18),

            _ => return None,
        };
        Some(bp)
    }

    fn prefix_binding_power(kind: TokenKind) -> Option<((), u8)> {
        let bp = match kind {
            // Binds tighter than any binary operator, looser than the
            // call/member chain (so `-a.b` negates the property access).
            TokenKind::Bang | TokenKind::Minus => ((), 15),
            _ => return None,
        };
        Some(bp)
    }
}

impl Parser<'_, '_, '_> {
    fn new<'src, 'tok, 'ident>(
        src: &'src str,
        tokens: &'tok [Token],
        idents: &'ident mut Interner<str>,
    ) -> Parser<'src, 'tok, 'ident> {
        Parser {
            src,
            tokens,
            idents,
            cursor: 0,
            errors: Vec::with_capacity(8),
        }
    }

    fn error(&mut self, error: Spanned<Error>) {
        self.errors.push(error);
    }

    /// Returns the current token.
    fn peek(&self) -> Token {
        match self.tokens.get(self.cursor) {
            Some(token) => *token,
            None => Token::eof_for(self.src),
        }
    }

    /// Returns the token just consumed.
    fn previous(&self) -> Token {
        match self.cursor.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => *token,
            None => Token::eof_for(self.src),
        }
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> Token {
        let c = self.peek();
        self.cursor += 1;
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning
    /// true. If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one. If not,
    /// records an error.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        let c = self.peek();
        if self.is(expect) {
            self.advance();
            Ok(c)
        } else {
            self.error(c.span().wrap(Error::Unexpected {
                actual: c.kind,
                expected: expect,
            }));
            Err(())
        }
    }

    /// Returns true while the current token does *not* match one of the
    /// provided ones. [`TokenKind::Eof`] is implicitly included in the list.
    ///
    /// This won't advance the cursor.
    fn except(&self, except: impl IntoIterator<Item = TokenKind>) -> bool {
        let c = self.peek();
        for e in except {
            if c.kind == e {
                return false;
            }
        }
        c.kind != TokenKind::Eof
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    InvalidAssignmentTarget,
    UnexpectedTokenInExpr { token: TokenKind },
    Unexpected { actual: TokenKind, expected: TokenKind },
    ForUnsupported,
    ParseNumber,
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    pub fn parse_program(src: &str) -> (Interner<str>, Program) {
        let (tokens, lex_errors) = crate::lexer::tokenize(src);
        assert!(lex_errors.is_empty(), "lexer errors: {lex_errors:?}");
        let mut i = Interner::with_capacity(32);
        let prog = super::parse_program(src, &tokens, &mut i).expect("failed to parse");
        (i, prog)
    }
}

#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        fn test_variable_untyped() {
            let program = "let x = 1;";
            let tree_ok = "
                var x
                  number 1
            ";
        }

        fn test_variable_typed_mutable() {
            let program = "mut count: number = 0;";
            let tree_ok = "
                var count: number (mut)
                  number 0
            ";
        }

        fn test_variable_init_is_full_expression() {
            let program = r#"let greeting = "hello" + name;"#;
            let tree_ok = r#"
                var greeting
                  binary Add
                    string "hello"
                    ident name
            "#;
        }

        fn test_function_declaration() {
            let program = "fn add(a: number, b: number) -> number { return a + b; }";
            let tree_ok = "
                function add(a: number, b: number) -> number
                  return
                    binary Add
                      ident a
                      ident b
            ";
        }

        fn test_function_no_params() {
            let program = "fn answer() -> number { return 42; }";
            let tree_ok = "
                function answer() -> number
                  return
                    number 42
            ";
        }

        fn test_class_declaration() {
            let program = "
                class Counter {
                    count: number = 0;
                    static instances: number;
                    fn increment() -> number {
                        this.count = this.count + 1;
                        return this.count;
                    }
                    static fn make() -> Counter {
                        return new Counter();
                    }
                }
            ";
            let tree_ok = "
                class Counter
                  property count: number
                    number 0
                  property instances: number (static)
                  method increment() -> number
                    assignment
                      property count
                        this
                      binary Add
                        property count
                          this
                        number 1
                    return
                      property count
                        this
                  method make() -> Counter (static)
                    return
                      new Counter
            ";
        }

        fn test_if_else_statement() {
            let program = "if (x > 1) { return x; } else { return 1; }";
            let tree_ok = "
                if
                  binary Gt
                    ident x
                    number 1
                  then
                    return
                      ident x
                  else
                    return
                      number 1
            ";
        }

        fn test_while_statement() {
            let program = "while (i < 10) { i = i + 1; }";
            let tree_ok = "
                while
                  binary Lt
                    ident i
                    number 10
                  body
                    assignment
                      ident i
                      binary Add
                        ident i
                        number 1
            ";
        }

        fn test_standalone_block() {
            let program = "{ let x = 1; }";
            let tree_ok = "
                block
                  var x
                    number 1
            ";
        }

        fn test_empty_program_is_valid() {
            let program = "";
            let tree_ok = "";
        }

        fn test_expression_statement() {
            let program = "factorial(5);";
            let tree_ok = "
                call
                  ident factorial
                  arguments
                    number 5
            ";
        }

        fn test_precedence_add_mul() {
            let expr = "1 + 2 * 3";
            let tree_ok = "
                binary Add
                  number 1
                  binary Mul
                    number 2
                    number 3
            ";
        }

        fn test_precedence_grouping() {
            let expr = "(1 + 2) * 3";
            let tree_ok = "
                binary Mul
                  grouping
                    binary Add
                      number 1
                      number 2
                  number 3
            ";
        }

        fn test_precedence_logical() {
            let expr = "a && b || c && d";
            let tree_ok = "
                logical Or
                  logical And
                    ident a
                    ident b
                  logical And
                    ident c
                    ident d
            ";
        }

        fn test_precedence_arith_compare_equality() {
            let expr = "a + b < c == d";
            let tree_ok = "
                binary Eq
                  binary Lt
                    binary Add
                      ident a
                      ident b
                    ident c
                  ident d
            ";
        }

        fn test_assignment_right_associative() {
            let expr = "a = b = c + 1";
            let tree_ok = "
                assignment
                  ident a
                  assignment
                    ident b
                    binary Add
                      ident c
                      number 1
            ";
        }

        fn test_unary_operators() {
            let expr = "-x * !y";
            let tree_ok = "
                binary Mul
                  unary Neg
                    ident x
                  unary Not
                    ident y
            ";
        }

        fn test_unary_binds_looser_than_member_chain() {
            let expr = "-a.b";
            let tree_ok = "
                unary Neg
                  property b
                    ident a
            ";
        }

        fn test_call_member_index_chain() {
            let expr = "a.b(x)[0].c";
            let tree_ok = "
                property c
                  index
                    call
                      property b
                        ident a
                      arguments
                        ident x
                    number 0
            ";
        }

        fn test_call_no_args() {
            let expr = "f()";
            let tree_ok = "
                call
                  ident f
            ";
        }

        fn test_array_literal() {
            let expr = "[1, 2, [3]]";
            let tree_ok = "
                array
                  number 1
                  number 2
                  array
                    number 3
            ";
        }

        fn test_object_literal() {
            let expr = r#"{ x: 1, y: "two" }"#;
            let tree_ok = r#"
                object
                  entry x
                    number 1
                  entry y
                    string "two"
            "#;
        }

        fn test_new_expression() {
            let expr = "new Point(1, 2)";
            let tree_ok = "
                new Point
                  arguments
                    number 1
                    number 2
            ";
        }

        fn test_nil_literal() {
            let expr = "nil";
            let tree_ok = "nil";
        }

        fn test_string_escapes_are_processed() {
            let expr = r#""a\nb""#;
            let tree_ok = r#"string "a\nb""#;
        }

        fn test_assignment_to_property() {
            let expr = "this.x = 1";
            let tree_ok = "
                assignment
                  property x
                    this
                  number 1
            ";
        }

        fn test_assignment_to_index() {
            let expr = "a[0] = 5";
            let tree_ok = "
                assignment
                  index
                    ident a
                    number 0
                  number 5
            ";
        }

        fn test_error_invalid_assignment_target() {
            let expr = "a + b = c";
            let expected_errors = &["1:1: invalid assignment target"];
        }

        fn test_error_unexpected_token_in_expr() {
            let expr = "1 + ;";
            let expected_errors = &["1:5: unexpected token Semicolon in expression"];
        }

        fn test_error_unclosed_paren() {
            let program = "let x = (1 + 2;";
            let tree_error = "";
            let expected_errors = &["1:15: expected token RParen, but got Semicolon"];
        }

        fn test_error_missing_variable_name() {
            let program = "let = 5;";
            let tree_error = "";
            let expected_errors = &["1:5: expected token Identifier, but got Assign"];
        }

        fn test_recovery_keeps_neighbor_declarations() {
            let program = "let a = 1;\nlet b = ;\nlet c = 3;";
            let tree_error = "
                var a
                  number 1
                var c
                  number 3
            ";
            let expected_errors = &["2:9: unexpected token Semicolon in expression"];
        }

        fn test_recovery_for_is_reserved() {
            let program = "for ;\nlet x = 1;";
            let tree_error = "
                var x
                  number 1
            ";
            let expected_errors = &["1:1: for loops are not yet supported"];
        }

        fn test_recovery_inside_function_drops_whole_declaration() {
            // The error inside `broken` aborts that whole declaration; the
            // dangling `}` then produces one follow-up error before recovery
            // lands on `fn fine`.
            let program = "fn broken() -> number { return 1 + ; }\nfn fine() -> number { return 2; }";
            let tree_error = "
                function fine() -> number
                  return
                    number 2
            ";
            let expected_errors = &[
                "1:36: unexpected token Semicolon in expression",
                "1:38: unexpected token RBrace in expression",
            ];
        }
    );

    mod more {
        use crate::parser::test_utils::parse_program;

        #[test]
        fn declaration_count_matches_source() {
            let (_, prog) = parse_program("let a = 1;\nfn f() -> number { return a; }\nf();");
            assert_eq!(prog.decls.len(), 3);
        }
    }
}
