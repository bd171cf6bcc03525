//! Structural printers for tokens and the AST.
//!
//! The output is a plain field-labeled form so collaborators (CLI, HTTP
//! playground) can present tokens and trees without depending on the crate's
//! internal types.

use std::io::{self, Write};

use crate::{
    ast::*,
    lexer::extract,
    token::{Token, TokenKind},
    util::intern::Interner,
};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string(idents: &Interner<str>, program: &Program) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, idents, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_expr_string(idents: &Interner<str>, expr: &Expr) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, idents, 0, expr).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_tokens_string(src: &str, tokens: &[Token]) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_tokens(&mut buf, src, tokens).unwrap();
    String::from_utf8(buf).unwrap()
}

/// Prints one token per line: position, kind, and the literal value for the
/// kinds that carry one.
pub fn print_tokens(w: &mut impl Write, src: &str, tokens: &[Token]) -> io::Result<()> {
    for token in tokens {
        write!(w, "{} {:?}", token.span().pos(src), token.kind)?;
        match token.kind {
            TokenKind::Identifier => write!(w, " {}", extract::ident(*token, src))?,
            TokenKind::Number => write!(w, " {}", token.span().substr(src))?,
            TokenKind::Str => write!(w, " {:?}", extract::string(*token, src))?,
            TokenKind::EscapedStr => write!(w, " {:?}", extract::escaped_string(*token, src))?,
            _ => {}
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn print_program(
    w: &mut impl Write,
    idents: &Interner<str>,
    program: &Program,
) -> io::Result<()> {
    for decl in &program.decls {
        print_decl(w, idents, 0, decl)?;
    }
    Ok(())
}

fn print_decl(w: &mut impl Write, idents: &Interner<str>, i: usize, decl: &Decl) -> io::Result<()> {
    match decl {
        Decl::Function(func) => {
            sp(w, i)?;
            write!(w, "function {}(", idents.get(&func.name))?;
            print_params(w, idents, &func.params)?;
            writeln!(w, ") -> {}", idents.get(func.return_ty.name()))?;
            print_block_decls(w, idents, i + 1, &func.body)?;
        }
        Decl::Variable(var) => {
            sp(w, i)?;
            write!(w, "var {}", idents.get(&var.name))?;
            if let Some(ref ty) = var.ty {
                write!(w, ": {}", idents.get(ty.name()))?;
            }
            if var.mutable {
                write!(w, " (mut)")?;
            }
            writeln!(w)?;
            print_expr(w, idents, i + 1, &var.init)?;
        }
        Decl::Class(class) => {
            sp(w, i)?;
            writeln!(w, "class {}", idents.get(&class.name))?;
            for property in &class.properties {
                sp(w, i + 1)?;
                write!(
                    w,
                    "property {}: {}",
                    idents.get(&property.name),
                    idents.get(property.ty.name()),
                )?;
                if property.is_static {
                    write!(w, " (static)")?;
                }
                writeln!(w)?;
                if let Some(ref init) = property.init {
                    print_expr(w, idents, i + 2, init)?;
                }
            }
            for method in &class.methods {
                sp(w, i + 1)?;
                write!(w, "method {}(", idents.get(&method.name))?;
                print_params(w, idents, &method.params)?;
                write!(w, ") -> {}", idents.get(method.return_ty.name()))?;
                if method.is_static {
                    write!(w, " (static)")?;
                }
                writeln!(w)?;
                print_block_decls(w, idents, i + 2, &method.body)?;
            }
        }
        Decl::Stmt(stmt) => print_stmt(w, idents, i, stmt)?,
    }
    Ok(())
}

fn print_stmt(w: &mut impl Write, idents: &Interner<str>, i: usize, stmt: &Stmt) -> io::Result<()> {
    match stmt {
        Stmt::Block(block) => {
            sp(w, i)?;
            writeln!(w, "block")?;
            print_block_decls(w, idents, i + 1, block)?;
        }
        Stmt::If(if_stmt) => {
            sp(w, i)?;
            writeln!(w, "if")?;
            print_expr(w, idents, i + 1, &if_stmt.condition)?;
            sp(w, i + 1)?;
            writeln!(w, "then")?;
            print_block_decls(w, idents, i + 2, &if_stmt.then_branch)?;
            if let Some(ref else_branch) = if_stmt.else_branch {
                sp(w, i + 1)?;
                writeln!(w, "else")?;
                print_block_decls(w, idents, i + 2, else_branch)?;
            }
        }
        Stmt::While(while_stmt) => {
            sp(w, i)?;
            writeln!(w, "while")?;
            print_expr(w, idents, i + 1, &while_stmt.condition)?;
            sp(w, i + 1)?;
            writeln!(w, "body")?;
            print_block_decls(w, idents, i + 2, &while_stmt.body)?;
        }
        Stmt::For(for_stmt) => {
            sp(w, i)?;
            writeln!(w, "for")?;
            print_decl(w, idents, i + 1, &for_stmt.init)?;
            print_expr(w, idents, i + 1, &for_stmt.condition)?;
            print_expr(w, idents, i + 1, &for_stmt.increment)?;
            print_block_decls(w, idents, i + 1, &for_stmt.body)?;
        }
        Stmt::Return(ret) => {
            sp(w, i)?;
            writeln!(w, "return")?;
            print_expr(w, idents, i + 1, &ret.value)?;
        }
        Stmt::Expr(expr) => print_expr(w, idents, i, expr)?,
    }
    Ok(())
}

pub fn print_expr(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    expr: &Expr,
) -> io::Result<()> {
    sp(w, i)?;
    match &expr.kind {
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?}")?;
            print_expr(w, idents, i + 1, lhs)?;
            print_expr(w, idents, i + 1, rhs)?;
        }
        ExprKind::Logical { op, lhs, rhs } => {
            writeln!(w, "logical {op:?}")?;
            print_expr(w, idents, i + 1, lhs)?;
            print_expr(w, idents, i + 1, rhs)?;
        }
        ExprKind::Unary { op, operand } => {
            writeln!(w, "unary {op:?}")?;
            print_expr(w, idents, i + 1, operand)?;
        }
        ExprKind::Assignment { target, value } => {
            writeln!(w, "assignment")?;
            print_expr(w, idents, i + 1, target)?;
            print_expr(w, idents, i + 1, value)?;
        }
        ExprKind::Call { callee, args } => {
            writeln!(w, "call")?;
            print_expr(w, idents, i + 1, callee)?;
            print_args(w, idents, i + 1, args)?;
        }
        ExprKind::Grouping(inner) => {
            writeln!(w, "grouping")?;
            print_expr(w, idents, i + 1, inner)?;
        }
        ExprKind::Property { object, name } => {
            writeln!(w, "property {}", idents.get(name))?;
            print_expr(w, idents, i + 1, object)?;
        }
        ExprKind::Index { object, index } => {
            writeln!(w, "index")?;
            print_expr(w, idents, i + 1, object)?;
            print_expr(w, idents, i + 1, index)?;
        }
        ExprKind::Array(elements) => {
            writeln!(w, "array")?;
            for element in elements {
                print_expr(w, idents, i + 1, element)?;
            }
        }
        ExprKind::Object(entries) => {
            writeln!(w, "object")?;
            for entry in entries {
                sp(w, i + 1)?;
                writeln!(w, "entry {}", idents.get(&entry.key))?;
                print_expr(w, idents, i + 2, &entry.value)?;
            }
        }
        ExprKind::New { class_name, args } => {
            writeln!(w, "new {}", idents.get(class_name))?;
            print_args(w, idents, i + 1, args)?;
        }
        ExprKind::This => writeln!(w, "this")?,
        ExprKind::Id(ident) => writeln!(w, "ident {}", idents.get(ident))?,
        ExprKind::Number(value) => writeln!(w, "number {value}")?,
        ExprKind::Str(value) => writeln!(w, "string {value:?}")?,
        ExprKind::Bool(value) => writeln!(w, "bool {value}")?,
        ExprKind::Nil => writeln!(w, "nil")?,
        ExprKind::Dummy => writeln!(w, "dummy")?,
    }
    Ok(())
}

fn print_params(w: &mut impl Write, idents: &Interner<str>, params: &[Param]) -> io::Result<()> {
    for (idx, param) in params.iter().enumerate() {
        if idx > 0 {
            write!(w, ", ")?;
        }
        write!(
            w,
            "{}: {}",
            idents.get(&param.name),
            idents.get(param.ty.name()),
        )?;
    }
    Ok(())
}

fn print_args(w: &mut impl Write, idents: &Interner<str>, i: usize, args: &[Expr]) -> io::Result<()> {
    if args.is_empty() {
        return Ok(());
    }
    sp(w, i)?;
    writeln!(w, "arguments")?;
    for arg in args {
        print_expr(w, idents, i + 1, arg)?;
    }
    Ok(())
}

fn print_block_decls(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    block: &Block,
) -> io::Result<()> {
    for decl in &block.decls {
        print_decl(w, idents, i, decl)?;
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    #[test]
    fn tokens_print_with_position_and_literal() {
        let src = "let x = 1;";
        let (tokens, _) = lexer::tokenize(src);
        let printed = print_tokens_string(src, &tokens);
        let expected = "\
            1:1 Let\n\
            1:5 Identifier x\n\
            1:7 Assign\n\
            1:9 Number 1\n\
            1:10 Semicolon\n\
            1:11 Eof\n";
        assert_eq!(printed, expected);
    }
}
