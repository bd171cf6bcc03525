use std::{
    fmt::{self, Write},
    format_args as f,
};

use crate::{
    ast::{
        BinaryOp, Block, ClassDecl, Decl, Expr, ExprKind, FunctionDecl, LogicalOp, MethodDecl,
        ObjectEntry, Param, Program, Stmt, UnaryOp, VariableDecl,
    },
    util::intern::{Interned, Interner},
};


const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

/// Runtime support emitted ahead of every program.
///
/// `checkType` asserts the runtime type for the `number`, `string` and
/// `array` type names, is a no-op for any other declared type name, and
/// returns the value unchanged so it can be inlined around expressions.
pub const PREAMBLE: &str = r"// Runtime support
const _runtime = {
    checkType: function(value, type) {
        switch (type) {
            case 'number':
                if (typeof value !== 'number') throw new TypeError(`Expected number, got ${typeof value}`);
                break;
            case 'string':
                if (typeof value !== 'string') throw new TypeError(`Expected string, got ${typeof value}`);
                break;
            case 'array':
                if (!Array.isArray(value)) throw new TypeError(`Expected array, got ${typeof value}`);
                break;
        }
        return value;
    }
};
";

/// Appended after a top-level function named `main` so the emitted file runs
/// itself.
const MAIN_RUNNER: &str = r"
(async () => {
    try {
        const result = await main();
        console.log('Result:', result);
        return result;
    } catch (error) {
        console.error('Error:', error);
        throw error;
    }
})();
";

/// Walks the program, emitting the preamble followed by one unit per
/// top-level declaration, in source order.
///
/// The output is a pure function of the AST and the interner: generating the
/// same program twice yields byte-identical text.
pub fn generate(program: &Program, idents: &Interner<str>) -> String {
    Generator::new(idents).generate(program)
}

struct Generator<'ident> {
    code: String,
    idents: &'ident Interner<str>,
    indent: usize,
}

/// The function or method currently being emitted, if any.
///
/// Threaded explicitly through the recursive emission calls (never stored on
/// the generator) so nested or parallel generator invocations cannot
/// interfere.
#[derive(Copy, Clone, Default)]
struct FnCtx {
    return_ty: Option<Interned<str>>,
}

impl Generator<'_> {
    fn generate(mut self, program: &Program) -> String {
        self.raw(PREAMBLE);
        for decl in &program.decls {
            self.blank();
            self.g_decl(decl, FnCtx::default());
        }
        self.code
    }

    fn g_decl(&mut self, decl: &Decl, ctx: FnCtx) {
        match decl {
            Decl::Function(func) => self.g_function(func),
            Decl::Variable(var) => self.g_variable(var),
            Decl::Class(class) => self.g_class(class),
            Decl::Stmt(stmt) => self.g_stmt(stmt, ctx),
        }
    }

    fn g_function(&mut self, func: &FunctionDecl) {
        let name = self.idents.get(&func.name);
        let params = self.param_names(&func.params);
        self.line(f!("async function {name}({params}) {{"));
        let ctx = FnCtx {
            return_ty: Some(func.return_ty.name()),
        };
        self.indented(|this| {
            this.g_param_checks(&func.params);
            this.g_block(&func.body, ctx);
        });
        self.line(f!("}}"));

        if name == "main" {
            self.raw(MAIN_RUNNER);
        }
    }

    fn g_variable(&mut self, var: &VariableDecl) {
        let keyword = if var.mutable { "let" } else { "const" };
        let name = self.idents.get(&var.name);
        let init = self.g_expr(&var.init);
        match var.ty {
            Some(ty) => {
                let ty = self.idents.get(ty);
                self.line(f!("{keyword} {name} = _runtime.checkType({init}, \"{ty}\");"));
            }
            None => self.line(f!("{keyword} {name} = {init};")),
        }
    }

    fn g_class(&mut self, class: &ClassDecl) {
        let name = self.idents.get(&class.name);
        self.line(f!("class {name} {{"));
        self.indented(|this| {
            // The constructor assigns every non-static property onto the
            // instance, defaulting to null.
            this.line(f!("constructor() {{"));
            this.indented(|this| {
                for property in &class.properties {
                    if property.is_static {
                        continue;
                    }
                    let name = this.idents.get(&property.name);
                    let init = this.g_init(property.init.as_ref());
                    this.line(f!("this.{name} = {init};"));
                }
            });
            this.line(f!("}}"));

            for property in &class.properties {
                if !property.is_static {
                    continue;
                }
                let name = this.idents.get(&property.name);
                let init = this.g_init(property.init.as_ref());
                this.line(f!("static {name} = {init};"));
            }

            for method in &class.methods {
                this.blank();
                this.g_method(method);
            }
        });
        self.line(f!("}}"));
    }

    fn g_method(&mut self, method: &MethodDecl) {
        let prefix = if method.is_static { "static " } else { "" };
        let name = self.idents.get(&method.name);
        let params = self.param_names(&method.params);
        self.line(f!("{prefix}async {name}({params}) {{"));
        let ctx = FnCtx {
            return_ty: Some(method.return_ty.name()),
        };
        self.indented(|this| {
            this.g_param_checks(&method.params);
            this.g_block(&method.body, ctx);
        });
        self.line(f!("}}"));
    }

    /// One type-check statement per typed parameter, in parameter order,
    /// ahead of any user statement.
    fn g_param_checks(&mut self, params: &[Param]) {
        for param in params {
            let name = self.idents.get(&param.name);
            let ty = self.idents.get(param.ty.name());
            self.line(f!("_runtime.checkType({name}, \"{ty}\");"));
        }
    }

    fn g_block(&mut self, block: &Block, ctx: FnCtx) {
        for decl in &block.decls {
            self.g_decl(decl, ctx);
        }
    }

    fn g_stmt(&mut self, stmt: &Stmt, ctx: FnCtx) {
        match stmt {
            Stmt::Block(block) => {
                self.line(f!("{{"));
                self.indented(|this| this.g_block(block, ctx));
                self.line(f!("}}"));
            }
            Stmt::If(if_stmt) => {
                let condition = self.g_expr(&if_stmt.condition);
                self.line(f!("if ({condition}) {{"));
                self.indented(|this| this.g_block(&if_stmt.then_branch, ctx));
                if let Some(ref else_branch) = if_stmt.else_branch {
                    self.line(f!("}} else {{"));
                    self.indented(|this| this.g_block(else_branch, ctx));
                }
                self.line(f!("}}"));
            }
            Stmt::While(while_stmt) => {
                let condition = self.g_expr(&while_stmt.condition);
                self.line(f!("while ({condition}) {{"));
                self.indented(|this| this.g_block(&while_stmt.body, ctx));
                self.line(f!("}}"));
            }
            // A conforming parser rejects `for` before constructing the node.
            Stmt::For(_) => unreachable!("`for` loops are rejected during parsing"),
            Stmt::Return(ret) => {
                let value = self.g_expr(&ret.value);
                match ctx.return_ty {
                    Some(ty) => {
                        let ty = self.idents.get(ty);
                        self.line(f!("return _runtime.checkType({value}, \"{ty}\");"));
                    }
                    None => self.line(f!("return {value};")),
                }
            }
            Stmt::Expr(expr) => self.g_expr_stmt(expr),
        }
    }

    /// Assignments are emitted as plain statements; any other expression
    /// statement surfaces its value with `return`, which the file runner
    /// relies on by evaluating emitted programs inside an async wrapper.
    fn g_expr_stmt(&mut self, expr: &Expr) {
        let code = self.g_expr(expr);
        if matches!(expr.kind, ExprKind::Assignment { .. }) {
            self.line(f!("{code};"));
        } else {
            self.line(f!("return {code};"));
        }
    }

    /// Operators are emitted fully parenthesized so the output is immune to
    /// target-language precedence differences.
    fn g_expr(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Binary { op, lhs, rhs } => {
                format!(
                    "({} {} {})",
                    self.g_expr(lhs),
                    binary_op_str(*op),
                    self.g_expr(rhs)
                )
            }
            ExprKind::Logical { op, lhs, rhs } => {
                format!(
                    "({} {} {})",
                    self.g_expr(lhs),
                    logical_op_str(*op),
                    self.g_expr(rhs)
                )
            }
            ExprKind::Unary { op, operand } => {
                format!("({}{})", unary_op_str(*op), self.g_expr(operand))
            }
            ExprKind::Assignment { target, value } => {
                format!("{} = {}", self.g_expr(target), self.g_expr(value))
            }
            ExprKind::Call { callee, args } => {
                format!("await {}({})", self.g_expr(callee), self.g_exprs(args))
            }
            ExprKind::Grouping(inner) => format!("({})", self.g_expr(inner)),
            ExprKind::Property { object, name } => {
                format!("{}.{}", self.g_expr(object), self.idents.get(name))
            }
            ExprKind::Index { object, index } => {
                format!("{}[{}]", self.g_expr(object), self.g_expr(index))
            }
            ExprKind::Array(elements) => format!("[{}]", self.g_exprs(elements)),
            ExprKind::Object(entries) => self.g_object(entries),
            ExprKind::New { class_name, args } => {
                format!("new {}({})", self.idents.get(class_name), self.g_exprs(args))
            }
            ExprKind::This => "this".to_owned(),
            ExprKind::Id(ident) => self.idents.get(ident).to_owned(),
            ExprKind::Number(value) => value.to_string(),
            ExprKind::Str(value) => format!("\"{value}\""),
            ExprKind::Bool(value) => value.to_string(),
            ExprKind::Nil => "null".to_owned(),
            ExprKind::Dummy => unreachable!("dummy exprs never appear in a parsed program"),
        }
    }

    fn g_exprs(&self, exprs: &[Expr]) -> String {
        let exprs: Vec<_> = exprs.iter().map(|e| self.g_expr(e)).collect();
        exprs.join(", ")
    }

    fn g_object(&self, entries: &[ObjectEntry]) -> String {
        if entries.is_empty() {
            return "{}".to_owned();
        }
        let entries: Vec<_> = entries
            .iter()
            .map(|e| format!("{}: {}", self.idents.get(&e.key), self.g_expr(&e.value)))
            .collect();
        format!("{{ {} }}", entries.join(", "))
    }

    fn g_init(&self, init: Option<&Expr>) -> String {
        match init {
            Some(init) => self.g_expr(init),
            None => "null".to_owned(),
        }
    }

    fn param_names(&self, params: &[Param]) -> String {
        let names: Vec<_> = params.iter().map(|p| self.idents.get(&p.name)).collect();
        names.join(", ")
    }
}

// Utility functions.
impl Generator<'_> {
    fn new(idents: &Interner<str>) -> Generator<'_> {
        Generator {
            code: String::with_capacity(DEFAULT_CODE_CAPACITY),
            idents,
            indent: 0,
        }
    }

    /// Writes an indented line.
    fn line(&mut self, f: fmt::Arguments<'_>) {
        for _ in 0..self.indent {
            self.code.push_str("  ");
        }
        self.code
            .write_fmt(f)
            .expect("code emit should be infallible");
        self.code.push('\n');
    }

    fn blank(&mut self) {
        self.code.push('\n');
    }

    fn raw(&mut self, text: &str) {
        self.code.push_str(text);
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Eq => "==",
        BinaryOp::Neq => "!=",
        BinaryOp::Gt => ">",
        BinaryOp::Gte => ">=",
        BinaryOp::Lt => "<",
        BinaryOp::Lte => "<=",
    }
}

fn logical_op_str(op: LogicalOp) -> &'static str {
    match op {
        LogicalOp::And => "&&",
        LogicalOp::Or => "||",
    }
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "!",
        UnaryOp::Neg => "-",
    }
}
