// SPDX-License-Identifier: (MIT OR Apache-2.0)

use kettle_ast::decl::*;
use kettle_ast::expr::*;
use kettle_ast::stmt::*;
use kettle_ast::symbol::{Sym, SymbolTable, VarId};

use crate::config::FormatConfig;

pub struct Printer<'a> {
    output: String,
    indent: usize,
    symbols: &'a SymbolTable,
    config: &'a FormatConfig,
}

impl<'a> Printer<'a> {
    pub fn new(symbols: &'a SymbolTable, config: &'a FormatConfig) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            symbols,
            config,
        }
    }

    pub fn finish(mut self) -> String {
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output
    }

    // --- Helpers ---

    fn emit(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn emit_newline(&mut self) {
        self.output.push('\n');
    }

    fn emit_indent(&mut self) {
        let spaces = self.indent * self.config.indent_width;
        for _ in 0..spaces {
            self.output.push(' ');
        }
    }

    fn sym_name(&self, sym: Sym) -> String {
        let name = self.symbols.name_of(sym).unwrap_or("<unknown>");
        match sym {
            Sym::Var(VarId(id)) if self.config.show_var_ids => format!("{}#{}", name, id),
            _ => name.to_string(),
        }
    }

    fn var_decl(&self, var: VarId) -> String {
        let ty = self
            .symbols
            .var(var)
            .map(|v| v.ty.to_string())
            .unwrap_or_else(|| "var".to_string());
        format!("{} {}", ty, self.sym_name(Sym::Var(var)))
    }

    // --- Declarations ---

    pub fn format_program(&mut self, program: &Program) {
        for (i, class) in program.classes.iter().enumerate() {
            if i > 0 {
                self.emit_newline();
            }
            self.format_class(class);
        }
    }

    pub fn format_class(&mut self, class: &ClassDecl) {
        self.emit_indent();
        self.emit("class ");
        self.emit(&class.name);
        if let Some(sup) = &class.superclass {
            self.emit(" extends ");
            self.emit(sup);
        }
        if !class.interfaces.is_empty() {
            self.emit(" implements ");
            self.emit(&class.interfaces.join(", "));
        }
        self.emit(" {");
        self.emit_newline();
        self.indent += 1;
        for (i, method) in class.methods.iter().enumerate() {
            if i > 0 {
                self.emit_newline();
            }
            self.format_method(method);
        }
        self.indent -= 1;
        self.emit_indent();
        self.emit("}");
        self.emit_newline();
    }

    pub fn format_method(&mut self, method: &MethodDecl) {
        self.emit_indent();
        let params: Vec<String> = method.params.iter().map(|&p| self.var_decl(p)).collect();
        self.emit(&format!("{} {}({})", method.ret, method.name, params.join(", ")));
        match &method.body {
            Some(body) => {
                self.emit(" ");
                self.format_stmt_inline(body);
                self.emit_newline();
            }
            None => {
                self.emit(";");
                self.emit_newline();
            }
        }
    }

    // --- Statements ---

    /// Print `stmt` on its own indented line(s).
    pub fn format_stmt(&mut self, stmt: &Stmt) {
        self.emit_indent();
        self.format_stmt_inline(stmt);
        self.emit_newline();
    }

    /// Print `stmt` at the current position, without the final newline.
    fn format_stmt_inline(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(e) => {
                let e = self.expr_str(e);
                self.emit(&e);
                self.emit(";");
            }
            StmtKind::Local { .. } => {
                let local = self.local_str(stmt);
                self.emit(&local);
                self.emit(";");
            }
            StmtKind::Block(stmts) => {
                self.emit("{");
                self.emit_newline();
                self.indent += 1;
                for s in stmts {
                    self.format_stmt(s);
                }
                self.indent -= 1;
                self.emit_indent();
                self.emit("}");
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.expr_str(cond);
                self.emit(&format!("if ({})", cond));
                self.format_body(then_branch);
                if let Some(else_branch) = else_branch {
                    if matches!(then_branch.kind, StmtKind::Block(_)) {
                        self.emit(" ");
                    } else {
                        self.emit_newline();
                        self.emit_indent();
                    }
                    self.emit("else");
                    if matches!(else_branch.kind, StmtKind::If { .. }) {
                        self.emit(" ");
                        self.format_stmt_inline(else_branch);
                    } else {
                        self.format_body(else_branch);
                    }
                }
            }
            StmtKind::While { cond, body } => {
                let cond = self.expr_str(cond);
                self.emit(&format!("while ({})", cond));
                self.format_body(body);
            }
            StmtKind::DoWhile { body, cond } => {
                self.emit("do");
                self.format_body(body);
                if matches!(body.kind, StmtKind::Block(_)) {
                    self.emit(" ");
                } else {
                    self.emit_newline();
                    self.emit_indent();
                }
                let cond = self.expr_str(cond);
                self.emit(&format!("while ({});", cond));
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let init: Vec<String> = init
                    .iter()
                    .map(|s| match &s.kind {
                        StmtKind::Expr(e) => self.expr_str(e),
                        _ => self.local_str(s),
                    })
                    .collect();
                let cond = cond.as_ref().map(|c| self.expr_str(c)).unwrap_or_default();
                let step: Vec<String> = step.iter().map(|e| self.expr_str(e)).collect();
                self.emit(&format!("for ({}; {}; {})", init.join(", "), cond, step.join(", ")));
                self.format_body(body);
            }
            StmtKind::Labeled { label, body } => {
                self.emit(label);
                self.emit(": ");
                self.format_stmt_inline(body);
            }
            StmtKind::Return(value) => match value {
                Some(v) => {
                    let v = self.expr_str(v);
                    self.emit(&format!("return {};", v));
                }
                None => self.emit("return;"),
            },
            StmtKind::Break(label) => match label {
                Some(l) => self.emit(&format!("break {};", l)),
                None => self.emit("break;"),
            },
            StmtKind::Continue(label) => match label {
                Some(l) => self.emit(&format!("continue {};", l)),
                None => self.emit("continue;"),
            },
        }
    }

    /// Body of a compound statement: braces stay on the header line,
    /// anything else goes on the next line one level deeper.
    fn format_body(&mut self, body: &Stmt) {
        if matches!(body.kind, StmtKind::Block(_)) {
            self.emit(" ");
            self.format_stmt_inline(body);
        } else {
            self.emit_newline();
            self.indent += 1;
            self.emit_indent();
            self.format_stmt_inline(body);
            self.indent -= 1;
        }
    }

    fn local_str(&self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::Local { var, init: Some(init) } => {
                format!("{} = {}", self.var_decl(*var), self.expr_str(init))
            }
            StmtKind::Local { var, init: None } => self.var_decl(*var),
            _ => String::new(),
        }
    }

    // --- Expressions ---

    pub fn expr_str(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Literal(lit) => literal_str(lit),
            ExprKind::Ident(sym) => self.sym_name(*sym),
            ExprKind::Unary { op, operand } => {
                let op = match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Neg => "-",
                };
                format!("{}{}", op, self.operand_str(operand))
            }
            ExprKind::Binary { op, left, right } => format!(
                "{} {} {}",
                self.operand_str(left),
                op.symbol(),
                self.operand_str(right)
            ),
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => format!(
                "{} ? {} : {}",
                self.operand_str(cond),
                self.operand_str(then_expr),
                self.operand_str(else_expr)
            ),
            ExprKind::Assign { target, value } => {
                format!("{} = {}", self.expr_str(target), self.expr_str(value))
            }
            ExprKind::Cast { target, expr } => format!("({}){}", target, self.operand_str(expr)),
            ExprKind::InstanceOf { expr, target } => {
                format!("{} instanceof {}", self.operand_str(expr), target)
            }
            ExprKind::TypeTest { expr, pattern } => {
                let name = self.sym_name(Sym::Binding(pattern.binding));
                let ty = match &pattern.declared {
                    Some(ty) => ty.to_string(),
                    None => "var".to_string(),
                };
                format!("{} instanceof {} {}", self.operand_str(expr), ty, name)
            }
            ExprKind::Call { name, args } => format!("{}({})", name, self.args_str(args)),
            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => format!("{}.{}({})", self.operand_str(receiver), method, self.args_str(args)),
            ExprKind::LetExpr { defs, body } => {
                let mut out = String::from("(let ");
                for def in defs {
                    out.push_str(&format!("{} = {}; ", self.var_decl(def.var), self.expr_str(&def.init)));
                }
                out.push_str(&format!("in {})", self.expr_str(body)));
                out
            }
        }
    }

    /// An operand of a larger expression, parenthesized when compound.
    fn operand_str(&self, expr: &Expr) -> String {
        let s = self.expr_str(expr);
        match expr.kind {
            ExprKind::Binary { .. }
            | ExprKind::Conditional { .. }
            | ExprKind::Assign { .. }
            | ExprKind::InstanceOf { .. }
            | ExprKind::TypeTest { .. } => format!("({})", s),
            _ => s,
        }
    }

    fn args_str(&self, args: &[Expr]) -> String {
        args.iter().map(|a| self.expr_str(a)).collect::<Vec<_>>().join(", ")
    }
}

fn literal_str(lit: &Literal) -> String {
    match lit {
        Literal::Bool(b) => b.to_string(),
        Literal::Int(n) => n.to_string(),
        Literal::Long(n) => format!("{}L", n),
        Literal::Float(x) => format!("{:?}f", x),
        Literal::Double(x) => format!("{:?}", x),
        Literal::Char(c) => format!("'{}'", escape_char(*c)),
        Literal::String(s) => {
            let escaped: String = s.chars().map(escape_char).collect();
            format!("\"{}\"", escaped)
        }
        Literal::Null => "null".to_string(),
    }
}

fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        '\r' => "\\r".to_string(),
        '\\' => "\\\\".to_string(),
        '\'' => "\\'".to_string(),
        '"' => "\\\"".to_string(),
        c if c.is_control() => format!("\\u{:04x}", c as u32),
        c => c.to_string(),
    }
}
