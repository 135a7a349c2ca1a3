// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pattern lowering over whole programs, checked structurally and by
//! running the program before and after lowering.

use std::cell::Cell;
use std::rc::Rc;

use kettle_ast::decl::{MethodDecl, Program};
use kettle_ast::expr::{BinOp, Expr, ExprKind, Literal};
use kettle_ast::make::TreeMaker;
use kettle_ast::stmt::{Stmt, StmtKind};
use kettle_ast::symbol::{BindingId, Sym, SymbolTable, VarId};
use kettle_ast::types::{PrimitiveKind, Type};
use kettle_flow::{preserve_bindings, MatchBindings, MatchBindingsComputer};
use kettle_interp::{Interpreter, Value};
use kettle_patterns::{lower_program, LowerConfig, LowerError};

struct Fixture {
    make: TreeMaker,
    symbols: SymbolTable,
}

impl Fixture {
    fn new() -> Self {
        Self {
            make: TreeMaker::new(),
            symbols: SymbolTable::new(),
        }
    }

    fn local(&mut self, name: &str, ty: Type) -> VarId {
        self.symbols.new_var(name, ty, Some("m".to_string()))
    }

    fn binding(&mut self, name: &str, ty: Type) -> BindingId {
        self.symbols.new_binding(name, ty, Some("m".to_string()))
    }

    fn var(&mut self, v: VarId) -> Expr {
        self.make.ident(&self.symbols, Sym::Var(v))
    }

    fn bound(&mut self, b: BindingId) -> Expr {
        self.make.ident(&self.symbols, Sym::Binding(b))
    }

    /// `operand instanceof T b`, with `T` the binding's type.
    fn test(&mut self, operand: Expr, b: BindingId) -> Expr {
        let ty = self.symbols.binding(b).map(|b| b.ty.clone());
        self.make.type_test(operand, b, ty)
    }

    fn length(&mut self, receiver: Expr) -> Expr {
        self.make.method_call(receiver, "length", Vec::new(), Type::int())
    }

    fn ret(&mut self, value: Expr) -> Stmt {
        self.make.return_(Some(value))
    }

    fn ret_int(&mut self, n: i32) -> Stmt {
        let v = self.make.int(n);
        self.make.return_(Some(v))
    }

    fn set(&mut self, v: VarId, value: Expr) -> Stmt {
        let target = self.var(v);
        let assign = self.make.assign(target, value);
        self.make.expr_stmt(assign)
    }

    fn finish(mut self, methods: Vec<MethodDecl>) -> Program {
        let class = self.make.class("Main", methods);
        Program {
            classes: vec![class],
            symbols: self.symbols,
        }
    }
}

fn lower_with<M: MatchBindings + ?Sized>(program: &Program, flow: &M) -> Result<Program, LowerError> {
    let mut lowered = program.clone();
    preserve_bindings(&mut lowered);
    lower_program(&mut lowered, flow, &LowerConfig::default())?;
    Ok(lowered)
}

fn lower(program: &Program) -> Program {
    let lowered = lower_with(program, &MatchBindingsComputer).unwrap();
    assert_fully_lowered(&lowered);
    lowered
}

fn assert_fully_lowered(program: &Program) {
    for class in &program.classes {
        for method in &class.methods {
            if let Some(body) = &method.body {
                body.walk_exprs(&mut |e| {
                    assert!(!matches!(e.kind, ExprKind::TypeTest { .. }), "pattern left in {}", method.name);
                    assert!(
                        !matches!(e.kind, ExprKind::Ident(Sym::Binding(_))),
                        "binding reference left in {}",
                        method.name
                    );
                });
            }
        }
    }
}

fn body<'p>(program: &'p Program, method: &str) -> &'p [Stmt] {
    match program.method(method).and_then(|m| m.body.as_ref()).map(|b| &b.kind) {
        Some(StmtKind::Block(stmts)) => stmts,
        other => panic!("method {} has no block body: {:?}", method, other),
    }
}

/// Declarations of variables named `name` anywhere in `method`.
fn decls_named(program: &Program, method: &str, name: &str) -> usize {
    let mut count = 0;
    for stmt in body(program, method) {
        stmt.walk(&mut |s| {
            if let StmtKind::Local { var, .. } = s.kind {
                if program.symbols.var(var).is_some_and(|v| v.name == name) {
                    count += 1;
                }
            }
        });
    }
    count
}

fn run(program: &Program, method: &str, args: Vec<Value>) -> String {
    let mut interp = Interpreter::new(program);
    match interp.call(method, args) {
        Ok(v) => v.to_string(),
        Err(e) => panic!("{} failed: {}", method, e),
    }
}

/// A native `next()` returning `values` in turn, and a count of its calls.
fn feed(interp: &mut Interpreter<'_>, values: Vec<Value>) -> Rc<Cell<usize>> {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    interp.register_native("next", move |_| {
        let i = counter.get();
        counter.set(i + 1);
        Ok(values.get(i).cloned().unwrap_or(Value::Null))
    });
    calls
}

// int m(Object o) { if (o instanceof String s) { return s.length(); } return -1; }
fn guard_program() -> Program {
    let mut fx = Fixture::new();
    let o = fx.local("o", Type::object());
    let s = fx.binding("s", Type::string());
    let ov = fx.var(o);
    let cond = fx.test(ov, s);
    let sv = fx.bound(s);
    let len = fx.length(sv);
    let ret = fx.ret(len);
    let then_branch = fx.make.block(vec![ret]);
    let guard = fx.make.if_(cond, then_branch, None);
    let miss = fx.ret_int(-1);
    let m = fx.make.method("m", vec![o], Type::int(), vec![guard, miss]);
    fx.finish(vec![m])
}

#[test]
fn pattern_free_program_is_unchanged() {
    // int sum(int n) { int acc = 0; while (n > 0) { acc = acc + n; n = n - 1; } return acc; }
    let mut fx = Fixture::new();
    let n = fx.local("n", Type::int());
    let acc = fx.local("acc", Type::int());
    let zero = fx.make.int(0);
    let init = fx.make.local(acc, Some(zero));
    let nv = fx.var(n);
    let zero = fx.make.int(0);
    let cond = fx.make.binary(BinOp::Gt, nv, zero);
    let (av, nv) = (fx.var(acc), fx.var(n));
    let sum = fx.make.binary(BinOp::Add, av, nv);
    let add = fx.set(acc, sum);
    let nv = fx.var(n);
    let one = fx.make.int(1);
    let dec = fx.make.binary(BinOp::Sub, nv, one);
    let dec = fx.set(n, dec);
    let loop_body = fx.make.block(vec![add, dec]);
    let loop_ = fx.make.while_(cond, loop_body);
    let av = fx.var(acc);
    let ret = fx.ret(av);
    let m = fx.make.method("sum", vec![n], Type::int(), vec![init, loop_, ret]);
    let program = fx.finish(vec![m]);

    let lowered = lower(&program);
    assert_eq!(lowered, program);
}

#[test]
fn relowering_is_a_no_op() {
    let once = lower(&guard_program());
    let twice = lower(&once);
    assert_eq!(twice, once);
}

#[test]
fn tested_expression_is_evaluated_once() {
    // int m() { if (next() instanceof String s) { return s.length(); } return -1; }
    let mut fx = Fixture::new();
    let s = fx.binding("s", Type::string());
    let next = fx.make.call("next", Vec::new(), Type::object());
    let cond = fx.test(next, s);
    let sv = fx.bound(s);
    let len = fx.length(sv);
    let ret = fx.ret(len);
    let then_branch = fx.make.block(vec![ret]);
    let guard = fx.make.if_(cond, then_branch, None);
    let miss = fx.ret_int(-1);
    let m = fx.make.method("m", Vec::new(), Type::int(), vec![guard, miss]);
    let program = fx.finish(vec![m]);
    let lowered = lower(&program);

    let mut interp = Interpreter::new(&lowered);
    let calls = feed(&mut interp, vec![Value::string("abc")]);
    assert!(matches!(interp.call("m", Vec::new()), Ok(Value::Int(3))));
    assert_eq!(calls.get(), 1);

    let mut interp = Interpreter::new(&lowered);
    let calls = feed(&mut interp, vec![Value::Int(7)]);
    assert!(matches!(interp.call("m", Vec::new()), Ok(Value::Int(-1))));
    assert_eq!(calls.get(), 1);
}

#[test]
fn guard_storage_is_scoped_to_the_if() {
    let program = guard_program();
    let lowered = lower(&program);

    // { String s = null; if (...) { ... } } return -1;
    let stmts = body(&lowered, "m");
    assert_eq!(stmts.len(), 2);
    let StmtKind::Block(wrapped) = &stmts[0].kind else {
        panic!("expected the if to be wrapped, got {:?}", stmts[0].kind);
    };
    assert_eq!(wrapped.len(), 2);
    let StmtKind::Local { var, init: Some(init) } = &wrapped[0].kind else {
        panic!("expected storage declaration");
    };
    assert_eq!(init.kind, ExprKind::Literal(Literal::Null));
    let storage = lowered.symbols.var(*var).unwrap();
    assert_eq!(storage.name, "s");
    assert_eq!(storage.ty, Type::string());
    assert!(matches!(wrapped[1].kind, StmtKind::If { .. }));

    for (arg, expected) in [(Value::string("four"), "4"), (Value::Int(1), "-1"), (Value::Null, "-1")] {
        assert_eq!(run(&program, "m", vec![arg.clone()]), expected);
        assert_eq!(run(&lowered, "m", vec![arg]), expected);
    }
}

#[test]
fn reference_after_failed_guard_is_rejected() {
    // void m(Object o) { if (o instanceof String s) { println(s); } println(s); }
    let mut fx = Fixture::new();
    let o = fx.local("o", Type::object());
    let s = fx.binding("s", Type::string());
    let ov = fx.var(o);
    let cond = fx.test(ov, s);
    let sv = fx.bound(s);
    let inside = fx.make.call("println", vec![sv], Type::Void);
    let inside = fx.make.expr_stmt(inside);
    let then_branch = fx.make.block(vec![inside]);
    let guard = fx.make.if_(cond, then_branch, None);
    let sv = fx.bound(s);
    let outside = fx.make.call("println", vec![sv], Type::Void);
    let outside = fx.make.expr_stmt(outside);
    let m = fx.make.method("m", vec![o], Type::Void, vec![guard, outside]);
    let program = fx.finish(vec![m]);

    match lower_with(&program, &MatchBindingsComputer) {
        Err(LowerError::UnresolvedBinding { name, .. }) => assert_eq!(name, "s"),
        other => panic!("expected unresolved binding, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn statically_certain_test_becomes_true() {
    // int m(String str) { if (str instanceof String s) { return s.length(); } return -1; }
    let mut fx = Fixture::new();
    let str_ = fx.local("str", Type::string());
    let s = fx.binding("s", Type::string());
    let sv = fx.var(str_);
    let cond = fx.test(sv, s);
    let bv = fx.bound(s);
    let len = fx.length(bv);
    let ret = fx.ret(len);
    let guard = fx.make.if_(cond, ret, None);
    let miss = fx.ret_int(-1);
    let m = fx.make.method("m", vec![str_], Type::int(), vec![guard, miss]);
    let program = fx.finish(vec![m]);
    let lowered = lower(&program);

    let StmtKind::Block(wrapped) = &body(&lowered, "m")[0].kind else {
        panic!("expected wrapped if");
    };
    let StmtKind::If { cond, .. } = &wrapped[1].kind else {
        panic!("expected if");
    };
    let ExprKind::LetExpr { defs, body: test } = &cond.kind else {
        panic!("expected let-expression, got {:?}", cond.kind);
    };
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].init.kind, ExprKind::Ident(Sym::Var(str_)));
    let ExprKind::Binary { op: BinOp::And, left, .. } = &test.kind else {
        panic!("expected conjunction");
    };
    assert_eq!(left.kind, ExprKind::Literal(Literal::Bool(true)));

    assert_eq!(run(&lowered, "m", vec![Value::string("abcd")]), "4");
}

#[test]
fn disjunction_shares_one_storage_slot() {
    // int m(Object a, Object b) { if (a instanceof Integer i || b instanceof Integer i) return i; return -1; }
    let mut fx = Fixture::new();
    let a = fx.local("a", Type::object());
    let b = fx.local("b", Type::object());
    let i1 = fx.binding("i", Type::class("Integer"));
    let i2 = fx.binding("i", Type::class("Integer"));
    let i = fx.symbols.merge(i1, i2).unwrap();
    let av = fx.var(a);
    let left = fx.test(av, i1);
    let bv = fx.var(b);
    let right = fx.test(bv, i2);
    let cond = fx.make.or(left, right);
    let iv = fx.bound(i);
    let ret = fx.ret(iv);
    let guard = fx.make.if_(cond, ret, None);
    let miss = fx.ret_int(-1);
    let m = fx.make.method("m", vec![a, b], Type::int(), vec![guard, miss]);
    let program = fx.finish(vec![m]);
    let lowered = lower(&program);

    assert_eq!(decls_named(&lowered, "m", "i"), 1);

    let mut stores = Vec::new();
    for stmt in body(&lowered, "m") {
        stmt.walk_exprs(&mut |e| {
            if let ExprKind::Assign { target, .. } = &e.kind {
                stores.push(target.kind.clone());
            }
        });
    }
    assert_eq!(stores.len(), 2);
    assert_eq!(stores[0], stores[1]);

    let cases = [
        (Value::Int(1), Value::Null, "1"),
        (Value::string("x"), Value::Int(2), "2"),
        (Value::string("x"), Value::string("y"), "-1"),
    ];
    for (x, y, expected) in cases {
        assert_eq!(run(&program, "m", vec![x.clone(), y.clone()]), expected);
        assert_eq!(run(&lowered, "m", vec![x, y]), expected);
    }
}

#[test]
fn conjunction_reuses_storage_of_enclosing_if() {
    // int m(Object o) { if (o instanceof String s && s.length() > 2) return s.length(); return 0; }
    let mut fx = Fixture::new();
    let o = fx.local("o", Type::object());
    let s = fx.binding("s", Type::string());
    let ov = fx.var(o);
    let test = fx.test(ov, s);
    let sv = fx.bound(s);
    let len = fx.length(sv);
    let two = fx.make.int(2);
    let long_enough = fx.make.binary(BinOp::Gt, len, two);
    let cond = fx.make.and(test, long_enough);
    let sv = fx.bound(s);
    let len = fx.length(sv);
    let ret = fx.ret(len);
    let guard = fx.make.if_(cond, ret, None);
    let zero = fx.ret_int(0);
    let m = fx.make.method("m", vec![o], Type::int(), vec![guard, zero]);
    let program = fx.finish(vec![m]);
    let lowered = lower(&program);

    assert_eq!(decls_named(&lowered, "m", "s"), 1);
    let StmtKind::Block(wrapped) = &body(&lowered, "m")[0].kind else {
        panic!("expected wrapped if");
    };
    let StmtKind::If { cond, .. } = &wrapped[1].kind else {
        panic!("expected if");
    };
    // No second scope around the `&&`.
    assert!(matches!(cond.kind, ExprKind::Binary { op: BinOp::And, .. }));

    for (arg, expected) in [(Value::string("abc"), "3"), (Value::string("ab"), "0"), (Value::Int(9), "0")] {
        assert_eq!(run(&lowered, "m", vec![arg]), expected);
    }
}

#[test]
fn preserved_binding_is_declared_once_in_the_block() {
    // int m(Object o) {
    //     if (!(o instanceof String s)) { return -1; }
    //     if (s.isEmpty()) { return 0; }
    //     return s.length();
    // }
    let build = || {
        let mut fx = Fixture::new();
        let o = fx.local("o", Type::object());
        let s = fx.binding("s", Type::string());
        let ov = fx.var(o);
        let test = fx.test(ov, s);
        let cond = fx.make.not(test);
        let bail = fx.ret_int(-1);
        let bail = fx.make.block(vec![bail]);
        let first = fx.make.if_(cond, bail, None);
        let sv = fx.bound(s);
        let empty = fx.make.method_call(sv, "isEmpty", Vec::new(), Type::boolean());
        let zero = fx.ret_int(0);
        let zero = fx.make.block(vec![zero]);
        let second = fx.make.if_(empty, zero, None);
        let sv = fx.bound(s);
        let len = fx.length(sv);
        let ret = fx.ret(len);
        let m = fx.make.method("m", vec![o], Type::int(), vec![first, second, ret]);
        (fx.finish(vec![m]), s)
    };

    let (program, _) = build();
    let lowered = lower(&program);
    assert!(lowered.symbols.bindings().any(|b| b.name == "s" && b.preserved));

    // String s = null; if (...) ...; if (s.isEmpty()) ...; return s.length();
    let stmts = body(&lowered, "m");
    assert_eq!(stmts.len(), 4);
    assert!(matches!(stmts[0].kind, StmtKind::Local { .. }));
    assert!(matches!(stmts[1].kind, StmtKind::If { .. }));
    assert_eq!(decls_named(&lowered, "m", "s"), 1);

    for (arg, expected) in [(Value::string("abc"), "3"), (Value::string(""), "0"), (Value::Int(1), "-1")] {
        assert_eq!(run(&program, "m", vec![arg.clone()]), expected);
        assert_eq!(run(&lowered, "m", vec![arg]), expected);
    }

    // An oracle that also credits the second guard with `s` must not
    // produce a second declaration.
    let (program, s) = build();
    let oracle = move |symbols: &mut SymbolTable, cond: &Expr, when_true: bool| {
        let mut out = MatchBindingsComputer.match_bindings(symbols, cond, when_true);
        let mut mentions = false;
        cond.walk(&mut |e| mentions |= e.kind == ExprKind::Ident(Sym::Binding(s)));
        if mentions && !when_true {
            out.push(s);
        }
        out
    };
    let lowered = lower_with(&program, &oracle).unwrap();
    assert_fully_lowered(&lowered);
    assert_eq!(decls_named(&lowered, "m", "s"), 1);
    assert_eq!(run(&lowered, "m", vec![Value::string("xy")]), "2");
}

#[test]
fn conditional_expression_scopes_its_bindings() {
    // int m(Object o) { return o instanceof String s ? s.length() : -1; }
    let mut fx = Fixture::new();
    let o = fx.local("o", Type::object());
    let s = fx.binding("s", Type::string());
    let ov = fx.var(o);
    let test = fx.test(ov, s);
    let sv = fx.bound(s);
    let len = fx.length(sv);
    let miss = fx.make.int(-1);
    let choice = fx.make.conditional(test, len, miss);
    let ret = fx.ret(choice);
    let m = fx.make.method("m", vec![o], Type::int(), vec![ret]);
    let program = fx.finish(vec![m]);
    let lowered = lower(&program);

    let StmtKind::Return(Some(value)) = &body(&lowered, "m")[0].kind else {
        panic!("expected return");
    };
    let ExprKind::LetExpr { defs, body: inner } = &value.kind else {
        panic!("expected let-expression around the conditional");
    };
    assert_eq!(defs.len(), 1);
    assert!(matches!(inner.kind, ExprKind::Conditional { .. }));
    assert_eq!(value.ty, Type::int());

    for (arg, expected) in [(Value::string("hello"), "5"), (Value::Long(3), "-1")] {
        assert_eq!(run(&program, "m", vec![arg.clone()]), expected);
        assert_eq!(run(&lowered, "m", vec![arg]), expected);
    }
}

#[test]
fn loops_preserve_bindings_past_their_exit() {
    // int w() { Object o = next(); while (!(o instanceof String s)) { o = next(); } return s.length(); }
    // int d() { do { } while (!(next() instanceof String t)); return t.length(); }
    let mut fx = Fixture::new();
    let o = fx.local("o", Type::object());
    let s = fx.binding("s", Type::string());
    let t = fx.binding("t", Type::string());

    let next = fx.make.call("next", Vec::new(), Type::object());
    let init = fx.make.local(o, Some(next));
    let ov = fx.var(o);
    let test = fx.test(ov, s);
    let cond = fx.make.not(test);
    let next = fx.make.call("next", Vec::new(), Type::object());
    let advance = fx.set(o, next);
    let loop_body = fx.make.block(vec![advance]);
    let loop_ = fx.make.while_(cond, loop_body);
    let sv = fx.bound(s);
    let len = fx.length(sv);
    let ret = fx.ret(len);
    let w = fx.make.method("w", Vec::new(), Type::int(), vec![init, loop_, ret]);

    let empty = fx.make.block(Vec::new());
    let next = fx.make.call("next", Vec::new(), Type::object());
    let test = fx.test(next, t);
    let cond = fx.make.not(test);
    let loop_ = fx.make.do_while(empty, cond);
    let tv = fx.bound(t);
    let len = fx.length(tv);
    let ret = fx.ret(len);
    let d = fx.make.method("d", Vec::new(), Type::int(), vec![loop_, ret]);

    let program = fx.finish(vec![w, d]);
    let lowered = lower(&program);

    let stmts = body(&lowered, "w");
    assert_eq!(stmts.len(), 4);
    assert!(matches!(stmts[1].kind, StmtKind::Local { .. }));
    assert!(matches!(stmts[2].kind, StmtKind::While { .. }));
    assert!(matches!(body(&lowered, "d")[1].kind, StmtKind::DoWhile { .. }));

    for method in ["w", "d"] {
        for tree in [&program, &lowered] {
            let mut interp = Interpreter::new(tree);
            let calls = feed(&mut interp, vec![Value::Int(1), Value::Null, Value::string("four")]);
            assert!(matches!(interp.call(method, Vec::new()), Ok(Value::Int(4))));
            assert_eq!(calls.get(), 3);
        }
    }
}

#[test]
fn for_loop_bindings_stay_inside_the_loop() {
    // int m(Object o) {
    //     int total = 0;
    //     for (int k = 0; k < 3 && o instanceof Integer n; k = k + 1) { total = total + n; }
    //     return total;
    // }
    let mut fx = Fixture::new();
    let o = fx.local("o", Type::object());
    let total = fx.local("total", Type::int());
    let k = fx.local("k", Type::int());
    let n = fx.binding("n", Type::class("Integer"));

    let zero = fx.make.int(0);
    let total_decl = fx.make.local(total, Some(zero));
    let zero = fx.make.int(0);
    let k_decl = fx.make.local(k, Some(zero));
    let kv = fx.var(k);
    let three = fx.make.int(3);
    let bounded = fx.make.binary(BinOp::Lt, kv, three);
    let ov = fx.var(o);
    let test = fx.test(ov, n);
    let cond = fx.make.and(bounded, test);
    let kv = fx.var(k);
    let one = fx.make.int(1);
    let inc = fx.make.binary(BinOp::Add, kv, one);
    let target = fx.var(k);
    let step = fx.make.assign(target, inc);
    let tv = fx.var(total);
    let nv = fx.bound(n);
    let sum = fx.make.binary(BinOp::Add, tv, nv);
    let add = fx.set(total, sum);
    let loop_body = fx.make.block(vec![add]);
    let loop_ = fx.make.for_(vec![k_decl], Some(cond), vec![step], loop_body);
    let tv = fx.var(total);
    let ret = fx.ret(tv);
    let m = fx.make.method("m", vec![o], Type::int(), vec![total_decl, loop_, ret]);
    let program = fx.finish(vec![m]);
    let lowered = lower(&program);

    let StmtKind::Block(wrapped) = &body(&lowered, "m")[1].kind else {
        panic!("expected the loop to be wrapped");
    };
    assert!(matches!(wrapped[0].kind, StmtKind::Local { .. }));
    assert!(matches!(wrapped[1].kind, StmtKind::For { .. }));

    for (arg, expected) in [(Value::Int(5), "15"), (Value::string("x"), "0")] {
        assert_eq!(run(&program, "m", vec![arg.clone()]), expected);
        assert_eq!(run(&lowered, "m", vec![arg]), expected);
    }
}

#[test]
fn labeled_loop_keeps_its_label_on_the_loop() {
    // int m(Object o) {
    //     int n = 0;
    //     outer: while (o instanceof String s && n < s.length()) { n = n + 1; continue outer; }
    //     return n;
    // }
    let mut fx = Fixture::new();
    let o = fx.local("o", Type::object());
    let n = fx.local("n", Type::int());
    let s = fx.binding("s", Type::string());

    let zero = fx.make.int(0);
    let n_decl = fx.make.local(n, Some(zero));
    let ov = fx.var(o);
    let test = fx.test(ov, s);
    let nv = fx.var(n);
    let sv = fx.bound(s);
    let len = fx.length(sv);
    let below = fx.make.binary(BinOp::Lt, nv, len);
    let cond = fx.make.and(test, below);
    let nv = fx.var(n);
    let one = fx.make.int(1);
    let inc = fx.make.binary(BinOp::Add, nv, one);
    let bump = fx.set(n, inc);
    let again = fx.make.continue_(Some("outer"));
    let loop_body = fx.make.block(vec![bump, again]);
    let loop_ = fx.make.while_(cond, loop_body);
    let labeled = fx.make.labeled("outer", loop_);
    let nv = fx.var(n);
    let ret = fx.ret(nv);
    let m = fx.make.method("m", vec![o], Type::int(), vec![n_decl, labeled, ret]);
    let program = fx.finish(vec![m]);
    let lowered = lower(&program);

    let StmtKind::Block(wrapped) = &body(&lowered, "m")[1].kind else {
        panic!("expected declarations around the labeled loop");
    };
    let StmtKind::Labeled { body: inner, .. } = &wrapped[1].kind else {
        panic!("expected labeled statement, got {:?}", wrapped[1].kind);
    };
    assert!(matches!(inner.kind, StmtKind::While { .. }));

    for (arg, expected) in [(Value::string("abc"), "3"), (Value::Int(1), "0")] {
        assert_eq!(run(&program, "m", vec![arg.clone()]), expected);
        assert_eq!(run(&lowered, "m", vec![arg]), expected);
    }
}

#[test]
fn break_to_outer_label_keeps_inner_binding_in_scope() {
    // int m(Object o) {
    //     outer: while (true) {
    //         while (!(o instanceof String s)) { break outer; }
    //         return s.length();
    //     }
    //     return -1;
    // }
    let mut fx = Fixture::new();
    let o = fx.local("o", Type::object());
    let s = fx.binding("s", Type::string());

    let ov = fx.var(o);
    let test = fx.test(ov, s);
    let cond = fx.make.not(test);
    let leave = fx.make.break_(Some("outer"));
    let inner_body = fx.make.block(vec![leave]);
    let inner = fx.make.while_(cond, inner_body);
    let sv = fx.bound(s);
    let len = fx.length(sv);
    let ret = fx.ret(len);
    let outer_body = fx.make.block(vec![inner, ret]);
    let forever = fx.make.bool(true);
    let outer = fx.make.while_(forever, outer_body);
    let labeled = fx.make.labeled("outer", outer);
    let miss = fx.ret_int(-1);
    let m = fx.make.method("m", vec![o], Type::int(), vec![labeled, miss]);
    let program = fx.finish(vec![m]);
    let lowered = lower(&program);

    assert_eq!(decls_named(&lowered, "m", "s"), 1);
    let StmtKind::Labeled { body: outer, .. } = &body(&lowered, "m")[0].kind else {
        panic!("expected the labeled loop first");
    };
    let StmtKind::While { body: outer_body, .. } = &outer.kind else {
        panic!("expected while");
    };
    // { String s = null; while (...) ...; return s.length(); }
    let StmtKind::Block(stmts) = &outer_body.kind else {
        panic!("expected block body");
    };
    assert_eq!(stmts.len(), 3);
    assert!(matches!(stmts[0].kind, StmtKind::Local { .. }));
    assert!(matches!(stmts[1].kind, StmtKind::While { .. }));

    for (arg, expected) in [(Value::string("abc"), "3"), (Value::Int(4), "-1")] {
        assert_eq!(run(&program, "m", vec![arg.clone()]), expected);
        assert_eq!(run(&lowered, "m", vec![arg]), expected);
    }
}

#[test]
fn primitive_pattern_matches_nan() {
    // int m(Object o) { if (o instanceof double d) { return 1; } return 0; }
    let double = Type::Primitive(PrimitiveKind::Double);
    let mut fx = Fixture::new();
    let o = fx.local("o", Type::object());
    let d = fx.binding("d", double.clone());
    let ov = fx.var(o);
    let cond = fx.test(ov, d);
    let hit = fx.ret_int(1);
    let then_branch = fx.make.block(vec![hit]);
    let guard = fx.make.if_(cond, then_branch, None);
    let miss = fx.ret_int(0);
    let m = fx.make.method("m", vec![o], Type::int(), vec![guard, miss]);
    let program = fx.finish(vec![m]);
    let lowered = lower(&program);

    // The storage comparison is made on the boxed value.
    let mut compared = Vec::new();
    for stmt in body(&lowered, "m") {
        stmt.walk_exprs(&mut |e| {
            if let ExprKind::Binary { op: BinOp::Eq, left, .. } = &e.kind {
                compared.push(left.kind.clone());
            }
        });
    }
    assert_eq!(compared.len(), 1);
    match &compared[0] {
        ExprKind::Cast { target, expr } => {
            assert_eq!(*target, Type::class("Double"));
            assert!(matches!(expr.kind, ExprKind::Assign { .. }));
        }
        other => panic!("expected boxed assignment, got {:?}", other),
    }

    let cases = [
        (Value::Double(f64::NAN), "1"),
        (Value::Double(2.5), "1"),
        (Value::string("x"), "0"),
    ];
    for (arg, expected) in cases {
        assert_eq!(run(&program, "m", vec![arg.clone()]), expected);
        assert_eq!(run(&lowered, "m", vec![arg]), expected);
    }
}

#[test]
fn null_operand_tests_against_object_temp() {
    // boolean m() { return null instanceof String s; }
    let mut fx = Fixture::new();
    let s = fx.binding("s", Type::string());
    let null = fx.make.null();
    let test = fx.test(null, s);
    let ret = fx.ret(test);
    let m = fx.make.method("m", Vec::new(), Type::boolean(), vec![ret]);
    let program = fx.finish(vec![m]);
    let lowered = lower(&program);

    let StmtKind::Return(Some(value)) = &body(&lowered, "m")[0].kind else {
        panic!("expected return");
    };
    let ExprKind::LetExpr { defs, body: test } = &value.kind else {
        panic!("expected let-expression");
    };
    let temp = lowered.symbols.var(defs[0].var).unwrap();
    assert_eq!(temp.ty, Type::object());
    assert_eq!(temp.name, "s$temp");
    assert!(matches!(test.kind, ExprKind::InstanceOf { .. }));

    assert_eq!(run(&lowered, "m", Vec::new()), "false");
}

#[test]
fn binding_without_default_value_is_fatal() {
    let mut fx = Fixture::new();
    let o = fx.local("o", Type::object());
    let v = fx.binding("v", Type::Void);
    let ov = fx.var(o);
    let cond = fx.test(ov, v);
    let then_branch = fx.make.block(Vec::new());
    let guard = fx.make.if_(cond, then_branch, None);
    let m = fx.make.method("m", vec![o], Type::Void, vec![guard]);
    let program = fx.finish(vec![m]);

    assert_eq!(
        lower_with(&program, &MatchBindingsComputer).map(|_| ()),
        Err(LowerError::NoDefaultValue { ty: Type::Void })
    );
}

#[test]
fn debug_dump_does_not_change_the_result() {
    let program = guard_program();
    let quiet = lower(&program);
    let mut dumped = program.clone();
    preserve_bindings(&mut dumped);
    lower_program(&mut dumped, &MatchBindingsComputer, &LowerConfig::default().with_debug_dump(true)).unwrap();
    assert_eq!(dumped, quiet);
}
