use std::io;

use itertools::Itertools;

use crate::ast::{
    Annotations, BaseType, BinOp, Comprehension, ExprKind, Expression, Item, Model, SolveGoal,
    TypeExpr, UnOp, VarDecl,
};

/// Binding strength of an expression: the operator's strength for a binary
/// operation, 0 for everything else. Higher binds more loosely.
pub fn precedence(e: &Expression) -> u32 {
    match &e.kind {
        ExprKind::BinOp { op, .. } => op.precedence(),
        _ => 0,
    }
}

struct Parens {
    left: bool,
    right: bool,
}

/// Decides, per operand side, whether a child needs wrapping parentheses.
///
/// A left child needs parens when it binds more loosely than the operator, or
/// at equal precedence for `++` (concatenation does not flatten on its left).
/// A right child needs parens when it binds more loosely, or at equal
/// precedence for every operator except `++`, which chains to the right.
fn need_parens(op: BinOp, left: &Expression, right: &Expression) -> Parens {
    let p = op.precedence();
    let pl = precedence(left);
    let pr = precedence(right);
    Parens {
        left: p < pl || (p == pl && p == 200),
        right: p < pr || (p == pr && p != 200),
    }
}

/// One interpretation of expression nodes, producing a value per node kind.
/// `map` dispatches exhaustively on the node tag; implementors only supply
/// the per-kind methods. The text renderer below is one implementation;
/// size or hash producers would be others.
pub trait ExpressionMapper {
    type Output;

    fn map_int_lit(&mut self, v: i64) -> Self::Output;
    fn map_float_lit(&mut self, v: f64) -> Self::Output;
    fn map_set_lit(&mut self, elements: &[Expression]) -> Self::Output;
    fn map_bool_lit(&mut self, v: bool) -> Self::Output;
    fn map_string_lit(&mut self, s: &str) -> Self::Output;
    fn map_id(&mut self, id: &str) -> Self::Output;
    fn map_anon_var(&mut self) -> Self::Output;
    fn map_array_lit(&mut self, elements: &[Expression]) -> Self::Output;
    fn map_array_access(&mut self, array: &Expression, indices: &[Expression]) -> Self::Output;
    fn map_comprehension(&mut self, c: &Comprehension) -> Self::Output;
    fn map_if_then_else(
        &mut self,
        branches: &[(Expression, Expression)],
        else_branch: &Expression,
    ) -> Self::Output;
    fn map_bin_op(&mut self, op: BinOp, left: &Expression, right: &Expression) -> Self::Output;
    fn map_un_op(&mut self, op: UnOp, operand: &Expression) -> Self::Output;
    fn map_call(&mut self, id: &str, args: &[Expression]) -> Self::Output;
    fn map_var_decl(&mut self, decl: &VarDecl) -> Self::Output;
    fn map_let(&mut self, items: &[Expression], body: &Expression) -> Self::Output;
    fn map_annotations(&mut self, annotations: &Annotations) -> Self::Output;
    fn map_type_expr(&mut self, ty: &TypeExpr) -> Self::Output;

    fn map(&mut self, e: &Expression) -> Self::Output {
        match &e.kind {
            ExprKind::IntLit(v) => self.map_int_lit(*v),
            ExprKind::FloatLit(v) => self.map_float_lit(*v),
            ExprKind::SetLit(elements) => self.map_set_lit(elements),
            ExprKind::BoolLit(v) => self.map_bool_lit(*v),
            ExprKind::StringLit(s) => self.map_string_lit(s),
            ExprKind::Id(id) => self.map_id(id),
            ExprKind::AnonVar => self.map_anon_var(),
            ExprKind::ArrayLit(elements) => self.map_array_lit(elements),
            ExprKind::ArrayAccess { array, indices } => self.map_array_access(array, indices),
            ExprKind::Comprehension(c) => self.map_comprehension(c),
            ExprKind::IfThenElse {
                branches,
                else_branch,
            } => self.map_if_then_else(branches, else_branch),
            ExprKind::BinOp { op, left, right } => self.map_bin_op(*op, left, right),
            ExprKind::UnOp { op, operand } => self.map_un_op(*op, operand),
            ExprKind::Call { id, args } => self.map_call(id, args),
            ExprKind::VarDecl(decl) => self.map_var_decl(decl),
            ExprKind::Let { items, body } => self.map_let(items, body),
            ExprKind::TypeExpr(ty) => self.map_type_expr(ty),
        }
    }
}

struct ExpressionPrinter;

fn comma_joined(exprs: &[Expression]) -> String {
    exprs.iter().map(expression_to_string).join(", ")
}

impl ExpressionMapper for ExpressionPrinter {
    type Output = String;

    fn map_int_lit(&mut self, v: i64) -> String {
        v.to_string()
    }

    fn map_float_lit(&mut self, v: f64) -> String {
        v.to_string()
    }

    fn map_set_lit(&mut self, elements: &[Expression]) -> String {
        format!("{{{}}}", comma_joined(elements))
    }

    fn map_bool_lit(&mut self, v: bool) -> String {
        if v { "true" } else { "false" }.to_string()
    }

    fn map_string_lit(&mut self, s: &str) -> String {
        // embedded quotes and backslashes pass through unescaped
        format!("\"{s}\"")
    }

    fn map_id(&mut self, id: &str) -> String {
        id.to_string()
    }

    fn map_anon_var(&mut self) -> String {
        "_".to_string()
    }

    fn map_array_lit(&mut self, elements: &[Expression]) -> String {
        // multi-dimensional arrays render flat
        format!("[{}]", comma_joined(elements))
    }

    fn map_array_access(&mut self, array: &Expression, indices: &[Expression]) -> String {
        format!("{}[{}]", expression_to_string(array), comma_joined(indices))
    }

    fn map_comprehension(&mut self, c: &Comprehension) -> String {
        let generators = c
            .generators
            .iter()
            .map(|g| {
                assert!(!g.names.is_empty(), "comprehension generator binds no names");
                format!("{} in {}", g.names.iter().join(", "), expression_to_string(&g.source))
            })
            .join(", ");
        let mut s = format!(
            "{}{} | {}",
            if c.set { "{" } else { "[" },
            expression_to_string(&c.body),
            generators
        );
        if let Some(filter) = &c.filter {
            s.push_str(" where ");
            s.push_str(&expression_to_string(filter));
        }
        s.push_str(if c.set { "}" } else { "]" });
        s
    }

    fn map_if_then_else(
        &mut self,
        branches: &[(Expression, Expression)],
        else_branch: &Expression,
    ) -> String {
        assert!(!branches.is_empty(), "if-then-else has no branches");
        let mut s = String::new();
        for (i, (cond, then)) in branches.iter().enumerate() {
            s.push_str(if i == 0 { "if " } else { " elseif " });
            s.push_str(&expression_to_string(cond));
            s.push_str(" then ");
            s.push_str(&expression_to_string(then));
        }
        s.push_str(" else ");
        s.push_str(&expression_to_string(else_branch));
        s.push_str(" endif");
        s
    }

    fn map_bin_op(&mut self, op: BinOp, left: &Expression, right: &Expression) -> String {
        let parens = need_parens(op, left, right);
        let mut s = String::new();
        if parens.left {
            s.push('(');
        }
        s.push_str(&expression_to_string(left));
        if parens.left {
            s.push(')');
        }
        s.push_str(op.token());
        if parens.right {
            s.push('(');
        }
        s.push_str(&expression_to_string(right));
        if parens.right {
            s.push(')');
        }
        s
    }

    fn map_un_op(&mut self, op: UnOp, operand: &Expression) -> String {
        // any operator operand is grouped, independent of precedence
        let parens = matches!(
            operand.kind,
            ExprKind::BinOp { .. } | ExprKind::UnOp { .. }
        );
        if parens {
            format!("{}({})", op.token(), expression_to_string(operand))
        } else {
            format!("{}{}", op.token(), expression_to_string(operand))
        }
    }

    fn map_call(&mut self, id: &str, args: &[Expression]) -> String {
        format!("{id}({})", comma_joined(args))
    }

    fn map_var_decl(&mut self, decl: &VarDecl) -> String {
        let mut s = format!("{}: {}", type_expr_to_string(&decl.ty), decl.id);
        if let Some(init) = &decl.init {
            s.push_str(" = ");
            s.push_str(&expression_to_string(init));
        }
        s
    }

    fn map_let(&mut self, items: &[Expression], body: &Expression) -> String {
        let locals = items
            .iter()
            .map(|item| {
                let prefix = if item.is_var_decl() { "" } else { "constraint " };
                format!("{prefix}{}", expression_to_string(item))
            })
            .join("; ");
        format!("let {{{locals}}} in ({})", expression_to_string(body))
    }

    fn map_annotations(&mut self, annotations: &Annotations) -> String {
        annotations
            .0
            .iter()
            .map(|a| format!(" :: {}", expression_to_string(a)))
            .collect()
    }

    fn map_type_expr(&mut self, ty: &TypeExpr) -> String {
        type_expr_to_string(ty)
    }
}

/// Renders an expression, followed by its annotation chain if any.
pub fn expression_to_string(e: &Expression) -> String {
    let mut s = ExpressionPrinter.map(e);
    if !e.annotations.is_empty() {
        s.push_str(&annotations_to_string(&e.annotations));
    }
    s
}

fn annotations_to_string(annotations: &Annotations) -> String {
    ExpressionPrinter.map_annotations(annotations)
}

fn base_type_to_string(base: &BaseType) -> String {
    match base {
        BaseType::Int(Some(domain)) => expression_to_string(domain),
        BaseType::Int(None) => "int".to_string(),
        BaseType::Float(Some(domain)) => expression_to_string(domain),
        BaseType::Float(None) => "float".to_string(),
        BaseType::Bool => "bool".to_string(),
        BaseType::String => "string".to_string(),
        BaseType::Ann => "ann".to_string(),
    }
}

pub fn type_expr_to_string(ty: &TypeExpr) -> String {
    let mut s = String::new();
    if ty.is_array() {
        s.push_str("array[");
        s.push_str(&ty.ranges.iter().map(base_type_to_string).join(", "));
        s.push_str("] of ");
    }
    if ty.var {
        s.push_str("var ");
    }
    if ty.set {
        s.push_str("set of ");
    }
    s.push_str(&base_type_to_string(&ty.base));
    s
}

/// One interpretation of top-level items, mirroring [`ExpressionMapper`].
pub trait ItemMapper {
    type Output;

    fn map_include(&mut self, path: &str) -> Self::Output;
    fn map_var_decl(&mut self, decl: &Expression) -> Self::Output;
    fn map_assign(&mut self, id: &str, expr: &Expression) -> Self::Output;
    fn map_constraint(&mut self, expr: &Expression) -> Self::Output;
    fn map_solve(&mut self, annotations: &Annotations, goal: &SolveGoal) -> Self::Output;
    fn map_output(&mut self, expr: &Expression) -> Self::Output;
    fn map_predicate(
        &mut self,
        test: bool,
        id: &str,
        params: &[Expression],
        annotations: &Annotations,
        body: Option<&Expression>,
    ) -> Self::Output;
    fn map_function(
        &mut self,
        ty: &TypeExpr,
        id: &str,
        params: &[Expression],
        annotations: &Annotations,
        body: Option<&Expression>,
    ) -> Self::Output;

    fn map(&mut self, item: &Item) -> Self::Output {
        match item {
            Item::Include(path) => self.map_include(path),
            Item::VarDecl(decl) => self.map_var_decl(decl),
            Item::Assign { id, expr } => self.map_assign(id, expr),
            Item::Constraint(expr) => self.map_constraint(expr),
            Item::Solve { annotations, goal } => self.map_solve(annotations, goal),
            Item::Output(expr) => self.map_output(expr),
            Item::Predicate {
                test,
                id,
                params,
                annotations,
                body,
            } => self.map_predicate(*test, id, params, annotations, body.as_ref()),
            Item::Function {
                ty,
                id,
                params,
                annotations,
                body,
            } => self.map_function(ty, id, params, annotations, body.as_ref()),
        }
    }
}

struct ItemPrinter;

/// Parameter list, annotations and body shared by predicate and function
/// items. Parameters join with `"; "` and render only when present.
fn decl_tail(params: &[Expression], annotations: &Annotations, body: Option<&Expression>) -> String {
    let mut s = String::new();
    if !params.is_empty() {
        s.push('(');
        s.push_str(&params.iter().map(expression_to_string).join("; "));
        s.push(')');
    }
    if !annotations.is_empty() {
        s.push_str(&annotations_to_string(annotations));
    }
    if let Some(body) = body {
        s.push_str(" = ");
        s.push_str(&expression_to_string(body));
    }
    s.push(';');
    s
}

impl ItemMapper for ItemPrinter {
    type Output = String;

    fn map_include(&mut self, path: &str) -> String {
        format!("include \"{path}\";")
    }

    fn map_var_decl(&mut self, decl: &Expression) -> String {
        format!("{};", expression_to_string(decl))
    }

    fn map_assign(&mut self, id: &str, expr: &Expression) -> String {
        format!("{id} = {};", expression_to_string(expr))
    }

    fn map_constraint(&mut self, expr: &Expression) -> String {
        format!("constraint {};", expression_to_string(expr))
    }

    fn map_solve(&mut self, annotations: &Annotations, goal: &SolveGoal) -> String {
        let mut s = String::from("solve");
        if !annotations.is_empty() {
            s.push_str(&annotations_to_string(annotations));
        }
        match goal {
            SolveGoal::Satisfy => s.push_str(" satisfy"),
            SolveGoal::Minimize(objective) => {
                s.push_str(" minimize ");
                s.push_str(&expression_to_string(objective));
            }
            SolveGoal::Maximize(objective) => {
                s.push_str(" maximize ");
                s.push_str(&expression_to_string(objective));
            }
        }
        s.push(';');
        s
    }

    fn map_output(&mut self, expr: &Expression) -> String {
        format!("output {};", expression_to_string(expr))
    }

    fn map_predicate(
        &mut self,
        test: bool,
        id: &str,
        params: &[Expression],
        annotations: &Annotations,
        body: Option<&Expression>,
    ) -> String {
        let lead = if test { "test " } else { "predicate " };
        format!("{lead}{id}{}", decl_tail(params, annotations, body))
    }

    fn map_function(
        &mut self,
        ty: &TypeExpr,
        id: &str,
        params: &[Expression],
        annotations: &Annotations,
        body: Option<&Expression>,
    ) -> String {
        let lead = if ty.is_ann() && body.is_none() {
            format!("annotation {id}")
        } else {
            format!("function {} : {id}", type_expr_to_string(ty))
        };
        format!("{lead}{}", decl_tail(params, annotations, body))
    }
}

pub fn item_to_string(item: &Item) -> String {
    ItemPrinter.map(item)
}

/// Writes one line per item, in stored order, to the sink.
pub fn write_model<W: io::Write>(model: &Model, sink: &mut W) -> io::Result<()> {
    let mut printer = ItemPrinter;
    for item in &model.items {
        writeln!(sink, "{}", printer.map(item))?;
    }
    Ok(())
}
