use std::fmt;

/// An ordered chain of annotation expressions, attached to an expression or
/// item and rendered as repeated ` :: <expr>` in stored order.
#[derive(Debug, Clone, Default)]
pub struct Annotations(pub Vec<Expression>);

impl Annotations {
    pub fn none() -> Self {
        Annotations(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Binary operators, ordered loosest-binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Equiv,
    Imply,
    RImply,
    Or,
    Xor,
    And,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    In,
    Subset,
    Superset,
    Union,
    Diff,
    SymDiff,
    DotDot,
    Plus,
    Minus,
    Mult,
    IntDiv,
    Mod,
    Div,
    Intersect,
    Concat,
}

impl BinOp {
    /// Binding strength; a higher value binds more loosely.
    pub fn precedence(&self) -> u32 {
        match self {
            BinOp::Equiv => 1200,
            BinOp::Imply | BinOp::RImply => 1100,
            BinOp::Or | BinOp::Xor => 1000,
            BinOp::And => 900,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => 800,
            BinOp::In | BinOp::Subset | BinOp::Superset => 700,
            BinOp::Union | BinOp::Diff | BinOp::SymDiff => 600,
            BinOp::DotDot => 500,
            BinOp::Plus | BinOp::Minus => 400,
            BinOp::Mult | BinOp::IntDiv | BinOp::Mod | BinOp::Div | BinOp::Intersect => 300,
            BinOp::Concat => 200,
        }
    }

    /// Surface token, including surrounding spaces for word-like operators.
    pub fn token(&self) -> &'static str {
        match self {
            BinOp::Plus => "+",
            BinOp::Minus => "-",
            BinOp::Mult => "*",
            BinOp::Div => "/",
            BinOp::IntDiv => " div ",
            BinOp::Mod => " mod ",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::In => " in ",
            BinOp::Subset => " subset ",
            BinOp::Superset => " superset ",
            BinOp::Union => " union ",
            BinOp::Diff => " diff ",
            BinOp::SymDiff => " symdiff ",
            BinOp::Intersect => " intersect ",
            BinOp::Concat => "++",
            BinOp::Equiv => " <-> ",
            BinOp::Imply => " -> ",
            BinOp::RImply => " <- ",
            BinOp::Or => " \\/ ",
            BinOp::And => " /\\ ",
            BinOp::Xor => " xor ",
            BinOp::DotDot => "..",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Plus,
    Minus,
}

impl UnOp {
    pub fn token(&self) -> &'static str {
        match self {
            UnOp::Not => "not ",
            UnOp::Plus => "+",
            UnOp::Minus => "-",
        }
    }
}

/// Base of a type-instance expression. Int and Float may carry a
/// domain-restricting expression (e.g. `1..10`), in which case the domain is
/// printed instead of the bare keyword.
#[derive(Debug, Clone)]
pub enum BaseType {
    Int(Option<Box<Expression>>),
    Float(Option<Box<Expression>>),
    Bool,
    String,
    Ann,
}

/// A type-instance expression: `array[<ranges>] of var set of <base>`.
/// The type is an array type iff `ranges` is non-empty.
#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub ranges: Vec<BaseType>,
    pub var: bool,
    pub set: bool,
    pub base: BaseType,
}

impl TypeExpr {
    pub fn new(base: BaseType) -> Self {
        Self {
            ranges: Vec::new(),
            var: false,
            set: false,
            base,
        }
    }

    pub fn is_array(&self) -> bool {
        !self.ranges.is_empty()
    }

    /// A plain `ann` type, used to pick the `annotation` lead token for
    /// body-less function items.
    pub fn is_ann(&self) -> bool {
        matches!(self.base, BaseType::Ann) && !self.is_array() && !self.var && !self.set
    }
}

/// A variable declaration, `<type>: <id>` with an optional initializer.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: TypeExpr,
    pub id: String,
    pub init: Option<Box<Expression>>,
}

/// A `<names> in <source>` clause of a comprehension.
#[derive(Debug, Clone)]
pub struct Generator {
    pub names: Vec<String>,
    pub source: Expression,
}

/// A set (`{..}`) or array (`[..]`) comprehension.
#[derive(Debug, Clone)]
pub struct Comprehension {
    pub set: bool,
    pub body: Box<Expression>,
    pub generators: Vec<Generator>,
    pub filter: Option<Box<Expression>>,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    SetLit(Vec<Expression>),
    BoolLit(bool),
    StringLit(String),
    Id(String),
    AnonVar,
    ArrayLit(Vec<Expression>),
    ArrayAccess {
        array: Box<Expression>,
        indices: Vec<Expression>,
    },
    Comprehension(Comprehension),
    IfThenElse {
        /// `(condition, then-branch)` pairs; the first renders as `if`, the
        /// rest as `elseif`. Must be non-empty.
        branches: Vec<(Expression, Expression)>,
        else_branch: Box<Expression>,
    },
    BinOp {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    UnOp {
        op: UnOp,
        operand: Box<Expression>,
    },
    Call {
        id: String,
        args: Vec<Expression>,
    },
    VarDecl(VarDecl),
    Let {
        /// Local items; non-VarDecl entries print with a `constraint ` prefix.
        items: Vec<Expression>,
        body: Box<Expression>,
    },
    TypeExpr(TypeExpr),
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExprKind,
    pub annotations: Annotations,
}

impl Expression {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            annotations: Annotations::none(),
        }
    }

    pub fn with_annotations(kind: ExprKind, annotations: Annotations) -> Self {
        Self { kind, annotations }
    }

    pub fn is_var_decl(&self) -> bool {
        matches!(self.kind, ExprKind::VarDecl(_))
    }
}

impl From<ExprKind> for Expression {
    fn from(kind: ExprKind) -> Self {
        Expression::new(kind)
    }
}

/// The solve goal of a model. Minimize and Maximize carry their objective, so
/// a goal without one is unrepresentable.
#[derive(Debug, Clone)]
pub enum SolveGoal {
    Satisfy,
    Minimize(Expression),
    Maximize(Expression),
}

#[derive(Debug, Clone)]
pub enum Item {
    Include(String),
    /// A top-level variable declaration; the expression is VarDecl-kind.
    VarDecl(Expression),
    Assign {
        id: String,
        expr: Expression,
    },
    Constraint(Expression),
    Solve {
        annotations: Annotations,
        goal: SolveGoal,
    },
    Output(Expression),
    Predicate {
        test: bool,
        id: String,
        /// VarDecl-kind expressions.
        params: Vec<Expression>,
        annotations: Annotations,
        body: Option<Expression>,
    },
    Function {
        ty: TypeExpr,
        id: String,
        /// VarDecl-kind expressions.
        params: Vec<Expression>,
        annotations: Annotations,
        body: Option<Expression>,
    },
}

/// A Zinc model: an ordered sequence of top-level items. Item order is
/// authoritative and preserved on output.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub items: Vec<Item>,
}

impl Model {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", crate::printer::expression_to_string(self))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", crate::printer::type_expr_to_string(self))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", crate::printer::item_to_string(self))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}
