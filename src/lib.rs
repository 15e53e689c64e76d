pub mod ast;
pub mod printer;

pub use ast::{
    Annotations, BaseType, BinOp, Comprehension, ExprKind, Expression, Generator, Item, Model,
    SolveGoal, TypeExpr, UnOp, VarDecl,
};
pub use printer::{
    expression_to_string, item_to_string, precedence, type_expr_to_string, write_model,
    ExpressionMapper, ItemMapper,
};
