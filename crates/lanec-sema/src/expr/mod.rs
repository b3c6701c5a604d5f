//! The expression AST and its semantic passes.
//!
//! Expressions are a closed variant ([`ExprKind`]) with a source position on
//! every node. Nodes are immutable once built: the two passes,
//! [`Expr::type_check`] and [`Expr::optimize`], consume their input and
//! return a (possibly substituted) replacement, or `None` after reporting a
//! diagnostic. Callers propagate `None` without reporting again.
//!
//! Each node kind's rules live in a submodule; this module holds the data
//! model, the per-node dispatch, and the handful of helpers shared between
//! kinds.

pub(crate) mod assign;
pub(crate) mod binary;
pub(crate) mod call;
pub(crate) mod cast;
pub(crate) mod index;
pub(crate) mod literals;
pub(crate) mod member;
pub(crate) mod refs;
pub(crate) mod select;
pub(crate) mod unary;

use lanec_core::{BasicType, Span, TypeId, Variability};

use crate::ctx::SemaContext;
use crate::symbol::SymbolId;
use crate::value::ConstValue;

/// Cost estimates consumed by the code emitter's heuristics.
pub(crate) mod cost {
    pub const SIMPLE_ARITH_LOGIC_OP: i32 = 1;
    pub const COMPLEX_ARITH_OP: i32 = 4;
    pub const ASSIGN: i32 = 1;
    pub const LOAD: i32 = 2;
    pub const DEREF: i32 = 2;
    pub const GATHER: i32 = 8;
    pub const SELECT: i32 = 4;
    pub const FUNCALL: i32 = 4;
    pub const FUNPTR_UNIFORM: i32 = 12;
    pub const FUNPTR_VARYING: i32 = 24;
    pub const TASK_LAUNCH: i32 = 32;
    pub const SYNC: i32 = 32;
    pub const TYPECAST_SIMPLE: i32 = 1;
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    Negate,
    LogicalNot,
    BitNot,
}

/// Binary operators, including the comma operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Equal,
    NotEqual,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
    Comma,
}

impl BinaryOp {
    /// Source token, used in diagnostics.
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Comma => ",",
        }
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    MulAssign,
    DivAssign,
    ModAssign,
    AddAssign,
    SubAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    XorAssign,
    OrAssign,
}

impl AssignOp {
    /// Source token, used in diagnostics.
    pub fn token(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::ShlAssign => "<<=",
            AssignOp::ShrAssign => ">>=",
            AssignOp::AndAssign => "&=",
            AssignOp::XorAssign => "^=",
            AssignOp::OrAssign => "|=",
        }
    }
}

/// An expression: a kind plus its source position.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Span,
}

/// The closed set of expression forms.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// A compile-time constant. The type records variability and const-ness;
    /// the value holds one lane per instance.
    Constant { value: ConstValue, ty: TypeId },

    /// Reference to a variable or enumerator symbol.
    Symbol(SymbolId),

    /// Reference to a function name with its overload set. `matching` is
    /// bound by overload resolution (immediately, when the set has exactly
    /// one member).
    FunctionSymbol {
        name: String,
        candidates: Vec<SymbolId>,
        matching: Option<SymbolId>,
        tried_to_resolve: bool,
    },

    /// The null pointer literal, of type `void *`.
    NullPointer,

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Assign {
        op: AssignOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Ternary select `test ? if_true : if_false`.
    Select {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },

    /// Call, optionally a `launch[count]` of a task function.
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        launch_count: Option<Box<Expr>>,
    },

    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },

    /// Member access `base.member` or `base->member`.
    Member {
        base: Box<Expr>,
        member: String,
        member_pos: Span,
        arrow: bool,
    },

    AddressOf {
        operand: Box<Expr>,
    },

    Deref {
        operand: Box<Expr>,
    },

    /// Reference-of, inserted by the checker when a value flows into a
    /// reference-typed slot.
    Reference {
        operand: Box<Expr>,
    },

    /// A cast to `to`, written by the parser or inserted by conversions.
    Cast {
        to: TypeId,
        operand: Box<Expr>,
        preserve_uniformity: bool,
    },

    SizeOfExpr {
        operand: Box<Expr>,
    },

    SizeOfType {
        ty: TypeId,
    },

    /// Cross-lane synchronization point; type `void`.
    Sync,

    /// Brace-enclosed initializer list.
    List {
        exprs: Vec<Expr>,
    },
}

impl Expr {
    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    pub fn constant(value: ConstValue, ty: TypeId, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Constant { value, ty },
            pos,
        }
    }

    pub fn symbol(id: SymbolId, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Symbol(id),
            pos,
        }
    }

    /// A function name with its overload set. A single candidate binds
    /// immediately.
    pub fn function_symbol(name: impl Into<String>, candidates: Vec<SymbolId>, pos: Span) -> Expr {
        let matching = if candidates.len() == 1 {
            Some(candidates[0])
        } else {
            None
        };
        Expr {
            kind: ExprKind::FunctionSymbol {
                name: name.into(),
                candidates,
                matching,
                tried_to_resolve: false,
            },
            pos,
        }
    }

    pub fn null_pointer(pos: Span) -> Expr {
        Expr {
            kind: ExprKind::NullPointer,
            pos,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            pos,
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            pos,
        }
    }

    pub fn assign(op: AssignOp, lhs: Expr, rhs: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Assign {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            pos,
        }
    }

    pub fn select(test: Expr, if_true: Expr, if_false: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Select {
                test: Box::new(test),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
            pos,
        }
    }

    pub fn call(func: Expr, args: Vec<Expr>, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Call {
                func: Box::new(func),
                args,
                launch_count: None,
            },
            pos,
        }
    }

    /// A `launch[count] func(args)` expression.
    pub fn launch(func: Expr, args: Vec<Expr>, count: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Call {
                func: Box::new(func),
                args,
                launch_count: Some(Box::new(count)),
            },
            pos,
        }
    }

    pub fn index(base: Expr, index: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Index {
                base: Box::new(base),
                index: Box::new(index),
            },
            pos,
        }
    }

    pub fn member(base: Expr, member: impl Into<String>, member_pos: Span, arrow: bool, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Member {
                base: Box::new(base),
                member: member.into(),
                member_pos,
                arrow,
            },
            pos,
        }
    }

    pub fn address_of(operand: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::AddressOf {
                operand: Box::new(operand),
            },
            pos,
        }
    }

    pub fn deref(operand: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Deref {
                operand: Box::new(operand),
            },
            pos,
        }
    }

    pub fn reference_to(operand: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Reference {
                operand: Box::new(operand),
            },
            pos,
        }
    }

    pub fn cast(to: TypeId, operand: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Cast {
                to,
                operand: Box::new(operand),
                preserve_uniformity: false,
            },
            pos,
        }
    }

    /// A cast that keeps a uniform operand uniform even when the written
    /// destination type is varying.
    pub fn cast_preserving_uniformity(to: TypeId, operand: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Cast {
                to,
                operand: Box::new(operand),
                preserve_uniformity: true,
            },
            pos,
        }
    }

    pub fn sizeof_expr(operand: Expr, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::SizeOfExpr {
                operand: Box::new(operand),
            },
            pos,
        }
    }

    pub fn sizeof_type(ty: TypeId, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::SizeOfType { ty },
            pos,
        }
    }

    pub fn sync(pos: Span) -> Expr {
        Expr {
            kind: ExprKind::Sync,
            pos,
        }
    }

    pub fn list(exprs: Vec<Expr>, pos: Span) -> Expr {
        Expr {
            kind: ExprKind::List { exprs },
            pos,
        }
    }

    // ------------------------------------------------------------------
    // Common node contract
    // ------------------------------------------------------------------

    /// The semantic type of this expression's value, or `None` if an earlier
    /// error left a subtree untyped.
    pub fn type_of(&self, cx: &SemaContext<'_>) -> Option<TypeId> {
        match &self.kind {
            ExprKind::Constant { ty, .. } => Some(*ty),
            ExprKind::Symbol(id) => Some(cx.symtab.symbol(*id).ty),
            ExprKind::FunctionSymbol {
                name,
                matching,
                tried_to_resolve,
                ..
            } => {
                if !tried_to_resolve && matching.is_none() {
                    cx.diags.error(
                        self.pos,
                        format!("Ambiguous use of overloaded function \"{}\".", name),
                    );
                    return None;
                }
                matching.map(|id| {
                    let fty = cx.symtab.symbol(id).ty;
                    cx.types
                        .as_const(cx.types.pointer(fty, Variability::Uniform))
                })
            }
            ExprKind::NullPointer => Some(cx.types.void_pointer()),
            ExprKind::Unary { op, operand } => unary::type_of(*op, operand, cx),
            ExprKind::Binary { op, lhs, rhs } => binary::type_of(*op, lhs, rhs, self.pos, cx),
            ExprKind::Assign { lhs, .. } => lhs.type_of(cx),
            ExprKind::Select {
                test,
                if_true,
                if_false,
            } => select::type_of(test, if_true, if_false, cx),
            ExprKind::Call { func, .. } => call::type_of(func, cx),
            ExprKind::Index { base, index } => index::type_of(base, index, cx),
            ExprKind::Member {
                base,
                member,
                arrow,
                ..
            } => member::type_of(base, member, *arrow, cx),
            ExprKind::AddressOf { operand } => refs::address_of_type(operand, cx),
            ExprKind::Deref { operand } => refs::deref_type(operand, cx),
            ExprKind::Reference { operand } => {
                Some(cx.types.reference(operand.type_of(cx)?))
            }
            ExprKind::Cast { to, .. } => Some(*to),
            ExprKind::SizeOfExpr { .. } | ExprKind::SizeOfType { .. } => Some(cx.size_type()),
            ExprKind::Sync => Some(cx.types.void()),
            ExprKind::List { .. } => None,
        }
    }

    /// If this expression designates storage, the pointer-to-target type of
    /// that storage.
    pub fn lvalue_type(&self, cx: &SemaContext<'_>) -> Option<TypeId> {
        match &self.kind {
            ExprKind::Symbol(id) => Some(
                cx.types
                    .pointer(cx.symtab.symbol(*id).ty, Variability::Uniform),
            ),
            ExprKind::Index { base, index } => index::lvalue_type(base, index, cx),
            ExprKind::Member {
                base,
                member,
                arrow,
                ..
            } => member::lvalue_type(base, member, *arrow, cx),
            ExprKind::Deref { operand } => operand.type_of(cx),
            ExprKind::Reference { operand } => Some(
                cx.types
                    .pointer(operand.type_of(cx)?, Variability::Uniform),
            ),
            _ => None,
        }
    }

    /// The root variable this expression ultimately refers to, used for mask
    /// selection when storing.
    pub fn base_symbol(&self) -> Option<SymbolId> {
        match &self.kind {
            ExprKind::Symbol(id) => Some(*id),
            ExprKind::FunctionSymbol { matching, .. } => *matching,
            ExprKind::Index { base, .. } => base.base_symbol(),
            ExprKind::Member { base, .. } => base.base_symbol(),
            ExprKind::AddressOf { operand }
            | ExprKind::Deref { operand }
            | ExprKind::Reference { operand }
            | ExprKind::Cast { operand, .. } => operand.base_symbol(),
            _ => None,
        }
    }

    /// Type-check this expression bottom-up, binding overloads and inserting
    /// implicit conversions. Returns the checked (possibly substituted) tree,
    /// or `None` after reporting.
    pub fn type_check(self, cx: &SemaContext<'_>) -> Option<Expr> {
        let Expr { kind, pos } = self;
        match kind {
            ExprKind::Constant { .. }
            | ExprKind::Symbol(_)
            | ExprKind::FunctionSymbol { .. }
            | ExprKind::NullPointer
            | ExprKind::SizeOfType { .. }
            | ExprKind::Sync => Some(Expr { kind, pos }),
            ExprKind::Unary { op, operand } => unary::type_check(op, *operand, pos, cx),
            ExprKind::Binary { op, lhs, rhs } => binary::type_check(op, *lhs, *rhs, pos, cx),
            ExprKind::Assign { op, lhs, rhs } => assign::type_check(op, *lhs, *rhs, pos, cx),
            ExprKind::Select {
                test,
                if_true,
                if_false,
            } => select::type_check(*test, *if_true, *if_false, pos, cx),
            ExprKind::Call {
                func,
                args,
                launch_count,
            } => call::type_check(*func, args, launch_count.map(|c| *c), pos, cx),
            ExprKind::Index { base, index } => index::type_check(*base, *index, pos, cx),
            ExprKind::Member {
                base,
                member,
                member_pos,
                arrow,
            } => member::type_check(*base, member, member_pos, arrow, pos, cx),
            ExprKind::AddressOf { operand } => {
                let operand = operand.type_check(cx)?;
                Some(Expr::address_of(operand, pos))
            }
            ExprKind::Deref { operand } => refs::deref_type_check(*operand, pos, cx),
            ExprKind::Reference { operand } => {
                let operand = operand.type_check(cx)?;
                Some(Expr::reference_to(operand, pos))
            }
            ExprKind::Cast {
                to,
                operand,
                preserve_uniformity,
            } => cast::type_check(to, *operand, preserve_uniformity, pos, cx),
            ExprKind::SizeOfExpr { operand } => {
                let operand = operand.type_check(cx)?;
                Some(Expr::sizeof_expr(operand, pos))
            }
            ExprKind::List { exprs } => literals::type_check_list(exprs, pos, cx),
        }
    }

    /// Constant-fold and rewrite this (already checked) expression bottom-up.
    /// Folding preserves the expression's type, including variability.
    pub fn optimize(self, cx: &SemaContext<'_>) -> Option<Expr> {
        let Expr { kind, pos } = self;
        match kind {
            // A symbol whose declaration folded to a compile-time constant
            // participates in further folding as that constant.
            ExprKind::Symbol(id) => {
                let sym = cx.symtab.symbol(id);
                match &sym.const_value {
                    Some(value) => Some(Expr::constant(value.clone(), sym.ty, pos)),
                    None => Some(Expr::symbol(id, pos)),
                }
            }
            ExprKind::Constant { .. }
            | ExprKind::FunctionSymbol { .. }
            | ExprKind::NullPointer
            | ExprKind::SizeOfType { .. }
            | ExprKind::Sync => Some(Expr { kind, pos }),
            ExprKind::Unary { op, operand } => unary::optimize(op, *operand, pos, cx),
            ExprKind::Binary { op, lhs, rhs } => binary::optimize(op, *lhs, *rhs, pos, cx),
            ExprKind::Assign { op, lhs, rhs } => {
                let lhs = lhs.optimize(cx)?;
                let rhs = rhs.optimize(cx)?;
                Some(Expr::assign(op, lhs, rhs, pos))
            }
            ExprKind::Select {
                test,
                if_true,
                if_false,
            } => select::optimize(*test, *if_true, *if_false, pos, cx),
            ExprKind::Call {
                func,
                args,
                launch_count,
            } => {
                let func = func.optimize(cx)?;
                let args = args
                    .into_iter()
                    .map(|a| a.optimize(cx))
                    .collect::<Option<Vec<_>>>()?;
                let launch_count = match launch_count {
                    Some(c) => Some(Box::new(c.optimize(cx)?)),
                    None => None,
                };
                Some(Expr {
                    kind: ExprKind::Call {
                        func: Box::new(func),
                        args,
                        launch_count,
                    },
                    pos,
                })
            }
            ExprKind::Index { base, index } => {
                let base = base.optimize(cx)?;
                let index = index.optimize(cx)?;
                Some(Expr::index(base, index, pos))
            }
            ExprKind::Member {
                base,
                member,
                member_pos,
                arrow,
            } => {
                let base = base.optimize(cx)?;
                Some(Expr::member(base, member, member_pos, arrow, pos))
            }
            ExprKind::AddressOf { operand } => {
                Some(Expr::address_of(operand.optimize(cx)?, pos))
            }
            ExprKind::Deref { operand } => Some(Expr::deref(operand.optimize(cx)?, pos)),
            ExprKind::Reference { operand } => {
                Some(Expr::reference_to(operand.optimize(cx)?, pos))
            }
            ExprKind::Cast {
                to,
                operand,
                preserve_uniformity,
            } => cast::optimize(to, *operand, preserve_uniformity, pos, cx),
            ExprKind::SizeOfExpr { operand } => {
                Some(Expr::sizeof_expr(operand.optimize(cx)?, pos))
            }
            ExprKind::List { exprs } => {
                let exprs = exprs
                    .into_iter()
                    .map(|e| e.optimize(cx))
                    .collect::<Option<Vec<_>>>()?;
                Some(Expr::list(exprs, pos))
            }
        }
    }

    /// Rough instruction-count estimate for the emitter's inlining and
    /// mask-specialization heuristics. Includes subexpressions.
    pub fn estimate_cost(&self, cx: &SemaContext<'_>) -> i32 {
        let children: i32 = self.children().iter().map(|c| c.estimate_cost(cx)).sum();
        children + self.node_cost(cx)
    }

    fn node_cost(&self, cx: &SemaContext<'_>) -> i32 {
        match &self.kind {
            ExprKind::Constant { .. }
            | ExprKind::NullPointer
            | ExprKind::FunctionSymbol { .. }
            | ExprKind::AddressOf { .. }
            | ExprKind::Reference { .. }
            | ExprKind::SizeOfExpr { .. }
            | ExprKind::SizeOfType { .. }
            | ExprKind::List { .. } => 0,
            ExprKind::Symbol(_) => cost::LOAD,
            ExprKind::Unary { .. } => cost::SIMPLE_ARITH_LOGIC_OP,
            ExprKind::Binary { op, .. } => match op {
                BinaryOp::Div | BinaryOp::Mod => cost::COMPLEX_ARITH_OP,
                _ => cost::SIMPLE_ARITH_LOGIC_OP,
            },
            ExprKind::Assign { op, .. } => match op {
                AssignOp::DivAssign | AssignOp::ModAssign => {
                    cost::ASSIGN + cost::COMPLEX_ARITH_OP
                }
                AssignOp::Assign => cost::ASSIGN,
                _ => cost::ASSIGN + cost::SIMPLE_ARITH_LOGIC_OP,
            },
            ExprKind::Select { .. } => cost::SELECT,
            ExprKind::Call {
                func, launch_count, ..
            } => {
                if launch_count.is_some() {
                    cost::TASK_LAUNCH
                } else if matches!(func.kind, ExprKind::FunctionSymbol { .. }) {
                    cost::FUNCALL
                } else {
                    match func.type_of(cx) {
                        Some(t) if cx.types.is_varying(t) => cost::FUNPTR_VARYING,
                        Some(_) => cost::FUNPTR_UNIFORM,
                        None => cost::FUNCALL,
                    }
                }
            }
            ExprKind::Index { base, index } => {
                let gather = index
                    .type_of(cx)
                    .is_some_and(|t| cx.types.is_varying(t))
                    || base
                        .type_of(cx)
                        .is_some_and(|t| cx.types.is_pointer(t) && cx.types.is_varying(t));
                if gather {
                    cost::GATHER
                } else {
                    cost::LOAD
                }
            }
            ExprKind::Member { .. } => cost::SIMPLE_ARITH_LOGIC_OP,
            ExprKind::Deref { operand } => {
                match operand.type_of(cx) {
                    Some(t) if cx.types.is_pointer(t) && cx.types.is_varying(t) => {
                        cost::GATHER + cost::DEREF
                    }
                    _ => cost::DEREF,
                }
            }
            ExprKind::Cast { .. } => cost::TYPECAST_SIMPLE,
            ExprKind::Sync => cost::SYNC,
        }
    }

    fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Constant { .. }
            | ExprKind::Symbol(_)
            | ExprKind::FunctionSymbol { .. }
            | ExprKind::NullPointer
            | ExprKind::SizeOfType { .. }
            | ExprKind::Sync => Vec::new(),
            ExprKind::Unary { operand, .. }
            | ExprKind::AddressOf { operand }
            | ExprKind::Deref { operand }
            | ExprKind::Reference { operand }
            | ExprKind::Cast { operand, .. }
            | ExprKind::SizeOfExpr { operand } => vec![operand],
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs, .. } => {
                vec![lhs, rhs]
            }
            ExprKind::Select {
                test,
                if_true,
                if_false,
            } => vec![test, if_true, if_false],
            ExprKind::Call {
                func,
                args,
                launch_count,
            } => {
                let mut out: Vec<&Expr> = vec![func];
                out.extend(args.iter());
                if let Some(c) = launch_count {
                    out.push(c);
                }
                out
            }
            ExprKind::Index { base, index } => vec![base, index],
            ExprKind::Member { base, .. } => vec![base],
            ExprKind::List { exprs } => exprs.iter().collect(),
        }
    }

    /// The constant value and type, if this is a literal node.
    pub fn constant_parts(&self) -> Option<(&ConstValue, TypeId)> {
        match &self.kind {
            ExprKind::Constant { value, ty } => Some((value, *ty)),
            _ => None,
        }
    }

    /// Whether this is an integer constant with every lane zero, i.e. a
    /// candidate for implicit conversion to a null pointer.
    pub fn is_all_int_zeros(&self, cx: &SemaContext<'_>) -> bool {
        match self.constant_parts() {
            Some((value, ty)) => cx.types.is_int(ty) && value.is_all_int_zero(),
            None => false,
        }
    }
}

/// Rewrite an array-typed expression as the address of its first element.
///
/// Inserted wherever an array decays to a pointer.
pub(crate) fn array_to_pointer(expr: Expr, cx: &SemaContext<'_>) -> Option<Expr> {
    let pos = expr.pos;
    let zero = Expr::constant(
        ConstValue::Int32(vec![0]),
        cx.types.as_const(cx.types.uniform(BasicType::Int32)),
        pos,
    );
    let indexed = Expr::index(expr, zero, pos);
    let addr = Expr::address_of(indexed, pos);
    addr.type_check(cx)?.optimize(cx)
}
