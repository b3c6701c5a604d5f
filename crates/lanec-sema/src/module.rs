//! The compilation module: owns the type store, symbol table, and
//! diagnostics for one compilation unit, and drives the semantic passes.

use rustc_hash::FxHashMap;

use lanec_core::{Diagnostics, OptFlags, Span, TargetInfo, TypeId, TypeStore};

use crate::ctx::SemaContext;
use crate::expr::Expr;
use crate::overload;
use crate::symbol::{StorageClass, Symbol, SymbolId};
use crate::symtab::SymbolTable;

/// Per-function information that doesn't belong in the interned signature.
#[derive(Debug, Default)]
pub struct FunctionInfo {
    /// Default argument expressions, parallel to the parameter list.
    pub defaults: Vec<Option<Expr>>,
}

/// One compilation unit's semantic state.
#[derive(Debug, Default)]
pub struct Module {
    pub types: TypeStore,
    pub symtab: SymbolTable,
    pub target: TargetInfo,
    pub opt: OptFlags,
    pub diags: Diagnostics,
    functions: FxHashMap<SymbolId, FunctionInfo>,
}

impl Module {
    pub fn new(target: TargetInfo, opt: OptFlags) -> Self {
        Self {
            types: TypeStore::new(),
            symtab: SymbolTable::new(),
            target,
            opt,
            diags: Diagnostics::new(),
            functions: FxHashMap::default(),
        }
    }

    /// The read-only context handed to the semantic passes.
    pub fn context(&self) -> SemaContext<'_> {
        SemaContext {
            types: &self.types,
            symtab: &self.symtab,
            target: &self.target,
            opt: &self.opt,
            diags: &self.diags,
        }
    }

    /// Register a function, adding it to its name's overload set.
    ///
    /// Parameter types are canonicalized first: top-level const on a
    /// non-reference parameter is erased for signature matching (the
    /// declaration keeps it for the body). Default argument expressions must
    /// be contiguous and trailing. Returns `None` when the same signature is
    /// already registered; the caller treats that as a redefinition.
    pub fn add_function(
        &mut self,
        name: &str,
        func_ty: TypeId,
        defaults: Vec<Option<Expr>>,
        pos: Span,
    ) -> Option<SymbolId> {
        let Some((ret, params, _, is_task)) = self.types.function_signature(func_ty) else {
            self.diags
                .fatal(format!("add_function called with non-function type for \"{}\"", name));
            return None;
        };
        if defaults.len() != params.len() {
            self.diags.fatal(format!(
                "default argument list for \"{}\" doesn't match its parameter count",
                name
            ));
            return None;
        }

        let mut seen_default = false;
        for default in &defaults {
            if default.is_some() {
                seen_default = true;
            } else if seen_default {
                self.diags.error(
                    pos,
                    format!(
                        "Parameters with default values in function \"{}\" must be at the end of the parameter list.",
                        name
                    ),
                );
                return None;
            }
        }

        let canonical_params: Vec<TypeId> = params
            .iter()
            .map(|&p| {
                if self.types.is_reference(p) {
                    p
                } else {
                    self.types.as_mutable(p)
                }
            })
            .collect();
        let has_default: Vec<bool> = defaults.iter().map(Option::is_some).collect();
        let canonical_ty = self
            .types
            .function(ret, canonical_params, has_default, is_task);

        let symbol = Symbol::new(name, pos, canonical_ty, StorageClass::Extern);
        let id = self.symtab.add_function(symbol, &self.types)?;
        self.functions.insert(id, FunctionInfo { defaults });
        Some(id)
    }

    /// Default argument expressions for a registered function.
    pub fn function_defaults(&self, id: SymbolId) -> Option<&[Option<Expr>]> {
        self.functions.get(&id).map(|info| info.defaults.as_slice())
    }

    /// Declare a variable in the current scope.
    pub fn add_variable(
        &mut self,
        name: &str,
        ty: TypeId,
        storage: StorageClass,
        pos: Span,
    ) -> Option<SymbolId> {
        self.symtab
            .add_variable(Symbol::new(name, pos, ty, storage), &self.diags)
    }

    /// Run both semantic passes over an expression: type checking (which
    /// binds overloads and inserts conversions), then optimization (constant
    /// folding and fast-math rewrites). `None` means a diagnostic has been
    /// reported.
    pub fn check_and_optimize(&self, expr: Expr) -> Option<Expr> {
        let cx = self.context();
        expr.type_check(&cx)?.optimize(&cx)
    }

    /// Bind the best overload into a `FunctionSymbol` expression against the
    /// given argument types. `null_flags[i]` marks arguments that are
    /// compile-time zero integers. Returns whether a unique overload was
    /// bound; failures have been reported.
    pub fn resolve_overload(
        &self,
        func: &mut Expr,
        arg_types: &[TypeId],
        null_flags: Option<&[bool]>,
    ) -> bool {
        let cx = self.context();
        let pos = func.pos;
        overload::resolve_overload(&cx, func, pos, arg_types, null_flags)
    }
}
