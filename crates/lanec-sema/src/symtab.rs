//! The lexical symbol table.
//!
//! A stack of scope frames, each holding three namespaces: variables, type
//! aliases, and function overload sets. The outermost frame is the global
//! frame and stays alive for the whole compilation. Symbols themselves live
//! in an arena owned by the table; everything else holds [`SymbolId`]
//! handles.
//!
//! Failed lookups can ask for near-miss suggestions: in-scope names within
//! Levenshtein distance 2, the tied set at the smallest qualifying distance.
//! Variables and functions share a namespace for suggestion purposes; types
//! are suggested separately.

use rustc_hash::FxHashMap;

use lanec_core::{CompileError, Diagnostics, Span, TypeId, TypeStore};

use crate::symbol::{Symbol, SymbolId};

/// Maximum edit distance for a near-miss suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

#[derive(Debug, Default)]
struct ScopeFrame {
    variables: FxHashMap<String, SymbolId>,
    types: FxHashMap<String, TypeId>,
    functions: FxHashMap<String, Vec<SymbolId>>,
}

/// Scoped bindings for variables, type aliases, and function overload sets.
#[derive(Debug)]
pub struct SymbolTable {
    arena: Vec<Symbol>,
    scopes: Vec<ScopeFrame>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// A table with just the global frame.
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            scopes: vec![ScopeFrame::default()],
        }
    }

    /// Enter a nested scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(ScopeFrame::default());
    }

    /// Leave the current scope, dropping its bindings. The global frame is
    /// never popped during normal compilation.
    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "popped the global scope");
        self.scopes.pop();
    }

    /// Current nesting depth (1 = global frame only).
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The symbol behind a handle.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.arena[id.0 as usize]
    }

    /// Mutable access, used when a declaration's folded initializer is
    /// recorded on the symbol.
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.arena[id.0 as usize]
    }

    fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.arena.len() as u32);
        self.arena.push(symbol);
        id
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    /// Declare a variable in the current scope.
    ///
    /// Redeclaration in the same scope is an error and returns `None`;
    /// shadowing an outer binding is accepted with a warning.
    pub fn add_variable(&mut self, symbol: Symbol, diags: &Diagnostics) -> Option<SymbolId> {
        for (depth, frame) in self.scopes.iter().enumerate().rev() {
            if frame.variables.contains_key(&symbol.name) {
                if depth == self.scopes.len() - 1 {
                    diags.report(&CompileError::Redeclaration {
                        name: symbol.name.clone(),
                        span: symbol.pos,
                    });
                    return None;
                }
                diags.warning(
                    symbol.pos,
                    format!(
                        "Symbol \"{}\" shadows symbol declared in outer scope.",
                        symbol.name
                    ),
                );
                break;
            }
        }
        let name = symbol.name.clone();
        let id = self.alloc(symbol);
        self.scopes
            .last_mut()
            .expect("symbol table always has a global frame")
            .variables
            .insert(name, id);
        Some(id)
    }

    /// Look up a variable, innermost scope first.
    pub fn lookup_variable(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.variables.get(name).copied())
    }

    // ------------------------------------------------------------------
    // Type aliases
    // ------------------------------------------------------------------

    /// Bind a type name in the current scope. Same redeclaration and
    /// shadowing rules as variables.
    pub fn add_type(&mut self, name: &str, ty: TypeId, pos: Span, diags: &Diagnostics) -> bool {
        for (depth, frame) in self.scopes.iter().enumerate().rev() {
            if frame.types.contains_key(name) {
                if depth == self.scopes.len() - 1 {
                    diags.report(&CompileError::TypeRedefinition {
                        name: name.to_string(),
                        span: pos,
                    });
                    return false;
                }
                diags.warning(
                    pos,
                    format!("Type \"{}\" shadows type declared in outer scope.", name),
                );
                break;
            }
        }
        self.scopes
            .last_mut()
            .expect("symbol table always has a global frame")
            .types
            .insert(name.to_string(), ty);
        true
    }

    /// Look up a type name, innermost scope first.
    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.types.get(name).copied())
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    /// Add a function to its name's overload set.
    ///
    /// The set is keyed on (name, signature); adding a function whose
    /// signature is already present is idempotent and returns `None` without
    /// reporting. The caller treats it as a redefinition.
    pub fn add_function(&mut self, symbol: Symbol, types: &TypeStore) -> Option<SymbolId> {
        let signature = types.signature(symbol.ty);
        for existing in self.lookup_function_any(&symbol.name) {
            if types.signature(self.symbol(existing).ty) == signature {
                return None;
            }
        }
        let name = symbol.name.clone();
        let id = self.alloc(symbol);
        self.scopes
            .last_mut()
            .expect("symbol table always has a global frame")
            .functions
            .entry(name)
            .or_default()
            .push(id);
        Some(id)
    }

    /// All overloads visible under `name`, innermost scopes first, each set
    /// in declaration order.
    pub fn lookup_function_any(&self, name: &str) -> Vec<SymbolId> {
        let mut out = Vec::new();
        for frame in self.scopes.iter().rev() {
            if let Some(set) = frame.functions.get(name) {
                out.extend_from_slice(set);
            }
        }
        out
    }

    /// The overload of `name` with exactly the given function type.
    pub fn lookup_function_exact(
        &self,
        name: &str,
        func_ty: TypeId,
        types: &TypeStore,
    ) -> Option<SymbolId> {
        self.lookup_function_any(name)
            .into_iter()
            .find(|&id| types.equal(self.symbol(id).ty, func_ty))
    }

    // ------------------------------------------------------------------
    // Near-miss suggestions
    // ------------------------------------------------------------------

    /// In-scope variable and function names close to `name`: the tied set at
    /// the smallest edit distance within the suggestion bound.
    pub fn closest_variable_or_function(&self, name: &str) -> Vec<String> {
        let mut buckets: [Vec<String>; MAX_SUGGESTION_DISTANCE + 1] = Default::default();
        for frame in &self.scopes {
            for candidate in frame.variables.keys().chain(frame.functions.keys()) {
                if let Some(d) = edit_distance(name, candidate, MAX_SUGGESTION_DISTANCE) {
                    if !buckets[d].contains(candidate) {
                        buckets[d].push(candidate.clone());
                    }
                }
            }
        }
        first_nonempty(buckets)
    }

    /// In-scope type names close to `name`.
    pub fn closest_type(&self, name: &str) -> Vec<String> {
        let mut buckets: [Vec<String>; MAX_SUGGESTION_DISTANCE + 1] = Default::default();
        for frame in &self.scopes {
            for candidate in frame.types.keys() {
                if let Some(d) = edit_distance(name, candidate, MAX_SUGGESTION_DISTANCE) {
                    if !buckets[d].contains(candidate) {
                        buckets[d].push(candidate.clone());
                    }
                }
            }
        }
        first_nonempty(buckets)
    }
}

fn first_nonempty(buckets: [Vec<String>; MAX_SUGGESTION_DISTANCE + 1]) -> Vec<String> {
    let mut result: Vec<String> = buckets.into_iter().find(|b| !b.is_empty()).unwrap_or_default();
    result.sort_unstable();
    result
}

/// Render near-miss candidates as a diagnostic suffix, or an empty string.
pub fn suggestion_text(matches: &[String]) -> String {
    if matches.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = matches.iter().map(|m| format!("\"{}\"", m)).collect();
    format!(" Did you mean {}?", quoted.join(", or "))
}

/// Bounded Levenshtein distance: `Some(d)` when `d <= max`, else `None`.
pub fn edit_distance(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        let mut row_min = cur[0];
        for (j, &cb) in b.iter().enumerate() {
            let subst = prev[j] + usize::from(ca != cb);
            cur[j + 1] = subst.min(prev[j + 1] + 1).min(cur[j] + 1);
            row_min = row_min.min(cur[j + 1]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    (prev[b.len()] <= max).then_some(prev[b.len()])
}
