//! The interning type store.
//!
//! Every type in a compilation unit lives in one [`TypeStore`]. Interning
//! makes structural equality an id comparison and lets the variability and
//! const morphisms return existing nodes instead of rebuilding deep
//! structures. The store is append-only and uses interior mutability so it
//! can be shared through the read-only semantic context.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{BasicType, StructMember, TypeData, TypeId, Variability};
use crate::diag::Diagnostics;
use crate::span::Span;

/// Arena of interned types, addressed by [`TypeId`].
#[derive(Debug, Default)]
pub struct TypeStore {
    ids: RefCell<FxHashMap<Rc<TypeData>, TypeId>>,
    data: RefCell<Vec<Rc<TypeData>>>,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `data`, returning the existing id when an equal type is
    /// already present.
    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(&id) = self.ids.borrow().get(&data) {
            return id;
        }
        let rc = Rc::new(data);
        let mut list = self.data.borrow_mut();
        let id = TypeId(list.len() as u32);
        list.push(Rc::clone(&rc));
        self.ids.borrow_mut().insert(rc, id);
        id
    }

    /// Structural payload of `id`. Cheap: clones an `Rc`.
    pub fn data(&self, id: TypeId) -> Rc<TypeData> {
        Rc::clone(&self.data.borrow()[id.0 as usize])
    }

    /// Number of distinct types interned so far.
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    /// Non-const atomic type.
    pub fn atomic(&self, basic: BasicType, variability: Variability) -> TypeId {
        self.intern(TypeData::Atomic {
            basic,
            variability,
            is_const: false,
        })
    }

    /// Shorthand for a uniform non-const atomic.
    pub fn uniform(&self, basic: BasicType) -> TypeId {
        self.atomic(basic, Variability::Uniform)
    }

    /// Shorthand for a varying non-const atomic.
    pub fn varying(&self, basic: BasicType) -> TypeId {
        self.atomic(basic, Variability::Varying)
    }

    /// The `void` type.
    pub fn void(&self) -> TypeId {
        self.uniform(BasicType::Void)
    }

    /// Non-const pointer to `pointee`. The variability is the pointer's own.
    pub fn pointer(&self, pointee: TypeId, variability: Variability) -> TypeId {
        self.intern(TypeData::Pointer {
            pointee,
            variability,
            is_const: false,
        })
    }

    /// The type of the null pointer literal: `void *`.
    pub fn void_pointer(&self) -> TypeId {
        self.pointer(self.void(), Variability::Uniform)
    }

    /// Reference to `target`. References never nest; taking a reference to a
    /// reference yields the original reference type.
    pub fn reference(&self, target: TypeId) -> TypeId {
        if self.is_reference(target) {
            return target;
        }
        self.intern(TypeData::Reference { target })
    }

    /// Array of `count` elements; `count == 0` is an incomplete array.
    pub fn array(&self, element: TypeId, count: u32) -> TypeId {
        self.intern(TypeData::Array { element, count })
    }

    /// Short vector of `count` elements.
    pub fn vector(&self, element: TypeId, count: u32) -> TypeId {
        debug_assert!(count >= 1);
        self.intern(TypeData::Vector { element, count })
    }

    /// Uniform, non-const enum type.
    pub fn enum_type(&self, name: &str, enumerators: Vec<(String, u32)>) -> TypeId {
        self.intern(TypeData::Enum {
            name: name.to_string(),
            enumerators,
            variability: Variability::Uniform,
            is_const: false,
        })
    }

    /// Uniform, non-const struct type.
    pub fn struct_type(&self, name: &str, members: Vec<StructMember>) -> TypeId {
        self.intern(TypeData::Struct {
            name: name.to_string(),
            members,
            variability: Variability::Uniform,
            is_const: false,
        })
    }

    /// Function signature type.
    pub fn function(
        &self,
        ret: TypeId,
        params: Vec<TypeId>,
        param_has_default: Vec<bool>,
        is_task: bool,
    ) -> TypeId {
        debug_assert_eq!(params.len(), param_has_default.len());
        self.intern(TypeData::Function {
            ret,
            params,
            param_has_default,
            is_task,
        })
    }

    // ------------------------------------------------------------------
    // Equality
    // ------------------------------------------------------------------

    /// Structural equality, including const and variability.
    #[inline]
    pub fn equal(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    /// Structural equality ignoring const qualifiers at every level.
    pub fn equal_ignoring_const(&self, a: TypeId, b: TypeId) -> bool {
        self.strip_const_deep(a) == self.strip_const_deep(b)
    }

    fn strip_const_deep(&self, id: TypeId) -> TypeId {
        match &*self.data(id) {
            TypeData::Atomic { basic, variability, .. } => self.atomic(*basic, *variability),
            TypeData::Enum {
                name,
                enumerators,
                variability,
                ..
            } => self.intern(TypeData::Enum {
                name: name.clone(),
                enumerators: enumerators.clone(),
                variability: *variability,
                is_const: false,
            }),
            TypeData::Pointer {
                pointee,
                variability,
                ..
            } => self.pointer(self.strip_const_deep(*pointee), *variability),
            TypeData::Reference { target } => self.reference(self.strip_const_deep(*target)),
            TypeData::Array { element, count } => {
                self.array(self.strip_const_deep(*element), *count)
            }
            TypeData::Vector { element, count } => {
                self.vector(self.strip_const_deep(*element), *count)
            }
            TypeData::Struct {
                name,
                members,
                variability,
                ..
            } => self.intern(TypeData::Struct {
                name: name.clone(),
                members: members.clone(),
                variability: *variability,
                is_const: false,
            }),
            TypeData::Function { .. } => id,
        }
    }

    // ------------------------------------------------------------------
    // Variability and const morphisms
    // ------------------------------------------------------------------

    /// The uniform rendition of `id`. Total: recurses into composite shapes.
    pub fn as_uniform(&self, id: TypeId) -> TypeId {
        self.with_variability(id, Variability::Uniform)
    }

    /// The varying rendition of `id`. A varying array has varying elements; a
    /// varying struct has varying members; pointer variability is the
    /// pointer's own.
    pub fn as_varying(&self, id: TypeId) -> TypeId {
        self.with_variability(id, Variability::Varying)
    }

    fn with_variability(&self, id: TypeId, v: Variability) -> TypeId {
        match &*self.data(id) {
            TypeData::Atomic { basic, is_const, .. } => self.intern(TypeData::Atomic {
                basic: *basic,
                variability: v,
                is_const: *is_const,
            }),
            TypeData::Enum {
                name,
                enumerators,
                is_const,
                ..
            } => self.intern(TypeData::Enum {
                name: name.clone(),
                enumerators: enumerators.clone(),
                variability: v,
                is_const: *is_const,
            }),
            TypeData::Pointer {
                pointee, is_const, ..
            } => self.intern(TypeData::Pointer {
                pointee: *pointee,
                variability: v,
                is_const: *is_const,
            }),
            TypeData::Reference { target } => self.reference(self.with_variability(*target, v)),
            TypeData::Array { element, count } => {
                self.array(self.with_variability(*element, v), *count)
            }
            TypeData::Vector { element, count } => {
                self.vector(self.with_variability(*element, v), *count)
            }
            TypeData::Struct {
                name,
                members,
                is_const,
                ..
            } => self.intern(TypeData::Struct {
                name: name.clone(),
                members: members.clone(),
                variability: v,
                is_const: *is_const,
            }),
            TypeData::Function { .. } => id,
        }
    }

    /// The const rendition of `id`.
    pub fn as_const(&self, id: TypeId) -> TypeId {
        self.with_const(id, true)
    }

    /// The mutable (non-const) rendition of `id`.
    pub fn as_mutable(&self, id: TypeId) -> TypeId {
        self.with_const(id, false)
    }

    fn with_const(&self, id: TypeId, c: bool) -> TypeId {
        match &*self.data(id) {
            TypeData::Atomic {
                basic, variability, ..
            } => self.intern(TypeData::Atomic {
                basic: *basic,
                variability: *variability,
                is_const: c,
            }),
            TypeData::Enum {
                name,
                enumerators,
                variability,
                ..
            } => self.intern(TypeData::Enum {
                name: name.clone(),
                enumerators: enumerators.clone(),
                variability: *variability,
                is_const: c,
            }),
            TypeData::Pointer {
                pointee,
                variability,
                ..
            } => self.intern(TypeData::Pointer {
                pointee: *pointee,
                variability: *variability,
                is_const: c,
            }),
            TypeData::Reference { target } => self.reference(self.with_const(*target, c)),
            TypeData::Array { element, count } => self.array(self.with_const(*element, c), *count),
            TypeData::Vector { element, count } => {
                self.vector(self.with_const(*element, c), *count)
            }
            TypeData::Struct {
                name,
                members,
                variability,
                ..
            } => self.intern(TypeData::Struct {
                name: name.clone(),
                members: members.clone(),
                variability: *variability,
                is_const: c,
            }),
            TypeData::Function { .. } => id,
        }
    }

    // ------------------------------------------------------------------
    // Shape and attribute queries
    // ------------------------------------------------------------------

    /// Variability of the value itself. References and functions are
    /// uniform; arrays and vectors take their element's variability.
    pub fn variability(&self, id: TypeId) -> Variability {
        match &*self.data(id) {
            TypeData::Atomic { variability, .. }
            | TypeData::Enum { variability, .. }
            | TypeData::Pointer { variability, .. }
            | TypeData::Struct { variability, .. } => *variability,
            TypeData::Reference { .. } | TypeData::Function { .. } => Variability::Uniform,
            TypeData::Array { element, .. } | TypeData::Vector { element, .. } => {
                self.variability(*element)
            }
        }
    }

    pub fn is_uniform(&self, id: TypeId) -> bool {
        self.variability(id) == Variability::Uniform
    }

    pub fn is_varying(&self, id: TypeId) -> bool {
        self.variability(id) == Variability::Varying
    }

    /// Const-ness of the value. References and arrays delegate to their
    /// target/element.
    pub fn is_const(&self, id: TypeId) -> bool {
        match &*self.data(id) {
            TypeData::Atomic { is_const, .. }
            | TypeData::Enum { is_const, .. }
            | TypeData::Pointer { is_const, .. }
            | TypeData::Struct { is_const, .. } => *is_const,
            TypeData::Reference { target } => self.is_const(*target),
            TypeData::Array { element, .. } | TypeData::Vector { element, .. } => {
                self.is_const(*element)
            }
            TypeData::Function { .. } => false,
        }
    }

    /// The basic type of an atomic, or `uint32` for an enum.
    pub fn atomic_basic(&self, id: TypeId) -> Option<BasicType> {
        match &*self.data(id) {
            TypeData::Atomic { basic, .. } => Some(*basic),
            TypeData::Enum { .. } => Some(BasicType::UInt32),
            _ => None,
        }
    }

    pub fn is_atomic(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Atomic { .. })
    }

    pub fn is_void(&self, id: TypeId) -> bool {
        self.atomic_basic(id) == Some(BasicType::Void) && self.is_atomic(id)
    }

    pub fn is_bool(&self, id: TypeId) -> bool {
        self.atomic_basic(id) == Some(BasicType::Bool) && self.is_atomic(id)
    }

    /// Integer-valued: the integer atomics and enums.
    pub fn is_int(&self, id: TypeId) -> bool {
        match &*self.data(id) {
            TypeData::Atomic { basic, .. } => basic.is_int(),
            TypeData::Enum { .. } => true,
            _ => false,
        }
    }

    pub fn is_float(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Atomic { basic, .. } if basic.is_float())
    }

    /// Numeric-valued: integer or float atomics, and enums.
    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.is_int(id) || self.is_float(id)
    }

    pub fn is_unsigned(&self, id: TypeId) -> bool {
        match &*self.data(id) {
            TypeData::Atomic { basic, .. } => basic.is_unsigned(),
            TypeData::Enum { .. } => true,
            _ => false,
        }
    }

    pub fn is_signed(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Atomic { basic, .. } if basic.is_signed_int())
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Pointer { .. })
    }

    pub fn is_void_pointer(&self, id: TypeId) -> bool {
        match &*self.data(id) {
            TypeData::Pointer { pointee, .. } => self.is_void(self.as_mutable(*pointee)),
            _ => false,
        }
    }

    pub fn is_reference(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Reference { .. })
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Array { .. })
    }

    pub fn is_vector(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Vector { .. })
    }

    /// Arrays and short vectors: the indexable element sequences.
    pub fn is_sequential(&self, id: TypeId) -> bool {
        self.is_array(id) || self.is_vector(id)
    }

    pub fn is_struct(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Struct { .. })
    }

    pub fn is_enum(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Enum { .. })
    }

    pub fn is_function(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Function { .. })
    }

    /// Pointee of a pointer type.
    pub fn pointee(&self, id: TypeId) -> Option<TypeId> {
        match &*self.data(id) {
            TypeData::Pointer { pointee, .. } => Some(*pointee),
            _ => None,
        }
    }

    /// Target of a reference, or `id` itself for non-references.
    pub fn reference_target(&self, id: TypeId) -> TypeId {
        match &*self.data(id) {
            TypeData::Reference { target } => *target,
            _ => id,
        }
    }

    /// Element `i` of a composite shape. For structs, the member type is
    /// projected through the struct's variability and const-ness; arrays and
    /// vectors ignore `i`.
    pub fn element_type(&self, id: TypeId, i: usize) -> Option<TypeId> {
        match &*self.data(id) {
            TypeData::Array { element, .. } | TypeData::Vector { element, .. } => Some(*element),
            TypeData::Struct {
                members,
                variability,
                is_const,
                ..
            } => {
                let member = members.get(i)?;
                let mut ty = member.ty;
                if *variability == Variability::Varying {
                    ty = self.as_varying(ty);
                }
                if *is_const {
                    ty = self.as_const(ty);
                }
                Some(ty)
            }
            _ => None,
        }
    }

    /// Element count of an array, vector, or struct.
    pub fn element_count(&self, id: TypeId) -> Option<u32> {
        match &*self.data(id) {
            TypeData::Array { count, .. } | TypeData::Vector { count, .. } => Some(*count),
            TypeData::Struct { members, .. } => Some(members.len() as u32),
            _ => None,
        }
    }

    /// Index of the named struct member.
    pub fn struct_member_index(&self, id: TypeId, name: &str) -> Option<usize> {
        match &*self.data(id) {
            TypeData::Struct { members, .. } => members.iter().position(|m| m.name == name),
            _ => None,
        }
    }

    /// Name of struct member `i`.
    pub fn struct_member_name(&self, id: TypeId, i: usize) -> Option<String> {
        match &*self.data(id) {
            TypeData::Struct { members, .. } => members.get(i).map(|m| m.name.clone()),
            _ => None,
        }
    }

    /// All member names of a struct.
    pub fn struct_member_names(&self, id: TypeId) -> Vec<String> {
        match &*self.data(id) {
            TypeData::Struct { members, .. } => members.iter().map(|m| m.name.clone()).collect(),
            _ => Vec::new(),
        }
    }

    /// Signature parts of a function type: return type, parameter types,
    /// has-default flags, and the task qualifier.
    pub fn function_signature(&self, id: TypeId) -> Option<(TypeId, Vec<TypeId>, Vec<bool>, bool)> {
        match &*self.data(id) {
            TypeData::Function {
                ret,
                params,
                param_has_default,
                is_task,
            } => Some((*ret, params.clone(), param_has_default.clone(), *is_task)),
            _ => None,
        }
    }

    /// A bool type with the same shape as `id`: a vector of bools for vector
    /// input, otherwise a scalar bool of the same variability.
    pub fn matching_bool_type(&self, id: TypeId) -> TypeId {
        match &*self.data(id) {
            TypeData::Vector { element, count } => {
                let b = self.atomic(BasicType::Bool, self.variability(*element));
                self.vector(b, *count)
            }
            _ => self.atomic(BasicType::Bool, self.variability(id)),
        }
    }

    // ------------------------------------------------------------------
    // Promotion
    // ------------------------------------------------------------------

    /// The common type of `a` and `b` under the promotion rules, or `None`
    /// with a diagnostic naming `ctx_msg`.
    ///
    /// Arrays decay to pointers and references are stripped first. A scalar
    /// against a vector of size n promotes to a vector of size n. Two atomic
    /// scalars promote up the rank ladder (mixed signedness of one width
    /// yields unsigned, integer plus float yields the float). The result is
    /// varying if either input is (or `force_varying` is set), const only if
    /// both inputs are const, and a scalar result becomes a vector when
    /// `vector_size` is nonzero.
    #[allow(clippy::too_many_arguments)]
    pub fn more_general_type(
        &self,
        a: TypeId,
        b: TypeId,
        pos: Span,
        ctx_msg: &str,
        force_varying: bool,
        vector_size: u32,
        diags: &Diagnostics,
    ) -> Option<TypeId> {
        let mut a = self.reference_target(a);
        let mut b = self.reference_target(b);
        if let Some(elem) = self.array_decay_element(a) {
            a = self.pointer(elem, Variability::Uniform);
        }
        if let Some(elem) = self.array_decay_element(b) {
            b = self.pointer(elem, Variability::Uniform);
        }

        if self.is_void(a) || self.is_void(b) || self.is_function(a) || self.is_function(b) {
            diags.error(
                pos,
                format!(
                    "Type \"{}\" and type \"{}\" can't be promoted to a common type for {}.",
                    self.display(a),
                    self.display(b),
                    ctx_msg
                ),
            );
            return None;
        }

        let variability = if force_varying {
            Variability::Varying
        } else {
            self.variability(a).join(self.variability(b))
        };
        let both_const = self.is_const(a) && self.is_const(b);

        // Pointers unify with pointers of a compatible target; the void
        // pointer unifies with anything.
        if self.is_pointer(a) || self.is_pointer(b) {
            return self.promote_pointers(a, b, variability, both_const, pos, ctx_msg, diags);
        }

        // Identical named types (modulo attributes) keep their identity.
        if self.is_struct(a) || self.is_struct(b) {
            if self.same_named_type(a, b) {
                return Some(self.requalify(a, variability, both_const));
            }
            diags.error(
                pos,
                format!(
                    "Can't promote between struct types \"{}\" and \"{}\" for {}.",
                    self.display(a),
                    self.display(b),
                    ctx_msg
                ),
            );
            return None;
        }
        if self.is_enum(a) && self.is_enum(b) && self.same_named_type(a, b) {
            return Some(self.requalify(a, variability, both_const));
        }

        // Vector / scalar mixing.
        let vec_a = self.vector_parts(a);
        let vec_b = self.vector_parts(b);
        let (elem_basic, count) = match (vec_a, vec_b) {
            (Some((ea, na)), Some((eb, nb))) => {
                if na != nb {
                    diags.error(
                        pos,
                        format!(
                            "Can't do operation between vector types of different sizes ({} vs. {}) for {}.",
                            na, nb, ctx_msg
                        ),
                    );
                    return None;
                }
                (self.promote_basic(ea, eb)?, na)
            }
            (Some((ea, na)), None) => {
                let sb = self.scalar_basic(b, pos, ctx_msg, diags)?;
                (self.promote_basic(ea, sb)?, na)
            }
            (None, Some((eb, nb))) => {
                let sa = self.scalar_basic(a, pos, ctx_msg, diags)?;
                (self.promote_basic(sa, eb)?, nb)
            }
            (None, None) => {
                let sa = self.scalar_basic(a, pos, ctx_msg, diags)?;
                let sb = self.scalar_basic(b, pos, ctx_msg, diags)?;
                (self.promote_basic(sa, sb)?, 0)
            }
        };

        let mut result = self.intern(TypeData::Atomic {
            basic: elem_basic,
            variability,
            is_const: both_const,
        });
        let count = if count == 0 { vector_size } else { count };
        if count > 0 {
            result = self.vector(result, count);
        }
        Some(result)
    }

    fn array_decay_element(&self, id: TypeId) -> Option<TypeId> {
        match &*self.data(id) {
            TypeData::Array { element, .. } => Some(*element),
            _ => None,
        }
    }

    fn vector_parts(&self, id: TypeId) -> Option<(BasicType, u32)> {
        match &*self.data(id) {
            TypeData::Vector { element, count } => {
                Some((self.atomic_basic(*element)?, *count))
            }
            _ => None,
        }
    }

    fn scalar_basic(
        &self,
        id: TypeId,
        pos: Span,
        ctx_msg: &str,
        diags: &Diagnostics,
    ) -> Option<BasicType> {
        match self.atomic_basic(id) {
            Some(basic) => Some(basic),
            None => {
                diags.error(
                    pos,
                    format!(
                        "Type \"{}\" can't be promoted to a common type for {}.",
                        self.display(id),
                        ctx_msg
                    ),
                );
                None
            }
        }
    }

    /// The rank ladder with its tie-breaks. Mixed signedness of one width
    /// lands on the unsigned type because the unsigned variant outranks the
    /// signed one; integer against float lands on the float the same way.
    fn promote_basic(&self, a: BasicType, b: BasicType) -> Option<BasicType> {
        let (ra, rb) = (a.rank()?, b.rank()?);
        Some(if ra >= rb { a } else { b })
    }

    #[allow(clippy::too_many_arguments)]
    fn promote_pointers(
        &self,
        a: TypeId,
        b: TypeId,
        variability: Variability,
        both_const: bool,
        pos: Span,
        ctx_msg: &str,
        diags: &Diagnostics,
    ) -> Option<TypeId> {
        let fail = |diags: &Diagnostics| {
            diags.error(
                pos,
                format!(
                    "Can't promote between types \"{}\" and \"{}\" for {}.",
                    self.display(a),
                    self.display(b),
                    ctx_msg
                ),
            );
            None
        };
        let (Some(pa), Some(pb)) = (self.pointee(a), self.pointee(b)) else {
            return fail(diags);
        };
        let pointee = if self.is_void_pointer(a) {
            pb
        } else if self.is_void_pointer(b) {
            pa
        } else if self.equal_ignoring_const(pa, pb) {
            pa
        } else {
            return fail(diags);
        };
        let ptr = self.pointer(pointee, variability);
        Some(if both_const { self.as_const(ptr) } else { ptr })
    }

    fn same_named_type(&self, a: TypeId, b: TypeId) -> bool {
        self.equal_ignoring_const(self.as_uniform(a), self.as_uniform(b))
    }

    fn requalify(&self, id: TypeId, variability: Variability, is_const: bool) -> TypeId {
        let id = self.with_variability(id, variability);
        self.with_const(id, is_const)
    }

    // ------------------------------------------------------------------
    // Mangling and display
    // ------------------------------------------------------------------

    /// Deterministic string encoding of a type, injective over distinct
    /// types. Used as the signature component of mangled symbol names.
    pub fn mangle(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.mangle_into(id, true, &mut out);
        out
    }

    /// Like [`mangle`](Self::mangle) but ignoring default-argument flags, so
    /// two declarations that differ only in defaults share a signature key.
    pub fn signature(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.mangle_into(id, false, &mut out);
        out
    }

    fn mangle_into(&self, id: TypeId, with_defaults: bool, out: &mut String) {
        use std::fmt::Write;

        let qualifiers =
            |out: &mut String, variability: Variability, is_const: bool| {
                out.push(match variability {
                    Variability::Uniform => 'u',
                    Variability::Varying => 'v',
                });
                if is_const {
                    out.push('C');
                }
            };

        match &*self.data(id) {
            TypeData::Atomic {
                basic,
                variability,
                is_const,
            } => {
                qualifiers(out, *variability, *is_const);
                out.push(basic.mangle_code());
            }
            TypeData::Enum {
                name,
                enumerators,
                variability,
                is_const,
            } => {
                qualifiers(out, *variability, *is_const);
                let _ = write!(out, "E{}{}{}_", name.len(), name, enumerators.len());
                for (en, ev) in enumerators {
                    let _ = write!(out, "{}{}{}_", en.len(), en, ev);
                }
            }
            TypeData::Pointer {
                pointee,
                variability,
                is_const,
            } => {
                qualifiers(out, *variability, *is_const);
                out.push('P');
                self.mangle_into(*pointee, with_defaults, out);
            }
            TypeData::Reference { target } => {
                out.push('R');
                self.mangle_into(*target, with_defaults, out);
            }
            TypeData::Array { element, count } => {
                let _ = write!(out, "A{}_", count);
                self.mangle_into(*element, with_defaults, out);
            }
            TypeData::Vector { element, count } => {
                let _ = write!(out, "W{}_", count);
                self.mangle_into(*element, with_defaults, out);
            }
            TypeData::Struct {
                name,
                members,
                variability,
                is_const,
            } => {
                qualifiers(out, *variability, *is_const);
                let _ = write!(out, "S{}{}{}_", name.len(), name, members.len());
                for member in members {
                    let _ = write!(out, "{}{}", member.name.len(), member.name);
                    self.mangle_into(member.ty, with_defaults, out);
                }
            }
            TypeData::Function {
                ret,
                params,
                param_has_default,
                is_task,
            } => {
                out.push('F');
                if *is_task {
                    out.push('T');
                }
                self.mangle_into(*ret, with_defaults, out);
                let _ = write!(out, "{}_", params.len());
                for (i, param) in params.iter().enumerate() {
                    if with_defaults && param_has_default.get(i).copied().unwrap_or(false) {
                        out.push('D');
                    }
                    self.mangle_into(*param, with_defaults, out);
                }
            }
        }
    }

    /// Human-readable type name for diagnostics, e.g. `varying int32` or
    /// `uniform float * uniform`.
    pub fn display(&self, id: TypeId) -> String {
        let qualify = |variability: Variability, is_const: bool, base: &str| {
            let v = match variability {
                Variability::Uniform => "uniform",
                Variability::Varying => "varying",
            };
            if is_const {
                format!("const {} {}", v, base)
            } else {
                format!("{} {}", v, base)
            }
        };

        match &*self.data(id) {
            TypeData::Atomic {
                basic,
                variability,
                is_const,
            } => {
                if *basic == BasicType::Void {
                    "void".to_string()
                } else {
                    qualify(*variability, *is_const, basic.name())
                }
            }
            TypeData::Enum {
                name,
                variability,
                is_const,
                ..
            } => qualify(*variability, *is_const, &format!("enum {}", name)),
            TypeData::Pointer {
                pointee,
                variability,
                is_const,
            } => {
                let v = match variability {
                    Variability::Uniform => "uniform",
                    Variability::Varying => "varying",
                };
                let c = if *is_const { " const" } else { "" };
                format!("{} * {}{}", self.display(*pointee), v, c)
            }
            TypeData::Reference { target } => format!("{} &", self.display(*target)),
            TypeData::Array { element, count } => {
                if *count == 0 {
                    format!("{}[]", self.display(*element))
                } else {
                    format!("{}[{}]", self.display(*element), count)
                }
            }
            TypeData::Vector { element, count } => {
                format!("{}<{}>", self.display(*element), count)
            }
            TypeData::Struct {
                name,
                variability,
                is_const,
                ..
            } => qualify(*variability, *is_const, &format!("struct {}", name)),
            TypeData::Function { ret, params, is_task, .. } => {
                let params = params
                    .iter()
                    .map(|p| self.display(*p))
                    .collect::<Vec<_>>()
                    .join(", ");
                let task = if *is_task { "task " } else { "" };
                format!("{}{}({})", task, self.display(*ret), params)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TypeStore {
        TypeStore::new()
    }

    #[test]
    fn interning_dedupes() {
        let s = store();
        let a = s.uniform(BasicType::Int32);
        let b = s.uniform(BasicType::Int32);
        assert_eq!(a, b);
        assert_ne!(a, s.varying(BasicType::Int32));
        assert_ne!(a, s.uniform(BasicType::UInt32));
    }

    #[test]
    fn variability_morphisms_form_a_lattice() {
        let s = store();
        let base = s.varying(BasicType::Float);
        let member = StructMember {
            name: "f".into(),
            ty: base,
        };
        let candidates = [
            s.uniform(BasicType::Int32),
            s.as_const(s.varying(BasicType::Double)),
            s.pointer(s.uniform(BasicType::Int8), Variability::Varying),
            s.array(s.uniform(BasicType::Int32), 10),
            s.vector(s.uniform(BasicType::Float), 4),
            s.struct_type("P", vec![member]),
        ];
        for t in candidates {
            assert_eq!(s.as_uniform(s.as_varying(t)), s.as_uniform(t));
            assert_eq!(s.as_varying(s.as_uniform(t)), s.as_varying(t));
            assert_eq!(s.as_const(s.as_mutable(t)), s.as_const(t));
            assert_eq!(s.as_mutable(s.as_const(t)), s.as_mutable(t));
            // The two morphism families commute.
            assert_eq!(
                s.as_const(s.as_varying(t)),
                s.as_varying(s.as_const(t))
            );
            assert_eq!(
                s.as_mutable(s.as_uniform(t)),
                s.as_uniform(s.as_mutable(t))
            );
        }
    }

    #[test]
    fn varying_array_has_varying_elements() {
        let s = store();
        let arr = s.array(s.uniform(BasicType::Int32), 8);
        let varr = s.as_varying(arr);
        assert_eq!(s.element_type(varr, 0), Some(s.varying(BasicType::Int32)));
        assert!(s.is_varying(varr));
    }

    #[test]
    fn pointer_variability_is_its_own() {
        let s = store();
        let p = s.pointer(s.uniform(BasicType::Float), Variability::Uniform);
        let vp = s.as_varying(p);
        // The pointee stays uniform; only the pointer becomes varying.
        assert!(s.is_varying(vp));
        assert_eq!(s.pointee(vp), Some(s.uniform(BasicType::Float)));
    }

    #[test]
    fn references_never_nest_and_stay_uniform() {
        let s = store();
        let r = s.reference(s.varying(BasicType::Int32));
        assert_eq!(s.reference(r), r);
        assert!(s.is_uniform(r));
        assert_eq!(s.reference_target(r), s.varying(BasicType::Int32));
    }

    #[test]
    fn struct_members_project_struct_attributes() {
        let s = store();
        let st = s.struct_type(
            "S",
            vec![StructMember {
                name: "m".into(),
                ty: s.uniform(BasicType::Int32),
            }],
        );
        let vst = s.as_varying(st);
        assert_eq!(s.element_type(vst, 0), Some(s.varying(BasicType::Int32)));
        let cst = s.as_const(st);
        assert_eq!(
            s.element_type(cst, 0),
            Some(s.as_const(s.uniform(BasicType::Int32)))
        );
        assert_eq!(s.struct_member_index(st, "m"), Some(0));
        assert_eq!(s.struct_member_index(st, "q"), None);
    }

    #[test]
    fn void_pointer_detection_ignores_const() {
        let s = store();
        assert!(s.is_void_pointer(s.void_pointer()));
        let const_void = s.pointer(s.as_const(s.void()), Variability::Uniform);
        assert!(s.is_void_pointer(const_void));
        let int_ptr = s.pointer(s.uniform(BasicType::Int32), Variability::Uniform);
        assert!(!s.is_void_pointer(int_ptr));
    }

    #[test]
    fn matching_bool_shapes() {
        let s = store();
        assert_eq!(
            s.matching_bool_type(s.varying(BasicType::Float)),
            s.varying(BasicType::Bool)
        );
        let vec = s.vector(s.uniform(BasicType::Int32), 3);
        assert_eq!(
            s.matching_bool_type(vec),
            s.vector(s.uniform(BasicType::Bool), 3)
        );
        let vptr = s.pointer(s.uniform(BasicType::Int32), Variability::Varying);
        assert_eq!(s.matching_bool_type(vptr), s.varying(BasicType::Bool));
    }

    #[test]
    fn promotion_follows_the_ladder() {
        let s = store();
        let diags = Diagnostics::new();
        let cases = [
            (BasicType::Int32, BasicType::UInt32, BasicType::UInt32),
            (BasicType::Int8, BasicType::Int16, BasicType::Int16),
            (BasicType::Int64, BasicType::Float, BasicType::Float),
            (BasicType::Float, BasicType::Double, BasicType::Double),
            (BasicType::Bool, BasicType::Int8, BasicType::Int8),
        ];
        for (a, b, expect) in cases {
            let got = s
                .more_general_type(
                    s.uniform(a),
                    s.uniform(b),
                    Span::default(),
                    "test",
                    false,
                    0,
                    &diags,
                )
                .unwrap();
            assert_eq!(got, s.uniform(expect), "{:?} + {:?}", a, b);
        }
        assert_eq!(diags.error_count(), 0);
    }

    #[test]
    fn promotion_propagates_varying() {
        let s = store();
        let diags = Diagnostics::new();
        let got = s
            .more_general_type(
                s.uniform(BasicType::Int32),
                s.varying(BasicType::Float),
                Span::default(),
                "test",
                false,
                0,
                &diags,
            )
            .unwrap();
        assert_eq!(got, s.varying(BasicType::Float));

        let forced = s
            .more_general_type(
                s.uniform(BasicType::Int32),
                s.uniform(BasicType::Int32),
                Span::default(),
                "test",
                true,
                0,
                &diags,
            )
            .unwrap();
        assert_eq!(forced, s.varying(BasicType::Int32));
    }

    #[test]
    fn promotion_const_only_when_both_const() {
        let s = store();
        let diags = Diagnostics::new();
        let c32 = s.as_const(s.uniform(BasicType::Int32));
        let got = s
            .more_general_type(c32, c32, Span::default(), "test", false, 0, &diags)
            .unwrap();
        assert!(s.is_const(got));

        let got = s
            .more_general_type(
                c32,
                s.uniform(BasicType::Int32),
                Span::default(),
                "test",
                false,
                0,
                &diags,
            )
            .unwrap();
        assert!(!s.is_const(got));
    }

    #[test]
    fn promotion_scalar_with_vector() {
        let s = store();
        let diags = Diagnostics::new();
        let vec = s.vector(s.uniform(BasicType::Int32), 4);
        let got = s
            .more_general_type(
                vec,
                s.uniform(BasicType::Float),
                Span::default(),
                "test",
                false,
                0,
                &diags,
            )
            .unwrap();
        assert_eq!(got, s.vector(s.uniform(BasicType::Float), 4));
    }

    #[test]
    fn promotion_rejects_mismatched_vector_sizes() {
        let s = store();
        let diags = Diagnostics::new();
        let v3 = s.vector(s.uniform(BasicType::Int32), 3);
        let v4 = s.vector(s.uniform(BasicType::Int32), 4);
        assert!(s
            .more_general_type(v3, v4, Span::default(), "test", false, 0, &diags)
            .is_none());
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn promotion_decays_arrays_and_strips_references() {
        let s = store();
        let diags = Diagnostics::new();
        let arr = s.array(s.uniform(BasicType::Int32), 10);
        let ptr = s.pointer(s.uniform(BasicType::Int32), Variability::Uniform);
        let got = s
            .more_general_type(arr, ptr, Span::default(), "test", false, 0, &diags)
            .unwrap();
        assert!(s.is_pointer(got));

        let r = s.reference(s.uniform(BasicType::Float));
        let got = s
            .more_general_type(
                r,
                s.uniform(BasicType::Int32),
                Span::default(),
                "test",
                false,
                0,
                &diags,
            )
            .unwrap();
        assert_eq!(got, s.uniform(BasicType::Float));
    }

    #[test]
    fn mangles_are_injective() {
        let s = store();
        let i32u = s.uniform(BasicType::Int32);
        let member = StructMember {
            name: "x".into(),
            ty: i32u,
        };
        let all = vec![
            i32u,
            s.varying(BasicType::Int32),
            s.as_const(i32u),
            s.uniform(BasicType::UInt32),
            s.pointer(i32u, Variability::Uniform),
            s.pointer(i32u, Variability::Varying),
            s.as_const(s.pointer(i32u, Variability::Uniform)),
            s.reference(i32u),
            s.array(i32u, 4),
            s.array(i32u, 0),
            s.vector(i32u, 4),
            s.struct_type("A", vec![member.clone()]),
            s.struct_type("B", vec![member]),
            s.enum_type("E", vec![("X".into(), 0)]),
            s.function(s.void(), vec![i32u], vec![false], false),
            s.function(s.void(), vec![i32u], vec![true], false),
            s.function(s.void(), vec![i32u], vec![false], true),
            s.function(i32u, vec![], vec![], false),
        ];
        for (i, &a) in all.iter().enumerate() {
            for &b in &all[i + 1..] {
                assert_ne!(s.mangle(a), s.mangle(b), "{} vs {}", s.display(a), s.display(b));
            }
        }
    }

    #[test]
    fn signature_ignores_default_flags() {
        let s = store();
        let i32u = s.uniform(BasicType::Int32);
        let f1 = s.function(s.void(), vec![i32u], vec![false], false);
        let f2 = s.function(s.void(), vec![i32u], vec![true], false);
        assert_ne!(s.mangle(f1), s.mangle(f2));
        assert_eq!(s.signature(f1), s.signature(f2));
    }

    #[test]
    fn display_strings() {
        let s = store();
        assert_eq!(s.display(s.varying(BasicType::Int32)), "varying int32");
        assert_eq!(
            s.display(s.as_const(s.uniform(BasicType::Float))),
            "const uniform float"
        );
        let ptr = s.pointer(s.uniform(BasicType::Int8), Variability::Varying);
        assert_eq!(s.display(ptr), "uniform int8 * varying");
        assert_eq!(s.display(s.array(s.uniform(BasicType::Int32), 10)), "uniform int32[10]");
        assert_eq!(s.display(s.void()), "void");
    }

    #[test]
    fn equal_ignoring_const_is_deep() {
        let s = store();
        let p = s.pointer(s.as_const(s.uniform(BasicType::Int32)), Variability::Uniform);
        let q = s.pointer(s.uniform(BasicType::Int32), Variability::Uniform);
        assert!(!s.equal(p, q));
        assert!(s.equal_ignoring_const(p, q));
        let vp = s.as_varying(q);
        assert!(!s.equal_ignoring_const(q, vp));
    }
}
