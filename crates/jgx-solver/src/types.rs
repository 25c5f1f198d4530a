//! Type representation for the generics core.
//!
//! Every type is a [`TypeId`] handle into the [`TypeInterner`](crate::TypeInterner)
//! arena. The arena stores one [`TypeData`] per (structural shape,
//! annotation set), so handle equality is type identity.
//!
//! Declarations (classes, interfaces, type parameters) live in side tables
//! addressed by [`ClassId`] and [`TypeVarId`]; their supertypes and bounds are
//! filled in once after declaration, which is how F-bounded declarations
//! such as `class X<T extends X<T>>` are expressed without cyclic pointers.

use bitflags::bitflags;
use jgx_common::Atom;
use jgx_common::limits::TYPE_LIST_INLINE;
use smallvec::SmallVec;
use std::fmt;

/// Inline list of types used for arguments, bounds and intersection members.
pub type TypeList = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

/// Type annotations attached to a type use.
pub type TypeAnnotations = SmallVec<[TypeAnnotation; 2]>;

// =============================================================================
// TypeId
// =============================================================================

/// Handle to an interned type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Generic problem type; produced for unresolvable references.
    pub const ERROR: TypeId = TypeId(0);
    /// Problem type produced when a greatest lower bound does not exist.
    pub const BOUND_MISMATCH: TypeId = TypeId(1);
    pub const NULL: TypeId = TypeId(2);

    pub const VOID: TypeId = TypeId(3);
    pub const BOOLEAN: TypeId = TypeId(4);
    pub const BYTE: TypeId = TypeId(5);
    pub const CHAR: TypeId = TypeId(6);
    pub const SHORT: TypeId = TypeId(7);
    pub const INT: TypeId = TypeId(8);
    pub const LONG: TypeId = TypeId(9);
    pub const FLOAT: TypeId = TypeId(10);
    pub const DOUBLE: TypeId = TypeId(11);

    pub const OBJECT: TypeId = TypeId(12);
    pub const SERIALIZABLE: TypeId = TypeId(13);
    pub const CLONEABLE: TypeId = TypeId(14);
    pub const NUMBER: TypeId = TypeId(15);
    pub const INTEGER: TypeId = TypeId(16);
    pub const STRING: TypeId = TypeId(17);

    /// First id handed out for types interned on demand.
    pub const FIRST_USER: u32 = 18;

    /// Returns true for the pre-registered types above.
    #[inline]
    pub fn is_well_known(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub fn is_base_type(self) -> bool {
        (Self::VOID.0..=Self::DOUBLE.0).contains(&self.0)
    }
}

// =============================================================================
// Declarations
// =============================================================================

/// Handle to a declared class or interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    pub const OBJECT: ClassId = ClassId(0);
    pub const SERIALIZABLE: ClassId = ClassId(1);
    pub const CLONEABLE: ClassId = ClassId(2);
    pub const NUMBER: ClassId = ClassId(3);
    pub const INTEGER: ClassId = ClassId(4);
    pub const STRING: ClassId = ClassId(5);
}

/// Handle to a declared type parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(pub u32);

/// Handle to an inference variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InferenceVarId(pub u32);

/// Identity of the compilation unit that owns a capture site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompilationUnitId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
}

/// Who declared a type parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeVarOwner {
    Class(ClassId),
    /// A generic method, identified by its selector.
    Method { class: ClassId, selector: Atom },
}

/// Resolved supertypes of a class declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassSupertypes {
    /// `None` only for `java.lang.Object`.
    pub superclass: Option<TypeId>,
    pub interfaces: TypeList,
}

#[derive(Debug)]
pub struct ClassDecl {
    /// Internal qualified name, e.g. `java/util/List`.
    pub name: Atom,
    pub kind: ClassKind,
    pub type_params: SmallVec<[TypeVarId; 2]>,
    pub enclosing: Option<ClassId>,
    pub(crate) supertypes: once_cell::sync::OnceCell<ClassSupertypes>,
}

impl ClassDecl {
    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// Resolved bounds of a type parameter, in the shape the capture rules
/// consume: a superclass (possibly `Object`) plus superinterfaces, and the
/// bound that was written first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeVarBounds {
    pub superclass: TypeId,
    pub interfaces: TypeList,
    pub first_bound: Option<TypeId>,
}

impl Default for TypeVarBounds {
    fn default() -> Self {
        TypeVarBounds {
            superclass: TypeId::OBJECT,
            interfaces: TypeList::new(),
            first_bound: None,
        }
    }
}

#[derive(Debug)]
pub struct TypeVarDecl {
    pub name: Atom,
    pub owner: TypeVarOwner,
    pub rank: u32,
    pub(crate) bounds: once_cell::sync::OnceCell<TypeVarBounds>,
}

/// Misuse of the declaration API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclarationError {
    UnknownClass(ClassId),
    UnknownTypeVariable(TypeVarId),
    SupertypesAlreadySet(ClassId),
    BoundsAlreadySet(TypeVarId),
    /// A bound or supertype that is not a reference type.
    NotAReferenceType(TypeId),
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationError::UnknownClass(id) => write!(f, "unknown class #{}", id.0),
            DeclarationError::UnknownTypeVariable(id) => {
                write!(f, "unknown type variable #{}", id.0)
            }
            DeclarationError::SupertypesAlreadySet(id) => {
                write!(f, "supertypes of class #{} are already resolved", id.0)
            }
            DeclarationError::BoundsAlreadySet(id) => {
                write!(f, "bounds of type variable #{} are already resolved", id.0)
            }
            DeclarationError::NotAReferenceType(id) => {
                write!(f, "type #{} is not a reference type", id.0)
            }
        }
    }
}

impl std::error::Error for DeclarationError {}

// =============================================================================
// Type shapes
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BaseKind {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl BaseKind {
    /// Descriptor letter used in signatures and unique keys.
    pub fn descriptor(self) -> char {
        match self {
            BaseKind::Void => 'V',
            BaseKind::Boolean => 'Z',
            BaseKind::Byte => 'B',
            BaseKind::Char => 'C',
            BaseKind::Short => 'S',
            BaseKind::Int => 'I',
            BaseKind::Long => 'J',
            BaseKind::Float => 'F',
            BaseKind::Double => 'D',
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            BaseKind::Void => "void",
            BaseKind::Boolean => "boolean",
            BaseKind::Byte => "byte",
            BaseKind::Char => "char",
            BaseKind::Short => "short",
            BaseKind::Int => "int",
            BaseKind::Long => "long",
            BaseKind::Float => "float",
            BaseKind::Double => "double",
        }
    }
}

/// The three wildcard forms `?`, `? extends B` and `? super B`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundKind {
    Unbound,
    Extends,
    Super,
}

/// Subtyping constraint between an actual type A and a formal F.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `A == F`
    Equal,
    /// `A << F`: the actual is a subtype of the formal.
    Extends,
    /// `A >> F`: the actual is a supertype of the formal.
    Super,
}

impl ConstraintKind {
    /// Swap the direction of a subtyping constraint. `Equal` never flips.
    pub fn flipped(self) -> Self {
        match self {
            ConstraintKind::Equal => ConstraintKind::Equal,
            ConstraintKind::Extends => ConstraintKind::Super,
            ConstraintKind::Super => ConstraintKind::Extends,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProblemReason {
    Error,
    /// No greatest lower bound exists for a set of bounds.
    ParameterBoundMismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NullTag {
    NonNull,
    Nullable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeAnnotation {
    NonNull,
    Nullable,
    /// Any other type annotation, by internal name.
    Named(Atom),
}

impl TypeAnnotation {
    pub fn null_tag(self) -> Option<NullTag> {
        match self {
            TypeAnnotation::NonNull => Some(NullTag::NonNull),
            TypeAnnotation::Nullable => Some(NullTag::Nullable),
            TypeAnnotation::Named(_) => None,
        }
    }

    pub fn from_null_tag(tag: NullTag) -> Self {
        match tag {
            NullTag::NonNull => TypeAnnotation::NonNull,
            NullTag::Nullable => TypeAnnotation::Nullable,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParameterizedShape {
    pub generic: ClassId,
    pub args: TypeList,
    pub enclosing: Option<TypeId>,
}

/// Structural identity of a wildcard.
///
/// `other_bounds` is `Some` exactly when the wildcard denotes an
/// intersection (`? extends A & B`, produced by lub computations).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WildcardShape {
    /// Owning generic type; `None` for wildcards synthesized outside a
    /// parameterization.
    pub generic: Option<ClassId>,
    /// Zero-based parameter position within `generic`.
    pub rank: u32,
    pub bound_kind: BoundKind,
    pub bound: Option<TypeId>,
    pub other_bounds: Option<TypeList>,
}

impl WildcardShape {
    /// Build a normalized shape. Unbound wildcards drop their bounds and an
    /// empty `other_bounds` list is the same as none.
    pub fn new(
        generic: Option<ClassId>,
        rank: u32,
        bound_kind: BoundKind,
        bound: Option<TypeId>,
        other_bounds: &[TypeId],
    ) -> Self {
        let (bound, other_bounds) = match bound_kind {
            BoundKind::Unbound => (None, None),
            _ if other_bounds.is_empty() => (bound, None),
            _ => (bound, Some(other_bounds.iter().copied().collect())),
        };
        WildcardShape {
            generic,
            rank,
            bound_kind,
            bound,
            other_bounds,
        }
    }

    pub fn unbound(generic: Option<ClassId>, rank: u32) -> Self {
        Self::new(generic, rank, BoundKind::Unbound, None, &[])
    }

    pub fn extends(generic: Option<ClassId>, rank: u32, bound: TypeId) -> Self {
        Self::new(generic, rank, BoundKind::Extends, Some(bound), &[])
    }

    pub fn super_(generic: Option<ClassId>, rank: u32, bound: TypeId) -> Self {
        Self::new(generic, rank, BoundKind::Super, Some(bound), &[])
    }

    #[inline]
    pub fn is_intersection(&self) -> bool {
        self.other_bounds.is_some()
    }

    /// `bound` followed by `other_bounds`.
    pub fn all_bound_types(&self) -> TypeList {
        let mut all = TypeList::new();
        all.extend(self.bound);
        if let Some(others) = &self.other_bounds {
            all.extend(others.iter().copied());
        }
        all
    }
}

/// Where a wildcard occurrence was captured.
///
/// `(source_type, start, end, cud)` is the recapture identity: capturing
/// the same wildcard at the same site twice during one analysis pass
/// yields the same capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CaptureSite {
    /// Type enclosing the capture site.
    pub source_type: TypeId,
    pub start: u32,
    pub end: u32,
    pub cud: CompilationUnitId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CaptureShape {
    /// Unannotated wildcard being captured.
    pub wildcard: TypeId,
    pub source_type: TypeId,
    pub start: u32,
    pub end: u32,
    pub cud: CompilationUnitId,
    /// Display number, unique within one analysis pass.
    pub capture_id: u32,
}

impl CaptureShape {
    pub fn site(&self) -> CaptureSite {
        CaptureSite {
            source_type: self.source_type,
            start: self.start,
            end: self.end,
            cud: self.cud,
        }
    }
}

/// Bounds computed for a capture by capture conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureBounds {
    pub superclass: TypeId,
    pub super_interfaces: TypeList,
    pub first_bound: Option<TypeId>,
    /// Lower bound of a `? super B` capture.
    pub lower_bound: Option<TypeId>,
    /// Nullness resolved from the wildcard and its bounds.
    pub null_tag: Option<NullTag>,
}

impl CaptureBounds {
    /// Bounds of a capture that was never initialized.
    pub fn object() -> Self {
        CaptureBounds {
            superclass: TypeId::OBJECT,
            super_interfaces: TypeList::new(),
            first_bound: None,
            lower_bound: None,
            null_tag: None,
        }
    }
}

/// Structural type data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Base(BaseKind),
    Null,
    /// A declared class or interface; for a generic declaration this is the
    /// generic type itself.
    Class(ClassId),
    Raw(ClassId),
    Parameterized(ParameterizedShape),
    Array { leaf: TypeId, dims: u8 },
    TypeVariable(TypeVarId),
    Wildcard(WildcardShape),
    Capture(CaptureShape),
    /// Intersection of reference types (`A & B`).
    Intersection(TypeList),
    InferenceVariable(InferenceVarId),
    Problem(ProblemReason),
}

/// Coarse classification of a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingKind {
    BaseType,
    NullType,
    Type,
    GenericType,
    ParameterizedType,
    RawType,
    ArrayType,
    TypeParameter,
    WildcardType,
    IntersectionType,
    InferenceVariable,
    ProblemType,
}

// =============================================================================
// TagBits
// =============================================================================

bitflags! {
    /// Derived properties of a type, computed once when it is interned.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TagBits: u32 {
        const HAS_TYPE_VARIABLE = 1 << 0;
        const HAS_MISSING_TYPE = 1 << 1;
        const HAS_NULL_TYPE_ANNOTATION = 1 << 2;
        const HAS_CAPTURED_WILDCARD = 1 << 3;
        const CONTAINS_NESTED_TYPE_REFERENCES = 1 << 4;
        const HAS_TYPE_ANNOTATIONS = 1 << 5;
        const ANNOTATION_NON_NULL = 1 << 6;
        const ANNOTATION_NULLABLE = 1 << 7;
        const HAS_INFERENCE_VARIABLE = 1 << 8;
        /// A parameterized type with at least one wildcard argument.
        const HAS_DIRECT_WILDCARD = 1 << 9;

        const ANNOTATION_NULL_MASK = Self::ANNOTATION_NON_NULL.bits() | Self::ANNOTATION_NULLABLE.bits();
        /// Bits a composite type inherits from its components.
        const PROPAGATED = Self::HAS_TYPE_VARIABLE.bits()
            | Self::HAS_MISSING_TYPE.bits()
            | Self::HAS_NULL_TYPE_ANNOTATION.bits()
            | Self::HAS_CAPTURED_WILDCARD.bits()
            | Self::CONTAINS_NESTED_TYPE_REFERENCES.bits()
            | Self::HAS_INFERENCE_VARIABLE.bits();
    }
}

impl TagBits {
    pub fn null_tag(self) -> Option<NullTag> {
        if self.contains(TagBits::ANNOTATION_NON_NULL) {
            Some(NullTag::NonNull)
        } else if self.contains(TagBits::ANNOTATION_NULLABLE) {
            Some(NullTag::Nullable)
        } else {
            None
        }
    }

    pub fn from_null_tag(tag: Option<NullTag>) -> Self {
        match tag {
            Some(NullTag::NonNull) => TagBits::ANNOTATION_NON_NULL,
            Some(NullTag::Nullable) => TagBits::ANNOTATION_NULLABLE,
            None => TagBits::empty(),
        }
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
