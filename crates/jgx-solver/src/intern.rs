//! The canonicalizing type cache.
//!
//! `TypeInterner` owns every type of one compiler run. It guarantees at
//! most one [`TypeId`] per (structural shape, annotation set), so the rest
//! of the core compares types with `==`.
//!
//! - Annotated types are separate slots that point at their unannotated
//!   sibling; [`TypeInterner::binding_id`] is shared between them.
//! - Captures are interned like any other shape, and additionally indexed
//!   by their unannotated wildcard and recapture identity so that capturing
//!   the same occurrence twice in one pass returns the same capture.
//! - Derived data that is only known after creation (capture bounds,
//!   wildcard supertypes, class supertypes, type-parameter bounds) lives in
//!   fill-once cells.

use crate::diagnostics::{Problem, ProblemReporter, TracingReporter};
use crate::types::*;
use dashmap::DashMap;
use jgx_common::{Atom, CompilerOptions, ShardedInterner};
use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct InternKey {
    data: TypeData,
    annotations: TypeAnnotations,
}

/// One arena slot.
#[derive(Debug)]
pub struct TypeEntry {
    pub data: TypeData,
    pub annotations: TypeAnnotations,
    pub flags: TagBits,
    /// The unannotated sibling; the slot itself when it has no annotations.
    pub unannotated: TypeId,
    pub(crate) capture_bounds: OnceCell<CaptureBounds>,
    pub(crate) wildcard_supers: OnceCell<(TypeId, TypeList)>,
}

#[inline]
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

#[inline]
fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Null-annotation contradiction found while computing tag bits.
enum NullConflict {
    OnType,
    OnBound(TypeId),
}

/// Type interning table and declaration registry.
pub struct TypeInterner {
    entries: RwLock<Vec<Arc<TypeEntry>>>,
    index: RwLock<FxHashMap<InternKey, TypeId>>,
    /// Qualified names, type-parameter names and annotation names.
    pub names: ShardedInterner,
    classes: RwLock<Vec<Arc<ClassDecl>>>,
    class_names: RwLock<FxHashMap<Atom, ClassId>>,
    type_vars: RwLock<Vec<Arc<TypeVarDecl>>>,
    inference_vars: RwLock<Vec<Atom>>,
    /// Unannotated wildcard -> captures of it in the current pass.
    captures: DashMap<TypeId, SmallVec<[TypeId; 2]>>,
    next_capture_id: AtomicU32,
    options: CompilerOptions,
    reporter: Arc<dyn ProblemReporter>,
}

impl TypeInterner {
    /// Create an interner with default options and the tracing reporter.
    pub fn new() -> Self {
        Self::with_options(CompilerOptions::default(), Arc::new(TracingReporter))
    }

    pub fn with_options(options: CompilerOptions, reporter: Arc<dyn ProblemReporter>) -> Self {
        let interner = TypeInterner {
            entries: RwLock::new(Vec::with_capacity(256)),
            index: RwLock::new(FxHashMap::default()),
            names: ShardedInterner::new(),
            classes: RwLock::new(Vec::new()),
            class_names: RwLock::new(FxHashMap::default()),
            type_vars: RwLock::new(Vec::new()),
            inference_vars: RwLock::new(Vec::new()),
            captures: DashMap::new(),
            next_capture_id: AtomicU32::new(1),
            options,
            reporter,
        };
        interner.names.intern_common();
        interner.register_well_known();
        interner
    }

    fn register_well_known(&self) {
        let fixed = [
            TypeData::Problem(ProblemReason::Error),
            TypeData::Problem(ProblemReason::ParameterBoundMismatch),
            TypeData::Null,
            TypeData::Base(BaseKind::Void),
            TypeData::Base(BaseKind::Boolean),
            TypeData::Base(BaseKind::Byte),
            TypeData::Base(BaseKind::Char),
            TypeData::Base(BaseKind::Short),
            TypeData::Base(BaseKind::Int),
            TypeData::Base(BaseKind::Long),
            TypeData::Base(BaseKind::Float),
            TypeData::Base(BaseKind::Double),
        ];
        for data in fixed {
            self.intern(data);
        }

        let object = self.declare_class("java/lang/Object", ClassKind::Class, &[]);
        let serializable = self.declare_class("java/io/Serializable", ClassKind::Interface, &[]);
        let cloneable = self.declare_class("java/lang/Cloneable", ClassKind::Interface, &[]);
        let number = self.declare_class("java/lang/Number", ClassKind::Class, &[]);
        let integer = self.declare_class("java/lang/Integer", ClassKind::Class, &[]);
        let string = self.declare_class("java/lang/String", ClassKind::Class, &[]);
        for class in [object, serializable, cloneable, number, integer, string] {
            self.class_type(class);
        }
        debug_assert_eq!(self.len(), TypeId::FIRST_USER as usize);

        let supertypes = [
            (object, None, &[][..]),
            (serializable, None, &[][..]),
            (cloneable, None, &[][..]),
            (number, Some(TypeId::OBJECT), &[TypeId::SERIALIZABLE][..]),
            (integer, Some(TypeId::NUMBER), &[][..]),
            (string, Some(TypeId::OBJECT), &[TypeId::SERIALIZABLE][..]),
        ];
        for (class, superclass, interfaces) in supertypes {
            if let Err(err) = self.set_supertypes(class, superclass, interfaces) {
                debug!(%err, "well-known supertypes already set");
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    #[inline]
    pub fn uses_null_type_annotations(&self) -> bool {
        self.options.null_type_annotations
    }

    pub fn report(&self, problem: Problem) {
        trace!(?problem, "reporting problem");
        self.reporter.report(problem);
    }

    pub fn intern_name(&self, name: &str) -> Atom {
        self.names.intern(name)
    }

    pub fn resolve_name(&self, atom: Atom) -> Arc<str> {
        self.names.resolve(atom)
    }

    /// The type annotation with internal name `name`. The configured null
    /// annotations map to their null tags once the overlay is enabled.
    pub fn annotation_named(&self, name: &str) -> TypeAnnotation {
        let name = name.replace('.', "/");
        if self.uses_null_type_annotations() {
            if name == self.options.non_null_annotation {
                return TypeAnnotation::NonNull;
            }
            if name == self.options.nullable_annotation {
                return TypeAnnotation::Nullable;
            }
        }
        TypeAnnotation::Named(self.names.intern(&name))
    }

    /// Number of interned types, well-known ones included.
    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    /// The arena slot for `id`. Unknown ids resolve to the error slot.
    pub fn entry(&self, id: TypeId) -> Arc<TypeEntry> {
        let entries = read(&self.entries);
        match entries.get(id.0 as usize) {
            Some(entry) => entry.clone(),
            None => entries[TypeId::ERROR.0 as usize].clone(),
        }
    }

    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        read(&self.entries)
            .get(id.0 as usize)
            .map(|entry| entry.data.clone())
    }

    #[inline]
    pub fn flags(&self, id: TypeId) -> TagBits {
        self.entry(id).flags
    }

    pub fn annotations(&self, id: TypeId) -> TypeAnnotations {
        self.entry(id).annotations.clone()
    }

    /// The unannotated sibling of `id`.
    #[inline]
    pub fn unannotated(&self, id: TypeId) -> TypeId {
        self.entry(id).unannotated
    }

    /// Stable identity shared by a type and all its annotated variants.
    #[inline]
    pub fn binding_id(&self, id: TypeId) -> u32 {
        self.unannotated(id).0
    }

    // =========================================================================
    // Interning
    // =========================================================================

    /// Intern unannotated type data. Array data is normalized as by
    /// [`array`](Self::array).
    pub fn intern(&self, data: TypeData) -> TypeId {
        if let TypeData::Array { leaf, dims } = data {
            return self.array(leaf, dims);
        }
        self.intern_annotated(data, TypeAnnotations::new())
    }

    fn intern_annotated(&self, data: TypeData, annotations: TypeAnnotations) -> TypeId {
        let key = InternKey { data, annotations };
        if let Some(&id) = read(&self.index).get(&key) {
            return id;
        }

        // The unannotated sibling must exist before its annotated variant.
        let unannotated = if key.annotations.is_empty() {
            None
        } else {
            Some(self.intern_annotated(key.data.clone(), TypeAnnotations::new()))
        };
        let (flags, conflict) = self.compute_flags(&key.data, &key.annotations);

        let id = {
            let mut index = write(&self.index);
            if let Some(&id) = index.get(&key) {
                return id;
            }
            let mut entries = write(&self.entries);
            let id = TypeId(entries.len() as u32);
            entries.push(Arc::new(TypeEntry {
                data: key.data.clone(),
                annotations: key.annotations.clone(),
                flags,
                unannotated: unannotated.unwrap_or(id),
                capture_bounds: OnceCell::new(),
                wildcard_supers: OnceCell::new(),
            }));
            index.insert(key, id);
            id
        };

        trace!(id = id.0, ?flags, "interned type");
        if let Some(conflict) = conflict
            && self.uses_null_type_annotations()
        {
            self.report(match conflict {
                NullConflict::OnType => Problem::ContradictoryNullAnnotations { ty: id },
                NullConflict::OnBound(bound) => {
                    Problem::ContradictoryNullAnnotationsOnBounds { ty: id, bound }
                }
            });
        }
        id
    }

    fn compute_flags(
        &self,
        data: &TypeData,
        annotations: &TypeAnnotations,
    ) -> (TagBits, Option<NullConflict>) {
        let inherited = |ids: &mut dyn Iterator<Item = TypeId>| {
            ids.fold(TagBits::empty(), |acc, id| {
                acc | (self.flags(id) & TagBits::PROPAGATED)
            })
        };

        let mut flags = match data {
            TypeData::Base(_) | TypeData::Null | TypeData::Class(_) | TypeData::Raw(_) => {
                TagBits::empty()
            }
            TypeData::Problem(_) => TagBits::HAS_MISSING_TYPE,
            TypeData::Parameterized(shape) => {
                let mut flags = inherited(&mut shape.args.iter().copied().chain(shape.enclosing));
                if shape
                    .args
                    .iter()
                    .any(|&arg| matches!(self.lookup(arg), Some(TypeData::Wildcard(_))))
                {
                    flags |= TagBits::HAS_DIRECT_WILDCARD;
                }
                flags
            }
            TypeData::Array { leaf, .. } => inherited(&mut std::iter::once(*leaf)),
            TypeData::TypeVariable(_) => TagBits::HAS_TYPE_VARIABLE,
            TypeData::Wildcard(shape) => inherited(&mut shape.all_bound_types().into_iter()),
            TypeData::Capture(shape) => {
                TagBits::HAS_CAPTURED_WILDCARD | inherited(&mut std::iter::once(shape.wildcard))
            }
            TypeData::Intersection(members) => inherited(&mut members.iter().copied()),
            TypeData::InferenceVariable(_) => TagBits::HAS_INFERENCE_VARIABLE,
        };

        let mut conflict = None;
        let mut own_null = None;
        if !annotations.is_empty() {
            flags |= TagBits::HAS_TYPE_ANNOTATIONS;
            let non_null = annotations.contains(&TypeAnnotation::NonNull);
            let nullable = annotations.contains(&TypeAnnotation::Nullable);
            match (non_null, nullable) {
                (true, true) => conflict = Some(NullConflict::OnType),
                (true, false) => own_null = Some(NullTag::NonNull),
                (false, true) => own_null = Some(NullTag::Nullable),
                (false, false) => {}
            }
            if non_null || nullable {
                flags |= TagBits::HAS_NULL_TYPE_ANNOTATION;
            }
        }

        // A wildcard inherits nullness from its bound: `? extends @NonNull X`
        // is non-null and `? super @Nullable X` is nullable.
        if let TypeData::Wildcard(shape) = data
            && let Some(bound) = shape.bound
        {
            let bound_null = self.flags(bound).null_tag();
            let inherited_null = match (shape.bound_kind, bound_null) {
                (BoundKind::Super, Some(NullTag::Nullable)) => Some(NullTag::Nullable),
                (BoundKind::Extends, Some(NullTag::NonNull)) => Some(NullTag::NonNull),
                _ => None,
            };
            if let Some(from_bound) = inherited_null {
                match own_null {
                    None if conflict.is_none() => own_null = Some(from_bound),
                    Some(own) if own != from_bound => {
                        conflict = Some(NullConflict::OnBound(bound));
                        own_null = None;
                    }
                    _ => {}
                }
            }
        }

        flags |= TagBits::from_null_tag(own_null);
        (flags, conflict)
    }

    /// Re-intern `id` with exactly `annotations`.
    pub fn with_annotations(&self, id: TypeId, annotations: TypeAnnotations) -> TypeId {
        let entry = self.entry(id);
        if entry.annotations == annotations {
            return id;
        }
        if annotations.is_empty() {
            return entry.unannotated;
        }
        self.intern_annotated(entry.data.clone(), annotations)
    }

    /// Replace the null annotation of `id`, keeping its other annotations.
    pub fn with_null_tag(&self, id: TypeId, tag: Option<NullTag>) -> TypeId {
        let entry = self.entry(id);
        let mut annotations: TypeAnnotations = entry
            .annotations
            .iter()
            .copied()
            .filter(|annotation| annotation.null_tag().is_none())
            .collect();
        if let Some(tag) = tag {
            annotations.insert(0, TypeAnnotation::from_null_tag(tag));
        }
        self.with_annotations(id, annotations)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Declare a top-level class or interface with the given type parameters.
    pub fn declare_class(&self, name: &str, kind: ClassKind, type_params: &[&str]) -> ClassId {
        self.declare_class_in(name, kind, None, type_params)
    }

    /// Declare a member class nested in `enclosing`.
    pub fn declare_member_class(
        &self,
        name: &str,
        kind: ClassKind,
        enclosing: ClassId,
        type_params: &[&str],
    ) -> ClassId {
        self.declare_class_in(name, kind, Some(enclosing), type_params)
    }

    fn declare_class_in(
        &self,
        name: &str,
        kind: ClassKind,
        enclosing: Option<ClassId>,
        type_params: &[&str],
    ) -> ClassId {
        let name = self.names.intern(name);
        let mut classes = write(&self.classes);
        let id = ClassId(classes.len() as u32);
        let params: SmallVec<[TypeVarId; 2]> = type_params
            .iter()
            .enumerate()
            .map(|(rank, param)| self.declare_type_var(param, TypeVarOwner::Class(id), rank as u32))
            .collect();
        classes.push(Arc::new(ClassDecl {
            name,
            kind,
            type_params: params,
            enclosing,
            supertypes: OnceCell::new(),
        }));
        drop(classes);

        write(&self.class_names).insert(name, id);
        trace!(class = id.0, name = %self.names.resolve(name), "declared class");
        id
    }

    /// Declare a type parameter of a generic method.
    pub fn declare_method_type_param(
        &self,
        class: ClassId,
        selector: &str,
        name: &str,
        rank: u32,
    ) -> TypeVarId {
        let selector = self.names.intern(selector);
        self.declare_type_var(name, TypeVarOwner::Method { class, selector }, rank)
    }

    fn declare_type_var(&self, name: &str, owner: TypeVarOwner, rank: u32) -> TypeVarId {
        let name = self.names.intern(name);
        let mut vars = write(&self.type_vars);
        let id = TypeVarId(vars.len() as u32);
        vars.push(Arc::new(TypeVarDecl {
            name,
            owner,
            rank,
            bounds: OnceCell::new(),
        }));
        id
    }

    /// Resolve the supertypes of a class. May be called once per class.
    pub fn set_supertypes(
        &self,
        class: ClassId,
        superclass: Option<TypeId>,
        interfaces: &[TypeId],
    ) -> Result<(), DeclarationError> {
        let decl = self
            .class_decl(class)
            .ok_or(DeclarationError::UnknownClass(class))?;
        for &ty in superclass.iter().chain(interfaces) {
            if !self.is_reference_type(ty) {
                return Err(DeclarationError::NotAReferenceType(ty));
            }
        }
        decl.supertypes
            .set(ClassSupertypes {
                superclass,
                interfaces: interfaces.iter().copied().collect(),
            })
            .map_err(|_| DeclarationError::SupertypesAlreadySet(class))
    }

    /// Resolve the bounds of a type parameter, in declaration order.
    ///
    /// A leading interface bound leaves `Object` as the superclass; any
    /// other leading bound becomes the superclass.
    pub fn set_bounds(&self, var: TypeVarId, bounds: &[TypeId]) -> Result<(), DeclarationError> {
        let decl = self
            .type_var_decl(var)
            .ok_or(DeclarationError::UnknownTypeVariable(var))?;
        for &bound in bounds {
            if !self.is_reference_type(bound) {
                return Err(DeclarationError::NotAReferenceType(bound));
            }
        }

        let resolved = match bounds.split_first() {
            None => TypeVarBounds::default(),
            Some((&first, _)) if self.is_interface(first) => TypeVarBounds {
                superclass: TypeId::OBJECT,
                interfaces: bounds.iter().copied().collect(),
                first_bound: Some(first),
            },
            Some((&first, rest)) => TypeVarBounds {
                superclass: first,
                interfaces: rest.iter().copied().collect(),
                first_bound: Some(first),
            },
        };
        decl.bounds
            .set(resolved)
            .map_err(|_| DeclarationError::BoundsAlreadySet(var))
    }

    pub fn class_decl(&self, class: ClassId) -> Option<Arc<ClassDecl>> {
        read(&self.classes).get(class.0 as usize).cloned()
    }

    pub fn type_var_decl(&self, var: TypeVarId) -> Option<Arc<TypeVarDecl>> {
        read(&self.type_vars).get(var.0 as usize).cloned()
    }

    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        let atom = self.names.intern(name);
        read(&self.class_names).get(&atom).copied()
    }

    pub fn class_name(&self, class: ClassId) -> Arc<str> {
        match self.class_decl(class) {
            Some(decl) => self.names.resolve(decl.name),
            None => Arc::from(""),
        }
    }

    pub fn type_params(&self, class: ClassId) -> SmallVec<[TypeVarId; 2]> {
        self.class_decl(class)
            .map(|decl| decl.type_params.clone())
            .unwrap_or_default()
    }

    /// Declared supertypes; classes never resolved extend `Object`.
    pub fn class_supertypes(&self, class: ClassId) -> ClassSupertypes {
        let Some(decl) = self.class_decl(class) else {
            return ClassSupertypes {
                superclass: Some(TypeId::OBJECT),
                interfaces: TypeList::new(),
            };
        };
        if let Some(supertypes) = decl.supertypes.get() {
            return supertypes.clone();
        }
        ClassSupertypes {
            superclass: (class != ClassId::OBJECT && !decl.is_interface())
                .then_some(TypeId::OBJECT),
            interfaces: TypeList::new(),
        }
    }

    /// Declared bounds; unresolved type parameters are bounded by `Object`.
    pub fn type_var_bounds(&self, var: TypeVarId) -> TypeVarBounds {
        self.type_var_decl(var)
            .and_then(|decl| decl.bounds.get().cloned())
            .unwrap_or_default()
    }

    pub fn is_interface_class(&self, class: ClassId) -> bool {
        self.class_decl(class).is_some_and(|decl| decl.is_interface())
    }

    // =========================================================================
    // Type constructors
    // =========================================================================

    /// The type of a declared class; for a generic class, its generic type.
    pub fn class_type(&self, class: ClassId) -> TypeId {
        self.intern(TypeData::Class(class))
    }

    pub fn raw(&self, class: ClassId) -> TypeId {
        self.intern(TypeData::Raw(class))
    }

    pub fn parameterized(&self, generic: ClassId, args: &[TypeId]) -> TypeId {
        self.parameterized_in(generic, args, None)
    }

    /// A parameterized member type of a parameterized or raw `enclosing`.
    pub fn parameterized_in(
        &self,
        generic: ClassId,
        args: &[TypeId],
        enclosing: Option<TypeId>,
    ) -> TypeId {
        if args.is_empty() && enclosing.is_none() {
            return self.class_type(generic);
        }
        self.intern(TypeData::Parameterized(ParameterizedShape {
            generic,
            args: args.iter().copied().collect(),
            enclosing,
        }))
    }

    /// Array of `dims` dimensions; nested arrays are flattened.
    pub fn array(&self, leaf: TypeId, dims: u8) -> TypeId {
        if dims == 0 {
            return leaf;
        }
        match self.lookup(leaf) {
            Some(TypeData::Array {
                leaf: inner,
                dims: inner_dims,
            }) => self.intern_annotated(
                TypeData::Array {
                    leaf: inner,
                    dims: inner_dims.saturating_add(dims),
                },
                TypeAnnotations::new(),
            ),
            _ => self.intern_annotated(TypeData::Array { leaf, dims }, TypeAnnotations::new()),
        }
    }

    pub fn type_param(&self, var: TypeVarId) -> TypeId {
        self.intern(TypeData::TypeVariable(var))
    }

    /// Type parameters of a generic class as types, in declaration order.
    pub fn type_param_types(&self, class: ClassId) -> TypeList {
        self.type_params(class)
            .into_iter()
            .map(|var| self.type_param(var))
            .collect()
    }

    /// Intern a wildcard. Requests with the same shape return the same id.
    pub fn wildcard(&self, shape: WildcardShape) -> TypeId {
        self.intern(TypeData::Wildcard(shape))
    }

    /// Intern an annotated wildcard, registering its unannotated sibling.
    pub fn wildcard_annotated(&self, shape: WildcardShape, annotations: TypeAnnotations) -> TypeId {
        self.intern_annotated(TypeData::Wildcard(shape), annotations)
    }

    /// Intersection type; nested intersections are flattened, duplicates
    /// removed, and a single member stands for itself.
    pub fn intersection(&self, members: &[TypeId]) -> TypeId {
        let mut flat = TypeList::new();
        for &member in members {
            match self.lookup(member) {
                Some(TypeData::Intersection(inner)) => {
                    for ty in inner {
                        if !flat.contains(&ty) {
                            flat.push(ty);
                        }
                    }
                }
                _ if !flat.contains(&member) => flat.push(member),
                _ => {}
            }
        }
        match flat.len() {
            0 => TypeId::OBJECT,
            1 => flat[0],
            _ => self.intern(TypeData::Intersection(flat)),
        }
    }

    /// A fresh inference variable; every call yields a distinct type.
    pub fn fresh_inference_variable(&self, name: &str) -> TypeId {
        let name = self.names.intern(name);
        let id = {
            let mut vars = write(&self.inference_vars);
            vars.push(name);
            InferenceVarId(vars.len() as u32 - 1)
        };
        self.intern(TypeData::InferenceVariable(id))
    }

    pub fn inference_variable_name(&self, var: InferenceVarId) -> Arc<str> {
        match read(&self.inference_vars).get(var.0 as usize) {
            Some(&name) => self.names.resolve(name),
            None => Arc::from(""),
        }
    }

    // =========================================================================
    // Shape queries
    // =========================================================================

    pub fn wildcard_shape(&self, id: TypeId) -> Option<WildcardShape> {
        match self.lookup(id)? {
            TypeData::Wildcard(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn capture_shape(&self, id: TypeId) -> Option<CaptureShape> {
        match self.lookup(id)? {
            TypeData::Capture(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn parameterized_shape(&self, id: TypeId) -> Option<ParameterizedShape> {
        match self.lookup(id)? {
            TypeData::Parameterized(shape) => Some(shape),
            _ => None,
        }
    }

    /// The declaration behind a class, raw or parameterized type.
    pub fn class_of(&self, id: TypeId) -> Option<ClassId> {
        match self.lookup(id)? {
            TypeData::Class(class) | TypeData::Raw(class) => Some(class),
            TypeData::Parameterized(shape) => Some(shape.generic),
            _ => None,
        }
    }

    pub fn is_interface(&self, id: TypeId) -> bool {
        self.class_of(id)
            .is_some_and(|class| self.is_interface_class(class))
    }

    pub fn is_wildcard(&self, id: TypeId) -> bool {
        matches!(self.lookup(id), Some(TypeData::Wildcard(_)))
    }

    pub fn is_capture(&self, id: TypeId) -> bool {
        matches!(self.lookup(id), Some(TypeData::Capture(_)))
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(self.lookup(id), Some(TypeData::Array { .. }))
    }

    /// Type parameters and captures.
    pub fn is_type_variable(&self, id: TypeId) -> bool {
        matches!(
            self.lookup(id),
            Some(TypeData::TypeVariable(_) | TypeData::Capture(_))
        )
    }

    pub fn is_problem(&self, id: TypeId) -> bool {
        matches!(self.lookup(id), Some(TypeData::Problem(_)))
    }

    pub fn is_reference_type(&self, id: TypeId) -> bool {
        !matches!(
            self.lookup(id),
            Some(TypeData::Base(_) | TypeData::Null | TypeData::Wildcard(_)) | None
        )
    }

    /// True for `Object`, also when annotated.
    pub fn is_object(&self, id: TypeId) -> bool {
        self.unannotated(id) == TypeId::OBJECT
    }

    /// Classification of a binding. Wildcards with other bounds and
    /// captures with several superinterfaces denote intersections.
    pub fn kind(&self, id: TypeId) -> BindingKind {
        match self.lookup(id) {
            None | Some(TypeData::Problem(_)) => BindingKind::ProblemType,
            Some(TypeData::Base(_)) => BindingKind::BaseType,
            Some(TypeData::Null) => BindingKind::NullType,
            Some(TypeData::Class(class)) => {
                if self.class_decl(class).is_some_and(|decl| decl.is_generic()) {
                    BindingKind::GenericType
                } else {
                    BindingKind::Type
                }
            }
            Some(TypeData::Raw(_)) => BindingKind::RawType,
            Some(TypeData::Parameterized(_)) => BindingKind::ParameterizedType,
            Some(TypeData::Array { .. }) => BindingKind::ArrayType,
            Some(TypeData::TypeVariable(_)) => BindingKind::TypeParameter,
            Some(TypeData::Wildcard(shape)) => {
                if shape.is_intersection() {
                    BindingKind::IntersectionType
                } else {
                    BindingKind::WildcardType
                }
            }
            Some(TypeData::Capture(shape)) => {
                let wildcard_is_intersection = self
                    .wildcard_shape(shape.wildcard)
                    .is_some_and(|wildcard| wildcard.is_intersection());
                if wildcard_is_intersection || self.capture_bounds(id).super_interfaces.len() > 1 {
                    BindingKind::IntersectionType
                } else {
                    BindingKind::WildcardType
                }
            }
            Some(TypeData::Intersection(_)) => BindingKind::IntersectionType,
            Some(TypeData::InferenceVariable(_)) => BindingKind::InferenceVariable,
        }
    }

    // =========================================================================
    // Captures
    // =========================================================================

    /// The capture of `wildcard` at `site`.
    ///
    /// Returns the capture already created for this wildcard and recapture
    /// identity in the current pass. A capture recorded for the same span
    /// but another compilation unit is stale and gets replaced. An annotated
    /// wildcard yields the annotated variant of the unannotated capture.
    pub fn captured_wildcard(&self, wildcard: TypeId, site: CaptureSite) -> TypeId {
        let entry = self.entry(wildcard);
        let base = entry.unannotated;

        let capture = {
            let mut known = self.captures.entry(base).or_default();
            let mut found = None;
            known.retain(|existing| {
                let Some(shape) = self.capture_shape(*existing) else {
                    return false;
                };
                if shape.source_type != site.source_type
                    || shape.start != site.start
                    || shape.end != site.end
                {
                    return true;
                }
                if shape.cud == site.cud {
                    found = Some(*existing);
                    true
                } else {
                    debug!(
                        capture = existing.0,
                        stale_cud = shape.cud.0,
                        cud = site.cud.0,
                        "evicting capture from another compilation unit"
                    );
                    false
                }
            });
            match found {
                Some(existing) => existing,
                None => {
                    let capture_id = self.next_capture_id.fetch_add(1, Ordering::Relaxed);
                    let capture = self.intern(TypeData::Capture(CaptureShape {
                        wildcard: base,
                        source_type: site.source_type,
                        start: site.start,
                        end: site.end,
                        cud: site.cud,
                        capture_id,
                    }));
                    trace!(capture = capture.0, capture_id, wildcard = base.0, "created capture");
                    known.push(capture);
                    capture
                }
            }
        };

        if entry.annotations.is_empty() {
            capture
        } else {
            self.with_annotations(capture, entry.annotations.clone())
        }
    }

    /// Bounds of a capture; uninitialized captures are bounded by `Object`.
    pub fn capture_bounds(&self, capture: TypeId) -> CaptureBounds {
        let base = self.unannotated(capture);
        self.entry(base)
            .capture_bounds
            .get()
            .cloned()
            .unwrap_or_else(CaptureBounds::object)
    }

    pub fn has_capture_bounds(&self, capture: TypeId) -> bool {
        let base = self.unannotated(capture);
        self.entry(base).capture_bounds.get().is_some()
    }

    /// Fill the bounds of a capture. Returns false when they were already set.
    pub fn set_capture_bounds(&self, capture: TypeId, bounds: CaptureBounds) -> bool {
        let base = self.unannotated(capture);
        self.entry(base).capture_bounds.set(bounds).is_ok()
    }

    /// A copy of `capture` over another wildcard, used when substitution
    /// rewrites the captured wildcard. The copy keeps the recapture identity
    /// and display number but is not registered for recapture.
    pub fn clone_capture(&self, capture: TypeId, wildcard: TypeId) -> TypeId {
        let Some(shape) = self.capture_shape(capture) else {
            return capture;
        };
        self.intern(TypeData::Capture(CaptureShape {
            wildcard: self.unannotated(wildcard),
            ..shape
        }))
    }

    /// Number of captures reachable through recapture identity.
    pub fn live_captures(&self) -> usize {
        self.captures.iter().map(|known| known.len()).sum()
    }

    /// Forget every capture of the current pass and restart numbering.
    pub fn reset(&self) {
        self.captures.clear();
        self.next_capture_id.store(1, Ordering::Relaxed);
        debug!("capture cache reset");
    }

    /// Forget the captures created for one compilation unit.
    pub fn discard_compilation_unit(&self, cud: CompilationUnitId) {
        self.captures.retain(|_, known| {
            known.retain(|capture| {
                self.capture_shape(*capture)
                    .is_some_and(|shape| shape.cud != cud)
            });
            !known.is_empty()
        });
        debug!(cud = cud.0, "discarded compilation unit captures");
    }

    // =========================================================================
    // Wildcard supertypes
    // =========================================================================

    /// Cached `(superclass, superinterfaces)` of a wildcard, computed by `f`.
    pub(crate) fn wildcard_supers_with(
        &self,
        wildcard: TypeId,
        f: impl FnOnce() -> (TypeId, TypeList),
    ) -> (TypeId, TypeList) {
        let base = self.unannotated(wildcard);
        self.entry(base).wildcard_supers.get_or_init(f).clone()
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/intern_tests.rs"]
mod tests;
