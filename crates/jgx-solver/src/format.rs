//! Name and signature views of bindings.
//!
//! - `debug_name`: qualified names with type annotations, for logs.
//! - `readable_name`: qualified source names (`java.util.List<java.lang.String>`).
//! - `short_readable_name`: simple source names (`List<String>`).
//! - `signature`: the erased descriptor (`Ljava/util/List;`).
//! - `generic_signature`: the generic descriptor (`Ljava/util/List<TE;>;`).
//!
//! Captures render as `capture#N-of <wildcard>`. The generic signature of a
//! capture is that of its first bound, which can lead back to the capture
//! itself for F-bounded variables; a re-entered capture renders as
//! `Ljava/lang/Object;`.

use crate::hierarchy::erasure;
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::types::*;
use crate::unique_key::simple_name;
use std::fmt::Write;

const OBJECT_SIGNATURE: &str = "Ljava/lang/Object;";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NameStyle {
    Debug,
    Readable,
    Short,
}

pub fn debug_name(interner: &TypeInterner, ty: TypeId) -> String {
    render_name(interner, ty, NameStyle::Debug)
}

pub fn readable_name(interner: &TypeInterner, ty: TypeId) -> String {
    render_name(interner, ty, NameStyle::Readable)
}

pub fn short_readable_name(interner: &TypeInterner, ty: TypeId) -> String {
    render_name(interner, ty, NameStyle::Short)
}

fn render_name(interner: &TypeInterner, ty: TypeId, style: NameStyle) -> String {
    let mut out = String::new();
    NameWriter { interner, style }.write(&mut out, ty);
    out
}

struct NameWriter<'a> {
    interner: &'a TypeInterner,
    style: NameStyle,
}

impl NameWriter<'_> {
    fn write(&self, out: &mut String, ty: TypeId) {
        let entry = self.interner.entry(ty);
        if self.style == NameStyle::Debug {
            for annotation in &entry.annotations {
                match annotation {
                    TypeAnnotation::NonNull => out.push_str("@NonNull "),
                    TypeAnnotation::Nullable => out.push_str("@Nullable "),
                    TypeAnnotation::Named(name) => {
                        let name = self.interner.resolve_name(*name);
                        let _ = write!(out, "@{} ", simple_name(&name));
                    }
                }
            }
        }
        match &entry.data {
            TypeData::Base(kind) => out.push_str(kind.keyword()),
            TypeData::Null => out.push_str("null"),
            TypeData::Problem(ProblemReason::Error) => out.push_str("<error>"),
            TypeData::Problem(ProblemReason::ParameterBoundMismatch) => {
                out.push_str("<bound mismatch>")
            }
            TypeData::Class(class) => {
                self.write_class(out, *class);
                let params = self.interner.type_params(*class);
                if !params.is_empty() {
                    out.push('<');
                    for (i, var) in params.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        self.write(out, self.interner.type_param(*var));
                    }
                    out.push('>');
                }
            }
            TypeData::Raw(class) => self.write_class(out, *class),
            TypeData::Parameterized(shape) => {
                match shape.enclosing {
                    Some(enclosing) => {
                        self.write(out, enclosing);
                        out.push('.');
                        out.push_str(simple_name(&self.interner.class_name(shape.generic)));
                    }
                    None => self.write_class(out, shape.generic),
                }
                out.push('<');
                for (i, &arg) in shape.args.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write(out, arg);
                }
                out.push('>');
            }
            TypeData::Array { leaf, dims } => {
                self.write(out, *leaf);
                for _ in 0..*dims {
                    out.push_str("[]");
                }
            }
            TypeData::TypeVariable(var) => {
                if let Some(decl) = self.interner.type_var_decl(*var) {
                    out.push_str(&self.interner.resolve_name(decl.name));
                }
            }
            TypeData::Wildcard(shape) => self.write_wildcard(out, shape),
            TypeData::Capture(shape) => {
                let _ = write!(out, "capture#{}-of ", shape.capture_id);
                self.write(out, shape.wildcard);
            }
            TypeData::Intersection(members) => {
                for (i, &member) in members.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" & ");
                    }
                    self.write(out, member);
                }
            }
            TypeData::InferenceVariable(var) => {
                out.push_str(&self.interner.inference_variable_name(*var));
            }
        }
    }

    fn write_class(&self, out: &mut String, class: ClassId) {
        let name = self.interner.class_name(class);
        match self.style {
            NameStyle::Short => out.push_str(&member_name(&name)),
            NameStyle::Debug | NameStyle::Readable => out.push_str(&name.replace(['/', '$'], ".")),
        }
    }

    /// `?`, `? extends B`, `? super B`; an intersection wildcard renders as
    /// its bounds joined by `&`.
    fn write_wildcard(&self, out: &mut String, shape: &WildcardShape) {
        match (shape.bound_kind, shape.bound, &shape.other_bounds) {
            (BoundKind::Extends, Some(bound), Some(others)) => {
                self.write(out, bound);
                for &other in others {
                    out.push('&');
                    self.write(out, other);
                }
            }
            (BoundKind::Extends, Some(bound), None) => {
                out.push_str("? extends ");
                self.write(out, bound);
            }
            (BoundKind::Super, Some(bound), _) => {
                out.push_str("? super ");
                self.write(out, bound);
            }
            _ => out.push('?'),
        }
    }
}

/// Source name of a class without its package: `p/Outer$Inner` gives
/// `Outer.Inner`.
fn member_name(name: &str) -> String {
    let start = name.rfind('/').map(|index| index + 1).unwrap_or(0);
    name[start..].replace('$', ".")
}

// =============================================================================
// Signatures
// =============================================================================

/// The erased signature of `ty`.
pub fn signature(interner: &TypeInterner, ty: TypeId) -> String {
    let erased = erasure(interner, ty);
    let mut out = String::new();
    match interner.lookup(erased) {
        Some(TypeData::Array { leaf, dims }) => {
            for _ in 0..dims {
                out.push('[');
            }
            write_erased(interner, &mut out, leaf);
        }
        _ => write_erased(interner, &mut out, erased),
    }
    out
}

fn write_erased(interner: &TypeInterner, out: &mut String, ty: TypeId) {
    match interner.lookup(ty) {
        Some(TypeData::Base(kind)) => out.push(kind.descriptor()),
        Some(TypeData::Class(class) | TypeData::Raw(class)) => {
            let _ = write!(out, "L{};", interner.class_name(class));
        }
        _ => out.push_str(OBJECT_SIGNATURE),
    }
}

/// The generic signature of `ty`.
pub fn generic_signature(interner: &TypeInterner, ty: TypeId) -> String {
    let mut out = String::new();
    let mut writer = SignatureWriter {
        interner,
        guard: RecursionGuard::with_profile(RecursionProfile::Render),
    };
    writer.write(&mut out, ty);
    out
}

struct SignatureWriter<'a> {
    interner: &'a TypeInterner,
    guard: RecursionGuard<TypeId>,
}

impl SignatureWriter<'_> {
    fn write(&mut self, out: &mut String, ty: TypeId) {
        let Some(data) = self.interner.lookup(ty) else {
            out.push_str(OBJECT_SIGNATURE);
            return;
        };
        match data {
            TypeData::Base(kind) => out.push(kind.descriptor()),
            TypeData::Null | TypeData::Problem(_) => out.push_str(OBJECT_SIGNATURE),
            TypeData::Class(class) => {
                let _ = write!(out, "L{}", self.interner.class_name(class));
                let params = self.interner.type_params(class);
                if !params.is_empty() {
                    out.push('<');
                    for var in params {
                        self.write(out, self.interner.type_param(var));
                    }
                    out.push('>');
                }
                out.push(';');
            }
            TypeData::Raw(class) => {
                let _ = write!(out, "L{};", self.interner.class_name(class));
            }
            TypeData::Parameterized(shape) => {
                match shape.enclosing {
                    Some(enclosing) => {
                        self.write(out, enclosing);
                        if out.ends_with(';') {
                            out.pop();
                        }
                        out.push('.');
                        out.push_str(simple_name(&self.interner.class_name(shape.generic)));
                    }
                    None => {
                        let _ = write!(out, "L{}", self.interner.class_name(shape.generic));
                    }
                }
                out.push('<');
                for arg in shape.args {
                    self.write(out, arg);
                }
                out.push_str(">;");
            }
            TypeData::Array { leaf, dims } => {
                for _ in 0..dims {
                    out.push('[');
                }
                self.write(out, leaf);
            }
            TypeData::TypeVariable(var) => {
                if let Some(decl) = self.interner.type_var_decl(var) {
                    let _ = write!(out, "T{};", self.interner.resolve_name(decl.name));
                }
            }
            TypeData::Wildcard(shape) => match (shape.bound_kind, shape.bound) {
                (BoundKind::Extends, Some(bound)) => {
                    out.push('+');
                    self.write(out, bound);
                }
                (BoundKind::Super, Some(bound)) => {
                    out.push('-');
                    self.write(out, bound);
                }
                _ => out.push('*'),
            },
            TypeData::Capture(_) => {
                let key = self.interner.unannotated(ty);
                match self.interner.capture_bounds(ty).first_bound {
                    Some(first) if self.guard.enter(key).is_entered() => {
                        self.write(out, first);
                        self.guard.leave(key);
                    }
                    _ => out.push_str(OBJECT_SIGNATURE),
                }
            }
            TypeData::Intersection(members) => match members.first() {
                Some(&first) => self.write(out, first),
                None => out.push_str(OBJECT_SIGNATURE),
            },
            TypeData::InferenceVariable(var) => {
                let _ = write!(out, "^{};", self.interner.inference_variable_name(var));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
