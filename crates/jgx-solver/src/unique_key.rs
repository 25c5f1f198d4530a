//! Unique keys: deterministic strings identifying a binding across
//! compilation units.
//!
//! Consumers persist these verbatim, so every byte of the encoding is
//! fixed:
//!
//! | binding       | key                                                  |
//! |---------------|------------------------------------------------------|
//! | wildcard      | `<genericKey>{<rank>}` + `*` / `+<bound>` / `-<bound>` |
//! | capture       | leaf: `<sourceKey>&`, then `!<wildcardKey><end>;`    |
//! | class         | `Lp/X;`, a generic leaf `Lp/X<TT;>;`                 |
//! | parameterized | `Lp/X<args>;`                                        |
//! | raw           | `Lp/X<>;`                                            |
//! | array         | `[` per dimension, then the leaf                     |
//! | type variable | `<declaringKey>:T<name>;`                            |
//! | inference var | `^<name>;`                                           |

use crate::intern::TypeInterner;
use crate::types::*;
use std::fmt::Write;

/// Compute the unique key of `ty`. `is_leaf` is true when the key is
/// requested for `ty` itself rather than as part of an enclosing key.
pub fn compute_unique_key(interner: &TypeInterner, ty: TypeId, is_leaf: bool) -> String {
    let mut key = String::new();
    KeyWriter { interner }.write(&mut key, ty, is_leaf);
    key
}

struct KeyWriter<'a> {
    interner: &'a TypeInterner,
}

impl KeyWriter<'_> {
    fn write(&self, out: &mut String, ty: TypeId, is_leaf: bool) {
        let Some(data) = self.interner.lookup(ty) else {
            return;
        };
        match data {
            TypeData::Base(kind) => out.push(kind.descriptor()),
            TypeData::Null => out.push('N'),
            TypeData::Problem(_) => out.push_str("Ljava/lang/Object;"),
            TypeData::Class(class) => {
                self.write_class_prefix(out, class);
                if is_leaf {
                    let params = self.interner.type_params(class);
                    if !params.is_empty() {
                        out.push('<');
                        for var in params {
                            self.write_variable_signature(out, var);
                        }
                        out.push('>');
                    }
                }
                out.push(';');
            }
            TypeData::Raw(class) => {
                self.write_class_prefix(out, class);
                out.push_str("<>;");
            }
            TypeData::Parameterized(shape) => self.write_parameterized(out, &shape),
            TypeData::Array { leaf, dims } => {
                for _ in 0..dims {
                    out.push('[');
                }
                self.write(out, leaf, false);
            }
            TypeData::TypeVariable(var) => self.write_variable(out, var),
            TypeData::Wildcard(shape) => self.write_wildcard(out, &shape),
            TypeData::Capture(shape) => {
                if is_leaf {
                    self.write(out, shape.source_type, false);
                    out.push('&');
                }
                out.push('!');
                self.write(out, shape.wildcard, false);
                let _ = write!(out, "{};", shape.end);
            }
            TypeData::Intersection(members) => {
                for member in members {
                    self.write(out, member, false);
                }
            }
            TypeData::InferenceVariable(var) => {
                let _ = write!(out, "^{};", self.interner.inference_variable_name(var));
            }
        }
    }

    /// `Lp/X`: the class key without its trailing `;`.
    fn write_class_prefix(&self, out: &mut String, class: ClassId) {
        out.push('L');
        out.push_str(&self.interner.class_name(class));
    }

    fn write_parameterized(&self, out: &mut String, shape: &ParameterizedShape) {
        let start = out.len();
        match shape.enclosing {
            Some(enclosing) if !self.interner.is_capture(enclosing) => {
                self.write(out, enclosing, false);
                if out.ends_with(';') {
                    out.pop();
                }
                out.push('.');
                out.push_str(&simple_name(&self.interner.class_name(shape.generic)));
            }
            _ => self.write_class_prefix(out, shape.generic),
        }

        let mut capture_source = None;
        out.push('<');
        for &arg in &shape.args {
            self.write(out, arg, false);
            if let Some(capture) = self.interner.capture_shape(arg) {
                capture_source = Some(capture.source_type);
            }
        }
        out.push_str(">;");

        // A capture from another type is anchored to its source type.
        let generic = self.interner.class_type(shape.generic);
        if let Some(source) = capture_source
            && self.interner.unannotated(source) != generic
        {
            let mut prefix = String::new();
            self.write(&mut prefix, source, false);
            prefix.push('&');
            out.insert_str(start, &prefix);
        }
    }

    fn write_wildcard(&self, out: &mut String, shape: &WildcardShape) {
        if let Some(generic) = shape.generic {
            self.write(out, self.interner.class_type(generic), false);
        }
        let _ = write!(out, "{{{}}}", shape.rank);
        match (shape.bound_kind, shape.bound) {
            (BoundKind::Extends, Some(bound)) => {
                out.push('+');
                self.write(out, bound, false);
            }
            (BoundKind::Super, Some(bound)) => {
                out.push('-');
                self.write(out, bound, false);
            }
            _ => out.push('*'),
        }
    }

    fn write_variable(&self, out: &mut String, var: TypeVarId) {
        let Some(decl) = self.interner.type_var_decl(var) else {
            return;
        };
        match decl.owner {
            TypeVarOwner::Class(class) => {
                self.write(out, self.interner.class_type(class), false);
            }
            TypeVarOwner::Method { class, selector } => {
                self.write(out, self.interner.class_type(class), false);
                out.push('.');
                out.push_str(&self.interner.resolve_name(selector));
            }
        }
        out.push(':');
        self.write_variable_signature(out, var);
    }

    fn write_variable_signature(&self, out: &mut String, var: TypeVarId) {
        if let Some(decl) = self.interner.type_var_decl(var) {
            let _ = write!(out, "T{};", self.interner.resolve_name(decl.name));
        }
    }
}

/// Simple name of an internal class name: `p/Outer$Inner` gives `Inner`.
pub(crate) fn simple_name(name: &str) -> &str {
    let start = name
        .rfind(['/', '$'])
        .map(|index| index + 1)
        .unwrap_or(0);
    &name[start..]
}

#[cfg(test)]
#[path = "tests/unique_key_tests.rs"]
mod tests;
