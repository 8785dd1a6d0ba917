//! Small lookups over lopdf objects

use lopdf::content::Operation;
use lopdf::{Dictionary, Document, Object};
use pdfdiff_geom::Matrix;

use crate::{ContentError, Result};

/// Reference chains longer than this are treated as broken
const MAX_REFERENCE_HOPS: usize = 16;

/// Follow indirect references until a direct object is reached
pub(crate) fn resolve<'a>(doc: &'a Document, mut obj: &'a Object) -> Option<&'a Object> {
    for _ in 0..MAX_REFERENCE_HOPS {
        match obj {
            Object::Reference(id) => obj = doc.get_object(*id).ok()?,
            direct => return Some(direct),
        }
    }
    None
}

/// Dictionary entry with references resolved
pub(crate) fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    resolve(doc, dict.get(key).ok()?)
}

pub(crate) fn get_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    match get(doc, dict, key)? {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

/// Entry looked up on the dictionary or, failing that, its `/Parent` chain
pub(crate) fn inherited<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = dict;
    for _ in 0..MAX_REFERENCE_HOPS {
        if let Some(value) = get(doc, current, key) {
            return Some(value);
        }
        current = get_dict(doc, current, b"Parent")?;
    }
    None
}

pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Array of numbers, resolving the array and its elements
pub(crate) fn numbers(doc: &Document, obj: &Object) -> Option<Vec<f64>> {
    match resolve(doc, obj)? {
        Object::Array(items) => items
            .iter()
            .map(|item| resolve(doc, item).and_then(number))
            .collect(),
        _ => None,
    }
}

pub(crate) fn name(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::Name(n) => Some(n.as_slice()),
        _ => None,
    }
}

/// Numeric operand `index` of `op`
pub(crate) fn operand(op: &Operation, index: usize) -> Result<f64> {
    op.operands
        .get(index)
        .and_then(number)
        .ok_or_else(|| invalid(op, index))
}

/// Six numeric operands forming a matrix (`cm`, `Tm`)
pub(crate) fn operand_matrix(op: &Operation) -> Result<Matrix> {
    Ok(Matrix::new(
        operand(op, 0)?,
        operand(op, 1)?,
        operand(op, 2)?,
        operand(op, 3)?,
        operand(op, 4)?,
        operand(op, 5)?,
    ))
}

pub(crate) fn invalid(op: &Operation, index: usize) -> ContentError {
    ContentError::InvalidOperand {
        operator: op.operator.clone(),
        index,
    }
}

/// Matrix stored as a six-number array (form `/Matrix`, etc.)
pub(crate) fn matrix_from(doc: &Document, obj: &Object) -> Option<Matrix> {
    match numbers(doc, obj)?.as_slice() {
        [a, b, c, d, e, f] => Some(Matrix::new(*a, *b, *c, *d, *e, *f)),
        _ => None,
    }
}
