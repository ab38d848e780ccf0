//! The empty language: recognizes nothing.

use indexmap::IndexSet;
use std::rc::Rc;

use crate::error::Result;
use crate::graph::Label;
use crate::term::{Attrs, Combinator, Parser, Terminal, Value};

pub(crate) struct Empty<T: Terminal, A: Value> {
    attrs: Attrs<T, A>,
}

/// The parser of the empty language. Never matches anything, including the
/// empty input.
pub fn empty<T: Terminal, A: Value>() -> Parser<T, A> {
    Parser(Rc::new(Empty { attrs: Attrs::settled(true, false, IndexSet::new()) }))
}

impl<T: Terminal, A: Value> Combinator<T, A> for Empty<T, A> {
    fn attrs(&self) -> &Attrs<T, A> {
        &self.attrs
    }

    fn label(&self) -> Label {
        Label::EmptySet
    }

    fn derive_inner(&self, me: &Parser<T, A>, _t: &T) -> Result<Parser<T, A>> {
        // The derivative of nothing is nothing, and identity is preserved.
        Ok(me.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_recognizes_nothing() {
        let nothing = empty::<char, char>();
        assert!(nothing.is_empty().unwrap());
        assert!(!nothing.is_nullable().unwrap());
        assert!(nothing.parse_null().unwrap().is_empty());
        assert!(nothing.parse_full(&[]).unwrap().is_empty());
        assert!(nothing.parse_full(&['a']).unwrap().is_empty());
    }

    #[test]
    fn empty_derives_to_itself() {
        let nothing = empty::<char, char>();
        let derived = nothing.derive(&'x').unwrap();
        assert_eq!(derived.id(), nothing.id(), "identity is preserved");
    }
}
