//! The empty-string language, seeded with the values a null parse yields.

use indexmap::IndexSet;
use std::rc::Rc;

use crate::error::Result;
use crate::graph::Label;
use crate::term::{empty, Attrs, Combinator, Parser, Terminal, Value};

pub(crate) struct Epsilon<T: Terminal, A: Value> {
    attrs: Attrs<T, A>,
}

/// The parser of the empty string. Matches only the empty input and yields
/// every seed value. Seeds should be non-empty; an epsilon with no seeds
/// claims to match ε yet produces no parse.
pub fn epsilon<T: Terminal, A: Value>(seeds: impl IntoIterator<Item = A>) -> Parser<T, A> {
    let seeds: IndexSet<A> = seeds.into_iter().collect();
    Parser(Rc::new(Epsilon { attrs: Attrs::settled(false, true, seeds) }))
}

impl<T: Terminal, A: Value> Combinator<T, A> for Epsilon<T, A> {
    fn attrs(&self) -> &Attrs<T, A> {
        &self.attrs
    }

    fn label(&self) -> Label {
        Label::EmptyString
    }

    fn derive_inner(&self, _me: &Parser<T, A>, _t: &T) -> Result<Parser<T, A>> {
        // ε followed by anything is no longer ε.
        Ok(empty())
    }
}
