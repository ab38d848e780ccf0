//! The single-terminal parser.

use indexmap::IndexSet;
use std::rc::Rc;

use crate::error::Result;
use crate::graph::Label;
use crate::term::{empty, epsilon, Attrs, Combinator, Parser, Terminal};

pub(crate) struct Literal<T: Terminal> {
    attrs: Attrs<T, T>,
    symbol: T,
}

/// A parser matching exactly one terminal; the value produced is the
/// matched terminal itself.
pub fn terminal<T: Terminal>(symbol: T) -> Parser<T, T> {
    Parser(Rc::new(Literal { attrs: Attrs::settled(false, false, IndexSet::new()), symbol }))
}

impl<T: Terminal> Combinator<T, T> for Literal<T> {
    fn attrs(&self) -> &Attrs<T, T> {
        &self.attrs
    }

    fn label(&self) -> Label {
        Label::Terminal
    }

    fn derive_inner(&self, _me: &Parser<T, T>, t: &T) -> Result<Parser<T, T>> {
        if *t == self.symbol {
            // Consuming the terminal leaves ε, carrying the terminal as the
            // parse value.
            Ok(epsilon([t.clone()]))
        } else {
            Ok(empty())
        }
    }
}
