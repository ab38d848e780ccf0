//! Recursion: a placeholder bound to its body after construction, so
//! grammars can refer to themselves.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::fixpoint::Worklist;
use crate::graph::{Label, TermGraph, TermId};
use crate::term::{deferred, Attrs, Combinator, Parser, Terminal, Value};

pub(crate) struct Recur<T: Terminal, A: Value> {
    attrs: Attrs<T, A>,
    body: RefCell<Option<Parser<T, A>>>,
}

impl<T: Terminal, A: Value> Recur<T, A> {
    fn body(&self) -> Result<Parser<T, A>> {
        self.body.borrow().clone().ok_or(Error::UnboundRecursion(self.attrs.id))
    }
}

/// A handle for building a self-referential grammar.
///
/// Create the handle, use [`Recursion::parser`] wherever the grammar refers
/// to itself, then [`Recursion::bind`] the body exactly once. Querying the
/// parser before binding fails with [`Error::UnboundRecursion`]; binding
/// twice fails with [`Error::AlreadyBound`].
pub struct Recursion<T: Terminal, A: Value> {
    node: Rc<Recur<T, A>>,
}

/// Creates an unbound recursion handle.
pub fn recursion<T: Terminal, A: Value>() -> Recursion<T, A> {
    Recursion { node: Rc::new(Recur { attrs: Attrs::open(), body: RefCell::new(None) }) }
}

impl<T: Terminal, A: Value> Recursion<T, A> {
    /// The recursion as a grammar term, usable inside its own body.
    pub fn parser(&self) -> Parser<T, A> {
        Parser(Rc::clone(&self.node) as Rc<dyn Combinator<T, A>>)
    }

    /// Binds the body. Allowed exactly once; the binding is permanent.
    pub fn bind(&self, body: Parser<T, A>) -> Result<()> {
        let mut slot = self.node.body.borrow_mut();
        if slot.is_some() {
            return Err(Error::AlreadyBound(self.node.attrs.id));
        }
        *slot = Some(body);
        Ok(())
    }
}

impl<T: Terminal, A: Value> Clone for Recursion<T, A> {
    fn clone(&self) -> Self {
        Recursion { node: Rc::clone(&self.node) }
    }
}

impl<T: Terminal, A: Value> Combinator<T, A> for Recur<T, A> {
    fn attrs(&self) -> &Attrs<T, A> {
        &self.attrs
    }

    fn label(&self) -> Label {
        Label::Recursive
    }

    fn derive_inner(&self, _me: &Parser<T, A>, t: &T) -> Result<Parser<T, A>> {
        // Deriving through a cycle must not recurse into the body here:
        // hand back a pending derivative and let attribute queries force it
        // once memoization can catch the loop.
        Ok(deferred::make(self.body()?, t.clone()))
    }

    fn enlist_children(&self, _me: &Parser<T, A>, work: &mut Worklist) -> Result<()> {
        self.body()?.enlist(work)
    }

    fn refresh(&self) -> bool {
        // Attributes mirror the body's.
        match &*self.body.borrow() {
            Some(body) => self.attrs.store(
                body.current_empty(),
                body.current_nullable(),
                body.current_parse_null(),
            ),
            None => false,
        }
    }

    fn child_ids(&self) -> Result<Vec<TermId>> {
        Ok(vec![self.body()?.id()])
    }

    fn walk_children(&self, graph: &mut TermGraph) -> Result<()> {
        self.body()?.walk(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{alt, epsilon, terminal};
    use crate::Error;

    #[test]
    fn unbound_recursion_fails_deterministically() {
        let rec = recursion::<char, char>();
        let parser = rec.parser();
        let id = parser.id();
        assert_eq!(parser.is_empty(), Err(Error::UnboundRecursion(id)));
        assert_eq!(parser.derive(&'a'), Err(Error::UnboundRecursion(id)));
        assert_eq!(parser.parse_full(&['a']), Err(Error::UnboundRecursion(id)));
        assert!(parser.graph().is_err());
    }

    #[test]
    fn binding_twice_is_rejected() {
        let rec = recursion::<char, char>();
        rec.bind(terminal('a')).expect("first bind succeeds");
        assert_eq!(rec.bind(terminal('b')), Err(Error::AlreadyBound(rec.parser().id())));
    }

    #[test]
    fn binding_after_a_failed_query_recovers() {
        let rec = recursion::<char, char>();
        let parser = rec.parser();
        assert!(parser.derive(&'a').is_err());

        rec.bind(alt([terminal('a'), epsilon(['e'])])).expect("bind succeeds");
        assert!(parser.parse_full(&['a']).unwrap().contains(&'a'));
    }

    #[test]
    fn recursion_mirrors_its_body() {
        let rec = recursion::<char, char>();
        rec.bind(epsilon(['x'])).expect("bind succeeds");
        let parser = rec.parser();
        assert!(!parser.is_empty().unwrap());
        assert!(parser.is_nullable().unwrap());
        assert!(parser.parse_null().unwrap().contains(&'x'));
    }
}
