//! Pending derivatives.
//!
//! A `Deferred` term stands for "the derivative of `base` by `terminal`"
//! without computing it. Two places need that laziness:
//!
//! - deriving through a recursion: the derivative of a cycle must come back
//!   as a thunk, or construction would chase the cycle before the memo
//!   could catch it;
//! - re-entrant derivation: when a derivative's construction reaches itself
//!   again (cyclic derivative graphs), the memo hands the inner caller a
//!   shared `Deferred` that resolves once the outer construction lands.
//!
//! A deferred term is never inlined eagerly. Every query resolves the
//! target through the base's memo — structurally, down the chain of
//! deferred bases, so a pending slot is never consulted for its own
//! resolution — and while the target is still under construction the
//! attribute engine simply leaves the term's attributes provisional.

use std::rc::Rc;

use crate::error::Result;
use crate::fixpoint::Worklist;
use crate::graph::{Label, TermGraph, TermId};
use crate::term::{Attrs, Combinator, MemoState, Parser, Terminal, Value};

pub(crate) struct Deferred<T: Terminal, A: Value> {
    attrs: Attrs<T, A>,
    base: Parser<T, A>,
    terminal: T,
}

pub(crate) fn make<T: Terminal, A: Value>(base: Parser<T, A>, terminal: T) -> Parser<T, A> {
    Parser(Rc::new(Deferred { attrs: Attrs::open(), base, terminal }))
}

/// The pending derivative of `child` by `t`. Constructed internally when a
/// derivative must stay lazy; exposed for callers assembling derivative
/// graphs by hand.
pub fn derivative_future<T: Terminal, A: Value>(child: Parser<T, A>, t: T) -> Parser<T, A> {
    make(child, t)
}

impl<T: Terminal, A: Value> Deferred<T, A> {
    /// The finished derivative this term stands for, or `None` while it is
    /// still under construction. With `force`, an absent derivative is
    /// constructed on the spot.
    fn target(&self, my_id: TermId, force: bool) -> Result<Option<Parser<T, A>>> {
        Ok(self.resolve(my_id, force)?.filter(|target| target.id() != my_id))
    }

    fn resolve(&self, my_id: TermId, force: bool) -> Result<Option<Parser<T, A>>> {
        // Fast path: the base's memo already holds the finished derivative.
        // A slot aliasing this term itself (a chained deferral) resolves
        // structurally below instead.
        match self.base.memo_state(&self.terminal) {
            MemoState::Ready(target) if target.id() != my_id => return Ok(Some(target)),
            MemoState::Pending => return Ok(None),
            _ => {}
        }

        // Resolve the base first, so a chain of deferrals bottoms out at a
        // real term before we derive through it.
        let base = match self.base.stand_in(force)? {
            Some(base) => base,
            None => return Ok(None),
        };
        if base.id() == self.base.id() {
            // Plain base with no memo entry: the derivative has simply not
            // been requested yet.
            if force {
                return self.base.derive(&self.terminal).map(Some);
            }
            return Ok(None);
        }
        match base.memo_state(&self.terminal) {
            MemoState::Ready(target) => Ok(Some(target)),
            MemoState::Pending => Ok(None),
            MemoState::Absent => {
                if force {
                    base.derive(&self.terminal).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }
}

impl<T: Terminal, A: Value> Combinator<T, A> for Deferred<T, A> {
    fn attrs(&self) -> &Attrs<T, A> {
        &self.attrs
    }

    fn label(&self) -> Label {
        Label::Future
    }

    fn derive_inner(&self, me: &Parser<T, A>, t: &T) -> Result<Parser<T, A>> {
        match self.target(me.id(), true)? {
            Some(target) => target.derive(t),
            // Still under construction: defer one level further; the chain
            // resolves from the bottom once the base derivative lands.
            None => Ok(make(me.clone(), t.clone())),
        }
    }

    fn enlist_children(&self, me: &Parser<T, A>, work: &mut Worklist) -> Result<()> {
        match self.target(me.id(), true)? {
            Some(target) => target.enlist(work),
            None => {
                work.mark_unresolved();
                Ok(())
            }
        }
    }

    fn refresh(&self) -> bool {
        // Attributes mirror the resolved derivative's; unresolved targets
        // leave them provisional. No forcing here: construction belongs to
        // collection, not to sweeps.
        match self.target(self.attrs.id, false) {
            Ok(Some(target)) => self.attrs.store(
                target.current_empty(),
                target.current_nullable(),
                target.current_parse_null(),
            ),
            _ => false,
        }
    }

    fn stand_in(&self, me: &Parser<T, A>, force: bool) -> Result<Option<Parser<T, A>>> {
        self.target(me.id(), force)
    }

    fn child_ids(&self) -> Result<Vec<TermId>> {
        Ok(vec![self.base.id()])
    }

    fn walk_children(&self, graph: &mut TermGraph) -> Result<()> {
        // Inspection never forces: report the unforced base.
        self.base.walk(graph)
    }
}
