//! Attribute fix-point engine.
//!
//! The three term attributes (`empty?`, `nullable?`, null-parse forest) are
//! defined by mutually recursive equations over a possibly-cyclic term
//! graph, so they cannot be computed by plain recursion. The engine instead
//! iterates monotone updates to a fixed point:
//!
//! - a single traversal collects every reachable, not-yet-settled term into
//!   a worklist, forcing pending derivatives where they are constructible;
//! - the worklist is swept repeatedly, each sweep recomputing every term's
//!   attributes from its children's current values, until a full sweep
//!   changes nothing.
//!
//! `empty?` starts `true` for composite terms and only decreases;
//! `nullable?` starts `false` and only increases; the null-parse forest
//! starts empty and only grows. All three lattices are finite for a finite
//! reachable graph, which bounds the iteration.
//!
//! If the traversal runs into a derivative whose construction is still in
//! flight (a cyclic derivative graph mid-build), the sweep still converges
//! on provisional values, but no term is marked settled; the next query
//! re-runs the engine once the derivative has landed.

use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::graph::TermId;
use crate::term::{Parser, Terminal, Value};

/// One collected term: its update action and its settle action.
struct WorkItem {
    refresh: Box<dyn Fn() -> bool>,
    settle: Box<dyn Fn()>,
}

/// The set of terms one fix-point run iterates over.
pub(crate) struct Worklist {
    seen: HashSet<TermId>,
    items: Vec<WorkItem>,
    resolved: bool,
}

impl Worklist {
    fn new() -> Self {
        Worklist { seen: HashSet::new(), items: Vec::new(), resolved: true }
    }

    /// True the first time an identity is offered; callers skip admitted
    /// terms so every reachable term is visited exactly once.
    pub(crate) fn admit(&mut self, id: TermId) -> bool {
        self.seen.insert(id)
    }

    pub(crate) fn push<T: Terminal, A: Value>(&mut self, term: &Parser<T, A>) {
        let refresh = {
            let term = term.clone();
            Box::new(move || term.refresh()) as Box<dyn Fn() -> bool>
        };
        let settle = {
            let term = term.clone();
            Box::new(move || term.settle()) as Box<dyn Fn()>
        };
        self.items.push(WorkItem { refresh, settle });
    }

    /// Records that a pending derivative could not be resolved; the run's
    /// results stay provisional.
    pub(crate) fn mark_unresolved(&mut self) {
        self.resolved = false;
    }
}

/// Runs the engine for `root` unless its attributes are already settled.
///
/// Re-entrant calls on a root whose run is in progress return immediately;
/// the outer run converges for both.
pub(crate) fn solve<T: Terminal, A: Value>(root: &Parser<T, A>) -> Result<()> {
    if root.settled() || root.solving() {
        return Ok(());
    }

    root.set_solving(true);
    let mut work = Worklist::new();
    let collected = root.enlist(&mut work);
    if let Err(err) = collected {
        root.set_solving(false);
        return Err(err);
    }

    let mut passes = 0u32;
    loop {
        passes += 1;
        let mut changed = false;
        for item in &work.items {
            changed |= (item.refresh)();
        }
        if !changed {
            break;
        }
    }
    root.set_solving(false);

    if work.resolved {
        for item in &work.items {
            (item.settle)();
        }
    }
    debug!(
        root = %root.id(),
        terms = work.items.len(),
        passes,
        settled = work.resolved,
        "attribute fix-point converged"
    );
    Ok(())
}
