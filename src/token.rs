//! Tokens: persistent, singly-linked partial-match history.

use std::cell::RefCell;
use std::rc::Rc;

use crate::fact::FactHandle;

/// A node in a partial-match chain: `(parent?, fact?)`. The empty root token
/// (`parent: None, fact: None`) seeds every rule's join chain via the dummy
/// beta root.
///
/// Tokens are write-once and never cyclic — a rule's chain only ever grows a
/// new token by wrapping the previous one — so plain `Rc` parent pointers are
/// sound without `Weak`.
pub struct Token {
    parent: Option<Rc<Token>>,
    fact: Option<FactHandle>,
    cache: RefCell<Option<Rc<Vec<FactHandle>>>>,
}

impl Token {
    /// The empty root token, with neither parent nor fact.
    pub fn root() -> Rc<Token> {
        Rc::new(Token { parent: None, fact: None, cache: RefCell::new(None) })
    }

    /// Extend `parent` with one more matched fact.
    pub fn extend(parent: &Rc<Token>, fact: FactHandle) -> Rc<Token> {
        Rc::new(Token { parent: Some(Rc::clone(parent)), fact: Some(fact), cache: RefCell::new(None) })
    }

    /// The match tuple (root-excluded, reversed to root-to-leaf order),
    /// materialized lazily and cached. Once built, the cache is never
    /// rebuilt — sound here because the engine is single-threaded, so there
    /// is no concurrent access to race against the `RefCell` borrow.
    pub fn flat_tuple(self: &Rc<Self>) -> Rc<Vec<FactHandle>> {
        if let Some(cached) = self.cache.borrow().as_ref() {
            return Rc::clone(cached);
        }

        let mut facts = Vec::new();
        let mut cur = Rc::clone(self);
        loop {
            let Some(fact) = cur.fact.clone() else { break };
            facts.push(fact);
            let Some(parent) = cur.parent.clone() else { break };
            cur = parent;
        }
        facts.reverse();

        let tuple = Rc::new(facts);
        *self.cache.borrow_mut() = Some(Rc::clone(&tuple));
        tuple
    }

    /// The `i`-th fact of the match tuple, or `None` if out of range.
    pub fn fact_at(self: &Rc<Self>, i: usize) -> Option<FactHandle> {
        self.flat_tuple().get(i).cloned()
    }
}
