//! Facts: the atomic, immutable unit of belief the network matches against.
//!
//! No derive macro is provided for declaring a fact schema. A client type
//! opts in by implementing [`Fact`] itself.

use std::any::Any;
use std::fmt::Debug;
use std::rc::Rc;

use crate::value::Value;

/// A fact schema: a named, typed record a rule's patterns can target.
///
/// The engine never needs fact-level `Eq`/`Hash`. It only ever compares the
/// `Value`s individual fields produce, at the Hash-Beta join layer, never
/// whole facts. So this trait itself only requires `Debug` plus the field
/// accessor; byte-for-byte identity is the client type's own business.
pub trait Fact: Debug + 'static {
    /// The schema name this type is declared under. Used by the Type node to
    /// route facts to the right sub-network.
    const SCHEMA: &'static str;

    /// Read a named field as a dynamically-typed [`Value`]. Returns `None` if
    /// this fact has no such field; the network treats that as a failed
    /// constraint test, not an error.
    fn get(&self, field: &str) -> Option<Value>;
}

/// Object-safe counterpart of [`Fact`], implemented for every `T: Fact` via a
/// blanket impl. The network stores facts behind `Rc<dyn AnyFact>` since it
/// must hold schemas it knows nothing about at compile time.
pub trait AnyFact: Debug {
    fn schema(&self) -> &'static str;
    fn get(&self, field: &str) -> Option<Value>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Fact> AnyFact for T {
    fn schema(&self) -> &'static str {
        T::SCHEMA
    }

    fn get(&self, field: &str) -> Option<Value> {
        Fact::get(self, field)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A type-erased, reference-counted handle to a declared fact.
///
/// Cloning a handle clones the `Rc`, not the fact. This is what lets the
/// same declared fact live in many node memories at once without requiring
/// the client's type to be `Clone`.
pub type FactHandle = Rc<dyn AnyFact>;

/// Wrap a concrete fact for network storage.
pub fn handle<F: Fact>(fact: F) -> FactHandle {
    Rc::new(fact)
}
