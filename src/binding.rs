//! Variable references ("bindings"): named placeholders that tie a value on
//! one pattern to the same value on a later pattern.
//!
//! Bindings are an explicit constructor rather than attribute-access magic
//! on some sentinel object: Rust has no equivalent of a `__getattr__`
//! interception trick, nor does it need one here. `var("foo")` says the same
//! thing plainly.

/// A named placeholder used inside a pattern's constraint position.
///
/// Two bindings are equal iff their names match. `var("c") == var("c")` is
/// `true` even though they're two distinct constructions, by design: the
/// compiler uses name equality to detect when a later pattern reuses an
/// earlier pattern's variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Binding {
    pub name: String,
}

/// Construct a named variable reference. `var("foo")` used twice in a rule's
/// patterns denotes the same variable; `var("foo")` and `var("bar")` are
/// distinct.
pub fn var(name: impl Into<String>) -> Binding {
    Binding { name: name.into() }
}
