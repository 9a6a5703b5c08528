//! Patterns: a target schema plus a frozen, ordered list of constraints.

use std::marker::PhantomData;

use crate::binding::Binding;
use crate::fact::Fact;
use crate::value::{Op, Value};

/// A constraint's right-hand side: either a literal to compare against, or a
/// binding that either captures a value (first occurrence) or demands
/// equality with a previously-captured one (later occurrences) — which case
/// applies is a property of the *rule* as a whole, decided by the compiler,
/// not by the pattern in isolation.
#[derive(Clone, Debug)]
pub enum ConstraintValue {
    Literal(Value),
    Binding(Binding),
}

/// One `(field, operator, value-or-binding)` triple.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub field: &'static str,
    pub op: Op,
    pub value: ConstraintValue,
}

/// A declarative match criterion: a target schema plus constraints over its
/// fields. Frozen once built — `Pattern` exposes no mutating methods, only
/// `PatternBuilder` does.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub(crate) schema: &'static str,
    pub(crate) constraints: Vec<Constraint>,
}

impl Pattern {
    /// Start building a pattern targeting schema `F`.
    pub fn new<F: Fact>() -> PatternBuilder<F> {
        PatternBuilder { schema: F::SCHEMA, constraints: Vec::new(), _marker: PhantomData }
    }

    pub fn schema(&self) -> &'static str {
        self.schema
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}

/// Builder for [`Pattern`]. Kept generic over `F` only so field names read
/// naturally at call sites (`Pattern::new::<Order>()`); the schema tag is
/// erased to a `&'static str` the moment `.build()`/`Into<Pattern>` runs,
/// since the compiler only ever needs the name, not the Rust type.
pub struct PatternBuilder<F: Fact> {
    schema: &'static str,
    constraints: Vec<Constraint>,
    _marker: PhantomData<F>,
}

impl<F: Fact> PatternBuilder<F> {
    /// Constrain `field` to equal a literal value (implicit `eq`).
    pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.constraints.push(Constraint { field, op: Op::Eq, value: ConstraintValue::Literal(value.into()) });
        self
    }

    /// Constrain `field` with an explicit operator against a literal.
    pub fn op(mut self, field: &'static str, op: Op, value: impl Into<Value>) -> Self {
        self.constraints.push(Constraint { field, op, value: ConstraintValue::Literal(value.into()) });
        self
    }

    /// Constrain `field` against a variable binding (implicit `eq` — bindings
    /// only ever participate in equi-joins).
    pub fn bind(mut self, field: &'static str, binding: Binding) -> Self {
        self.constraints.push(Constraint { field, op: Op::Eq, value: ConstraintValue::Binding(binding) });
        self
    }

    pub fn build(self) -> Pattern {
        Pattern { schema: self.schema, constraints: self.constraints }
    }
}

impl<F: Fact> From<PatternBuilder<F>> for Pattern {
    fn from(b: PatternBuilder<F>) -> Self {
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::var;

    #[derive(Debug)]
    struct Order;
    impl Fact for Order {
        const SCHEMA: &'static str = "Order";
        fn get(&self, _field: &str) -> Option<Value> {
            None
        }
    }

    #[test]
    fn builder_preserves_declaration_order() {
        let p: Pattern = Pattern::new::<Order>().eq("cust_id", 1i64).bind("oid", var("o")).build();
        assert_eq!(p.schema(), "Order");
        assert_eq!(p.constraints().len(), 2);
        assert_eq!(p.constraints()[0].field, "cust_id");
        assert_eq!(p.constraints()[1].field, "oid");
    }

    #[test]
    fn frozen_after_build_has_no_mutators() {
        let p: Pattern = Pattern::new::<Order>().eq("x", 1i64).build();
        // `Pattern` itself exposes only read accessors; this is a compile-time
        // property (no `push`/`set` method exists), exercised here by simply
        // reading the frozen state back.
        assert_eq!(p.constraints().len(), 1);
    }
}
