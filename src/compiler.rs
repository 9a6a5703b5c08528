//! Compiles a [`Rule`]'s pattern list into network nodes: a Type node and
//! Alpha chain per pattern, joined left-to-right by Beta nodes seeded from
//! the dummy root.
//!
//! A single pattern attaches its own Alpha chain directly to a Terminal, no
//! Beta layer involved. Two or more patterns fold left-to-right: the dummy
//! root stands in for "zero patterns matched yet", and every pattern in
//! turn — including the first — becomes the right input of one join, while
//! the running partial match becomes the next join's left input. This
//! uniform fold is what actually makes the first pattern's facts arrive at
//! the terminal: read literally, a join loop that starts at the *second*
//! pattern and treats the dummy root as a join's sole left input would
//! produce match tuples missing the first pattern's fact entirely, so this
//! is the one reading under which every declared pattern ends up in the
//! final tuple.

use std::collections::HashMap;

use crate::agenda::Agenda;
use crate::error::CompileError;
use crate::node::{AlphaTest, NodeId, Network};
use crate::pattern::ConstraintValue;
use crate::rule::Rule;

fn alpha_test_for(value: &ConstraintValue) -> AlphaTest {
    match value {
        ConstraintValue::Literal(v) => AlphaTest::Literal(v.clone()),
        ConstraintValue::Binding(_) => AlphaTest::Binding,
    }
}

fn get_or_create_type_node(
    network: &mut Network,
    type_nodes: &mut HashMap<&'static str, NodeId>,
    schema: &'static str,
) -> NodeId {
    *type_nodes.entry(schema).or_insert_with(|| network.alloc_type(schema))
}

/// Compile `rule` (registered as `rule_index`) into `network`, returning its
/// terminal node id.
pub(crate) fn compile_rule(
    network: &mut Network,
    type_nodes: &mut HashMap<&'static str, NodeId>,
    dummy_root: NodeId,
    agenda: &mut Agenda,
    rule_index: usize,
    rule: &Rule,
) -> Result<NodeId, CompileError> {
    let patterns = rule.patterns();
    if patterns.is_empty() {
        return Err(CompileError::EmptyRule { rule: rule.name().to_string() });
    }

    if patterns.len() == 1 {
        let ty = get_or_create_type_node(network, type_nodes, patterns[0].schema());
        let mut tail = ty;
        for c in patterns[0].constraints() {
            tail = network.get_or_create_alpha_child(tail, c.field, c.op, alpha_test_for(&c.value));
        }
        let term = network.alloc_terminal(rule_index, rule.priority(), rule.arity());
        network.add_child(tail, term);
        return Ok(term);
    }

    // `name -> (pattern_index that introduced it, its field there)`.
    let mut known_vars: HashMap<String, (usize, &'static str)> = HashMap::new();
    let mut current_left = dummy_root;

    for (i, pattern) in patterns.iter().enumerate() {
        let ty = get_or_create_type_node(network, type_nodes, pattern.schema());
        let mut alpha_tail = ty;
        for c in pattern.constraints() {
            alpha_tail = network.get_or_create_alpha_child(alpha_tail, c.field, c.op, alpha_test_for(&c.value));
        }

        // Scan this pattern's bindings in declaration order for the first
        // one that reuses an earlier pattern's variable; every other
        // genuinely new binding gets registered for later patterns. A
        // binding that reuses a name but isn't chosen as the join key is
        // left alone, matching join, not re-registered (only equality with
        // the first reuse is enforced by the compiled network).
        let mut reused: Option<(usize, &'static str)> = None;
        let mut new_bindings: Vec<(String, &'static str)> = Vec::new();
        for c in pattern.constraints() {
            if let ConstraintValue::Binding(b) = &c.value {
                if reused.is_none() {
                    if let Some(&(idx, field)) = known_vars.get(&b.name) {
                        reused = Some((idx, field));
                        continue;
                    }
                }
                if !known_vars.contains_key(&b.name) {
                    new_bindings.push((b.name.clone(), c.field));
                }
            }
        }

        let join = match reused {
            Some((left_idx, left_field)) => {
                // The right field is whichever field carried the reused
                // binding on this pattern.
                let right_field = pattern
                    .constraints()
                    .iter()
                    .find_map(|c| match &c.value {
                        ConstraintValue::Binding(b) if known_vars.get(&b.name) == Some(&(left_idx, left_field)) => {
                            Some(c.field)
                        }
                        _ => None,
                    })
                    .expect("reused binding's field must be present in this pattern's constraints");
                network.alloc_hash_beta(left_idx, left_field, right_field)
            }
            None => network.alloc_cartesian_beta(),
        };

        if current_left == dummy_root {
            network.link_dummy_root_child(dummy_root, join, agenda);
        } else {
            network.add_child(current_left, join);
        }
        network.add_child(alpha_tail, join);

        for (name, field) in new_bindings {
            known_vars.insert(name, (i, field));
        }
        current_left = join;
    }

    let term = network.alloc_terminal(rule_index, rule.priority(), rule.arity());
    network.add_child(current_left, term);
    Ok(term)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::var;
    use crate::fact::{handle, Fact};
    use crate::pattern::Pattern;
    use crate::value::Value;

    #[derive(Debug)]
    struct A {
        id: i64,
    }
    impl Fact for A {
        const SCHEMA: &'static str = "A";
        fn get(&self, field: &str) -> Option<Value> {
            (field == "id").then(|| Value::Int(self.id))
        }
    }

    #[derive(Debug)]
    struct B {
        a_id: i64,
    }
    impl Fact for B {
        const SCHEMA: &'static str = "B";
        fn get(&self, field: &str) -> Option<Value> {
            (field == "a_id").then(|| Value::Int(self.a_id))
        }
    }

    #[test]
    fn single_pattern_rule_fires_on_matching_fact() {
        let mut network = Network::new();
        let mut type_nodes = HashMap::new();
        let dummy_root = network.alloc_dummy_root();
        let mut agenda = Agenda::new();

        let rule = Rule::builder("r").pattern(Pattern::new::<A>().eq("id", 1i64).build()).build();
        compile_rule(&mut network, &mut type_nodes, dummy_root, &mut agenda, 0, &rule).unwrap();

        let ty = *type_nodes.get("A").unwrap();
        network.activate_fact(ty, handle(A { id: 1 }), &mut agenda);
        network.activate_fact(ty, handle(A { id: 2 }), &mut agenda);
        assert_eq!(agenda.len(), 1);
    }

    #[test]
    fn two_pattern_join_binds_across_patterns() {
        let mut network = Network::new();
        let mut type_nodes = HashMap::new();
        let dummy_root = network.alloc_dummy_root();
        let mut agenda = Agenda::new();

        let rule = Rule::builder("r")
            .pattern(Pattern::new::<A>().bind("id", var("x")).build())
            .pattern(Pattern::new::<B>().bind("a_id", var("x")).build())
            .build();
        compile_rule(&mut network, &mut type_nodes, dummy_root, &mut agenda, 0, &rule).unwrap();

        let ty_a = *type_nodes.get("A").unwrap();
        let ty_b = *type_nodes.get("B").unwrap();
        network.activate_fact(ty_a, handle(A { id: 1 }), &mut agenda);
        network.activate_fact(ty_b, handle(B { a_id: 1 }), &mut agenda);
        network.activate_fact(ty_b, handle(B { a_id: 2 }), &mut agenda);

        assert_eq!(agenda.len(), 1);
    }

    #[test]
    fn empty_rule_is_rejected() {
        let mut network = Network::new();
        let mut type_nodes = HashMap::new();
        let dummy_root = network.alloc_dummy_root();
        let mut agenda = Agenda::new();

        let rule = Rule::builder("empty").build();
        let err = compile_rule(&mut network, &mut type_nodes, dummy_root, &mut agenda, 0, &rule).unwrap_err();
        assert!(matches!(err, CompileError::EmptyRule { .. }));
    }
}
