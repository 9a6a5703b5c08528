//! Network nodes: an arena of type-discriminating, attribute-filtering, and
//! equi-join vertices, dispatched through a closed tagged variant rather than
//! `isinstance`-style checks or a node-kind trait object.
//!
//! Nodes live in a flat `Vec<Node>` inside [`Network`] and are addressed by
//! stable [`NodeId`] handles, avoiding a parent-pointing graph of possibly
//! shared, possibly cyclic `Rc` nodes.

use std::collections::HashMap;

use crate::agenda::Agenda;
use crate::fact::FactHandle;
use crate::token::Token;
use crate::value::{Op, Value};
use std::rc::Rc;

/// A stable handle into a [`Network`]'s node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// An Alpha node's test against a constraint's right-hand side: a binding
/// always passes (the real check moves to the join layer); a literal is
/// compared with the constraint's operator.
#[derive(Clone, Debug)]
pub(crate) enum AlphaTest {
    Literal(Value),
    Binding,
}

/// Key used to collapse identical `(field, op, value)` Alpha edges under the
/// same parent. A binding-valued constraint shares with any other
/// binding-valued constraint on the same `(field, op)` regardless of the
/// binding's name, since the Alpha node's behavior, passing unconditionally,
/// does not depend on which variable name the join layer will later bind it
/// to.
#[derive(Clone, PartialEq, Eq, Hash)]
enum AlphaKey {
    Literal(&'static str, OpKey, Value),
    Binding(&'static str, OpKey),
}

// `Op` already derives `Eq`/`Hash`; `OpKey` just spells out that it's being
// used as a sharing-map key component, for readability at the call site.
type OpKey = Op;

/// Hash-Beta join key. An absent field produces its own bucket (`None`),
/// joining only against other absent-field entries.
type Key = Option<Value>;

pub(crate) enum NodeBody {
    Type {
        #[allow(dead_code)]
        schema: &'static str,
    },
    Alpha {
        field: &'static str,
        op: Op,
        test: AlphaTest,
        memory: Vec<FactHandle>,
    },
    DummyRoot,
    CartesianBeta {
        left_memory: Vec<Rc<Token>>,
        right_memory: Vec<FactHandle>,
    },
    HashBeta {
        left_idx: usize,
        left_field: &'static str,
        right_field: &'static str,
        left_index: HashMap<Key, Vec<Rc<Token>>>,
        right_index: HashMap<Key, Vec<FactHandle>>,
    },
    Terminal {
        rule_index: usize,
        priority: i32,
        arity: usize,
    },
}

pub(crate) struct Node {
    children: Vec<NodeId>,
    body: NodeBody,
}

/// The discrimination network: an arena of nodes plus the Alpha
/// node-sharing table, and the propagation protocol that walks it.
#[derive(Default)]
pub(crate) struct Network {
    nodes: Vec<Node>,
    alpha_shared: HashMap<(NodeId, AlphaKey), NodeId>,
    dummy_seeded: std::collections::HashSet<NodeId>,
}

impl Network {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, body: NodeBody) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { children: Vec::new(), body });
        id
    }

    pub(crate) fn alloc_type(&mut self, schema: &'static str) -> NodeId {
        self.alloc(NodeBody::Type { schema })
    }

    pub(crate) fn alloc_dummy_root(&mut self) -> NodeId {
        self.alloc(NodeBody::DummyRoot)
    }

    pub(crate) fn alloc_cartesian_beta(&mut self) -> NodeId {
        self.alloc(NodeBody::CartesianBeta { left_memory: Vec::new(), right_memory: Vec::new() })
    }

    pub(crate) fn alloc_hash_beta(
        &mut self,
        left_idx: usize,
        left_field: &'static str,
        right_field: &'static str,
    ) -> NodeId {
        self.alloc(NodeBody::HashBeta {
            left_idx,
            left_field,
            right_field,
            left_index: HashMap::new(),
            right_index: HashMap::new(),
        })
    }

    pub(crate) fn alloc_terminal(&mut self, rule_index: usize, priority: i32, arity: usize) -> NodeId {
        self.alloc(NodeBody::Terminal { rule_index, priority, arity })
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Build or reuse an Alpha child of `parent` testing `(field, op, value)`.
    pub(crate) fn get_or_create_alpha_child(
        &mut self,
        parent: NodeId,
        field: &'static str,
        op: Op,
        test: AlphaTest,
    ) -> NodeId {
        let key = match &test {
            AlphaTest::Literal(v) => AlphaKey::Literal(field, op, v.clone()),
            AlphaTest::Binding => AlphaKey::Binding(field, op),
        };
        if let Some(&existing) = self.alpha_shared.get(&(parent, key.clone())) {
            return existing;
        }
        let id = self.alloc(NodeBody::Alpha { field, op, test, memory: Vec::new() });
        self.add_child(parent, id);
        self.alpha_shared.insert((parent, key), id);
        id
    }

    /// Link `beta` as a direct child of the dummy root, seeding it with the
    /// empty root token exactly once. Seeding happens here, at link time,
    /// tracked by `dummy_seeded`, rather than being retriggered by every
    /// later rule's compilation.
    pub(crate) fn link_dummy_root_child(&mut self, dummy_root: NodeId, beta: NodeId, agenda: &mut Agenda) {
        self.add_child(dummy_root, beta);
        if self.dummy_seeded.insert(beta) {
            self.left_activate(beta, Token::root(), agenda);
        }
    }

    // ── Fact-side propagation (Type / Alpha layer) ──────────────────────────

    /// Entry point for [`crate::engine::Engine::declare`]: route a fact to
    /// its Type node, if any rule references that schema.
    pub(crate) fn activate_fact(&mut self, id: NodeId, fact: FactHandle, agenda: &mut Agenda) {
        let children = self.nodes[id.0].children.clone();
        match &mut self.nodes[id.0].body {
            NodeBody::Type { .. } => {
                for child in children {
                    self.dispatch_fact_to_child(child, fact.clone(), agenda);
                }
            }
            NodeBody::Alpha { field, op, test, memory } => {
                if test_alpha(&fact, field, *op, test) {
                    memory.push(fact.clone());
                    for child in children {
                        self.dispatch_fact_to_child(child, fact.clone(), agenda);
                    }
                }
            }
            _ => unreachable!("activate_fact called on a node that does not receive facts"),
        }
    }

    fn dispatch_fact_to_child(&mut self, child: NodeId, fact: FactHandle, agenda: &mut Agenda) {
        match &self.nodes[child.0].body {
            NodeBody::Alpha { .. } => self.activate_fact(child, fact, agenda),
            NodeBody::CartesianBeta { .. } | NodeBody::HashBeta { .. } => self.right_activate(child, fact, agenda),
            NodeBody::Terminal { .. } => self.activate_terminal_fact(child, fact, agenda),
            NodeBody::Type { .. } | NodeBody::DummyRoot => {
                unreachable!("Type/Dummy nodes are never a Type/Alpha node's child")
            }
        }
    }

    fn activate_terminal_fact(&mut self, id: NodeId, fact: FactHandle, agenda: &mut Agenda) {
        let NodeBody::Terminal { rule_index, priority, arity: _ } = &self.nodes[id.0].body else {
            unreachable!("activate_terminal_fact called on a non-terminal node")
        };
        agenda.push(*rule_index, *priority, Rc::new(vec![fact]));
    }

    // ── Beta layer ───────────────────────────────────────────────────────────

    fn right_activate(&mut self, id: NodeId, fact: FactHandle, agenda: &mut Agenda) {
        let to_propagate: Vec<Rc<Token>> = match &mut self.nodes[id.0].body {
            NodeBody::CartesianBeta { left_memory, right_memory } => {
                right_memory.push(fact.clone());
                left_memory.iter().map(|t| Token::extend(t, fact.clone())).collect()
            }
            NodeBody::HashBeta { right_field, right_index, left_index, .. } => {
                let key = fact.get(right_field);
                right_index.entry(key.clone()).or_default().push(fact.clone());
                left_index
                    .get(&key)
                    .map(|tokens| tokens.iter().map(|t| Token::extend(t, fact.clone())).collect())
                    .unwrap_or_default()
            }
            _ => unreachable!("right_activate called on a non-beta node"),
        };

        let children = self.nodes[id.0].children.clone();
        for token in to_propagate {
            for &child in &children {
                self.dispatch_token_to_child(child, Rc::clone(&token), agenda);
            }
        }
    }

    fn left_activate(&mut self, id: NodeId, token: Rc<Token>, agenda: &mut Agenda) {
        let to_propagate: Vec<Rc<Token>> = match &mut self.nodes[id.0].body {
            NodeBody::CartesianBeta { left_memory, right_memory } => {
                left_memory.push(Rc::clone(&token));
                right_memory.iter().map(|f| Token::extend(&token, f.clone())).collect()
            }
            NodeBody::HashBeta { left_idx, left_field, left_index, right_index, .. } => {
                let Some(left_fact) = token.fact_at(*left_idx) else {
                    // Indexed ancestor fact missing: drop — the token never
                    // even enters `left_index`.
                    return;
                };
                let key = left_fact.get(left_field);
                left_index.entry(key.clone()).or_default().push(Rc::clone(&token));
                right_index
                    .get(&key)
                    .map(|facts| facts.iter().map(|f| Token::extend(&token, f.clone())).collect())
                    .unwrap_or_default()
            }
            _ => unreachable!("left_activate called on a non-beta node"),
        };

        let children = self.nodes[id.0].children.clone();
        for new_token in to_propagate {
            for &child in &children {
                self.dispatch_token_to_child(child, Rc::clone(&new_token), agenda);
            }
        }
    }

    fn dispatch_token_to_child(&mut self, child: NodeId, token: Rc<Token>, agenda: &mut Agenda) {
        match &self.nodes[child.0].body {
            NodeBody::CartesianBeta { .. } | NodeBody::HashBeta { .. } => self.left_activate(child, token, agenda),
            NodeBody::Terminal { .. } => self.activate_terminal_token(child, token, agenda),
            NodeBody::Type { .. } | NodeBody::Alpha { .. } | NodeBody::DummyRoot => {
                unreachable!("Beta children are always Beta or Terminal nodes")
            }
        }
    }

    fn activate_terminal_token(&mut self, id: NodeId, token: Rc<Token>, agenda: &mut Agenda) {
        let NodeBody::Terminal { rule_index, priority, arity: _ } = &self.nodes[id.0].body else {
            unreachable!("activate_terminal_token called on a non-terminal node")
        };
        agenda.push(*rule_index, *priority, token.flat_tuple());
    }

    /// The declared arity of the rule attached at `terminal` — used by the
    /// engine driver to slice the match tuple before invoking the action.
    pub(crate) fn terminal_arity(&self, terminal: NodeId) -> usize {
        match &self.nodes[terminal.0].body {
            NodeBody::Terminal { arity, .. } => *arity,
            _ => unreachable!("terminal_arity called on a non-terminal node"),
        }
    }
}

fn test_alpha(fact: &FactHandle, field: &str, op: Op, test: &AlphaTest) -> bool {
    match test {
        AlphaTest::Binding => true,
        AlphaTest::Literal(expected) => match fact.get(field) {
            Some(actual) => actual.compare(op, expected),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::{handle, Fact};

    #[derive(Debug)]
    struct Person {
        age: i64,
    }
    impl Fact for Person {
        const SCHEMA: &'static str = "Person";
        fn get(&self, field: &str) -> Option<Value> {
            (field == "age").then(|| Value::Int(self.age))
        }
    }

    #[test]
    fn alpha_node_sharing_collapses_identical_edges() {
        let mut net = Network::new();
        let ty = net.alloc_type("Person");
        let a = net.get_or_create_alpha_child(ty, "age", Op::Gte, AlphaTest::Literal(Value::Int(18)));
        let b = net.get_or_create_alpha_child(ty, "age", Op::Gte, AlphaTest::Literal(Value::Int(18)));
        assert_eq!(a, b);
        assert_eq!(net.nodes[ty.0].children.len(), 1);
    }

    #[test]
    fn alpha_node_sharing_distinguishes_different_constraints() {
        let mut net = Network::new();
        let ty = net.alloc_type("Person");
        let a = net.get_or_create_alpha_child(ty, "age", Op::Gte, AlphaTest::Literal(Value::Int(18)));
        let b = net.get_or_create_alpha_child(ty, "age", Op::Gte, AlphaTest::Literal(Value::Int(21)));
        assert_ne!(a, b);
        assert_eq!(net.nodes[ty.0].children.len(), 2);
    }

    #[test]
    fn alpha_test_rejects_missing_field() {
        let mut net = Network::new();
        let ty = net.alloc_type("Other");
        let alpha = net.get_or_create_alpha_child(ty, "missing", Op::Eq, AlphaTest::Literal(Value::Int(1)));
        let term = net.alloc_terminal(0, 0, 1);
        net.add_child(alpha, term);
        let mut agenda = Agenda::new();
        net.activate_fact(ty, handle(Person { age: 30 }), &mut agenda);
        assert!(agenda.is_empty());
    }

    #[test]
    fn cartesian_beta_joins_every_pair() {
        let mut net = Network::new();
        let dummy = net.alloc_dummy_root();
        let ty_a = net.alloc_type("A");
        let ty_b = net.alloc_type("B");
        let beta = net.alloc_cartesian_beta();
        let term = net.alloc_terminal(0, 0, 2);

        let mut agenda = Agenda::new();
        net.link_dummy_root_child(dummy, beta, &mut agenda);
        net.add_child(ty_a, beta);
        net.add_child(ty_b, beta);
        net.add_child(beta, term);

        net.activate_fact(ty_a, handle(Person { age: 1 }), &mut agenda);
        net.activate_fact(ty_a, handle(Person { age: 2 }), &mut agenda);
        net.activate_fact(ty_b, handle(Person { age: 10 }), &mut agenda);
        net.activate_fact(ty_b, handle(Person { age: 20 }), &mut agenda);

        assert_eq!(agenda.len(), 4);
    }

    #[test]
    fn hash_beta_only_joins_matching_keys() {
        let mut net = Network::new();
        let dummy = net.alloc_dummy_root();
        let ty_a = net.alloc_type("A");
        let ty_b = net.alloc_type("B");
        let beta = net.alloc_hash_beta(0, "age", "age");
        let term = net.alloc_terminal(0, 0, 2);

        let mut agenda = Agenda::new();
        net.link_dummy_root_child(dummy, beta, &mut agenda);
        net.add_child(ty_a, beta);
        net.add_child(ty_b, beta);
        net.add_child(beta, term);

        net.activate_fact(ty_a, handle(Person { age: 1 }), &mut agenda);
        net.activate_fact(ty_b, handle(Person { age: 1 }), &mut agenda);
        net.activate_fact(ty_b, handle(Person { age: 2 }), &mut agenda);

        assert_eq!(agenda.len(), 1);
    }

    #[test]
    fn dummy_root_seeds_each_beta_exactly_once() {
        let mut net = Network::new();
        let dummy = net.alloc_dummy_root();
        let beta = net.alloc_cartesian_beta();
        let mut agenda = Agenda::new();

        net.link_dummy_root_child(dummy, beta, &mut agenda);
        net.link_dummy_root_child(dummy, beta, &mut agenda);

        match &net.nodes[beta.0].body {
            NodeBody::CartesianBeta { left_memory, .. } => assert_eq!(left_memory.len(), 1),
            _ => unreachable!(),
        }
    }
}
