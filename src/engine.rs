//! The engine driver: rule compilation, fact declaration, and the
//! match-resolve-act cycle.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};

use crate::agenda::Agenda;
use crate::compiler::compile_rule;
use crate::error::CompileError;
use crate::fact::{handle, Fact};
use crate::node::{NodeId, Network};
use crate::rule::{Action, Rule};

/// `run()` stops after this many activations even if the agenda is still
/// non-empty, to bound runaway cycles where actions keep re-declaring facts
/// that re-trigger the same rules.
const MAX_CYCLES: usize = 1000;

/// A compiled rule engine: a discrimination network plus the compiled
/// rules' actions, an agenda of pending firings, and the fact-declaration
/// entry points rules were compiled against.
pub struct Engine {
    network: Network,
    type_nodes: HashMap<&'static str, NodeId>,
    dummy_root: NodeId,
    agenda: Agenda,
    rules: Vec<Rule>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder { rules: Vec::new() }
    }

    fn compile(rules: Vec<Rule>) -> Result<Self, CompileError> {
        let mut network = Network::new();
        let mut type_nodes = HashMap::new();
        let dummy_root = network.alloc_dummy_root();
        let mut agenda = Agenda::new();

        for (index, rule) in rules.iter().enumerate() {
            compile_rule(&mut network, &mut type_nodes, dummy_root, &mut agenda, index, rule)?;
            debug!(rule = rule.name(), patterns = rule.patterns().len(), "compiled rule");
        }

        Ok(Self { network, type_nodes, dummy_root, agenda, rules })
    }

    /// Declare a fact. If no compiled rule references `F::SCHEMA`, this is a
    /// no-op — the network has no Type node for it to enter.
    pub fn declare<F: Fact>(&mut self, fact: F) {
        let Some(&ty) = self.type_nodes.get(F::SCHEMA) else {
            return;
        };
        self.network.activate_fact(ty, handle(fact), &mut self.agenda);
    }

    /// Drain the agenda, firing the highest-priority, oldest-queued
    /// activation each cycle, until it empties or [`MAX_CYCLES`] is hit.
    /// Returns the number of activations fired. An action's panic is caught
    /// and logged; it does not stop the cycle or poison the engine.
    pub fn run(&mut self) -> usize {
        let mut fired = 0;

        for _ in 0..MAX_CYCLES {
            let Some(activation) = self.agenda.pop() else {
                return fired;
            };

            let Some(rule) = self.rules.get(activation.rule_index) else {
                continue;
            };
            let name = rule.name().to_string();
            let arity = rule.arity().min(activation.facts.len());

            let placeholder: Action = Box::new(|_, _| {});
            let action = std::mem::replace(self.rules[activation.rule_index].action_mut(), placeholder);
            let facts = activation.facts;

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (action)(&facts[..arity], self)));
            *self.rules[activation.rule_index].action_mut() = action;

            if let Err(payload) = outcome {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                error!(rule = name.as_str(), %message, "action panicked; activation skipped");
            }

            fired += 1;
        }

        if !self.agenda.is_empty() {
            warn!(cycles = MAX_CYCLES, remaining = self.agenda.len(), "run() hit the cycle cap with activations still pending");
        }

        fired
    }

    /// Recompile the network from the same rules, discarding every declared
    /// fact, pending activation, and the activation sequence counter.
    pub fn reset(&mut self) -> Result<(), CompileError> {
        let mut network = Network::new();
        let mut type_nodes = HashMap::new();
        let dummy_root = network.alloc_dummy_root();
        let mut agenda = Agenda::new();

        for (index, rule) in self.rules.iter().enumerate() {
            compile_rule(&mut network, &mut type_nodes, dummy_root, &mut agenda, index, rule)?;
        }

        self.network = network;
        self.type_nodes = type_nodes;
        self.dummy_root = dummy_root;
        self.agenda = agenda;
        Ok(())
    }

    /// Number of activations currently queued.
    pub fn pending(&self) -> usize {
        self.agenda.len()
    }
}

/// Builder for [`Engine`]: accumulate rules, then compile them all at once.
#[derive(Default)]
pub struct EngineBuilder {
    rules: Vec<Rule>,
}

impl EngineBuilder {
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> Result<Engine, CompileError> {
        Engine::compile(self.rules)
    }
}
