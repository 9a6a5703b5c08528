//! Rules: an ordered pattern list, a priority, an action arity, and the
//! action callable itself.

use crate::engine::Engine;
use crate::fact::FactHandle;
use crate::pattern::Pattern;

/// An action invoked when a rule's terminal fires. Receives the matched
/// facts (sliced to the rule's declared arity) and a handle back to the
/// engine, so actions may `declare` new facts re-entrantly.
pub type Action = Box<dyn Fn(&[FactHandle], &mut Engine)>;

/// A production rule: patterns (LHS), priority, action arity, and the action
/// (RHS). Built via [`Rule::builder`].
pub struct Rule {
    name: String,
    patterns: Vec<Pattern>,
    priority: i32,
    arity: usize,
    action: Action,
}

impl Rule {
    pub fn builder(name: impl Into<String>) -> RuleBuilder {
        RuleBuilder {
            name: name.into(),
            patterns: Vec::new(),
            priority: 0,
            arity: None,
            action: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn action(&self) -> &Action {
        &self.action
    }

    /// Swap out the action for `placeholder`, returning the original. Lets
    /// the engine driver run the action with `self` free to be reborrowed
    /// mutably, instead of holding a borrow of `self.rules` across the call.
    pub(crate) fn action_mut(&mut self) -> &mut Action {
        &mut self.action
    }
}

/// Builder for [`Rule`]. `priority` defaults to 0; `arity` defaults to the
/// number of patterns if never set explicitly — Rust has no runtime
/// signature inspection, so the arity is declared up front instead of
/// derived from the closure.
pub struct RuleBuilder {
    name: String,
    patterns: Vec<Pattern>,
    priority: i32,
    arity: Option<usize>,
    action: Option<Action>,
}

impl RuleBuilder {
    pub fn pattern(mut self, pattern: impl Into<Pattern>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn action(mut self, action: impl Fn(&[FactHandle], &mut Engine) + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    pub fn build(self) -> Rule {
        let arity = self.arity.unwrap_or(self.patterns.len());
        Rule {
            name: self.name,
            patterns: self.patterns,
            priority: self.priority,
            arity,
            action: self.action.unwrap_or_else(|| Box::new(|_, _| {})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::Fact;
    use crate::value::Value;

    #[derive(Debug)]
    struct Person;
    impl Fact for Person {
        const SCHEMA: &'static str = "Person";
        fn get(&self, _field: &str) -> Option<Value> {
            None
        }
    }

    #[test]
    fn arity_defaults_to_pattern_count() {
        let rule = Rule::builder("r")
            .pattern(Pattern::new::<Person>().build())
            .pattern(Pattern::new::<Person>().build())
            .build();
        assert_eq!(rule.arity(), 2);
    }

    #[test]
    fn arity_can_be_overridden() {
        let rule = Rule::builder("r").pattern(Pattern::new::<Person>().build()).arity(0).build();
        assert_eq!(rule.arity(), 0);
    }

    #[test]
    fn priority_defaults_to_zero() {
        let rule = Rule::builder("r").pattern(Pattern::new::<Person>().build()).build();
        assert_eq!(rule.priority(), 0);
    }
}
