//! A forward-chaining production-rule engine built on the Rete match
//! algorithm: declare facts, compile rules from patterns, and let the
//! network incrementally track partial matches as facts come and go.
//!
//! ```
//! use rete_engine::{Engine, Fact, Pattern, Rule, Value};
//!
//! #[derive(Debug)]
//! struct Order {
//!     total: i64,
//! }
//!
//! impl Fact for Order {
//!     const SCHEMA: &'static str = "Order";
//!     fn get(&self, field: &str) -> Option<Value> {
//!         (field == "total").then(|| Value::Int(self.total))
//!     }
//! }
//!
//! let rule = Rule::builder("big-order")
//!     .pattern(Pattern::new::<Order>().op("total", rete_engine::Op::Gt, 1000i64).build())
//!     .action(|facts, _engine| {
//!         let order = facts[0].as_any().downcast_ref::<Order>().unwrap();
//!         println!("big order: {}", order.total);
//!     })
//!     .build();
//!
//! let mut engine = Engine::builder().rule(rule).build().unwrap();
//! engine.declare(Order { total: 5000 });
//! engine.run();
//! ```

mod agenda;
mod binding;
mod compiler;
mod engine;
mod error;
mod fact;
mod node;
mod pattern;
mod rule;
mod token;
mod value;

pub use binding::{var, Binding};
pub use engine::{Engine, EngineBuilder};
pub use error::CompileError;
pub use fact::{handle, AnyFact, Fact, FactHandle};
pub use pattern::{Constraint, ConstraintValue, Pattern, PatternBuilder};
pub use rule::{Action, Rule, RuleBuilder};
pub use value::{Op, Value};
