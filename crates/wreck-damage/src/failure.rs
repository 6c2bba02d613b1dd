//! Full-failure predicates over hitbox `out` flags.

use serde::{Deserialize, Serialize};

/// Boolean expression over which hitboxes are out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureRule {
    /// Only reaction flags can fail the body.
    #[default]
    Never,
    Out(String),
    All(Vec<FailureRule>),
    Any(Vec<FailureRule>),
    /// At least `n` of the sub-rules hold (e.g. any two of four legs).
    AtLeast(usize, Vec<FailureRule>),
}

impl FailureRule {
    pub fn out(name: &str) -> Self {
        FailureRule::Out(name.to_string())
    }

    pub fn all_out(names: &[&str]) -> Self {
        FailureRule::All(names.iter().map(|name| FailureRule::out(name)).collect())
    }

    pub fn any_out(names: &[&str]) -> Self {
        FailureRule::Any(names.iter().map(|name| FailureRule::out(name)).collect())
    }

    pub fn at_least_out(n: usize, names: &[&str]) -> Self {
        FailureRule::AtLeast(n, names.iter().map(|name| FailureRule::out(name)).collect())
    }

    pub fn or(self, other: FailureRule) -> Self {
        match self {
            FailureRule::Never => other,
            FailureRule::Any(mut rules) => {
                rules.push(other);
                FailureRule::Any(rules)
            }
            rule => FailureRule::Any(vec![rule, other]),
        }
    }

    pub fn evaluate<F>(&self, is_out: &F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        match self {
            FailureRule::Never => false,
            FailureRule::Out(name) => is_out(name),
            FailureRule::All(rules) => rules.iter().all(|r| r.evaluate(is_out)),
            FailureRule::Any(rules) => rules.iter().any(|r| r.evaluate(is_out)),
            FailureRule::AtLeast(n, rules) => {
                rules.iter().filter(|r| r.evaluate(is_out)).count() >= *n
            }
        }
    }

    /// Every hitbox name the rule refers to.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            FailureRule::Never => {}
            FailureRule::Out(name) => names.push(name),
            FailureRule::All(rules) | FailureRule::Any(rules) | FailureRule::AtLeast(_, rules) => {
                for r in rules {
                    r.collect_names(names);
                }
            }
        }
    }
}
