use crate::{Atom, Binding, FactStore, Rule, Term};

pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Rounds executed, including the final unproductive one.
    pub rounds: usize,
    /// New atoms per round.
    pub derived: Vec<usize>,
    /// False if the round cap was hit while still productive.
    pub saturated: bool,
}

impl Atom {
    fn consistently_assign<'a>(&'a self, concrete: &'a Atom, binding: &mut Binding<'a>) -> bool {
        if self.predicate != concrete.predicate || self.arity() != concrete.arity() {
            return false;
        }
        self.args.iter().zip(concrete.args.iter()).all(|pair| match pair {
            (Term::Variable(v), Term::Constant(c)) => match binding.get(v.as_str()) {
                Some(bound) => *bound == c.as_str(),
                None => {
                    binding.insert(v.as_str(), c.as_str());
                    true
                }
            },
            (Term::Constant(x), Term::Constant(y)) => x == y,
            // stored atoms are ground
            (_, Term::Variable(_)) => false,
        })
    }

    /// Unbound variables are kept as literal text.
    fn concretize(&self, binding: &Binding) -> Atom {
        let args = self
            .args
            .iter()
            .map(|term| match term {
                Term::Variable(v) => match binding.get(v.as_str()) {
                    Some(c) => Term::Constant(c.to_string()),
                    None => Term::Constant(v.clone()),
                },
                Term::Constant(c) => Term::Constant(c.clone()),
            })
            .collect();
        Atom::new(self.predicate.clone(), args)
    }
}

impl Rule {
    /// Every binding satisfying the premise, joined left to right against the
    /// current contents of `store`.
    pub fn bindings<'a>(&'a self, store: &'a FactStore) -> Vec<Binding<'a>> {
        let mut bindings = vec![Binding::new()];
        for pattern in &self.premise {
            let mut extended = vec![];
            for binding in &bindings {
                for atom in store.with_predicate(&pattern.predicate) {
                    let mut candidate = binding.clone();
                    if pattern.consistently_assign(atom, &mut candidate) {
                        extended.push(candidate);
                    }
                }
            }
            bindings = extended;
            if bindings.is_empty() {
                break;
            }
        }
        bindings
    }

    pub fn conclusions(&self, store: &FactStore) -> Vec<Atom> {
        self.bindings(store).iter().map(|b| self.conclusion.concretize(b)).collect()
    }
}

/// Bounded fixpoint. Returns the number of rounds executed.
pub fn solve(store: &mut FactStore, rules: &[Rule], max_depth: usize) -> usize {
    solve_with(store, rules, &Config { max_depth }).rounds
}

pub fn solve_with(store: &mut FactStore, rules: &[Rule], config: &Config) -> Report {
    let mut report = Report::default();
    let mut produced_any = true;
    while produced_any && report.rounds < config.max_depth {
        produced_any = false;
        report.rounds += 1;
        let mut derived = 0;
        for rule in rules {
            // later rules in this round see what earlier rules added
            for atom in rule.conclusions(store) {
                if store.contains(&atom) {
                    continue;
                }
                tracing::trace!("`{}` derives {atom}", rule.label);
                if store.add(atom) {
                    derived += 1;
                    produced_any = true;
                }
            }
        }
        tracing::debug!(round = report.rounds, derived, total = store.len(), "round finished");
        report.derived.push(derived);
    }
    report.saturated = !produced_any;
    report
}
