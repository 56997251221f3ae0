pub mod config;
pub mod error;
pub mod generate;
pub mod infer;
pub mod parse;
pub mod pipeline;
pub mod pretty;
pub mod store;

#[cfg(test)]
pub mod test;

use std::collections::HashMap;

pub use error::{Error, Result};
pub use store::FactStore;

pub type Predicate = String;
pub type Variable = String;
pub type Constant = String;

#[derive(Hash, PartialOrd, Ord, Eq, PartialEq, Clone)]
pub enum Term {
    Constant(Constant),
    Variable(Variable),
}

#[derive(Hash, PartialOrd, Ord, Eq, PartialEq, Clone)]
pub struct Atom {
    pub predicate: Predicate,
    pub args: Vec<Term>,
}

#[derive(Hash, Clone, Eq, PartialEq)]
pub struct Rule {
    pub premise: Vec<Atom>,
    pub conclusion: Atom,
    pub label: String,
}

/// Variable assignments of one successful premise match.
/// Borrows names and values from the rule and the store.
pub type Binding<'a> = HashMap<&'a str, &'a str>;

impl Term {
    /// Variables are tokens made only of uppercase letters and underscores.
    pub fn classify(token: &str) -> Self {
        if is_variable_token(token) {
            Self::Variable(token.to_owned())
        } else {
            Self::Constant(token.to_owned())
        }
    }
    pub fn text(&self) -> &str {
        match self {
            Self::Constant(c) => c,
            Self::Variable(v) => v,
        }
    }
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }
}

pub fn is_variable_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c == '_' || c.is_uppercase())
}

impl Atom {
    pub fn new(predicate: impl Into<Predicate>, args: Vec<Term>) -> Self {
        Self { predicate: predicate.into(), args }
    }
    /// Every argument is taken as a constant, whatever its case.
    pub fn ground<S: AsRef<str>>(predicate: &str, args: &[S]) -> Self {
        let args = args.iter().map(|a| Term::Constant(a.as_ref().to_owned())).collect();
        Self::new(predicate, args)
    }
    /// Arguments are tagged by the uppercase convention.
    pub fn pattern<S: AsRef<str>>(predicate: &str, args: &[S]) -> Self {
        let args = args.iter().map(|a| Term::classify(a.as_ref())).collect();
        Self::new(predicate, args)
    }
    pub fn arity(&self) -> usize {
        self.args.len()
    }
    pub fn is_ground(&self) -> bool {
        !self.args.iter().any(Term::is_variable)
    }
}

impl Rule {
    pub fn new(premise: Vec<Atom>, conclusion: Atom, label: impl Into<String>) -> Self {
        Self { premise, conclusion, label: label.into() }
    }
}
