use crate::{Atom, FactStore, Rule, Term};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

impl Display for Term {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.text())
    }
}

impl Debug for Term {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Constant(c) => write!(f, "{c:?}"),
            Self::Variable(v) => write!(f, "?{v}"),
        }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}(", self.predicate)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

impl Debug for Atom {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.predicate)?;
        f.debug_list().entries(&self.args).finish()
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for (i, premise) in self.premise.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{premise}")?;
        }
        if !self.premise.is_empty() {
            write!(f, " ")?;
        }
        write!(f, "=> {}", self.conclusion)
    }
}

impl Debug for Rule {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.debug_struct("Rule")
            .field("premise", &self.premise)
            .field("conclusion", &self.conclusion)
            .finish()
    }
}

/// The store dump: every atom in insertion order.
impl Display for FactStore {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "[")?;
        for (i, atom) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{atom}")?;
        }
        write!(f, "]")
    }
}

impl Debug for FactStore {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.debug_list().entries(self.iter()).finish()
    }
}
