use crate::{Atom, Predicate};
use std::collections::{HashMap, HashSet};

/// Insertion-ordered set of ground atoms, indexed by predicate.
/// Atoms are never removed.
#[derive(Default, Clone)]
pub struct FactStore {
    atoms_iterable: Vec<Atom>,
    atoms_testable: HashSet<Atom>,
    by_predicate: HashMap<Predicate, Vec<usize>>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true iff `atom` was not already present.
    pub fn add(&mut self, atom: Atom) -> bool {
        if !atom.is_ground() {
            tracing::debug!("refusing non-ground atom {atom:?}");
            return false;
        }
        if self.atoms_testable.contains(&atom) {
            return false;
        }
        let idx = self.atoms_iterable.len();
        self.by_predicate.entry(atom.predicate.clone()).or_default().push(idx);
        self.atoms_testable.insert(atom.clone());
        self.atoms_iterable.push(atom);
        true
    }

    /// Atoms of the given predicate in insertion order, or all atoms for `None`.
    pub fn query(&self, predicate: Option<&str>) -> Vec<&Atom> {
        match predicate {
            None => self.atoms_iterable.iter().collect(),
            Some(p) => self.with_predicate(p).collect(),
        }
    }

    pub(crate) fn with_predicate<'a>(
        &'a self,
        predicate: &str,
    ) -> impl Iterator<Item = &'a Atom> + 'a {
        self.by_predicate
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&idx| &self.atoms_iterable[idx])
    }

    pub fn contains(&self, atom: &Atom) -> bool {
        self.atoms_testable.contains(atom)
    }

    pub fn len(&self) -> usize {
        self.atoms_iterable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms_iterable.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms_iterable.iter()
    }

    pub fn as_slice(&self) -> &[Atom] {
        self.atoms_iterable.as_slice()
    }
}

impl Extend<Atom> for FactStore {
    fn extend<I: IntoIterator<Item = Atom>>(&mut self, atoms: I) {
        for atom in atoms {
            self.add(atom);
        }
    }
}

impl FromIterator<Atom> for FactStore {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        let mut store = Self::default();
        store.extend(iter);
        store
    }
}
