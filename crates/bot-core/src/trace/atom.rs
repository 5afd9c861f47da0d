use std::fmt;

/// Literal placeholder object for "no value".
pub const NONE: &str = "None";

/// One `predicate-subject-object` fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub predicate: String,
    pub subject: String,
    pub object: String,
}

impl Atom {
    pub fn new(predicate: &str, subject: &str, object: &str) -> Self {
        Self {
            predicate: predicate.to_string(),
            subject: subject.to_string(),
            object: object.to_string(),
        }
    }

    fn keyed(&self, predicate: &str, subject: &str) -> bool {
        self.predicate == predicate && self.subject == subject
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.predicate, self.subject, self.object)
    }
}

/// Current state: at most one atom per (predicate, subject), in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateTable {
    atoms: Vec<Atom>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a value, replacing the existing atom for the same key in place.
    /// Returns whether the table changed.
    pub fn set(&mut self, predicate: &str, subject: &str, object: &str) -> bool {
        match self.atoms.iter_mut().find(|a| a.keyed(predicate, subject)) {
            Some(atom) if atom.object == object => false,
            Some(atom) => {
                atom.object = object.to_string();
                true
            }
            None => {
                self.atoms.push(Atom::new(predicate, subject, object));
                true
            }
        }
    }

    pub fn get(&self, predicate: &str, subject: &str) -> Option<&str> {
        self.atoms
            .iter()
            .find(|a| a.keyed(predicate, subject))
            .map(|a| a.object.as_str())
    }

    pub fn holds(&self, predicate: &str, subject: &str, object: &str) -> bool {
        self.get(predicate, subject) == Some(object)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut table = StateTable::new();
        assert!(table.set("at", "A", NONE));
        assert!(table.set("looking_at", "A", NONE));
        assert!(table.set("at", "A", "Zombie1"));
        assert!(!table.set("at", "A", "Zombie1"));

        let lines: Vec<String> = table.iter().map(Atom::to_string).collect();
        assert_eq!(lines, vec!["at-A-Zombie1", "looking_at-A-None"]);
    }

    #[test]
    fn subjects_sharing_a_prefix_stay_separate() {
        let mut table = StateTable::new();
        table.set("at", "A", "X");
        table.set("at", "AB", "Y");
        assert_eq!(table.get("at", "A"), Some("X"));
        assert_eq!(table.get("at", "AB"), Some("Y"));
    }

    #[test]
    fn never_holds_two_atoms_per_key() {
        let mut table = StateTable::new();
        let subjects = ["A", "B", "C"];
        let objects = ["None", "Cow1", "Pig2", "A"];
        for step in 0..60 {
            let predicate = if step % 2 == 0 { "closest_mob" } else { "at" };
            table.set(predicate, subjects[step % 3], objects[step % 4]);
        }
        let keys: HashSet<(&str, &str)> = table
            .iter()
            .map(|a| (a.predicate.as_str(), a.subject.as_str()))
            .collect();
        assert_eq!(keys.len(), table.len());
        assert_eq!(table.len(), 6);
    }
}
