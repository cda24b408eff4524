//! Resolving labels in a program before it is executed.
//!
//! This module holds the [`LabelTable`], which is computed
//! in a single pass over the program (`Vec<`[`Stmt`]`>`) and maps each label
//! to the index of its declaration.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::ast::Stmt;

/// A mapping from label names to the program index where they are declared.
///
/// When a label is declared more than once, the last declaration wins.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct LabelTable {
    labels: HashMap<String, usize>
}

impl LabelTable {
    /// Creates a new label table out of the statements of a program.
    ///
    /// ## Example
    /// ```
    /// use aqa_sim::asm::LabelTable;
    /// use aqa_sim::parse::parse_ast;
    /// use aqa_sim::parse::syntax::SyntaxTable;
    ///
    /// let src = "
    ///     MOV r1, #0
    ///     loop:
    ///     B loop
    /// ";
    /// let ast = parse_ast(src, &SyntaxTable::standard()).unwrap();
    ///
    /// let labels = LabelTable::new(&ast);
    /// assert_eq!(labels.lookup("loop"), Some(1));
    /// assert_eq!(labels.lookup("done"), None);
    /// ```
    pub fn new(stmts: &[Stmt]) -> Self {
        let mut labels = HashMap::new();

        for (i, stmt) in stmts.iter().enumerate() {
            let Stmt::Label(label) = stmt else { continue };

            match labels.entry(label.name().to_string()) {
                Entry::Occupied(mut e) => {
                    log::warn!("label {} declared again on line {}, replacing earlier declaration", label.name(), label.token().line);
                    e.insert(i);
                },
                Entry::Vacant(e) => { e.insert(i); },
            }
        }

        log::debug!("resolved {} labels", labels.len());
        LabelTable { labels }
    }

    /// Gets the program index of the declaration of the given label (if it exists).
    pub fn lookup(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    /// The number of labels in the table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table has no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates over all labels and their program indices (in no particular order).
    pub fn iter(&self) -> impl Iterator<Item=(&str, usize)> + '_ {
        self.labels.iter().map(|(name, &i)| (&**name, i))
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::parse_ast;
    use crate::parse::syntax::SyntaxTable;

    use super::LabelTable;

    fn labels(src: &str) -> LabelTable {
        let ast = parse_ast(src, &SyntaxTable::standard()).unwrap();
        LabelTable::new(&ast)
    }

    #[test]
    fn test_labels_basic() {
        let table = labels("
            start:
            MOV r1, #1
            CMP r1, #1
            middle:
            BEQ end
            HALT
            end:
            HALT
        ");

        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("start"), Some(0));
        assert_eq!(table.lookup("middle"), Some(3));
        assert_eq!(table.lookup("end"), Some(6));

        // labels are case-sensitive
        assert_eq!(table.lookup("End"), None);
    }

    #[test]
    fn test_no_labels() {
        let table = labels("MOV r1, #1\nB nowhere\nHALT");
        assert!(table.is_empty());
        assert_eq!(table.lookup("nowhere"), None);
    }

    #[test]
    fn test_duplicate_labels() {
        let table = labels("
            dup:
            HALT
            dup:
            HALT
        ");

        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("dup"), Some(2));

        let mut entries: Vec<_> = table.iter().collect();
        entries.sort();
        assert_eq!(entries, [("dup", 2)]);
    }
}
