//! Small shared pieces used across the `jackc` crates.
//!
//! Every compiler stage keeps its own error enum; this crate holds only the
//! handful of types that would otherwise be duplicated across those stages.

pub use indexmap::IndexMap;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_map_reexport_preserves_insertion_order() {
        let mut m: IndexMap<&str, i32> = IndexMap::new();
        m.insert("b", 2);
        m.insert("a", 1);
        let keys: Vec<_> = m.keys().copied().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
