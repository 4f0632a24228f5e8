use std::path::{Component, Path, Prefix};

/// True when the first component is a UNC or verbatim UNC prefix.
pub fn has_unc_prefix(path: &Path) -> bool {
    match path.components().next() {
        Some(Component::Prefix(prefix_comp)) => matches!(
            prefix_comp.kind(),
            Prefix::UNC(..) | Prefix::VerbatimUNC(..)
        ),
        _ => false,
    }
}
