//! Property-based tests for destination path computation and pattern lists.

#[cfg(test)]
mod proptest_tests {
    use crate::config::split_patterns;
    use crate::extract::destination_for;
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};

    fn relative_path() -> impl Strategy<Value = PathBuf> {
        prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 1..6)
            .prop_map(|parts| parts.iter().collect::<PathBuf>())
    }

    // ============================================================================
    // destination_for property tests
    // ============================================================================

    proptest! {
        /// Property: flattening always lands directly inside dest
        #[test]
        fn flatten_lands_directly_in_dest(relative in relative_path()) {
            let dest = Path::new("out");
            let target = destination_for(dest, &relative, false).unwrap();
            prop_assert_eq!(target.parent(), Some(dest));
            prop_assert_eq!(target.file_name(), relative.file_name());
        }

        /// Property: keeping the tree mirrors the relative path under dest
        #[test]
        fn keep_tree_mirrors_relative_path(relative in relative_path()) {
            let dest = Path::new("out");
            let target = destination_for(dest, &relative, true).unwrap();
            prop_assert_eq!(target.strip_prefix(dest).unwrap(), relative.as_path());
        }

        /// Property: both layouts agree on the file name
        #[test]
        fn layouts_share_file_name(relative in relative_path()) {
            let dest = Path::new("out");
            let kept = destination_for(dest, &relative, true).unwrap();
            let flat = destination_for(dest, &relative, false).unwrap();
            prop_assert_eq!(kept.file_name(), flat.file_name());
        }
    }

    // ============================================================================
    // split_patterns property tests
    // ============================================================================

    proptest! {
        /// Property: splitting never yields blank or padded patterns
        #[test]
        fn split_patterns_yields_trimmed_non_empty(input in "[a-z*/ |]{0,40}") {
            for pattern in split_patterns(&input) {
                prop_assert!(!pattern.is_empty());
                prop_assert_eq!(pattern.trim(), pattern.as_str());
                prop_assert!(!pattern.contains('|'));
            }
        }

        /// Property: joining clean patterns with '|' round-trips
        #[test]
        fn split_patterns_preserves_order(parts in prop::collection::vec("[a-z*/]{1,10}", 1..5)) {
            let joined = parts.join("|");
            prop_assert_eq!(split_patterns(&joined), parts);
        }
    }
}
