use mediabatch_core::{sanitize_stem, MAX_STEM_CHARS};
use proptest::prelude::*;

proptest! {
    #[test]
    fn sanitizing_twice_changes_nothing(text in "[A-Za-z0-9 _.,!?'’\"/\\\\:*<>|-]{0,160}") {
        let once = sanitize_stem(&text);
        prop_assert_eq!(sanitize_stem(&once), once.clone());
    }

    #[test]
    fn output_is_filename_safe(text in any::<String>()) {
        let stem = sanitize_stem(&text);
        prop_assert!(stem.chars().count() <= MAX_STEM_CHARS);
        prop_assert!(!stem.starts_with('_') && !stem.ends_with('_'));
        prop_assert!(!stem.contains("__"));
        prop_assert!(stem.chars().all(|c| c == '_' || c.is_alphanumeric()));
    }
}
