use proptest::prelude::*;
use proptest::test_runner::Config;
use taskdeck_model::{Title, TITLE_MAX_LEN};

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn accepted_titles_are_trimmed_and_bounded(raw in "[ ]{0,3}[a-zA-Z0-9 !?._-]{1,64}[ ]{0,3}") {
        let parsed = Title::parse(&raw);
        prop_assume!(parsed.is_ok());
        let title = parsed.expect("title");
        prop_assert_eq!(title.as_str(), raw.trim());
        prop_assert!(title.as_str().chars().count() <= TITLE_MAX_LEN);
        prop_assert!(!title.as_str().is_empty());
    }

    #[test]
    fn parse_is_idempotent_on_accepted_output(raw in "[a-zA-Z0-9 ]{1,64}") {
        let parsed = Title::parse(&raw);
        prop_assume!(parsed.is_ok());
        let once = parsed.expect("title");
        let twice = Title::parse(once.as_str()).expect("reparse");
        prop_assert_eq!(once, twice);
    }
}
