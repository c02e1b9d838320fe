//! Property tests for parse/print roundtrips


use generators::{arb_operand, arb_term};
use proptest::prelude::*;
use tensorex::ast::Statement;
use tensorex::{parse, pretty_print, pretty_print_term};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Printing, parsing and printing again is stable
    #[test]
    fn term_roundtrip(term in arb_term()) {
        let printed = pretty_print_term(&term);
        let reparsed = parse(&printed).unwrap();
        prop_assert!(reparsed.target.is_none());
        prop_assert_eq!(pretty_print_term(&reparsed.value), printed);
    }

    /// Statements with a target keep it through a roundtrip
    #[test]
    fn statement_roundtrip(target in arb_operand(), value in arb_term()) {
        let statement = Statement { target: Some(target), value };
        let printed = pretty_print(&statement);
        let reparsed = parse(&printed).unwrap();
        prop_assert_eq!(pretty_print(&reparsed), printed);
        prop_assert_eq!(reparsed.value.operands().len(), statement.value.operands().len());
    }
}
