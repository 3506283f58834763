use cladekit::model::{Decoration, NodeType};
use cladekit::newick::{
    DecorationMode, NewickParser, NewickStyle, ParseOptions, parse_lines, parse_str,
    parse_str_with,
};
use cladekit::parser::ParsingErrorType;
use pretty_assertions::assert_eq;
use std::mem::discriminant;

// --- SCENARIOS ---
#[test]
fn test_polytomy_with_branch_lengths() {
    let tree = parse_str("(A:1,B:2,(C:3,D:4):5);").unwrap();

    assert_eq!(tree.num_tips(), 4);
    assert_eq!(tree.tip_labels(), vec!["A", "B", "C", "D"]);
    assert_eq!(tree.root_label(), "<2>");
    assert_eq!(tree.descendants("<2>").unwrap(), vec!["A", "B", "<1>"]);
    assert_eq!(tree.clade("<1>").unwrap(), vec!["C", "D"]);
    assert_eq!(tree.branch_length("<1>").unwrap().unwrap().as_str(), "5");
    assert_eq!(tree.node_type("<1>").unwrap(), NodeType::Internal);
}

#[test]
fn test_no_branch_lengths() {
    let tree = parse_str("(A,B);").unwrap();

    assert_eq!(tree.num_tips(), 2);
    assert_eq!(tree.num_internal(), 0);
    assert_eq!(tree.num_nodes(), 3);
    assert_eq!(tree.root().children().len(), 2);
    for record in tree.records() {
        assert_eq!(record.branch_length, "NA");
    }
}

#[test]
fn test_missing_close_paren() {
    let error = parse_str("(A,B;").unwrap_err();
    assert!(matches!(
        error.kind(),
        ParsingErrorType::UnbalancedParentheses(_)
    ));
}

#[test]
fn test_batch_with_one_malformed_line() {
    let text = "(A,B,C);\n((A,B),C);\n(A,(B,C);\n(A,(B,C));\n((A,C),B);\n";
    let batch = parse_lines(text, &ParseOptions::default());

    assert_eq!(batch.num_parsed(), 4);
    assert_eq!(batch.num_skipped(), 1);
    assert_eq!(batch.skipped[0].line, 3);
}

/// Caterpillar tree nesting one more pair of parentheses per tip
fn caterpillar(num_tips: usize) -> String {
    let mut newick = String::new();
    for i in 1..num_tips {
        newick.push_str(&format!("(T{i}:0.1,"));
    }
    newick.push_str(&format!("T{num_tips}:0.1"));
    newick.push_str(&"):0.1".repeat(num_tips - 1));
    newick.push(';');
    newick
}

#[test]
fn test_batch_with_deep_caterpillars() {
    let deep = caterpillar(10_000);
    let text = format!("{deep}\n(A,(B,C);\n{deep}\n");
    let batch = parse_lines(&text, &ParseOptions::default());

    assert_eq!(batch.num_parsed(), 2);
    assert_eq!(batch.skipped[0].line, 2);
    let tree = &batch.trees[0];
    assert_eq!(tree.num_tips(), 10_000);
    assert_eq!(tree.root_label(), "<9999>");
    assert_eq!(tree.ancestor("T10000").unwrap(), Some("<1>"));
    assert_eq!(tree.clade("<9999>").unwrap().len(), 10_000);
    assert!(tree.is_valid());
}

#[test]
fn test_deep_unbalanced_is_error() {
    let mut newick = "(".repeat(50_000);
    newick.push_str("A,B);");
    let error = parse_str(&newick).unwrap_err();
    assert!(matches!(
        error.kind(),
        ParsingErrorType::UnbalancedParentheses(_)
    ));
}

#[test]
fn test_duplicate_tip_label_rejected() {
    let error = parse_str("(A,A);").unwrap_err();
    assert_eq!(
        error.kind(),
        &ParsingErrorType::DuplicateTipLabel("A".to_string())
    );
}

// --- PROPERTIES ---
const TREES: &[&str] = &[
    "(A:1,B:2,(C:3,D:4):5);",
    "((A,B),(C,D));",
    "(((A:0.1,B:0.2)90:0.3,(C:0.4,D:0.5)75:0.6):0.7,(E,F,G)Clade:1e-3,H);",
    "('Little Spotted Kiwi':1.0,('Great Spotted Kiwi':1.0,'Okarito Brown Kiwi':0.5):0.5);",
    "A;",
];

#[test]
fn test_root_clade_is_tip_set() {
    for newick in TREES {
        let tree = parse_str(newick).unwrap();
        let mut clade = tree.clade(tree.root_label()).unwrap();
        let mut tips = tree.tip_labels();
        clade.sort_unstable();
        tips.sort_unstable();
        assert_eq!(clade, tips, "{newick}");
    }
}

#[test]
fn test_reparse_is_identical() {
    for newick in TREES {
        let first = parse_str(newick).unwrap();
        let second = parse_str(newick).unwrap();
        assert_eq!(first.records(), second.records(), "{newick}");
        assert_eq!(first.legacy_records(), second.legacy_records(), "{newick}");
    }
}

#[test]
fn test_descendant_ancestor_duality() {
    for newick in TREES {
        let tree = parse_str(newick).unwrap();
        for node in tree.nodes() {
            if let Some(ancestor) = tree.ancestor(node.label()).unwrap() {
                let descendants = tree.descendants(ancestor).unwrap();
                assert!(descendants.contains(&node.label()), "{newick}");
            }
        }
    }
}

#[test]
fn test_tip_clade_is_itself() {
    for newick in TREES {
        let tree = parse_str(newick).unwrap();
        for tip in tree.tip_labels() {
            assert_eq!(tree.clade(tip).unwrap(), vec![tip]);
        }
    }
}

#[test]
fn test_nodes_in_completion_order() {
    let tree = parse_str("((A,B),(C,D,E));").unwrap();
    let labels: Vec<&str> = tree.nodes().iter().map(|n| n.label()).collect();
    assert_eq!(labels, vec!["A", "B", "<1>", "C", "D", "E", "<2>", "<3>"]);
}

// --- BRANCH LENGTHS AND DECORATIONS ---
#[test]
fn test_branch_length_text_kept() {
    let tree = parse_str("(A:1.23e-5,B:-0.0,C:+4.50E+2,D:007);").unwrap();
    let texts: Vec<&str> = ["A", "B", "C", "D"]
        .iter()
        .map(|tip| tree.branch_length(tip).unwrap().unwrap().as_str())
        .collect();
    assert_eq!(texts, vec!["1.23e-5", "-0.0", "+4.50E+2", "007"]);
    assert_eq!(tree.branch_length("C").unwrap().unwrap().value(), 450.0);
}

#[test]
fn test_overflowing_branch_length_kept() {
    let tree = parse_str("(A:1e400,B:1);").unwrap();
    let branch_length = tree.branch_length("A").unwrap().unwrap();
    assert_eq!(branch_length.as_str(), "1e400");
    assert!(branch_length.value().is_infinite());
    assert_eq!(tree.to_newick(NewickStyle::Original), "(A:1e400,B:1);");
}

#[test]
fn test_invalid_branch_length() {
    for newick in ["(A:,B);", "(A:x,B);", "(A:1.2.3,B);", "(A:e,B);"] {
        let error = parse_str(newick).unwrap_err();
        assert!(
            matches!(error.kind(), ParsingErrorType::InvalidBranchLength(_)),
            "{newick}: {error}"
        );
    }
}

#[test]
fn test_decoration_inferred() {
    let tree = parse_str("((A,B)0.95:1,(C,D)Passeri:2);").unwrap();
    assert_eq!(tree.get("<1>").unwrap().support(), Some("0.95"));
    assert_eq!(tree.get("<1>").unwrap().name(), None);
    assert_eq!(tree.get("<2>").unwrap().name(), Some("Passeri"));

    let records = tree.records();
    assert_eq!(records[2].support_or_label, "0.95");
    assert_eq!(records[5].support_or_label, "Passeri");
}

#[test]
fn test_decoration_forced() {
    let options = ParseOptions::default().with_decoration(DecorationMode::Name);
    let tree = parse_str_with("((A,B)95,C);", &options).unwrap();
    assert_eq!(
        tree.get("<1>").unwrap().decoration(),
        Some(&Decoration::Name("95".to_string()))
    );
}

// --- SYNTAX ---
#[test]
fn test_whitespace_and_comments() {
    let newick = " ( A [tip a] : 1 ,\n\tB:2 ) [&support=1] 90 : 3 ; [trailing]\n";
    let tree = parse_str(newick).unwrap();
    assert_eq!(tree.tip_labels(), vec!["A", "B"]);
    assert_eq!(tree.branch_length("A").unwrap().unwrap().as_str(), "1");
    assert_eq!(tree.root().support(), Some("90"));
    assert_eq!(tree.branch_length("<1>").unwrap().unwrap().as_str(), "3");
}

#[test]
fn test_quoted_and_spaced_labels() {
    let tree = parse_str("('Wilson''s Storm-petrel':1,Fork tailed Storm petrel:2);").unwrap();
    assert_eq!(
        tree.tip_labels(),
        vec!["Wilson's Storm-petrel", "Fork tailed Storm petrel"]
    );
}

#[test]
fn test_unquoted_labels_trimmed() {
    let tree = parse_str("(A ,\tB\n);").unwrap();
    assert_eq!(tree.tip_labels(), vec!["A", "B"]);

    let quoted = parse_str("('A ',B);").unwrap();
    assert_eq!(quoted.tip_labels(), vec!["A ", "B"]);
}

#[test]
fn test_missing_terminator() {
    let tree = parse_str("((A,B),C)").unwrap();
    assert_eq!(tree.root_label(), "<2>");

    let strict = ParseOptions::default().with_strict_terminator();
    let error = parse_str_with("((A,B),C)", &strict).unwrap_err();
    assert_eq!(error.kind(), &ParsingErrorType::MissingTerminator);
}

#[test]
fn test_single_leaf_gets_synthetic_root() {
    let tree = parse_str("A:0.5;").unwrap();
    assert_eq!(tree.root_label(), "<1>");
    assert_eq!(tree.descendants("<1>").unwrap(), vec!["A"]);
    assert_eq!(tree.ancestor("A").unwrap(), Some("<1>"));
    assert_eq!(tree.branch_length("A").unwrap().unwrap().as_str(), "0.5");
}

#[test]
fn test_malformed_inputs() {
    let unbalanced = ParsingErrorType::UnbalancedParentheses(String::new());
    let cases = [
        ("", ParsingErrorType::EmptyInput),
        ("   \n", ParsingErrorType::EmptyInput),
        ("(A,B));", unbalanced.clone()),
        ("((A,B),C", unbalanced),
        ("(A,B);(C,D);", ParsingErrorType::TrailingContent),
        ("(A,);", ParsingErrorType::EmptyLabel),
        ("(,B);", ParsingErrorType::EmptyLabel),
        ("((A),B);", ParsingErrorType::TooFewChildren(1)),
        ("(<1>,B);", ParsingErrorType::LabelCollision("<1>".to_string())),
        ("(A[oops,B);", ParsingErrorType::UnclosedComment),
        ("('A,B);", ParsingErrorType::UnclosedQuote),
    ];

    for (newick, expected) in cases {
        let error = parse_str(newick).unwrap_err();
        assert_eq!(
            discriminant(error.kind()),
            discriminant(&expected),
            "{newick:?}: {error}"
        );
    }
}

#[test]
fn test_label_collision_flag() {
    let error = parse_str("('<7>',B);").unwrap_err();
    assert!(error.is_label_collision());
}

// --- WRITER ---
#[test]
fn test_written_forms() {
    let tree = parse_str("((A:1,B:2)0.9:3,C:4);").unwrap();
    assert_eq!(tree.labeled_newick(), "((A:1,B:2)<1>0.9:3,C:4)<2>;");
    assert_eq!(tree.labeled_topology(), "((A,B)<1>,C)<2>;");
    assert_eq!(tree.bare_topology(), "((A,B),C);");
    assert_eq!(tree.to_newick(NewickStyle::Original), "((A:1,B:2)0.9:3,C:4);");
}

#[test]
fn test_original_form_reparses_to_same_table() {
    for newick in TREES {
        let tree = parse_str(newick).unwrap();
        let written = tree.to_newick(NewickStyle::Original);
        let reparsed = parse_str(&written).unwrap();
        assert_eq!(tree.records(), reparsed.records(), "{newick} -> {written}");
    }
}

// --- PARSER REUSE ---
#[test]
fn test_parser_reuse_restarts_numbering() {
    let mut parser = NewickParser::new_defaults();
    let first = parser.parse_str("((A,B),(C,D));").unwrap();
    let second = parser.parse_str("((E,F),G);").unwrap();
    assert_eq!(first.root_label(), "<3>");
    assert_eq!(second.root_label(), "<2>");
    assert_eq!(second.clade("<1>").unwrap(), vec!["E", "F"]);

    // A failure does not poison the next tree
    assert!(parser.parse_str("((A,B);").is_err());
    let third = parser.parse_str("(X,Y);").unwrap();
    assert_eq!(third.root_label(), "<1>");
}
