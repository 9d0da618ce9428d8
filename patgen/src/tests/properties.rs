use proptest::prelude::*;

use crate::{Dictionary, Layer, LayerKind, LengthRange, Margins, PatternSet, Project, Selector, Word};

fn arb_word() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(prop::sample::select(vec!['a', 'b', 'c', 'd']), 1..8),
        any::<u8>(),
    )
        .prop_map(|(chars, mask)| {
            let mut line = String::new();
            for (i, c) in chars.into_iter().enumerate() {
                if i > 0 && mask & (1 << (i % 8)) != 0 {
                    line.push('-');
                }
                line.push(c);
            }
            line
        })
}

fn arb_annotated_word() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (
            prop::sample::select(vec!['a', 'b', 'c']),
            prop::sample::select(vec![None, Some('-'), Some('.'), Some('*')]),
        ),
        1..8,
    )
    .prop_map(|items| {
        let mut line = String::new();
        for (c, marker) in items {
            line.push(c);
            line.extend(marker);
        }
        line
    })
}

fn arb_rules() -> impl Strategy<Value = Vec<(String, usize)>> {
    prop::collection::vec(("[.ab]{1,3}", 0usize..4), 0..12).prop_map(|rules| {
        rules
            .into_iter()
            .map(|(chunk, offset)| {
                let offset = offset.min(chunk.len());
                (chunk, offset)
            })
            .collect()
    })
}

fn arb_dictionary() -> impl Strategy<Value = Dictionary> {
    prop::collection::vec(arb_word(), 1..16).prop_map(|lines| Dictionary::parse(&lines.join("\n")))
}

fn arb_selector() -> impl Strategy<Value = Selector> {
    (1u8..4, 1u8..4, 1u8..4)
        .prop_map(|(g, b, t)| Selector::new(f64::from(g), f64::from(b), f64::from(t)))
}

fn train(dict: Dictionary, selector: Selector, num_levels: usize) -> Project {
    let mut project = Project::new(dict, Some(Margins::new(1, 1))).unwrap();
    let range = LengthRange::new(1, 3).unwrap();
    for _ in 0..num_levels {
        project.train_new_layer(range, selector).unwrap();
    }
    project
}

proptest! {
    #[test]
    fn prop_state_matches_evaluation(
        dict in arb_dictionary(),
        selector in arb_selector(),
        num_levels in 1usize..4,
    ) {
        let project = train(dict, selector, num_levels);
        let evaluation = project.evaluate();
        prop_assert_eq!(project.total_hyphens(), evaluation.total);
        prop_assert_eq!(project.missed(), evaluation.missed);
        prop_assert_eq!(project.false_hyphens(), evaluation.false_hyphens);
    }

    #[test]
    fn prop_compact_preserves_hyphenation(
        dict in arb_dictionary(),
        selector in arb_selector(),
        num_levels in 1usize..4,
    ) {
        let mut project = train(dict, selector, num_levels);
        let before: Vec<_> = project
            .dictionary()
            .iter()
            .map(|w| project.hyphenate(w.text()))
            .collect();
        let num_patterns = project.pattern_set().num_patterns();

        let removed = project.compact();

        prop_assert_eq!(num_patterns, project.pattern_set().num_patterns() + removed);
        let after: Vec<_> = project
            .dictionary()
            .iter()
            .map(|w| project.hyphenate(w.text()))
            .collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_import_preserves_hyphenation(
        dict in arb_dictionary(),
        selector in arb_selector(),
        num_levels in 1usize..4,
    ) {
        let project = train(dict, selector, num_levels);
        let mut tex = vec![];
        project.pattern_set().write_tex(&mut tex, &[]).unwrap();
        let (patterns, _) = PatternSet::from_tex(tex.as_slice()).unwrap();
        for word in project.dictionary() {
            prop_assert_eq!(
                project.hyphenate(word.text()),
                patterns.hyphenate(word.text(), project.margins())
            );
        }
    }

    #[test]
    fn prop_predictions_respect_margins(
        dict in arb_dictionary(),
        selector in arb_selector(),
    ) {
        let project = train(dict, selector, 1);
        for word in project.dictionary() {
            for pos in project.hyphenate(word.text()) {
                prop_assert!(pos >= 1 && pos + 1 <= word.len());
            }
        }
    }

    #[test]
    fn prop_word_format_parse(line in arb_word(), weight in 1u32..10) {
        let word = Word::parse(&format!("{weight}{line}"));
        prop_assert_eq!(&word, &Word::parse(&word.format()));
    }

    #[test]
    fn prop_word_markers_roundtrip(line in arb_annotated_word()) {
        let word = Word::parse(&line);
        let reparsed = Word::parse(&word.format());
        prop_assert_eq!(word.hyphens(), reparsed.hyphens());
        prop_assert_eq!(word.missed(), reparsed.missed());
        prop_assert_eq!(word.false_hyphens(), reparsed.false_hyphens());
    }

    #[test]
    fn prop_predict_is_monotone(
        rules in arb_rules(),
        chunk in "[.ab]{1,3}",
        offset in 0usize..4,
        word in "[ab]{1,8}",
    ) {
        let margins = Margins::new(1, 1);
        let mut layer = Layer::from_rules(LayerKind::Hyphenating, rules);
        let before = layer.predict(&word, margins);
        layer.insert(&chunk, offset.min(chunk.len()));
        let after = layer.predict(&word, margins);
        prop_assert!(before.is_subset(&after));
    }
}
