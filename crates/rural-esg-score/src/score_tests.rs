// SPDX-License-Identifier: Apache-2.0

use super::*;
use proptest::prelude::*;
use rural_esg_model::catalog::QUESTION_COUNT;
use std::collections::BTreeMap;

fn uniform_answers(value: u8) -> AnswerSet {
    let raw: BTreeMap<u16, u8> = (1..=QUESTION_COUNT as u16).map(|id| (id, value)).collect();
    AnswerSet::from_map(raw).expect("uniform answer set")
}

#[test]
fn all_ones_scores_floor_of_every_dimension() {
    let card = score_answers(&uniform_answers(1)).expect("score all-1");
    assert_eq!(card.environmental.score, 25);
    assert_eq!(card.social.score, 8);
    assert_eq!(card.governance.score, 8);
    for dimension in Dimension::ALL {
        assert_eq!(
            card.dimension(dimension).classification,
            Classification::Reativa
        );
    }
}

#[test]
fn all_threes_scores_ceiling_of_every_dimension() {
    let card = score_answers(&uniform_answers(3)).expect("score all-3");
    assert_eq!(card.environmental.score, 75);
    assert_eq!(card.social.score, 24);
    assert_eq!(card.governance.score, 24);
    for dimension in Dimension::ALL {
        assert_eq!(
            card.dimension(dimension).classification,
            Classification::Proativa
        );
    }
}

#[test]
fn environmental_band_boundaries() {
    assert_eq!(
        classify(Dimension::Environmental, 42),
        Classification::Reativa
    );
    assert_eq!(
        classify(Dimension::Environmental, 43),
        Classification::Normativa
    );
    assert_eq!(
        classify(Dimension::Environmental, 59),
        Classification::Normativa
    );
    assert_eq!(
        classify(Dimension::Environmental, 60),
        Classification::Proativa
    );
}

#[test]
fn social_and_governance_band_boundaries() {
    for dimension in [Dimension::Social, Dimension::Governance] {
        assert_eq!(classify(dimension, 14), Classification::Reativa);
        assert_eq!(classify(dimension, 15), Classification::Normativa);
        assert_eq!(classify(dimension, 20), Classification::Normativa);
        assert_eq!(classify(dimension, 21), Classification::Proativa);
    }
}

#[test]
fn bands_partition_each_reachable_range_without_gap_or_overlap() {
    for dimension in Dimension::ALL {
        let [reactive, normative, proactive] = bands_for(dimension);
        assert_eq!(normative.min, reactive.max + 1);
        assert_eq!(proactive.min, normative.max + 1);
        for score in reactive.min..=proactive.max {
            let matches = bands_for(dimension)
                .iter()
                .filter(|b| score >= b.min && score <= b.max)
                .count();
            assert_eq!(matches, 1, "score {score} in {dimension} bands");
        }
    }
}

#[test]
fn classification_is_idempotent() {
    for dimension in Dimension::ALL {
        let [reactive, _, proactive] = bands_for(dimension);
        for score in reactive.min..=proactive.max {
            assert_eq!(classify(dimension, score), classify(dimension, score));
        }
    }
}

proptest! {
    #[test]
    fn any_valid_answer_set_scores_inside_the_fixed_ranges(
        responses in proptest::collection::vec(1u8..=3, QUESTION_COUNT)
    ) {
        let raw: BTreeMap<u16, u8> = responses
            .iter()
            .enumerate()
            .map(|(index, &value)| (index as u16 + 1, value))
            .collect();
        let set = AnswerSet::from_map(raw).expect("complete answer set");
        let card = score_answers(&set).expect("score");
        prop_assert!((25..=75).contains(&card.environmental.score));
        prop_assert!((8..=24).contains(&card.social.score));
        prop_assert!((8..=24).contains(&card.governance.score));
        for dimension in Dimension::ALL {
            let result = card.dimension(dimension);
            prop_assert_eq!(
                result.classification,
                classify(dimension, result.score)
            );
        }
    }
}
