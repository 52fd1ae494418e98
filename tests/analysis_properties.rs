//! Property tests for the peer review analysis and slate validation.

use proptest::prelude::*;

use collab_projects::domain::analysis::{
    ConsensualityAlgorithm, ContributionsComputer, MeanContributionsComputer, ReviewEngine,
    ScoreMatrix,
};
use collab_projects::domain::foundation::{RoleId, UserId};
use collab_projects::domain::project::{
    PeerReviewScore, Project, ProjectError, ProjectPolicies, SubmittedScore,
};

const ALGORITHMS: [ConsensualityAlgorithm; 3] = [
    ConsensualityAlgorithm::MeanDeviation,
    ConsensualityAlgorithm::Variance,
    ConsensualityAlgorithm::PairwiseRelativeJudgements,
];

/// Square raw score matrices of 3..=7 peers with scores in 0..=100.
fn raw_matrix() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (3usize..=7).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(0u32..=100, n), n)
            .prop_map(|rows| {
                rows.into_iter()
                    .map(|row| row.into_iter().map(f64::from).collect())
                    .collect()
            })
    })
}

fn project_in_peer_review(roles: usize) -> (Project, Vec<RoleId>) {
    let mut project = Project::create(
        UserId::new("creator").unwrap(),
        "Property",
        "",
        ProjectPolicies::default(),
    )
    .unwrap();
    let mut role_ids = Vec::new();
    for i in 0..roles {
        let role = project.add_role(&format!("Role {}", i), "").unwrap();
        project
            .assign_user_to_role(UserId::new(format!("user-{}", i)).unwrap(), role.id())
            .unwrap();
        role_ids.push(role.id());
    }
    project.finish_formation().unwrap();
    project.take_events();
    (project, role_ids)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn contribution_shares_sum_to_one(raw in raw_matrix()) {
        let matrix = ScoreMatrix::from_rows(raw).unwrap();
        let shares = MeanContributionsComputer.shares(&matrix).unwrap();

        let total: f64 = shares.iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-9, "shares summed to {}", total);
        prop_assert!(shares.iter().all(|s| *s >= 0.0));
    }

    #[test]
    fn consensuality_stays_in_unit_interval(raw in raw_matrix()) {
        let matrix = ScoreMatrix::from_rows(raw).unwrap();

        for algorithm in ALGORITHMS {
            let value = algorithm.computer().consensuality(&matrix).unwrap();
            prop_assert!(
                (0.0..=1.0).contains(&value),
                "{} gave {}",
                algorithm,
                value
            );
        }
    }

    #[test]
    fn rescaling_a_slate_changes_nothing(raw in raw_matrix(), factor in 1u32..=10) {
        let scaled: Vec<Vec<f64>> = raw
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if i == 0 {
                    row.iter().map(|s| s * f64::from(factor)).collect()
                } else {
                    row.clone()
                }
            })
            .collect();
        let roles: Vec<RoleId> = (0..raw.len()).map(|_| RoleId::new()).collect();
        let original = ScoreMatrix::from_raw(roles.clone(), raw).unwrap();
        let rescaled = ScoreMatrix::from_raw(roles, scaled).unwrap();

        let a = MeanContributionsComputer.shares(&original).unwrap();
        let b = MeanContributionsComputer.shares(&rescaled).unwrap();
        for (x, y) in a.iter().zip(&b) {
            prop_assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn only_complete_slates_are_accepted(
        roles in 4usize..=6,
        picks in prop::collection::vec(0usize..6, 0..8),
    ) {
        let (mut project, role_ids) = project_in_peer_review(roles);
        let before = project.clone();
        let sender = role_ids[0];
        let topic_id = project.review_topics().ids().next().unwrap();

        let scores: Vec<SubmittedScore> = picks
            .iter()
            .filter(|i| **i < roles)
            .map(|i| SubmittedScore::new(role_ids[*i], PeerReviewScore::new(10.0).unwrap()))
            .collect();
        let mut named: Vec<usize> = picks.iter().copied().filter(|i| *i < roles).collect();
        named.sort_unstable();
        let complete = named == (1..roles).collect::<Vec<_>>();

        let engine = ReviewEngine::default();
        let result = project.submit_peer_reviews(sender, topic_id, &scores, &engine);

        if complete {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(
                result,
                Err(ProjectError::SelfPeerReview { .. })
                    | Err(ProjectError::PeerReviewSubmissionMismatch { .. })
            ), "unexpected result: {:?}", result);
            prop_assert_eq!(project, before);
        }
    }
}

#[test]
fn reference_cases_match_known_values() {
    // One member did everything: all others credit member 0, member 0 splits evenly.
    let one_did_it_all = vec![
        vec![0.0, 1.0, 1.0, 1.0],
        vec![1.0, 0.0, 0.0, 0.0],
        vec![1.0, 0.0, 0.0, 0.0],
        vec![1.0, 0.0, 0.0, 0.0],
    ];
    let matrix = ScoreMatrix::from_rows(one_did_it_all).unwrap();

    let shares = MeanContributionsComputer.shares(&matrix).unwrap();
    assert!((shares[0] - 0.75).abs() < 1e-9);
    for share in &shares[1..] {
        assert!((share - 1.0 / 12.0).abs() < 1e-9);
    }

    let cyclic = ScoreMatrix::cyclic_reference(4, 1e-6).unwrap();
    for algorithm in ALGORITHMS {
        let value = algorithm.computer().consensuality(&cyclic).unwrap();
        assert!(value.abs() < 1e-9, "{} scored the cycle {}", algorithm, value);
    }
}
