//! Review topics and the score domains they accept.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{ReviewTopicId, ValidationError};

use super::{Description, Entity, EntityCollection, PeerReviewScore, ProjectError, Title};

/// Title of the topic added when formation finishes without one.
pub const DEFAULT_REVIEW_TOPIC_TITLE: &str = "Contribution";

/// One selectable value of a discrete review topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteChoice {
    pub label: String,
    pub value: f64,
}

/// The values a review topic accepts as scores.
///
/// Deserialization runs the same checks as the constructors. Values built
/// from the variants directly are checked when handed to the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", try_from = "UncheckedInput")]
pub enum ReviewTopicInput {
    Continuous { min: f64, max: f64 },
    Discrete { choices: Vec<DiscreteChoice> },
}

/// Wire shape of `ReviewTopicInput` before validation.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum UncheckedInput {
    Continuous { min: f64, max: f64 },
    Discrete { choices: Vec<DiscreteChoice> },
}

impl TryFrom<UncheckedInput> for ReviewTopicInput {
    type Error = ValidationError;

    fn try_from(unchecked: UncheckedInput) -> Result<Self, Self::Error> {
        match unchecked {
            UncheckedInput::Continuous { min, max } => Self::continuous(min, max),
            UncheckedInput::Discrete { choices } => Self::discrete(choices),
        }
    }
}

impl ReviewTopicInput {
    pub fn continuous(min: f64, max: f64) -> Result<Self, ValidationError> {
        let input = ReviewTopicInput::Continuous { min, max };
        input.validate()?;
        Ok(input)
    }

    pub fn discrete(choices: Vec<DiscreteChoice>) -> Result<Self, ValidationError> {
        let input = ReviewTopicInput::Discrete { choices };
        input.validate()?;
        Ok(input)
    }

    /// Continuous bounds must be finite with `0 <= min < max`. Discrete
    /// choices must be non-empty with unique labels and unique values `>= 0`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            ReviewTopicInput::Continuous { min, max } => {
                if !min.is_finite() || *min < 0.0 {
                    return Err(ValidationError::out_of_range("min", 0.0, f64::MAX, *min));
                }
                if !max.is_finite() || max <= min {
                    return Err(ValidationError::out_of_range("max", *min, f64::MAX, *max));
                }
                Ok(())
            }
            ReviewTopicInput::Discrete { choices } => validate_choices(choices),
        }
    }

    /// Returns true if `score` lies in this input's domain.
    pub fn accepts(&self, score: PeerReviewScore) -> bool {
        let value = score.value();
        match self {
            ReviewTopicInput::Continuous { min, max } => value >= *min && value <= *max,
            ReviewTopicInput::Discrete { choices } => {
                choices.iter().any(|choice| choice.value == value)
            }
        }
    }

    /// The score given to every peer when a slate is filled in on someone's behalf.
    pub fn uniform_score(&self) -> PeerReviewScore {
        let value = match self {
            ReviewTopicInput::Continuous { min, max } => (min + max) / 2.0,
            ReviewTopicInput::Discrete { choices } => choices
                .iter()
                .map(|choice| choice.value)
                .fold(0.0, f64::max),
        };
        PeerReviewScore::clamped(value)
    }
}

fn validate_choices(choices: &[DiscreteChoice]) -> Result<(), ValidationError> {
    if choices.is_empty() {
        return Err(ValidationError::empty_field("choices"));
    }
    let mut labels = HashSet::new();
    let mut values: Vec<f64> = Vec::with_capacity(choices.len());
    for choice in choices {
        if choice.label.trim().is_empty() {
            return Err(ValidationError::empty_field("choices.label"));
        }
        if !labels.insert(choice.label.trim()) {
            return Err(ValidationError::invalid_format(
                "choices.label",
                format!("duplicate label '{}'", choice.label),
            ));
        }
        if !choice.value.is_finite() || choice.value < 0.0 {
            return Err(ValidationError::out_of_range(
                "choices.value",
                0.0,
                f64::MAX,
                choice.value,
            ));
        }
        if values.contains(&choice.value) {
            return Err(ValidationError::invalid_format(
                "choices.value",
                format!("duplicate value {}", choice.value),
            ));
        }
        values.push(choice.value);
    }
    Ok(())
}

/// An axis along which peers evaluate each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewTopic {
    id: ReviewTopicId,
    title: Title,
    description: Description,
    input: Option<ReviewTopicInput>,
    consensuality: Option<f64>,
}

impl ReviewTopic {
    pub fn new(title: Title, description: Description, input: Option<ReviewTopicInput>) -> Self {
        Self {
            id: ReviewTopicId::new(),
            title,
            description,
            input,
            consensuality: None,
        }
    }

    /// The fallback topic for projects that define none.
    pub fn default_contribution() -> Result<Self, ValidationError> {
        Ok(Self::new(
            Title::new(DEFAULT_REVIEW_TOPIC_TITLE)?,
            Description::new("How much did each peer contribute to the project?")?,
            Some(ReviewTopicInput::continuous(0.0, 100.0)?),
        ))
    }

    pub fn reconstitute(
        id: ReviewTopicId,
        title: Title,
        description: Description,
        input: Option<ReviewTopicInput>,
        consensuality: Option<f64>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            input,
            consensuality,
        }
    }

    pub fn id(&self) -> ReviewTopicId {
        self.id
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn input(&self) -> Option<&ReviewTopicInput> {
        self.input.as_ref()
    }

    /// Consensuality of the last completed review cycle.
    pub fn consensuality(&self) -> Option<f64> {
        self.consensuality
    }

    /// Fails with `ScoreRejected` if the score lies outside this topic's input.
    pub fn assert_accepts(&self, score: PeerReviewScore) -> Result<(), ProjectError> {
        match &self.input {
            Some(input) if !input.accepts(score) => Err(ProjectError::ScoreRejected {
                review_topic_id: self.id,
                score: score.value(),
            }),
            _ => Ok(()),
        }
    }

    pub fn uniform_score(&self) -> PeerReviewScore {
        self.input
            .as_ref()
            .map(ReviewTopicInput::uniform_score)
            .unwrap_or_else(|| PeerReviewScore::clamped(1.0))
    }

    pub(super) fn update(
        &mut self,
        title: Title,
        description: Description,
        input: Option<ReviewTopicInput>,
    ) {
        self.title = title;
        self.description = description;
        self.input = input;
    }

    pub(super) fn set_consensuality(&mut self, consensuality: f64) {
        self.consensuality = Some(consensuality);
    }
}

impl Entity for ReviewTopic {
    type Id = ReviewTopicId;
    const NAME: &'static str = "ReviewTopic";

    fn id(&self) -> ReviewTopicId {
        self.id
    }

    fn not_found(id: ReviewTopicId) -> ProjectError {
        ProjectError::ReviewTopicNotFound(id)
    }
}

pub type ReviewTopicCollection = EntityCollection<ReviewTopic>;

#[cfg(test)]
mod tests {
    use super::*;

    fn score(value: f64) -> PeerReviewScore {
        PeerReviewScore::new(value).unwrap()
    }

    fn choice(label: &str, value: f64) -> DiscreteChoice {
        DiscreteChoice {
            label: label.to_string(),
            value,
        }
    }

    #[test]
    fn continuous_requires_increasing_non_negative_bounds() {
        assert!(ReviewTopicInput::continuous(-1.0, 5.0).is_err());
        assert!(ReviewTopicInput::continuous(5.0, 5.0).is_err());
        assert!(ReviewTopicInput::continuous(0.0, 5.0).is_ok());
    }

    #[test]
    fn continuous_accepts_inclusive_range() {
        let input = ReviewTopicInput::continuous(1.0, 5.0).unwrap();
        assert!(input.accepts(score(1.0)));
        assert!(input.accepts(score(5.0)));
        assert!(!input.accepts(score(5.5)));
        assert!(!input.accepts(score(0.0)));
    }

    #[test]
    fn discrete_rejects_duplicates_and_empty() {
        assert!(ReviewTopicInput::discrete(vec![]).is_err());
        assert!(ReviewTopicInput::discrete(vec![choice("low", 1.0), choice("low", 2.0)]).is_err());
        assert!(ReviewTopicInput::discrete(vec![choice("low", 1.0), choice("high", 1.0)]).is_err());
    }

    #[test]
    fn discrete_accepts_only_listed_values() {
        let input =
            ReviewTopicInput::discrete(vec![choice("low", 1.0), choice("high", 3.0)]).unwrap();
        assert!(input.accepts(score(3.0)));
        assert!(!input.accepts(score(2.0)));
        assert_eq!(input.uniform_score().value(), 3.0);
    }

    #[test]
    fn topic_without_input_accepts_any_score() {
        let topic = ReviewTopic::new(Title::new("Effort").unwrap(), Description::default(), None);
        assert!(topic.assert_accepts(score(1_000.0)).is_ok());
        assert_eq!(topic.uniform_score().value(), 1.0);
    }

    #[test]
    fn topic_rejects_out_of_domain_score() {
        let topic = ReviewTopic::default_contribution().unwrap();
        assert!(matches!(
            topic.assert_accepts(score(150.0)),
            Err(ProjectError::ScoreRejected { score, .. }) if score == 150.0
        ));
        assert_eq!(topic.uniform_score().value(), 50.0);
    }

    #[test]
    fn validate_catches_inputs_built_from_variants() {
        assert!(ReviewTopicInput::Continuous { min: 10.0, max: 1.0 }
            .validate()
            .is_err());
        assert!(ReviewTopicInput::Continuous { min: -1.0, max: 1.0 }
            .validate()
            .is_err());
        assert!(ReviewTopicInput::Discrete { choices: vec![] }
            .validate()
            .is_err());
        assert!(ReviewTopicInput::Discrete {
            choices: vec![choice("a", 1.0), choice("b", 1.0)],
        }
        .validate()
        .is_err());
        assert!(ReviewTopicInput::Continuous { min: 0.0, max: 1.0 }
            .validate()
            .is_ok());
    }

    #[test]
    fn deserializing_rejects_invalid_shapes() {
        let inverted: Result<ReviewTopicInput, _> =
            serde_json::from_value(serde_json::json!({"kind": "continuous", "min": 10.0, "max": 1.0}));
        assert!(inverted.is_err());

        let empty: Result<ReviewTopicInput, _> =
            serde_json::from_value(serde_json::json!({"kind": "discrete", "choices": []}));
        assert!(empty.is_err());

        let valid: ReviewTopicInput =
            serde_json::from_value(serde_json::json!({"kind": "continuous", "min": 0.0, "max": 5.0}))
                .unwrap();
        assert_eq!(valid, ReviewTopicInput::continuous(0.0, 5.0).unwrap());
    }

    #[test]
    fn input_serializes_with_kind_tag() {
        let json = serde_json::to_value(ReviewTopicInput::continuous(0.0, 10.0).unwrap()).unwrap();
        assert_eq!(json["kind"], "continuous");
        assert_eq!(json["max"], 10.0);
    }
}
