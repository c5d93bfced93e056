//! Weighted rubric scoring.
//!
//! The criteria list is host-supplied configuration, fixed for the
//! session. Only level selections and comments mutate afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from rubric operations.
#[derive(Debug, Error)]
pub enum RubricError {
    #[error("criterion not found: {0}")]
    UnknownCriterion(String),
    #[error("level index {index} out of range for criterion {id} ({len} levels)")]
    InvalidIndex {
        id: String,
        index: usize,
        len: usize,
    },
    #[error("criterion {0} has no suggested level")]
    NoSuggestion(String),
    #[error("a rubric needs at least one criterion")]
    EmptyRubric,
    #[error("criterion {0} has no levels")]
    NoLevels(String),
}

/// A display label in both platform languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualLabel {
    pub en: String,
    pub zh: String,
}

impl BilingualLabel {
    pub fn new(en: impl Into<String>, zh: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            zh: zh.into(),
        }
    }
}

/// One performance level of a criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricLevel {
    pub label: BilingualLabel,
    pub points: f64,
    pub description: String,
}

impl RubricLevel {
    pub fn new(label: BilingualLabel, points: f64, description: impl Into<String>) -> Self {
        Self {
            label,
            points,
            description: description.into(),
        }
    }
}

/// One scored dimension of the rubric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub id: String,
    pub label: BilingualLabel,
    /// Informational weight shown to the grader. Does not rescale level
    /// points.
    pub weight_percent: f64,
    /// Ordered performance levels.
    pub levels: Vec<RubricLevel>,
    /// Selected level index. `None` = unscored.
    pub selected_level: Option<usize>,
    /// Free-text grader comment.
    pub comment: String,
    /// Precomputed hint index, if the platform supplied one.
    pub suggested_level: Option<usize>,
}

impl RubricCriterion {
    pub fn new(
        id: impl Into<String>,
        label: BilingualLabel,
        weight_percent: f64,
        levels: Vec<RubricLevel>,
    ) -> Self {
        Self {
            id: id.into(),
            label,
            weight_percent,
            levels,
            selected_level: None,
            comment: String::new(),
            suggested_level: None,
        }
    }

    /// Attach a precomputed hint.
    pub fn with_suggestion(mut self, level_index: usize) -> Self {
        self.suggested_level = Some(level_index);
        self
    }

    /// Points awarded by the current selection; 0 while unscored.
    pub fn awarded_points(&self) -> f64 {
        self.selected_level
            .and_then(|i| self.levels.get(i))
            .map(|level| level.points)
            .unwrap_or(0.0)
    }

    /// Best achievable points across this criterion's levels.
    pub fn max_points(&self) -> f64 {
        self.levels.iter().fold(0.0, |acc, l| acc.max(l.points))
    }

    /// Whether the grader has picked a level.
    pub fn is_scored(&self) -> bool {
        self.selected_level.is_some()
    }
}

/// The rubric for one grading session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rubric {
    criteria: Vec<RubricCriterion>,
}

impl Rubric {
    /// Build a rubric from host configuration.
    ///
    /// Requires at least one criterion with at least one level, so
    /// `max_score` is never zero, and checks suggestion hints up front.
    pub fn new(criteria: Vec<RubricCriterion>) -> Result<Self, RubricError> {
        if criteria.is_empty() {
            return Err(RubricError::EmptyRubric);
        }
        for criterion in &criteria {
            if criterion.levels.is_empty() {
                return Err(RubricError::NoLevels(criterion.id.clone()));
            }
            if let Some(index) = criterion.suggested_level {
                if index >= criterion.levels.len() {
                    return Err(RubricError::InvalidIndex {
                        id: criterion.id.clone(),
                        index,
                        len: criterion.levels.len(),
                    });
                }
            }
        }
        Ok(Self { criteria })
    }

    /// The criteria in display and aggregation order.
    pub fn criteria(&self) -> &[RubricCriterion] {
        &self.criteria
    }

    /// Look up a criterion by id.
    pub fn criterion(&self, id: &str) -> Option<&RubricCriterion> {
        self.criteria.iter().find(|c| c.id == id)
    }

    fn criterion_mut(&mut self, id: &str) -> Result<&mut RubricCriterion, RubricError> {
        self.criteria
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RubricError::UnknownCriterion(id.to_string()))
    }

    /// Select a level for a criterion, or `None` to unscore it.
    pub fn set_level(&mut self, id: &str, level: Option<usize>) -> Result<(), RubricError> {
        let criterion = self.criterion_mut(id)?;
        if let Some(index) = level {
            if index >= criterion.levels.len() {
                return Err(RubricError::InvalidIndex {
                    id: criterion.id.clone(),
                    index,
                    len: criterion.levels.len(),
                });
            }
        }
        criterion.selected_level = level;
        Ok(())
    }

    /// Replace a criterion's comment.
    pub fn set_comment(&mut self, id: &str, text: impl Into<String>) -> Result<(), RubricError> {
        let criterion = self.criterion_mut(id)?;
        criterion.comment = text.into();
        Ok(())
    }

    /// Apply the precomputed hint as the selection.
    pub fn accept_suggestion(&mut self, id: &str) -> Result<(), RubricError> {
        let criterion = self.criterion_mut(id)?;
        let index = criterion
            .suggested_level
            .ok_or_else(|| RubricError::NoSuggestion(criterion.id.clone()))?;
        criterion.selected_level = Some(index);
        Ok(())
    }

    /// Sum of awarded points across all criteria.
    pub fn total_score(&self) -> f64 {
        self.criteria.iter().map(|c| c.awarded_points()).sum()
    }

    /// Sum of best achievable points across all criteria.
    pub fn max_score(&self) -> f64 {
        self.criteria.iter().map(|c| c.max_points()).sum()
    }

    /// Total as a percentage of the maximum.
    pub fn percentage(&self) -> f64 {
        self.total_score() / self.max_score() * 100.0
    }

    /// Clone the criteria in order, for snapshotting.
    pub fn to_vec(&self) -> Vec<RubricCriterion> {
        self.criteria.clone()
    }
}
