//! Provider roster: ordered workers plus one judge

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::Serialize;

/// Ordered worker roster and the judge consulted on disagreement
///
/// Worker order is significant: it breaks ties deterministically and decides
/// which worker answers in single-call mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderRoster {
    workers: Vec<Model>,
    judge: Model,
}

impl Default for ProviderRoster {
    fn default() -> Self {
        Self {
            workers: Model::default_workers(),
            judge: Model::default_judge(),
        }
    }
}

impl ProviderRoster {
    /// Create a roster from explicit workers and judge
    pub fn new(workers: Vec<Model>, judge: Model) -> Result<Self, DomainError> {
        if workers.is_empty() {
            return Err(DomainError::NoWorkers);
        }
        for (i, model) in workers.iter().enumerate() {
            if workers[..i].contains(model) {
                return Err(DomainError::InvalidRoster(format!(
                    "worker '{}' listed more than once",
                    model
                )));
            }
        }
        Ok(Self { workers, judge })
    }

    /// Create a roster from a flat list: every entry but the last is a
    /// worker, the last one is the judge.
    ///
    /// # Example
    ///
    /// ```
    /// use ensemble_domain::{Model, quorum::ProviderRoster};
    ///
    /// let roster = ProviderRoster::from_models(vec![
    ///     Model::Gemini25Flash,
    ///     Model::Gpt4oMini,
    ///     Model::Gemini25Pro,
    /// ]).unwrap();
    /// assert_eq!(roster.workers().len(), 2);
    /// assert_eq!(roster.judge(), &Model::Gemini25Pro);
    /// ```
    pub fn from_models(mut models: Vec<Model>) -> Result<Self, DomainError> {
        if models.len() < 2 {
            return Err(DomainError::InvalidRoster(format!(
                "need at least one worker and a judge, got {} model(s)",
                models.len()
            )));
        }
        let judge = models.pop().ok_or(DomainError::NoWorkers)?;
        Self::new(models, judge)
    }

    pub fn workers(&self) -> &[Model] {
        &self.workers
    }

    pub fn judge(&self) -> &Model {
        &self.judge
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Roster position of a worker
    pub fn position(&self, model: &Model) -> Option<usize> {
        self.workers.iter().position(|m| m == model)
    }

    /// Worker asked in single-call mode
    pub fn first_worker(&self) -> &Model {
        // `new` guarantees at least one worker
        &self.workers[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster() {
        let roster = ProviderRoster::default();
        assert_eq!(roster.worker_count(), 3);
        assert_eq!(roster.judge(), &Model::Gemini25Pro);
        assert_eq!(roster.first_worker(), &Model::Gemini25Flash);
        assert_eq!(roster.position(&Model::Gemini20Flash), Some(1));
    }

    #[test]
    fn test_from_models_requires_worker_and_judge() {
        assert!(matches!(
            ProviderRoster::from_models(vec![Model::Gpt4o]),
            Err(DomainError::InvalidRoster(_))
        ));
        assert!(ProviderRoster::from_models(vec![Model::Gpt4o, Model::Gpt41]).is_ok());
    }

    #[test]
    fn test_empty_workers_rejected() {
        assert_eq!(
            ProviderRoster::new(vec![], Model::Gpt41),
            Err(DomainError::NoWorkers)
        );
    }

    #[test]
    fn test_duplicate_workers_rejected() {
        let result = ProviderRoster::new(vec![Model::Gpt4o, Model::Gpt4o], Model::Gpt41);
        assert!(matches!(result, Err(DomainError::InvalidRoster(_))));
    }
}
