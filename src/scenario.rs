//! Scenario runner for single and batch benefit estimates
//!
//! Holds one set of assumptions and evaluates any number of requests against
//! it. Requests are independent, so batches and modality comparisons run in
//! parallel and one failing request never affects the others.

use std::path::Path;

use log::info;
use rayon::prelude::*;

use crate::affiliate::{BenefitCategory, Modality, ScenarioRequest};
use crate::assumptions::Assumptions;
use crate::benefits::{disability, old_age, survivorship, ScenarioResult};
use crate::error::{EngineError, EngineResult};

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let result = runner.run(&request)?;
/// println!("{}", result.summary().monthly_benefit);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    assumptions: Assumptions,
}

impl ScenarioRunner {
    /// Create runner with the built-in statutory assumptions
    pub fn new() -> Self {
        Self {
            assumptions: Assumptions::statutory().clone(),
        }
    }

    /// Create runner by loading assumptions from CSV files
    pub fn from_csv() -> EngineResult<Self> {
        Ok(Self {
            assumptions: Assumptions::from_csv()?,
        })
    }

    /// Create runner from specific assumptions directory
    pub fn from_csv_path(path: &Path) -> EngineResult<Self> {
        Ok(Self {
            assumptions: Assumptions::from_csv_path(path)?,
        })
    }

    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Validate and evaluate one request
    pub fn run(&self, request: &ScenarioRequest) -> EngineResult<ScenarioResult> {
        request.validate()?;
        info!(
            "running {} {} for age {} {}",
            request.category,
            request.modality,
            request.affiliate.age,
            request.affiliate.sex.as_str()
        );

        match request.category {
            BenefitCategory::OldAge => old_age::calculate(&self.assumptions, request),
            BenefitCategory::Disability => disability::calculate(&self.assumptions, request),
            BenefitCategory::Survivorship => survivorship::calculate(&self.assumptions, request),
        }
    }

    /// Evaluate many requests in parallel, results in input order
    pub fn run_batch(&self, requests: &[ScenarioRequest]) -> Vec<EngineResult<ScenarioResult>> {
        info!("running batch of {} scenarios", requests.len());
        requests.par_iter().map(|r| self.run(r)).collect()
    }

    /// Evaluate the same affiliate under every modality
    pub fn compare_modalities(
        &self,
        request: &ScenarioRequest,
    ) -> Vec<(Modality, EngineResult<ScenarioResult>)> {
        Modality::ALL
            .par_iter()
            .map(|&modality| (modality, self.run(&request.for_modality(modality))))
            .collect()
    }

    /// Every survivorship option the request's terms allow, for the same beneficiaries
    pub fn survivorship_options(&self, request: &ScenarioRequest) -> EngineResult<Vec<ScenarioResult>> {
        if request.category != BenefitCategory::Survivorship {
            return Err(EngineError::invalid(format!(
                "survivorship options requested for a {} scenario",
                request.category
            )));
        }
        request.validate()?;
        survivorship::all_options(&self.assumptions, request)
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
