use std::num::NonZeroUsize;

use crate::rules::{Rules, RulesError};

use super::{AutoplayGroup, Policy};

/// Builds an [AutoplayGroup].
#[derive(Debug, Default)]
pub struct AutoplayBuilder {
    pub rules: Option<Rules>,
    pub cycles: Option<usize>,
    pub seeds: Vec<u64>,
    policies: Vec<Box<dyn Policy>>,
}

#[derive(Debug, thiserror::Error)]
pub enum AutoplayBuildError {
    #[error("no policies were added")]
    NoPoliciesGiven,
    #[error("number of cycles must be greater than 0")]
    ZeroCycles,
    #[error(transparent)]
    Rules(#[from] RulesError),
}

impl AutoplayBuilder {
    /// Default number of cycles per run.
    pub const DEFAULT_CYCLES: usize = 100;

    /// Creates a new [AutoplayBuilder].
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `policy` to the group. Each policy is played once per seed.
    pub fn add_policy<P: Policy + 'static>(mut self, policy: P) -> Self {
        self.policies.push(Box::new(policy));

        self
    }

    /// Sets the rules every run is played under ([Rules::default] otherwise).
    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = Some(rules);

        self
    }

    /// Sets the number of ticks each run lasts for (default 100).
    pub fn cycles(mut self, cycles: usize) -> Self {
        self.cycles = Some(cycles);

        self
    }

    /// Adds seeds to play each policy with. A group without seeds plays
    /// each policy once with seed 0.
    pub fn seeds<I>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        self.seeds.extend(seeds);

        self
    }

    /// Creates an [AutoplayGroup] from the specified parameters.
    pub fn build(self) -> Result<AutoplayGroup, AutoplayBuildError> {
        use AutoplayBuildError::*;

        let AutoplayBuilder {
            rules,
            cycles,
            mut seeds,
            policies,
        } = self;

        if policies.is_empty() {
            return Err(NoPoliciesGiven);
        }
        let cycles = match cycles {
            Some(x) => NonZeroUsize::new(x).ok_or(ZeroCycles)?,
            None => NonZeroUsize::new(Self::DEFAULT_CYCLES).ok_or(ZeroCycles)?,
        };
        if seeds.is_empty() {
            seeds.push(0);
        }

        let rules = rules.unwrap_or_default();
        rules.validate()?;

        Ok(AutoplayGroup {
            rules,
            policies,
            seeds,
            cycles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AutoplayBuildError, AutoplayBuilder};
    use crate::{autoplay::Idle, rules::Rules};

    #[test]
    fn example_build() {
        AutoplayBuilder::new()
            .add_policy(Idle::new())
            .build()
            .expect("valid autoplay build");
    }

    #[test]
    fn missing_policies_rejected() {
        assert!(matches!(
            AutoplayBuilder::new().build(),
            Err(AutoplayBuildError::NoPoliciesGiven)
        ));
    }

    #[test]
    fn zero_cycles_rejected() {
        assert!(matches!(
            AutoplayBuilder::new().add_policy(Idle::new()).cycles(0).build(),
            Err(AutoplayBuildError::ZeroCycles)
        ));
    }

    #[test]
    fn invalid_rules_rejected() {
        let rules = Rules { build_step: 2.0, ..Default::default() };

        assert!(matches!(
            AutoplayBuilder::new().add_policy(Idle::new()).rules(rules).build(),
            Err(AutoplayBuildError::Rules(_))
        ));
    }
}
