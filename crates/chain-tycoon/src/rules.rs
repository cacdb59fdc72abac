//! Tunable constants of the game economy.
//!
//! [`Rules::default`] reproduces the standard campus economy. Rules can be
//! loaded from JSON with [`Rules::from_json`]; missing fields fall back to
//! their defaults.

use serde::{Deserialize, Serialize};

use crate::{
    activity::DEFAULT_LOG_CAPACITY,
    node::{KindTable, NodeKind},
    resources::{Amount, Cost, Resources},
};

/// How new nodes are positioned.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Nodes take the first unlocked, unoccupied plot of the campus map.
    /// Building fails when no such plot exists.
    #[default]
    Campus,
    /// Nodes are placed on a fixed grid of 3D positions, in build order.
    Grid,
}

/// Thresholds which unlock the non-default consensus modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusUnlocks {
    pub pos_knowledge: Amount,
    pub pbft_reputation: Amount,
    pub pbft_consensus_health: Amount,
}

impl Default for ConsensusUnlocks {
    fn default() -> Self {
        ConsensusUnlocks {
            pos_knowledge: 40.0,
            pbft_reputation: 60.0,
            pbft_consensus_health: 70.0,
        }
    }
}

/// Requirements and rewards of a consensus round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundRules {
    pub min_energy: Amount,
    pub energy_cost: Amount,
    pub token_reward: Amount,
    pub reputation_reward: Amount,
    pub health_gain: Amount,
}

impl Default for RoundRules {
    fn default() -> Self {
        RoundRules {
            min_energy: 30.0,
            energy_cost: 35.0,
            token_reward: 45.0,
            reputation_reward: 8.0,
            health_gain: 12.0,
        }
    }
}

/// Pricing of smart contract deployments. The cost of deploying grows
/// linearly with the current contract level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractRules {
    pub base_tokens: Amount,
    pub tokens_per_level: Amount,
    pub base_knowledge: Amount,
    pub knowledge_per_level: Amount,
    pub token_refund: Amount,
    pub knowledge_refund: Amount,
    pub reputation_reward: Amount,
    pub students_reward: Amount,
}

impl ContractRules {
    /// Cost of deploying the contract upgrade after `level`.
    pub fn cost(&self, level: u32) -> Cost {
        let level = level as Amount;
        Cost {
            tokens: self.base_tokens + self.tokens_per_level * level,
            knowledge: self.base_knowledge + self.knowledge_per_level * level,
            energy: 0.0,
        }
    }
}

impl Default for ContractRules {
    fn default() -> Self {
        ContractRules {
            base_tokens: 70.0,
            tokens_per_level: 20.0,
            base_knowledge: 14.0,
            knowledge_per_level: 6.0,
            token_refund: 40.0,
            knowledge_refund: 12.0,
            reputation_reward: 10.0,
            students_reward: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopRules {
    pub token_cost: Amount,
    pub knowledge_reward: Amount,
    pub reputation_reward: Amount,
    pub students_reward: Amount,
}

impl Default for WorkshopRules {
    fn default() -> Self {
        WorkshopRules {
            token_cost: 40.0,
            knowledge_reward: 18.0,
            reputation_reward: 4.0,
            students_reward: 10.0,
        }
    }
}

/// Every constant the reducer consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub build_costs: KindTable<Cost>,
    pub upgrade_costs: KindTable<Cost>,
    /// Per-tick output of an active level 1 node.
    pub production: KindTable<Resources>,
    /// Production bonus per level above 1.
    pub level_bonus: Amount,
    /// Construction progress gained per tick.
    pub build_step: Amount,
    /// A summary log entry is written every `summary_every` cycles.
    pub summary_every: u64,
    pub log_capacity: usize,
    pub energy_max: Amount,
    pub consensus_health_max: Amount,
    pub round: RoundRules,
    pub contract: ContractRules,
    pub workshop: WorkshopRules,
    pub consensus_unlocks: ConsensusUnlocks,
    /// Reject switches to consensus modes which are still locked.
    pub enforce_consensus_unlocks: bool,
    pub layout: Layout,
}

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("{table} cost for {kind} contains a negative or NaN value")]
    InvalidCost { table: &'static str, kind: NodeKind },
    #[error("build step {0} is not in the range (0.0, 1.0]")]
    InvalidBuildStep(Amount),
    #[error("level bonus {0} must be a non-negative number")]
    InvalidLevelBonus(Amount),
    #[error("summary interval must be greater than 0")]
    ZeroSummaryInterval,
    #[error("activity log capacity must be greater than 0")]
    ZeroLogCapacity,
    #[error("resource bound {0} must be a positive number")]
    InvalidBound(Amount),
    #[error("{field} is {value} but must be a non-negative number")]
    NegativeAmount { field: &'static str, value: Amount },
    #[error(
        "{kind} produces {value} {resource} per tick; only energy and \
         consensus health may be negative"
    )]
    InvalidProduction {
        kind: NodeKind,
        resource: &'static str,
        value: Amount,
    },
    #[error("could not parse rules")]
    Parse(#[from] serde_json::Error),
}

impl Rules {
    /// Parses rules from a JSON document and validates them.
    pub fn from_json(json: &str) -> Result<Rules, RulesError> {
        let rules: Rules = serde_json::from_str(json)?;
        rules.validate()?;

        Ok(rules)
    }

    /// Returns true if these rules can drive a game.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks that every table and constant is usable.
    pub fn validate(&self) -> Result<(), RulesError> {
        use RulesError::*;

        for (table, costs) in
            [("build", &self.build_costs), ("upgrade", &self.upgrade_costs)]
        {
            if let Some((kind, _)) = costs.iter().find(|(_, c)| !c.is_valid()) {
                return Err(InvalidCost { table, kind });
            }
        }

        if self.build_step.is_nan()
            || self.build_step <= 0.0
            || self.build_step > 1.0
        {
            return Err(InvalidBuildStep(self.build_step));
        }
        if self.level_bonus.is_nan() || self.level_bonus < 0.0 {
            return Err(InvalidLevelBonus(self.level_bonus));
        }
        if self.summary_every == 0 {
            return Err(ZeroSummaryInterval);
        }
        if self.log_capacity == 0 {
            return Err(ZeroLogCapacity);
        }
        if let Some(&bound) = [self.energy_max, self.consensus_health_max]
            .iter()
            .find(|b| b.is_nan() || **b <= 0.0)
        {
            return Err(InvalidBound(bound));
        }

        for (kind, output) in self.production.iter() {
            let signed = [
                ("energy", output.energy),
                ("consensus health", output.consensus_health),
            ];
            if let Some((resource, value)) =
                signed.into_iter().find(|(_, v)| !v.is_finite())
            {
                return Err(InvalidProduction { kind, resource, value });
            }

            let unsigned = [
                ("tokens", output.tokens),
                ("knowledge", output.knowledge),
                ("reputation", output.reputation),
                ("students", output.students_inspired),
            ];
            if let Some((resource, value)) =
                unsigned.into_iter().find(|(_, v)| !is_amount(*v))
            {
                return Err(InvalidProduction { kind, resource, value });
            }
        }

        if let Some((field, value)) =
            self.amounts().into_iter().find(|(_, v)| !is_amount(*v))
        {
            return Err(NegativeAmount { field, value });
        }

        Ok(())
    }

    /// Thresholds, rewards and refunds which must never be negative.
    fn amounts(&self) -> [(&'static str, Amount); 17] {
        let (round, contract, workshop) = (&self.round, &self.contract, &self.workshop);

        [
            ("round.min_energy", round.min_energy),
            ("round.energy_cost", round.energy_cost),
            ("round.token_reward", round.token_reward),
            ("round.reputation_reward", round.reputation_reward),
            ("round.health_gain", round.health_gain),
            ("contract.base_tokens", contract.base_tokens),
            ("contract.tokens_per_level", contract.tokens_per_level),
            ("contract.base_knowledge", contract.base_knowledge),
            ("contract.knowledge_per_level", contract.knowledge_per_level),
            ("contract.token_refund", contract.token_refund),
            ("contract.knowledge_refund", contract.knowledge_refund),
            ("contract.reputation_reward", contract.reputation_reward),
            ("contract.students_reward", contract.students_reward),
            ("workshop.token_cost", workshop.token_cost),
            ("workshop.knowledge_reward", workshop.knowledge_reward),
            ("workshop.reputation_reward", workshop.reputation_reward),
            ("workshop.students_reward", workshop.students_reward),
        ]
    }

    #[inline]
    pub fn build_cost(&self, kind: NodeKind) -> &Cost {
        self.build_costs.get(kind)
    }

    #[inline]
    pub fn upgrade_cost(&self, kind: NodeKind) -> &Cost {
        self.upgrade_costs.get(kind)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            build_costs: KindTable {
                miner: Cost::new(60.0, 2.0, 20.0),
                validator: Cost::new(80.0, 6.0, 25.0),
                dapp: Cost::new(90.0, 10.0, 15.0),
                research: Cost::new(70.0, 12.0, 10.0),
            },
            upgrade_costs: KindTable {
                miner: Cost::new(45.0, 6.0, 12.0),
                validator: Cost::new(65.0, 8.0, 15.0),
                dapp: Cost::new(70.0, 12.0, 10.0),
                research: Cost::new(55.0, 14.0, 8.0),
            },
            production: KindTable {
                miner: output(14.0, 1.0, 1.0, -12.0, 4.0, 1.0),
                validator: output(8.0, 2.0, 4.0, -6.0, 7.0, 1.0),
                dapp: output(10.0, 5.0, 3.0, -4.0, 3.0, 4.0),
                research: output(5.0, 7.0, 2.0, 6.0, 5.0, 3.0),
            },
            level_bonus: 0.35,
            build_step: 0.35,
            summary_every: 3,
            log_capacity: DEFAULT_LOG_CAPACITY,
            energy_max: 200.0,
            consensus_health_max: 120.0,
            round: RoundRules::default(),
            contract: ContractRules::default(),
            workshop: WorkshopRules::default(),
            consensus_unlocks: ConsensusUnlocks::default(),
            enforce_consensus_unlocks: true,
            layout: Layout::default(),
        }
    }
}

#[inline]
fn is_amount(value: Amount) -> bool {
    value.is_finite() && value >= 0.0
}

const fn output(
    tokens: Amount,
    knowledge: Amount,
    reputation: Amount,
    energy: Amount,
    consensus_health: Amount,
    students_inspired: Amount,
) -> Resources {
    Resources {
        tokens,
        energy,
        knowledge,
        reputation,
        students_inspired,
        consensus_health,
    }
}
