//! The campus map: fixed building plots and the conditions that unlock them.
//!
//! Plot state is never stored. Whether a plot is occupied or locked is
//! recomputed from a [`GameState`] every time it is asked for.

use serde::{Deserialize, Serialize};

use crate::{node::NodeId, state::GameState};

/// Identifier of a campus plot, e.g. `A1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotId {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
    D1,
    D2,
}

impl std::fmt::Display for PlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum District {
    Mining,
    Governance,
    Innovation,
    Knowledge,
}

impl District {
    pub fn label(&self) -> &'static str {
        match self {
            District::Mining => "Mining District",
            District::Governance => "Governance Quarter",
            District::Innovation => "Innovation Wing",
            District::Knowledge => "Knowledge Garden",
        }
    }
}

/// A fixed location on the campus map.
#[derive(Clone, Copy)]
pub struct Plot {
    pub id: PlotId,
    pub district: District,
    pub label: &'static str,
    /// `(row, column)` of the plot on the map grid.
    pub cell: (u8, u8),
    pub position: [f64; 3],
    /// Human-readable unlock requirement.
    pub requirement: &'static str,
    unlock: fn(&GameState) -> bool,
}

impl Plot {
    /// Returns true if `state` meets this plot's unlock requirement.
    #[inline]
    pub fn is_unlocked(&self, state: &GameState) -> bool {
        (self.unlock)(state)
    }

    /// Returns the node standing on this plot, if any.
    pub fn occupant(&self, state: &GameState) -> Option<NodeId> {
        state
            .nodes
            .iter()
            .find(|node| node.placement.plot == Some(self.id))
            .map(|node| node.id)
    }
}

impl std::fmt::Debug for Plot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plot")
            .field("id", &self.id)
            .field("district", &self.district)
            .field("label", &self.label)
            .field("cell", &self.cell)
            .field("requirement", &self.requirement)
            .finish_non_exhaustive()
    }
}

/// Every plot on the campus, in the order `build` considers them.
pub static PLOTS: [Plot; 8] = [
    Plot {
        id: PlotId::A1,
        district: District::Mining,
        label: "North rig yard",
        cell: (2, 2),
        position: [-6.0, 0.5, -3.0],
        requirement: "Always available",
        unlock: |_| true,
    },
    Plot {
        id: PlotId::A2,
        district: District::Mining,
        label: "South rig yard",
        cell: (2, 3),
        position: [-2.0, 0.5, -3.0],
        requirement: "Always available",
        unlock: |_| true,
    },
    Plot {
        id: PlotId::B1,
        district: District::Governance,
        label: "Council hall",
        cell: (2, 5),
        position: [2.0, 0.5, -3.0],
        requirement: "15 knowledge",
        unlock: |s| s.resources.knowledge >= 15.0,
    },
    Plot {
        id: PlotId::B2,
        district: District::Governance,
        label: "Voting forum",
        cell: (2, 6),
        position: [6.0, 0.5, -3.0],
        requirement: "18 students inspired",
        unlock: |s| s.resources.students_inspired >= 18.0,
    },
    Plot {
        id: PlotId::C1,
        district: District::Innovation,
        label: "Startup garage",
        cell: (3, 2),
        position: [-6.0, 0.5, 1.0],
        requirement: "28 reputation",
        unlock: |s| s.resources.reputation >= 28.0,
    },
    Plot {
        id: PlotId::C2,
        district: District::Innovation,
        label: "Prototype studio",
        cell: (3, 6),
        position: [-2.0, 0.5, 1.0],
        requirement: "3 blocks on the chain",
        unlock: |s| s.chain.len() >= 3,
    },
    Plot {
        id: PlotId::D1,
        district: District::Knowledge,
        label: "Library annex",
        cell: (4, 2),
        position: [2.0, 0.5, 1.0],
        requirement: "Smart contract level 1",
        unlock: |s| s.smart_contract_level >= 1,
    },
    Plot {
        id: PlotId::D2,
        district: District::Knowledge,
        label: "Observatory",
        cell: (4, 6),
        position: [6.0, 0.5, 1.0],
        requirement: "40 knowledge",
        unlock: |s| s.resources.knowledge >= 40.0,
    },
];

/// Positions used by [`Layout::Grid`](crate::rules::Layout::Grid), in build
/// order.
pub const GRID_POSITIONS: [[f64; 3]; 8] = [
    [-6.0, 0.5, -3.0],
    [-2.0, 0.5, -3.0],
    [2.0, 0.5, -3.0],
    [6.0, 0.5, -3.0],
    [-6.0, 0.5, 1.0],
    [-2.0, 0.5, 1.0],
    [2.0, 0.5, 1.0],
    [6.0, 0.5, 1.0],
];

/// Position of nodes built after every grid position is taken.
pub const OVERFLOW_POSITION: [f64; 3] = [0.0, 0.5, 4.0];

/// Returns the grid position for the node built at `index`.
#[inline]
pub fn grid_position(index: usize) -> [f64; 3] {
    GRID_POSITIONS.get(index).copied().unwrap_or(OVERFLOW_POSITION)
}

/// Looks up a plot by ID.
pub fn plot(id: PlotId) -> &'static Plot {
    // PLOTS holds exactly one entry per PlotId, in declaration order.
    &PLOTS[id as usize]
}

/// Derived view of one plot for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotState {
    pub plot_id: PlotId,
    pub district: District,
    pub label: &'static str,
    pub cell: (u8, u8),
    pub requirement: &'static str,
    pub occupied_by: Option<NodeId>,
    /// True if the plot is empty and its unlock requirement is not met.
    pub locked: bool,
}

/// Computes the state of every plot.
pub fn plot_states(state: &GameState) -> Vec<PlotState> {
    PLOTS
        .iter()
        .map(|plot| {
            let occupied_by = plot.occupant(state);
            PlotState {
                plot_id: plot.id,
                district: plot.district,
                label: plot.label,
                cell: plot.cell,
                requirement: plot.requirement,
                occupied_by,
                locked: occupied_by.is_none() && !plot.is_unlocked(state),
            }
        })
        .collect()
}

/// Returns the first plot, in [`PLOTS`] order, which is unlocked and not
/// occupied.
pub fn first_available(state: &GameState) -> Option<&'static Plot> {
    PLOTS
        .iter()
        .find(|plot| plot.occupant(state).is_none() && plot.is_unlocked(state))
}

#[cfg(test)]
mod tests {
    use super::{first_available, plot, plot_states, PlotId, PLOTS};
    use crate::{rules::Rules, state::GameState};

    #[test]
    fn plot_lookup_matches_declaration_order() {
        for (i, p) in PLOTS.iter().enumerate() {
            assert_eq!(p.id as usize, i);
            assert_eq!(plot(p.id).id, p.id);
        }
    }

    #[test]
    fn genesis_occupies_mining_district() {
        let state = GameState::genesis(&Rules::default(), Default::default());
        let plots = plot_states(&state);

        assert!(plots[0].occupied_by.is_some());
        assert!(plots[1].occupied_by.is_some());
        assert!(plots.iter().skip(2).all(|p| p.occupied_by.is_none()));
        assert_eq!(first_available(&state).map(|p| p.id), Some(PlotId::B1));
    }

    #[test]
    fn lock_follows_state() {
        let mut state = GameState::genesis(&Rules::default(), Default::default());
        state.resources.knowledge = 10.0;

        let b1 = plot_states(&state)[2];
        assert_eq!(b1.plot_id, PlotId::B1);
        assert!(b1.locked);
        assert_ne!(first_available(&state).map(|p| p.id), Some(PlotId::B1));

        state.resources.knowledge = 15.0;
        assert!(!plot_states(&state)[2].locked);
    }

    #[test]
    fn first_available_respects_list_order() {
        let mut state = GameState::genesis(&Rules::default(), Default::default());
        state.resources.knowledge = 0.0;
        state.resources.students_inspired = 0.0;
        state.resources.reputation = 100.0;

        // B1, B2 are locked, C1 is the first plot that opens up.
        assert_eq!(first_available(&state).map(|p| p.id), Some(PlotId::C1));

        state.resources.reputation = 0.0;
        assert!(first_available(&state).is_none());
    }
}
