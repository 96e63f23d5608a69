// Ranking and squad selection over scored players.
//
// Ranking filters by minutes played and sorts by expected points. Squad
// selection fills fixed position quotas with the best players at each
// position and checks the total price against a budget. Prices are summed in
// integer tenths so the budget boundary is exact.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Availability, Position, ScoredPlayer};

const TENTHS_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("squad costs {total_cost:.1}m, over the {}m budget", millions(.budget))]
    BudgetExceeded { total_cost: f64, budget: f64 },

    #[error("not enough {position} candidates: need {required}, have {available}")]
    InsufficientPlayers {
        position: Position,
        required: usize,
        available: usize,
    },
}

/// Prices are quoted to 0.1m; show more digits only when the budget has them.
fn millions(value: &f64) -> String {
    let tenths = value * 10.0;
    if (tenths - tenths.round()).abs() < TENTHS_EPSILON {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Quotas and policy
// ---------------------------------------------------------------------------

/// Players required per position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotas {
    pub goalkeepers: usize,
    pub defenders: usize,
    pub midfielders: usize,
    pub forwards: usize,
}

impl Default for Quotas {
    fn default() -> Self {
        Self {
            goalkeepers: 2,
            defenders: 5,
            midfielders: 5,
            forwards: 3,
        }
    }
}

impl Quotas {
    pub fn for_position(&self, position: Position) -> usize {
        match position {
            Position::Goalkeeper => self.goalkeepers,
            Position::Defender => self.defenders,
            Position::Midfielder => self.midfielders,
            Position::Forward => self.forwards,
            Position::Unknown => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.goalkeepers + self.defenders + self.midfielders + self.forwards
    }
}

/// What to do when the best squad by expected points is over budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPolicy {
    /// Report [`SelectionError::BudgetExceeded`].
    #[default]
    Reject,
    /// Swap selected players for cheaper ones at the same position until the
    /// squad fits.
    Downgrade,
}

// ---------------------------------------------------------------------------
// Squad
// ---------------------------------------------------------------------------

/// A selection satisfying the quotas, one list per position, each ordered by
/// expected points descending.
#[derive(Debug, Clone, PartialEq)]
pub struct Squad {
    goalkeepers: Vec<ScoredPlayer>,
    defenders: Vec<ScoredPlayer>,
    midfielders: Vec<ScoredPlayer>,
    forwards: Vec<ScoredPlayer>,
    total_cost_tenths: u64,
}

impl Squad {
    pub fn players_at(&self, position: Position) -> &[ScoredPlayer] {
        match position {
            Position::Goalkeeper => &self.goalkeepers,
            Position::Defender => &self.defenders,
            Position::Midfielder => &self.midfielders,
            Position::Forward => &self.forwards,
            Position::Unknown => &[],
        }
    }

    /// All players, goalkeepers first.
    pub fn iter(&self) -> impl Iterator<Item = &ScoredPlayer> {
        self.goalkeepers
            .iter()
            .chain(self.defenders.iter())
            .chain(self.midfielders.iter())
            .chain(self.forwards.iter())
    }

    pub fn len(&self) -> usize {
        self.goalkeepers.len() + self.defenders.len() + self.midfielders.len() + self.forwards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_cost_tenths(&self) -> u64 {
        self.total_cost_tenths
    }

    /// Total price in millions.
    pub fn total_cost(&self) -> f64 {
        self.total_cost_tenths as f64 / 10.0
    }

    pub fn expected_points(&self) -> f64 {
        self.iter().map(|p| p.expected_points).sum()
    }
}

// ---------------------------------------------------------------------------
// Ranking and filters
// ---------------------------------------------------------------------------

fn by_expected_points_desc(a: &ScoredPlayer, b: &ScoredPlayer) -> std::cmp::Ordering {
    b.expected_points.total_cmp(&a.expected_points)
}

/// Players with more than `min_minutes_threshold` minutes, best first.
/// Ties keep their input order.
pub fn rank_by_expected_points(players: &[ScoredPlayer], min_minutes_threshold: u32) -> Vec<ScoredPlayer> {
    let mut ranked: Vec<ScoredPlayer> = players
        .iter()
        .filter(|p| p.player.minutes > min_minutes_threshold)
        .cloned()
        .collect();
    ranked.sort_by(by_expected_points_desc);
    ranked
}

/// Half a match for every round completed before `next_round`.
///
/// This intentionally departs from the older `next_round * 90 / 2` rule,
/// which demands half a match more than any player can have played and so
/// empties the ranking in round 2.
pub fn default_minutes_threshold(next_round: u32) -> u32 {
    next_round.saturating_sub(1) * 90 / 2
}

/// Players without an injury flag or with at least `min_chance` percent
/// chance of playing.
pub fn likely_to_play(players: &[ScoredPlayer], min_chance: u8) -> Vec<ScoredPlayer> {
    players
        .iter()
        .filter(|p| p.player.chance_of_playing.map_or(true, |c| c >= min_chance))
        .cloned()
        .collect()
}

/// Drop players flagged as injured, suspended or otherwise unavailable.
pub fn exclude_unavailable(players: &[ScoredPlayer]) -> Vec<ScoredPlayer> {
    players
        .iter()
        .filter(|p| p.player.availability != Availability::Unavailable)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Squad selection
// ---------------------------------------------------------------------------

/// Largest whole number of tenths not above `budget`. The epsilon absorbs
/// float error in budgets that are already whole tenths (100.5, 89.9).
fn budget_in_tenths(budget: f64) -> u64 {
    (budget * 10.0 + TENTHS_EPSILON).floor().max(0.0) as u64
}

/// Candidates per squad position, best first, with the top-quota picks.
struct PositionPool<'a> {
    position: Position,
    candidates: Vec<&'a ScoredPlayer>,
    chosen: Vec<usize>,
}

fn greedy_pools<'a>(players: &'a [ScoredPlayer], quotas: &Quotas) -> Result<Vec<PositionPool<'a>>, SelectionError> {
    let mut pools = Vec::with_capacity(Position::SQUAD_ORDER.len());
    for position in Position::SQUAD_ORDER {
        let mut candidates: Vec<&ScoredPlayer> = players
            .iter()
            .filter(|p| p.player.position == position)
            .collect();
        candidates.sort_by(|a, b| by_expected_points_desc(a, b));

        let required = quotas.for_position(position);
        if candidates.len() < required {
            return Err(SelectionError::InsufficientPlayers {
                position,
                required,
                available: candidates.len(),
            });
        }

        pools.push(PositionPool {
            position,
            candidates,
            chosen: (0..required).collect(),
        });
    }
    Ok(pools)
}

fn pools_cost(pools: &[PositionPool<'_>]) -> u64 {
    pools
        .iter()
        .flat_map(|pool| pool.chosen.iter().map(|&i| pool.candidates[i].player.cost_tenths as u64))
        .sum()
}

fn into_squad(pools: Vec<PositionPool<'_>>, total_cost_tenths: u64) -> Squad {
    let mut squad = Squad {
        goalkeepers: Vec::new(),
        defenders: Vec::new(),
        midfielders: Vec::new(),
        forwards: Vec::new(),
        total_cost_tenths,
    };

    for pool in pools {
        let mut chosen = pool.chosen;
        // Candidate indices follow expected-points order.
        chosen.sort_unstable();
        let picked: Vec<ScoredPlayer> = chosen.into_iter().map(|i| pool.candidates[i].clone()).collect();

        match pool.position {
            Position::Goalkeeper => squad.goalkeepers = picked,
            Position::Defender => squad.defenders = picked,
            Position::Midfielder => squad.midfielders = picked,
            Position::Forward => squad.forwards = picked,
            Position::Unknown => {}
        }
    }

    squad
}

/// Pick the top players per position by expected points and check the total
/// price against `budget` (in millions, floored to whole tenths). A squad costing
/// exactly the budget is accepted.
pub fn select_squad(players: &[ScoredPlayer], budget: f64, quotas: &Quotas) -> Result<Squad, SelectionError> {
    select_squad_with_policy(players, budget, quotas, BudgetPolicy::Reject)
}

/// [`select_squad`] with a choice of what to do when over budget.
///
/// With [`BudgetPolicy::Downgrade`], each step replaces one selected player
/// with a cheaper unselected player at the same position, choosing the swap
/// that gives up the fewest expected points per tenth saved (larger saving
/// breaks ties). The total strictly drops every step. If no cheaper swap is
/// left and the squad is still over budget, the error carries the lowest
/// total reached.
pub fn select_squad_with_policy(
    players: &[ScoredPlayer],
    budget: f64,
    quotas: &Quotas,
    policy: BudgetPolicy,
) -> Result<Squad, SelectionError> {
    let limit = budget_in_tenths(budget);
    let mut pools = greedy_pools(players, quotas)?;
    let mut total = pools_cost(&pools);

    while total > limit {
        if policy == BudgetPolicy::Reject {
            break;
        }
        match cheapest_downgrade(&pools) {
            Some(swap) => {
                let pool = &mut pools[swap.pool];
                pool.chosen[swap.slot] = swap.candidate;
                total -= swap.saving;
            }
            None => break,
        }
    }

    if total > limit {
        return Err(SelectionError::BudgetExceeded {
            total_cost: total as f64 / 10.0,
            budget,
        });
    }

    Ok(into_squad(pools, total))
}

struct Downgrade {
    pool: usize,
    slot: usize,
    candidate: usize,
    saving: u64,
    loss_per_tenth: f64,
}

fn cheapest_downgrade(pools: &[PositionPool<'_>]) -> Option<Downgrade> {
    let mut best: Option<Downgrade> = None;

    for (pool_idx, pool) in pools.iter().enumerate() {
        for (slot, &selected_idx) in pool.chosen.iter().enumerate() {
            let selected = pool.candidates[selected_idx];
            for (cand_idx, cand) in pool.candidates.iter().enumerate() {
                if pool.chosen.contains(&cand_idx) {
                    continue;
                }
                if cand.player.cost_tenths >= selected.player.cost_tenths {
                    continue;
                }
                let saving = (selected.player.cost_tenths - cand.player.cost_tenths) as u64;
                let loss_per_tenth = (selected.expected_points - cand.expected_points) / saving as f64;

                let better = match &best {
                    None => true,
                    Some(b) => {
                        loss_per_tenth < b.loss_per_tenth
                            || (loss_per_tenth == b.loss_per_tenth && saving > b.saving)
                    }
                };
                if better {
                    best = Some(Downgrade {
                        pool: pool_idx,
                        slot,
                        candidate: cand_idx,
                        saving,
                        loss_per_tenth,
                    });
                }
            }
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
