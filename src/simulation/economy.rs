//! Money tracking for the traffic management game
//!
//! The treasury is credited by speeding fines and commuter arrivals and
//! debited by construction and recurring upkeep. Mandatory costs never
//! push the balance below the configured floor; they clamp and raise a
//! shortfall instead.

use log::warn;
use serde::Deserialize;

use super::error::{SimError, SimResult};
use super::law::Violation;

/// Starting budget for the player
pub const STARTING_BUDGET: i64 = 1000;
/// Lowest balance the treasury may reach
pub const TREASURY_FLOOR: i64 = 0;

/// Construction costs
pub const COST_CITY: i64 = 0;
pub const COST_ROAD: i64 = 100;
pub const COST_SPEED_CAMERA: i64 = 50;

/// Upkeep charged per billing interval
pub const UPKEEP_ROAD: i64 = 5;
pub const UPKEEP_SPEED_CAMERA: i64 = 2;

/// Revenue per commuter reaching its destination
pub const REVENUE_ARRIVAL: i64 = 10;

/// Fine charged per violation
pub const FINE_BASE: i64 = 100;
pub const FINE_PER_UNIT_OVER: i64 = 0;

/// How much a speeding violation costs the offender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FinePolicy {
    /// Flat amount per violation
    pub base: i64,
    /// Extra amount per started unit of speed over the threshold
    pub per_unit_over: i64,
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self {
            base: FINE_BASE,
            per_unit_over: FINE_PER_UNIT_OVER,
        }
    }
}

impl FinePolicy {
    pub fn fine_for(&self, observed_speed: f32, threshold: f32) -> i64 {
        let over = (observed_speed - threshold).max(0.0).ceil() as i64;
        self.base
            .saturating_add(self.per_unit_over.saturating_mul(over))
    }
}

/// Money-related tunables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_balance: i64,
    pub floor: i64,
    pub city_cost: i64,
    pub road_cost: i64,
    pub camera_cost: i64,
    pub road_upkeep: i64,
    pub camera_upkeep: i64,
    pub arrival_revenue: i64,
    pub fine: FinePolicy,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance: STARTING_BUDGET,
            floor: TREASURY_FLOOR,
            city_cost: COST_CITY,
            road_cost: COST_ROAD,
            camera_cost: COST_SPEED_CAMERA,
            road_upkeep: UPKEEP_ROAD,
            camera_upkeep: UPKEEP_SPEED_CAMERA,
            arrival_revenue: REVENUE_ARRIVAL,
            fine: FinePolicy::default(),
        }
    }
}

/// The condition raised when a mandatory cost could not be covered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub required: i64,
    pub available: i64,
}

/// The single money balance of the game
#[derive(Debug, Clone)]
pub struct Treasury {
    balance: i64,
    floor: i64,
    /// Most recent shortfall; stays set once raised
    shortfall: Option<Shortfall>,
}

impl Treasury {
    pub fn new(starting_balance: i64, floor: i64) -> Self {
        Self {
            balance: starting_balance.max(floor),
            floor,
            shortfall: None,
        }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn floor(&self) -> i64 {
        self.floor
    }

    pub fn shortfall(&self) -> Option<Shortfall> {
        self.shortfall
    }

    /// Whether a mandatory cost has ever gone unpaid
    pub fn is_bankrupt(&self) -> bool {
        self.shortfall.is_some()
    }

    /// Check if player can afford a purchase without dropping below the floor
    pub fn can_afford(&self, cost: i64) -> bool {
        self.balance
            .checked_sub(cost)
            .is_some_and(|remaining| remaining >= self.floor)
    }

    /// Add money from revenue
    pub fn credit(&mut self, amount: i64) {
        self.balance = self.balance.saturating_add(amount.max(0));
    }

    /// Deduct money for an optional purchase, refusing if unaffordable
    pub fn try_spend(&mut self, cost: i64) -> SimResult<()> {
        if !self.can_afford(cost) {
            return Err(SimError::InsufficientFunds {
                cost,
                balance: self.balance,
            });
        }
        self.balance -= cost.max(0);
        Ok(())
    }

    /// Deduct a cost that cannot be refused
    ///
    /// If the balance cannot cover it the treasury is clamped to the floor
    /// and a shortfall is raised.
    pub fn charge_mandatory(&mut self, cost: i64) -> SimResult<()> {
        if self.can_afford(cost) {
            self.balance -= cost.max(0);
            return Ok(());
        }

        let shortfall = Shortfall {
            required: cost,
            available: self.balance - self.floor,
        };
        self.balance = self.floor;
        self.shortfall = Some(shortfall);
        Err(SimError::Shortfall {
            required: shortfall.required,
            available: shortfall.available,
        })
    }

    pub fn summary(&self) -> String {
        match self.shortfall {
            Some(shortfall) => format!(
                "Treasury: ${} (shortfall: needed ${}, had ${})",
                self.balance, shortfall.required, shortfall.available
            ),
            None => format!("Treasury: ${}", self.balance),
        }
    }
}

/// Money movements applied during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settlement {
    /// Total fines credited
    pub fines: i64,
    /// Total arrival revenue credited
    pub revenue: i64,
    /// Construction spending during the tick
    pub construction: i64,
    /// Upkeep billed during the tick (before any clamping)
    pub upkeep: i64,
    /// Raised when the upkeep could not be covered
    pub shortfall: Option<SimError>,
}

impl Settlement {
    /// Everything debited this tick
    pub fn costs(&self) -> i64 {
        self.construction + self.upkeep
    }

    /// Everything credited this tick
    pub fn credits(&self) -> i64 {
        self.fines + self.revenue
    }
}

/// Owns the treasury and applies every money rule
#[derive(Debug, Clone)]
pub struct Economy {
    treasury: Treasury,
    config: EconomyConfig,
    /// Construction spending since the current tick began
    construction_this_tick: i64,
}

impl Economy {
    pub fn new(config: EconomyConfig) -> Self {
        Self {
            treasury: Treasury::new(config.starting_balance, config.floor),
            config,
            construction_this_tick: 0,
        }
    }

    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn fine_for(&self, violation: &Violation) -> i64 {
        self.config
            .fine
            .fine_for(violation.observed_speed, violation.threshold)
    }

    /// Reset the per-tick construction tally
    pub fn begin_tick(&mut self) {
        self.construction_this_tick = 0;
    }

    /// Pay for a construction, refusing if unaffordable
    pub fn pay_for_construction(&mut self, cost: i64) -> SimResult<()> {
        self.treasury.try_spend(cost)?;
        self.construction_this_tick += cost.max(0);
        Ok(())
    }

    /// Upkeep owed for the given network size
    pub fn upkeep_for(&self, roads: usize, cameras: usize) -> i64 {
        let roads = i64::try_from(roads).unwrap_or(i64::MAX);
        let cameras = i64::try_from(cameras).unwrap_or(i64::MAX);
        self.config
            .road_upkeep
            .saturating_mul(roads)
            .saturating_add(self.config.camera_upkeep.saturating_mul(cameras))
    }

    /// Apply the tick's fines, arrival revenue and (if due) upkeep
    ///
    /// Credits are applied before upkeep so income earned this tick can
    /// cover this tick's bill.
    pub fn settle(
        &mut self,
        violations: &[Violation],
        arrivals: usize,
        upkeep_due: Option<i64>,
    ) -> Settlement {
        let fines: i64 = violations.iter().map(|v| self.fine_for(v).max(0)).sum();
        let arrivals = i64::try_from(arrivals).unwrap_or(i64::MAX);
        let revenue = self.config.arrival_revenue.max(0).saturating_mul(arrivals);

        self.treasury.credit(fines);
        self.treasury.credit(revenue);

        let mut settlement = Settlement {
            fines,
            revenue,
            construction: self.construction_this_tick,
            upkeep: 0,
            shortfall: None,
        };

        if let Some(upkeep) = upkeep_due.map(|upkeep| upkeep.max(0)) {
            settlement.upkeep = upkeep;
            if let Err(err) = self.treasury.charge_mandatory(upkeep) {
                warn!("Upkeep of ${} not covered: {}", upkeep, err);
                settlement.shortfall = Some(err);
            }
        }

        self.construction_this_tick = 0;
        settlement
    }
}
