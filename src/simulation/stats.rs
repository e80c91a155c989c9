//! Running statistics and the read-only HUD snapshot

use super::economy::Shortfall;

/// Totals accumulated over the whole simulation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub total_commuters_spawned: u64,
    pub total_commuters_arrived: u64,
    /// Commuters released by crashes (two per collision)
    pub total_commuters_collided: u64,
    pub total_collisions: u64,
    /// Commuters released because their road was removed
    pub total_commuters_removed: u64,
    pub total_violations: u64,
    pub fines_collected: i64,
    pub revenue_collected: i64,
    pub construction_spent: i64,
    pub upkeep_billed: i64,
}

impl SimulationStats {
    /// Share of finished commuters that reached their destination, in percent
    pub fn arrival_rate(&self) -> f32 {
        let finished = self.total_commuters_arrived
            + self.total_commuters_collided
            + self.total_commuters_removed;
        if finished == 0 {
            return 0.0;
        }
        self.total_commuters_arrived as f32 / finished as f32 * 100.0
    }
}

/// What the HUD polls once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub balance: i64,
    pub tick: u64,
    pub elapsed_secs: f64,
    pub idle_commuters: usize,
    pub traveling_commuters: usize,
    pub cities: usize,
    pub roads: usize,
    pub cameras: usize,
    pub shortfall: Option<Shortfall>,
}
