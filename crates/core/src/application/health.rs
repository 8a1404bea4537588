// Health classifier

use crate::application::constants::{
    FAIR_CPU_PCT, FAIR_DISK_PCT, FAIR_MEMORY_PCT, POOR_CPU_PCT, POOR_DISK_PCT, POOR_MEMORY_PCT,
};
use crate::domain::HealthRating;

/// Classify machine health from memory, CPU and disk usage percentages
///
/// - Poor: memory > 80 or cpu > 80 or disk > 90
/// - Fair: memory > 60 or cpu > 60 or disk > 80
/// - Good otherwise
///
/// Thresholds are fixed; never returns `Unknown`.
pub fn classify(memory_pct: f64, cpu_pct: f64, disk_pct: f64) -> HealthRating {
    if memory_pct > POOR_MEMORY_PCT || cpu_pct > POOR_CPU_PCT || disk_pct > POOR_DISK_PCT {
        HealthRating::Poor
    } else if memory_pct > FAIR_MEMORY_PCT || cpu_pct > FAIR_CPU_PCT || disk_pct > FAIR_DISK_PCT
    {
        HealthRating::Fair
    } else {
        HealthRating::Good
    }
}
