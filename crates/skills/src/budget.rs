//! Fixed-rate trip budget arithmetic.
//!
//! All amounts are whole USD per person per day.

use serde::{Deserialize, Serialize};
use skiff_config::{RateTable, TierRates};
use skiff_core::error::SkillError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierName {
    Budget,
    MidRange,
    Luxury,
}

impl TierName {
    fn pick(self, rates: &TierRates) -> u64 {
        match self {
            TierName::Budget => rates.budget,
            TierName::MidRange => rates.mid_range,
            TierName::Luxury => rates.luxury,
        }
    }
}

impl std::fmt::Display for TierName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TierName::Budget => "Budget",
            TierName::MidRange => "Mid-Range",
            TierName::Luxury => "Luxury",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTier {
    pub name: TierName,
    /// Cost per person per day
    pub daily_rate: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub budget: BudgetTier,
    pub mid_range: BudgetTier,
    pub luxury: BudgetTier,
    pub days: u64,
    pub people: u64,
}

impl BudgetBreakdown {
    /// Tiers cheapest first.
    pub fn tiers(&self) -> [&BudgetTier; 3] {
        [&self.budget, &self.mid_range, &self.luxury]
    }
}

/// Daily rate of one tier: accommodation and meals at that tier plus the
/// flat activity, transport and miscellaneous costs.
pub fn daily_rate(tier: TierName, rates: &RateTable) -> Option<u64> {
    tier.pick(&rates.accommodation)
        .checked_add(tier.pick(&rates.meals))?
        .checked_add(rates.activities)?
        .checked_add(rates.local_transport)?
        .checked_add(rates.miscellaneous)
}

/// Compute all three tiers for `days` days and `people` travellers.
pub fn compute_budget(days: u64, people: u64, rates: &RateTable) -> Result<BudgetBreakdown, SkillError> {
    if days == 0 {
        return Err(SkillError::InvalidArgument("duration must be at least 1 day".into()));
    }
    if people == 0 {
        return Err(SkillError::InvalidArgument("group size must be at least 1 person".into()));
    }

    let tier = |name: TierName| -> Result<BudgetTier, SkillError> {
        let overflow = || SkillError::InvalidArgument(format!("{name} total is too large to compute"));
        let daily_rate = daily_rate(name, rates).ok_or_else(overflow)?;
        let total = daily_rate
            .checked_mul(days)
            .and_then(|t| t.checked_mul(people))
            .ok_or_else(overflow)?;
        Ok(BudgetTier { name, daily_rate, total })
    };

    Ok(BudgetBreakdown {
        budget: tier(TierName::Budget)?,
        mid_range: tier(TierName::MidRange)?,
        luxury: tier(TierName::Luxury)?,
        days,
        people,
    })
}

/// Interpret a numeric skill input as a positive whole count.
pub fn positive_count(field: &str, value: f64) -> Result<u64, SkillError> {
    if value.is_finite() && value.fract() == 0.0 && value >= 1.0 && value <= u32::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(SkillError::InvalidArgument(format!(
            "{field} must be a positive whole number, got {value}"
        )))
    }
}
