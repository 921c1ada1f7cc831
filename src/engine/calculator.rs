//! Pure commission math. No I/O here: given a policy, a sales summary and
//! the period's ledger entries, the breakdown is fully determined, which is
//! what makes recalculation idempotent.

use crate::model::adjustment::AdjustmentEntry;
use crate::model::policy::{CommissionType, CompensationPolicy};
use crate::model::sale::SalesSummary;
use crate::money::Money;

/// The computed components of a payout before persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionBreakdown {
    pub service_commission: Money,
    pub product_commission: Money,
    /// Display-only; already netted into the service commission for
    /// chair-rental policies.
    pub rental_deduction: Money,
    pub goal_bonus: Money,
}

impl CommissionBreakdown {
    pub fn net_payable(&self, ledger_total: Money) -> Money {
        self.service_commission + self.product_commission + self.goal_bonus + ledger_total
    }
}

/// Computes the commission breakdown for one staff member and period.
pub fn commission_for(policy: &CompensationPolicy, summary: &SalesSummary) -> CommissionBreakdown {
    let service = summary.service_revenue();
    let product = summary.product_revenue();

    let (service_commission, rental_deduction) = match policy.commission_type {
        CommissionType::Percentage => (service.apply_percent(policy.service_percent), Money::zero()),
        CommissionType::FixedMonthly => {
            // Flat amount, independent of service revenue.
            (Money::from_cents(policy.fixed_monthly_cents), Money::zero())
        }
        CommissionType::ChairRental => {
            // The staff member keeps service revenue minus the rent. This may
            // go negative when the rent exceeds revenue; the debt is reported
            // as-is, never clamped.
            let rent = Money::from_cents(policy.chair_rental_cents);
            (service - rent, rent)
        }
    };

    let product_commission = product.apply_percent(policy.product_percent);

    let total_sales = summary.total_sales();
    let goal = Money::from_cents(policy.monthly_goal_cents);
    let goal_bonus = if policy.monthly_goal_cents > 0 && total_sales >= goal {
        total_sales.apply_percent(policy.goal_bonus_percent)
    } else {
        Money::zero()
    };

    CommissionBreakdown {
        service_commission,
        product_commission,
        rental_deduction,
        goal_bonus,
    }
}

/// Signed sum of a period's ledger entries. Order is irrelevant; every entry
/// of the period is folded in.
pub fn ledger_total(entries: &[AdjustmentEntry]) -> Money {
    entries
        .iter()
        .map(|e| e.kind.signed(Money::from_cents(e.amount_cents)))
        .sum()
}
