use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{InsuranceBase, SalaryType};

/// One salary calculation as requested by a caller.
///
/// Amounts are expected to be validated numbers; negative values are rejected
/// by the calculators, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub salary_type: SalaryType,
    pub salary: Decimal,
    #[serde(default)]
    pub dependents: u32,
    #[serde(default)]
    pub insurance_base: InsuranceBase,
}

impl CalculationRequest {
    /// A gross-salary request with no dependents and the basic insurance base.
    pub fn gross(salary: Decimal) -> Self {
        Self {
            salary_type: SalaryType::Gross,
            salary,
            dependents: 0,
            insurance_base: InsuranceBase::default(),
        }
    }

    /// A net-salary request with no dependents and the basic insurance base.
    pub fn net(salary: Decimal) -> Self {
        Self {
            salary_type: SalaryType::Net,
            ..Self::gross(salary)
        }
    }
}
