mod calculation_request;
mod insurance_base;
mod regime;
mod salary_type;
mod tax_bracket;

pub use calculation_request::CalculationRequest;
pub use insurance_base::InsuranceBase;
pub use regime::RegimeConstants;
pub use salary_type::{ParseSalaryTypeError, SalaryType};
pub use tax_bracket::{BracketError, TaxBracket};
