// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Identifies a tenant (employer organization).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId {
    /// The tenant identifier value.
    value: String,
}

impl TenantId {
    /// Creates a new `TenantId`.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Identifies an employee within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId {
    /// The employee identifier value.
    value: String,
}

impl EmployeeId {
    /// Creates a new `EmployeeId`.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Departure classification for a termination.
///
/// The classification selects the settlement algorithm branch and constrains
/// which optional request fields may be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartureClass {
    /// A fixed-term contract reached its agreed end date.
    EndOfFixedTerm,
    /// The employee resigned from an indefinite-duration contract.
    ResignationIndefinite,
    /// The employee resigned from a fixed-term contract before its end.
    ResignationFixedTerm,
    /// The employer dismissed the employee.
    Dismissal,
    /// Employer and employee agreed on a negotiated termination.
    NegotiatedTermination,
    /// The employee retired.
    Retirement,
    /// The employee died; the settlement is apportioned to beneficiaries.
    Death,
}

impl DepartureClass {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EndOfFixedTerm => "end_of_fixed_term",
            Self::ResignationIndefinite => "resignation_indefinite",
            Self::ResignationFixedTerm => "resignation_fixed_term",
            Self::Dismissal => "dismissal",
            Self::NegotiatedTermination => "negotiated_termination",
            Self::Retirement => "retirement",
            Self::Death => "death",
        }
    }

    /// Returns true for either resignation variant.
    #[must_use]
    pub const fn is_resignation(&self) -> bool {
        matches!(
            self,
            Self::ResignationIndefinite | Self::ResignationFixedTerm
        )
    }
}

impl FromStr for DepartureClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "end_of_fixed_term" => Ok(Self::EndOfFixedTerm),
            "resignation_indefinite" => Ok(Self::ResignationIndefinite),
            "resignation_fixed_term" => Ok(Self::ResignationFixedTerm),
            "dismissal" => Ok(Self::Dismissal),
            "negotiated_termination" => Ok(Self::NegotiatedTermination),
            "retirement" => Ok(Self::Retirement),
            "death" => Ok(Self::Death),
            _ => Err(DomainError::InvalidDepartureClass(s.to_string())),
        }
    }
}

impl std::fmt::Display for DepartureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the legally required notice period was disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeDisposition {
    /// The notice period was worked in full; nothing is owed either way.
    Worked,
    /// The employer released the employee and pays the notice period.
    PaidByEmployer,
    /// The employee left early and owes the notice period to the employer.
    PaidByEmployee,
    /// Notice was waived by mutual agreement.
    Waived,
}

impl NoticeDisposition {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Worked => "worked",
            Self::PaidByEmployer => "paid_by_employer",
            Self::PaidByEmployee => "paid_by_employee",
            Self::Waived => "waived",
        }
    }
}

impl FromStr for NoticeDisposition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worked" => Ok(Self::Worked),
            "paid_by_employer" => Ok(Self::PaidByEmployer),
            "paid_by_employee" => Ok(Self::PaidByEmployee),
            "waived" => Ok(Self::Waived),
            _ => Err(DomainError::InvalidNoticeDisposition(s.to_string())),
        }
    }
}

/// Fault subtype of a dismissal.
///
/// Serious and gross fault forfeit statutory severance entirely; the other
/// subtypes receive the full statutory amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCategory {
    /// Dismissal for economic reasons (restructuring, redundancy).
    Economic,
    /// Ordinary professional fault.
    SimpleFault,
    /// Serious fault (faute grave): severance is forfeited.
    SeriousFault,
    /// Gross fault (faute lourde): severance is forfeited.
    GrossFault,
    /// Medically established unfitness for the position.
    Unfitness,
}

impl FaultCategory {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Economic => "economic",
            Self::SimpleFault => "simple_fault",
            Self::SeriousFault => "serious_fault",
            Self::GrossFault => "gross_fault",
            Self::Unfitness => "unfitness",
        }
    }

    /// Returns true when the subtype forfeits statutory severance.
    #[must_use]
    pub const fn forfeits_severance(&self) -> bool {
        matches!(self, Self::SeriousFault | Self::GrossFault)
    }
}

impl FromStr for FaultCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "economic" => Ok(Self::Economic),
            "simple_fault" => Ok(Self::SimpleFault),
            "serious_fault" => Ok(Self::SeriousFault),
            "gross_fault" => Ok(Self::GrossFault),
            "unfitness" => Ok(Self::Unfitness),
            _ => Err(DomainError::InvalidFaultCategory(s.to_string())),
        }
    }
}

/// Professional category of an employee.
///
/// The category selects the row of the statutory notice-period table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeCategory {
    /// Workers and ordinary employees.
    Worker,
    /// Supervisors and technicians (agents de maîtrise).
    Supervisor,
    /// Executives and managers (cadres).
    Executive,
}

impl EmployeeCategory {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Supervisor => "supervisor",
            Self::Executive => "executive",
        }
    }
}

impl FromStr for EmployeeCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worker" => Ok(Self::Worker),
            "supervisor" => Ok(Self::Supervisor),
            "executive" => Ok(Self::Executive),
            _ => Err(DomainError::InvalidEmployeeCategory(s.to_string())),
        }
    }
}

/// Country whose labor law governs the settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountryCode {
    /// Côte d'Ivoire.
    CI,
    /// Senegal.
    SN,
}

impl CountryCode {
    /// Returns the ISO 3166-1 alpha-2 code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CI => "CI",
            Self::SN => "SN",
        }
    }
}

impl FromStr for CountryCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CI" => Ok(Self::CI),
            "SN" => Ok(Self::SN),
            _ => Err(DomainError::UnsupportedCountry {
                country: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Length of service, tracked in completed months.
///
/// The compliance tables place breakpoints at whole-year boundaries, but
/// service between anniversaries still counts toward severance, so the
/// tables take service to month precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceLength {
    /// Completed months of service.
    months: u32,
}

impl ServiceLength {
    /// Creates a service length from completed months.
    #[must_use]
    pub const fn from_months(months: u32) -> Self {
        Self { months }
    }

    /// Creates a service length from fractional years, rounded to the
    /// nearest month. Negative inputs clamp to zero.
    #[must_use]
    pub fn from_years(years: f64) -> Self {
        let rounded: f64 = (years * 12.0).round().max(0.0);
        // Clamped to [0, u32::MAX) before casting; no truncation possible.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let months: u32 = if rounded >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            rounded as u32
        };
        Self { months }
    }

    /// Returns completed months of service.
    #[must_use]
    pub const fn months(self) -> u32 {
        self.months
    }

    /// Returns completed whole years of service.
    #[must_use]
    pub const fn whole_years(self) -> u32 {
        self.months / 12
    }
}

/// A declared beneficiary of a deceased employee's settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    /// Full name of the beneficiary.
    pub name: String,
    /// Relationship to the deceased (e.g. "spouse", "child").
    pub relationship: String,
    /// Reference to the beneficiary's identity document.
    pub identity_document_ref: String,
    /// Reference to the bank account receiving the share.
    pub bank_account_ref: String,
    /// Whole-percent share of the net total. All shares must sum to 100.
    pub share_percent: u8,
}

/// Input to a settlement calculation: the termination being settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    /// The tenant employing the departing employee.
    pub tenant_id: TenantId,
    /// The departing employee.
    pub employee_id: EmployeeId,
    /// The departure classification.
    pub classification: DepartureClass,
    /// The effective termination date.
    pub termination_date: Date,
    /// How the notice period was disposed of.
    pub notice_disposition: NoticeDisposition,
    /// Fault subtype; only permitted when the classification is dismissal.
    pub fault_category: Option<FaultCategory>,
    /// Negotiated amount; only permitted for negotiated terminations.
    pub negotiated_amount: Option<Money>,
    /// Beneficiaries; only permitted (and then required) for death.
    pub beneficiaries: Vec<Beneficiary>,
}

/// Externally supplied employee data the calculator consumes.
///
/// The salary entries are ordered oldest first; the last entry is the final
/// (partial) month of employment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// The governing labor-law country.
    pub country: CountryCode,
    /// The employee's professional category.
    pub category: EmployeeCategory,
    /// Monthly gross salaries for the trailing twelve months, oldest first.
    pub monthly_gross_salaries: Vec<Money>,
    /// Accrued but untaken vacation, in whole days.
    pub accrued_vacation_days: u16,
    /// Fractional years of service at the termination date.
    pub years_of_service: f64,
    /// Contractual gratification owed on departure, if any.
    pub contractual_gratification: Option<Money>,
}

impl EmployeeProfile {
    /// Returns the service length, to month precision.
    #[must_use]
    pub fn service(&self) -> ServiceLength {
        ServiceLength::from_years(self.years_of_service)
    }
}
