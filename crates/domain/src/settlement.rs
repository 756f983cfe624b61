// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Final-settlement (STC) calculation.
//!
//! This module computes the itemized settlement owed to a departing
//! employee: severance, accrued-vacation payout, gratification, prorated
//! final-month salary, and the notice-period payment. The calculation is
//! pure and deterministic: given an identical request, profile, and
//! `as_of` timestamp it produces an identical result, which is what makes
//! the preview/confirm contract hold.
//!
//! Rounding policy: every line item is rounded to the minor currency unit
//! when it is computed (see [`Money::prorate`]); the gross total is the
//! exact integer sum of the already-rounded items.

use crate::apportionment::{BeneficiaryShare, apportion_net_total};
use crate::compliance::{SeveranceRate, country_rules};
use crate::deductions::StatutoryDeductions;
use crate::error::DomainError;
use crate::money::Money;
use crate::types::{
    DepartureClass, EmployeeProfile, FaultCategory, NoticeDisposition, ServiceLength,
    SettlementRequest,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Days of the salary-divisor month used for daily-rate conversions.
///
/// The statutory daily rate is one thirtieth of the average monthly salary,
/// independent of the calendar length of any particular month.
const DAILY_RATE_DIVISOR: i64 = 30;

/// Number of trailing months the average-salary base is taken over.
const AVERAGE_WINDOW_MONTHS: usize = 12;

/// A non-fatal compliance finding attached to a settlement result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComplianceWarning {
    /// The negotiated amount was below the statutory dismissal-equivalent
    /// floor; the stored severance was raised to the floor.
    NegotiatedBelowStatutoryFloor {
        /// The negotiated amount as supplied.
        negotiated: Money,
        /// The statutory floor the amount was raised to.
        statutory_floor: Money,
    },
}

impl std::fmt::Display for ComplianceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegotiatedBelowStatutoryFloor {
                negotiated,
                statutory_floor,
            } => {
                write!(
                    f,
                    "Negotiated amount {negotiated} is below the statutory floor {statutory_floor}; the floor applies"
                )
            }
        }
    }
}

/// The itemized outcome of a settlement calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// Statutory (or negotiated, floored) severance.
    pub severance: Money,
    /// Payout for accrued but untaken vacation days.
    pub vacation_payout: Money,
    /// Contractual gratification.
    pub gratification: Money,
    /// Prorated salary for the final, partial month.
    pub prorated_salary: Money,
    /// Notice-period payment. Negative when owed by the employee.
    pub notice_payment: Money,
    /// Exact sum of the five line items.
    pub gross_total: Money,
    /// Gross total minus statutory deductions.
    pub net_total: Money,
    /// Fractional years of service the calculation used.
    pub years_of_service: f64,
    /// Average monthly salary over the trailing window.
    pub average_monthly_salary: Money,
    /// When the calculation ran.
    #[serde(with = "time::serde::rfc3339")]
    pub calculated_at: OffsetDateTime,
    /// Non-fatal compliance findings.
    pub warnings: Vec<ComplianceWarning>,
    /// Per-beneficiary apportionment of the net total (death only).
    pub apportionment: Vec<BeneficiaryShare>,
}

/// Computes the final settlement for a termination.
///
/// Pure and side-effect-free. The caller supplies the employee profile
/// (salary history, service, category) and the deduction collaborator; the
/// `as_of` timestamp is recorded verbatim so that a preview and a confirmed
/// run over the same inputs compare equal.
///
/// # Errors
///
/// Returns a `DomainError` when the request violates a structural
/// invariant, the salary history is empty, or the average salary or years
/// of service are non-positive.
pub fn calculate_settlement(
    request: &SettlementRequest,
    profile: &EmployeeProfile,
    deductions: &dyn StatutoryDeductions,
    as_of: OffsetDateTime,
) -> Result<SettlementResult, DomainError> {
    crate::validation::validate_settlement_request(request)?;

    if profile.monthly_gross_salaries.is_empty() {
        return Err(DomainError::EmptySalaryHistory);
    }
    if profile.years_of_service <= 0.0 {
        return Err(DomainError::NonPositiveServiceYears {
            years: profile.years_of_service,
        });
    }

    let average: Money = average_monthly_salary(&profile.monthly_gross_salaries)?;
    if !average.is_positive() {
        return Err(DomainError::NonPositiveAverageSalary {
            average: average.minor(),
        });
    }

    let rules = country_rules(profile.country);
    let service: ServiceLength = profile.service();

    let prorated_salary: Money = prorated_final_salary(request, profile)?;
    let vacation_payout: Money =
        average.prorate(i64::from(profile.accrued_vacation_days), DAILY_RATE_DIVISOR)?;
    let notice_payment: Money = notice_payment(
        request.classification,
        request.notice_disposition,
        average,
        rules.legal_minimum_notice_days(service, profile.category),
    )?;

    let mut warnings: Vec<ComplianceWarning> = Vec::new();
    let (severance, gratification) = match request.classification {
        DepartureClass::EndOfFixedTerm
        | DepartureClass::Retirement
        | DepartureClass::Death
        | DepartureClass::ResignationIndefinite
        | DepartureClass::ResignationFixedTerm => (
            Money::ZERO,
            profile.contractual_gratification.unwrap_or(Money::ZERO),
        ),
        DepartureClass::Dismissal => {
            let severance: Money = if request
                .fault_category
                .is_some_and(|fault: FaultCategory| fault.forfeits_severance())
            {
                Money::ZERO
            } else {
                statutory_severance(average, service, rules.severance_rate_for(service, None))?
            };
            (
                severance,
                profile.contractual_gratification.unwrap_or(Money::ZERO),
            )
        }
        DepartureClass::NegotiatedTermination => {
            // The negotiated figure absorbs severance and gratification, but
            // never undercuts the statutory dismissal-equivalent floor.
            let floor: Money =
                statutory_severance(average, service, rules.severance_rate_for(service, None))?;
            let severance: Money = match request.negotiated_amount {
                Some(negotiated) => {
                    if negotiated < floor {
                        warnings.push(ComplianceWarning::NegotiatedBelowStatutoryFloor {
                            negotiated,
                            statutory_floor: floor,
                        });
                    }
                    negotiated.max(floor)
                }
                None => floor,
            };
            (severance, Money::ZERO)
        }
    };

    let gross_total: Money = Money::checked_sum([
        severance,
        vacation_payout,
        gratification,
        prorated_salary,
        notice_payment,
    ])?;
    let net_total: Money =
        gross_total.checked_sub(deductions.deductions_for(gross_total, profile.country))?;

    let apportionment: Vec<BeneficiaryShare> = if request.classification == DepartureClass::Death {
        apportion_net_total(net_total, &request.beneficiaries)?
    } else {
        Vec::new()
    };

    Ok(SettlementResult {
        severance,
        vacation_payout,
        gratification,
        prorated_salary,
        notice_payment,
        gross_total,
        net_total,
        years_of_service: profile.years_of_service,
        average_monthly_salary: average,
        calculated_at: as_of,
        warnings,
        apportionment,
    })
}

/// Averages the trailing salary window (at most the last twelve entries).
fn average_monthly_salary(monthly: &[Money]) -> Result<Money, DomainError> {
    let window: &[Money] = if monthly.len() > AVERAGE_WINDOW_MONTHS {
        &monthly[monthly.len() - AVERAGE_WINDOW_MONTHS..]
    } else {
        monthly
    };
    let total: Money = Money::checked_sum(window.iter().copied())?;
    let count: i64 = i64::try_from(window.len()).map_err(|_| DomainError::AmountOverflow {
        operation: "counting salary history entries",
    })?;
    total.prorate(1, count)
}

/// Prorates the final month's salary by days worked in the termination month.
fn prorated_final_salary(
    request: &SettlementRequest,
    profile: &EmployeeProfile,
) -> Result<Money, DomainError> {
    // Guarded against empty history by the caller.
    let final_month: Money = profile
        .monthly_gross_salaries
        .last()
        .copied()
        .ok_or(DomainError::EmptySalaryHistory)?;
    let date = request.termination_date;
    let days_in_month: i64 = i64::from(date.month().length(date.year()));
    final_month.prorate(i64::from(date.day()), days_in_month)
}

/// Computes the signed notice-period line item.
///
/// On resignation, a waived or employee-paid notice is owed by the employee
/// to the employer, so it appears as a negative deduction. Outside
/// resignation, a waiver is mutual and nothing is owed.
fn notice_payment(
    classification: DepartureClass,
    disposition: NoticeDisposition,
    average: Money,
    notice_days: u16,
) -> Result<Money, DomainError> {
    let base: Money = average.prorate(i64::from(notice_days), DAILY_RATE_DIVISOR)?;

    if matches!(
        classification,
        DepartureClass::EndOfFixedTerm | DepartureClass::Retirement | DepartureClass::Death
    ) {
        return Ok(Money::ZERO);
    }

    let amount: Money = match disposition {
        NoticeDisposition::Worked => Money::ZERO,
        NoticeDisposition::PaidByEmployer => base,
        NoticeDisposition::PaidByEmployee => base.negate(),
        NoticeDisposition::Waived => {
            if classification.is_resignation() {
                base.negate()
            } else {
                Money::ZERO
            }
        }
    };
    Ok(amount)
}

/// Computes the statutory dismissal severance for a service length.
fn statutory_severance(
    average: Money,
    service: ServiceLength,
    rate: SeveranceRate,
) -> Result<Money, DomainError> {
    // rate% of the average monthly salary per year of service, with service
    // carried in months: average * rate * months / (100 * 12).
    average.prorate(
        i64::from(rate.rate_percent) * i64::from(service.months()),
        100 * 12,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deductions::{FlatRateDeductions, ZeroDeductions};
    use crate::types::{Beneficiary, CountryCode, EmployeeCategory, EmployeeId, TenantId};
    use time::macros::{date, datetime};

    fn request(classification: DepartureClass) -> SettlementRequest {
        SettlementRequest {
            tenant_id: TenantId::new("acme"),
            employee_id: EmployeeId::new("emp-1"),
            classification,
            termination_date: date!(2026 - 03 - 31),
            notice_disposition: NoticeDisposition::PaidByEmployer,
            fault_category: None,
            negotiated_amount: None,
            beneficiaries: Vec::new(),
        }
    }

    fn profile(years: f64) -> EmployeeProfile {
        EmployeeProfile {
            country: CountryCode::CI,
            category: EmployeeCategory::Worker,
            monthly_gross_salaries: vec![Money::from_minor(300_000); 12],
            accrued_vacation_days: 14,
            years_of_service: years,
            contractual_gratification: None,
        }
    }

    fn as_of() -> OffsetDateTime {
        datetime!(2026-04-01 08:00:00 UTC)
    }

    #[test]
    fn test_economic_dismissal_six_years() {
        // The worked example: 6 years of service, 300,000 average salary,
        // economic dismissal, notice paid by the employer.
        let mut req = request(DepartureClass::Dismissal);
        req.fault_category = Some(FaultCategory::Economic);

        let result =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap();

        // 6-10 year bracket: 35% * 300,000 * 6 years.
        assert_eq!(result.severance, Money::from_minor(630_000));
        // Worker at 6 years: 60 days of notice at 300,000/30 per day.
        assert_eq!(result.notice_payment, Money::from_minor(600_000));
        assert!(result.notice_payment.is_positive());
        // 14 accrued days at the daily rate.
        assert_eq!(result.vacation_payout, Money::from_minor(140_000));
        // Termination on March 31: the full final month.
        assert_eq!(result.prorated_salary, Money::from_minor(300_000));
        assert_eq!(
            result.gross_total,
            Money::checked_sum([
                result.severance,
                result.vacation_payout,
                result.gratification,
                result.prorated_salary,
                result.notice_payment,
            ])
            .unwrap()
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_gross_fault_forfeits_severance_only() {
        let mut economic = request(DepartureClass::Dismissal);
        economic.fault_category = Some(FaultCategory::Economic);
        let mut gross_fault = request(DepartureClass::Dismissal);
        gross_fault.fault_category = Some(FaultCategory::GrossFault);

        let with_severance =
            calculate_settlement(&economic, &profile(6.0), &ZeroDeductions, as_of()).unwrap();
        let without =
            calculate_settlement(&gross_fault, &profile(6.0), &ZeroDeductions, as_of()).unwrap();

        assert_eq!(without.severance, Money::ZERO);
        assert_eq!(without.notice_payment, with_severance.notice_payment);
        assert_eq!(without.vacation_payout, with_severance.vacation_payout);
        assert_eq!(without.prorated_salary, with_severance.prorated_salary);
    }

    #[test]
    fn test_serious_fault_forfeits_severance() {
        let mut req = request(DepartureClass::Dismissal);
        req.fault_category = Some(FaultCategory::SeriousFault);
        let result =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap();
        assert_eq!(result.severance, Money::ZERO);
    }

    #[test]
    fn test_dismissal_severance_meets_statutory_floor() {
        for (fault, years) in [
            (FaultCategory::Economic, 2.0),
            (FaultCategory::SimpleFault, 6.0),
            (FaultCategory::Unfitness, 14.0),
        ] {
            let mut req = request(DepartureClass::Dismissal);
            req.fault_category = Some(fault);
            let prof = profile(years);
            let result =
                calculate_settlement(&req, &prof, &ZeroDeductions, as_of()).unwrap();

            let rules = country_rules(CountryCode::CI);
            let service = prof.service();
            let floor = statutory_severance(
                result.average_monthly_salary,
                service,
                rules.severance_rate_for(service, None),
            )
            .unwrap();
            assert!(
                result.severance >= floor,
                "severance below floor for {fault:?} at {years} years"
            );
        }
    }

    #[test]
    fn test_resignation_has_no_severance() {
        let mut req = request(DepartureClass::ResignationIndefinite);
        req.notice_disposition = NoticeDisposition::Worked;
        let result =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap();
        assert_eq!(result.severance, Money::ZERO);
        assert_eq!(result.notice_payment, Money::ZERO);
    }

    #[test]
    fn test_resignation_waived_notice_is_owed_by_employee() {
        let mut req = request(DepartureClass::ResignationIndefinite);
        req.notice_disposition = NoticeDisposition::Waived;
        let result =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap();
        assert_eq!(result.notice_payment, Money::from_minor(-600_000));
    }

    #[test]
    fn test_resignation_paid_by_employee_is_negative() {
        let mut req = request(DepartureClass::ResignationFixedTerm);
        req.notice_disposition = NoticeDisposition::PaidByEmployee;
        let result =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap();
        assert!(result.notice_payment < Money::ZERO);
    }

    #[test]
    fn test_dismissal_waived_notice_owes_nothing() {
        let mut req = request(DepartureClass::Dismissal);
        req.fault_category = Some(FaultCategory::SimpleFault);
        req.notice_disposition = NoticeDisposition::Waived;
        let result =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap();
        assert_eq!(result.notice_payment, Money::ZERO);
    }

    #[test]
    fn test_retirement_pays_no_severance_or_notice() {
        let mut prof = profile(20.0);
        prof.contractual_gratification = Some(Money::from_minor(150_000));
        let result = calculate_settlement(
            &request(DepartureClass::Retirement),
            &prof,
            &ZeroDeductions,
            as_of(),
        )
        .unwrap();
        assert_eq!(result.severance, Money::ZERO);
        assert_eq!(result.notice_payment, Money::ZERO);
        assert_eq!(result.gratification, Money::from_minor(150_000));
    }

    #[test]
    fn test_negotiated_below_floor_is_raised_and_warned() {
        let mut req = request(DepartureClass::NegotiatedTermination);
        req.negotiated_amount = Some(Money::from_minor(100_000));
        let result =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap();

        // The floor for 6 years at 300,000 average is 630,000.
        assert_eq!(result.severance, Money::from_minor(630_000));
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            result.warnings[0],
            ComplianceWarning::NegotiatedBelowStatutoryFloor { .. }
        ));
    }

    #[test]
    fn test_negotiated_above_floor_is_kept_without_warning() {
        let mut req = request(DepartureClass::NegotiatedTermination);
        req.negotiated_amount = Some(Money::from_minor(900_000));
        let result =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap();
        assert_eq!(result.severance, Money::from_minor(900_000));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_negotiated_without_amount_uses_the_floor() {
        let req = request(DepartureClass::NegotiatedTermination);
        let result =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap();
        assert_eq!(result.severance, Money::from_minor(630_000));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_death_apportionment_sums_to_net_exactly() {
        let mut req = request(DepartureClass::Death);
        req.notice_disposition = NoticeDisposition::Worked;
        req.beneficiaries = vec![
            Beneficiary {
                name: String::from("spouse"),
                relationship: String::from("spouse"),
                identity_document_ref: String::from("id-1"),
                bank_account_ref: String::from("acct-1"),
                share_percent: 50,
            },
            Beneficiary {
                name: String::from("child-a"),
                relationship: String::from("child"),
                identity_document_ref: String::from("id-2"),
                bank_account_ref: String::from("acct-2"),
                share_percent: 27,
            },
            Beneficiary {
                name: String::from("child-b"),
                relationship: String::from("child"),
                identity_document_ref: String::from("id-3"),
                bank_account_ref: String::from("acct-3"),
                share_percent: 23,
            },
        ];

        // A deduction provider that forces an awkward net total.
        let result = calculate_settlement(
            &req,
            &profile(6.0),
            &FlatRateDeductions::new(333),
            as_of(),
        )
        .unwrap();

        assert_eq!(result.apportionment.len(), 3);
        let apportioned: i64 = result.apportionment.iter().map(|s| s.amount.minor()).sum();
        assert_eq!(apportioned, result.net_total.minor());
    }

    #[test]
    fn test_death_without_beneficiaries_fails_validation() {
        let req = request(DepartureClass::Death);
        let err =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap_err();
        assert_eq!(err, DomainError::MissingBeneficiaries);
    }

    #[test]
    fn test_prorated_salary_mid_month() {
        let mut req = request(DepartureClass::Dismissal);
        req.fault_category = Some(FaultCategory::Economic);
        req.termination_date = date!(2026 - 04 - 15);
        let result =
            calculate_settlement(&req, &profile(6.0), &ZeroDeductions, as_of()).unwrap();
        // 15 of 30 days in April.
        assert_eq!(result.prorated_salary, Money::from_minor(150_000));
    }

    #[test]
    fn test_average_uses_trailing_twelve_months_only() {
        let mut prof = profile(6.0);
        // Fifteen months of history; the first three (at 900,000) must be
        // ignored by the trailing-12 window.
        let mut history = vec![Money::from_minor(900_000); 3];
        history.extend(vec![Money::from_minor(300_000); 12]);
        prof.monthly_gross_salaries = history;

        let mut req = request(DepartureClass::Dismissal);
        req.fault_category = Some(FaultCategory::Economic);
        let result = calculate_settlement(&req, &prof, &ZeroDeductions, as_of()).unwrap();
        assert_eq!(result.average_monthly_salary, Money::from_minor(300_000));
    }

    #[test]
    fn test_short_history_averages_available_months() {
        let mut prof = profile(1.0);
        prof.monthly_gross_salaries = vec![
            Money::from_minor(200_000),
            Money::from_minor(250_000),
            Money::from_minor(300_000),
        ];
        let mut req = request(DepartureClass::Dismissal);
        req.fault_category = Some(FaultCategory::Economic);
        let result = calculate_settlement(&req, &prof, &ZeroDeductions, as_of()).unwrap();
        assert_eq!(result.average_monthly_salary, Money::from_minor(250_000));
    }

    #[test]
    fn test_empty_salary_history_is_an_error() {
        let mut prof = profile(6.0);
        prof.monthly_gross_salaries = Vec::new();
        let err = calculate_settlement(
            &request(DepartureClass::Dismissal),
            &prof,
            &ZeroDeductions,
            as_of(),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::EmptySalaryHistory);
    }

    #[test]
    fn test_non_positive_average_salary_is_an_error() {
        let mut prof = profile(6.0);
        prof.monthly_gross_salaries = vec![Money::ZERO; 12];
        let err = calculate_settlement(
            &request(DepartureClass::Dismissal),
            &prof,
            &ZeroDeductions,
            as_of(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NonPositiveAverageSalary { .. }));
    }

    #[test]
    fn test_non_positive_service_years_is_an_error() {
        let err = calculate_settlement(
            &request(DepartureClass::Dismissal),
            &profile(0.0),
            &ZeroDeductions,
            as_of(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NonPositiveServiceYears { .. }));
    }

    #[test]
    fn test_calculation_is_deterministic() {
        let mut req = request(DepartureClass::Dismissal);
        req.fault_category = Some(FaultCategory::Economic);
        let prof = profile(6.0);

        let first = calculate_settlement(&req, &prof, &ZeroDeductions, as_of()).unwrap();
        let second = calculate_settlement(&req, &prof, &ZeroDeductions, as_of()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_net_total_reflects_deductions() {
        let mut req = request(DepartureClass::Dismissal);
        req.fault_category = Some(FaultCategory::Economic);
        let result = calculate_settlement(
            &req,
            &profile(6.0),
            &FlatRateDeductions::new(1_000),
            as_of(),
        )
        .unwrap();
        // 10% deduction.
        assert_eq!(
            result.net_total,
            result
                .gross_total
                .checked_sub(result.gross_total.prorate(1, 10).unwrap())
                .unwrap()
        );
    }
}
