// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Country-specific statutory minimums.
//!
//! This module provides pure lookup functions over per-country rule tables:
//! severance rate brackets, notice periods by seniority and professional
//! category, the leave-accrual floor, and overtime multipliers. Every
//! function returns the statutory floor, never a value below it; callers are
//! responsible for taking the maximum of the floor and any contractual or
//! negotiated value. All lookups are total over validated inputs,
//! side-effect-free, and safe to call concurrently.

use crate::types::{CountryCode, EmployeeCategory, ServiceLength};
use serde::{Deserialize, Serialize};

/// Service bracket of the severance rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceBracket {
    /// Service up to and including five years.
    UpToFiveYears,
    /// Service beyond five and up to ten years.
    SixToTenYears,
    /// Service beyond ten years.
    BeyondTenYears,
}

/// A severance rate: the bracket that applied and the statutory percentage
/// of the average monthly salary owed per year of service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveranceRate {
    /// The service bracket the employee falls into.
    pub bracket: ServiceBracket,
    /// Percent of the average monthly salary per year of service.
    pub rate_percent: u8,
}

/// Economic sector, for sector-specific collective agreements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    /// The interprofessional regime.
    General,
    /// Building and public works.
    Construction,
    /// Commerce and services.
    Commerce,
}

/// Overtime band for the statutory multiplier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeBand {
    /// The first tranche of weekly overtime hours.
    FirstTranche,
    /// Weekly overtime hours beyond the first tranche.
    BeyondFirstTranche,
    /// Night work on an ordinary day.
    NightWeekday,
    /// Daytime work on the weekly rest day or a public holiday.
    DayRestOrHoliday,
    /// Night work on the weekly rest day or a public holiday.
    NightRestOrHoliday,
}

/// One row of the notice-period table: minimum service (in months) and the
/// statutory notice in days.
#[derive(Debug, Clone, Copy)]
struct NoticeRow {
    /// Minimum completed months of service for this row to apply.
    min_months: u32,
    /// Statutory notice period in days.
    days: u16,
}

/// The statutory rule tables for one country.
#[derive(Debug, Clone, Copy)]
pub struct CountryRules {
    country: CountryCode,
    /// Severance rate percent per bracket: (up to 5y, 6-10y, beyond 10y).
    severance_percents: (u8, u8, u8),
    /// Notice tables per category, rows ordered by descending `min_months`.
    worker_notice: &'static [NoticeRow],
    supervisor_notice: &'static [NoticeRow],
    executive_notice: &'static [NoticeRow],
    /// Leave accrual floor in hundredths of a day per month.
    leave_base_hundredths: u16,
    /// Overtime multipliers in percent, in [`OvertimeBand`] order.
    overtime_percents: (u16, u16, u16, u16, u16),
}

const CI_WORKER_NOTICE: &[NoticeRow] = &[
    NoticeRow {
        min_months: 16 * 12,
        days: 120,
    },
    NoticeRow {
        min_months: 11 * 12,
        days: 90,
    },
    NoticeRow {
        min_months: 6 * 12,
        days: 60,
    },
    NoticeRow {
        min_months: 12,
        days: 30,
    },
    NoticeRow {
        min_months: 6,
        days: 15,
    },
    NoticeRow {
        min_months: 0,
        days: 8,
    },
];

const CI_SUPERVISOR_NOTICE: &[NoticeRow] = &[
    NoticeRow {
        min_months: 5 * 12,
        days: 90,
    },
    NoticeRow {
        min_months: 12,
        days: 60,
    },
    NoticeRow {
        min_months: 0,
        days: 30,
    },
];

const CI_EXECUTIVE_NOTICE: &[NoticeRow] = &[
    NoticeRow {
        min_months: 5 * 12,
        days: 120,
    },
    NoticeRow {
        min_months: 0,
        days: 90,
    },
];

const SN_WORKER_NOTICE: &[NoticeRow] = &[
    NoticeRow {
        min_months: 16 * 12,
        days: 90,
    },
    NoticeRow {
        min_months: 11 * 12,
        days: 60,
    },
    NoticeRow {
        min_months: 6 * 12,
        days: 45,
    },
    NoticeRow {
        min_months: 12,
        days: 30,
    },
    NoticeRow {
        min_months: 6,
        days: 15,
    },
    NoticeRow {
        min_months: 0,
        days: 8,
    },
];

const SN_SUPERVISOR_NOTICE: &[NoticeRow] = &[
    NoticeRow {
        min_months: 5 * 12,
        days: 90,
    },
    NoticeRow {
        min_months: 12,
        days: 60,
    },
    NoticeRow {
        min_months: 0,
        days: 30,
    },
];

const SN_EXECUTIVE_NOTICE: &[NoticeRow] = &[
    NoticeRow {
        min_months: 5 * 12,
        days: 90,
    },
    NoticeRow {
        min_months: 0,
        days: 60,
    },
];

const CI_RULES: CountryRules = CountryRules {
    country: CountryCode::CI,
    severance_percents: (30, 35, 40),
    worker_notice: CI_WORKER_NOTICE,
    supervisor_notice: CI_SUPERVISOR_NOTICE,
    executive_notice: CI_EXECUTIVE_NOTICE,
    leave_base_hundredths: 220,
    overtime_percents: (115, 150, 175, 175, 200),
};

const SN_RULES: CountryRules = CountryRules {
    country: CountryCode::SN,
    severance_percents: (25, 30, 40),
    worker_notice: SN_WORKER_NOTICE,
    supervisor_notice: SN_SUPERVISOR_NOTICE,
    executive_notice: SN_EXECUTIVE_NOTICE,
    leave_base_hundredths: 200,
    overtime_percents: (115, 140, 160, 160, 200),
};

/// Looks up the rule tables for a country.
///
/// Total over [`CountryCode`]: a country without tables cannot be
/// constructed. Unsupported countries are rejected when the code is parsed
/// at the boundary, which is what surfaces as a computation failure in the
/// background pipeline.
#[must_use]
pub const fn country_rules(country: CountryCode) -> &'static CountryRules {
    match country {
        CountryCode::CI => &CI_RULES,
        CountryCode::SN => &SN_RULES,
    }
}

impl CountryRules {
    /// Returns the country these tables belong to.
    #[must_use]
    pub const fn country(&self) -> CountryCode {
        self.country
    }

    /// Returns the statutory severance rate for a length of service.
    ///
    /// The returned rate is a floor. Sector-specific collective agreements
    /// only ever raise it by contract, which callers fold in by taking the
    /// maximum of the floor and the contractual value.
    #[must_use]
    pub const fn severance_rate_for(
        &self,
        service: ServiceLength,
        sector: Option<Sector>,
    ) -> SeveranceRate {
        let _ = sector;
        let (up_to_five, six_to_ten, beyond_ten) = self.severance_percents;
        if service.months() <= 5 * 12 {
            SeveranceRate {
                bracket: ServiceBracket::UpToFiveYears,
                rate_percent: up_to_five,
            }
        } else if service.months() <= 10 * 12 {
            SeveranceRate {
                bracket: ServiceBracket::SixToTenYears,
                rate_percent: six_to_ten,
            }
        } else {
            SeveranceRate {
                bracket: ServiceBracket::BeyondTenYears,
                rate_percent: beyond_ten,
            }
        }
    }

    /// Returns the statutory minimum notice period in days.
    #[must_use]
    pub fn legal_minimum_notice_days(
        &self,
        service: ServiceLength,
        category: EmployeeCategory,
    ) -> u16 {
        let table: &[NoticeRow] = match category {
            EmployeeCategory::Worker => self.worker_notice,
            EmployeeCategory::Supervisor => self.supervisor_notice,
            EmployeeCategory::Executive => self.executive_notice,
        };
        table
            .iter()
            .find(|row| service.months() >= row.min_months)
            .map_or(0, |row| row.days)
    }

    /// Returns the statutory leave-accrual floor in hundredths of a day per
    /// month of service.
    ///
    /// Workers under eighteen accrue at an increased rate, and long service
    /// adds supplementary days (expressed here per month).
    #[must_use]
    pub const fn leave_accrual_minimum(
        &self,
        age_years: Option<u8>,
        seniority_years: Option<u8>,
    ) -> u16 {
        let base: u16 = match age_years {
            Some(age) if age < 18 => self.leave_base_hundredths + 20,
            _ => self.leave_base_hundredths,
        };
        let supplement: u16 = match seniority_years {
            Some(years) if years >= 20 => 42,
            Some(years) if years >= 15 => 25,
            Some(years) if years >= 10 => 17,
            Some(years) if years >= 5 => 8,
            _ => 0,
        };
        base + supplement
    }

    /// Returns the statutory overtime multiplier in percent for a band.
    #[must_use]
    pub const fn overtime_multiplier(&self, band: OvertimeBand) -> u16 {
        let (first, beyond, night, rest_day, rest_night) = self.overtime_percents;
        match band {
            OvertimeBand::FirstTranche => first,
            OvertimeBand::BeyondFirstTranche => beyond,
            OvertimeBand::NightWeekday => night,
            OvertimeBand::DayRestOrHoliday => rest_day,
            OvertimeBand::NightRestOrHoliday => rest_night,
        }
    }
}
