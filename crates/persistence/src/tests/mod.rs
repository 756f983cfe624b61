// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod claim_tests;

use solde::TerminationCase;
use solde_audit::{Actor, Cause};
use solde_domain::{
    CountryCode, DepartureClass, EmployeeCategory, EmployeeId, EmployeeProfile, FaultCategory,
    Money, NoticeDisposition, SettlementRequest, TenantId,
};
use time::macros::date;

pub fn test_actor() -> Actor {
    Actor::operator("test-operator")
}

pub fn test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn test_tenant() -> TenantId {
    TenantId::new("acme")
}

pub fn test_employee() -> EmployeeId {
    EmployeeId::new("emp-1")
}

pub fn test_profile() -> EmployeeProfile {
    EmployeeProfile {
        country: CountryCode::CI,
        category: EmployeeCategory::Worker,
        monthly_gross_salaries: vec![Money::from_minor(300_000); 12],
        accrued_vacation_days: 14,
        years_of_service: 6.0,
        contractual_gratification: None,
    }
}

pub fn test_request() -> SettlementRequest {
    SettlementRequest {
        tenant_id: test_tenant(),
        employee_id: test_employee(),
        classification: DepartureClass::Dismissal,
        termination_date: date!(2026 - 03 - 31),
        notice_disposition: NoticeDisposition::PaidByEmployer,
        fault_category: Some(FaultCategory::Economic),
        negotiated_amount: None,
        beneficiaries: Vec::new(),
    }
}

pub fn test_case() -> TerminationCase {
    TerminationCase::new(test_request())
}
