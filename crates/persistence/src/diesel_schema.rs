// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

diesel::table! {
    employees (tenant_id, employee_id) {
        tenant_id -> Text,
        employee_id -> Text,
        country -> Text,
        category -> Text,
        years_of_service -> Double,
        accrued_vacation_days -> Integer,
        contractual_gratification_minor -> Nullable<BigInt>,
        updated_at -> Text,
    }
}

diesel::table! {
    salary_history (tenant_id, employee_id, month_offset) {
        tenant_id -> Text,
        employee_id -> Text,
        month_offset -> Integer,
        gross_minor -> BigInt,
    }
}

diesel::table! {
    termination_cases (case_id) {
        case_id -> BigInt,
        tenant_id -> Text,
        employee_id -> Text,
        classification -> Text,
        termination_date -> Text,
        notice_disposition -> Text,
        fault_category -> Nullable<Text>,
        negotiated_amount_minor -> Nullable<BigInt>,
        beneficiaries_json -> Text,
        status -> Text,
        progress_percent -> Integer,
        current_step -> Text,
        error_message -> Nullable<Text>,
        job_handle -> Nullable<Text>,
        issuer -> Nullable<Text>,
        pay_date -> Nullable<Text>,
        document_version -> Integer,
        created_at -> Text,
        started_at -> Nullable<Text>,
        completed_at -> Nullable<Text>,
        work_certificate_ref -> Nullable<Text>,
        final_payslip_ref -> Nullable<Text>,
        fund_attestation_ref -> Nullable<Text>,
        result_json -> Nullable<Text>,
    }
}

diesel::table! {
    case_documents (document_id) {
        document_id -> BigInt,
        case_id -> BigInt,
        kind -> Text,
        reference -> Text,
        version -> Integer,
        issued_by -> Text,
        pay_date -> Text,
        generated_at -> Text,
    }
}

diesel::table! {
    audit_events (event_id) {
        event_id -> BigInt,
        case_id -> Nullable<BigInt>,
        actor_json -> Text,
        cause_json -> Text,
        action_json -> Text,
        before_snapshot_json -> Text,
        after_snapshot_json -> Text,
        created_at -> Text,
    }
}

diesel::joinable!(case_documents -> termination_cases (case_id));
diesel::joinable!(audit_events -> termination_cases (case_id));

diesel::allow_tables_to_appear_in_same_query!(
    employees,
    salary_history,
    termination_cases,
    case_documents,
    audit_events,
);
