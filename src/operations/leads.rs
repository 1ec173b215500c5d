//! Leads import.
//!
//! A lead identifies its person either by `user_id` or by the pair
//! `area_code` + `mobile`. One lead per call.

use super::{body_from, unsupported, Arguments, Operation, ToolCategory};
use crate::partner::PartnerRequest;
use crate::types::{Error, Result};

/// Alternative identifier sets; at least one must be fully present.
pub const IDENTITY_GROUPS: &[&[&str]] = &[&["user_id"], &["area_code", "mobile"]];

/// Free-text lead attributes forwarded unchanged: `(name, description)`.
pub const TEXT_FIELDS: &[(&str, &str)] = &[
    ("user_id", "User ID"),
    ("area_code", "Area code"),
    ("mobile", "Mobile number"),
    ("name", "User name"),
    ("source", "Source of the lead"),
    ("utm_source", "UTM source"),
    ("utm_medium", "UTM medium"),
    ("utm_campaign", "UTM campaign"),
    ("utm_channel", "UTM channel"),
    ("utm_keyword", "UTM keyword"),
    ("utm_term", "UTM term"),
    ("campaign", "Campaign"),
    ("form1_name", "Form1 name"),
    ("form1_value", "Form1 value"),
    ("form2_name", "Form2 name"),
    ("form2_value", "Form2 value"),
    ("form3_name", "Form3 name"),
    ("form3_value", "Form3 value"),
    ("form4_name", "Form4 name"),
    ("form4_value", "Form4 value"),
    ("entry_id", "Entry ID"),
    ("page_id", "Page ID"),
    ("course_code", "Course code"),
    ("bd_vid", "Business development VID"),
    ("company_name", "Company name"),
    ("work_exp", "Work experience"),
    ("job_title", "Job title"),
    ("department", "Department"),
    ("city", "City"),
    ("oid", "Owner ID (legacy)"),
    ("corp_id", "Organization ID"),
];

/// Boolean lead attribute.
pub const CORPORATE_TRAINING_FIELD: &str = "is_corporate_training";

/// String-list lead attribute.
pub const OWNER_IDS_FIELD: &str = "owner_ids";

fn is_present(arguments: &Arguments, key: &str) -> bool {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .map_or(false, |s| !s.trim().is_empty())
}

/// Fail unless the lead carries `user_id` or both `area_code` and `mobile`.
pub fn ensure_identified(arguments: &Arguments) -> Result<()> {
    let identified = IDENTITY_GROUPS
        .iter()
        .any(|group| group.iter().all(|key| is_present(arguments, key)));
    if identified {
        Ok(())
    } else {
        Err(Error::validation(
            "either user_id or both area_code and mobile must be provided",
        ))
    }
}

pub(crate) fn prepare(operation: Operation, arguments: &Arguments) -> Result<PartnerRequest> {
    if operation != Operation::ImportLeads {
        return Err(unsupported(ToolCategory::Leads, operation));
    }
    ensure_identified(arguments)?;

    let keys: Vec<&str> = TEXT_FIELDS
        .iter()
        .map(|(name, _)| *name)
        .chain([CORPORATE_TRAINING_FIELD, OWNER_IDS_FIELD])
        .collect();
    Ok(PartnerRequest::post("/api/v5/entity/leads/import").with_body(body_from(arguments, &keys)))
}
