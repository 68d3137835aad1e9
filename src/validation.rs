//! Input checks shared by the HTTP handlers and the CLI.

use crate::error::{Error, Result};
use crate::fields::{self, join_names, PeriodFilter, PromptCategory, TaskStatus, TemplateCategory};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Names must be 1-100 characters after trimming.
pub fn validate_name(name: Option<&str>) -> Result<&str> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(Error::validation("name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::validation(format!(
            "name must be {MAX_NAME_LEN} characters or less"
        )));
    }
    Ok(name)
}

pub fn validate_description(description: Option<&str>) -> Result<()> {
    if description.is_some_and(|d| d.trim().chars().count() > MAX_DESCRIPTION_LEN) {
        return Err(Error::validation(format!(
            "description must be {MAX_DESCRIPTION_LEN} characters or less"
        )));
    }
    Ok(())
}

pub fn validate_template_category(category: Option<&str>) -> Result<TemplateCategory> {
    let category = category.filter(|c| !c.is_empty()).ok_or_else(|| Error::validation("category is required"))?;
    fields::parse_template_category(category).ok_or_else(|| {
        Error::validation(format!(
            "Invalid category. Must be one of: {}",
            join_names(&TemplateCategory::ALL)
        ))
    })
}

pub fn validate_prompt_category(category: Option<&str>) -> Result<PromptCategory> {
    let category = category.filter(|c| !c.is_empty()).ok_or_else(|| Error::validation("category is required"))?;
    fields::parse_prompt_category(category).ok_or_else(|| {
        Error::validation(format!(
            "Invalid category. Must be one of: {}",
            join_names(&PromptCategory::ALL)
        ))
    })
}

pub fn validate_status(status: Option<&str>) -> Result<TaskStatus> {
    let status = status.filter(|s| !s.is_empty()).ok_or_else(|| Error::validation("status is required"))?;
    fields::parse_status(status).ok_or_else(|| {
        Error::validation(format!(
            "Invalid status: {status}. Must be one of: {}",
            join_names(&TaskStatus::ALL)
        ))
    })
}

/// Timeline period, weekly when absent.
pub fn validate_period(period: Option<&str>) -> Result<PeriodFilter> {
    match period.filter(|p| !p.is_empty()) {
        None => Ok(PeriodFilter::default()),
        Some(p) => fields::parse_period(p).ok_or_else(|| {
            Error::validation(format!(
                "Invalid period: {p}. Must be one of: {}",
                join_names(&PeriodFilter::ALL)
            ))
        }),
    }
}
