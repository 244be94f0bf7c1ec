//! Admin forms and pre-submit validation
//!
//! A form that fails validation is never sent; the caller shows the resulting notice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};
use crate::notify::{AdminError, Notice};
use crate::{DiscountType, NotificationKind, ProductStatus};

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_coupon", skip_on_field_errors = false))]
pub struct CouponForm {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub discount_type: DiscountType,
    #[validate(custom = "positive")]
    pub discount_value: Decimal,
    #[serde(default)]
    #[validate(custom = "not_negative")]
    pub min_order_value: Decimal,
    #[validate(range(min = 1))]
    pub usage_limit: Option<u32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1))]
    pub sku: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(custom = "positive")]
    pub price: Decimal,
    #[validate(custom = "positive")]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub status: ProductStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct NotificationForm {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    pub kind: NotificationKind,
}

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO { Ok(()) } else { Err(ValidationError::new("positive")) }
}

fn not_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO { Ok(()) } else { Err(ValidationError::new("not_negative")) }
}

fn validate_coupon(form: &CouponForm) -> Result<(), ValidationError> {
    if form.end_date <= form.start_date {
        return Err(form_error("end_before_start", "End date must be after the start date"));
    }
    if form.discount_type == DiscountType::Percentage && form.discount_value > Decimal::ONE_HUNDRED {
        return Err(form_error("percentage_over_100", "A percentage discount cannot exceed 100"));
    }
    Ok(())
}

fn form_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Validates `form` before anything is sent.
pub fn check_before_submit<T: Validate>(form: &T) -> Result<(), AdminError> {
    form.validate().map_err(|errors| {
        tracing::debug!(%errors, "form rejected before submit");
        AdminError::Validation(errors)
    })
}

/// Runs `submit` only for a valid form; any failure becomes an error notice.
pub fn submit_with<T, F, R>(form: &T, submit: F) -> Result<R, Notice>
where
    T: Validate,
    F: FnOnce(&T) -> Result<R, AdminError>,
{
    check_before_submit(form).and_then(|()| submit(form)).map_err(|e| Notice::from(&e))
}

/// Like [`submit_with`], but reports either outcome as a notice.
pub fn submit_and_notify<T, F, R>(form: &T, done: &str, submit: F) -> Notice
where
    T: Validate,
    F: FnOnce(&T) -> Result<R, AdminError>,
{
    match submit_with(form, submit) {
        Ok(_) => Notice::success(done),
        Err(notice) => notice,
    }
}
