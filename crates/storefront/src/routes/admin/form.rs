//! Generic form handling for the admin panel.
//!
//! Every resource describes its form as a list of [`Field`]s. Submitted
//! values arrive as a flat [`FormValues`] map and are parsed field by field;
//! the first failure becomes a [`FieldError`] that is shown above the
//! re-rendered form.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Format used by `<input type="datetime-local">`.
const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

/// Largest amount a `NUMERIC(10, 2)` column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// A submitted value could not be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Whether a form creates a new row or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Input widget for a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    TextArea,
    Integer,
    Decimal,
    Checkbox,
    Password,
    DateTime,
    Select(&'static [&'static str]),
}

/// One field of a resource form.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    /// A required field.
    #[must_use]
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
        }
    }

    /// Mark the field as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Raw submitted form values, keyed by field name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FormValues(HashMap<String, String>);

impl FormValues {
    /// Set a value, used when prefilling an edit form.
    pub fn set(&mut self, name: &str, value: impl ToString) {
        self.0.insert(name.to_owned(), value.to_string());
    }

    /// Set a value when present, leaving the field empty otherwise.
    pub fn set_opt(&mut self, name: &str, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    /// Set a timestamp in `datetime-local` format.
    pub fn set_datetime(&mut self, name: &str, value: DateTime<Utc>) {
        self.set(name, value.format(DATETIME_LOCAL));
    }

    /// The trimmed value, or an empty string when absent.
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map_or("", |v| v.trim())
    }

    /// A non-empty string.
    ///
    /// # Errors
    ///
    /// Fails when the field is blank.
    pub fn text(&self, name: &'static str) -> Result<String, FieldError> {
        self.optional_text(name)
            .ok_or_else(|| FieldError::new(name, "es obligatorio"))
    }

    /// A string, `None` when blank.
    #[must_use]
    pub fn optional_text(&self, name: &str) -> Option<String> {
        let value = self.get(name);
        (!value.is_empty()).then(|| value.to_owned())
    }

    /// A non-empty string of at most `max` characters.
    ///
    /// # Errors
    ///
    /// Fails when blank or too long.
    pub fn text_max(&self, name: &'static str, max: usize) -> Result<String, FieldError> {
        self.optional_text_max(name, max)?
            .ok_or_else(|| FieldError::new(name, "es obligatorio"))
    }

    /// A string of at most `max` characters, `None` when blank.
    ///
    /// # Errors
    ///
    /// Fails when longer than `max` characters.
    pub fn optional_text_max(
        &self,
        name: &'static str,
        max: usize,
    ) -> Result<Option<String>, FieldError> {
        let value = self.optional_text(name);
        if value.as_ref().is_some_and(|v| v.chars().count() > max) {
            return Err(FieldError::new(
                name,
                format!("no puede tener más de {max} caracteres"),
            ));
        }
        Ok(value)
    }

    /// A required whole number.
    ///
    /// # Errors
    ///
    /// Fails when blank or not an integer.
    pub fn integer(&self, name: &'static str) -> Result<i32, FieldError> {
        self.optional_integer(name)?
            .ok_or_else(|| FieldError::new(name, "es obligatorio"))
    }

    /// An optional whole number.
    ///
    /// # Errors
    ///
    /// Fails when present but not an integer.
    pub fn optional_integer(&self, name: &'static str) -> Result<Option<i32>, FieldError> {
        self.parse_optional(name, "debe ser un número entero")
    }

    /// A whole number that is zero or more.
    ///
    /// # Errors
    ///
    /// Fails when blank, not an integer, or negative.
    pub fn non_negative(&self, name: &'static str) -> Result<i32, FieldError> {
        let value = self.integer(name)?;
        if value < 0 {
            return Err(FieldError::new(name, "no puede ser negativo"));
        }
        Ok(value)
    }

    /// A whole number greater than zero.
    ///
    /// # Errors
    ///
    /// Fails when blank, not an integer, or not positive.
    pub fn positive(&self, name: &'static str) -> Result<i32, FieldError> {
        let value = self.integer(name)?;
        if value <= 0 {
            return Err(FieldError::new(name, "debe ser mayor que cero"));
        }
        Ok(value)
    }

    /// A non-negative decimal amount that fits a `NUMERIC(10, 2)` column.
    ///
    /// # Errors
    ///
    /// Fails when blank, not a number, negative, or above [`MAX_AMOUNT`].
    pub fn decimal(&self, name: &'static str) -> Result<Decimal, FieldError> {
        let value: Decimal = self
            .parse_optional(name, "debe ser un número decimal")?
            .ok_or_else(|| FieldError::new(name, "es obligatorio"))?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(FieldError::new(name, "no puede ser negativo"));
        }
        if value.round_dp(2) > MAX_AMOUNT {
            return Err(FieldError::new(
                name,
                format!("no puede ser mayor que {MAX_AMOUNT}"),
            ));
        }
        Ok(value)
    }

    /// A reference to another row by id.
    ///
    /// # Errors
    ///
    /// Fails when blank or not an integer.
    pub fn id<T: From<i32>>(&self, name: &'static str) -> Result<T, FieldError> {
        self.integer(name).map(T::from)
    }

    /// An optional reference to another row.
    ///
    /// # Errors
    ///
    /// Fails when present but not an integer.
    pub fn optional_id<T: From<i32>>(&self, name: &'static str) -> Result<Option<T>, FieldError> {
        Ok(self.optional_integer(name)?.map(T::from))
    }

    /// A checkbox: browsers omit unchecked boxes.
    #[must_use]
    pub fn checkbox(&self, name: &str) -> bool {
        matches!(self.get(name), "on" | "true" | "1")
    }

    /// A required timestamp.
    ///
    /// # Errors
    ///
    /// Fails when blank or not a valid date and time.
    pub fn datetime(&self, name: &'static str) -> Result<DateTime<Utc>, FieldError> {
        self.optional_datetime(name)?
            .ok_or_else(|| FieldError::new(name, "es obligatorio"))
    }

    /// An optional timestamp, in `datetime-local` or RFC 3339 form.
    ///
    /// # Errors
    ///
    /// Fails when present but not a valid date and time.
    pub fn optional_datetime(
        &self,
        name: &'static str,
    ) -> Result<Option<DateTime<Utc>>, FieldError> {
        let value = self.get(name);
        if value.is_empty() {
            return Ok(None);
        }
        parse_datetime(value)
            .map(Some)
            .ok_or_else(|| FieldError::new(name, "fecha no válida"))
    }

    /// One of a fixed set of values.
    ///
    /// # Errors
    ///
    /// Fails when blank or not a known option.
    pub fn choice<T: FromStr>(&self, name: &'static str) -> Result<T, FieldError> {
        let value = self.text(name)?;
        value
            .parse()
            .map_err(|_| FieldError::new(name, "valor no válido"))
    }

    fn parse_optional<T: FromStr>(
        &self,
        name: &'static str,
        message: &str,
    ) -> Result<Option<T>, FieldError> {
        let value = self.get(name);
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse()
            .map(Some)
            .map_err(|_| FieldError::new(name, message))
    }
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, DATETIME_LOCAL)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// An `<option>` in a select field.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

/// A field ready for the form template.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    /// `text`, `email`, `textarea`, `number`, `decimal`, `checkbox`,
    /// `password`, `datetime-local` or `select`.
    pub input_type: &'static str,
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub options: Vec<SelectOption>,
}

impl FieldView {
    /// Build the view of `field` holding the current `values`.
    ///
    /// Password fields are never prefilled and are optional when editing.
    #[must_use]
    pub fn new(field: &Field, values: &FormValues, mode: FormMode) -> Self {
        let value = values.get(field.name).to_owned();
        let (input_type, options) = match field.kind {
            FieldKind::Text => ("text", Vec::new()),
            FieldKind::Email => ("email", Vec::new()),
            FieldKind::TextArea => ("textarea", Vec::new()),
            FieldKind::Integer => ("number", Vec::new()),
            FieldKind::Decimal => ("decimal", Vec::new()),
            FieldKind::Checkbox => ("checkbox", Vec::new()),
            FieldKind::Password => ("password", Vec::new()),
            FieldKind::DateTime => ("datetime-local", Vec::new()),
            FieldKind::Select(choices) => (
                "select",
                choices
                    .iter()
                    .map(|&choice| SelectOption {
                        value: choice,
                        selected: choice == value,
                    })
                    .collect(),
            ),
        };
        let is_password = field.kind == FieldKind::Password;

        Self {
            name: field.name,
            label: field.label,
            input_type,
            checked: values.checkbox(field.name),
            value: if is_password { String::new() } else { value },
            required: field.required
                && field.kind != FieldKind::Checkbox
                && !(is_password && mode == FormMode::Edit),
            options,
        }
    }
}

/// Views for every field of a form.
#[must_use]
pub fn field_views(fields: &[Field], values: &FormValues, mode: FormMode) -> Vec<FieldView> {
    fields
        .iter()
        .map(|field| FieldView::new(field, values, mode))
        .collect()
}

/// Human-readable message for a field error, using the field's label.
#[must_use]
pub fn describe(fields: &[Field], err: &FieldError) -> String {
    let label = fields
        .iter()
        .find(|f| f.name == err.field)
        .map_or(err.field, |f| f.label);
    format!("{label}: {}", err.message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        let mut values = FormValues::default();
        for (name, value) in pairs {
            values.set(name, value);
        }
        values
    }

    #[test]
    fn test_text_trims_and_requires() {
        let form = values(&[("name", "  Lápices  "), ("blank", "   ")]);
        assert_eq!(form.text("name").unwrap(), "Lápices");
        assert_eq!(form.optional_text("blank"), None);
        assert_eq!(form.text("missing").unwrap_err().message, "es obligatorio");
    }

    #[test]
    fn test_numbers() {
        let form = values(&[
            ("stock", "12"),
            ("neg", "-1"),
            ("bad", "doce"),
            ("price", "19.90"),
            ("zero", "0"),
        ]);
        assert_eq!(form.non_negative("stock").unwrap(), 12);
        assert!(form.non_negative("neg").is_err());
        assert_eq!(
            form.integer("bad").unwrap_err().message,
            "debe ser un número entero"
        );
        assert_eq!(form.decimal("price").unwrap(), Decimal::new(1990, 2));
        assert!(form.decimal("neg").is_err());
        assert!(form.positive("zero").is_err());
        assert_eq!(form.optional_integer("missing").unwrap(), None);
    }

    #[test]
    fn test_text_max_counts_characters() {
        let form = values(&[
            ("name", "ñ".repeat(50).as_str()),
            ("long", "x".repeat(51).as_str()),
            ("blank", ""),
        ]);
        assert_eq!(form.text_max("name", 50).unwrap().chars().count(), 50);
        assert_eq!(
            form.text_max("long", 50).unwrap_err().message,
            "no puede tener más de 50 caracteres"
        );
        assert_eq!(form.text_max("blank", 50).unwrap_err().message, "es obligatorio");
        assert_eq!(form.optional_text_max("blank", 20).unwrap(), None);
        assert!(form.optional_text_max("long", 20).is_err());
    }

    #[test]
    fn test_decimal_fits_numeric_column() {
        let form = values(&[
            ("max", "99999999.99"),
            ("over", "100000000"),
            ("rounds_over", "99999999.999"),
        ]);
        assert_eq!(MAX_AMOUNT.to_string(), "99999999.99");
        assert_eq!(form.decimal("max").unwrap(), MAX_AMOUNT);
        assert!(form.decimal("over").is_err());
        assert!(form.decimal("rounds_over").is_err());
    }

    #[test]
    fn test_checkbox() {
        let form = values(&[("on", "on"), ("off", "")]);
        assert!(form.checkbox("on"));
        assert!(!form.checkbox("off"));
        assert!(!form.checkbox("absent"));
    }

    #[test]
    fn test_datetime_formats() {
        let form = values(&[
            ("local", "2024-03-01T10:30"),
            ("rfc", "2024-03-01T10:30:00Z"),
            ("bad", "mañana"),
        ]);
        let local = form.datetime("local").unwrap();
        assert_eq!(local, form.datetime("rfc").unwrap());
        assert_eq!(form.datetime("bad").unwrap_err().message, "fecha no válida");
        assert_eq!(form.optional_datetime("absent").unwrap(), None);
    }

    #[test]
    fn test_choice() {
        let form = values(&[("role", "admin"), ("bad", "root")]);
        let role: papeleria_core::UserRole = form.choice("role").unwrap();
        assert!(role.is_admin());
        assert!(form.choice::<papeleria_core::UserRole>("bad").is_err());
    }

    #[test]
    fn test_password_view_is_never_prefilled() {
        let field = Field::new("password", "Contraseña", FieldKind::Password);
        let form = values(&[("password", "secreto123")]);

        let create = FieldView::new(&field, &form, FormMode::Create);
        assert!(create.value.is_empty());
        assert!(create.required);

        let edit = FieldView::new(&field, &form, FormMode::Edit);
        assert!(!edit.required);
    }

    #[test]
    fn test_select_marks_current_value() {
        let field = Field::new("status", "Estado", FieldKind::Select(&["pendiente", "pagado"]));
        let view = FieldView::new(&field, &values(&[("status", "pagado")]), FormMode::Edit);
        assert_eq!(view.input_type, "select");
        let selected: Vec<_> = view.options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().unwrap().value, "pagado");
    }

    #[test]
    fn test_describe_uses_label() {
        let fields = [Field::new("sale_price", "Precio de venta", FieldKind::Decimal)];
        let err = FieldError::new("sale_price", "es obligatorio");
        assert_eq!(describe(&fields, &err), "Precio de venta: es obligatorio");
    }
}
