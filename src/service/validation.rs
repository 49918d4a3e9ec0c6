//! Request validation from the per-field rule table.

use crate::error::AppError;
use crate::model::BeerDto;
use rust_decimal::Decimal;

/// A declared constraint on one field of the wire representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constraint {
    Null,
    NotNull,
    NotBlank,
    Positive,
    PositiveOrZero,
    Size { min: usize, max: usize },
    Digits { integer: usize, fraction: usize },
}

impl Constraint {
    /// Human-readable description, used for documentation snippets and error messages.
    pub fn description(&self) -> String {
        match self {
            Constraint::Null => "Must be null".into(),
            Constraint::NotNull => "Must not be null".into(),
            Constraint::NotBlank => "Must not be blank".into(),
            Constraint::Positive => "Must be positive".into(),
            Constraint::PositiveOrZero => "Must be zero or positive".into(),
            Constraint::Size { min, max } => {
                format!("Size must be between {} and {} inclusive", min, max)
            }
            Constraint::Digits { integer, fraction } => format!(
                "Numeric value must have at most {} integer and {} fraction digits",
                integer, fraction
            ),
        }
    }
}

/// Rule table for `BeerDto`, in wire field order.
pub fn beer_rules() -> Vec<(&'static str, Vec<Constraint>)> {
    vec![
        ("id", vec![Constraint::Null]),
        ("version", vec![Constraint::Null]),
        ("createdDate", vec![Constraint::Null]),
        ("lastModifiedDate", vec![Constraint::Null]),
        (
            "beerName",
            vec![Constraint::NotBlank, Constraint::Size { min: 3, max: 100 }],
        ),
        ("beerStyle", vec![Constraint::NotNull]),
        ("upc", vec![Constraint::NotNull, Constraint::Positive]),
        // NUMERIC(19, 2) in the beer table.
        (
            "price",
            vec![
                Constraint::NotNull,
                Constraint::PositiveOrZero,
                Constraint::Digits { integer: 17, fraction: 2 },
            ],
        ),
        ("quantityOnHand", vec![Constraint::PositiveOrZero]),
    ]
}

/// Field value as seen by the rule checks.
enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    Number(Decimal),
    Present,
}

fn field_value<'a>(dto: &'a BeerDto, field: &str) -> FieldValue<'a> {
    fn opt<'a, T>(v: &'a Option<T>, f: impl FnOnce(&'a T) -> FieldValue<'a>) -> FieldValue<'a> {
        v.as_ref().map(f).unwrap_or(FieldValue::Absent)
    }
    match field {
        "id" => opt(&dto.id, |_| FieldValue::Present),
        "version" => opt(&dto.version, |v| FieldValue::Number(Decimal::from(*v))),
        "createdDate" => opt(&dto.created_date, |_| FieldValue::Present),
        "lastModifiedDate" => opt(&dto.last_modified_date, |_| FieldValue::Present),
        "beerName" => opt(&dto.beer_name, |s| FieldValue::Text(s.as_str())),
        "beerStyle" => opt(&dto.beer_style, |_| FieldValue::Present),
        "upc" => opt(&dto.upc, |v| FieldValue::Number(Decimal::from(*v))),
        "price" => opt(&dto.price, |v| FieldValue::Number(*v)),
        "quantityOnHand" => opt(&dto.quantity_on_hand, |v| FieldValue::Number(Decimal::from(*v))),
        _ => FieldValue::Absent,
    }
}

fn check(value: &FieldValue<'_>, constraint: &Constraint) -> bool {
    match (constraint, value) {
        (Constraint::Null, FieldValue::Absent) => true,
        (Constraint::Null, _) => false,
        (Constraint::NotNull, FieldValue::Absent) => false,
        (Constraint::NotNull, _) => true,
        (Constraint::NotBlank, FieldValue::Text(s)) => !s.trim().is_empty(),
        (Constraint::NotBlank, _) => false,
        // Range and size checks only apply to present values.
        (_, FieldValue::Absent) => true,
        (Constraint::Positive, FieldValue::Number(n)) => n.is_sign_positive() && !n.is_zero(),
        (Constraint::PositiveOrZero, FieldValue::Number(n)) => n.is_zero() || n.is_sign_positive(),
        (Constraint::Size { min, max }, FieldValue::Text(s)) => {
            let len = s.chars().count();
            len >= *min && len <= *max
        }
        (Constraint::Digits { integer, fraction }, FieldValue::Number(n)) => {
            let n = n.normalize();
            let whole = n.abs().trunc();
            let integer_digits = if whole.is_zero() { 0 } else { whole.to_string().len() };
            integer_digits <= *integer && n.scale() as usize <= *fraction
        }
        _ => true,
    }
}

pub struct BeerValidator;

impl BeerValidator {
    /// Validate a request payload against every rule. Collects all violations.
    pub fn validate(dto: &BeerDto) -> Result<(), AppError> {
        let mut violations = Vec::new();
        for (field, constraints) in beer_rules() {
            let value = field_value(dto, field);
            for constraint in &constraints {
                if !check(&value, constraint) {
                    violations.push(format!("{}: {}", field, constraint.description()));
                }
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(violations))
        }
    }
}
