//! Parameter constraints.
//!
//! A [`Constraint`] is a compiled string predicate bound to a named route
//! parameter. The matcher only ever calls [`Constraint::matches`]; the kind
//! is kept for route metadata.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{RouterError, RouterResult};

/// Kind of validation a constraint performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Signed 64-bit integer.
    Int,
    /// Finite floating point number.
    Float,
    /// UUID in any textual form accepted by the `uuid` crate.
    Uuid,
    /// Arbitrary regular expression.
    Regex,
    /// One of a fixed set of strings.
    Enum,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// RFC 3339 timestamp.
    DateTime,
    /// Caller-supplied predicate.
    Custom,
}

#[derive(Clone)]
enum Validator {
    Int,
    Float,
    Uuid,
    Regex(Arc<Regex>),
    OneOf(Arc<[String]>),
    Date,
    DateTime,
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

/// A compiled parameter validator.
///
/// # Example
///
/// ```rust
/// use velox_router::Constraint;
///
/// let id = Constraint::regex(r"^\d+$").unwrap();
/// assert!(id.matches("123"));
/// assert!(!id.matches("abc"));
/// ```
#[derive(Clone)]
pub struct Constraint {
    validator: Validator,
}

impl Constraint {
    /// Accepts signed 64-bit integers.
    pub fn int() -> Self {
        Self {
            validator: Validator::Int,
        }
    }

    /// Accepts finite floating point numbers.
    pub fn float() -> Self {
        Self {
            validator: Validator::Float,
        }
    }

    /// Accepts UUIDs.
    pub fn uuid() -> Self {
        Self {
            validator: Validator::Uuid,
        }
    }

    /// Compiles a regular expression constraint.
    ///
    /// The expression is used as-is; anchor it with `^...$` to validate the
    /// whole segment.
    pub fn regex(pattern: &str) -> RouterResult<Self> {
        let regex = Regex::new(pattern).map_err(|source| RouterError::InvalidConstraint {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            validator: Validator::Regex(Arc::new(regex)),
        })
    }

    /// Accepts exactly one of `values`.
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            validator: Validator::OneOf(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Accepts `YYYY-MM-DD` calendar dates.
    pub fn date() -> Self {
        Self {
            validator: Validator::Date,
        }
    }

    /// Accepts RFC 3339 timestamps.
    pub fn date_time() -> Self {
        Self {
            validator: Validator::DateTime,
        }
    }

    /// Wraps an arbitrary predicate.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            validator: Validator::Custom(Arc::new(predicate)),
        }
    }

    /// Returns the kind of this constraint.
    pub fn kind(&self) -> ConstraintKind {
        match self.validator {
            Validator::Int => ConstraintKind::Int,
            Validator::Float => ConstraintKind::Float,
            Validator::Uuid => ConstraintKind::Uuid,
            Validator::Regex(_) => ConstraintKind::Regex,
            Validator::OneOf(_) => ConstraintKind::Enum,
            Validator::Date => ConstraintKind::Date,
            Validator::DateTime => ConstraintKind::DateTime,
            Validator::Custom(_) => ConstraintKind::Custom,
        }
    }

    /// Returns the regular expression source for regex constraints.
    pub fn pattern(&self) -> Option<&str> {
        match &self.validator {
            Validator::Regex(regex) => Some(regex.as_str()),
            _ => None,
        }
    }

    /// Returns the accepted values for enum constraints.
    pub fn values(&self) -> Option<&[String]> {
        match &self.validator {
            Validator::OneOf(values) => Some(values.as_ref()),
            _ => None,
        }
    }

    /// Validates a raw parameter value.
    #[inline]
    pub fn matches(&self, value: &str) -> bool {
        match &self.validator {
            Validator::Int => value.parse::<i64>().is_ok(),
            Validator::Float => value.parse::<f64>().is_ok_and(f64::is_finite),
            Validator::Uuid => Uuid::try_parse(value).is_ok(),
            Validator::Regex(regex) => regex.is_match(value),
            Validator::OneOf(values) => values.iter().any(|v| v == value),
            Validator::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            Validator::DateTime => DateTime::parse_from_rfc3339(value).is_ok(),
            Validator::Custom(predicate) => predicate(value),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Constraint");
        s.field("kind", &self.kind());
        if let Some(pattern) = self.pattern() {
            s.field("pattern", &pattern);
        }
        if let Some(values) = self.values() {
            s.field("values", &values);
        }
        s.finish()
    }
}

/// A constraint bound to a parameter name, as passed at registration.
#[derive(Debug, Clone)]
pub struct ParamConstraint {
    /// Parameter name without the leading `:`.
    pub name: String,
    /// The validator.
    pub constraint: Constraint,
}

impl ParamConstraint {
    /// Binds `constraint` to the parameter `name`.
    pub fn new(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            constraint,
        }
    }
}

impl<S: Into<String>> From<(S, Constraint)> for ParamConstraint {
    fn from((name, constraint): (S, Constraint)) -> Self {
        Self::new(name, constraint)
    }
}
