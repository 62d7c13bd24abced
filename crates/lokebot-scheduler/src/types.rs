use serde::{Deserialize, Serialize};

/// Recurrence pattern for a single calendar field.
///
/// Expansion is lazy: [`RecurrenceDef::expand`] produces the concrete ordered
/// value list when the normalizer needs it. List order is preserved all the
/// way through normalization; matching against the expanded list uses set
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecurrenceDef {
    /// A single value, e.g. hour `9`.
    Single(i32),
    /// An explicit list of values, e.g. hours `[9, 13, 17]`.
    List(Vec<i32>),
    /// An inclusive stepped range: `start, start+step, … ≤ end`.
    Range { start: i32, end: i32, step: u32 },
}

impl RecurrenceDef {
    /// Expand to the concrete value list.
    ///
    /// A range with `start > end` expands to an empty list; the normalizer
    /// logs and skips such fields rather than building a rule that can never
    /// match.
    pub fn expand(&self) -> Vec<i32> {
        match self {
            RecurrenceDef::Single(v) => vec![*v],
            RecurrenceDef::List(vs) => vs.clone(),
            RecurrenceDef::Range { start, end, step } => {
                let step = (*step).max(1) as i32;
                let mut out = Vec::new();
                let mut v = *start;
                while v <= *end {
                    out.push(v);
                    v += step;
                }
                out
            }
        }
    }
}

/// A wall-clock recurrence specification.
///
/// An absent field is unconstrained — the rule fires on every value of that
/// field. `month` and `date` are one-based; `day_of_week` runs `0–6` with
/// `0 = Sunday`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<RecurrenceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<RecurrenceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<RecurrenceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<RecurrenceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<RecurrenceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<RecurrenceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<RecurrenceDef>,
}

impl FieldSpec {
    /// True if no field is constrained.
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.month.is_none()
            && self.date.is_none()
            && self.hour.is_none()
            && self.minute.is_none()
            && self.second.is_none()
            && self.day_of_week.is_none()
    }
}

/// A recurrence specification whose values are already expressed in the
/// executor's clock frame (UTC).
///
/// Derived from a [`FieldSpec`] by [`crate::normalize::normalize`]; never
/// mutated in place. Each normalization pass builds a fresh one, so repeated
/// registrations from the same input are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedFieldSpec {
    pub year: Option<Vec<i32>>,
    pub month: Option<Vec<i32>>,
    pub date: Option<Vec<i32>>,
    pub hour: Option<Vec<i32>>,
    pub minute: Option<Vec<i32>>,
    pub second: Option<Vec<i32>>,
    pub day_of_week: Option<Vec<i32>>,
}

/// Schedule input accepted by the facade: either a structured field spec or
/// a 6-field cron expression (`second minute hour day-of-month month
/// day-of-week`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleInput {
    Fields(FieldSpec),
    Cron(String),
}

impl From<FieldSpec> for ScheduleInput {
    fn from(spec: FieldSpec) -> Self {
        ScheduleInput::Fields(spec)
    }
}

impl From<&str> for ScheduleInput {
    fn from(expr: &str) -> Self {
        ScheduleInput::Cron(expr.to_string())
    }
}

impl From<String> for ScheduleInput {
    fn from(expr: String) -> Self {
        ScheduleInput::Cron(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_expands_to_one_value() {
        assert_eq!(RecurrenceDef::Single(9).expand(), vec![9]);
    }

    #[test]
    fn list_expands_in_insertion_order() {
        let def = RecurrenceDef::List(vec![17, 9, 13]);
        assert_eq!(def.expand(), vec![17, 9, 13]);
    }

    #[test]
    fn range_is_inclusive_of_both_endpoints() {
        let def = RecurrenceDef::Range { start: 2, end: 6, step: 2 };
        assert_eq!(def.expand(), vec![2, 4, 6]);
    }

    #[test]
    fn range_endpoint_not_on_step_is_excluded() {
        let def = RecurrenceDef::Range { start: 0, end: 7, step: 3 };
        assert_eq!(def.expand(), vec![0, 3, 6]);
    }

    #[test]
    fn inverted_range_expands_empty() {
        let def = RecurrenceDef::Range { start: 10, end: 3, step: 1 };
        assert!(def.expand().is_empty());
    }

    #[test]
    fn empty_spec_reports_empty() {
        assert!(FieldSpec::default().is_empty());
        let spec = FieldSpec { hour: Some(RecurrenceDef::Single(9)), ..Default::default() };
        assert!(!spec.is_empty());
    }
}
