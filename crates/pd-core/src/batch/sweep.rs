//! Parameter Sweep
//!
//! An ordered set of parameter axes whose Cartesian product defines the
//! configurations of a batch run.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use pd_records::{ModelParams, ScheduleType};

/// Errors raised while building or applying a sweep
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SweepError {
    #[error("unknown sweep parameter '{0}'")]
    UnknownParameter(String),
    #[error("parameter '{name}' does not accept value {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("parameter '{0}' is swept more than once")]
    DuplicateParameter(&'static str),
    #[error("parameter '{0}' has no values")]
    EmptyAxis(&'static str),
    #[error("range step must be finite and non-zero, got {0}")]
    InvalidStep(f64),
    #[error("range must have finite bounds, got start={start} stop={stop}")]
    InvalidBounds { start: f64, stop: f64 },
    #[error("range expands to {count} values, more than {max}")]
    TooManyValues { count: f64, max: usize },
    #[error("unsupported value type for '{0}'")]
    UnsupportedType(String),
}

/// Model parameters that can be swept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamName {
    Width,
    Height,
    ScheduleType,
    CooperationReward,
    DefectedReward,
    DefectionReward,
    MutualDefectionReward,
    SurvivalThreshold,
    HaltOnSteadyState,
}

impl ParamName {
    pub const ALL: [ParamName; 9] = [
        ParamName::Width,
        ParamName::Height,
        ParamName::ScheduleType,
        ParamName::CooperationReward,
        ParamName::DefectedReward,
        ParamName::DefectionReward,
        ParamName::MutualDefectionReward,
        ParamName::SurvivalThreshold,
        ParamName::HaltOnSteadyState,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::Width => "width",
            ParamName::Height => "height",
            ParamName::ScheduleType => "schedule_type",
            ParamName::CooperationReward => "cooperation_reward",
            ParamName::DefectedReward => "defected_reward",
            ParamName::DefectionReward => "defection_reward",
            ParamName::MutualDefectionReward => "mutual_defection_reward",
            ParamName::SurvivalThreshold => "survival_threshold",
            ParamName::HaltOnSteadyState => "halt_on_steady_state",
        }
    }

    fn invalid(self, value: &ParamValue) -> SweepError {
        SweepError::InvalidValue {
            name: self.as_str(),
            value: value.to_string(),
        }
    }

    /// Write a value into the matching field
    pub fn apply(self, params: &mut ModelParams, value: &ParamValue) -> Result<(), SweepError> {
        match self {
            ParamName::Width | ParamName::Height => {
                let size = match value {
                    ParamValue::Int(n) if *n > 0 && *n <= u32::MAX as i64 => *n as u32,
                    _ => return Err(self.invalid(value)),
                };
                if self == ParamName::Width {
                    params.width = size;
                } else {
                    params.height = size;
                }
            }
            ParamName::ScheduleType => {
                params.schedule_type = match value {
                    ParamValue::Text(name) => name
                        .parse::<ScheduleType>()
                        .map_err(|_| self.invalid(value))?,
                    _ => return Err(self.invalid(value)),
                };
            }
            ParamName::CooperationReward => {
                params.cooperation_reward = value.as_f64().ok_or_else(|| self.invalid(value))?
            }
            ParamName::DefectedReward => {
                params.defected_reward = value.as_f64().ok_or_else(|| self.invalid(value))?
            }
            ParamName::DefectionReward => {
                params.defection_reward = value.as_f64().ok_or_else(|| self.invalid(value))?
            }
            ParamName::MutualDefectionReward => {
                params.mutual_defection_reward =
                    value.as_f64().ok_or_else(|| self.invalid(value))?
            }
            ParamName::SurvivalThreshold => {
                params.survival_threshold =
                    Some(value.as_f64().ok_or_else(|| self.invalid(value))?)
            }
            ParamName::HaltOnSteadyState => {
                params.halt_on_steady_state = match value {
                    ParamValue::Bool(flag) => *flag,
                    _ => return Err(self.invalid(value)),
                };
            }
        }
        Ok(())
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamName {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| SweepError::UnknownParameter(s.to_string()))
    }
}

/// A single swept value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(n) => Some(*n as f64),
            ParamValue::Float(x) if x.is_finite() => Some(*x),
            _ => None,
        }
    }

    fn from_toml(name: &str, value: &toml::Value) -> Result<Self, SweepError> {
        match value {
            toml::Value::Integer(n) => Ok(ParamValue::Int(*n)),
            toml::Value::Float(x) => Ok(ParamValue::Float(*x)),
            toml::Value::String(s) => Ok(ParamValue::Text(s.clone())),
            toml::Value::Boolean(b) => Ok(ParamValue::Bool(*b)),
            _ => Err(SweepError::UnsupportedType(name.to_string())),
        }
    }
}

impl fmt::Display for ParamValue {
    /// Floats always carry a decimal point so spreadsheets keep the type
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Float(x) => write!(f, "{:?}", x),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Largest number of values one range may expand to
pub const MAX_RANGE_VALUES: usize = 1_000_000;

/// Half-open range `start, start + step, ...` stopping before `stop`
///
/// Each value is computed as `start + i * step`.
pub fn arange(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, SweepError> {
    if step == 0.0 || !step.is_finite() {
        return Err(SweepError::InvalidStep(step));
    }
    if !start.is_finite() || !stop.is_finite() {
        return Err(SweepError::InvalidBounds { start, stop });
    }
    let count = ((stop - start) / step).ceil();
    if count <= 0.0 {
        return Ok(Vec::new());
    }
    if count > MAX_RANGE_VALUES as f64 {
        return Err(SweepError::TooManyValues {
            count,
            max: MAX_RANGE_VALUES,
        });
    }
    Ok((0..count as usize).map(|i| start + i as f64 * step).collect())
}

/// One parameter and the values it takes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub name: ParamName,
    pub values: Vec<ParamValue>,
}

/// One point of the sweep: a value for every axis, in axis order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combination {
    pub values: Vec<(ParamName, ParamValue)>,
}

impl Combination {
    /// Layer the combination over a set of base parameters
    pub fn apply(&self, base: &ModelParams) -> Result<ModelParams, SweepError> {
        let mut params = base.clone();
        for (name, value) in &self.values {
            name.apply(&mut params, value)?;
        }
        Ok(params)
    }
}

/// Ordered list of axes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterSweep {
    axes: Vec<Axis>,
}

impl ParameterSweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis; every value is checked against the parameter's type
    pub fn axis(mut self, name: ParamName, values: Vec<ParamValue>) -> Result<Self, SweepError> {
        if self.axes.iter().any(|axis| axis.name == name) {
            return Err(SweepError::DuplicateParameter(name.as_str()));
        }
        if values.is_empty() {
            return Err(SweepError::EmptyAxis(name.as_str()));
        }
        let mut scratch = ModelParams::default();
        for value in &values {
            name.apply(&mut scratch, value)?;
        }
        self.axes.push(Axis { name, values });
        Ok(self)
    }

    /// Add a single-valued axis
    pub fn fixed(self, name: ParamName, value: ParamValue) -> Result<Self, SweepError> {
        self.axis(name, vec![value])
    }

    /// Build from a TOML table, keeping the table's key order
    ///
    /// Each entry is a scalar, an array of scalars, or an inline table
    /// `{ start, stop, step }`.
    pub fn from_table(table: &toml::Table) -> Result<Self, SweepError> {
        let mut sweep = Self::new();
        for (key, value) in table {
            let name: ParamName = key.parse()?;
            let values = match value {
                toml::Value::Array(items) => items
                    .iter()
                    .map(|item| ParamValue::from_toml(key, item))
                    .collect::<Result<Vec<_>, _>>()?,
                toml::Value::Table(range) => range_values(key, range)?,
                scalar => vec![ParamValue::from_toml(key, scalar)?],
            };
            sweep = sweep.axis(name, values)?;
        }
        Ok(sweep)
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Swept parameter names, in column order
    pub fn names(&self) -> Vec<&'static str> {
        self.axes.iter().map(|axis| axis.name.as_str()).collect()
    }

    /// Number of combinations
    pub fn len(&self) -> usize {
        self.axes.iter().map(|axis| axis.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product of the axes, last axis varying fastest
    pub fn combinations(&self) -> Vec<Combination> {
        let mut combinations = vec![Combination { values: Vec::new() }];
        for axis in &self.axes {
            let mut next = Vec::with_capacity(combinations.len() * axis.values.len());
            for combination in &combinations {
                for value in &axis.values {
                    let mut values = combination.values.clone();
                    values.push((axis.name, value.clone()));
                    next.push(Combination { values });
                }
            }
            combinations = next;
        }
        combinations
    }
}

fn range_values(key: &str, range: &toml::Table) -> Result<Vec<ParamValue>, SweepError> {
    let bound = |field: &str| -> Result<f64, SweepError> {
        match range.get(field) {
            Some(toml::Value::Float(x)) => Ok(*x),
            Some(toml::Value::Integer(n)) => Ok(*n as f64),
            _ => Err(SweepError::UnsupportedType(format!("{}.{}", key, field))),
        }
    };
    let values = arange(bound("start")?, bound("stop")?, bound("step")?)?;
    Ok(values.into_iter().map(ParamValue::Float).collect())
}
