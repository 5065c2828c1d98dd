//! Typed extraction of named parameter values, shared by both models'
//! `Parameterized` impls.

use abm_core::{AbmError, AbmResult};
use abm_engine::Value;

pub(crate) fn usize_param(name: &str, value: &Value) -> AbmResult<usize> {
    let v = int_param(name, value)?;
    usize::try_from(v)
        .map_err(|_| AbmError::Config(format!("parameter {name} must be non-negative, got {v}")))
}

pub(crate) fn u32_param(name: &str, value: &Value) -> AbmResult<u32> {
    let v = int_param(name, value)?;
    u32::try_from(v)
        .map_err(|_| AbmError::Config(format!("parameter {name} must fit in u32, got {v}")))
}

pub(crate) fn f64_param(name: &str, value: &Value) -> AbmResult<f64> {
    value
        .as_float()
        .ok_or_else(|| AbmError::Config(format!("parameter {name} expects a number, got {value}")))
}

fn int_param(name: &str, value: &Value) -> AbmResult<i64> {
    value
        .as_int()
        .ok_or_else(|| AbmError::Config(format!("parameter {name} expects an integer, got {value}")))
}
