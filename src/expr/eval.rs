//! Tree-walking interpreter for compiled expression scripts.
//!
//! Evaluation is pure: the only ambient state visible to a script is the
//! `resources` mapping of datasource name to latest payload. Scripts that
//! finish without hitting a `return` produce no value at all (the caller
//! must not forward anything in that case).

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use super::error::ExprError;
use super::parser::{BinaryOp, Expr, Program, Stmt, UnaryOp};

/// Intermediate value. `Undefined` is distinct from JSON `null`: reading a
/// missing key yields `Undefined`, and member access *on* `Undefined` is a
/// runtime type error, mirroring the host-language semantics the original
/// scripts were written against.
enum Val<'a> {
    Undefined,
    Resources(&'a Map<String, Value>),
    Ref(&'a Value),
    Owned(Value),
}

impl<'a> Val<'a> {
    fn json(&self) -> Option<&Value> {
        match self {
            Val::Undefined | Val::Resources(_) => None,
            Val::Ref(v) => Some(v),
            Val::Owned(v) => Some(v),
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Val::Undefined => false,
            Val::Resources(_) => true,
            Val::Ref(v) => json_truthy(v),
            Val::Owned(v) => json_truthy(v),
        }
    }

    fn into_option(self) -> Option<Value> {
        match self {
            Val::Undefined => None,
            Val::Resources(map) => Some(Value::Object(map.clone())),
            Val::Ref(v) => Some(v.clone()),
            Val::Owned(v) => Some(v),
        }
    }

    fn type_name(&self) -> &'static str {
        match self.json() {
            Some(Value::Null) => "null",
            Some(Value::Bool(_)) => "boolean",
            Some(Value::Number(_)) => "number",
            Some(Value::String(_)) => "string",
            Some(Value::Array(_)) => "array",
            Some(Value::Object(_)) => "object",
            None => match self {
                Val::Resources(_) => "object",
                _ => "undefined",
            },
        }
    }
}

fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Run a program against the resources mapping.
///
/// Returns `Ok(None)` when the script finishes without returning a value.
pub(crate) fn run(
    program: &Program,
    resources: &Map<String, Value>,
) -> Result<Option<Value>, ExprError> {
    let mut locals: HashMap<String, Option<Value>> = HashMap::new();

    for stmt in &program.statements {
        match stmt {
            Stmt::Return(None) => return Ok(None),
            Stmt::Return(Some(expr)) => {
                let value = eval(expr, resources, &locals)?.into_option();
                return Ok(value);
            }
            Stmt::Assign { name, expr } => {
                let value = eval(expr, resources, &locals)?.into_option();
                locals.insert(name.clone(), value);
            }
            Stmt::Expr(expr) => {
                eval(expr, resources, &locals)?;
            }
        }
    }

    Ok(None)
}

fn eval<'a>(
    expr: &'a Expr,
    resources: &'a Map<String, Value>,
    locals: &'a HashMap<String, Option<Value>>,
) -> Result<Val<'a>, ExprError> {
    match expr {
        Expr::Null => Ok(Val::Owned(Value::Null)),
        Expr::Bool(b) => Ok(Val::Owned(Value::Bool(*b))),
        Expr::Number(n) => Ok(Val::Owned(number(*n))),
        Expr::Str(s) => Ok(Val::Owned(Value::String(s.clone()))),
        Expr::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                // An undefined element becomes null inside an array literal
                values.push(
                    eval(item, resources, locals)?
                        .into_option()
                        .unwrap_or(Value::Null),
                );
            }
            Ok(Val::Owned(Value::Array(values)))
        }
        Expr::Ident(name) => match locals.get(name) {
            Some(Some(value)) => Ok(Val::Ref(value)),
            Some(None) => Ok(Val::Undefined),
            None if name == "resources" => Ok(Val::Resources(resources)),
            None => Err(ExprError::Unresolved(name.clone())),
        },
        Expr::Member { object, field } => {
            let base = eval(object, resources, locals)?;
            member(base, field)
        }
        Expr::Index { object, index } => {
            let base = eval(object, resources, locals)?;
            let index = eval(index, resources, locals)?;
            indexed(base, index)
        }
        Expr::Unary { op, expr } => {
            let value = eval(expr, resources, locals)?;
            match op {
                UnaryOp::Not => Ok(Val::Owned(Value::Bool(!value.truthy()))),
                UnaryOp::Neg => {
                    let n = to_number(&value)?;
                    Ok(Val::Owned(number(-n)))
                }
            }
        }
        Expr::Binary { op, lhs, rhs } => match op {
            BinaryOp::And => {
                let left = eval(lhs, resources, locals)?;
                if left.truthy() {
                    eval(rhs, resources, locals)
                } else {
                    Ok(left)
                }
            }
            BinaryOp::Or => {
                let left = eval(lhs, resources, locals)?;
                if left.truthy() {
                    Ok(left)
                } else {
                    eval(rhs, resources, locals)
                }
            }
            _ => {
                let left = eval(lhs, resources, locals)?;
                let right = eval(rhs, resources, locals)?;
                binary(*op, &left, &right)
            }
        },
        Expr::Ternary {
            cond,
            then,
            otherwise,
        } => {
            if eval(cond, resources, locals)?.truthy() {
                eval(then, resources, locals)
            } else {
                eval(otherwise, resources, locals)
            }
        }
    }
}

fn member<'a>(base: Val<'a>, field: &str) -> Result<Val<'a>, ExprError> {
    match base {
        Val::Undefined => Err(ExprError::Type(format!(
            "cannot read property '{}' of undefined",
            field
        ))),
        Val::Resources(map) => Ok(map.get(field).map(Val::Ref).unwrap_or(Val::Undefined)),
        Val::Ref(Value::Null) | Val::Owned(Value::Null) => Err(ExprError::Type(format!(
            "cannot read property '{}' of null",
            field
        ))),
        Val::Ref(Value::Object(map)) => {
            Ok(map.get(field).map(Val::Ref).unwrap_or(Val::Undefined))
        }
        Val::Owned(Value::Object(mut map)) => Ok(map
            .remove(field)
            .map(Val::Owned)
            .unwrap_or(Val::Undefined)),
        Val::Ref(Value::Array(items)) if field == "length" => {
            Ok(Val::Owned(number(items.len() as f64)))
        }
        Val::Owned(Value::Array(items)) if field == "length" => {
            Ok(Val::Owned(number(items.len() as f64)))
        }
        // Property access on scalars resolves to undefined
        _ => Ok(Val::Undefined),
    }
}

fn indexed<'a>(base: Val<'a>, index: Val<'a>) -> Result<Val<'a>, ExprError> {
    if matches!(base, Val::Undefined) {
        return Err(ExprError::Type("cannot index undefined".to_string()));
    }

    // String index behaves like property access
    if let Some(Value::String(key)) = index.json() {
        let key = key.clone();
        return member(base, &key);
    }
    if let Val::Resources(_) = index {
        return Err(ExprError::Type("invalid index value".to_string()));
    }

    let idx = match index.json() {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        _ => return Err(ExprError::Type("invalid index value".to_string())),
    };
    if idx.fract() != 0.0 || idx < 0.0 {
        return Ok(Val::Undefined);
    }
    let idx = idx as usize;

    match base {
        Val::Ref(Value::Array(items)) => {
            Ok(items.get(idx).map(Val::Ref).unwrap_or(Val::Undefined))
        }
        Val::Owned(Value::Array(mut items)) => {
            if idx < items.len() {
                Ok(Val::Owned(items.swap_remove(idx)))
            } else {
                Ok(Val::Undefined)
            }
        }
        other => Err(ExprError::Type(format!(
            "cannot index a {}",
            other.type_name()
        ))),
    }
}

fn binary<'a>(op: BinaryOp, lhs: &Val<'a>, rhs: &Val<'a>) -> Result<Val<'a>, ExprError> {
    match op {
        BinaryOp::Add => {
            // String on either side switches to concatenation
            let lhs_str = matches!(lhs.json(), Some(Value::String(_)));
            let rhs_str = matches!(rhs.json(), Some(Value::String(_)));
            if lhs_str || rhs_str {
                let mut text = display_string(lhs);
                text.push_str(&display_string(rhs));
                return Ok(Val::Owned(Value::String(text)));
            }
            Ok(Val::Owned(number(to_number(lhs)? + to_number(rhs)?)))
        }
        BinaryOp::Sub => Ok(Val::Owned(number(to_number(lhs)? - to_number(rhs)?))),
        BinaryOp::Mul => Ok(Val::Owned(number(to_number(lhs)? * to_number(rhs)?))),
        BinaryOp::Div => Ok(Val::Owned(number(to_number(lhs)? / to_number(rhs)?))),
        BinaryOp::Rem => Ok(Val::Owned(number(to_number(lhs)? % to_number(rhs)?))),
        BinaryOp::Eq => Ok(Val::Owned(Value::Bool(values_equal(lhs, rhs)))),
        BinaryOp::Ne => Ok(Val::Owned(Value::Bool(!values_equal(lhs, rhs)))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = compare(lhs, rhs)?;
            let result = match op {
                BinaryOp::Lt => ordering == std::cmp::Ordering::Less,
                BinaryOp::Le => ordering != std::cmp::Ordering::Greater,
                BinaryOp::Gt => ordering == std::cmp::Ordering::Greater,
                BinaryOp::Ge => ordering != std::cmp::Ordering::Less,
                _ => unreachable!(),
            };
            Ok(Val::Owned(Value::Bool(result)))
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("short-circuit ops handled by caller"),
    }
}

fn values_equal(lhs: &Val<'_>, rhs: &Val<'_>) -> bool {
    match (lhs.json(), rhs.json()) {
        (None, None) => matches!(lhs, Val::Undefined) == matches!(rhs, Val::Undefined),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            a.as_f64().unwrap_or(f64::NAN) == b.as_f64().unwrap_or(f64::NAN)
        }
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn compare(lhs: &Val<'_>, rhs: &Val<'_>) -> Result<std::cmp::Ordering, ExprError> {
    match (lhs.json(), rhs.json()) {
        (Some(Value::String(a)), Some(Value::String(b))) => Ok(a.cmp(b)),
        _ => {
            let a = to_number(lhs)?;
            let b = to_number(rhs)?;
            a.partial_cmp(&b)
                .ok_or_else(|| ExprError::Type("cannot compare NaN".to_string()))
        }
    }
}

fn to_number(value: &Val<'_>) -> Result<f64, ExprError> {
    let json = match value {
        Val::Undefined => {
            return Err(ExprError::Type("undefined used as a number".to_string()))
        }
        Val::Resources(_) => return Err(ExprError::Type("object used as a number".to_string())),
        Val::Ref(v) => *v,
        Val::Owned(v) => v,
    };
    match json {
        Value::Null => Ok(0.0),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => Ok(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ExprError::Type(format!("'{}' used as a number", s))),
        other => Err(ExprError::Type(format!(
            "{} used as a number",
            match other {
                Value::Array(_) => "array",
                _ => "object",
            }
        ))),
    }
}

fn display_string(value: &Val<'_>) -> String {
    let json = match value {
        Val::Undefined => return "undefined".to_string(),
        Val::Resources(map) => return Value::Object((*map).clone()).to_string(),
        Val::Ref(v) => *v,
        Val::Owned(v) => v,
    };
    match json {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build a JSON number, preferring integer representation when exact.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9e15 {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
