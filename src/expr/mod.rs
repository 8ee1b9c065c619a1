use crate::errors::Error;
use crate::tuple::schema::Schema;
use crate::tuple::types::Value;
use crate::tuple::Record;
use anyhow::{ensure, Result};

/// The boolean/comparison operators a scan predicate can use. Mirrors the
/// operator family a schema-driven predicate tree is usually built over
/// (equality, ordering, conjunction/disjunction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    And,
    Or,
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

/// A predicate expression tree: a constant, a reference to one of the
/// record's attributes by index, or an operator applied to sub-expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(Value),
    AttrRef(usize),
    Op(OpKind, Vec<Expr>),
}

impl Expr {
    pub fn eval(&self, record: &Record, schema: &Schema) -> Result<Value> {
        match self {
            Expr::Const(v) => Ok(v.clone()),
            Expr::AttrRef(idx) => Ok(record.get(*idx)?.clone()),
            Expr::Op(kind, args) => {
                let values: Vec<Value> = args
                    .iter()
                    .map(|a| a.eval(record, schema))
                    .collect::<Result<_>>()?;
                eval_op(*kind, &values)
            }
        }
    }
}

fn eval_op(kind: OpKind, args: &[Value]) -> Result<Value> {
    match kind {
        OpKind::And => {
            ensure!(args.len() == 2, Error::SchemaMismatch("AND takes 2 args".into()));
            Ok(Value::Bool(as_bool(&args[0])? && as_bool(&args[1])?))
        }
        OpKind::Or => {
            ensure!(args.len() == 2, Error::SchemaMismatch("OR takes 2 args".into()));
            Ok(Value::Bool(as_bool(&args[0])? || as_bool(&args[1])?))
        }
        OpKind::Eq => Ok(Value::Bool(compare(&args[0], &args[1])? == std::cmp::Ordering::Equal)),
        OpKind::NotEq => Ok(Value::Bool(compare(&args[0], &args[1])? != std::cmp::Ordering::Equal)),
        OpKind::Gt => Ok(Value::Bool(compare(&args[0], &args[1])? == std::cmp::Ordering::Greater)),
        OpKind::Lt => Ok(Value::Bool(compare(&args[0], &args[1])? == std::cmp::Ordering::Less)),
        OpKind::GtEq => Ok(Value::Bool(compare(&args[0], &args[1])? != std::cmp::Ordering::Less)),
        OpKind::LtEq => Ok(Value::Bool(compare(&args[0], &args[1])? != std::cmp::Ordering::Greater)),
    }
}

fn as_bool(v: &Value) -> Result<bool> {
    match v {
        Value::Bool(b) => Ok(*b),
        _ => Err(Error::SchemaMismatch("expected a boolean value".into()).into()),
    }
}

fn compare(a: &Value, b: &Value) -> Result<std::cmp::Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => {
            x.partial_cmp(y).ok_or_else(|| Error::SchemaMismatch("NaN comparison".into()).into())
        }
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        _ => Err(Error::SchemaMismatch("comparison between mismatched types".into()).into()),
    }
}
