//! Scalar expressions.
//!
//! A symbol is a typed scalar expression inside a relation: a column
//! reference, a reference to an output of an enclosing relation, a function
//! call, a constant, or a whole relation used as a single value. Symbols are
//! produced by the analyzer with their types already resolved, so rendering
//! never has to infer anything.

use std::fmt;

use crate::ident::{ColumnIdent, TableIdent};
use crate::relation::Relation;

/// Type of a symbol's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Undefined,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Ip,
    Timestamp,
    Object,
    Array(Box<DataType>),
}

impl DataType {
    /// Returns true for the integral and floating point types.
    pub fn is_numeric(&self) -> bool {
        match self {
            DataType::Byte
            | DataType::Short
            | DataType::Integer
            | DataType::Long
            | DataType::Float
            | DataType::Double => true,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataType::Undefined => write!(f, "undefined"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Byte => write!(f, "byte"),
            DataType::Short => write!(f, "short"),
            DataType::Integer => write!(f, "integer"),
            DataType::Long => write!(f, "long"),
            DataType::Float => write!(f, "float"),
            DataType::Double => write!(f, "double"),
            DataType::String => write!(f, "text"),
            DataType::Ip => write!(f, "ip"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::Object => write!(f, "object"),
            DataType::Array(inner) => write!(f, "array({})", inner),
        }
    }
}

/// A constant value.
///
/// Object entries keep their insertion order so that equal trees render
/// identically.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Text(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

/// Displays the raw value, without any SQL literal syntax.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            // Debug keeps the fractional part, so `1.0` does not turn into an
            // integer when parsed back.
            Value::Double(d) => write!(f, "{:?}", d),
            Value::Text(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A constant together with its type.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
    pub data_type: DataType,
}

impl Literal {
    pub fn new(value: Value, data_type: DataType) -> Literal {
        Literal { value, data_type }
    }

    pub fn long(value: i64) -> Literal {
        Literal::new(Value::Integer(value), DataType::Long)
    }

    pub fn double(value: f64) -> Literal {
        Literal::new(Value::Double(value), DataType::Double)
    }

    pub fn string<S: Into<String>>(value: S) -> Literal {
        Literal::new(Value::Text(value.into()), DataType::String)
    }

    pub fn boolean(value: bool) -> Literal {
        Literal::new(Value::Boolean(value), DataType::Boolean)
    }

    pub fn null() -> Literal {
        Literal::new(Value::Null, DataType::Undefined)
    }
}

/// A column of a stored table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub table: TableIdent,
    pub column: ColumnIdent,
    pub data_type: DataType,
}

impl Reference {
    pub fn new(table: TableIdent, column: ColumnIdent, data_type: DataType) -> Reference {
        Reference {
            table,
            column,
            data_type,
        }
    }
}

/// An output column of an enclosing relation, addressed by its output name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub output_name: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new<S: Into<String>>(output_name: S, data_type: DataType) -> Field {
        Field {
            output_name: output_name.into(),
            data_type,
        }
    }
}

/// Identity of a function: an optional schema (user-defined functions), a
/// name, and the argument types of the resolved signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionIdent {
    pub schema: Option<String>,
    pub name: String,
    pub arg_types: Vec<DataType>,
}

impl FunctionIdent {
    pub fn new<S: Into<String>>(name: S, arg_types: Vec<DataType>) -> FunctionIdent {
        FunctionIdent {
            schema: None,
            name: name.into(),
            arg_types,
        }
    }
}

/// A call of a scalar, aggregate, or table function.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub ident: FunctionIdent,
    pub args: Vec<Symbol>,
    pub return_type: DataType,
}

impl Function {
    /// Creates a call whose signature is taken from the argument types.
    pub fn new<S: Into<String>>(name: S, args: Vec<Symbol>, return_type: DataType) -> Function {
        let arg_types = args.iter().map(Symbol::value_type).collect();
        Function {
            ident: FunctionIdent::new(name, arg_types),
            args,
            return_type,
        }
    }
}

/// A relation whose single output column is used as a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSubquery {
    pub relation: Box<Relation>,
    pub data_type: DataType,
}

/// A scalar expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Reference(Reference),
    Field(Field),
    Function(Function),
    Literal(Literal),
    ScalarSubquery(ScalarSubquery),
}

impl Symbol {
    /// Returns the type of the value the symbol evaluates to.
    pub fn value_type(&self) -> DataType {
        match self {
            Symbol::Reference(r) => r.data_type.clone(),
            Symbol::Field(f) => f.data_type.clone(),
            Symbol::Function(f) => f.return_type.clone(),
            Symbol::Literal(l) => l.data_type.clone(),
            Symbol::ScalarSubquery(s) => s.data_type.clone(),
        }
    }
}

impl From<Reference> for Symbol {
    fn from(r: Reference) -> Symbol {
        Symbol::Reference(r)
    }
}

impl From<Field> for Symbol {
    fn from(f: Field) -> Symbol {
        Symbol::Field(f)
    }
}

impl From<Function> for Symbol {
    fn from(f: Function) -> Symbol {
        Symbol::Function(f)
    }
}

impl From<Literal> for Symbol {
    fn from(l: Literal) -> Symbol {
        Symbol::Literal(l)
    }
}

impl From<ScalarSubquery> for Symbol {
    fn from(s: ScalarSubquery) -> Symbol {
        Symbol::ScalarSubquery(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_types() {
        assert!(DataType::Integer.is_numeric());
        assert!(DataType::Double.is_numeric());
        assert!(!DataType::String.is_numeric());
        assert!(!DataType::Array(Box::new(DataType::Long)).is_numeric());
    }

    #[test]
    fn raw_values() {
        assert_eq!(Value::Integer(10).to_string(), "10");
        assert_eq!(Value::Double(1.0).to_string(), "1.0");
        assert_eq!(Value::Double(2.5).to_string(), "2.5");
        assert_eq!(
            Value::Array(vec![Value::Integer(1), Value::Null]).to_string(),
            "[1, null]"
        );
    }

    #[test]
    fn function_signature_from_args() {
        let f = Function::new(
            "add",
            vec![Literal::long(1).into(), Literal::double(2.0).into()],
            DataType::Double,
        );
        assert_eq!(f.ident.arg_types, vec![DataType::Long, DataType::Double]);
        assert_eq!(Symbol::from(f).value_type(), DataType::Double);
    }

    #[test]
    fn type_display() {
        assert_eq!(DataType::Array(Box::new(DataType::String)).to_string(), "array(text)");
    }
}
