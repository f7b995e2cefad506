//! Qualified symbol printing.
//!
//! The relation renderer only decides how a symbol is dispatched; general
//! expression syntax (operators, function calls, literal forms, qualified
//! column names) is the job of a `SymbolPrinter`. This module defines that
//! seam and the default `QualifiedPrinter`.

use std::fmt::Write;

use crate::error::{structural, Error, Result};
use crate::ident::quote_if_needed;
use crate::ops::{self, Parenthesize, Precedence};
use crate::symbol::{DataType, Function, Literal, Reference, Symbol, Value};
use crate::util::CommaSep;

/// Renders argument symbols on behalf of a printer, so that the caller's own
/// dispatch rules apply to nested symbols as well.
pub type PrintArg<'a> = dyn FnMut(&Symbol) -> Result<String> + 'a;

/// Prints symbols with full expression syntax and qualification.
///
/// Implementations must be free of side effects; a single printer may be
/// shared between concurrent renderings.
pub trait SymbolPrinter {
    /// Prints a column reference, qualified by its table.
    fn print_reference(&self, reference: &Reference) -> Result<String>;

    /// Prints a function call, rendering its arguments with `print_arg`.
    fn print_function(&self, function: &Function, print_arg: &mut PrintArg) -> Result<String>;

    /// Prints a literal in SQL literal syntax.
    fn print_literal(&self, literal: &Literal) -> Result<String>;

    /// Prints any symbol the renderer delegates.
    fn print_qualified(&self, symbol: &Symbol, print_arg: &mut PrintArg) -> Result<String> {
        match symbol {
            Symbol::Reference(r) => self.print_reference(r),
            Symbol::Function(f) => self.print_function(f, print_arg),
            Symbol::Literal(l) => self.print_literal(l),
            Symbol::Field(f) => Ok(quote_if_needed(&f.output_name)),
            Symbol::ScalarSubquery(..) => Err(Error::Unsupported(
                "scalar subqueries are printed by the relation renderer".to_owned(),
            )),
        }
    }
}

/// Functions whose argument-less form is written with a star.
const STAR_FUNCTIONS: [&str; 1] = ["count"];

/// The default printer.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualifiedPrinter;

/// A rendered argument together with the precedence of its outermost operator.
struct Operand {
    text: String,
    precedence: Precedence,
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Parenthesize for Operand {
    fn precedence(&self) -> Precedence {
        self.precedence
    }
}

/// Returns the precedence a symbol has when used as an operand.
fn operand_precedence(symbol: &Symbol) -> Precedence {
    match symbol {
        Symbol::Function(f) if f.ident.schema.is_none() => {
            ops::precedence(&f.ident.name).unwrap_or(ops::HIGHEST_PRECEDENCE)
        }
        // A negative number binds like a unary minus, so `-(-1)` does not
        // turn into the comment `--1`.
        Symbol::Literal(Literal {
            value: Value::Integer(i),
            ..
        }) if *i < 0 => ops::precedence("negate").unwrap_or(ops::HIGHEST_PRECEDENCE),
        Symbol::Literal(Literal {
            value: Value::Double(d),
            ..
        }) if d.is_sign_negative() => {
            ops::precedence("negate").unwrap_or(ops::HIGHEST_PRECEDENCE)
        }
        _ => ops::HIGHEST_PRECEDENCE,
    }
}

/// Writes a single-quoted string literal, doubling embedded quotes.
fn string_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Writes a numeric value. Non-finite doubles have no bare literal form and
/// are written as casts from their text representation.
pub fn numeric_literal(value: &Value) -> String {
    match value {
        Value::Double(d) if d.is_nan() => "'NaN'::double".to_owned(),
        Value::Double(d) if d.is_infinite() && *d > 0.0 => "'Infinity'::double".to_owned(),
        Value::Double(d) if d.is_infinite() => "'-Infinity'::double".to_owned(),
        _ => value.to_string(),
    }
}

/// Writes a value in SQL literal syntax.
fn value_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_owned(),
        Value::Boolean(true) => "TRUE".to_owned(),
        Value::Boolean(false) => "FALSE".to_owned(),
        Value::Integer(..) | Value::Double(..) => numeric_literal(value),
        Value::Text(s) => string_literal(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(value_literal).collect();
            format!("[{}]", CommaSep(&items))
        }
        Value::Object(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}={}", quote_if_needed(k), value_literal(v)))
                .collect();
            format!("{{{}}}", CommaSep(&entries))
        }
    }
}

impl SymbolPrinter for QualifiedPrinter {
    fn print_reference(&self, reference: &Reference) -> Result<String> {
        Ok(format!(
            "{}.{}",
            reference.table.sql_fqn(),
            reference.column.quoted_fqn()
        ))
    }

    fn print_function(&self, function: &Function, print_arg: &mut PrintArg) -> Result<String> {
        let ident = &function.ident;
        if let (None, Some(op)) = (&ident.schema, ops::operator(&ident.name)) {
            if function.args.len() != op.arity {
                return Err(structural(format!(
                    "operator {} expects {} argument(s), got {}",
                    op.token,
                    op.arity,
                    function.args.len()
                )));
            }
            let mut operands = Vec::with_capacity(function.args.len());
            for arg in &function.args {
                operands.push(Operand {
                    text: print_arg(arg)?,
                    precedence: operand_precedence(arg),
                });
            }
            let mut s = String::new();
            ops::write_operation(&mut s, &op, &operands).map_err(|_| {
                structural(format!("cannot write operator {}", op.token))
            })?;
            return Ok(s);
        }

        let mut s = String::new();
        if let Some(schema) = &ident.schema {
            s.push_str(&quote_if_needed(schema));
            s.push('.');
        }
        s.push_str(&ident.name);
        if function.args.is_empty() && STAR_FUNCTIONS.contains(&ident.name.as_str()) {
            s.push_str("(*)");
            return Ok(s);
        }
        let mut args = Vec::with_capacity(function.args.len());
        for arg in &function.args {
            args.push(print_arg(arg)?);
        }
        write!(s, "({})", CommaSep(&args))
            .map_err(|_| structural(format!("cannot write function {}", ident.name)))?;
        Ok(s)
    }

    fn print_literal(&self, literal: &Literal) -> Result<String> {
        let text = value_literal(&literal.value);
        match (&literal.value, &literal.data_type) {
            (Value::Text(..), DataType::String) | (Value::Text(..), DataType::Undefined) => {
                Ok(text)
            }
            (Value::Text(..), data_type) => Ok(format!("{}::{}", text, data_type)),
            _ => Ok(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{ColumnIdent, TableIdent};
    use crate::relation::{Select, TableScan};
    use crate::symbol::{Field, ScalarSubquery};

    fn print(symbol: &Symbol) -> Result<String> {
        fn arg(symbol: &Symbol) -> Result<String> {
            QualifiedPrinter.print_qualified(symbol, &mut arg)
        }
        arg(symbol)
    }

    fn col(name: &str) -> Symbol {
        Reference::new(
            TableIdent::new("doc", "t"),
            ColumnIdent::new(name),
            DataType::Long,
        )
        .into()
    }

    fn call(name: &str, args: Vec<Symbol>) -> Symbol {
        Function::new(name, args, DataType::Long).into()
    }

    #[test]
    fn qualified_reference() {
        assert_eq!(print(&col("x")).unwrap(), "doc.t.x");
        let nested = Reference::new(
            TableIdent::new("Doc", "t"),
            ColumnIdent::with_path("o", vec!["a"]),
            DataType::Long,
        );
        assert_eq!(print(&nested.into()).unwrap(), r#""Doc".t.o['a']"#);
    }

    #[test]
    fn literals() {
        assert_eq!(print(&Literal::long(-3).into()).unwrap(), "-3");
        assert_eq!(print(&Literal::double(1.5).into()).unwrap(), "1.5");
        assert_eq!(print(&Literal::string("it's").into()).unwrap(), "'it''s'");
        assert_eq!(print(&Literal::boolean(true).into()).unwrap(), "TRUE");
        assert_eq!(print(&Literal::null().into()).unwrap(), "NULL");
        let ts = Literal::new(Value::Text("2020-01-01".into()), DataType::Timestamp);
        assert_eq!(print(&ts.into()).unwrap(), "'2020-01-01'::timestamp");
        let arr = Literal::new(
            Value::Array(vec![Value::Text("a".into()), Value::Null]),
            DataType::Array(Box::new(DataType::String)),
        );
        assert_eq!(print(&arr.into()).unwrap(), "['a', NULL]");
        let obj = Literal::new(
            Value::Object(vec![("Key".into(), Value::Integer(1))]),
            DataType::Object,
        );
        assert_eq!(print(&obj.into()).unwrap(), r#"{"Key"=1}"#);
    }

    #[test]
    fn function_calls() {
        assert_eq!(
            print(&call("abs", vec![col("x")])).unwrap(),
            "abs(doc.t.x)"
        );
        assert_eq!(print(&call("count", vec![])).unwrap(), "count(*)");
        assert_eq!(print(&call("now", vec![])).unwrap(), "now()");
        let mut udf = Function::new("f", vec![col("x")], DataType::Long);
        udf.ident.schema = Some("my_schema".into());
        assert_eq!(print(&udf.into()).unwrap(), "my_schema.f(doc.t.x)");
    }

    #[test]
    fn operators_parenthesize_minimally() {
        let sum = call("add", vec![col("a"), col("b")]);
        let product = call("multiply", vec![sum, Literal::long(2).into()]);
        assert_eq!(print(&product).unwrap(), "(doc.t.a + doc.t.b) * 2");

        let cond = call(
            "op_and",
            vec![
                call("op_=", vec![col("a"), Literal::long(1).into()]),
                call("op_not", vec![call("op_or", vec![col("b"), col("c")])]),
            ],
        );
        assert_eq!(
            print(&cond).unwrap(),
            "doc.t.a = 1 AND NOT (doc.t.b OR doc.t.c)"
        );
    }

    #[test]
    fn negated_negative_literal() {
        let neg = call("negate", vec![Literal::long(-1).into()]);
        assert_eq!(print(&neg).unwrap(), "-(-1)");
    }

    #[test]
    fn operator_arity_mismatch() {
        match print(&call("add", vec![col("a")])) {
            Err(Error::Structural(..)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_finite_doubles_are_cast() {
        assert_eq!(
            print(&Literal::double(std::f64::NAN).into()).unwrap(),
            "'NaN'::double"
        );
        assert_eq!(
            print(&Literal::double(std::f64::INFINITY).into()).unwrap(),
            "'Infinity'::double"
        );
        let sum = call(
            "add",
            vec![col("x"), Literal::double(std::f64::NEG_INFINITY).into()],
        );
        assert_eq!(print(&sum).unwrap(), "doc.t.x + '-Infinity'::double");
    }

    #[test]
    fn scalar_subquery_is_left_to_the_renderer() {
        let scan = TableScan::table(TableIdent::new("doc", "t"), vec![]);
        let select = Select::new(
            scan.into(),
            vec![(col("x"), Field::new("x", DataType::Long))],
        );
        let sub: Symbol = ScalarSubquery {
            relation: Box::new(select.into()),
            data_type: DataType::Long,
        }
        .into();
        match print(&sub) {
            Err(Error::Unsupported(..)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn field_is_quoted_output_name() {
        let field: Symbol = Field::new("Total", DataType::Long).into();
        assert_eq!(print(&field).unwrap(), r#""Total""#);
    }
}
