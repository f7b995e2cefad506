//! Library for rendering analyzed relational queries as canonical SQL.
//!
//! The analyzer hands over a typed [`Relation`] tree; [`render`] turns it into
//! a single SQL statement that is deterministic for structurally equal trees.
//! Use [`SqlPrinter`] directly to plug in another [`SymbolPrinter`] or to
//! change the [`Style`].
//!
//! [`Relation`]: relation/enum.Relation.html
//! [`render`]: fn.render.html
//! [`SqlPrinter`]: sql/struct.SqlPrinter.html
//! [`SymbolPrinter`]: printer/trait.SymbolPrinter.html
//! [`Style`]: sql/struct.Style.html

#[macro_use]
extern crate lazy_static;

pub mod error;
pub mod ident;
pub mod ops;
pub mod printer;
pub mod relation;
pub mod sql;
pub mod symbol;

mod util;

pub use crate::error::{Error, Result};
pub use crate::printer::{QualifiedPrinter, SymbolPrinter};
pub use crate::relation::{Relation, Statement};
pub use crate::sql::{OutputFallback, SqlPrinter, Style};
pub use crate::symbol::Symbol;

/// Renders a relation with the default printer and style.
pub fn render(relation: &Relation) -> Result<String> {
    let printer: SqlPrinter = SqlPrinter::default();
    printer.render(relation)
}

/// Renders an analyzed statement with the default printer and style.
pub fn format(statement: &Statement) -> Result<String> {
    let printer: SqlPrinter = SqlPrinter::default();
    printer.format(statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ident::TableIdent;
    use crate::relation::{Select, TableScan};
    use crate::symbol::{DataType, Field, Literal};

    #[test]
    fn render_with_defaults() {
        let scan = TableScan::table(TableIdent::new("doc", "t"), vec![]);
        let select = Select::new(
            scan.into(),
            vec![(Literal::long(1).into(), Field::new("1", DataType::Long))],
        );
        assert_eq!(render(&select.clone().into()).unwrap(), "SELECT 1 FROM doc.t");
        assert_eq!(
            format(&Statement::Query(select.into())).unwrap(),
            "SELECT 1 FROM doc.t"
        );
    }
}
