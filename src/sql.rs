//! Structured Query Language (SQL).
//!
//! This module renders an analyzed relation tree (see the [`relation`]
//! module) back into SQL text. The text is not the query the user wrote, but
//! an equivalent one that is deterministic for a given tree, so it can serve
//! as a stored view definition, a plan label, or a cache key.
//!
//! Relations are rendered by an exhaustive match over [`Relation`]; symbols
//! embedded in them go through a small set of overrides here and are
//! otherwise delegated to a [`SymbolPrinter`]. Scalar subqueries recurse back
//! into the relation renderer. Every level of relation nesting and every
//! level of function argument nesting is counted against
//! [`Style::max_depth`].
//!
//! [`relation`]: ../relation/index.html
//! [`Relation`]: ../relation/enum.Relation.html
//! [`SymbolPrinter`]: ../printer/trait.SymbolPrinter.html
//! [`Style::max_depth`]: struct.Style.html#structfield.max_depth

use crate::error::{structural, Error, Result};
use crate::ident::quote_if_needed;
use crate::printer::{numeric_literal, QualifiedPrinter, SymbolPrinter};
use crate::relation::{
    Direction, Nulls, OrderBy, QueryClause, Relation, Select, SetOperator, Statement,
    TableSource, Union,
};
use crate::symbol::{Field, Symbol};
use crate::util::try_join;

/// Default bound on nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// How to render an output whose symbol has no dedicated aliasing rule
/// (non-numeric literals and fields of an inner relation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFallback {
    /// Render the symbol itself, aliased to the output name if they differ.
    Expression,
    /// Render only the output name. The symbol is lost, so the resulting
    /// query may not be equivalent.
    FieldName,
}

/// Style options for conversion to SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    /// Deepest nesting accepted before rendering fails. Sub-selects, scalar
    /// subqueries, union sides, ordering wrappers, and function arguments each
    /// add a level.
    pub max_depth: usize,
    /// Rendering of outputs without a dedicated aliasing rule.
    pub output_fallback: OutputFallback,
}

impl Default for Style {
    fn default() -> Style {
        Style {
            max_depth: DEFAULT_MAX_DEPTH,
            output_fallback: OutputFallback::Expression,
        }
    }
}

/// Renders relations and statements to SQL.
///
/// The printer holds no mutable state, so one instance can serve concurrent
/// callers as long as `P` is `Sync`.
#[derive(Debug, Clone)]
pub struct SqlPrinter<P = QualifiedPrinter> {
    printer: P,
    style: Style,
}

impl Default for SqlPrinter {
    fn default() -> SqlPrinter {
        SqlPrinter::new(QualifiedPrinter, Style::default())
    }
}

/// Appends an alias unless `text` already reads as the field's output name.
fn aliased(text: String, field: &Field) -> String {
    let name = quote_if_needed(&field.output_name);
    if text == field.output_name || text == name {
        text
    } else {
        format!("{} AS {}", text, name)
    }
}

impl<P: SymbolPrinter> SqlPrinter<P> {
    pub fn new(printer: P, style: Style) -> SqlPrinter<P> {
        SqlPrinter { printer, style }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Renders an analyzed statement. Only queries can be rendered.
    pub fn format(&self, statement: &Statement) -> Result<String> {
        match statement {
            Statement::Query(relation) => self.render(relation),
            Statement::DropTable { table, if_exists } => Err(Error::Unsupported(format!(
                "Cannot format DROP TABLE{} {}",
                if *if_exists { " IF EXISTS" } else { "" },
                table.sql_fqn()
            ))),
        }
    }

    /// Renders a relation as a single SQL statement.
    pub fn render(&self, relation: &Relation) -> Result<String> {
        let mut sb = String::new();
        self.process(relation, &mut sb, 0)?;
        tracing::debug!(relation = relation.kind_name(), len = sb.len(), "rendered relation");
        Ok(sb)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.style.max_depth {
            tracing::error!(depth, limit = self.style.max_depth, "nesting too deep");
            return Err(Error::DepthExceeded {
                limit: self.style.max_depth,
            });
        }
        Ok(())
    }

    fn process(&self, relation: &Relation, sb: &mut String, depth: usize) -> Result<()> {
        self.check_depth(depth)?;
        tracing::trace!(relation = relation.kind_name(), depth, "rendering");
        match relation {
            Relation::Select(select) => self.print_select(select, sb, depth),
            Relation::NamedView(view) => {
                sb.push_str(&view.name.sql_fqn());
                Ok(())
            }
            Relation::Union(union) => self.print_union(union, sb, depth),
            Relation::OrderedLimited(rel) => {
                self.process(&rel.child, sb, depth + 1)?;
                self.add_order_by(sb, rel.order_by.as_ref(), depth)?;
                self.clause_and_symbol(sb, "LIMIT", rel.limit.as_ref(), depth)?;
                self.clause_and_symbol(sb, "OFFSET", rel.offset.as_ref(), depth)
            }
            Relation::SubSelect(inner) => self.process(inner, sb, depth + 1),
            Relation::TableScan(..) => Err(Error::Unsupported(format!(
                "Cannot format a {} outside of a FROM clause",
                relation.kind_name()
            ))),
        }
    }

    fn print_union(&self, union: &Union, sb: &mut String, depth: usize) -> Result<()> {
        if union.operator != SetOperator::UnionAll {
            return Err(Error::Unsupported(format!(
                "Cannot format set operation {}",
                union.operator
            )));
        }
        let (left, right) = (union.left.output_count(), union.right.output_count());
        if left != right {
            return Err(structural(format!(
                "union sides have {} and {} outputs",
                left, right
            )));
        }
        self.process(&union.left, sb, depth + 1)?;
        sb.push(' ');
        sb.push_str(&union.operator.to_string());
        sb.push(' ');
        self.process(&union.right, sb, depth + 1)
    }

    fn print_select(&self, select: &Select, sb: &mut String, depth: usize) -> Result<()> {
        if select.outputs.len() != select.fields.len() {
            return Err(structural(format!(
                "select has {} outputs but {} fields",
                select.outputs.len(),
                select.fields.len()
            )));
        }
        sb.push_str("SELECT ");
        self.add_outputs(select, sb, depth)?;
        self.add_from(select, sb, depth)?;
        self.clause_and_query(sb, "WHERE", select.where_clause.as_ref(), depth)?;
        self.add_group_by(sb, &select.group_by, depth)?;
        self.clause_and_query(sb, "HAVING", select.having.as_ref(), depth)?;
        self.add_order_by(sb, select.order_by.as_ref(), depth)?;
        self.clause_and_symbol(sb, "LIMIT", select.limit.as_ref(), depth)?;
        self.clause_and_symbol(sb, "OFFSET", select.offset.as_ref(), depth)
    }

    /// Renders a symbol appearing in a relation at nesting level `depth`.
    fn print_symbol(&self, symbol: &Symbol, depth: usize) -> Result<String> {
        self.check_depth(depth)?;
        match symbol {
            Symbol::ScalarSubquery(sub) => {
                if sub.relation.output_count() == 0 {
                    return Err(structural(format!(
                        "scalar subquery over a {} without outputs",
                        sub.relation.kind_name()
                    )));
                }
                let mut sb = String::from("(");
                self.process(&sub.relation, &mut sb, depth + 1)?;
                sb.push(')');
                Ok(sb)
            }
            Symbol::Field(field) => Ok(quote_if_needed(&field.output_name)),
            // References into the implicit schema stay unqualified.
            Symbol::Reference(r) if r.table.schema.is_empty() => Ok(r.column.quoted_fqn()),
            Symbol::Literal(l) if l.data_type.is_numeric() => Ok(numeric_literal(&l.value)),
            Symbol::Reference(..) | Symbol::Function(..) | Symbol::Literal(..) => self
                .printer
                .print_qualified(symbol, &mut |arg: &Symbol| self.print_symbol(arg, depth + 1)),
        }
    }

    fn clause_and_symbol(
        &self,
        sb: &mut String,
        clause: &str,
        symbol: Option<&Symbol>,
        depth: usize,
    ) -> Result<()> {
        if let Some(symbol) = symbol {
            sb.push(' ');
            sb.push_str(clause);
            sb.push(' ');
            sb.push_str(&self.print_symbol(symbol, depth)?);
        }
        Ok(())
    }

    fn clause_and_query(
        &self,
        sb: &mut String,
        clause: &str,
        query: Option<&QueryClause>,
        depth: usize,
    ) -> Result<()> {
        match query {
            Some(query) if query.has_query() => {
                self.clause_and_symbol(sb, clause, query.query.as_ref(), depth)
            }
            _ => Ok(()),
        }
    }

    fn add_order_by(&self, sb: &mut String, order_by: Option<&OrderBy>, depth: usize) -> Result<()> {
        let order_by = match order_by {
            Some(order_by) if !order_by.is_empty() => order_by,
            _ => return Ok(()),
        };
        let n = order_by.symbols.len();
        if order_by.directions.len() != n || order_by.nulls.len() != n {
            return Err(structural(format!(
                "ordering has {} symbols, {} directions, and {} null orderings",
                n,
                order_by.directions.len(),
                order_by.nulls.len()
            )));
        }
        let entries: Vec<_> = order_by
            .symbols
            .iter()
            .zip(&order_by.directions)
            .zip(&order_by.nulls)
            .collect();
        let list = try_join(&entries, ", ", |&((symbol, direction), nulls)| {
            let mut s = self.print_symbol(symbol, depth)?;
            s.push_str(match direction {
                Direction::Asc => " ASC",
                Direction::Desc => " DESC",
            });
            match nulls {
                Some(Nulls::First) => s.push_str(" NULLS FIRST"),
                Some(Nulls::Last) => s.push_str(" NULLS LAST"),
                None => (),
            }
            Ok(s)
        })?;
        sb.push_str(" ORDER BY ");
        sb.push_str(&list);
        Ok(())
    }

    fn add_group_by(&self, sb: &mut String, keys: &[Symbol], depth: usize) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        sb.push_str(" GROUP BY ");
        sb.push_str(&try_join(keys, ", ", |key| self.print_symbol(key, depth))?);
        Ok(())
    }

    fn add_outputs(&self, select: &Select, sb: &mut String, depth: usize) -> Result<()> {
        let pairs: Vec<_> = select.fields.iter().zip(&select.outputs).collect();
        let list = try_join(&pairs, ", ", |&(field, output)| {
            self.output(field, output, depth)
        })?;
        sb.push_str(&list);
        Ok(())
    }

    fn output(&self, field: &Field, output: &Symbol, depth: usize) -> Result<String> {
        match output {
            Symbol::Reference(r) => {
                let text = self.print_symbol(output, depth)?;
                if r.column.sql_fqn() == field.output_name {
                    Ok(text)
                } else {
                    Ok(format!("{} AS {}", text, quote_if_needed(&field.output_name)))
                }
            }
            Symbol::Function(..) => Ok(aliased(self.print_symbol(output, depth)?, field)),
            Symbol::ScalarSubquery(..) => self.print_symbol(output, depth),
            Symbol::Literal(l) if l.data_type.is_numeric() => Ok(numeric_literal(&l.value)),
            Symbol::Literal(..) | Symbol::Field(..) => match self.style.output_fallback {
                OutputFallback::Expression => {
                    Ok(aliased(self.print_symbol(output, depth)?, field))
                }
                OutputFallback::FieldName => Ok(quote_if_needed(&field.output_name)),
            },
        }
    }

    fn add_from(&self, select: &Select, sb: &mut String, depth: usize) -> Result<()> {
        sb.push_str(" FROM ");
        match &select.source {
            Relation::TableScan(scan) => match &scan.source {
                TableSource::Table(ident) => sb.push_str(&ident.sql_fqn()),
                TableSource::Function { name, function } => {
                    let call = self
                        .printer
                        .print_function(function, &mut |arg: &Symbol| self.print_symbol(arg, depth + 1))?;
                    sb.push_str(&call);
                    let implicit = name.parts.len() == 2 && name.parts[1] == function.ident.name;
                    if !implicit {
                        sb.push_str(" AS ");
                        sb.push_str(&name.sql_fqn());
                    }
                }
            },
            Relation::SubSelect(inner) => self.process(inner, sb, depth + 1)?,
            other => {
                return Err(structural(format!(
                    "Unknown relation in from clause: {}",
                    other.kind_name()
                )))
            }
        }
        Ok(())
    }
}
