//! Analyzed relations.
//!
//! This module defines the relational algebra tree handed over by the
//! analyzer: table scans, selections with projection and grouping, ordering
//! and pagination wrappers, set operations, view references, and nested
//! sub-selects. The tree is immutable once built. Fields are public because
//! the analyzer owns construction; the builder methods exist for convenience
//! and keep the parallel sequences aligned.

use std::fmt;

use crate::ident::{QualifiedName, TableIdent};
use crate::symbol::{Field, Function, Symbol};

/// A node of the relation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    TableScan(TableScan),
    Select(Box<Select>),
    OrderedLimited(Box<OrderedLimited>),
    Union(Box<Union>),
    NamedView(NamedView),
    /// A relation used as the source of a `Select`.
    SubSelect(Box<Relation>),
}

impl Relation {
    /// Returns the number of output columns the relation produces.
    pub fn output_count(&self) -> usize {
        match self {
            Relation::TableScan(scan) => scan.fields.len(),
            Relation::Select(select) => select.outputs.len(),
            Relation::OrderedLimited(rel) => rel.child.output_count(),
            Relation::Union(union) => union.left.output_count(),
            Relation::NamedView(view) => view.fields.len(),
            Relation::SubSelect(inner) => inner.output_count(),
        }
    }

    /// Returns a short name of the variant, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Relation::TableScan(..) => "table scan",
            Relation::Select(..) => "select",
            Relation::OrderedLimited(..) => "ordered/limited relation",
            Relation::Union(..) => "union",
            Relation::NamedView(..) => "view",
            Relation::SubSelect(..) => "sub-select",
        }
    }

    /// Wraps the relation so it can be used as the source of a `Select`.
    pub fn into_sub_select(self) -> Relation {
        Relation::SubSelect(Box::new(self))
    }
}

impl From<TableScan> for Relation {
    fn from(scan: TableScan) -> Relation {
        Relation::TableScan(scan)
    }
}

impl From<Select> for Relation {
    fn from(select: Select) -> Relation {
        Relation::Select(Box::new(select))
    }
}

impl From<OrderedLimited> for Relation {
    fn from(rel: OrderedLimited) -> Relation {
        Relation::OrderedLimited(Box::new(rel))
    }
}

impl From<Union> for Relation {
    fn from(union: Union) -> Relation {
        Relation::Union(Box::new(union))
    }
}

impl From<NamedView> for Relation {
    fn from(view: NamedView) -> Relation {
        Relation::NamedView(view)
    }
}

/// What a table scan reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// A stored table.
    Table(TableIdent),
    /// A table-valued function call, known under `name` in the query.
    Function { name: QualifiedName, function: Function },
}

/// A scan over a stored table or a table function.
#[derive(Debug, Clone, PartialEq)]
pub struct TableScan {
    pub source: TableSource,
    pub fields: Vec<Field>,
}

impl TableScan {
    pub fn table(ident: TableIdent, fields: Vec<Field>) -> TableScan {
        TableScan {
            source: TableSource::Table(ident),
            fields,
        }
    }

    pub fn function(name: QualifiedName, function: Function, fields: Vec<Field>) -> TableScan {
        TableScan {
            source: TableSource::Function { name, function },
            fields,
        }
    }
}

/// A WHERE or HAVING clause.
///
/// The analyzer may fold a predicate away entirely; such a clause has no
/// query and is not rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryClause {
    pub query: Option<Symbol>,
}

impl QueryClause {
    pub fn new(query: Symbol) -> QueryClause {
        QueryClause { query: Some(query) }
    }

    /// A clause that matches everything and has no residual predicate.
    pub fn match_all() -> QueryClause {
        QueryClause { query: None }
    }

    pub fn has_query(&self) -> bool {
        self.query.is_some()
    }
}

/// Sort direction of an ordering entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Explicit placement of nulls in an ordering entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

/// An ordering specification, stored as three parallel sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub symbols: Vec<Symbol>,
    pub directions: Vec<Direction>,
    /// `None` leaves null placement to the dialect's default.
    pub nulls: Vec<Option<Nulls>>,
}

impl OrderBy {
    pub fn new<I>(entries: I) -> OrderBy
    where
        I: IntoIterator<Item = (Symbol, Direction, Option<Nulls>)>,
    {
        let mut order_by = OrderBy {
            symbols: vec![],
            directions: vec![],
            nulls: vec![],
        };
        for (symbol, direction, nulls) in entries {
            order_by.symbols.push(symbol);
            order_by.directions.push(direction);
            order_by.nulls.push(nulls);
        }
        order_by
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A selection: projection, filter, grouping, and optionally its own ordering
/// and pagination, over a source relation.
///
/// `outputs` and `fields` correspond positionally and have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub outputs: Vec<Symbol>,
    pub fields: Vec<Field>,
    pub where_clause: Option<QueryClause>,
    pub group_by: Vec<Symbol>,
    pub having: Option<QueryClause>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Symbol>,
    pub offset: Option<Symbol>,
    pub source: Relation,
}

impl Select {
    /// Creates a plain projection of `source`, one field per output.
    pub fn new<I>(source: Relation, outputs: I) -> Select
    where
        I: IntoIterator<Item = (Symbol, Field)>,
    {
        let (outputs, fields): (Vec<Symbol>, Vec<Field>) = outputs.into_iter().unzip();
        Select {
            outputs,
            fields,
            where_clause: None,
            group_by: vec![],
            having: None,
            order_by: None,
            limit: None,
            offset: None,
            source,
        }
    }

    pub fn filter(mut self, clause: QueryClause) -> Select {
        self.where_clause = Some(clause);
        self
    }

    pub fn group_by(mut self, keys: Vec<Symbol>) -> Select {
        self.group_by = keys;
        self
    }

    pub fn having(mut self, clause: QueryClause) -> Select {
        self.having = Some(clause);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Select {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: Symbol) -> Select {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: Symbol) -> Select {
        self.offset = Some(offset);
        self
    }
}

/// Ordering and pagination layered on top of another relation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedLimited {
    pub child: Relation,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Symbol>,
    pub offset: Option<Symbol>,
}

impl OrderedLimited {
    pub fn new(
        child: Relation,
        order_by: Option<OrderBy>,
        limit: Option<Symbol>,
        offset: Option<Symbol>,
    ) -> OrderedLimited {
        OrderedLimited {
            child,
            order_by,
            limit,
            offset,
        }
    }
}

/// Set operators between two relations.
///
/// Only `UnionAll` can be rendered; the others exist so the analyzer can
/// describe them and receive an explicit error instead of a wrong query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    UnionAll,
    UnionDistinct,
    Intersect,
    Except,
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SetOperator::UnionAll => write!(f, "UNION ALL"),
            SetOperator::UnionDistinct => write!(f, "UNION"),
            SetOperator::Intersect => write!(f, "INTERSECT"),
            SetOperator::Except => write!(f, "EXCEPT"),
        }
    }
}

/// Two relations of equal arity combined by a set operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub left: Relation,
    pub right: Relation,
    pub operator: SetOperator,
}

impl Union {
    /// Creates a bag union, the only set operation that renders.
    pub fn all(left: Relation, right: Relation) -> Union {
        Union {
            left,
            right,
            operator: SetOperator::UnionAll,
        }
    }
}

/// A view, known only by its name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedView {
    pub name: QualifiedName,
    pub fields: Vec<Field>,
}

/// An analyzed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Query(Relation),
    DropTable { table: TableIdent, if_exists: bool },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{DataType, Literal};

    fn users() -> Relation {
        TableScan::table(
            TableIdent::new("doc", "users"),
            vec![Field::new("id", DataType::Long)],
        )
        .into()
    }

    #[test]
    fn order_by_sequences_are_parallel() {
        let order_by = OrderBy::new(vec![
            (Literal::long(1).into(), Direction::Asc, None),
            (Literal::long(2).into(), Direction::Desc, Some(Nulls::First)),
        ]);
        assert_eq!(order_by.symbols.len(), 2);
        assert_eq!(order_by.directions, vec![Direction::Asc, Direction::Desc]);
        assert_eq!(order_by.nulls, vec![None, Some(Nulls::First)]);
    }

    #[test]
    fn select_outputs_and_fields_align() {
        let select = Select::new(
            users(),
            vec![
                (Literal::long(1).into(), Field::new("a", DataType::Long)),
                (Literal::long(2).into(), Field::new("b", DataType::Long)),
            ],
        );
        assert_eq!(select.outputs.len(), select.fields.len());
        assert_eq!(Relation::from(select).output_count(), 2);
    }

    #[test]
    fn output_count_passes_through_wrappers() {
        let ordered: Relation = OrderedLimited::new(users(), None, None, None).into();
        assert_eq!(ordered.output_count(), 1);
        assert_eq!(users().into_sub_select().output_count(), 1);
        let union: Relation = Union::all(users(), users()).into();
        assert_eq!(union.output_count(), 1);
    }

    #[test]
    fn match_all_has_no_query() {
        assert!(!QueryClause::match_all().has_query());
        assert!(QueryClause::new(Literal::boolean(true).into()).has_query());
    }

    #[test]
    fn set_operator_tokens() {
        assert_eq!(SetOperator::UnionAll.to_string(), "UNION ALL");
        assert_eq!(SetOperator::Except.to_string(), "EXCEPT");
    }
}
