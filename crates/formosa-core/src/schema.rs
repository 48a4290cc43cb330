//! Per-provider, per-metric schema descriptors and the record assembler.
//!
//! Provider payloads identify nothing by name: every field is a column
//! position in a fixed table layout. Each (provider, metric) pair therefore
//! declares one static [`MetricSchema`], the single reviewable place where
//! that coupling lives, and [`assemble`] applies it:
//!
//! 1. empty table or header-sentinel mismatch → `None` (the shape providers
//!    return for holidays, weekends, and queries outside retention);
//! 2. row selection, either fixed category rows or a date/category filter;
//! 3. composite cells split, every field run through the numeric
//!    normalizer;
//! 4. no matching row → `None`, otherwise a fully named record.

use time::Date;

use crate::numeric;
use crate::table::Table;
use crate::{calendar, TradingDate};

/// How a raw cell is turned into a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellParse {
    Number,
    /// Leading value of a `"primary(secondary)"` cell.
    CompositePrimary,
    /// Parenthetical value of a `"primary(secondary)"` cell.
    CompositeSecondary,
}

/// Calendar system used by a table's date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    RocSlash,
    GregorianSlash,
}

/// Location and calendar of the date cell used for row matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateColumn {
    pub column: usize,
    pub style: DateStyle,
}

impl DateColumn {
    fn parse(&self, cell: &str) -> Option<Date> {
        match self.style {
            DateStyle::RocSlash => calendar::from_roc(cell),
            DateStyle::GregorianSlash => calendar::from_slash(cell),
        }
    }
}

/// Row addressed by a field: the selector's match, or a fixed category row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRef {
    Selected,
    Index(usize),
}

/// A single addressable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: RowRef,
    pub column: usize,
}

impl CellRef {
    pub const fn at(row: usize, column: usize) -> Self {
        Self {
            row: RowRef::Index(row),
            column,
        }
    }
}

/// How a named field obtains its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Cell {
        row: RowRef,
        column: usize,
        parse: CellParse,
    },
    /// Sum across fixed category rows (e.g. dealer + trust +
    /// foreign-institution sub-rows). Absent if any contributor is absent.
    Sum(&'static [CellRef]),
    /// Difference of two cells (e.g. today's balance minus yesterday's).
    Diff {
        minuend: CellRef,
        subtrahend: CellRef,
    },
    /// Sum of one column over every selector-matched row (e.g. open
    /// interest across expiry months). Absent if any contributor is absent.
    SumSelected { column: usize },
}

/// A named output attribute and where it comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub source: FieldSource,
}

impl FieldSpec {
    pub const fn cell(name: &'static str, row: RowRef, column: usize) -> Self {
        Self {
            name,
            source: FieldSource::Cell {
                row,
                column,
                parse: CellParse::Number,
            },
        }
    }

    pub const fn composite(
        name: &'static str,
        row: RowRef,
        column: usize,
        parse: CellParse,
    ) -> Self {
        Self {
            name,
            source: FieldSource::Cell { row, column, parse },
        }
    }

    pub const fn sum(name: &'static str, cells: &'static [CellRef]) -> Self {
        Self {
            name,
            source: FieldSource::Sum(cells),
        }
    }

    pub const fn diff(name: &'static str, minuend: CellRef, subtrahend: CellRef) -> Self {
        Self {
            name,
            source: FieldSource::Diff {
                minuend,
                subtrahend,
            },
        }
    }

    pub const fn sum_selected(name: &'static str, column: usize) -> Self {
        Self {
            name,
            source: FieldSource::SumSelected { column },
        }
    }
}

/// Expected literal value of a designated cell, confirming the response
/// matches the metric's layout rather than an error/empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCell {
    pub row: usize,
    pub column: usize,
    pub value: &'static str,
}

/// Row selection rule: a date match, category filters, or both.
///
/// Schemas addressing only fixed rows leave both empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSelector {
    pub date: Option<DateColumn>,
    pub filters: &'static [(usize, &'static str)],
}

impl RowSelector {
    pub const NONE: Self = Self {
        date: None,
        filters: &[],
    };

    const fn requires_match(&self) -> bool {
        self.date.is_some() || !self.filters.is_empty()
    }
}

/// Static descriptor mapping one provider table layout to named fields.
/// Never mutated at runtime; one instance per (provider, metric) pair.
#[derive(Debug, Clone, Copy)]
pub struct MetricSchema {
    pub metric: &'static str,
    /// `None` when the provider signals validity upstream (TWSE `stat`,
    /// TPEx `iTotalRecords`) and an invalid response arrives here as an
    /// empty table.
    pub header: Option<HeaderCell>,
    pub selector: RowSelector,
    pub fields: &'static [FieldSpec],
}

/// A named, numeric-or-absent field set produced from one table.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRecord {
    date: TradingDate,
    values: Vec<(&'static str, Option<f64>)>,
}

impl AssembledRecord {
    pub fn date(&self) -> TradingDate {
        self.date
    }

    /// Value of a named field; absent fields and unknown names are `None`.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| *value)
    }
}

/// Apply a schema to an extracted table for the requested date.
///
/// Returns `None` (an explicit "provider reported no data", never a
/// partially populated record) when the table is empty, the header
/// sentinel mismatches, or the row selector finds no matching row.
/// Individual malformed cells only null their own field.
pub fn assemble(table: &Table, schema: &MetricSchema, date: Date) -> Option<AssembledRecord> {
    if table.is_empty() {
        return None;
    }

    if let Some(header) = schema.header {
        if table.cell(header.row, header.column) != Some(header.value) {
            return None;
        }
    }

    let selected = select_rows(table, &schema.selector, date);
    if schema.selector.requires_match() && selected.is_empty() {
        return None;
    }

    let values = schema
        .fields
        .iter()
        .map(|field| (field.name, evaluate(table, field.source, &selected)))
        .collect();

    Some(AssembledRecord {
        date: TradingDate::new(date),
        values,
    })
}

fn select_rows(table: &Table, selector: &RowSelector, date: Date) -> Vec<usize> {
    if !selector.requires_match() {
        return Vec::new();
    }

    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let date_matches = match selector.date {
                Some(column) => {
                    row.get(column.column).and_then(|cell| column.parse(cell)) == Some(date)
                }
                None => true,
            };
            date_matches
                && selector
                    .filters
                    .iter()
                    .all(|(column, expected)| row.get(*column).map(String::as_str) == Some(*expected))
        })
        .map(|(index, _)| index)
        .collect()
}

fn evaluate(table: &Table, source: FieldSource, selected: &[usize]) -> Option<f64> {
    match source {
        FieldSource::Cell { row, column, parse } => {
            resolve_cell(table, CellRef { row, column }, selected).and_then(|cell| parse_cell(cell, parse))
        }
        FieldSource::Sum(cells) => {
            let mut total = 0.0;
            for cell in cells {
                total += resolve_cell(table, *cell, selected)
                    .and_then(|raw| numeric::parse_decimal(raw))?;
            }
            Some(total)
        }
        FieldSource::Diff {
            minuend,
            subtrahend,
        } => {
            let minuend = resolve_cell(table, minuend, selected)
                .and_then(|raw| numeric::parse_decimal(raw))?;
            let subtrahend = resolve_cell(table, subtrahend, selected)
                .and_then(|raw| numeric::parse_decimal(raw))?;
            Some(minuend - subtrahend)
        }
        FieldSource::SumSelected { column } => {
            if selected.is_empty() {
                return None;
            }
            let mut total = 0.0;
            for index in selected {
                total += table
                    .cell(*index, column)
                    .and_then(numeric::parse_decimal)?;
            }
            Some(total)
        }
    }
}

fn resolve_cell<'t>(table: &'t Table, cell: CellRef, selected: &[usize]) -> Option<&'t str> {
    let row = match cell.row {
        RowRef::Selected => *selected.first()?,
        RowRef::Index(index) => index,
    };
    table.cell(row, cell.column)
}

fn parse_cell(cell: &str, parse: CellParse) -> Option<f64> {
    match parse {
        CellParse::Number => numeric::parse_decimal(cell),
        CellParse::CompositePrimary => numeric::split_composite(cell).0,
        CellParse::CompositeSecondary => numeric::split_composite(cell).1,
    }
}
