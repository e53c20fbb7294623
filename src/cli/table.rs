//! Plain-text tables for listings. Columns are separated by two spaces and
//! header cells never contain whitespace, so the output splits cleanly with awk.

use std::fmt::{self, Write};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Right,
}

pub(crate) struct Column {
    title: &'static str,
    align: Align,
}

impl Column {
    pub(crate) fn left(title: &'static str) -> Column {
        Column::new(title, Align::Left)
    }

    pub(crate) fn right(title: &'static str) -> Column {
        Column::new(title, Align::Right)
    }

    fn new(title: &'static str, align: Align) -> Column {
        assert!(
            !title.contains(char::is_whitespace),
            "table header \"{}\" contains whitespace",
            title
        );

        Column { title, align }
    }
}

pub(crate) struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    print_header: bool,
}

impl Table {
    pub(crate) fn new(columns: Vec<Column>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
            print_header: true,
        }
    }

    pub(crate) fn print_header(&mut self, print_header: bool) {
        self.print_header = print_header;
    }

    pub(crate) fn add_row<S: Into<String>>(&mut self, cells: Vec<S>) {
        assert_eq!(
            cells.len(),
            self.columns.len(),
            "row width does not match the number of columns"
        );

        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let header = if self.print_header {
                    column.title.chars().count()
                } else {
                    0
                };

                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .fold(header, usize::max)
            })
            .collect()
    }
}

fn write_row<'c, I>(
    f: &mut fmt::Formatter<'_>,
    columns: &[Column],
    widths: &[usize],
    cells: I,
) -> fmt::Result
where
    I: IntoIterator<Item = &'c str>,
{
    let last = columns.len().saturating_sub(1);

    for (i, cell) in cells.into_iter().enumerate() {
        let width = widths[i];

        match columns[i].align {
            Align::Right => write!(f, "{:>width$}", cell, width = width)?,
            // no trailing padding after the last column
            Align::Left if i == last => f.write_str(cell)?,
            Align::Left => write!(f, "{:<width$}", cell, width = width)?,
        }

        if i != last {
            f.write_str("  ")?;
        }
    }

    f.write_char('\n')
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let widths = self.column_widths();

        if self.print_header {
            write_row(f, &self.columns, &widths, self.columns.iter().map(|c| c.title))?;
        }

        for row in &self.rows {
            write_row(f, &self.columns, &widths, row.iter().map(String::as_str))?;
        }

        Ok(())
    }
}

pub(crate) trait IntoTable: Into<Table> + Sized {
    fn into_table(self) -> Table {
        self.into()
    }
}

impl<T> IntoTable for T where T: Into<Table> + Sized {}
