//! Nearest-neighbor lookups in the pressure/temperature map.

use crate::types::{PtColumn, PtMapRow};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("pressure/temperature lookup table is empty")]
pub struct EmptyTable;

/// Find the row whose `input` column is numerically nearest to `query`
/// and return its `output` column.
///
/// Replacement uses strict less-than, so on a distance tie the
/// earliest row in the table wins.
pub fn nearest(
    table: &[PtMapRow],
    query: f64,
    input: PtColumn,
    output: PtColumn,
) -> Result<f64, EmptyTable> {
    let mut best = table.first().ok_or(EmptyTable)?;
    for row in &table[1..] {
        if (row.get(input) - query).abs() < (best.get(input) - query).abs() {
            best = row;
        }
    }
    Ok(best.get(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(p_bar: f64, t_c: f64) -> PtMapRow {
        PtMapRow {
            p_bar,
            p_psig: p_bar * 14.5,
            t_k: t_c + 273.15,
            t_c,
            t_f: t_c * 1.8 + 32.0,
        }
    }

    #[test]
    fn picks_nearest_row() {
        let table = [row(1.0, 100.0), row(5.0, 152.0), row(10.0, 180.0)];
        let t = nearest(&table, 4.0, PtColumn::PressureBar, PtColumn::TempC).unwrap();
        assert_eq!(t, 152.0);
    }

    #[test]
    fn exact_hit_returns_that_row() {
        let table = [row(1.0, 100.0), row(5.0, 152.0), row(10.0, 180.0)];
        let t = nearest(&table, 5.0, PtColumn::PressureBar, PtColumn::TempC).unwrap();
        assert_eq!(t, 152.0);
    }

    #[test]
    fn tie_breaks_toward_first_row() {
        // query 3.0 is equidistant from 1.0 and 5.0
        let table = [row(1.0, 100.0), row(5.0, 152.0)];
        let t = nearest(&table, 3.0, PtColumn::PressureBar, PtColumn::TempC).unwrap();
        assert_eq!(t, 100.0);
    }

    #[test]
    fn empty_table_is_an_error() {
        assert_eq!(
            nearest(&[], 1.0, PtColumn::PressureBar, PtColumn::TempC),
            Err(EmptyTable)
        );
    }
}
