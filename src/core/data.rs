use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::options::ChartOptions;
use crate::core::types::Domain;

/// One record of a dataset, keyed by column name.
pub type Row = IndexMap<String, f64>;

/// Named datasets rendered by the chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartData {
    datasets: IndexMap<String, Vec<Row>>,
}

impl ChartData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dataset(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.datasets.insert(name.into(), rows);
        self
    }

    pub fn set_dataset(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.datasets.insert(name.into(), rows);
    }

    #[must_use]
    pub fn dataset(&self, name: &str) -> Option<&[Row]> {
        self.datasets.get(name).map(Vec::as_slice)
    }

    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    /// Min/max of `column` over the given datasets, ignoring non-finite values.
    #[must_use]
    pub fn extent<'a>(
        &self,
        columns: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Option<Domain> {
        let mut bounds: Option<(f64, f64)> = None;
        for (dataset, column) in columns {
            let Some(rows) = self.datasets.get(dataset) else {
                continue;
            };
            for value in rows.iter().filter_map(|row| row.get(column).copied()) {
                if !value.is_finite() {
                    continue;
                }
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(value), max.max(value)),
                    None => (value, value),
                });
            }
        }
        bounds.map(|(min, max)| Domain::new(min, max))
    }
}

/// Builds a row from `(column, value)` pairs.
#[must_use]
pub fn row<const N: usize>(values: [(&str, f64); N]) -> Row {
    values
        .into_iter()
        .map(|(column, value)| (column.to_owned(), value))
        .collect()
}

/// Immutable data and options pair handed to the visual components.
///
/// Hosts rebuild it from their own state on every update, so components never
/// observe a later host mutation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub data: Rc<ChartData>,
    pub options: Rc<ChartOptions>,
}

impl Snapshot {
    #[must_use]
    pub fn new(data: &ChartData, options: &ChartOptions) -> Self {
        Self {
            data: Rc::new(data.clone()),
            options: Rc::new(options.clone()),
        }
    }
}
