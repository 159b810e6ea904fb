use std::vec;

#[cfg(feature = "clap")]
use clap::ArgEnum;
use serde::{Deserialize, Serialize};

use crate::schema::{Entry, Field, Value};

/// Field-oriented metadata of one page: one column per [`Field`], row `i`
/// of every column describing the same work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    columns: Vec<Vec<Entry>>,
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

impl Batch {
    pub fn new() -> Self {
        Self {
            columns: Field::ALL.iter().map(|_| Vec::new()).collect(),
        }
    }

    /// Appends one work, asking `entry` for the content of each field.
    pub fn push<F>(&mut self, entry_of: F)
    where
        F: Fn(Field) -> Entry,
    {
        for field in Field::ALL {
            let entry = entry_of(field);
            debug_assert_eq!(field.kind(), entry.kind(), "{}", field.name());
            self.columns[field.index()].push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, field: Field) -> &[Entry] {
        &self.columns[field.index()]
    }
}

/// Work-oriented metadata: one row per work, one entry per [`Field`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<Entry>>,
}

impl From<Batch> for Table {
    fn from(batch: Batch) -> Self {
        let len = batch.len();
        let mut columns = batch
            .columns
            .into_iter()
            .map(Vec::into_iter)
            .collect::<Vec<vec::IntoIter<Entry>>>();
        let rows = (0..len)
            .map(|_| columns.iter_mut().filter_map(|c| c.next()).collect())
            .collect();
        Self { rows }
    }
}

/// How rows holding several list fields are expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(ArgEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ExplodeMode {
    /// Each list field is expanded on its own: a work with 2 fandoms and
    /// 3 characters gives 6 rows, one per combination.
    #[default]
    CrossProduct,
    /// List fields are expanded side by side: the same work gives 3 rows,
    /// shorter lists are padded with missing values.
    Zip,
}

impl Table {
    pub fn rows(&self) -> &[Vec<Entry>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flattens list fields so that every row holds one value per field,
    /// scalar fields being repeated on each produced row.
    pub fn explode(self, mode: ExplodeMode) -> FlatTable {
        let rows = self
            .rows
            .into_iter()
            .flat_map(|row| match mode {
                ExplodeMode::CrossProduct => cross_product(&row),
                ExplodeMode::Zip => zip(&row),
            })
            .collect();
        FlatTable { rows }
    }
}

fn cross_product(row: &[Entry]) -> Vec<Vec<Value>> {
    let mut rows = vec![Vec::with_capacity(row.len())];
    for entry in row {
        rows = match entry.values() {
            [] => {
                rows.iter_mut().for_each(|r| r.push(Value::Missing));
                rows
            }
            [value] => {
                rows.iter_mut().for_each(|r| r.push(value.clone()));
                rows
            }
            values => rows
                .into_iter()
                .flat_map(|r| {
                    values.iter().map(move |value| {
                        let mut r = r.clone();
                        r.push(value.clone());
                        r
                    })
                })
                .collect(),
        };
    }
    rows
}

fn zip(row: &[Entry]) -> Vec<Vec<Value>> {
    let depth = row.iter().map(|e| e.values().len()).max().unwrap_or(1).max(1);
    (0..depth)
        .map(|i| {
            row.iter()
                .map(|entry| match entry {
                    Entry::Scalar(value) => value.clone(),
                    Entry::List(values) => values.get(i).cloned().unwrap_or(Value::Missing),
                })
                .collect()
        })
        .collect()
}

/// Rows of single values, in [`Field::ALL`] order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatTable {
    rows: Vec<Vec<Value>>,
}

impl FlatTable {
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one field, top to bottom.
    pub fn column(&self, field: Field) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[field.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Kind;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    /// A work whose list fields hold the given values, every other list
    /// field holding a single one.
    fn work(id: &str, lists: &[(Field, Vec<&str>)]) -> impl Fn(Field) -> Entry {
        let id = id.to_string();
        let lists = lists
            .iter()
            .map(|(f, values)| (*f, values.iter().map(|v| v.to_string()).collect::<Vec<_>>()))
            .collect::<Vec<_>>();
        move |field| match field.kind() {
            Kind::Scalar if field == Field::Id => Entry::Scalar(text(&id)),
            Kind::Scalar => Entry::Scalar(Value::Count(field.index() as u64)),
            Kind::List => match lists.iter().find(|(f, _)| *f == field) {
                Some((_, values)) => Entry::list(values.clone()),
                None => Entry::list(vec![format!("{}-{id}", field.name())]),
            },
        }
    }

    fn batch(works: &[&dyn Fn(Field) -> Entry]) -> Batch {
        let mut batch = Batch::new();
        for w in works {
            batch.push(w);
        }
        batch
    }

    #[test]
    fn batch_columns_stay_aligned() {
        let a = work("1", &[(Field::Characters, vec!["x", "y"])]);
        let b = work("2", &[]);
        let batch = batch(&[&a, &b]);

        assert_eq!(2, batch.len());
        for field in Field::ALL {
            assert_eq!(2, batch.column(field).len());
        }
        assert_eq!(&Entry::Scalar(text("2")), &batch.column(Field::Id)[1]);
    }

    #[test]
    fn table_is_a_transpose() {
        let a = work("1", &[]);
        let b = work("2", &[(Field::Languages, vec!["en", "fr"])]);
        let table = Table::from(batch(&[&a, &b]));

        assert_eq!(2, table.len());
        for row in table.rows() {
            assert_eq!(Field::ALL.len(), row.len());
        }
        assert_eq!(Entry::Scalar(text("1")), table.rows()[0][Field::Id.index()]);
        assert_eq!(
            Entry::List(vec![text("en"), text("fr")]),
            table.rows()[1][Field::Languages.index()]
        );
    }

    #[test]
    fn empty_batch_gives_empty_tables() {
        let table = Table::from(Batch::new());
        assert!(table.is_empty());
        assert!(table.explode(ExplodeMode::CrossProduct).is_empty());
    }

    #[test]
    fn single_values_are_not_duplicated() {
        let mut batch = Batch::new();
        for id in ["1", "2", "3"] {
            batch.push(work(id, &[]));
        }
        let table = Table::from(batch);

        for mode in [ExplodeMode::CrossProduct, ExplodeMode::Zip] {
            let flat = table.clone().explode(mode);
            assert_eq!(3, flat.len());
        }
    }

    #[test]
    fn list_of_three_gives_three_rows() {
        let a = work("1", &[(Field::FreeformTags, vec!["Fluff", "Angst", "Humor"])]);
        let flat = Table::from(batch(&[&a])).explode(ExplodeMode::CrossProduct);

        assert_eq!(3, flat.len());
        assert_eq!(
            vec![&text("Fluff"), &text("Angst"), &text("Humor")],
            flat.column(Field::FreeformTags).collect::<Vec<_>>()
        );
        for field in Field::ALL.iter().filter(|f| **f != Field::FreeformTags) {
            let values = flat.column(*field).collect::<Vec<_>>();
            assert!(values.iter().all(|v| *v == values[0]), "{}", field.name());
        }
    }

    #[test]
    fn cross_product_of_two_lists() {
        let a = work(
            "1",
            &[
                (Field::CrossoverFandoms, vec!["F1", "F2"]),
                (Field::Characters, vec!["a", "b", "c"]),
            ],
        );
        let b = work("2", &[]);
        let flat = Table::from(batch(&[&a, &b])).explode(ExplodeMode::CrossProduct);

        assert_eq!(7, flat.len());
        let pairs = flat
            .rows()
            .iter()
            .take(6)
            .map(|row| {
                (
                    row[Field::CrossoverFandoms.index()].render("").into_owned(),
                    row[Field::Characters.index()].render("").into_owned(),
                )
            })
            .collect::<Vec<_>>();
        let expected = [
            ("F1", "a"),
            ("F1", "b"),
            ("F1", "c"),
            ("F2", "a"),
            ("F2", "b"),
            ("F2", "c"),
        ]
        .map(|(f, c)| (f.to_string(), c.to_string()));
        assert_eq!(expected.to_vec(), pairs);
        assert_eq!(&text("2"), &flat.rows()[6][Field::Id.index()]);
    }

    #[test]
    fn zip_pads_shorter_lists() {
        let a = work(
            "1",
            &[
                (Field::CrossoverFandoms, vec!["F1", "F2"]),
                (Field::Characters, vec!["a", "b", "c"]),
            ],
        );
        let flat = Table::from(batch(&[&a])).explode(ExplodeMode::Zip);

        assert_eq!(3, flat.len());
        assert_eq!(
            vec![&text("F1"), &text("F2"), &Value::Missing],
            flat.column(Field::CrossoverFandoms).collect::<Vec<_>>()
        );
        assert_eq!(
            vec![&text("a"), &text("b"), &text("c")],
            flat.column(Field::Characters).collect::<Vec<_>>()
        );
        assert_eq!(3, flat.column(Field::Id).filter(|v| **v == text("1")).count());
    }

    #[test]
    fn missing_list_keeps_its_row() {
        let a = |field: Field| match field.kind() {
            Kind::Scalar => Entry::Scalar(Value::Missing),
            Kind::List => Entry::list(vec![]),
        };
        let flat = Table::from(batch(&[&a])).explode(ExplodeMode::CrossProduct);

        assert_eq!(1, flat.len());
        assert!(flat.rows()[0].iter().all(Value::is_missing));
    }
}
