//! Single-column sort state.

use std::cmp::Ordering;

use farmgate_lib::api::query::Direction;
use farmgate_lib::model::Value;

use crate::column::Column;

/// Which column the table is sorted by, if any.
///
/// Clicking the same header cycles `Asc -> Desc -> none`; clicking another
/// column starts it at `Asc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<(String, Direction)>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts sorted by `key`.
    pub fn by(key: impl Into<String>, direction: Direction) -> Self {
        Self {
            active: Some((key.into(), direction)),
        }
    }

    /// The sorted column and direction.
    pub fn active(&self) -> Option<(&str, Direction)> {
        self.active.as_ref().map(|(k, d)| (k.as_str(), *d))
    }

    /// Direction for `key`, or `None` if another column (or none) is active.
    pub fn direction_for(&self, key: &str) -> Option<Direction> {
        self.active
            .as_ref()
            .filter(|(k, _)| k == key)
            .map(|(_, d)| *d)
    }

    /// Advances the cycle for `key` and returns its new direction.
    pub fn toggle(&mut self, key: &str) -> Option<Direction> {
        let next = match self.direction_for(key) {
            None => Some(Direction::Asc),
            Some(Direction::Asc) => Some(Direction::Desc),
            Some(Direction::Desc) => None,
        };
        self.active = next.map(|d| (key.to_string(), d));
        next
    }

    pub fn set(&mut self, key: impl Into<String>, direction: Direction) {
        self.active = Some((key.into(), direction));
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Sorts `indices` (positions in `rows`) by `column`.
///
/// Stable: rows with equal keys keep their relative order in either
/// direction. Missing values sort last in both directions.
pub fn sort_indices<R>(rows: &[R], indices: &mut Vec<usize>, column: &Column<R>, direction: Direction) {
    let mut keyed: Vec<(usize, Value)> = indices
        .iter()
        .map(|&i| (i, column.sort_value(&rows[i])))
        .collect();

    keyed.sort_by(|(_, a), (_, b)| compare(a, b, direction));

    *indices = keyed.into_iter().map(|(i, _)| i).collect();
}

fn compare(a: &Value, b: &Value, direction: Direction) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            Direction::Asc => a.sort_cmp(b),
            Direction::Desc => b.sort_cmp(a),
        },
    }
}

#[cfg(test)]
mod tests {
    use farmgate_lib::model::Record;

    use super::*;

    #[test]
    fn test_toggle_cycle() {
        let mut sort = SortState::new();
        assert_eq!(sort.toggle("amount"), Some(Direction::Asc));
        assert_eq!(sort.toggle("amount"), Some(Direction::Desc));
        assert_eq!(sort.toggle("amount"), None);
        assert!(!sort.is_active());

        sort.toggle("amount");
        assert_eq!(sort.toggle("name"), Some(Direction::Asc));
        assert_eq!(sort.direction_for("amount"), None);
    }

    #[test]
    fn test_stable_and_nulls_last() {
        let rows: Vec<Record> = [
            ("a", Some("pending")),
            ("b", None),
            ("c", Some("confirmed")),
            ("d", Some("pending")),
            ("e", Some("confirmed")),
        ]
        .into_iter()
        .map(|(id, status)| {
            let r = Record::with_id("orders", id);
            match status {
                Some(s) => r.set("status", s),
                None => r,
            }
        })
        .collect();
        let column = Column::new("status", "Status").sortable();
        let ids = |idx: &[usize]| idx.iter().map(|&i| rows[i].id().unwrap_or("")).collect::<String>();

        let mut asc: Vec<usize> = (0..rows.len()).collect();
        sort_indices(&rows, &mut asc, &column, Direction::Asc);
        assert_eq!(ids(&asc), "ceadb".to_string());

        let mut desc: Vec<usize> = (0..rows.len()).collect();
        sort_indices(&rows, &mut desc, &column, Direction::Desc);
        assert_eq!(ids(&desc), "adceb".to_string());
    }
}
