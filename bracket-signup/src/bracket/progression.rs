use std::collections::HashMap;

/// Maps a slot label to the label of the slot its winner advances into.
/// A key mapped to `None` is terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressionGraph {
    edges: HashMap<String, Option<String>>,
}

impl ProgressionGraph {
    /// Builds the graph from the Rounds table. Each row is a three-wide window
    /// `[slot, next, next_next]` and contributes `slot -> next` and
    /// `next -> next_next`. Later rows overwrite earlier ones.
    pub fn build(rows: &[Vec<String>]) -> Self {
        let mut edges = HashMap::new();
        for row in rows {
            for pair in 0..2 {
                let Some(from) = cell(row, pair) else {
                    continue;
                };
                edges.insert(from.to_string(), cell(row, pair + 1).map(str::to_string));
            }
        }
        ProgressionGraph { edges }
    }

    pub fn successor(&self, label: &str) -> Option<&str> {
        self.edges.get(label).and_then(|next| next.as_deref())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }
}

fn cell(row: &[String], index: usize) -> Option<&str> {
    row.get(index).map(String::as_str).filter(|value| !value.is_empty())
}
