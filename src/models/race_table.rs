use chrono::NaiveDateTime;

/// One retained snapshot: a value for every player column.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceRow {
    pub timestamp: NaiveDateTime,
    pub values: Vec<i64>,
}

/// Dense time × player table for a single skill.
///
/// Columns are fixed for the whole table; `rows[i].values[j]` is the xp of
/// `players[j]` at `rows[i].timestamp`. Rows are time-ascending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RaceTable {
    pub skill: String,
    pub players: Vec<String>,
    pub rows: Vec<RaceRow>,
}

impl RaceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, player: &str) -> Option<usize> {
        self.players.iter().position(|p| p == player)
    }

    /// Value of `player` in row `row`, if both exist.
    pub fn value(&self, row: usize, player: &str) -> Option<i64> {
        let column = self.column(player)?;
        self.rows.get(row).map(|r| r.values[column])
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.rows.iter().map(|r| r.timestamp)
    }
}
