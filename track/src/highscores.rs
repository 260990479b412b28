pub const HIGHSCORE_CAPACITY: usize = 10;
/// anything faster than this can't be a real lap
pub const MIN_VALID_TIME_MS: u32 = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighscoreEntry {
    pub name: String,
    pub time_ms: u32,
}

/// Fastest times first, never more than `HIGHSCORE_CAPACITY` entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighscoreTable {
    entries: Vec<HighscoreEntry>,
}

impl Default for HighscoreTable {
    fn default() -> HighscoreTable {
        let names = [
            "abi",
            "Freshman",
            "Master_L",
            "exDreamBoy",
            "Judge",
            "Waii",
            "Darky",
            "Netfreak",
            "Viper",
            "Kai",
        ];
        let entries = names
            .iter()
            .enumerate()
            .map(|(i, name)| HighscoreEntry {
                name: name.to_string(),
                time_ms: 45_000 + 5_000 * i as u32,
            })
            .collect();
        HighscoreTable { entries }
    }
}

impl HighscoreTable {
    pub fn empty() -> HighscoreTable {
        HighscoreTable { entries: vec![] }
    }

    /// sorts the entries and drops whatever doesn't fit
    pub fn from_entries(mut entries: Vec<HighscoreEntry>) -> HighscoreTable {
        entries.sort_by_key(|entry| entry.time_ms);
        entries.truncate(HIGHSCORE_CAPACITY);
        HighscoreTable { entries }
    }

    pub fn entries(&self) -> &[HighscoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The index a lap of `time_ms` would take. Ties go ahead of the existing entry. Invalid
    /// times and times slower than every entry give `len()`.
    pub fn rank_for(&self, time_ms: u32) -> usize {
        if time_ms < MIN_VALID_TIME_MS {
            return self.entries.len();
        }
        self.entries
            .iter()
            .position(|entry| time_ms <= entry.time_ms)
            .unwrap_or_else(|| self.entries.len())
    }

    /// Insert a time, returning its rank if it made it into the table.
    pub fn submit(&mut self, name: &str, time_ms: u32) -> Option<usize> {
        if time_ms < MIN_VALID_TIME_MS {
            return None;
        }
        let rank = self.rank_for(time_ms);
        if rank >= HIGHSCORE_CAPACITY {
            return None;
        }
        self.entries.insert(
            rank,
            HighscoreEntry {
                name: name.to_string(),
                time_ms,
            },
        );
        self.entries.truncate(HIGHSCORE_CAPACITY);
        Some(rank)
    }

    pub fn top(&self, n: usize) -> &[HighscoreEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn top_lap_time(&self) -> Option<u32> {
        self.entries.first().map(|entry| entry.time_ms)
    }
}
