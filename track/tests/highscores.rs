extern crate track;

use track::{HighscoreEntry, HighscoreTable, HIGHSCORE_CAPACITY};

fn five() -> HighscoreTable {
    let entries = [45000, 50000, 55000, 60000, 65000]
        .iter()
        .map(|&time_ms| HighscoreEntry {
            name: format!("driver{}", time_ms),
            time_ms,
        })
        .collect();
    HighscoreTable::from_entries(entries)
}

#[test]
fn test_rank_lands_between_neighbours() {
    let table = five();
    assert_eq!(table.rank_for(52000), 2);
    assert_eq!(table.rank_for(1_000_000), 5);
    assert_eq!(table.rank_for(10_000), 0);
    // ties go ahead of the existing entry
    assert_eq!(table.rank_for(50000), 1);
}

#[test]
fn test_too_fast_is_invalid() {
    let mut table = five();
    assert_eq!(table.rank_for(999), table.len());
    assert_eq!(table.submit("cheater", 500), None);
    assert_eq!(table.len(), 5);
}

#[test]
fn test_submit_inserts_in_order() {
    let mut table = five();
    assert_eq!(table.submit("me", 52000), Some(2));
    let times: Vec<u32> = table.entries().iter().map(|e| e.time_ms).collect();
    assert_eq!(times, vec![45000, 50000, 52000, 55000, 60000, 65000]);
    assert_eq!(table.entries()[2].name, "me");
}

#[test]
fn test_full_table_truncates() {
    let mut table = HighscoreTable::default();
    assert_eq!(table.len(), HIGHSCORE_CAPACITY);
    assert_eq!(table.top_lap_time(), Some(45000));
    assert_eq!(table.entries()[9].time_ms, 90000);

    assert_eq!(table.submit("slow", 95000), None);
    assert_eq!(table.submit("fast", 40000), Some(0));
    assert_eq!(table.len(), HIGHSCORE_CAPACITY);
    assert_eq!(table.top_lap_time(), Some(40000));
    // Kai fell off the end
    assert_eq!(table.entries()[9].time_ms, 85000);
}

#[test]
fn test_top_is_bounded() {
    let table = five();
    assert_eq!(table.top(3).len(), 3);
    assert_eq!(table.top(50).len(), 5);
    assert!(HighscoreTable::empty().top(5).is_empty());
    assert_eq!(HighscoreTable::empty().top_lap_time(), None);
}
