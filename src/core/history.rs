use std::collections::VecDeque;
use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc, serde::ts_seconds};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryEntry {
    pub index: usize,
    #[serde(with = "ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub line: String,
}

/// Lines entered this session, numbered from 1, oldest dropped first.
pub struct CommandHistory {
    session_id: Uuid,
    max_entries: usize,
    next_index: usize,
    entries: VecDeque<HistoryEntry>,
}

impl CommandHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            max_entries: max_entries.max(1),
            next_index: 1,
            entries: VecDeque::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn record(&mut self, line: &str) {
        self.entries.push_back(HistoryEntry {
            index: self.next_index,
            timestamp: Utc::now(),
            line: line.to_string(),
        });
        self.next_index += 1;

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `  N  line` row per entry, as `history` prints it.
    pub fn listing(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| format!("{:>5}  {}", entry.index, entry.line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded_and_keeps_numbering() {
        let mut history = CommandHistory::new(2);
        history.record("setnode n1 10.0.0.1 10040");
        history.record("show");
        history.record("version");

        assert_eq!(history.len(), 2);
        assert_eq!(history.listing(), vec!["    2  show", "    3  version"]);
    }

    #[test]
    fn test_entries_are_timestamped() {
        let mut history = CommandHistory::new(10);
        let before = Utc::now().timestamp();
        history.record("echo on");
        let entry = history.entries().next().unwrap();
        assert!(entry.timestamp.timestamp() >= before);
    }
}
