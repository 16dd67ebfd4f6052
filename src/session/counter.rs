use std::error::Error;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Session identifier, rendered everywhere as a 4-digit zero-padded
/// decimal so directory listings sort chronologically.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Hands out strictly increasing session ids. Seeded once from the image
/// root at startup, then advanced in memory only; an allocated id is
/// never reissued, even when the session it named ends up incomplete.
#[derive(Debug)]
pub struct SessionCounter {
    next: u64,
}

impl SessionCounter {
    pub fn starting_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    /// Seeds the counter from existing session directories: highest
    /// purely numeric entry name plus one, or 1 when the root does not
    /// exist yet. Non-numeric names are ignored; any other directory
    /// error is fatal.
    pub fn scan(image_root: &Path) -> Result<Self, Box<dyn Error>> {
        let entries = match fs::read_dir(image_root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(Self::starting_at(1));
            }
            Err(err) => return Err(err.into()),
        };

        let mut highest = 0u64;
        for entry in entries {
            let entry = entry?;
            if let Some(value) = numeric_name(&entry.file_name()) {
                highest = highest.max(value);
            }
        }

        Ok(Self::starting_at(highest + 1))
    }

    pub fn peek(&self) -> SessionId {
        SessionId(self.next)
    }

    pub fn allocate(&mut self) -> SessionId {
        let id = SessionId(self.next);
        self.next += 1;
        id
    }
}

fn numeric_name(name: &OsStr) -> Option<u64> {
    let name = name.to_str()?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_render_zero_padded_to_four_digits() {
        assert_eq!(SessionId::new(7).to_string(), "0007");
        assert_eq!(SessionId::new(123).to_string(), "0123");
        assert_eq!(SessionId::new(12345).to_string(), "12345");
    }

    #[test]
    fn allocate_is_strictly_increasing() {
        let mut counter = SessionCounter::starting_at(41);

        assert_eq!(counter.allocate().value(), 41);
        assert_eq!(counter.allocate().value(), 42);
        assert_eq!(counter.peek().value(), 43);
    }

    #[test]
    fn counter_never_starts_below_one() {
        assert_eq!(SessionCounter::starting_at(0).peek().value(), 1);
    }

    #[test]
    fn only_pure_digit_names_count_as_sessions() {
        assert_eq!(numeric_name(OsStr::new("0042")), Some(42));
        assert_eq!(numeric_name(OsStr::new("12")), Some(12));
        assert_eq!(numeric_name(OsStr::new("")), None);
        assert_eq!(numeric_name(OsStr::new("12a")), None);
        assert_eq!(numeric_name(OsStr::new(".staging-0042")), None);
        assert_eq!(numeric_name(OsStr::new("-3")), None);
    }
}
