use std::mem;

/// The two metadata fields, always entered in this order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryField {
    ForceZ,
    Label,
}

impl EntryField {
    pub fn name(self) -> &'static str {
        match self {
            EntryField::ForceZ => "force_z",
            EntryField::Label => "label",
        }
    }
}

/// Keys the machine reacts to. Anything else never reaches it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKey {
    Confirm,
    Delete,
    Digit(char),
    Point,
}

/// Result of feeding one key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntryStep {
    /// Still collecting; repaint the prompt.
    Pending,
    /// Both fields confirmed; the raw texts are handed back for parsing.
    Finalized { force_z: String, label: String },
}

/// Two-field entry pipeline: `force_z`, then `label`. There is no cancel
/// and no way back to the first field; confirming the second always
/// finalizes, valid or not.
#[derive(Debug)]
pub struct EntryMachine {
    field: EntryField,
    buffer: String,
    force_z: Option<String>,
}

impl EntryMachine {
    pub fn new() -> Self {
        Self {
            field: EntryField::ForceZ,
            buffer: String::new(),
            force_z: None,
        }
    }

    pub fn field(&self) -> EntryField {
        self.field
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// First prompt line shown while entering.
    pub fn prompt(&self) -> String {
        format!("Enter {}: {}", self.field.name(), self.buffer)
    }

    pub fn feed(&mut self, key: EntryKey) -> EntryStep {
        match key {
            EntryKey::Confirm => self.confirm(),
            EntryKey::Delete => {
                // Deleting from an empty buffer is a no-op.
                self.buffer.pop();
                EntryStep::Pending
            }
            EntryKey::Digit(digit) => {
                self.buffer.push(digit);
                EntryStep::Pending
            }
            EntryKey::Point => {
                // At most one decimal point per buffer. Placement is not
                // checked here; parsing decides validity later.
                if !self.buffer.contains('.') {
                    self.buffer.push('.');
                }
                EntryStep::Pending
            }
        }
    }

    fn confirm(&mut self) -> EntryStep {
        match self.field {
            EntryField::ForceZ => {
                self.force_z = Some(mem::take(&mut self.buffer));
                self.field = EntryField::Label;
                EntryStep::Pending
            }
            EntryField::Label => EntryStep::Finalized {
                force_z: self.force_z.take().unwrap_or_default(),
                label: mem::take(&mut self.buffer),
            },
        }
    }
}

impl Default for EntryMachine {
    fn default() -> Self {
        Self::new()
    }
}
