//! Test doubles for the metadata service and the operator prompt

use crate::correction::Prompter;
use crate::error::{Error, Result};
use crate::media::{MediaClass, Timestamp};
use crate::time::MetadataService;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory metadata keyed by file name; records every write
#[derive(Debug, Default)]
pub struct FakeMetadata {
    dates: HashMap<String, String>,
    pub writes: RefCell<Vec<(PathBuf, Timestamp)>>,
    pub fail_writes: bool,
}

impl FakeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date(mut self, file_name: &str, value: &str) -> Self {
        self.dates.insert(file_name.to_string(), value.to_string());
        self
    }
}

impl MetadataService for FakeMetadata {
    fn read_datetime(&self, path: &Path, class: MediaClass) -> Option<String> {
        if !class.is_primary() {
            return None;
        }
        let name = path.file_name()?.to_str()?;
        self.dates.get(name).cloned()
    }

    fn write_datetime(&self, path: &Path, timestamp: Timestamp) -> Result<()> {
        if self.fail_writes {
            return Err(Error::ExifToolNotFound);
        }
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), timestamp));
        Ok(())
    }
}

/// Prompter answering from a fixed script; fails once the script runs out
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            questions: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}
