use crate::metadata::MediaKind;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("operation cancelled by user")]
pub struct Cancelled;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    Cancel,
}

pub trait Prompter {
    fn ask_identity(&mut self, kind: MediaKind, file_name: &str, suggestion: &str)
        -> Option<String>;

    fn confirm_identity(&mut self, file_name: &str, identity: &str) -> Confirmation;

    fn confirm_correction(&mut self, file_name: &str, proposed: &str) -> Confirmation;
}
