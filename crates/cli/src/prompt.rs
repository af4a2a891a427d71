use media_renamer_core::{Confirmation, MediaKind, Prompter, RuleSelection};
use std::io::{self, BufRead, Write};
use std::path::Path;

pub struct ConsolePrompter {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::with_io(Box::new(io::stdin().lock()), Box::new(io::stderr()))
    }
}

impl ConsolePrompter {
    pub fn with_io(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self { input, output }
    }

    pub fn confirm_parameters(&mut self, folder: &Path, selection: &RuleSelection) -> bool {
        self.say(&format!("Folder: {}", folder.display()));
        self.say(&format!("Rule:   {}", selection.kind.label()));
        if let Some(regex) = &selection.regex {
            self.say(&format!("Regex:  {}", regex));
        }
        if let Some(replacement) = &selection.replacement {
            self.say(&format!("Replacement: '{}'", replacement));
        }
        if let Some(minutes) = &selection.minutes {
            self.say(&format!("Minutes: {}", minutes));
        }
        self.confirm("Proceed with renaming? [y/n]") == Confirmation::Yes
    }

    fn say(&mut self, line: &str) {
        let _ = writeln!(self.output, "{}", line);
    }

    fn read_answer(&mut self, question: &str) -> Option<String> {
        let _ = write!(self.output, "{} ", question);
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn confirm(&mut self, question: &str) -> Confirmation {
        loop {
            let Some(answer) = self.read_answer(question) else {
                return Confirmation::Cancel;
            };
            match answer.to_lowercase().as_str() {
                "y" | "yes" => return Confirmation::Yes,
                "n" | "no" => return Confirmation::No,
                "c" | "cancel" => return Confirmation::Cancel,
                _ => self.say("Please answer y, n or c."),
            }
        }
    }
}

impl Prompter for ConsolePrompter {
    fn ask_identity(
        &mut self,
        kind: MediaKind,
        file_name: &str,
        suggestion: &str,
    ) -> Option<String> {
        let noun = match kind {
            MediaKind::Photo => "camera model",
            MediaKind::Video => "video source",
        };
        let answer = self.read_answer(&format!(
            "Please insert {} for file {} [{}]:",
            noun, file_name, suggestion
        ))?;
        if answer.is_empty() {
            Some(suggestion.to_string())
        } else {
            Some(answer)
        }
    }

    fn confirm_identity(&mut self, file_name: &str, identity: &str) -> Confirmation {
        self.confirm(&format!(
            "Use '{}' for {}? [y/n/c]",
            identity, file_name
        ))
    }

    fn confirm_correction(&mut self, file_name: &str, proposed: &str) -> Confirmation {
        self.confirm(&format!(
            "{} should be named {}. Rename? [y/n/c]",
            file_name, proposed
        ))
    }
}
