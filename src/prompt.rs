use std::io::{self, BufRead, Write};

/// An operator's answer to "replace this app?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Yes,
    No,
    AllYes,
    AllNo,
}

impl Decision {
    /// `y`/`Y` yes, `A` yes to all, `F` no to all, anything else no.
    pub fn from_answer(answer: &str) -> Decision {
        match answer.trim() {
            "y" | "Y" => Decision::Yes,
            "A" => Decision::AllYes,
            "F" => Decision::AllNo,
            _ => Decision::No,
        }
    }

    pub fn is_yes(self) -> bool { matches!(self, Decision::Yes | Decision::AllYes) }
    pub fn is_sticky(self) -> bool { matches!(self, Decision::AllYes | Decision::AllNo) }
}

/// Blocking line-based operator input.
pub trait Prompt {
    fn line(&mut self, question: &str) -> String;

    fn decide(&mut self, question: &str) -> Decision {
        Decision::from_answer(&self.line(question))
    }

    fn confirm(&mut self, question: &str) -> bool {
        matches!(self.line(question).trim(), "y" | "Y" | "yes" | "Yes")
    }
}

/// Reads answers from stdin. EOF reads as an empty answer.
pub struct Terminal;

impl Prompt for Terminal {
    fn line(&mut self, question: &str) -> String {
        print!("{question}");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        let _ = io::stdin().lock().read_line(&mut buf);
        buf.trim_end_matches(['\r', '\n']).to_string()
    }
}
