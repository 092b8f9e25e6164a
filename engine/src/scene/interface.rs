use std::collections::VecDeque;

/// Where scenes write text and ask for decisions.
pub trait Interface {
    fn show(&mut self, text: &str);

    /// Index into `options`. Callers clamp out-of-range answers.
    fn choose(&mut self, prompt: &str, options: &[String]) -> usize;

    /// "Press enter to continue".
    fn pause(&mut self) {}
}

/// Replays queued answers, then keeps picking the first option. Everything
/// shown is kept in a transcript.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInterface {
    answers: VecDeque<usize>,
    transcript: Vec<String>,
}

impl ScriptedInterface {
    pub fn new(answers: impl IntoIterator<Item = usize>) -> Self {
        Self { answers: answers.into_iter().collect(), transcript: Vec::new() }
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn remaining_answers(&self) -> usize {
        self.answers.len()
    }
}

impl Interface for ScriptedInterface {
    fn show(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }

    fn choose(&mut self, prompt: &str, options: &[String]) -> usize {
        let pick = self.answers.pop_front().unwrap_or(0).min(options.len().saturating_sub(1));
        let picked = options.get(pick).map_or("", String::as_str);
        self.transcript.push(format!("{prompt} -> {picked}"));
        pick
    }
}
