//! Line editor support: slash-command completion, hints and colouring.

use std::borrow::Cow;

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::commands::COMMANDS;

#[derive(Clone, Copy, Default)]
pub struct CommandHelper;

impl CommandHelper {
    /// The partial command under the cursor, if the line is still a bare `/word`.
    fn partial<'l>(line: &'l str, pos: usize) -> Option<&'l str> {
        let typed = &line[..pos];
        (typed.starts_with('/') && !typed.contains(char::is_whitespace)).then_some(typed)
    }

    fn candidates(partial: &str) -> impl Iterator<Item = &'static str> + '_ {
        COMMANDS.iter().copied().filter(move |cmd| cmd.starts_with(partial))
    }
}

impl Helper for CommandHelper {}

impl Validator for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let pairs = Self::partial(line, pos)
            .map(|partial| {
                Self::candidates(partial)
                    .map(|cmd| Pair {
                        display: cmd.to_string(),
                        replacement: cmd.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok((0, pairs))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let partial = Self::partial(line, pos)?;
        Self::candidates(partial)
            .find(|cmd| cmd.len() > partial.len())
            .map(|cmd| cmd[partial.len()..].to_string())
    }
}

impl Highlighter for CommandHelper {
    /// Colours the command word; arguments and chat text stay plain.
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Cow::Borrowed(line);
        }
        let split = line.find(char::is_whitespace).unwrap_or(line.len());
        let (word, rest) = line.split_at(split);
        Cow::Owned(format!("{}{}", word.bright_cyan(), rest))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_only_for_bare_commands() {
        assert_eq!(CommandHelper::partial("/re", 3), Some("/re"));
        assert_eq!(CommandHelper::partial("/regime o", 9), None);
        assert_eq!(CommandHelper::partial("hello", 5), None);
    }

    #[test]
    fn test_candidates_by_prefix() {
        let found: Vec<&str> = CommandHelper::candidates("/re").collect();
        assert_eq!(found, vec!["/regime", "/retry-chat"]);
    }

    #[test]
    fn test_highlight_leaves_chat_text_alone() {
        let helper = CommandHelper;
        assert!(matches!(helper.highlight("hello", 0), Cow::Borrowed("hello")));
    }
}
