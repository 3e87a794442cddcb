//! Line-oriented REPL. Every line is compiled and run on its own.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;

use crate::config::Config;
use crate::{interpret_with, InterpretResult};

const HISTORY_FILE: &str = ".clox_history";

const PROMPT: &str = "> ";

pub struct Repl {
    config: Config,
    history: Vec<String>,
    history_file: Option<PathBuf>,
}

impl Repl {
    pub fn new(config: Config) -> Self {
        let mut repl = Self {
            config,
            history: Vec::new(),
            history_file: Some(Self::get_history_path()),
        };
        repl.load_history();
        repl
    }

    /// A REPL that neither reads nor writes a history file.
    pub fn without_history(config: Config) -> Self {
        Self {
            config,
            history: Vec::new(),
            history_file: None,
        }
    }

    fn get_history_path() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            home.join(HISTORY_FILE)
        } else {
            PathBuf::from(HISTORY_FILE)
        }
    }

    fn load_history(&mut self) {
        let Some(path) = &self.history_file else {
            return;
        };
        if let Ok(content) = std::fs::read_to_string(path) {
            self.history.extend(
                content
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string),
            );
        }
    }

    fn save_history(&self) {
        let Some(path) = &self.history_file else {
            return;
        };
        let mut content = self.history.join("\n");
        content.push('\n');
        if let Err(e) = std::fs::write(path, content) {
            tracing::warn!(path = %path.display(), error = %e, "could not save REPL history");
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Run against the terminal.
    pub fn run(&mut self) -> io::Result<()> {
        println!("{}", "clox REPL. Type 'exit' or press Ctrl-D to quit.".dimmed());
        let stdin = io::stdin();
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.run_with(stdin.lock(), &mut stdout.lock(), &mut stderr.lock())
    }

    /// Read lines from `input` until `exit` or end of input.
    pub fn run_with<R: BufRead>(
        &mut self,
        mut input: R,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> io::Result<()> {
        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            if line == "exit" {
                break;
            }

            self.history.push(line.to_string());
            let result = interpret_with(line, &self.config, out, err);
            if result != InterpretResult::Ok {
                tracing::debug!(?result, "line failed");
            }
        }

        self.save_history();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn session(input: &str) -> (Repl, String, String) {
        colored::control::set_override(false);
        let mut repl = Repl::without_history(Config::default());
        let mut out = Vec::new();
        let mut err = Vec::new();
        repl.run_with(Cursor::new(input), &mut out, &mut err).unwrap();
        (
            repl,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_evaluates_each_line() {
        let (repl, out, err) = session("1 + 2\n\n(4 - 2) * 3\n");
        assert_eq!(out, "> 3\n> > 6\n> \n");
        assert_eq!(err, "");
        assert_eq!(repl.history(), &["1 + 2", "(4 - 2) * 3"]);
    }

    #[test]
    fn test_errors_do_not_stop_the_session() {
        let (_, out, err) = session("1 +\n2 * 2\nexit\n3\n");
        assert_eq!(out, "> > 4\n> ");
        assert_eq!(err, "[line 1] Error at end: Expect expression.\n");
    }
}
