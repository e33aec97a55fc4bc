//! Yes/no confirmation read from an injectable line source

use std::io::{self, BufRead, BufReader, Write};
use std::sync::{Mutex, MutexGuard};

type Input = Box<dyn BufRead + Send>;
type Output = Box<dyn Write + Send>;

/// Asks the operator before a mutating step
///
/// Only `yes` (any case, surrounding whitespace ignored) confirms. An empty
/// line or end of input declines.
pub struct Confirmation {
    input: Mutex<Input>,
    output: Mutex<Output>,
}

impl Confirmation {
    pub fn new(input: impl BufRead + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self {
            input: Mutex::new(Box::new(input)),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Prompts on stderr so stdout stays free for command output
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }

    /// Returns `true` without prompting when `interactive` is false
    pub fn confirm(&self, interactive: bool, message: &str) -> io::Result<bool> {
        if !interactive {
            return Ok(true);
        }

        {
            let mut output = lock(&self.output)?;
            write!(output, "{} (yes/no): ", message)?;
            output.flush()?;
        }

        let mut line = String::new();
        let read = lock(&self.input)?.read_line(&mut line)?;
        if read == 0 {
            return Ok(false);
        }
        Ok(is_affirmative(&line))
    }
}

impl std::fmt::Debug for Confirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Confirmation").finish_non_exhaustive()
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

fn lock<T>(mutex: &Mutex<T>) -> io::Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "confirmation stream lock poisoned"))
}
