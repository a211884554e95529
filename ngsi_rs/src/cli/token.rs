//! Bidirectional cursor over the raw argument slice.

/// Index-based cursor used by every parse phase.
///
/// `next_arg` advances past the end at most one step, so a single `prev`
/// after exhausting the stream still lands on "nothing left" instead of
/// re-reading the last token.
#[derive(Debug, Clone)]
pub struct Token<'t> {
    args: &'t [String],
    cur: usize,
}

impl<'t> Token<'t> {
    pub fn new(args: &'t [String]) -> Self {
        Self { args, cur: 0 }
    }

    /// Return the current token and advance.
    pub fn next_arg(&mut self) -> Option<&'t str> {
        let len = self.args.len();
        if self.cur >= len {
            self.cur = (self.cur + 1).min(len + 1);
            return None;
        }
        let arg = self.args[self.cur].as_str();
        self.cur += 1;
        Some(arg)
    }

    /// Return the current token without advancing.
    pub fn peek(&self) -> Option<&'t str> {
        self.args.get(self.cur).map(String::as_str)
    }

    /// Step back one position and return the token found there.
    pub fn prev(&mut self) -> Option<&'t str> {
        if self.cur == 0 {
            return None;
        }
        self.cur -= 1;
        self.args.get(self.cur).map(String::as_str)
    }

    /// Last raw argument, regardless of cursor position.
    pub fn last(&self) -> Option<&'t str> {
        self.args.last().map(String::as_str)
    }
}
