//! Lexical analysis (tokenization) of a single command line.
//!
//! The lexer turns raw text into argument strings following the usual shell
//! quoting rules: single quotes keep everything literal, double quotes keep
//! everything literal except a few backslash escapes, and a bare backslash
//! escapes the next character.

/// Characters a backslash may escape inside double quotes, as in POSIX
/// `sh` (Shell Command Language, 2.2.3 "Double-Quotes"). The newline case
/// does not apply since input is one line.
///
/// Before any other character the backslash is kept as literal text.
const DOUBLE_QUOTE_ESCAPABLE: [char; 4] = ['\\', '"', '$', '`'];

struct LexingFSM {
    in_single_quote: bool,
    in_double_quote: bool,
    pending_escape: bool,
    buffer: String,
    out: Vec<String>,
}

impl LexingFSM {
    fn new() -> Self {
        LexingFSM {
            in_single_quote: false,
            in_double_quote: false,
            pending_escape: false,
            buffer: String::new(),
            out: Vec::new(),
        }
    }

    /// Runs the state machine over `line` and returns the collected tokens.
    ///
    /// Unterminated quotes and a dangling backslash are not errors; whatever was
    /// accumulated up to the end of the line becomes the last token.
    fn make_tokens(mut self, line: &str) -> Vec<String> {
        for ch in line.chars() {
            match ch {
                '\'' => self.handle_single_quote(),
                '"' => self.handle_double_quote(),
                '\\' => self.handle_backslash(),
                ' ' => self.handle_space(),
                c => self.handle_other(c),
            }
        }

        self.flush();
        self.out
    }

    fn handle_single_quote(&mut self) {
        if self.pending_escape || self.in_double_quote {
            self.push_pending_backslash();
            self.buffer.push('\'');
        } else {
            self.in_single_quote = !self.in_single_quote;
        }
        self.pending_escape = false;
    }

    fn handle_double_quote(&mut self) {
        if self.pending_escape || self.in_single_quote {
            self.buffer.push('"');
        } else {
            self.in_double_quote = !self.in_double_quote;
        }
        self.pending_escape = false;
    }

    fn handle_backslash(&mut self) {
        if self.pending_escape || self.in_single_quote {
            self.buffer.push('\\');
            self.pending_escape = false;
        } else {
            self.pending_escape = true;
        }
    }

    fn handle_space(&mut self) {
        if self.in_single_quote || self.in_double_quote || self.pending_escape {
            self.push_pending_backslash();
            self.buffer.push(' ');
        } else {
            self.flush();
        }
        self.pending_escape = false;
    }

    fn handle_other(&mut self, ch: char) {
        if !DOUBLE_QUOTE_ESCAPABLE.contains(&ch) {
            self.push_pending_backslash();
        }
        self.buffer.push(ch);
        self.pending_escape = false;
    }

    /// Inside double quotes a backslash only escapes a handful of characters,
    /// so when it turns out to precede anything else it is emitted as text.
    fn push_pending_backslash(&mut self) {
        if self.pending_escape && self.in_double_quote {
            self.buffer.push('\\');
        }
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            self.out.push(std::mem::take(&mut self.buffer));
        }
    }
}

/// Splits a command line into its arguments.
///
/// This never fails: every input, including ones with unbalanced quotes,
/// produces a (possibly empty) list of tokens. Empty tokens are never
/// produced, so `''` on its own is dropped while `a''b` yields `ab`.
///
/// ```
/// assert_eq!(myshell::tokenize("echo 'a b' c"), ["echo", "a b", "c"]);
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    LexingFSM::new().make_tokens(line)
}
