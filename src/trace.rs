const ERASE_CHAR: &str = "\x08 \x08";
const CURSOR_UP: &str = "\x1b[A";
const CLEAR_TO_END: &str = "\r\x1b[J";

fn cursor_to_column(col: usize) -> String {
    format!("\x1b[{col}G")
}

fn last_line_len(text: &str) -> usize {
    text.rsplit('\n')
        .next()
        .map(|line| line.chars().count())
        .unwrap_or(0)
}

/// Terminal output that turns the screen showing `prev` into `next`.
///
/// - Appended text is written as-is.
/// - Removed characters are erased one by one; erasing a newline moves the
///   cursor up and to the end of the line above.
/// - Anything else clears the block and redraws `next`.
pub fn render_transition(prev: &str, next: &str) -> String {
    if let Some(added) = next.strip_prefix(prev) {
        return added.to_string();
    }

    if let Some(removed) = prev.strip_prefix(next) {
        let mut out = String::new();
        let mut remaining: Vec<char> = prev.chars().collect();
        for c in removed.chars().rev() {
            remaining.pop();
            if c == '\n' {
                let remaining_text: String = remaining.iter().collect();
                out.push_str(CURSOR_UP);
                out.push_str(&cursor_to_column(last_line_len(&remaining_text) + 1));
            } else {
                out.push_str(ERASE_CHAR);
            }
        }
        return out;
    }

    let mut out = String::new();
    let prev_lines = prev.matches('\n').count();
    if prev_lines > 0 {
        out.push_str(&format!("\x1b[{prev_lines}A"));
    }
    out.push_str(CLEAR_TO_END);
    out.push_str(next);
    out
}

/// Remembers what is on screen so each snapshot only costs a diff.
#[derive(Debug, Default, Clone)]
pub struct TerminalRenderer {
    current: String,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn render(&mut self, snapshot: &str) -> String {
        let out = render_transition(&self.current, snapshot);
        self.current.clear();
        self.current.push_str(snapshot);
        out
    }
}
