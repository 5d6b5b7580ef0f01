use std::io::Write;

use anyhow::{Context, Result};

use crate::playback::InputTarget;
use crate::trace::TerminalRenderer;

/// Echo keystrokes to a terminal, redrawing only what changed.
#[derive(Debug)]
pub struct TerminalTarget<W: Write> {
    out: W,
    buf: String,
    renderer: TerminalRenderer,
}

impl<W: Write> TerminalTarget<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buf: String::new(),
            renderer: TerminalRenderer::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.buf
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn redraw(&mut self) -> Result<()> {
        let diff = self.renderer.render(&self.buf);
        self.out
            .write_all(diff.as_bytes())
            .context("failed to write to terminal")?;
        self.out.flush().context("failed to flush terminal")
    }
}

impl<W: Write> InputTarget for TerminalTarget<W> {
    fn type_char(&mut self, c: char) -> Result<()> {
        self.buf.push(c);
        self.redraw()
    }

    fn press_backspace(&mut self) -> Result<()> {
        self.buf.pop();
        self.redraw()
    }
}
