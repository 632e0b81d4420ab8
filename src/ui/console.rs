//! Line-oriented rendering of app snapshots.
//!
//! The renderer remembers what it has already written and only prints the
//! difference: new notices, new messages, and the words of an answer as
//! they are revealed. A replaced log (new session or reloaded history) is
//! printed again from the top. Notices raised while an answer is being
//! revealed wait until that answer's line is finished.

use std::io::{self, Write};

use crate::core::app::{AppSnapshot, NoticeKind};
use crate::core::message::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PartialAnswer {
    reveal_id: u64,
    /// Bytes of the answer already written.
    printed: usize,
}

pub struct ConsoleRenderer<W: Write> {
    out: W,
    last_notice_id: u64,
    log_generation: u64,
    printed_messages: usize,
    partial: Option<PartialAnswer>,
    /// True while the cursor sits at the end of an unterminated answer line.
    line_open: bool,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_notice_id: 0,
            log_generation: 0,
            printed_messages: 0,
            partial: None,
            line_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&mut self, snapshot: &AppSnapshot) -> io::Result<()> {
        self.render_log(snapshot)?;
        self.render_notices(snapshot)?;
        self.render_reveal(snapshot)?;
        self.out.flush()
    }

    fn close_line(&mut self) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        Ok(())
    }

    fn render_notices(&mut self, snapshot: &AppSnapshot) -> io::Result<()> {
        if snapshot.reveal.is_some() {
            return Ok(());
        }
        for notice in &snapshot.notices {
            if notice.id <= self.last_notice_id {
                continue;
            }
            self.last_notice_id = notice.id;
            self.close_line()?;
            match notice.kind {
                NoticeKind::Info => writeln!(self.out, "{}", notice.text)?,
                NoticeKind::Guidance => writeln!(self.out, "! {}", notice.text)?,
                NoticeKind::Banner => writeln!(self.out, "Error: {}", notice.text)?,
            }
        }
        Ok(())
    }

    fn render_log(&mut self, snapshot: &AppSnapshot) -> io::Result<()> {
        if snapshot.log_generation != self.log_generation {
            self.log_generation = snapshot.log_generation;
            self.close_line()?;
            self.partial = None;
            self.printed_messages = 0;
            if !snapshot.messages.is_empty() {
                let title = snapshot
                    .document
                    .as_ref()
                    .map(|document| document.file_name.as_str())
                    .unwrap_or("chat");
                writeln!(self.out, "--- {title} ---")?;
            }
        }

        let start = self.printed_messages.min(snapshot.messages.len());
        for message in &snapshot.messages[start..] {
            self.print_message(message)?;
        }
        self.printed_messages = snapshot.messages.len();

        // The reveal ended without producing a message, e.g. it was cancelled.
        if snapshot.reveal.is_none() && self.partial.take().is_some() {
            self.close_line()?;
        }
        Ok(())
    }

    fn print_message(&mut self, message: &Message) -> io::Result<()> {
        if message.is_assistant() {
            if let Some(partial) = self.partial.take() {
                // Finish the answer that was being revealed in place.
                let rest = message.content.get(partial.printed..).unwrap_or("");
                write!(self.out, "{rest}")?;
                self.line_open = true;
                return self.close_line();
            }
        }
        self.close_line()?;
        if message.is_user() {
            writeln!(self.out, "You: {}", message.content)
        } else {
            writeln!(self.out, "{}", message.content)
        }
    }

    fn render_reveal(&mut self, snapshot: &AppSnapshot) -> io::Result<()> {
        let Some(view) = &snapshot.reveal else {
            return Ok(());
        };

        let printed = match &self.partial {
            Some(partial) if partial.reveal_id == view.reveal_id => partial.printed,
            _ => {
                self.close_line()?;
                0
            }
        };

        if let Some(rest) = view.text.get(printed..) {
            if !rest.is_empty() {
                write!(self.out, "{rest}")?;
                self.line_open = true;
            }
        }
        self.partial = Some(PartialAnswer {
            reveal_id: view.reveal_id,
            printed: printed.max(view.text.len()),
        });
        Ok(())
    }
}
