use crate::theme::Color;
use crossterm::{
    cursor,
    style::{Print, ResetColor},
    terminal::{Clear, ClearType},
    QueueableCommand,
};
use std::io::{self, Write};
use unicode_segmentation::UnicodeSegmentation;

/// Escape-sequence buffer plus a model of where the terminal cursor is.
///
/// Drawing only appends to the buffer; `flush` writes it out. Rows count from
/// the prompt's first row, and column `width` means the row is full with a
/// wrap pending.
pub struct Output<W: Write> {
    sink: W,
    buf: Vec<u8>,
    width: usize,
    row: usize,
    col: usize,
    /// Highest row touched since the last clear; bounds what `clear` erases.
    rows_in_buffer: usize,
    /// Highest row that physically exists below the first one.
    rows_written: usize,
}

impl<W: Write> Output<W> {
    pub fn new(sink: W, width: usize) -> Self {
        Self {
            sink,
            buf: Vec::new(),
            width,
            row: 0,
            col: 0,
            rows_in_buffer: 0,
            rows_written: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Tracked `(row, col)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn uncommitted_rows(&self) -> usize {
        self.rows_in_buffer
    }

    pub fn written_rows(&self) -> usize {
        self.rows_written
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Append text one grapheme cluster at a time. Each cluster takes one column.
    pub fn write(&mut self, text: &str) {
        for g in text.graphemes(true) {
            if g == "\n" || g == "\r\n" {
                self.next_line();
                continue;
            }
            if self.col >= self.width {
                self.advance_row();
            }

            // Emulators disagree on how wide non-ASCII clusters are; pin the
            // cursor to exactly one column past where the cluster started.
            let pinned = !g.is_ascii();
            if pinned {
                let _ = self.buf.queue(cursor::SavePosition);
            }
            let _ = self.buf.queue(Print(g));
            if pinned {
                let _ = self.buf.queue(cursor::RestorePosition);
                let _ = self.buf.queue(cursor::MoveRight(1));
            }

            self.col += 1;
            self.touch();
        }
    }

    pub fn write_color(&mut self, text: &str, color: Color) {
        let _ = self.buf.queue(color.fg());
        self.write(text);
        let _ = self.buf.queue(ResetColor);
    }

    pub fn write_ln(&mut self, text: &str) {
        self.write(text);
        self.next_line();
    }

    pub fn write_color_ln(&mut self, text: &str, color: Color) {
        self.write_color(text, color);
        self.next_line();
    }

    /// Move to column 0 of the next row. A full row consumes its pending
    /// wrap here, so it never advances twice.
    pub fn next_line(&mut self) {
        self.advance_row();
    }

    fn advance_row(&mut self) {
        if self.row < self.rows_written {
            // The row below already exists from an earlier, taller render.
            self.move_to(self.row + 1, 0);
        } else {
            let _ = self.buf.queue(Print("\r\n"));
            self.row += 1;
            self.col = 0;
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.rows_in_buffer = self.rows_in_buffer.max(self.row);
        self.rows_written = self.rows_written.max(self.row);
    }

    /// Move to an absolute position, creating rows below if needed.
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        while self.rows_written < row {
            self.move_to(self.rows_written, 0);
            self.advance_row();
        }
        self.move_to(row, col.min(self.width));
    }

    pub fn move_cursor(&mut self, rows: isize, cols: isize) {
        let row = self.row.saturating_add_signed(rows);
        let col = self.col.saturating_add_signed(cols).min(self.width);
        self.move_to(row, col);
    }

    fn move_to(&mut self, row: usize, col: usize) {
        let mut from = self.col;
        if from >= self.width {
            // Terminals disagree on where a full row leaves the cursor.
            let _ = self.buf.queue(Print("\r"));
            from = 0;
        }
        let to = col.min(self.width.saturating_sub(1));
        if to < from {
            let _ = self.buf.queue(cursor::MoveLeft(steps(from - to)));
        } else if to > from {
            let _ = self.buf.queue(cursor::MoveRight(steps(to - from)));
        }
        if row < self.row {
            let _ = self.buf.queue(cursor::MoveUp(steps(self.row - row)));
        } else if row > self.row {
            let _ = self.buf.queue(cursor::MoveDown(steps(row - self.row)));
        }
        self.row = row;
        self.col = col;
    }

    pub fn hide_cursor(&mut self) {
        let _ = self.buf.queue(cursor::Hide);
    }

    pub fn show_cursor(&mut self) {
        let _ = self.buf.queue(cursor::Show);
    }

    /// Erase every row drawn since the last clear and return to the origin.
    /// Rows below stay known so later renders reuse them instead of adding more.
    pub fn clear(&mut self) {
        for row in 0..=self.rows_in_buffer {
            self.set_cursor(row, 0);
            let _ = self.buf.queue(Clear(ClearType::CurrentLine));
        }
        self.set_cursor(0, 0);
        self.rows_in_buffer = 0;
    }

    /// Leave the current render on screen and move below it.
    pub fn commit(&mut self) -> io::Result<()> {
        self.set_cursor(self.rows_in_buffer, 0);
        self.next_line();
        self.flush()
    }

    /// Erase a committed render so it can be drawn again from scratch.
    pub fn uncommit(&mut self) -> io::Result<()> {
        self.clear();
        self.rows_in_buffer = 0;
        self.rows_written = 0;
        self.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        let bytes = std::mem::take(&mut self.buf);
        self.sink.write_all(&bytes)?;
        self.sink.flush()
    }
}

fn steps(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(width: usize) -> Output<Vec<u8>> {
        Output::new(Vec::new(), width)
    }

    fn flushed(out: &mut Output<Vec<u8>>) -> String {
        out.flush().unwrap();
        String::from_utf8_lossy(out.get_ref()).into_owned()
    }

    fn screen(bytes: &[u8], width: u16) -> vt100::Parser {
        let mut parser = vt100::Parser::new(10, width, 0);
        parser.process(bytes);
        parser
    }

    #[test]
    fn write_tracks_column_and_wraps() {
        let mut out = output(5);
        out.write("abcdefg");
        assert_eq!(out.cursor(), (1, 2));
        assert_eq!(out.uncommitted_rows(), 1);
        assert_eq!(out.written_rows(), 1);
    }

    #[test]
    fn newline_in_text_moves_to_next_row() {
        let mut out = output(20);
        out.write("ab\ncd");
        assert_eq!(out.cursor(), (1, 2));
        assert!(flushed(&mut out).contains("ab\r\ncd"));
    }

    #[test]
    fn full_row_then_next_line_advances_once() {
        let mut out = output(3);
        out.write("abc");
        assert_eq!(out.cursor(), (0, 3));
        out.next_line();
        assert_eq!(out.cursor(), (1, 0));
        out.write("d");
        assert_eq!(out.cursor(), (1, 1));
        assert_eq!(out.written_rows(), 1);
    }

    #[test]
    fn moving_off_a_full_row_starts_from_column_zero() {
        let mut out = output(4);
        out.write("abcd");
        out.set_cursor(0, 1);
        out.write("X");
        assert_eq!(out.cursor(), (0, 2));
        let parser = screen(flushed(&mut out).as_bytes(), 4);
        assert_eq!(parser.screen().rows(0, 4).next().unwrap(), "aXcd");
    }

    #[test]
    fn non_ascii_clusters_are_pinned_to_one_column() {
        let mut out = output(20);
        out.write("e\u{301}x");
        assert_eq!(out.cursor(), (0, 2));
        assert_eq!(flushed(&mut out), "\x1b7e\u{301}\x1b8\x1b[1Cx");
    }

    #[test]
    fn zero_moves_emit_nothing() {
        let mut out = output(20);
        out.write("ab");
        out.flush().unwrap();
        let before = out.get_ref().len();
        out.move_cursor(0, 0);
        out.set_cursor(0, 2);
        assert_eq!(flushed(&mut out).len(), before);
    }

    #[test]
    fn clear_resets_cursor_but_remembers_rows() {
        let mut out = output(20);
        out.write("a\nb\nc");
        out.clear();
        out.flush().unwrap();
        assert_eq!(out.cursor(), (0, 0));
        assert_eq!(out.uncommitted_rows(), 0);
        assert_eq!(out.written_rows(), 2);
    }

    #[test]
    fn redraw_reuses_existing_rows() {
        let mut out = output(20);
        out.write("a\nb\nc");
        out.clear();
        out.flush().unwrap();
        let before = out.get_ref().len();

        out.write("x");
        out.next_line();
        assert_eq!(out.cursor(), (1, 0));
        let appended = &flushed(&mut out)[before..];
        assert!(!appended.contains("\r\n"), "{appended:?}");
    }

    #[test]
    fn set_cursor_creates_missing_rows() {
        let mut out = output(20);
        out.write("q");
        out.set_cursor(2, 1);
        assert_eq!(out.cursor(), (2, 1));
        assert_eq!(out.written_rows(), 2);
        assert_eq!(flushed(&mut out).matches("\r\n").count(), 2);
    }

    #[test]
    fn cleared_rows_are_blank_on_screen() {
        let mut out = output(20);
        out.write("hello\nworld");
        out.clear();
        out.write("hi");
        let parser = screen(flushed(&mut out).as_bytes(), 20);
        let rows: Vec<String> = parser.screen().rows(0, 20).take(2).collect();
        assert_eq!(rows[0].trim_end(), "hi");
        assert_eq!(rows[1].trim_end(), "");
        assert_eq!(parser.screen().cursor_position(), (0, 2));
    }

    #[test]
    fn colored_text_sets_and_resets_foreground() {
        let mut out = output(20);
        out.write_color("ok", Color::Cyan);
        let parser = screen(flushed(&mut out).as_bytes(), 20);
        let cell = parser.screen().cell(0, 0).unwrap();
        assert_eq!(cell.contents(), "o");
        assert_eq!(cell.fgcolor(), vt100::Color::Idx(6));
        assert_eq!(out.cursor(), (0, 2));
    }

    #[test]
    fn commit_then_uncommit_redraws_like_fresh() {
        fn render(out: &mut Output<Vec<u8>>) -> Vec<u8> {
            let start = out.get_ref().len();
            out.clear();
            out.write_color("? ", Color::Green);
            out.write_ln("Question");
            out.write("answer");
            out.flush().unwrap();
            out.get_ref()[start..].to_vec()
        }

        let mut fresh = output(40);
        let expected = render(&mut fresh);

        let mut out = output(40);
        render(&mut out);
        out.commit().unwrap();
        out.uncommit().unwrap();
        assert_eq!(out.cursor(), (0, 0));
        assert_eq!(render(&mut out), expected);
    }

    #[test]
    fn commit_leaves_render_and_moves_below() {
        let mut out = output(20);
        out.write("one\ntwo");
        out.commit().unwrap();
        assert_eq!(out.cursor(), (2, 0));
        let parser = screen(out.get_ref(), 20);
        let rows: Vec<String> = parser.screen().rows(0, 20).take(3).collect();
        assert_eq!(rows[0].trim_end(), "one");
        assert_eq!(rows[1].trim_end(), "two");
        assert_eq!(parser.screen().cursor_position(), (2, 0));
    }
}
