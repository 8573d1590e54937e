use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use chatdock_core::{DockSide, Entry, EntryKind, Side, VoiceIndicator, WidgetView};
use chatdock_engine::ViewSink;

const PANEL_WIDTH: usize = 64;
const DOCK_MARGIN: usize = 16;

/// Prints the widget to a terminal: new bubbles as they arrive, a full
/// reprint when the transcript is replaced, and a status line on change.
pub(crate) struct TerminalSurface {
    out: Mutex<Printed>,
}

struct Printed {
    writer: Box<dyn Write + Send>,
    bubbles: Vec<Entry>,
    status: Option<String>,
}

impl TerminalSurface {
    pub(crate) fn stdout() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub(crate) fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(Printed {
                writer,
                bubbles: Vec::new(),
                status: None,
            }),
        }
    }
}

impl ViewSink for TerminalSurface {
    fn render(&self, view: &WidgetView) {
        let mut printed = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let lines = render_lines(&printed.bubbles, printed.status.as_deref(), view);
        for line in &lines {
            let _ = writeln!(printed.writer, "{line}");
        }
        let _ = printed.writer.flush();
        printed.bubbles = view.bubbles.clone();
        printed.status = Some(status_text(view));
    }
}

/// Lines to print to move the screen from what was printed to `view`.
fn render_lines(
    previous: &[Entry],
    previous_status: Option<&str>,
    view: &WidgetView,
) -> Vec<String> {
    let mut lines = Vec::new();

    let fresh = if view.bubbles.starts_with(previous) {
        &view.bubbles[previous.len()..]
    } else {
        lines.push(rule(view.dock, "transcript"));
        &view.bubbles[..]
    };
    lines.extend(fresh.iter().map(|entry| bubble_line(entry, view.dock)));

    let status = status_text(view);
    if previous_status != Some(status.as_str()) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        lines.push(indent(view.dock, &format!("[{stamp}] {status}")));
    }
    lines
}

fn status_text(view: &WidgetView) -> String {
    let voice = match view.voice {
        VoiceIndicator::Unavailable => "off",
        VoiceIndicator::Ready => "ready",
        VoiceIndicator::Busy => "busy",
        VoiceIndicator::Recording => "RECORDING",
        VoiceIndicator::Playing => "playing",
    };
    let input = if view.input_enabled {
        "ready"
    } else {
        "waiting for reply"
    };
    format!("{} | voice: {} | input: {}", view.connection, voice, input)
}

fn bubble_line(entry: &Entry, dock: DockSide) -> String {
    let text = match entry.kind {
        EntryKind::Chat => entry.text.clone(),
        EntryKind::Diagnostic => format!("! {}", entry.text),
    };
    let body = match entry.side {
        Side::Leading => format!("< {text}"),
        Side::Trailing => format!("{text:>width$} >", width = PANEL_WIDTH.saturating_sub(2)),
    };
    indent(dock, &body)
}

fn rule(dock: DockSide, label: &str) -> String {
    indent(dock, &format!("{:-^width$}", format!(" {label} "), width = PANEL_WIDTH))
}

fn indent(dock: DockSide, line: &str) -> String {
    match dock {
        DockSide::Left => line.to_string(),
        DockSide::Right => format!("{}{line}", " ".repeat(DOCK_MARGIN)),
    }
}

#[cfg(test)]
mod tests {
    use chatdock_core::{
        ConnectionStatus, DockSide, Entry, EntryKind, Side, SubmitGate, VoiceIndicator, WidgetView,
    };

    use super::render_lines;

    fn chat(side: Side, text: &str) -> Entry {
        Entry {
            side,
            text: text.to_string(),
            kind: EntryKind::Chat,
        }
    }

    fn view(bubbles: Vec<Entry>) -> WidgetView {
        WidgetView {
            bubbles,
            connection: ConnectionStatus::Online,
            input_enabled: true,
            gate: SubmitGate::Idle,
            voice: VoiceIndicator::Ready,
            dock: DockSide::Left,
        }
    }

    #[test]
    fn appended_bubbles_print_only_the_new_ones() {
        let first = vec![chat(Side::Trailing, "hi")];
        let next = view(vec![first[0].clone(), chat(Side::Leading, "hello")]);

        let lines = render_lines(&first, Some("online | voice: ready | input: ready"), &next);

        assert_eq!(lines, vec!["< hello".to_string()]);
    }

    #[test]
    fn replaced_transcript_is_reprinted_under_a_rule() {
        let printed = vec![chat(Side::Trailing, "draft")];
        let next = view(vec![chat(Side::Leading, "fresh")]);

        let lines = render_lines(&printed, Some("online | voice: ready | input: ready"), &next);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" transcript "));
        assert_eq!(lines[1], "< fresh");
    }

    #[test]
    fn user_bubbles_are_right_aligned_and_status_changes_are_stamped() {
        let mut next = view(vec![chat(Side::Trailing, "hi")]);
        next.input_enabled = false;
        next.dock = DockSide::Right;

        let lines = render_lines(&[], None, &next);

        assert!(lines[0].ends_with("hi >"));
        assert!(lines[0].starts_with(&" ".repeat(16)));
        assert!(lines[1].ends_with("online | voice: ready | input: waiting for reply"));
    }
}
