use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Frame, layout::Rect, style::Style};
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    form::RenderContext,
    presentation::{self, BodyView, Theme, UiContext},
};

use super::{
    clipboard::ClipboardSink,
    invoke::{CallCompletion, CallDispatcher},
    navigator::{NavEffect, NavEvent, Navigator, Screen},
    options::UiOptions,
    status::StatusTone,
    terminal::TerminalGuard,
};

pub(crate) struct App {
    navigator: Navigator,
    options: UiOptions,
    dispatcher: CallDispatcher,
    completions: UnboundedReceiver<CallCompletion>,
    clipboard: Box<dyn ClipboardSink>,
    in_flight: Option<JoinHandle<()>>,
    should_quit: bool,
}

impl App {
    pub fn new(
        navigator: Navigator,
        dispatcher: CallDispatcher,
        completions: UnboundedReceiver<CallCompletion>,
        clipboard: Box<dyn ClipboardSink>,
        options: UiOptions,
    ) -> Self {
        Self {
            navigator,
            options,
            dispatcher,
            completions,
            clipboard,
            in_flight: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = TerminalGuard::new()?;
        let size = terminal.size()?;
        self.navigator
            .handle_event(NavEvent::Resize(size.width, size.height));
        while !self.should_quit {
            self.drain_completions();
            terminal.draw(|frame| self.draw(frame))?;
            if !event::poll(self.options.tick_rate)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Paste(text) => self.handle_paste(&text),
                Event::Resize(width, height) => {
                    terminal.resize(Rect::new(0, 0, width, height))?;
                    self.navigator
                        .handle_event(NavEvent::Resize(width, height));
                }
                Event::Mouse(_) | Event::FocusGained | Event::FocusLost => {}
            }
        }
        if let Some(call) = self.in_flight.take() {
            call.abort();
        }
        info!("leaving explorer");
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let effect = self.navigator.handle_event(NavEvent::Key(key));
        self.apply(effect);
    }

    /// Pasted text reaches a focused text editor one character at a time.
    fn handle_paste(&mut self, text: &str) {
        if !self.navigator.accepts_text_input() {
            return;
        }
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            self.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }

    fn apply(&mut self, effect: NavEffect) {
        match effect {
            NavEffect::None => {}
            NavEffect::Invoke { session, request } => {
                self.in_flight = Some(self.dispatcher.dispatch(session, request));
            }
            NavEffect::Copy(text) => {
                if let Err(err) = self.clipboard.copy(&text) {
                    warn!(error = %err, "copy failed");
                    self.navigator.report_error(format!("Copy failed: {err:#}"));
                }
            }
            NavEffect::Quit => self.should_quit = true,
        }
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.completions.try_recv() {
            self.navigator.handle_event(NavEvent::Completed(completion));
        }
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let nav = &self.navigator;
        let help = if self.options.show_help {
            nav.help()
        } else {
            None
        };
        let (title, body, dirty) = match (nav.screen(), nav.form()) {
            (Screen::Form, Some(form)) => (
                form.title(),
                BodyView::Form(form.render(&RenderContext::new(self.options.theme))),
                form.is_dirty(),
            ),
            (Screen::Methods, _) => (
                format!("{} methods", nav.current_service().unwrap_or_default()),
                BodyView::Picker {
                    items: nav
                        .methods()
                        .iter()
                        .map(|method| method.name.as_str())
                        .collect(),
                    selected: nav.method_index(),
                    empty: "No methods.",
                },
                false,
            ),
            _ => (
                "Services".to_string(),
                BodyView::Picker {
                    items: nav.services().iter().map(String::as_str).collect(),
                    selected: nav.service_index(),
                    empty: "No services.",
                },
                false,
            ),
        };
        presentation::draw(
            frame,
            UiContext {
                title: &title,
                body,
                status_message: nav.status().message(),
                status_style: status_style(nav.status().tone(), &self.options.theme),
                dirty,
                help: help.as_deref(),
                theme: &self.options.theme,
            },
        );
    }
}

fn status_style(tone: StatusTone, theme: &Theme) -> Style {
    match tone {
        StatusTone::Info => Style::default(),
        StatusTone::Busy => theme.placeholder,
        StatusTone::Success => theme.focused,
        StatusTone::Failure => theme.error,
    }
}
