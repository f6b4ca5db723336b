//! Terminal session driver.
//!
//! Reads one line per `You: ` prompt, hands it to a [`ChatBackend`] and
//! renders the turn's events as they arrive. The driver moves through
//! `Selecting → Chatting → Closed` and refuses to do anything once closed.

use async_trait::async_trait;
use console::style;
use skiff_agent::{AgentStreamEvent, Chat};
use skiff_core::error::SessionError;
use skiff_core::session::SessionId;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::menu::{AgentPicker, MENU_PROMPT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Selecting,
    Chatting,
    Closed,
}

/// What to do with one line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    Exit,
    Skip,
    Submit(String),
}

pub fn classify_line(line: &str) -> LineAction {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineAction::Skip
    } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        LineAction::Exit
    } else {
        LineAction::Submit(trimmed.to_string())
    }
}

/// Starts a turn and yields its events.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, input: &str) -> Result<mpsc::Receiver<AgentStreamEvent>, SessionError>;
}

#[async_trait]
impl ChatBackend for Chat {
    async fn send(&self, input: &str) -> Result<mpsc::Receiver<AgentStreamEvent>, SessionError> {
        Chat::send(self, input).await
    }
}

/// Writes one turn's events to the terminal.
#[derive(Debug, Default)]
pub struct TurnRenderer {
    started: bool,
    mid_line: bool,
}

impl TurnRenderer {
    /// Render one event. Returns `true` once the turn is over.
    pub fn render<W: Write>(&mut self, event: &AgentStreamEvent, out: &mut W) -> io::Result<bool> {
        match event {
            AgentStreamEvent::Content { text } => {
                if !self.started {
                    write!(out, "{}", style("🤖 Assistant: ").green().bold())?;
                    self.started = true;
                }
                write!(out, "{text}")?;
                self.mid_line = !text.ends_with('\n');
            }
            AgentStreamEvent::ToolCall { name, arguments } => {
                self.break_line(out)?;
                writeln!(
                    out,
                    "{} {} {}",
                    style("[Calling Tool]").yellow(),
                    style(name).yellow(),
                    style(arguments).dim()
                )?;
            }
            AgentStreamEvent::End => {
                self.break_line(out)?;
                writeln!(out)?;
            }
            AgentStreamEvent::Error { message } => {
                self.break_line(out)?;
                writeln!(out, "{}", style(format!("❌ Error: {message}")).red())?;
            }
        }
        out.flush()?;
        Ok(event.is_terminal())
    }

    fn break_line<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.mid_line {
            writeln!(out)?;
            self.mid_line = false;
        }
        Ok(())
    }
}

pub struct TerminalDriver<R, W> {
    lines: Lines<R>,
    out: W,
    state: DriverState,
}

impl TerminalDriver<BufReader<Stdin>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }
}

impl<R, W> TerminalDriver<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
            state: DriverState::Selecting,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Show the agent menu and start a session for the chosen entry.
    pub fn select(
        &mut self,
        picker: &dyn AgentPicker,
        choices: &[&str],
    ) -> Result<(usize, SessionId), SessionError> {
        self.ensure_open()?;
        let index = picker
            .pick(MENU_PROMPT, choices)?
            .filter(|i| *i < choices.len())
            .ok_or(SessionError::NoAgentSelected)?;
        let session = self.begin(choices[index])?;
        Ok((index, session))
    }

    /// Enter `Chatting` for the named agent and print the ready banner.
    pub fn begin(&mut self, agent_name: &str) -> Result<SessionId, SessionError> {
        self.ensure_open()?;
        let session = SessionId::for_agent(agent_name);
        writeln!(self.out)?;
        writeln!(self.out, "{}", style(format!("🚀 {agent_name} is ready!")).cyan().bold())?;
        writeln!(
            self.out,
            "{}",
            style("Type your message and press Enter. Type \"exit\" or \"quit\" to leave.").dim()
        )?;
        writeln!(self.out)?;
        self.state = DriverState::Chatting;
        info!(session = %session, agent = agent_name, "Chat session started");
        Ok(session)
    }

    /// Run the read-dispatch-render loop until exit or end of input.
    pub async fn run(&mut self, chat: &dyn ChatBackend) -> Result<(), SessionError> {
        match self.state {
            DriverState::Closed => return Err(SessionError::SessionClosed),
            DriverState::Selecting => return Err(SessionError::NoAgentSelected),
            DriverState::Chatting => {}
        }

        loop {
            write!(self.out, "{}", style("You: ").cyan().bold())?;
            self.out.flush()?;

            let Some(line) = self.lines.next_line().await? else {
                writeln!(self.out)?;
                writeln!(self.out, "Chat session ended.")?;
                self.close();
                return Ok(());
            };

            match classify_line(&line) {
                LineAction::Skip => continue,
                LineAction::Exit => {
                    writeln!(self.out, "👋 Goodbye!")?;
                    self.close();
                    return Ok(());
                }
                LineAction::Submit(text) => self.turn(chat, &text).await?,
            }
        }
    }

    pub fn close(&mut self) {
        if self.state != DriverState::Closed {
            info!("Chat session closed");
        }
        self.state = DriverState::Closed;
    }

    async fn turn(&mut self, chat: &dyn ChatBackend, text: &str) -> Result<(), SessionError> {
        writeln!(self.out, "{}", style("Assistant is thinking...").dim())?;
        let mut renderer = TurnRenderer::default();

        let mut events = match chat.send(text).await {
            Ok(events) => events,
            Err(e) => {
                let event = AgentStreamEvent::Error { message: e.to_string() };
                renderer.render(&event, &mut self.out)?;
                return Ok(());
            }
        };

        while let Some(event) = events.recv().await {
            if renderer.render(&event, &mut self.out)? {
                return Ok(());
            }
        }
        debug!("Turn channel closed without a final event");
        renderer.render(&AgentStreamEvent::End, &mut self.out)?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.state == DriverState::Closed {
            Err(SessionError::SessionClosed)
        } else {
            Ok(())
        }
    }
}
