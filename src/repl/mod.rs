use rustyline::history::MemHistory;
use rustyline::Editor;
use snafu::{ResultExt, Snafu};

use crate::config::Config;
use crate::model::LessonId;
use crate::service::api::{Api, ApiError};

pub use console::{CommandError, Console};
pub use player::SimulatedPlayer;

mod console;
mod parse;
mod player;
mod render;

pub struct Repl {
    inner: Editor<(), MemHistory>,
    message: Option<String>,
}

impl Repl {
    pub fn new() -> Result<Self, ReplError> {
        let config = rustyline::Config::default();
        let inner = Editor::with_history(config, MemHistory::new()).context(RustylineSnafu)?;

        Ok(Self {
            inner,
            message: None,
        })
    }

    /// Prints pending replies, then reads one command. A closed input reads as [Action::Exit].
    pub async fn prompt(&mut self) -> Action {
        let message = self
            .message
            .take()
            .map(|msg| format!("{msg}\n"))
            .unwrap_or_default();
        let prompt = format!("{message}lesson-watch> ");

        let Ok(input) = tokio::task::block_in_place(|| self.inner.readline(&prompt)) else {
            return Action::Exit;
        };

        self.inner.add_history_entry(input.clone()).ok();

        match parse::parse(&input) {
            Ok(action) => action,
            Err(err) => {
                self.reply(err.to_string());
                Action::None
            }
        }
    }

    pub fn reply(&mut self, message: String) {
        if let Some(msg) = self.message.as_mut() {
            msg.push('\n');
            msg.push_str(&message);
        } else {
            self.message = Some(message);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Action {
    Register {
        email: String,
        password: String,
        full_name: String,
    },
    Login {
        email: String,
        password: String,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: String,
        password: String,
    },
    WhoAmI,
    Dashboard,
    Files,
    Play(LessonId),
    Seek {
        lesson_id: LessonId,
        seconds: f64,
    },
    Pause(LessonId),
    End(LessonId),
    Done(LessonId),
    Pay {
        amount: f64,
        email: String,
    },
    Payment {
        payment_id: String,
    },
    Modules,
    Help,
    Exit,
    None,
}

#[derive(Debug, Snafu)]
pub enum ReplError {
    #[snafu(display("failed to initialize REPL: {}", source))]
    Rustyline {
        source: rustyline::error::ReadlineError,
    },

    #[snafu(display("cannot reach the course platform: {}", source))]
    Connect { source: ApiError },
}

pub async fn start(repl: &mut Repl, config: Config) -> Result<(), ReplError> {
    tracing::info!("starting REPL");

    let api = Api::connect(config.endpoints(), config.request_timeout).context(ConnectSnafu)?;
    let mut console = Console::new(api, config);

    repl.reply("type `help` for the list of commands".to_string());

    loop {
        match repl.prompt().await {
            Action::Exit => break,
            Action::None => continue,
            action => match console.run(action).await {
                Ok(Some(output)) => repl.reply(output),
                Ok(None) => {}
                Err(err) => {
                    tracing::error!("{}", err);
                    repl.reply(format!("error: {err}"));
                }
            },
        }
    }

    Ok(())
}
