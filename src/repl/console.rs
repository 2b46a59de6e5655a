use std::collections::HashMap;
use std::sync::Arc;

use snafu::{OptionExt, Snafu};
use tokio::task::JoinHandle;
use tracing::instrument;

use super::{player::SimulatedPlayer, render, Action};
use crate::config::Config;
use crate::model::{LessonId, PaymentRequest, Registration, Session};
use crate::service::api::{Api, ApiError, PollPolicy};
use crate::service::dashboard::{DashboardState, DashboardView};
use crate::service::reporter::ProgressReporter;
use crate::service::sampler::{PlaybackEvent, PlaybackSampler, Player};

const HELP: &str = "\
commands:
  register <email> <password> <full name>   login <email> <password>   whoami
  forgot <email>   reset <token> <new password>
  dashboard   files   done <lesson>
  play <lesson>   seek <lesson> <seconds>   pause <lesson>   end <lesson>
  pay <amount> <email>   payment <id>   modules   exit";

#[derive(Debug, Snafu)]
pub enum CommandError {
    #[snafu(display("sign in first with `login` or `register`"))]
    SignedOut,

    #[snafu(display("lesson {lesson_id} is not on the dashboard"))]
    UnknownLesson { lesson_id: LessonId },

    #[snafu(display("lesson {lesson_id} has not been started"))]
    NotStarted { lesson_id: LessonId },

    #[snafu(transparent)]
    Api { source: ApiError },
}

/// Everything that lives for one signed-in learner. Dropping it stops its sampling timers.
struct Learner {
    dashboard: Arc<DashboardState>,
    sampler: PlaybackSampler,
    players: HashMap<LessonId, Arc<SimulatedPlayer>>,
    follower: JoinHandle<()>,
}

impl Learner {
    async fn open(api: &Api, config: &Config, session: &Session) -> Self {
        let learner = Arc::new(api.learner(session));
        let (reporter, events) = ProgressReporter::with_events(learner.clone());

        let dashboard = Arc::new(DashboardState::new(
            learner,
            reporter.clone(),
            config.purchase_url.clone(),
        ));
        let follower = dashboard.clone().follow(events);
        let sampler = PlaybackSampler::new(reporter, config.sample_interval, config.completion_threshold);

        dashboard.load_all().await;

        Self {
            dashboard,
            sampler,
            players: HashMap::new(),
            follower,
        }
    }

    /// The lesson's player, created on first use at the position the server last saw.
    async fn player(&mut self, lesson_id: LessonId) -> Result<Arc<SimulatedPlayer>, CommandError> {
        if let Some(player) = self.players.get(&lesson_id) {
            return Ok(player.clone());
        }

        let DashboardView::Ready(course) = self.dashboard.view().await else {
            return UnknownLessonSnafu { lesson_id }.fail();
        };
        let lesson = course.lesson(lesson_id).context(UnknownLessonSnafu { lesson_id })?;

        let player = Arc::new(SimulatedPlayer::new(lesson.duration_seconds()));
        player.seek(lesson.progress.watch_time_seconds as f64);

        self.sampler.attach(lesson_id, player.clone());
        self.players.insert(lesson_id, player.clone());

        Ok(player)
    }

    fn started(&self, lesson_id: LessonId) -> Result<Arc<SimulatedPlayer>, CommandError> {
        self.players
            .get(&lesson_id)
            .cloned()
            .context(NotStartedSnafu { lesson_id })
    }
}

impl Drop for Learner {
    fn drop(&mut self) {
        self.follower.abort();
    }
}

/// Executes console commands against the remote services.
pub struct Console {
    api: Api,
    config: Config,
    session: Option<Session>,
    learner: Option<Learner>,
}

impl Console {
    pub fn new(api: Api, config: Config) -> Self {
        Self {
            api,
            config,
            session: None,
            learner: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Runs one command and returns what to show, if anything.
    #[instrument(skip_all)]
    pub async fn run(&mut self, action: Action) -> Result<Option<String>, CommandError> {
        let output = match action {
            Action::Register {
                email,
                password,
                full_name,
            } => {
                let registration = Registration::new(email, password, full_name);
                let session = self.api.auth.register(&registration).await?;
                self.sign_in(session).await
            }
            Action::Login { email, password } => {
                let session = self.api.auth.login(&email, &password).await?;
                self.sign_in(session).await
            }
            Action::ForgotPassword { email } => self.api.recovery.request_reset(&email).await?,
            Action::ResetPassword { token, password } => {
                let message = self.api.recovery.confirm_reset(&token, &password).await?;
                format!("{message}\nsign in with `login`")
            }
            Action::WhoAmI => {
                let token = self.session.as_ref().context(SignedOutSnafu)?.token.clone();
                let user = self.api.auth.validate(token).await?.user;
                let role = if user.is_admin { ", administrator" } else { "" };
                format!("{} <{}>{role}", user.full_name, user.email)
            }
            Action::Dashboard => {
                let learner = self.learner.as_ref().context(SignedOutSnafu)?;
                render::view(&learner.dashboard.load().await)
            }
            Action::Files => {
                let learner = self.learner.as_ref().context(SignedOutSnafu)?;
                learner.dashboard.load_files().await;
                render::files(&learner.dashboard.files().await)
            }
            Action::Play(lesson_id) => {
                let learner = self.learner.as_mut().context(SignedOutSnafu)?;
                let player = learner.player(lesson_id).await?;
                player.play();
                learner.sampler.handle(lesson_id, PlaybackEvent::Play);
                format!("playing lesson {lesson_id} from {:.0}s", player.position())
            }
            Action::Seek { lesson_id, seconds } => {
                let learner = self.learner.as_mut().context(SignedOutSnafu)?;
                let player = learner.player(lesson_id).await?;
                player.seek(seconds);
                format!("lesson {lesson_id} at {:.0}s", player.position())
            }
            Action::Pause(lesson_id) => {
                let learner = self.learner.as_ref().context(SignedOutSnafu)?;
                let player = learner.started(lesson_id)?;
                player.pause();
                learner.sampler.handle(lesson_id, PlaybackEvent::Pause);
                format!("paused lesson {lesson_id} at {:.0}s", player.position())
            }
            Action::End(lesson_id) => {
                let learner = self.learner.as_ref().context(SignedOutSnafu)?;
                let player = learner.started(lesson_id)?;
                player.finish();
                learner.sampler.handle(lesson_id, PlaybackEvent::Ended);
                format!("lesson {lesson_id} ended")
            }
            Action::Done(lesson_id) => {
                let learner = self.learner.as_ref().context(SignedOutSnafu)?;
                render::view(&learner.dashboard.mark_complete(lesson_id).await)
            }
            Action::Pay { amount, email } => {
                let session = self.session.as_ref().context(SignedOutSnafu)?;
                let request = PaymentRequest::new(
                    session.user.id,
                    amount,
                    email,
                    self.config.return_url.to_string(),
                )
                .with_name(session.user.full_name.clone());

                let created = self.api.payment.create(&request).await?;
                format!(
                    "payment {} created, confirm it at {}",
                    created.payment_id, created.confirmation_url
                )
            }
            Action::Payment { payment_id } => {
                let status = self
                    .api
                    .payment
                    .wait_until_paid(&payment_id, PollPolicy::default())
                    .await?;

                let mut output = format!("payment {} is paid", status.payment_id);
                if let Some(learner) = &self.learner {
                    output.push('\n');
                    output.push_str(&render::view(&learner.dashboard.load().await));
                }
                output
            }
            Action::Modules => {
                let session = self.session.as_ref().context(SignedOutSnafu)?;
                let modules = self.api.admin.modules(session).await?;

                modules
                    .iter()
                    .map(|module| {
                        let id = module.id.map_or_else(|| "-".to_string(), |id| id.to_string());
                        let state = if module.is_published { "published" } else { "draft" };
                        format!("  module {id} {} ({state})", module.title)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Action::Help => HELP.to_string(),
            Action::Exit | Action::None => return Ok(None),
        };

        Ok(Some(output))
    }

    async fn sign_in(&mut self, session: Session) -> String {
        // the previous learner's timers stop before the new ones start
        self.learner = None;

        let learner = Learner::open(&self.api, &self.config, &session).await;
        let greeting = format!("signed in as {}", session.user.full_name);
        let view = render::view(&learner.dashboard.view().await);

        tracing::info!(user.id = %session.user.id, admin = session.is_admin(), "signed in");

        self.session = Some(session);
        self.learner = Some(learner);

        format!("{greeting}\n{view}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::extract::State;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::model::fixtures::course_json;
    use crate::service::api::testing::serve;

    type Seen = Arc<Mutex<Vec<Value>>>;

    async fn console() -> (Console, Seen) {
        let seen = Seen::default();
        let user = json!({"id": 5, "email": "anna@mail.example", "full_name": "Anna", "is_admin": false});

        let router = Router::new()
            .route(
                "/auth",
                post({
                    let user = user.clone();
                    move || async move { Json(json!({"token": "t-1", "user": user})) }
                })
                .get(move || async move { Json(json!({"valid": true, "user": user})) }),
            )
            .route(
                "/course",
                get(|| async { Json(course_json()) }).post(
                    |State(seen): State<Seen>, Json(body): Json<Value>| async move {
                        seen.lock().unwrap().push(body);
                        Json(json!({"success": true}))
                    },
                ),
            )
            .route("/upload", get(|| async { Json(json!({"files": []})) }))
            .route(
                "/reset-password",
                post(|Json(body): Json<Value>| async move {
                    let message = format!("sent to {}", body["email"].as_str().unwrap_or_default());
                    Json(json!({"message": message}))
                }),
            )
            .with_state(seen.clone());

        let base = serve(router).await;
        let vars = [
            ("AUTH_URL", "auth"),
            ("COURSE_URL", "course"),
            ("ADMIN_URL", "admin"),
            ("PAYMENT_URL", "payment"),
            ("UPLOAD_URL", "upload"),
            ("RESET_PASSWORD_URL", "reset-password"),
        ]
        .into_iter()
        .map(|(key, path)| (key.to_string(), base.join(path).unwrap().to_string()))
        .chain([
            ("PURCHASE_URL".to_string(), "https://school.example/buy".to_string()),
            ("RETURN_URL".to_string(), "https://school.example/paid".to_string()),
        ]);
        let config = Config::from_vars(vars).unwrap();
        let api = Api::connect(config.endpoints(), config.request_timeout).unwrap();

        (Console::new(api, config), seen)
    }

    #[tokio::test]
    async fn commands_need_a_session() {
        let (mut console, _) = console().await;

        let error = console.run(Action::Play(LessonId(10))).await.unwrap_err();
        assert!(matches!(error, CommandError::SignedOut));
        assert!(console.run(Action::Dashboard).await.is_err());
    }

    #[tokio::test]
    async fn recovery_works_signed_out() {
        let (mut console, _) = console().await;

        let output = console
            .run(Action::ForgotPassword {
                email: " Anna@Mail.Example".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(output.as_deref(), Some("sent to anna@mail.example"));

        let error = console
            .run(Action::ResetPassword {
                token: "abc".to_string(),
                password: "short".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            CommandError::Api {
                source: ApiError::WeakPassword { .. }
            }
        ));
    }

    #[tokio::test]
    async fn login_then_mark_done() {
        let (mut console, seen) = console().await;

        let output = console
            .run(Action::Login {
                email: "anna@mail.example".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap()
            .unwrap();
        assert!(output.starts_with("signed in as Anna\nprogress 33%"), "{output}");

        let whoami = console.run(Action::WhoAmI).await.unwrap().unwrap();
        assert_eq!(whoami, "Anna <anna@mail.example>");

        console.run(Action::Done(LessonId(11))).await.unwrap();
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            [json!({"lesson_id": 11, "completed": true, "watch_time_seconds": 0})]
        );
    }

    #[tokio::test]
    async fn playback_needs_a_known_lesson() {
        let (mut console, _) = console().await;
        console
            .run(Action::Login {
                email: "anna@mail.example".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        let error = console.run(Action::Play(LessonId(99))).await.unwrap_err();
        assert!(matches!(error, CommandError::UnknownLesson { .. }));

        let error = console.run(Action::Pause(LessonId(10))).await.unwrap_err();
        assert!(matches!(error, CommandError::NotStarted { .. }));

        let output = console.run(Action::Play(LessonId(11))).await.unwrap().unwrap();
        assert_eq!(output, "playing lesson 11 from 300s");
    }

    #[tokio::test]
    async fn modules_are_for_administrators() {
        let (mut console, _) = console().await;
        console
            .run(Action::Login {
                email: "anna@mail.example".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        let error = console.run(Action::Modules).await.unwrap_err();
        assert!(matches!(error, CommandError::Api { source: ApiError::Forbidden { .. } }));
    }
}
