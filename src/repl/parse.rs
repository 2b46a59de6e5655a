use chumsky::error::SimpleReason;
use chumsky::prelude::*;
use chumsky::text::whitespace;
use itertools::Itertools;
use snafu::Snafu;

use super::Action;
use crate::model::LessonId;

#[derive(Debug, Snafu)]
#[snafu(display("cannot parse '{input}' - {}", self.combine_errors("\n")))]
pub struct ParseError {
    input: String,
    errors: Vec<Simple<char>>,
}

impl ParseError {
    fn combine_errors(&self, separator: &str) -> String {
        self.errors
            .iter()
            .map(|err| match err.reason() {
                SimpleReason::Custom(msg) => msg.clone(),
                SimpleReason::Unexpected => format!("unexpected input at {}", err.span().start),
                SimpleReason::Unclosed { delimiter, .. } => format!("unclosed {delimiter}"),
            })
            .unique()
            .join(separator)
    }
}

pub fn parse(input: &str) -> Result<Action, ParseError> {
    if input.trim().is_empty() {
        return Ok(Action::None);
    }

    program().parse(input).map_err(|errors| ParseError {
        input: input.to_string(),
        errors,
    })
}

fn program() -> impl Parser<char, Action, Error = Simple<char>> {
    action_register()
        .or(action_login())
        .or(action_forgot())
        .or(action_reset())
        .or(action_lesson())
        .or(action_seek())
        .or(action_payment())
        .or(action_pay())
        .or(action_plain())
        .padded()
        .then_ignore(end())
}

fn action_register() -> impl Parser<char, Action, Error = Simple<char>> {
    keyword("register")
        .ignore_then(word())
        .then_ignore(whitespace().at_least(1))
        .then(word())
        .then_ignore(whitespace().at_least(1))
        .then(rest("full name"))
        .map(|((email, password), full_name)| Action::Register {
            email,
            password,
            full_name,
        })
}

fn action_login() -> impl Parser<char, Action, Error = Simple<char>> {
    keyword("login")
        .ignore_then(word())
        .then_ignore(whitespace().at_least(1))
        .then(word())
        .map(|(email, password)| Action::Login { email, password })
}

fn action_forgot() -> impl Parser<char, Action, Error = Simple<char>> {
    keyword("forgot")
        .ignore_then(word())
        .map(|email| Action::ForgotPassword { email })
}

fn action_reset() -> impl Parser<char, Action, Error = Simple<char>> {
    keyword("reset")
        .ignore_then(word())
        .then_ignore(whitespace().at_least(1))
        .then(word())
        .map(|(token, password)| Action::ResetPassword { token, password })
}

fn action_lesson() -> impl Parser<char, Action, Error = Simple<char>> {
    let command = keyword("play")
        .to(Action::Play as fn(LessonId) -> Action)
        .or(keyword("pause").to(Action::Pause as fn(LessonId) -> Action))
        .or(keyword("end").to(Action::End as fn(LessonId) -> Action))
        .or(keyword("done").to(Action::Done as fn(LessonId) -> Action));

    command.then(lesson_id()).map(|(action, lesson_id)| action(lesson_id))
}

fn action_seek() -> impl Parser<char, Action, Error = Simple<char>> {
    keyword("seek")
        .ignore_then(lesson_id())
        .then_ignore(whitespace().at_least(1))
        .then(number("seconds"))
        .map(|(lesson_id, seconds)| Action::Seek { lesson_id, seconds })
}

fn action_pay() -> impl Parser<char, Action, Error = Simple<char>> {
    keyword("pay")
        .ignore_then(number("amount"))
        .then_ignore(whitespace().at_least(1))
        .then(word())
        .map(|(amount, email)| Action::Pay { amount, email })
}

fn action_payment() -> impl Parser<char, Action, Error = Simple<char>> {
    keyword("payment")
        .ignore_then(word())
        .map(|payment_id| Action::Payment { payment_id })
}

fn action_plain() -> impl Parser<char, Action, Error = Simple<char>> {
    just("whoami")
        .to(Action::WhoAmI)
        .or(just("dashboard").to(Action::Dashboard))
        .or(just("files").to(Action::Files))
        .or(just("modules").to(Action::Modules))
        .or(just("help").to(Action::Help))
        .or(choice((just("exit"), just("quit"))).to(Action::Exit))
}

/// A command name followed by at least one space.
fn keyword(name: &'static str) -> impl Parser<char, (), Error = Simple<char>> + Clone {
    just(name).then_ignore(whitespace().at_least(1)).ignored()
}

fn word() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    filter(|c: &char| !c.is_whitespace())
        .repeated()
        .at_least(1)
        .collect::<String>()
}

fn lesson_id() -> impl Parser<char, LessonId, Error = Simple<char>> + Clone {
    word().try_map(|text, span| {
        text.parse::<LessonId>()
            .map_err(|source| Simple::custom(span, source.to_string()))
    })
}

fn number(what: &'static str) -> impl Parser<char, f64, Error = Simple<char>> + Clone {
    word().try_map(move |text, span| {
        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or_else(|| Simple::custom(span, format!("invalid {what} `{text}`")))
    })
}

fn rest(what: &'static str) -> impl Parser<char, String, Error = Simple<char>> {
    take_until(end()).try_map(move |(chars, _), span| {
        let text = chars.into_iter().collect::<String>();
        let text = text.trim();

        if text.is_empty() {
            Err(Simple::custom(span, format!("missing {what}")))
        } else {
            Ok(text.to_string())
        }
    })
}
