//! The interactive session: sign in or sign up, then the main menu.
//!
//! Each main-menu entry pairs a [`MenuAction`] with its handler in
//! [`MAIN_MENU`]. Handlers run against a [`Prompt`], so every one of them can
//! be driven by a scripted input in tests. Errors inside a handler are printed
//! and the menu comes back; only a broken terminal ends the session early.

use super::{App, display};
use crate::config::AnonymousPolicy;
use crate::models::{NO_ID, NewQuestion, NewUser, QuestionId, User};
use crate::prompt::{INVALID_INPUT_MSG, Prompt};
use crate::session::{self, Session};
use crate::storage::codec::DELIMITER;
use crate::{Error, Result};
use serde_json::{Map, Value, json};
use std::time::Instant;

pub const NOT_REGISTERED_MSG: &str = "The Entered User Is Not Registered!";
pub const USER_EXISTS_MSG: &str = "User Already Exists! Enter another name Try again";
pub const NO_QUESTION_MSG: &str = "NO QUESTION FOUND!";
pub const INVALID_QUESTION_ID_MSG: &str = "Question id is not valid!";
pub const ALREADY_ANSWERED_MSG: &str = "Warning: already answered. Answer will be updated";
pub const NO_ANONYMOUS_MSG: &str = "Note: Anonymous questions are not allowed for this user!";
pub const UNKNOWN_PARENT_MSG: &str = "No question has the inserted question id!";
pub const NO_COMMA_MSG: &str = "Commas are not allowed here .. Try Again!";

const SIGN_MENU: [&str; 2] = ["Sign In", "Sign Up"];

/// What the session loop does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Logout,
}

/// Arguments recorded for an action in the action log.
pub type ActionArgs = Map<String, Value>;

type Handler = fn(&mut App, &mut Session, &mut dyn Prompt, &mut ActionArgs) -> Result<Flow>;

/// Main menu actions, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    QuestionsToMe,
    QuestionsFromMe,
    AnswerQuestion,
    DeleteQuestion,
    AskQuestion,
    ListUsers,
    ListFeed,
    Logout,
}

impl MenuAction {
    /// Name used in the action log.
    pub fn name(self) -> &'static str {
        match self {
            MenuAction::QuestionsToMe => "questions_to_me",
            MenuAction::QuestionsFromMe => "questions_from_me",
            MenuAction::AnswerQuestion => "answer_question",
            MenuAction::DeleteQuestion => "delete_question",
            MenuAction::AskQuestion => "ask_question",
            MenuAction::ListUsers => "list_users",
            MenuAction::ListFeed => "list_feed",
            MenuAction::Logout => "logout",
        }
    }

    /// Map a 1-based menu choice to its action.
    pub fn from_choice(choice: i64) -> Option<MenuAction> {
        MenuEntry::lookup(choice).map(|entry| entry.action)
    }
}

pub struct MenuEntry {
    pub action: MenuAction,
    pub label: &'static str,
    handler: Handler,
}

impl MenuEntry {
    pub fn lookup(choice: i64) -> Option<&'static MenuEntry> {
        let idx = usize::try_from(choice.checked_sub(1)?).ok()?;
        MAIN_MENU.get(idx)
    }
}

pub static MAIN_MENU: [MenuEntry; 8] = [
    MenuEntry {
        action: MenuAction::QuestionsToMe,
        label: "Print Questions To Me",
        handler: questions_to_me,
    },
    MenuEntry {
        action: MenuAction::QuestionsFromMe,
        label: "Print Questions From Me",
        handler: questions_from_me,
    },
    MenuEntry {
        action: MenuAction::AnswerQuestion,
        label: "Answer Question",
        handler: answer_question,
    },
    MenuEntry {
        action: MenuAction::DeleteQuestion,
        label: "Delete Question",
        handler: delete_question,
    },
    MenuEntry {
        action: MenuAction::AskQuestion,
        label: "Ask Question",
        handler: ask_question,
    },
    MenuEntry {
        action: MenuAction::ListUsers,
        label: "List System Users",
        handler: list_users,
    },
    MenuEntry {
        action: MenuAction::ListFeed,
        label: "List Feed",
        handler: list_feed,
    },
    MenuEntry {
        action: MenuAction::Logout,
        label: "Logout",
        handler: logout,
    },
];

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Run one full session until logout or end of input.
pub fn run_session(app: &mut App, prompt: &mut dyn Prompt) -> Result<()> {
    for warning in app.load_warnings() {
        prompt.say(&format!("Warning: {}", warning))?;
    }

    let Some(user) = authenticate(app, prompt)? else {
        return Ok(());
    };
    let mut session = session::assemble(user, &app.questions);
    tracing::info!(user_id = session.user.id, "Signed in");

    let labels: Vec<&str> = MAIN_MENU.iter().map(|entry| entry.label).collect();
    loop {
        let Some(choice) = prompt.choose(&labels)? else {
            break;
        };
        let Some(entry) = MenuEntry::lookup(choice) else {
            prompt.say(INVALID_INPUT_MSG)?;
            continue;
        };
        if perform(entry, app, &mut session, prompt)? == Flow::Logout {
            break;
        }
    }

    tracing::info!(user_id = session.user.id, "Session ended");
    Ok(())
}

/// Run one menu action, log it, and report its error to the user.
///
/// An error is only returned when the report itself cannot be written.
pub fn perform(
    entry: &MenuEntry,
    app: &mut App,
    session: &mut Session,
    prompt: &mut dyn Prompt,
) -> Result<Flow> {
    let started = Instant::now();
    let mut args = ActionArgs::new();
    let result = (entry.handler)(app, session, prompt, &mut args);

    app.logger.log(
        Some(session.user.id),
        entry.action.name(),
        Value::Object(args),
        result.as_ref().err().map(ToString::to_string),
        elapsed_ms(started),
    );

    match result {
        Ok(flow) => Ok(flow),
        Err(e) => {
            tracing::debug!(action = entry.action.name(), "Action failed: {}", e);
            prompt.say(&format!("Error: {}", e))?;
            Ok(Flow::Continue)
        }
    }
}

/// Sign menu loop. `None` means input ended before anyone signed in.
pub fn authenticate(app: &mut App, prompt: &mut dyn Prompt) -> Result<Option<User>> {
    loop {
        let Some(choice) = prompt.choose(&SIGN_MENU)? else {
            return Ok(None);
        };
        let started = Instant::now();
        let (action, outcome) = match choice {
            1 => ("sign_in", sign_in(app, prompt)),
            2 => ("sign_up", sign_up(app, prompt)),
            _ => {
                prompt.say(INVALID_INPUT_MSG)?;
                continue;
            }
        };

        // A failed registration append is reported and the sign menu comes back
        let (user, error) = match outcome {
            Ok(Some(user)) => (Some(user), None),
            Ok(None) => (None, Some("not signed in".to_string())),
            Err(e) => {
                prompt.say(&format!("Error: {}", e))?;
                (None, Some(e.to_string()))
            }
        };
        app.logger.log(
            user.as_ref().map(|u| u.id),
            action,
            json!({}),
            error,
            elapsed_ms(started),
        );

        if user.is_some() {
            return Ok(user);
        }
    }
}

fn sign_in(app: &App, prompt: &mut dyn Prompt) -> Result<Option<User>> {
    let Some(username) = prompt.read_word("Enter username: ")? else {
        return Ok(None);
    };
    let Some(password) = prompt.read_word("Enter password: ")? else {
        return Ok(None);
    };

    match app.users.find_by_credentials(&username, &password) {
        Some(user) => Ok(Some(user.clone())),
        None => {
            prompt.say(NOT_REGISTERED_MSG)?;
            Ok(None)
        }
    }
}

/// Read a value that will be stored in a delimited row, asking again while it
/// contains the delimiter. `word` selects [`Prompt::read_word`] over a full line.
fn read_stored(prompt: &mut dyn Prompt, label: &str, word: bool) -> Result<Option<String>> {
    loop {
        let value = if word {
            prompt.read_word(label)?
        } else {
            prompt.read_line(label)?
        };
        let Some(value) = value else {
            return Ok(None);
        };
        if !value.contains(DELIMITER) {
            return Ok(Some(value));
        }
        prompt.say(NO_COMMA_MSG)?;
    }
}

/// Read a 0/1 answer, asking again on anything else.
fn read_flag(prompt: &mut dyn Prompt, label: &str) -> Result<Option<bool>> {
    loop {
        let Some(value) = prompt.read_int(label)? else {
            return Ok(None);
        };
        match parse_flag(value) {
            Ok(flag) => return Ok(Some(flag)),
            Err(_) => prompt.say(INVALID_INPUT_MSG)?,
        }
    }
}

fn parse_flag(value: i64) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::InvalidInput(format!("expected 0 or 1, got {}", other))),
    }
}

fn sign_up(app: &mut App, prompt: &mut dyn Prompt) -> Result<Option<User>> {
    let username = loop {
        let Some(name) = read_stored(prompt, "Enter user name (No spaces): ", true)? else {
            return Ok(None);
        };
        if app.users.find_by_name(&name).is_none() {
            break name;
        }
        prompt.say(USER_EXISTS_MSG)?;
    };

    let Some(password) = read_stored(prompt, "Enter password: ", true)? else {
        return Ok(None);
    };
    let Some(name) = read_stored(prompt, "Enter name: ", true)? else {
        return Ok(None);
    };
    let Some(email) = read_stored(prompt, "Enter email: ", true)? else {
        return Ok(None);
    };
    let Some(allow_anonymous_questions) =
        read_flag(prompt, "Allow anonymous questions? (0 or 1): ")?
    else {
        return Ok(None);
    };

    let user = app.users.register(NewUser {
        username,
        password,
        name,
        email,
        allow_anonymous_questions,
    })?;
    Ok(Some(user))
}

/// Ask for an existing question id. `None` on cancel, unknown id, or end of input.
fn read_question_id(app: &App, prompt: &mut dyn Prompt) -> Result<Option<QuestionId>> {
    let Some(id) = prompt.read_int("Enter question id or -1 to cancel: ")? else {
        return Ok(None);
    };
    if id == NO_ID {
        return Ok(None);
    }
    if !app.questions.contains(id) {
        prompt.say(INVALID_QUESTION_ID_MSG)?;
        return Ok(None);
    }
    Ok(Some(id))
}

fn questions_to_me(
    app: &mut App,
    session: &mut Session,
    prompt: &mut dyn Prompt,
    _args: &mut ActionArgs,
) -> Result<Flow> {
    let mut printed = 0;
    for (root, replies) in session.threads(&app.questions) {
        prompt.say(&display::question(root))?;
        prompt.say("")?;
        for reply in replies {
            prompt.say(&display::thread_reply(reply))?;
            prompt.say("")?;
        }
        printed += 1;
    }
    if printed == 0 {
        prompt.say(NO_QUESTION_MSG)?;
    }
    Ok(Flow::Continue)
}

fn questions_from_me(
    app: &mut App,
    session: &mut Session,
    prompt: &mut dyn Prompt,
    _args: &mut ActionArgs,
) -> Result<Flow> {
    let asked = session.asked(&app.questions);
    if asked.is_empty() {
        prompt.say(NO_QUESTION_MSG)?;
        return Ok(Flow::Continue);
    }
    for question in asked {
        prompt.say(&display::asked_question(question))?;
        prompt.say("")?;
    }
    Ok(Flow::Continue)
}

fn answer_question(
    app: &mut App,
    session: &mut Session,
    prompt: &mut dyn Prompt,
    args: &mut ActionArgs,
) -> Result<Flow> {
    let Some(id) = read_question_id(app, prompt)? else {
        return Ok(Flow::Continue);
    };
    args.insert("question_id".to_string(), json!(id));

    let already_answered = match app.questions.get(id) {
        Some(question) => {
            prompt.say("")?;
            prompt.say(&display::question(question))?;
            question.is_answered()
        }
        None => false,
    };
    if already_answered {
        prompt.say("")?;
        prompt.say(ALREADY_ANSWERED_MSG)?;
    }

    let Some(answer) = read_stored(prompt, "Enter answer: ", false)? else {
        return Ok(Flow::Continue);
    };
    args.insert("answer".to_string(), json!(answer));

    app.questions.answer(id, &answer)?;
    session.refresh(&app.questions);
    Ok(Flow::Continue)
}

fn delete_question(
    app: &mut App,
    session: &mut Session,
    prompt: &mut dyn Prompt,
    args: &mut ActionArgs,
) -> Result<Flow> {
    let Some(id) = read_question_id(app, prompt)? else {
        return Ok(Flow::Continue);
    };
    args.insert("question_id".to_string(), json!(id));

    let removed = app.questions.delete(id, session.view())?;
    session.refresh(&app.questions);
    args.insert("removed".to_string(), json!(removed));

    let listed: Vec<String> = removed.iter().map(ToString::to_string).collect();
    prompt.say(&format!("Deleted question(s): {}", listed.join(", ")))?;
    Ok(Flow::Continue)
}

fn ask_question(
    app: &mut App,
    session: &mut Session,
    prompt: &mut dyn Prompt,
    args: &mut ActionArgs,
) -> Result<Flow> {
    let Some(to_user_id) = prompt.read_int("Enter user id or -1 to cancel: ")? else {
        return Ok(Flow::Continue);
    };
    if to_user_id == NO_ID {
        return Ok(Flow::Continue);
    }
    args.insert("to_user_id".to_string(), json!(to_user_id));

    let recipient_allows_anonymous = app
        .users
        .find_by_id(to_user_id)
        .map(|user| user.allow_anonymous_questions)
        .ok_or_else(|| Error::NotFound(format!("User id {}", to_user_id)))?;

    if !recipient_allows_anonymous {
        prompt.say(NO_ANONYMOUS_MSG)?;
    }

    let Some(wants_anonymous) = read_flag(prompt, "Ask anonymously? (0 or 1): ")? else {
        return Ok(Flow::Continue);
    };
    args.insert("anonymous".to_string(), json!(wants_anonymous));
    if wants_anonymous
        && !recipient_allows_anonymous
        && app.anonymous_policy == AnonymousPolicy::Enforce
    {
        return Err(Error::AnonymousNotAllowed(to_user_id));
    }

    let Some(parent) =
        prompt.read_int("For thread question: Enter question id or -1 for new question: ")?
    else {
        return Ok(Flow::Continue);
    };
    let parent_id = (parent != NO_ID).then_some(parent);
    if let Some(parent_id) = parent_id
        && !app.questions.contains(parent_id)
    {
        prompt.say(UNKNOWN_PARENT_MSG)?;
    }
    args.insert("parent_id".to_string(), json!(parent_id));

    let Some(text) = read_stored(prompt, "Enter question text: ", false)? else {
        return Ok(Flow::Continue);
    };

    let question = app.questions.create(NewQuestion {
        parent_id,
        from_user_id: session.user.id,
        to_user_id,
        recipient_allows_anonymous,
        text,
    })?;
    session.refresh(&app.questions);
    args.insert("question_id".to_string(), json!(question.id));

    prompt.say(&format!("Question id ({}) sent.", question.id))?;
    Ok(Flow::Continue)
}

fn list_users(
    app: &mut App,
    _session: &mut Session,
    prompt: &mut dyn Prompt,
    _args: &mut ActionArgs,
) -> Result<Flow> {
    for user in app.users.all() {
        prompt.say(&user.to_string())?;
    }
    prompt.say("")?;
    Ok(Flow::Continue)
}

fn list_feed(
    app: &mut App,
    _session: &mut Session,
    prompt: &mut dyn Prompt,
    _args: &mut ActionArgs,
) -> Result<Flow> {
    for question in app.questions.answered_feed() {
        prompt.say(&display::question(question))?;
        prompt.say("")?;
    }
    Ok(Flow::Continue)
}

fn logout(
    _app: &mut App,
    _session: &mut Session,
    _prompt: &mut dyn Prompt,
    _args: &mut ActionArgs,
) -> Result<Flow> {
    Ok(Flow::Logout)
}
