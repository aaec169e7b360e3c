use app::ProfileField;
use domain::{DomainError, TodoFilter};
use std::str::FromStr;
use thiserror::Error;

/// 入力行から解釈したコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    Google,
    /// 次回のGoogle認証で選ばれるアカウントを登録する
    RegisterGoogle { email: String, name: Option<String> },
    SwitchMode,
    Add(String),
    Draft(String),
    Emoji(String),
    Picker,
    Toggle(usize),
    Delete(usize),
    Edit(usize),
    EditText(String),
    Save,
    Cancel,
    Filter(TodoFilter),
    Profile,
    ProfileInput(ProfileField, String),
    Update,
    Close,
    SignOut,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,

    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    MissingArgument(&'static str),

    #[error("not an item number: {0}")]
    InvalidIndex(String),

    #[error(transparent)]
    InvalidFilter(DomainError),
}

pub const HELP: &str = "\
sign-in / sign-up screens:
  signin <email> <password>     sign in with email and password
  signup <email> <password>     create an account
  google                        continue with Google
  register-google <email> [name]  choose the Google account for the next `google`
  switch                        go to the other screen
list screen:
  add [text]                    add an item (uses the draft when text is omitted)
  draft <text>                  set the draft text
  emoji <emoji>                 append an emoji to the draft
  picker                        toggle the emoji picker
  toggle|delete|edit <n>        act on the n-th visible item
  text <text>                   change the text in the edit dialog
  save | cancel                 save or discard the edit dialog
  filter <all|ongoing|completed>
  profile                       open the profile dialog
  name|current|newpw|confirm <value>
  update | close                submit or close the profile dialog
  signout
help | quit";

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match name {
            "" => return Err(ParseError::Empty),
            "signin" | "signup" => {
                let usage = "signin|signup <email> <password>";
                let email = args.next().ok_or(ParseError::MissingArgument(usage))?;
                let password = args.next().ok_or(ParseError::MissingArgument(usage))?;
                let (email, password) = (email.to_string(), password.to_string());
                if name == "signin" {
                    Command::SignIn { email, password }
                } else {
                    Command::SignUp { email, password }
                }
            }
            "google" => Command::Google,
            "register-google" => {
                let email = args
                    .next()
                    .ok_or(ParseError::MissingArgument("register-google <email> [name]"))?;
                let name: Vec<&str> = args.collect();
                Command::RegisterGoogle {
                    email: email.to_string(),
                    name: (!name.is_empty()).then(|| name.join(" ")),
                }
            }
            "switch" => Command::SwitchMode,
            "add" => Command::Add(rest.to_string()),
            "draft" => Command::Draft(rest.to_string()),
            "emoji" => Command::Emoji(
                args.next()
                    .ok_or(ParseError::MissingArgument("emoji <emoji>"))?
                    .to_string(),
            ),
            "picker" => Command::Picker,
            "toggle" => Command::Toggle(index(args.next(), "toggle <n>")?),
            "delete" => Command::Delete(index(args.next(), "delete <n>")?),
            "edit" => Command::Edit(index(args.next(), "edit <n>")?),
            "text" => Command::EditText(rest.to_string()),
            "save" => Command::Save,
            "cancel" => Command::Cancel,
            "filter" => Command::Filter(rest.parse().map_err(ParseError::InvalidFilter)?),
            "profile" => Command::Profile,
            "name" => Command::ProfileInput(ProfileField::DisplayName, rest.to_string()),
            "current" => Command::ProfileInput(ProfileField::CurrentPassword, rest.to_string()),
            "newpw" => Command::ProfileInput(ProfileField::NewPassword, rest.to_string()),
            "confirm" => Command::ProfileInput(ProfileField::ConfirmNewPassword, rest.to_string()),
            "update" => Command::Update,
            "close" => Command::Close,
            "signout" => Command::SignOut,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// 1始まりの項目番号
fn index(raw: Option<&str>, usage: &'static str) -> Result<usize, ParseError> {
    let raw = raw.ok_or(ParseError::MissingArgument(usage))?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::InvalidIndex(raw.to_string())),
    }
}
