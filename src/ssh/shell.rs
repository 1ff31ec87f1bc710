//! Text handling for the switch's interactive CLI
//!
//! The SG300 only offers a PTY shell, so command boundaries are found by
//! watching for the prompt (`hostname#` or `hostname>`), and the raw stream
//! has to be cleaned of echoes, terminal escapes and pager prompts.

use std::sync::LazyLock;

use regex::Regex;

/// CSI / OSC escape sequences emitted by the switch's terminal
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07]*\x07|\x1b[=>78DEM]")
        .expect("ANSI escape pattern is valid")
});

/// Pager prompt shown when `terminal datadump` is not in effect
const PAGER_MARKER: &str = "More:";

/// Command used to widen the terminal
pub const TERMINAL_WIDTH_COMMAND: &str = "terminal width 511";

/// Command that disables paging on SG300 firmware
pub const DISABLE_PAGING_COMMAND: &str = "terminal datadump";

/// What the in-shell login is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    /// `User Name:` prompt
    Username,
    /// `Password:` prompt
    Password,
}

/// Remove terminal escape sequences, carriage returns and backspaces
pub fn strip_ansi(text: &str) -> String {
    let stripped = ANSI_ESCAPE.replace_all(text, "");
    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '\r' => {}
            '\u{8}' => {
                out.pop();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Last non-empty line of the buffer, trimmed
fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rfind(|line| !line.is_empty())
}

/// Extract the base prompt (hostname) from a buffer ending at a prompt
///
/// Banner rules such as `##########` are not prompts: the hostname has to
/// start with a letter or digit and cannot contain `#` or `>`.
///
/// # Examples
/// ```
/// use sg300_batch::ssh::shell::base_prompt;
///
/// assert_eq!(base_prompt("\r\nswitch5c2a1f#"), Some("switch5c2a1f".to_string()));
/// assert_eq!(base_prompt("Loading...\n"), None);
/// ```
pub fn base_prompt(buffer: &str) -> Option<String> {
    let line = last_line(buffer)?;
    let host = line.strip_suffix('#').or_else(|| line.strip_suffix('>'))?;
    if !host.starts_with(|c: char| c.is_ascii_alphanumeric())
        || host.contains(|c: char| c.is_whitespace() || c == '#' || c == '>')
    {
        return None;
    }
    // Config modes show up as `host(config)#`
    let host = host.split('(').next().unwrap_or(host);
    Some(host.to_string())
}

/// Whether `line` is a CLI prompt for the switch named `base`
pub fn is_prompt_line(line: &str, base: &str) -> bool {
    let line = line.trim();
    line.starts_with(base)
        && (line.ends_with('#') || line.ends_with('>'))
        && !line[base.len()..].contains(char::is_whitespace)
}

/// Whether the buffer currently ends at a prompt for `base`
pub fn ends_with_prompt(buffer: &str, base: &str) -> bool {
    last_line(buffer).is_some_and(|line| is_prompt_line(line, base))
}

/// Whether the buffer ends at a pager prompt that wants a keypress
pub fn ends_with_pager(buffer: &str) -> bool {
    last_line(buffer).is_some_and(|line| line.starts_with(PAGER_MARKER))
}

/// Number of pager prompts seen in the buffer
pub fn pager_prompts(text: &str) -> usize {
    text.matches(PAGER_MARKER).count()
}

/// Detect an in-shell login prompt at the end of the buffer
pub fn login_step(buffer: &str) -> Option<LoginStep> {
    let line = last_line(buffer)?.to_lowercase();
    if line.ends_with("user name:") || line.ends_with("username:") {
        Some(LoginStep::Username)
    } else if line.ends_with("password:") {
        Some(LoginStep::Password)
    } else {
        None
    }
}

/// Next step while logging in to the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    /// Prompt reached; carries the base prompt
    Ready(String),
    /// Answer `User Name:`
    SendUsername,
    /// Answer `Password:`
    SendPassword,
    /// Login prompt came back after the password was sent
    Rejected,
    /// Keep reading
    Wait,
}

/// Decide what to do with the login output received so far
///
/// `text` is the output since the last answer sent, with escapes removed.
pub fn next_login_action(text: &str, password_sent: bool) -> LoginAction {
    if let Some(base) = base_prompt(text) {
        return LoginAction::Ready(base);
    }
    match login_step(text) {
        Some(_) if password_sent => LoginAction::Rejected,
        Some(LoginStep::Username) => LoginAction::SendUsername,
        Some(LoginStep::Password) => LoginAction::SendPassword,
        None => LoginAction::Wait,
    }
}

/// Next step while reading a command's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAction {
    /// Prompt is back, output complete
    Done,
    /// A new pager prompt; answer it and remember the page count
    NextPage(usize),
    /// Keep reading
    Wait,
}

/// Decide what to do with the command output received so far
///
/// Each pager prompt is answered once: `pages_answered` is the count
/// returned by the last [`ReadAction::NextPage`].
pub fn next_read_action(text: &str, base: &str, pages_answered: usize) -> ReadAction {
    if ends_with_prompt(text, base) {
        return ReadAction::Done;
    }
    let pages = pager_prompts(text);
    if ends_with_pager(text) && pages > pages_answered {
        ReadAction::NextPage(pages)
    } else {
        ReadAction::Wait
    }
}

/// Turn the raw stream for one command into its output
///
/// Drops the echoed command, pager prompts and the trailing prompt line.
///
/// # Examples
/// ```
/// use sg300_batch::ssh::shell::clean_output;
///
/// let raw = "show clock\r\n10:01:02 UTC Jan 1 2026\r\nswitch01#";
/// assert_eq!(clean_output(raw, "show clock", "switch01"), "10:01:02 UTC Jan 1 2026");
/// ```
pub fn clean_output(raw: &str, command: &str, base: &str) -> String {
    let text = strip_ansi(raw);
    let mut lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim_start().starts_with(PAGER_MARKER))
        .collect();

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines.last().is_some_and(|line| is_prompt_line(line, base)) {
        lines.pop();
    }

    let echo = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .filter(|&i| lines[i].trim_end().ends_with(command.trim()));
    if let Some(i) = echo {
        lines.drain(..=i);
    }

    while lines.first().is_some_and(|line| line.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}
