/// Available commands and autocomplete logic

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "dashboard",
    aliases: &["d", "dash", "home"],
    description: "Headcount and salary overview",
  },
  Command {
    name: "employees",
    aliases: &["e", "emp", "staff"],
    description: "Browse and edit employees",
  },
  Command {
    name: "jobtitles",
    aliases: &["j", "titles", "jobs"],
    description: "Browse and edit job titles",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit staffdesk",
  },
];

/// Match quality of `input` against `cmd`, lower is better
fn rank(cmd: &Command, input: &str) -> Option<u8> {
  let aliases = || cmd.aliases.iter();
  if cmd.name == input {
    Some(0)
  } else if aliases().any(|a| *a == input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if aliases().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if aliases().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

/// Commands matching `input`, best first; everything for empty input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut ranked: Vec<(u8, &'static Command)> = COMMANDS
    .iter()
    .filter_map(|cmd| rank(cmd, &input).map(|r| (r, cmd)))
    .collect();
  // Stable, so ties keep table order
  ranked.sort_by_key(|(r, _)| *r);
  ranked.into_iter().map(|(_, cmd)| cmd).collect()
}
