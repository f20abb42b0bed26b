//! `#countdown` command recognition

/// Literal token every countdown command starts with
pub const COMMAND_PREFIX: &str = "#countdown";

/// A recognised command split into its verb and raw argument text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    /// Lower-cased first word after the prefix, empty when absent
    pub verb: String,
    /// Everything after the verb, trimmed
    pub argument: String,
}

/// Check whether chat text addresses the countdown at all.
pub fn is_command(text: &str) -> bool {
    strip_prefix(text.trim()).is_some()
}

/// Split a chat line into verb and argument text.
///
/// Returns `None` for text that does not start with [`COMMAND_PREFIX`].
pub fn parse_command(text: &str) -> Option<RawCommand> {
    let rest = strip_prefix(text.trim())?.trim();

    let verb = rest.split_whitespace().next().unwrap_or("");
    let argument = rest[verb.len()..].trim();

    Some(RawCommand {
        verb: verb.to_lowercase(),
        argument: argument.to_string(),
    })
}

fn strip_prefix(text: &str) -> Option<&str> {
    let head = text.get(..COMMAND_PREFIX.len())?;
    if head.eq_ignore_ascii_case(COMMAND_PREFIX) {
        Some(&text[COMMAND_PREFIX.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verb_and_argument() {
        let cmd = parse_command("  #countdown start 5 | Done! ").unwrap();
        assert_eq!(cmd.verb, "start");
        assert_eq!(cmd.argument, "5 | Done!");
    }

    #[test]
    fn test_prefix_and_verb_are_case_insensitive() {
        let cmd = parse_command("#CountDown STOP").unwrap();
        assert_eq!(cmd.verb, "stop");
        assert_eq!(cmd.argument, "");
    }

    #[test]
    fn test_bare_prefix_has_empty_verb() {
        let cmd = parse_command("#countdown").unwrap();
        assert_eq!(cmd.verb, "");
        assert_eq!(cmd.argument, "");
    }

    #[test]
    fn test_argument_keeps_inner_spacing() {
        let cmd = parse_command("#countdown add 1h   30m").unwrap();
        assert_eq!(cmd.verb, "add");
        assert_eq!(cmd.argument, "1h   30m");
    }

    #[test]
    fn test_non_commands_are_ignored() {
        assert_eq!(parse_command("hello #countdown start 5"), None);
        assert_eq!(parse_command("#count"), None);
        assert_eq!(parse_command(""), None);
        assert!(!is_command("!countdown stop"));
        assert!(is_command("  #COUNTDOWN stop"));
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        assert_eq!(parse_command("⏱⏱⏱⏱"), None);
        assert_eq!(parse_command("é"), None);
    }
}
