//! # Template Rendering
//!
//! Positional printf-style substitution for template rules.
//! Supported verbs: `%s`, `%v`, `%d` insert the argument as-is, `%q` inserts it as a single
//! POSIX shell word in single quotes, `%%` is a literal percent sign.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::error::DispatchError;

fn verb_regex() -> &'static Regex {
    static VERB: OnceLock<Regex> = OnceLock::new();
    VERB.get_or_init(|| Regex::new(r"%(.?)").expect("verb pattern is valid"))
}

/// Number of argument-consuming verbs in `format`.
pub fn arity(format: &str) -> usize {
    verb_regex()
        .captures_iter(format)
        .filter(|caps| caps.get(1).is_some_and(|v| !v.as_str().is_empty() && v.as_str() != "%"))
        .count()
}

/// Renders `format` with `args`. The argument count must equal the verb count.
pub fn render(name: &str, format: &str, args: &[&str]) -> Result<String, DispatchError> {
    let expected = arity(format);
    if expected != args.len() {
        return Err(DispatchError::FormatArity {
            template: name.to_string(),
            expected,
            got: args.len(),
        });
    }

    let mut out = String::with_capacity(format.len());
    let mut last = 0;
    let mut next_arg = args.iter();

    for caps in verb_regex().captures_iter(format) {
        let (Some(whole), Some(verb)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&format[last..whole.start()]);
        last = whole.end();

        let verb = verb.as_str().chars().next();
        match verb {
            Some('%') => out.push('%'),
            Some('s' | 'v' | 'd') => out.push_str(next_arg.next().copied().unwrap_or_default()),
            Some('q') => {
                let arg = next_arg.next().copied().unwrap_or_default();
                out.push_str(&shell_quote(arg));
            }
            other => {
                return Err(DispatchError::UnknownVerb {
                    template: name.to_string(),
                    // A trailing lone '%' has no verb character.
                    verb: other.unwrap_or('%'),
                });
            }
        }
    }
    out.push_str(&format[last..]);
    Ok(out)
}

/// Wraps `arg` in single quotes so `sh` passes it through without expansion.
fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_counts_verbs_not_escapes() {
        assert_eq!(arity("systemctl restart %s"), 1);
        assert_eq!(arity("cp %s %s"), 2);
        assert_eq!(arity("echo 100%%"), 0);
        assert_eq!(arity("echo %%s %s"), 1);
        assert_eq!(arity("uptime"), 0);
    }

    #[test]
    fn test_render_positional() {
        let out = render("cp", "cp %s %s", &["a.txt", "b.txt"]).unwrap();
        assert_eq!(out, "cp a.txt b.txt");
    }

    #[test]
    fn test_render_mixed_verbs() {
        let out = render("t", "run %v --count=%d --msg=%q done 50%%", &["job", "3", "hi \"x\""]).unwrap();
        assert_eq!(out, "run job --count=3 --msg='hi \"x\"' done 50%");
    }

    #[test]
    fn test_quoted_verb_blocks_shell_expansion() {
        assert_eq!(render("t", "echo %q", &["$(id)"]).unwrap(), "echo '$(id)'");
        assert_eq!(render("t", "echo %q", &["it's"]).unwrap(), "echo 'it'\\''s'");
        assert_eq!(render("t", "echo %q", &["`id` $HOME"]).unwrap(), "echo '`id` $HOME'");
    }

    #[test]
    fn test_too_few_arguments() {
        let err = render("cp", "cp %s %s", &["a.txt"]).unwrap_err();
        match err {
            DispatchError::FormatArity { template, expected, got } => {
                assert_eq!(template, "cp");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_too_many_arguments() {
        let err = render("restart", "systemctl restart %s", &["nginx", "extra"]).unwrap_err();
        assert!(matches!(err, DispatchError::FormatArity { expected: 1, got: 2, .. }));
    }

    #[test]
    fn test_unknown_verb() {
        let err = render("t", "echo %x", &["a"]).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownVerb { verb: 'x', .. }));
    }
}
