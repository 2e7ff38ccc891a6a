use regex::{Captures, Regex};
use std::sync::OnceLock;

/// 展开文本中的 `${VAR}` 和 `$VAR`
///
/// 未定义的变量替换为空串，与 shell 的行为一致。
pub fn expand_env(text: &str) -> String {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = ENV_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z0-9_]+)").expect("env placeholder pattern")
    });

    re.replace_all(text, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        std::env::var(name).unwrap_or_default()
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_braced_and_bare() {
        unsafe {
            std::env::set_var("PINGFILE_ENV_TEST_USER", "alice");
        }

        assert_eq!(expand_env("${PINGFILE_ENV_TEST_USER}"), "alice");
        assert_eq!(expand_env("$PINGFILE_ENV_TEST_USER"), "alice");
        assert_eq!(
            expand_env("user=$PINGFILE_ENV_TEST_USER;"),
            "user=alice;"
        );

        unsafe {
            std::env::remove_var("PINGFILE_ENV_TEST_USER");
        }
    }

    #[test]
    fn test_expand_missing_is_empty() {
        assert_eq!(expand_env("${PINGFILE_ENV_TEST_MISSING}"), "");
        assert_eq!(expand_env("a-$PINGFILE_ENV_TEST_MISSING-b"), "a--b");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(expand_env("s3cr3t"), "s3cr3t");
        assert_eq!(expand_env("costs $"), "costs $");
    }
}
