//! User-facing strings.
//!
//! The gate only ever asks a [`Localizer`] for text by key; the returned
//! strings are opaque to it.

use eula_config::Locale;

/// Message keys used by the gate.
pub mod keys {
    pub const DEFAULT_ACCEPT: &str = "eula.defaultAccept";
    pub const TITLE: &str = "eula.eulaMessage.title";
    pub const TEXT: &str = "eula.eulaMessage.text";
    pub const CONFIRM: &str = "eula.eulaMessage.confirm";
    pub const ACCEPTED: &str = "eula.acceptedMessage";
    pub const REJECTED: &str = "eula.rejectMessage";
    pub const TIMEOUT: &str = "eula.timeout";
    pub const PENDING: &str = "eula.pending";
}

/// Source of localized strings.
pub trait Localizer: Send + Sync {
    /// Text for `key` with `{0}`, `{1}`, ... replaced by `args`.
    fn text(&self, key: &str, args: &[&str]) -> String;
}

/// Built-in string tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLocalizer {
    locale: Locale,
}

impl StaticLocalizer {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    fn template(&self, key: &str) -> Option<&'static str> {
        let template = match (self.locale, key) {
            (Locale::Zh, keys::DEFAULT_ACCEPT) => "同意",
            (Locale::Zh, keys::TITLE) => "请阅读《{0}》",
            (Locale::Zh, keys::TEXT) => "部署者仅对同意了本协议的最终用户提供服务。",
            (Locale::Zh, keys::CONFIRM) => "如同意以上协议，请在限定时间内回复「{0}」",
            (Locale::Zh, keys::ACCEPTED) => "您已同意《{0}》，可以正常使用了。",
            (Locale::Zh, keys::REJECTED) => "您未同意《{0}》，将无法使用相关指令。",
            (Locale::Zh, keys::TIMEOUT) => "等待回复超时，请重新发送指令。",
            (Locale::Zh, keys::PENDING) => "请先回复正在等待确认的协议。",

            (Locale::En, keys::DEFAULT_ACCEPT) => "agree",
            (Locale::En, keys::TITLE) => "Please read the {0}",
            (Locale::En, keys::TEXT) => {
                "Service is only provided to end users who accept this agreement."
            }
            (Locale::En, keys::CONFIRM) => "To accept the agreement above, reply \"{0}\" in time",
            (Locale::En, keys::ACCEPTED) => "You accepted the {0}. Commands are now available.",
            (Locale::En, keys::REJECTED) => {
                "You did not accept the {0}. Gated commands stay unavailable."
            }
            (Locale::En, keys::TIMEOUT) => "No reply in time. Please send the command again.",
            (Locale::En, keys::PENDING) => "Please answer the pending agreement prompt first.",

            _ => return None,
        };
        Some(template)
    }
}

impl Localizer for StaticLocalizer {
    fn text(&self, key: &str, args: &[&str]) -> String {
        match self.template(key) {
            Some(template) => format_args_positional(template, args),
            None => key.to_string(),
        }
    }
}

/// Replace `{n}` placeholders with `args[n]`. Placeholders without a matching
/// argument are left as-is.
pub fn format_args_positional(template: &str, args: &[&str]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |text, (i, arg)| {
            text.replace(&format!("{{{}}}", i), arg)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution() {
        let l = StaticLocalizer::new(Locale::En);
        assert_eq!(
            l.text(keys::ACCEPTED, &["EULA"]),
            "You accepted the EULA. Commands are now available."
        );
    }

    #[test]
    fn test_unknown_key_echoes_key() {
        let l = StaticLocalizer::default();
        assert_eq!(l.text("eula.nope", &[]), "eula.nope");
    }

    #[test]
    fn test_every_key_has_both_locales() {
        let all = [
            keys::DEFAULT_ACCEPT,
            keys::TITLE,
            keys::TEXT,
            keys::CONFIRM,
            keys::ACCEPTED,
            keys::REJECTED,
            keys::TIMEOUT,
            keys::PENDING,
        ];
        for locale in [Locale::Zh, Locale::En] {
            let l = StaticLocalizer::new(locale);
            for key in all {
                assert_ne!(l.text(key, &[]), key, "{key} missing for {locale:?}");
            }
        }
    }

    #[test]
    fn test_missing_argument_left_in_place() {
        assert_eq!(format_args_positional("{0} and {1}", &["a"]), "a and {1}");
    }

    #[test]
    fn test_default_accept_word() {
        assert_eq!(StaticLocalizer::new(Locale::Zh).text(keys::DEFAULT_ACCEPT, &[]), "同意");
    }
}
