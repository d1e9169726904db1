//! Raw argument lists and flag-style normalization.

/// Target dash convention for [`Args::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeStyle {
    /// `--name[=value]` becomes `-name[=value]` (the wrapped tool's convention).
    OneDashFlag,
    /// `-name[=value]` becomes `--name[=value]`.
    DoubleDashFlag,
}

/// Unconsumed command-line tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(Vec<String>);

impl Args {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(args.into_iter().map(Into::into).collect())
    }

    /// Owned copy of every token.
    pub fn slice(&self) -> Vec<String> {
        self.0.clone()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// The first token when it looks like a command name rather than a flag.
    pub fn command_name(&self) -> Option<&str> {
        self.first().filter(|arg| !arg.starts_with('-'))
    }

    /// Every token after the first, whatever the first one is.
    pub fn tail(&self) -> Args {
        Self(self.0.iter().skip(1).cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, arg: &str) -> bool {
        self.0.iter().any(|a| a == arg)
    }

    /// Rewrite flag tokens to `style`. Idempotent.
    ///
    /// Non-flags, `-`, `--`, all-dash tokens and tokens with three or more
    /// leading dashes pass through unchanged.
    pub fn normalize(&self, style: NormalizeStyle) -> Args {
        Self(self.0.iter().map(|arg| normalize_arg(arg, style)).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

fn normalize_arg(arg: &str, style: NormalizeStyle) -> String {
    let body = arg.trim_start_matches('-');
    let dashes = arg.len() - body.len();
    if dashes == 0 || dashes > 2 || body.is_empty() {
        return arg.to_string();
    }
    match style {
        NormalizeStyle::OneDashFlag => format!("-{body}"),
        NormalizeStyle::DoubleDashFlag => format!("--{body}"),
    }
}

impl From<Vec<String>> for Args {
    fn from(args: Vec<String>) -> Self {
        Self(args)
    }
}

impl From<Args> for Vec<String> {
    fn from(args: Args) -> Self {
        args.0
    }
}

impl IntoIterator for Args {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
