//! Repository locations: telling URLs from local paths, naming them in
//! reports, and attaching HTTP basic credentials for cloning.

pub const USER_ENV: &str = "GITLAB_USER";
pub const PASSWORD_ENV: &str = "GITLAB_PASSWORD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    /// Reads `GITLAB_USER` / `GITLAB_PASSWORD`; `None` unless the user is set.
    pub fn from_env() -> Option<Self> {
        let user = std::env::var(USER_ENV).ok().filter(|u| !u.is_empty())?;
        let password = std::env::var(PASSWORD_ENV).unwrap_or_default();
        Some(Self { user, password })
    }

    /// Inserts the credentials into an http(s) URL that carries none.
    /// Other URLs are returned unchanged.
    pub fn apply(&self, url: &str) -> String {
        for scheme in ["https://", "http://"] {
            let Some(rest) = url.strip_prefix(scheme) else {
                continue;
            };
            let authority = rest.split('/').next().unwrap_or(rest);
            if authority.contains('@') {
                return url.to_string();
            }
            return format!(
                "{scheme}{}:{}@{rest}",
                percent_encode(&self.user),
                percent_encode(&self.password)
            );
        }
        url.to_string()
    }

    /// Masks the password wherever it appears in `text`, raw or encoded.
    pub fn redact(&self, text: &str) -> String {
        if self.password.is_empty() {
            return text.to_string();
        }
        text.replace(&percent_encode(&self.password), "***")
            .replace(&self.password, "***")
    }
}

pub fn is_remote(location: &str) -> bool {
    location.contains("://") || (location.starts_with("git@") && location.contains(':'))
}

/// Last path segment of a location without a trailing `.git`.
pub fn repository_name(location: &str) -> String {
    let trimmed = location.trim_end_matches(['/', '\\']);
    let base = trimmed
        .rsplit(['/', '\\', ':'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(trimmed);
    base.strip_suffix(".git").unwrap_or(base).to_string()
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
