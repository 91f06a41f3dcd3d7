use std::fmt::{Debug, Display, Formatter};

/// The OpenAQ deployment the dashboard talks to.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Environment {
    /// The public OpenAQ API.
    #[default]
    Production,
    /// A mirror or local stub, selected with `OPENAQ_API_URL`.
    Custom { api_url: String },
}

impl Environment {
    /// Resolves the environment from the `OPENAQ_API_URL` variable.
    pub fn from_env() -> Self {
        match std::env::var("OPENAQ_API_URL") {
            Ok(url) if !url.trim().is_empty() => Environment::Custom {
                api_url: url.trim().to_string(),
            },
            _ => Environment::Production,
        }
    }

    /// Returns the API base URL associated with the environment.
    pub fn api_url(&self) -> String {
        match self {
            Environment::Production => "https://api.openaq.org".to_string(),
            Environment::Custom { api_url } => api_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "Production"),
            Environment::Custom { .. } => write!(f, "Custom"),
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Environment::{}, URL: {}", self, self.api_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_url_drops_trailing_slash() {
        let env = Environment::Custom {
            api_url: "http://localhost:8080/".to_string(),
        };
        assert_eq!(env.api_url(), "http://localhost:8080");
        assert_eq!(env.to_string(), "Custom");
    }

    #[test]
    fn production_is_default() {
        assert_eq!(Environment::default(), Environment::Production);
        assert_eq!(Environment::Production.api_url(), "https://api.openaq.org");
    }
}
