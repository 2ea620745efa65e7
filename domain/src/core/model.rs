//! Model value object identifying an LLM provider endpoint

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Known LLM models (Value Object)
///
/// A model string doubles as the provider identifier in a roster: it is what
/// gets logged, voted under and routed to a provider adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // Gemini models
    Gemini25Pro,
    Gemini25Flash,
    Gemini25FlashLite,
    Gemini20Flash,
    // GPT models
    Gpt41,
    Gpt41Mini,
    Gpt4o,
    Gpt4oMini,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gemini25Pro => "gemini-2.5-pro",
            Model::Gemini25Flash => "gemini-2.5-flash",
            Model::Gemini25FlashLite => "gemini-2.5-flash-lite",
            Model::Gemini20Flash => "gemini-2.0-flash",
            Model::Gpt41 => "gpt-4.1",
            Model::Gpt41Mini => "gpt-4.1-mini",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Custom(s) => s,
        }
    }

    /// Default worker roster, in fixed order
    pub fn default_workers() -> Vec<Model> {
        vec![
            Model::Gemini25Flash,
            Model::Gemini20Flash,
            Model::Gemini25FlashLite,
        ]
    }

    /// Default judge, consulted only when workers disagree
    pub fn default_judge() -> Model {
        Model::Gemini25Pro
    }

    /// Check if this is a Gemini model
    pub fn is_gemini(&self) -> bool {
        match self {
            Model::Gemini25Pro
            | Model::Gemini25Flash
            | Model::Gemini25FlashLite
            | Model::Gemini20Flash => true,
            Model::Custom(s) => s.starts_with("gemini"),
            _ => false,
        }
    }

    /// Check if this is a GPT (OpenAI) model
    pub fn is_gpt(&self) -> bool {
        match self {
            Model::Gpt41 | Model::Gpt41Mini | Model::Gpt4o | Model::Gpt4oMini => true,
            Model::Custom(s) => s.starts_with("gpt-") || s.starts_with("o1") || s.starts_with("o3"),
            _ => false,
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Gemini25Flash
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "gemini-2.5-pro" => Model::Gemini25Pro,
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
            "gemini-2.0-flash" => Model::Gemini20Flash,
            "gpt-4.1" => Model::Gpt41,
            "gpt-4.1-mini" => Model::Gpt41Mini,
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}
