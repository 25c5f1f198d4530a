//! Compiler options that change how generics are modeled.
//!
//! Options arrive as a JSON document (the `compilerOptions` block of a
//! project file, or a standalone object) and are resolved into
//! [`CompilerOptions`], the plain struct every analysis reads.
//!
//! ```json
//! { "release": "17", "nullTypeAnnotations": true,
//!   "nonNullAnnotation": "org/eclipse/jdt/annotation/NonNull" }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Java language level, as far as this core cares.
///
/// Capture conversion of an `? extends` bound differs before and after
/// Java 8, so the release is kept as an ordered number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct JavaRelease(pub u8);

impl JavaRelease {
    pub const JAVA_5: JavaRelease = JavaRelease(5);
    pub const JAVA_7: JavaRelease = JavaRelease(7);
    pub const JAVA_8: JavaRelease = JavaRelease(8);
    pub const LATEST: JavaRelease = JavaRelease(21);

    /// Java 8 and later use the bound of `? extends B` as-is when capturing.
    #[inline]
    pub fn is_java8_or_later(self) -> bool {
        self >= Self::JAVA_8
    }

    /// Parse `"1.7"`, `"7"`, `"17"` style release strings.
    pub fn parse(text: &str) -> Option<JavaRelease> {
        let trimmed = text.trim();
        let number = trimmed.strip_prefix("1.").unwrap_or(trimmed);
        let value: u8 = number.parse().ok()?;
        (5..=99).contains(&value).then_some(JavaRelease(value))
    }
}

impl Default for JavaRelease {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for JavaRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 9 {
            write!(f, "1.{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Accept both `"nullTypeAnnotations": true` and `"nullTypeAnnotations": "true"`.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "enabled" | "on" => Ok(Some(true)),
            "false" | "disabled" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{}'. Expected true, false, 'enabled' or 'disabled'",
                s
            ))),
        },
    }
}

/// Options exactly as written in the options document.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawCompilerOptions {
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub null_type_annotations: Option<bool>,
    #[serde(default)]
    pub non_null_annotation: Option<String>,
    #[serde(default)]
    pub nullable_annotation: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ProjectFile {
    #[serde(default)]
    compiler_options: Option<RawCompilerOptions>,
}

/// Resolved options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub release: JavaRelease,
    /// Enables the null type annotation overlay (`@NonNull` / `@Nullable`
    /// on type uses).
    pub null_type_annotations: bool,
    /// Internal name of the non-null type annotation.
    pub non_null_annotation: String,
    /// Internal name of the nullable type annotation.
    pub nullable_annotation: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            release: JavaRelease::default(),
            null_type_annotations: false,
            non_null_annotation: "org/eclipse/jdt/annotation/NonNull".to_string(),
            nullable_annotation: "org/eclipse/jdt/annotation/Nullable".to_string(),
        }
    }
}

/// Error produced while loading options.
#[derive(Debug)]
pub enum OptionsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidRelease(String),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::Io(err) => write!(f, "failed to read options: {err}"),
            OptionsError::Parse(err) => write!(f, "failed to parse options: {err}"),
            OptionsError::InvalidRelease(text) => write!(f, "unsupported Java release '{text}'"),
        }
    }
}

impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OptionsError::Io(err) => Some(err),
            OptionsError::Parse(err) => Some(err),
            OptionsError::InvalidRelease(_) => None,
        }
    }
}

impl From<std::io::Error> for OptionsError {
    fn from(err: std::io::Error) -> Self {
        OptionsError::Io(err)
    }
}

impl From<serde_json::Error> for OptionsError {
    fn from(err: serde_json::Error) -> Self {
        OptionsError::Parse(err)
    }
}

impl CompilerOptions {
    /// Options for a given release with every other setting defaulted.
    pub fn for_release(release: JavaRelease) -> Self {
        CompilerOptions {
            release,
            ..Default::default()
        }
    }

    /// Enable the null type annotation overlay.
    pub fn with_null_type_annotations(mut self) -> Self {
        self.null_type_annotations = true;
        self
    }

    pub fn resolve(raw: RawCompilerOptions) -> Result<Self, OptionsError> {
        let mut options = CompilerOptions::default();
        if let Some(text) = raw.release {
            options.release =
                JavaRelease::parse(&text).ok_or(OptionsError::InvalidRelease(text))?;
        }
        if let Some(enabled) = raw.null_type_annotations {
            options.null_type_annotations = enabled;
        }
        if let Some(name) = raw.non_null_annotation {
            options.non_null_annotation = name.replace('.', "/");
        }
        if let Some(name) = raw.nullable_annotation {
            options.nullable_annotation = name.replace('.', "/");
        }
        Ok(options)
    }

    /// Parse either a bare options object or a project file with a
    /// `compilerOptions` block.
    pub fn from_json(source: &str) -> Result<Self, OptionsError> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        let raw = if value.get("compilerOptions").is_some() {
            let project: ProjectFile = serde_json::from_value(value)?;
            project.compiler_options.unwrap_or_default()
        } else {
            serde_json::from_value(value)?
        };
        Self::resolve(raw)
    }

    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }
}

#[cfg(test)]
#[path = "tests/options_tests.rs"]
mod tests;
