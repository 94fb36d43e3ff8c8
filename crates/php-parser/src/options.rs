//! Parser configuration.

use std::fmt;
use std::str::FromStr;

/// A PHP language version, compared by `(major, minor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhpVersion {
    /// Major version (5, 7, 8)
    pub major: u8,
    /// Minor version
    pub minor: u8,
}

impl PhpVersion {
    /// PHP 7.4 — arrow functions, `??=`, typed properties.
    pub const PHP_7_4: PhpVersion = PhpVersion { major: 7, minor: 4 };
    /// PHP 8.0 — `match`, nullsafe `?->`, named arguments, promotion.
    pub const PHP_8_0: PhpVersion = PhpVersion { major: 8, minor: 0 };
    /// PHP 8.1 — enums, readonly properties.
    pub const PHP_8_1: PhpVersion = PhpVersion { major: 8, minor: 1 };
    /// PHP 8.2 — readonly classes.
    pub const PHP_8_2: PhpVersion = PhpVersion { major: 8, minor: 2 };
}

impl Default for PhpVersion {
    fn default() -> Self {
        PhpVersion::PHP_8_0
    }
}

impl fmt::Display for PhpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PhpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.split_once('.').unwrap_or((s, "0"));
        let major: u8 = major.parse().map_err(|_| format!("invalid PHP version '{s}'"))?;
        let minor: u8 = minor.parse().map_err(|_| format!("invalid PHP version '{s}'"))?;
        Ok(PhpVersion { major, minor })
    }
}

/// Options controlling parser behavior.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Language version to accept; version-gated syntax below this errors
    pub php_version: PhpVersion,
    /// Recover from parse errors at statement boundaries, accumulating
    /// diagnostics and returning a partial AST (default true)
    pub error_recovery: bool,
    /// Treat any recovered diagnostic as a hard failure (default false)
    pub strict: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            php_version: PhpVersion::default(),
            error_recovery: true,
            strict: false,
        }
    }
}
