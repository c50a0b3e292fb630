//! Error code registry with descriptions and help text
//!
//! Ranges:
//! - EP0xxx: Parse errors
//! - ER0xxx: Runtime errors
//! - EX0xxx: Host errors (file access)
//! - EX9xxx: Generic codes

// === Error Code Constants ===

// EP0xxx - Parse Errors
pub const UNEXPECTED_TOKEN: &str = "EP0001";
pub const NO_PREFIX_PARSE_FN: &str = "EP0002";
pub const INVALID_INTEGER: &str = "EP0003";
pub const NESTING_TOO_DEEP: &str = "EP0004";

// ER0xxx - Runtime Errors
pub const UNKNOWN_OPERATOR: &str = "ER0001";
pub const TYPE_MISMATCH: &str = "ER0002";
pub const IDENTIFIER_NOT_FOUND: &str = "ER0003";
pub const NOT_A_FUNCTION: &str = "ER0004";
pub const DIVISION_BY_ZERO: &str = "ER0005";
pub const WRONG_ARGUMENT_COUNT: &str = "ER0006";
pub const INDEX_NOT_SUPPORTED: &str = "ER0007";
pub const CALL_DEPTH_EXCEEDED: &str = "ER0008";
pub const BUILTIN_ARGUMENT: &str = "ER0009";

// EX0xxx - Host Errors
pub const FILE_READ_ERROR: &str = "EX0001";

// EX9xxx - Generic
pub const GENERIC_ERROR: &str = "EX9999";

// === Error Code Info Registry ===

/// Error code descriptor with code, description, and optional help text
#[derive(Debug, Clone)]
pub struct ErrorCodeInfo {
    /// The error code string (e.g., "EP0001")
    pub code: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Optional contextual help text
    pub help: Option<&'static str>,
}

/// Get info for an error code, if known
pub fn lookup(code: &str) -> Option<ErrorCodeInfo> {
    ERROR_CODES.iter().find(|e| e.code == code).cloned()
}

/// Get help text for an error code
pub fn help_for(code: &str) -> Option<&'static str> {
    lookup(code).and_then(|e| e.help)
}

/// Get description for an error code
pub fn description_for(code: &str) -> Option<&'static str> {
    lookup(code).map(|e| e.description)
}

/// All known error codes with descriptions and help
pub static ERROR_CODES: &[ErrorCodeInfo] = &[
    // === EP0xxx: Parse Errors ===
    ErrorCodeInfo {
        code: UNEXPECTED_TOKEN,
        description: "Unexpected token",
        help: Some("Check for a missing `(`, `)`, `{`, `}`, `=` or identifier."),
    },
    ErrorCodeInfo {
        code: NO_PREFIX_PARSE_FN,
        description: "Token cannot start an expression",
        help: Some("An operand is missing or a stray token appears where an expression belongs."),
    },
    ErrorCodeInfo {
        code: INVALID_INTEGER,
        description: "Integer literal out of range",
        help: Some("Integers are 64-bit signed; keep literals within -9223372036854775808..=9223372036854775807."),
    },
    ErrorCodeInfo {
        code: NESTING_TOO_DEEP,
        description: "Expression nested too deeply",
        help: Some("Split the expression with `let` bindings or raise `parser.max_depth`."),
    },
    // === ER0xxx: Runtime Errors ===
    ErrorCodeInfo {
        code: UNKNOWN_OPERATOR,
        description: "Unknown operator",
        help: Some("The operator is not defined for these operand types."),
    },
    ErrorCodeInfo {
        code: TYPE_MISMATCH,
        description: "Type mismatch",
        help: Some("Both operands of an arithmetic or comparison operator must have the same type."),
    },
    ErrorCodeInfo {
        code: IDENTIFIER_NOT_FOUND,
        description: "Identifier not found",
        help: Some("Check spelling. Bind the name with `let` before using it."),
    },
    ErrorCodeInfo {
        code: NOT_A_FUNCTION,
        description: "Called value is not a function",
        help: None,
    },
    ErrorCodeInfo {
        code: DIVISION_BY_ZERO,
        description: "Division by zero",
        help: Some("Check that the divisor is not zero before dividing."),
    },
    ErrorCodeInfo {
        code: WRONG_ARGUMENT_COUNT,
        description: "Wrong number of arguments",
        help: Some("Pass exactly as many arguments as the function declares parameters."),
    },
    ErrorCodeInfo {
        code: INDEX_NOT_SUPPORTED,
        description: "Index operator not supported",
        help: Some("Only arrays can be indexed, and only with integers."),
    },
    ErrorCodeInfo {
        code: CALL_DEPTH_EXCEEDED,
        description: "Maximum call depth exceeded",
        help: Some("Check for unbounded recursion or raise `interpreter.max_call_depth`."),
    },
    ErrorCodeInfo {
        code: BUILTIN_ARGUMENT,
        description: "Unsupported builtin argument",
        help: None,
    },
    // === EX0xxx: Host Errors ===
    ErrorCodeInfo {
        code: FILE_READ_ERROR,
        description: "Source file could not be read",
        help: Some("Check that the path exists and is readable."),
    },
    // === EX9xxx: Generic ===
    ErrorCodeInfo {
        code: GENERIC_ERROR,
        description: "Generic error",
        help: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_existing() {
        let info = lookup("ER0002").unwrap();
        assert_eq!(info.description, "Type mismatch");
        assert!(info.help.is_some());
    }

    #[test]
    fn test_lookup_missing() {
        assert!(lookup("ZZZZ").is_none());
    }

    #[test]
    fn test_help_for() {
        assert!(help_for(DIVISION_BY_ZERO).is_some());
        assert!(help_for(GENERIC_ERROR).is_none());
    }

    #[test]
    fn test_description_for() {
        assert_eq!(description_for("EP0001").unwrap(), "Unexpected token");
    }

    #[test]
    fn test_codes_are_unique() {
        let mut seen = HashSet::new();
        for entry in ERROR_CODES {
            assert!(seen.insert(entry.code), "duplicate code {}", entry.code);
        }
    }

    #[test]
    fn test_code_prefixes() {
        for entry in ERROR_CODES {
            assert!(
                ["EP", "ER", "EX"].iter().any(|p| entry.code.starts_with(p)),
                "{} has an unknown prefix",
                entry.code
            );
            assert!(!entry.description.is_empty());
        }
    }
}
