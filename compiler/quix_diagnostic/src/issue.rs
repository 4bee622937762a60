//! Issue codes.
//!
//! Every code has a stable number, a flag name, an overview template and
//! zero or more hints. The overview's `%s` is replaced by the message
//! subject when rendered.
//!
//! Numbers are grouped by phase:
//! - 1xxx: parsing
//! - 2xxx: tree conversion and lowering
//! - 9xxx: internal

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IssueCode {
    /// Free-form message with no dedicated code.
    Default,

    // Parsing
    SyntaxError,
    NestingTooDeep,

    // Conversion
    PTreeInvalid,
    DSBadType,

    // Internal
    InternalError,
}

impl IssueCode {
    pub const ALL: &'static [IssueCode] = &[
        IssueCode::Default,
        IssueCode::SyntaxError,
        IssueCode::NestingTooDeep,
        IssueCode::PTreeInvalid,
        IssueCode::DSBadType,
        IssueCode::InternalError,
    ];

    /// Stable numeric code.
    pub const fn code(self) -> u32 {
        match self {
            IssueCode::Default => 0,
            IssueCode::SyntaxError => 1001,
            IssueCode::NestingTooDeep => 1002,
            IssueCode::PTreeInvalid => 2001,
            IssueCode::DSBadType => 2004,
            IssueCode::InternalError => 9001,
        }
    }

    pub const fn flag_name(self) -> &'static str {
        match self {
            IssueCode::Default => "unspecified",
            IssueCode::SyntaxError => "syntax-error",
            IssueCode::NestingTooDeep => "nesting-too-deep",
            IssueCode::PTreeInvalid => "ptree-invalid",
            IssueCode::DSBadType => "ds-bad-type",
            IssueCode::InternalError => "internal-error",
        }
    }

    /// Overview template. `%s` stands for the subject.
    pub const fn overview(self) -> &'static str {
        match self {
            IssueCode::PTreeInvalid => "The parse tree is malformed: %s",
            IssueCode::NestingTooDeep => "Nesting is too deep: %s",
            IssueCode::Default
            | IssueCode::SyntaxError
            | IssueCode::DSBadType
            | IssueCode::InternalError => "%s",
        }
    }

    pub const fn hints(self) -> &'static [&'static str] {
        match self {
            IssueCode::PTreeInvalid => &[
                "A required part of a statement or declaration is missing.",
                "Fix the syntax errors reported before this one first.",
            ],
            IssueCode::NestingTooDeep => &[
                "Split the expression into smaller parts bound to named locals.",
            ],
            IssueCode::Default
            | IssueCode::SyntaxError
            | IssueCode::DSBadType
            | IssueCode::InternalError => &[],
        }
    }

    /// Expand the overview template with `subject`.
    pub fn format_overview(self, subject: &str) -> String {
        self.overview().replace("%s", subject)
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
