//! Descriptions of the rule kinds available to rule authors.

/// One rule kind as shown to authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    pub kind: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [&'static str],
    pub example: &'static str,
}

const MULTICOLUMN_KINDS: &[KindInfo] = &[
    KindInfo {
        kind: "sum_equals",
        name: "Sum equals",
        description: "The sum of the leading columns must equal the target column",
        params: &["target_column", "tolerance"],
        example: "A + B = C",
    },
    KindInfo {
        kind: "sum_range",
        name: "Sum within range",
        description: "The sum of the columns must lie within a range",
        params: &["min_value", "max_value"],
        example: "A + B + C between 100 and 1000",
    },
    KindInfo {
        kind: "date_before",
        name: "Date before",
        description: "The date in the first column must precede the date in the second",
        params: &[],
        example: "Start < End",
    },
    KindInfo {
        kind: "date_after",
        name: "Date after",
        description: "The date in the first column must follow the date in the second",
        params: &[],
        example: "End > Start",
    },
    KindInfo {
        kind: "date_range",
        name: "Date gap",
        description: "The number of days between two dates must lie within a range",
        params: &["min_days", "max_days"],
        example: "End - Start between 1 and 30 days",
    },
    KindInfo {
        kind: "percentage_of",
        name: "Percentage of",
        description: "The first column must be a percentage of the second",
        params: &["percentage", "tolerance"],
        example: "A = 20% of B (tolerance 0.02)",
    },
    KindInfo {
        kind: "all_or_none",
        name: "All or none",
        description: "Either every column is filled or every column is empty",
        params: &[],
        example: "A, B, C all filled or all empty",
    },
    KindInfo {
        kind: "unique_combination",
        name: "Unique combination",
        description: "The combination of values across the columns must be unique",
        params: &["case_sensitive"],
        example: "A+B+C unique across the file",
    },
    KindInfo {
        kind: "conditional_sum",
        name: "Conditional sum",
        description: "When the condition column holds a value, the sum of the columns must satisfy an operator",
        params: &[
            "condition_column",
            "condition_value",
            "operator",
            "target_value",
        ],
        example: "If D = 'VIP' then A + B + C > 1000",
    },
    KindInfo {
        kind: "max_min_check",
        name: "Maximum/Minimum",
        description: "One column must hold the maximum or minimum of the others",
        params: &["operation", "target_column", "tolerance"],
        example: "C = MAX(A, B) or C = MIN(A, B)",
    },
];

const FIELD_KINDS: &[KindInfo] = &[
    KindInfo {
        kind: "NotBlank",
        name: "Not blank",
        description: "The value must not be empty",
        params: &["trim"],
        example: "A not empty",
    },
    KindInfo {
        kind: "Length",
        name: "Length",
        description: "The text length must lie within bounds",
        params: &["min", "max", "trim"],
        example: "A between 3 and 50 characters",
    },
    KindInfo {
        kind: "Type",
        name: "Data type",
        description: "The value must convert to integer, float or bool",
        params: &["type", "trim"],
        example: "A is an integer",
    },
    KindInfo {
        kind: "Regex",
        name: "Regular expression",
        description: "The value must match the pattern from its start",
        params: &["pattern", "trim"],
        example: "A matches XXX-999",
    },
    KindInfo {
        kind: "Email",
        name: "Email",
        description: "The value must be a syntactically valid email address",
        params: &["trim"],
        example: "A is an email address",
    },
    KindInfo {
        kind: "Choice",
        name: "Choice",
        description: "The value must be one of the listed choices",
        params: &["choices", "caseSensitive", "trim"],
        example: "A in ['Yes', 'No', 'Maybe']",
    },
    KindInfo {
        kind: "Country",
        name: "Country",
        description: "The value must be a known country name",
        params: &["trim"],
        example: "A is a country",
    },
    KindInfo {
        kind: "Date",
        name: "Date",
        description: "The value must be a date or parse under the format",
        params: &["format", "trim"],
        example: "A is a date in DD/MM/YYYY",
    },
    KindInfo {
        kind: "Comparison",
        name: "Comparison",
        description: "The value must satisfy the operator against a literal",
        params: &["operator", "value", "trim"],
        example: "A > 100",
    },
    KindInfo {
        kind: "Duplicate",
        name: "No duplicates",
        description: "The value must not appear in any other row of the column",
        params: &["caseSensitive", "trim"],
        example: "A unique in its column",
    },
];

/// Kinds accepted by multicolumn rules.
pub fn multicolumn_kinds() -> &'static [KindInfo] {
    MULTICOLUMN_KINDS
}

/// Kinds accepted by simple and multi-simple rules.
pub fn field_kinds() -> &'static [KindInfo] {
    FIELD_KINDS
}

/// Look up a multicolumn kind by name.
pub fn multicolumn_kind(kind: &str) -> Option<&'static KindInfo> {
    MULTICOLUMN_KINDS.iter().find(|info| info.kind == kind)
}
