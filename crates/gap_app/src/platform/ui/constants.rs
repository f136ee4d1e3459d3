pub const TITLE: &str = "Industry Gap Analyzer For Youth Unemployment";
pub const HEADING_MATCHED: &str = "Matched Skills";
pub const HEADING_MISSING: &str = "Growth Opportunities";
pub const HEADING_SUGGESTIONS: &str = "AI Recommendations";
pub const EMPTY_MATCHED: &str = "No matches found";
pub const EMPTY_MISSING: &str = "No missing skills identified";
pub const EMPTY_SUGGESTIONS: &str = "No suggestions available";
pub const SPINNER_TEMPLATE: &str = "{spinner:.green} [{pos}/{len}] {msg}";
